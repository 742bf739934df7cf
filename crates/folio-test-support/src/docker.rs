//! Docker daemon detection for tests that need containers.

use std::path::Path;
use std::process::Command;

/// Returns `true` if a Docker daemon looks reachable.
///
/// Honours `DOCKER_HOST`; otherwise checks the default socket and finally
/// asks the `docker` CLI.
#[must_use]
pub fn available() -> bool {
    reachable(std::env::var("DOCKER_HOST").ok().as_deref())
}

fn reachable(host: Option<&str>) -> bool {
    match host {
        Some(host) => host
            .strip_prefix("unix://")
            .is_none_or(|socket| Path::new(socket).exists()),
        None => {
            Path::new("/var/run/docker.sock").exists()
                || Command::new("docker")
                    .arg("info")
                    .output()
                    .is_ok_and(|output| output.status.success())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_unix_socket_is_unavailable() {
        assert!(!reachable(Some("unix:///definitely/missing.sock")));
    }

    #[test]
    fn remote_hosts_are_assumed_reachable() {
        assert!(reachable(Some("tcp://127.0.0.1:2375")));
    }

    #[test]
    fn default_detection_runs_without_override() {
        let _ = reachable(None);
    }
}
