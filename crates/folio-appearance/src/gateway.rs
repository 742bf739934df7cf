//! Persistence Gateway contract and the bundled in-memory and file adapters.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::domain::DomainKind;
use crate::error::{PersistError, PersistResult};

/// A domain document as the gateway holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfig {
    /// Domain the document belongs to.
    pub domain: DomainKind,
    /// Canonical domain document.
    pub config: Value,
    /// Bumped only when the stored content changes.
    pub revision: i64,
    /// When the current content was first stored.
    pub stored_at: DateTime<Utc>,
}

impl StoredConfig {
    fn first(domain: DomainKind, config: Value) -> Self {
        Self {
            domain,
            config,
            revision: 1,
            stored_at: Utc::now(),
        }
    }

    /// The document that results from saving `config` over `self`.
    ///
    /// Identical content returns `self` unchanged.
    #[must_use]
    pub fn succeed(self, config: Value) -> Self {
        if self.config == config {
            return self;
        }
        Self {
            domain: self.domain,
            config,
            revision: self.revision + 1,
            stored_at: Utc::now(),
        }
    }
}

/// Durable storage for domain documents, keyed by domain.
///
/// `save` must store the whole document or nothing, and saving identical
/// content must leave the stored state unchanged.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Store one domain's configuration.
    async fn save(&self, domain: DomainKind, config: Value) -> PersistResult<StoredConfig>;

    /// Read one domain's configuration; `None` means never stored.
    async fn load(&self, domain: DomainKind) -> PersistResult<Option<StoredConfig>>;
}

/// Process-local gateway backed by a map.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    documents: RwLock<HashMap<DomainKind, StoredConfig>>,
}

impl MemoryGateway {
    /// Empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored domains.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether nothing has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn save(&self, domain: DomainKind, config: Value) -> PersistResult<StoredConfig> {
        let mut documents = self.documents.write().await;
        let stored = match documents.remove(&domain) {
            Some(previous) => previous.succeed(config),
            None => StoredConfig::first(domain, config),
        };
        documents.insert(domain, stored.clone());
        Ok(stored)
    }

    async fn load(&self, domain: DomainKind) -> PersistResult<Option<StoredConfig>> {
        Ok(self.documents.read().await.get(&domain).cloned())
    }
}

fn io_error(operation: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> PersistError + use<> {
    let path = path.to_path_buf();
    move |source| PersistError::Io {
        operation,
        path,
        source,
    }
}

/// Gateway storing one `<domain>.json` document per domain in a directory.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// reader sees either the previous or the new document.
#[derive(Debug)]
pub struct FileGateway {
    root: PathBuf,
    writes: Mutex<()>,
}

impl FileGateway {
    /// Gateway rooted at `root`; the directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            writes: Mutex::new(()),
        }
    }

    /// Directory holding the documents.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of a domain's document.
    #[must_use]
    pub fn document_path(&self, domain: DomainKind) -> PathBuf {
        self.root.join(format!("{domain}.json"))
    }

    async fn read_document(&self, domain: DomainKind) -> PersistResult<Option<StoredConfig>> {
        let path = self.document_path(domain);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistError::Io {
                    operation: "read",
                    path,
                    source,
                });
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| PersistError::Malformed { domain, source })
    }

    async fn write_document(&self, stored: &StoredConfig) -> PersistResult<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(io_error("create_dir", &self.root))?;

        let target = self.document_path(stored.domain);
        let staging = self.root.join(format!(".{}.json.tmp", stored.domain));
        let bytes = serde_json::to_vec_pretty(stored).map_err(|source| PersistError::Encode {
            domain: stored.domain,
            source,
        })?;
        fs::write(&staging, bytes)
            .await
            .map_err(io_error("write", &staging))?;
        fs::rename(&staging, &target)
            .await
            .map_err(io_error("rename", &target))?;
        debug!(path = %target.display(), revision = stored.revision, "wrote domain document");
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for FileGateway {
    async fn save(&self, domain: DomainKind, config: Value) -> PersistResult<StoredConfig> {
        let _guard = self.writes.lock().await;
        let previous = match self.read_document(domain).await {
            Ok(previous) => previous,
            Err(err @ PersistError::Malformed { .. }) => {
                warn!(error = %err, "replacing unreadable domain document");
                None
            }
            Err(err) => return Err(err),
        };
        let unchanged = previous.as_ref().is_some_and(|p| p.config == config);
        let stored = match previous {
            Some(previous) => previous.succeed(config),
            None => StoredConfig::first(domain, config),
        };
        if !unchanged {
            self.write_document(&stored).await?;
        }
        Ok(stored)
    }

    async fn load(&self, domain: DomainKind) -> PersistResult<Option<StoredConfig>> {
        self.read_document(domain).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_gateway_saves_idempotently() {
        let gateway = MemoryGateway::new();
        assert!(gateway.load(DomainKind::Theme).await.unwrap().is_none());

        let first = gateway
            .save(DomainKind::Theme, json!({ "selectedPreset": "ocean" }))
            .await
            .unwrap();
        let again = gateway
            .save(DomainKind::Theme, json!({ "selectedPreset": "ocean" }))
            .await
            .unwrap();
        assert_eq!(first, again);

        let changed = gateway
            .save(DomainKind::Theme, json!({ "selectedPreset": "forest" }))
            .await
            .unwrap();
        assert_eq!(changed.revision, 2);
        assert_eq!(gateway.len().await, 1);
    }

    #[tokio::test]
    async fn file_gateway_round_trips_documents() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = FileGateway::new(dir.path().join("appearance"));
        assert!(gateway.load(DomainKind::Layout).await.unwrap().is_none());

        let config = json!({ "container": { "maxWidth": "1536" } });
        let saved = gateway
            .save(DomainKind::Layout, config.clone())
            .await
            .unwrap();
        let loaded = gateway.load(DomainKind::Layout).await.unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.config, config);
        assert!(gateway.document_path(DomainKind::Layout).is_file());

        let repeat = gateway.save(DomainKind::Layout, config).await.unwrap();
        assert_eq!(repeat.revision, 1);
        assert_eq!(repeat.stored_at, saved.stored_at);
    }

    #[tokio::test]
    async fn file_gateway_reports_and_replaces_malformed_documents() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = FileGateway::new(dir.path());
        std::fs::write(gateway.document_path(DomainKind::Typography), b"{not json").unwrap();

        let err = gateway.load(DomainKind::Typography).await.unwrap_err();
        assert!(matches!(err, PersistError::Malformed { .. }));

        let stored = gateway
            .save(DomainKind::Typography, json!({ "baseFontSize": 18 }))
            .await
            .unwrap();
        assert_eq!(stored.revision, 1);
        assert!(gateway.load(DomainKind::Typography).await.unwrap().is_some());
    }
}
