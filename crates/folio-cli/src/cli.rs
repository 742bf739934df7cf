//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use folio_appearance::{DomainKind, FontPair, SelectedPreset};
use folio_telemetry::{LogFormat, LoggingConfig, build_sha, init_logging};
use tracing::debug;
use uuid::Uuid;

use crate::client::{AppContext, CliResult, connect_gateway};
use crate::commands::{catalog, edit, show};

const DEFAULT_STORE_DIR: &str = ".folio/appearance";
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Parse arguments, run the command and return the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.map_or_else(LogFormat::infer, LogFormat::from),
        build_sha: option_env!("FOLIO_BUILD_SHA").unwrap_or("dev"),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: logging disabled: {err}");
    }
    debug!(build = build_sha(), "folio cli starting");

    match dispatch(cli).await {
        Ok(text) => {
            println!("{text}");
            0
        }
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

pub(crate) async fn dispatch(cli: Cli) -> CliResult<String> {
    let gateway = connect_gateway(&cli.backend).await?;
    let ctx = AppContext::load(gateway, cli.output).await?;

    match cli.command {
        Command::Show(args) => show::handle_show(&ctx, args.domain),
        Command::Preview => show::handle_preview(&ctx),
        Command::Set(args) => edit::handle_set(&ctx, args).await,
        Command::Reset(args) => edit::handle_reset(&ctx, args.domain).await,
        Command::Preset(PresetCommand::List) => catalog::handle_preset_list(&ctx),
        Command::Preset(PresetCommand::Apply(args)) => {
            catalog::handle_preset_apply(&ctx, args.id).await
        }
        Command::Fonts(FontsCommand::List) => catalog::handle_fonts_list(&ctx),
        Command::Fonts(FontsCommand::Apply(args)) => catalog::handle_fonts_apply(&ctx, args.id).await,
    }
}

#[derive(Parser)]
#[command(name = "folio", about = "Manage a portfolio's appearance settings")]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) backend: BackendArgs,
    #[arg(long, global = true, env = "FOLIO_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    #[arg(long, global = true, value_enum)]
    pub(crate) log_format: Option<LogFormatArg>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Where settings are stored. A database URL takes precedence over the directory.
#[derive(Args, Debug, Clone)]
pub(crate) struct BackendArgs {
    #[arg(long, global = true, env = "FOLIO_STORE_DIR", default_value = DEFAULT_STORE_DIR)]
    pub(crate) store_dir: PathBuf,
    #[arg(long, global = true, env = "FOLIO_DATABASE_URL")]
    pub(crate) database_url: Option<String>,
    #[arg(long, global = true, env = "FOLIO_PORTFOLIO_ID")]
    pub(crate) portfolio_id: Option<Uuid>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Print the current settings of one or every domain.
    Show(ShowArgs),
    /// Print the rendered preview description.
    Preview,
    /// Merge a JSON patch into a domain and save it.
    Set(SetArgs),
    /// Restore a domain's defaults and save it.
    Reset(DomainArg),
    /// List or apply theme presets.
    #[command(subcommand)]
    Preset(PresetCommand),
    /// List or apply curated font pairs.
    #[command(subcommand)]
    Fonts(FontsCommand),
}

#[derive(Args)]
pub(crate) struct ShowArgs {
    #[arg(long, value_parser = parse_domain)]
    pub(crate) domain: Option<DomainKind>,
}

#[derive(Args)]
pub(crate) struct DomainArg {
    #[arg(value_parser = parse_domain)]
    pub(crate) domain: DomainKind,
}

#[derive(Args)]
#[command(group(ArgGroup::new("source").required(true).args(["patch", "file"])))]
pub(crate) struct SetArgs {
    #[arg(value_parser = parse_domain)]
    pub(crate) domain: DomainKind,
    /// Inline JSON object, e.g. '{"container":{"maxWidth":"1536"}}'.
    #[arg(long)]
    pub(crate) patch: Option<String>,
    /// Path to a file holding the JSON patch.
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum PresetCommand {
    /// List the theme presets.
    List,
    /// Apply a theme preset.
    Apply(PresetArgs),
}

#[derive(Args)]
pub(crate) struct PresetArgs {
    #[arg(value_parser = parse_preset)]
    pub(crate) id: SelectedPreset,
}

#[derive(Subcommand)]
pub(crate) enum FontsCommand {
    /// List the curated font pairs.
    List,
    /// Apply a font pair to headings and body text.
    Apply(FontPairArgs),
}

#[derive(Args)]
pub(crate) struct FontPairArgs {
    #[arg(value_parser = parse_font_pair)]
    pub(crate) id: FontPair,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

fn parse_domain(raw: &str) -> Result<DomainKind, String> {
    raw.parse()
}

fn parse_preset(raw: &str) -> Result<SelectedPreset, String> {
    match raw.parse()? {
        SelectedPreset::Custom => Err("'custom' is not a preset; use `folio set theme`".to_string()),
        preset => Ok(preset),
    }
}

fn parse_font_pair(raw: &str) -> Result<FontPair, String> {
    raw.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_with_inline_patch() {
        let cli = Cli::try_parse_from([
            "folio",
            "--output",
            "json",
            "set",
            "layout",
            "--patch",
            r#"{"container":{"maxWidth":"1536"}}"#,
        ])
        .expect("valid arguments");
        assert_eq!(cli.output, OutputFormat::Json);
        let Command::Set(args) = cli.command else {
            panic!("expected set command");
        };
        assert_eq!(args.domain, DomainKind::Layout);
        assert!(args.patch.is_some());
    }

    #[test]
    fn set_requires_exactly_one_patch_source() {
        assert!(Cli::try_parse_from(["folio", "set", "theme"]).is_err());
        assert!(
            Cli::try_parse_from(["folio", "set", "theme", "--patch", "{}", "--file", "p.json"])
                .is_err()
        );
    }

    #[test]
    fn rejects_unknown_domains_and_presets() {
        assert!(Cli::try_parse_from(["folio", "reset", "colors"]).is_err());
        assert!(Cli::try_parse_from(["folio", "preset", "apply", "custom"]).is_err());
        assert!(Cli::try_parse_from(["folio", "preset", "apply", "neon"]).is_err());
        assert!(Cli::try_parse_from(["folio", "fonts", "apply", "classic"]).is_ok());
    }
}
