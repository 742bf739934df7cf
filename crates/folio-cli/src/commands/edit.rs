use anyhow::Context;
use folio_appearance::{DomainKind, Edit, StoredConfig};
use serde_json::Value;

use crate::cli::{OutputFormat, SetArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{flatten, render_rows, to_pretty_json};

pub(crate) async fn handle_set(ctx: &AppContext, args: SetArgs) -> CliResult<String> {
    let payload = match (args.patch, args.file) {
        (Some(inline), _) => inline,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))
            .map_err(CliError::failure)?,
        (None, None) => return Err(CliError::validation("pass --patch or --file")),
    };
    let patch: Value = serde_json::from_str(&payload)
        .map_err(|err| CliError::validation(format!("patch is not valid JSON: {err}")))?;

    let stored = ctx
        .service
        .commit(Edit::Patch {
            domain: args.domain,
            patch,
        })
        .await?;
    render_saved(&stored, ctx.format)
}

pub(crate) async fn handle_reset(ctx: &AppContext, domain: DomainKind) -> CliResult<String> {
    let stored = ctx.service.commit(Edit::Reset(domain)).await?;
    render_saved(&stored, ctx.format)
}

/// Render the document a mutating command just stored.
pub(crate) fn render_saved(stored: &StoredConfig, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::to_value(stored).map_err(CliError::failure)?;
            to_pretty_json(&value)
        }
        OutputFormat::Table => Ok(format!(
            "saved {} (revision {})\n{}",
            stored.domain,
            stored.revision,
            render_rows(&flatten(&stored.config))
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, reopen};
    use folio_appearance::{DomainStatus, LayoutConfig};

    fn set_args(domain: DomainKind, patch: &str) -> SetArgs {
        SetArgs {
            domain,
            patch: Some(patch.to_string()),
            file: None,
        }
    }

    #[tokio::test]
    async fn set_persists_across_invocations() {
        let (dir, ctx) = context(OutputFormat::Table).await;
        let text = handle_set(
            &ctx,
            set_args(DomainKind::Layout, r#"{"container":{"maxWidth":"1536"}}"#),
        )
        .await
        .expect("set");
        assert!(text.starts_with("saved layout (revision 1)"));
        assert_eq!(ctx.service.status(DomainKind::Layout), DomainStatus::Saved);

        let later = reopen(&dir, OutputFormat::Json).await;
        let layout = later.service.stores().layout.get();
        assert_eq!(layout.container.max_width.px(), 1536);
    }

    #[tokio::test]
    async fn set_reads_patch_from_file() {
        let (dir, ctx) = context(OutputFormat::Json).await;
        let path = dir.path().join("patch.json");
        std::fs::write(&path, r##"{"colors":{"accent":"#10b981"}}"##).expect("write patch");
        let args = SetArgs {
            domain: DomainKind::Theme,
            patch: None,
            file: Some(path),
        };
        let text = handle_set(&ctx, args).await.expect("set");
        let value: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["config"]["colors"]["accent"], "#10b981");
        assert_eq!(value["config"]["selectedPreset"], "custom");
    }

    #[tokio::test]
    async fn invalid_patch_is_a_validation_error() {
        let (_dir, ctx) = context(OutputFormat::Table).await;
        let Err(err) = handle_set(
            &ctx,
            set_args(DomainKind::Layout, r#"{"container":{"maxWidth":"999"}}"#),
        )
        .await
        else {
            panic!("expected rejection");
        };
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("container.maxWidth"));
        assert_eq!(ctx.service.stores().layout.get(), LayoutConfig::default());

        let Err(err) = handle_set(&ctx, set_args(DomainKind::Layout, "{not json")).await else {
            panic!("expected rejection");
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn unreadable_document_does_not_block_other_commands() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("theme.json"), "{not json").expect("write garbage");

        let ctx = reopen(&dir, OutputFormat::Table).await;
        handle_set(&ctx, set_args(DomainKind::Layout, r#"{"grid":{"columnGap":"32"}}"#))
            .await
            .expect("set layout");
        let text = handle_reset(&ctx, DomainKind::Theme).await.expect("reset theme");
        assert!(text.starts_with("saved theme (revision 1)"));

        let later = reopen(&dir, OutputFormat::Json).await;
        assert_eq!(later.service.status(DomainKind::Theme), DomainStatus::Loaded);
        let stored = std::fs::read_to_string(dir.path().join("theme.json")).expect("read theme");
        assert!(serde_json::from_str::<Value>(&stored).is_ok());
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let (_dir, ctx) = context(OutputFormat::Table).await;
        handle_set(&ctx, set_args(DomainKind::Typography, r#"{"baseFontSize":18}"#))
            .await
            .expect("set");
        let text = handle_reset(&ctx, DomainKind::Typography).await.expect("reset");
        assert!(text.starts_with("saved typography (revision 2)"));
        assert_eq!(ctx.service.stores().typography.get().base_font_size, 16);
    }
}
