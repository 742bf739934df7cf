use folio_appearance::{Choice, DomainKind};

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{flatten, render_document, render_rows};

pub(crate) fn handle_show(ctx: &AppContext, domain: Option<DomainKind>) -> CliResult<String> {
    match (domain, ctx.format) {
        (Some(domain), OutputFormat::Json) => render_document(&ctx.service.get(domain), ctx.format),
        (None, OutputFormat::Json) => render_document(&ctx.service.effective(), ctx.format),
        (Some(domain), OutputFormat::Table) => domain_section(ctx, domain),
        (None, OutputFormat::Table) => {
            let sections = DomainKind::ALL
                .iter()
                .map(|domain| domain_section(ctx, *domain))
                .collect::<CliResult<Vec<_>>>()?;
            Ok(sections.join("\n\n"))
        }
    }
}

pub(crate) fn handle_preview(ctx: &AppContext) -> CliResult<String> {
    render_document(&ctx.service.preview(), ctx.format)
}

fn domain_section(ctx: &AppContext, domain: DomainKind) -> CliResult<String> {
    let value = serde_json::to_value(ctx.service.get(domain))
        .map_err(CliError::failure)?;
    Ok(format!(
        "[{domain}] {}\n{}",
        ctx.service.status(domain),
        render_rows(&flatten(&value))
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use serde_json::Value;

    #[tokio::test]
    async fn table_lists_every_domain_with_status() {
        let (_dir, ctx) = context(OutputFormat::Table).await;
        let text = handle_show(&ctx, None).expect("show");
        for domain in ["[layout] loaded", "[theme] loaded", "[responsive] loaded", "[typography] loaded"] {
            assert!(text.contains(domain), "missing {domain} in:\n{text}");
        }
        assert!(text.contains("container.maxWidth"));
    }

    #[tokio::test]
    async fn json_for_one_domain_is_the_bare_document() {
        let (_dir, ctx) = context(OutputFormat::Json).await;
        let text = handle_show(&ctx, Some(DomainKind::Theme)).expect("show");
        let value: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["selectedPreset"], "default");
        assert!(value.get("container").is_none());
    }

    #[tokio::test]
    async fn preview_reports_three_viewports() {
        let (_dir, ctx) = context(OutputFormat::Json).await;
        let value: Value = serde_json::from_str(&handle_preview(&ctx).expect("preview")).expect("json");
        assert_eq!(value["viewports"].as_array().map(Vec::len), Some(3));
    }
}
