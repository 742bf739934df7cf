use folio_appearance::{Edit, FontPair, SelectedPreset};
use serde_json::{Value, json};

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliResult};
use crate::commands::edit::render_saved;
use crate::output::{render_table, to_pretty_json};

fn marker(selected: bool) -> String {
    String::from(if selected { "*" } else { "" })
}

pub(crate) fn handle_preset_list(ctx: &AppContext) -> CliResult<String> {
    let current = ctx.service.stores().theme.get().selected_preset;
    let presets = SelectedPreset::presets()
        .filter_map(|preset| preset.palette().map(|palette| (preset, palette)));

    match ctx.format {
        OutputFormat::Json => {
            let items: Vec<Value> = presets
                .map(|(preset, palette)| {
                    json!({
                        "id": preset.as_str(),
                        "label": preset.label(),
                        "colors": palette,
                        "selected": preset == current,
                    })
                })
                .collect();
            to_pretty_json(&Value::Array(items))
        }
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = presets
                .map(|(preset, palette)| {
                    vec![
                        marker(preset == current),
                        preset.as_str().to_string(),
                        preset.label().to_string(),
                        palette.primary.to_string(),
                        palette.secondary.to_string(),
                        palette.accent.to_string(),
                        palette.background.to_string(),
                        palette.text.to_string(),
                    ]
                })
                .collect();
            Ok(render_table(
                &["", "ID", "LABEL", "PRIMARY", "SECONDARY", "ACCENT", "BACKGROUND", "TEXT"],
                &rows,
            ))
        }
    }
}

pub(crate) async fn handle_preset_apply(
    ctx: &AppContext,
    preset: SelectedPreset,
) -> CliResult<String> {
    let stored = ctx.service.commit(Edit::Preset(preset)).await?;
    render_saved(&stored, ctx.format)
}

pub(crate) fn handle_fonts_list(ctx: &AppContext) -> CliResult<String> {
    let current = ctx.service.stores().typography.get().matching_pair();

    match ctx.format {
        OutputFormat::Json => {
            let items: Vec<Value> = FontPair::all()
                .map(|pair| {
                    let (heading, body) = pair.families();
                    json!({
                        "id": pair.as_str(),
                        "label": pair.label(),
                        "headingFont": heading,
                        "bodyFont": body,
                        "selected": Some(pair) == current,
                    })
                })
                .collect();
            to_pretty_json(&Value::Array(items))
        }
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = FontPair::all()
                .map(|pair| {
                    let (heading, body) = pair.families();
                    vec![
                        marker(Some(pair) == current),
                        pair.as_str().to_string(),
                        pair.label().to_string(),
                        heading.to_string(),
                        body.to_string(),
                    ]
                })
                .collect();
            Ok(render_table(&["", "ID", "LABEL", "HEADING", "BODY"], &rows))
        }
    }
}

pub(crate) async fn handle_fonts_apply(ctx: &AppContext, pair: FontPair) -> CliResult<String> {
    let stored = ctx.service.commit(Edit::FontPair(pair)).await?;
    render_saved(&stored, ctx.format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, reopen};

    #[tokio::test]
    async fn preset_list_marks_the_active_preset() {
        let (_dir, ctx) = context(OutputFormat::Table).await;
        let text = handle_preset_list(&ctx).expect("list");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[1].starts_with("*  default"));
        assert!(!text.contains("custom"));
    }

    #[tokio::test]
    async fn preset_apply_is_saved_and_listed() {
        let (dir, ctx) = context(OutputFormat::Json).await;
        handle_preset_apply(&ctx, SelectedPreset::Ocean).await.expect("apply");

        let later = reopen(&dir, OutputFormat::Json).await;
        let theme = later.service.stores().theme.get();
        assert_eq!(theme.selected_preset, SelectedPreset::Ocean);
        assert_eq!(Some(theme.colors), SelectedPreset::Ocean.palette());

        let listed: Value = serde_json::from_str(&handle_preset_list(&later).expect("list"))
            .expect("json");
        let selected: Vec<&str> = listed
            .as_array()
            .into_iter()
            .flatten()
            .filter(|item| item["selected"] == true)
            .filter_map(|item| item["id"].as_str())
            .collect();
        assert_eq!(selected, ["ocean"]);
    }

    #[tokio::test]
    async fn fonts_apply_sets_both_families() {
        let (_dir, ctx) = context(OutputFormat::Table).await;
        let text = handle_fonts_apply(&ctx, FontPair::Classic).await.expect("apply");
        assert!(text.contains("Playfair Display"));
        let typography = ctx.service.stores().typography.get();
        assert_eq!(typography.matching_pair(), Some(FontPair::Classic));

        let listing = handle_fonts_list(&ctx).expect("list");
        assert!(listing.lines().any(|line| line.starts_with("*  classic")));
    }
}
