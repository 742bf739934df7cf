//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Render any serializable document: pretty JSON, or one `path  value` row per leaf.
pub(crate) fn render_document<T: Serialize>(document: &T, format: OutputFormat) -> CliResult<String> {
    let value = serde_json::to_value(document)
        .map_err(|err| CliError::failure(anyhow!("failed to encode output: {err}")))?;
    match format {
        OutputFormat::Json => to_pretty_json(&value),
        OutputFormat::Table => Ok(render_rows(&flatten(&value))),
    }
}

pub(crate) fn to_pretty_json(value: &Value) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

/// Flatten nested objects and arrays into dotted paths with display values.
pub(crate) fn flatten(value: &Value) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into(String::new(), value, &mut rows);
    rows
}

fn flatten_into(prefix: String, value: &Value, rows: &mut Vec<(String, String)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(join(key), child, rows);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(join(&index.to_string()), child, rows);
            }
        }
        Value::String(text) => rows.push((prefix, text.clone())),
        other => rows.push((prefix, other.to_string())),
    }
}

/// Two-column table with the key column padded to its widest entry.
pub(crate) fn render_rows(rows: &[(String, String)]) -> String {
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(key, value)| format!("{key:<width$}  {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Column-aligned table with a header row.
pub(crate) fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.len());
            }
        }
    }
    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![line(headers.to_vec())];
    lines.extend(rows.iter().map(|row| line(row.iter().map(String::as_str).collect())));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flatten_uses_dotted_paths() {
        let rows = flatten(&json!({
            "container": {"maxWidth": "1280", "padding": "normal"},
            "viewports": [{"device": "mobile"}],
            "fluid": true
        }));
        assert!(rows.contains(&("container.maxWidth".into(), "1280".into())));
        assert!(rows.contains(&("viewports.0.device".into(), "mobile".into())));
        assert!(rows.contains(&("fluid".into(), "true".into())));
    }

    #[test]
    fn render_rows_aligns_values() {
        let text = render_rows(&[("a".into(), "1".into()), ("long.key".into(), "2".into())]);
        assert_eq!(text, "a         1\nlong.key  2");
    }

    #[test]
    fn render_table_pads_columns() {
        let text = render_table(
            &["ID", "LABEL"],
            &[vec!["ocean".into(), "Ocean".into()], vec!["dark-mode".into(), "Dark Mode".into()]],
        );
        assert_eq!(text, "ID         LABEL\nocean      Ocean\ndark-mode  Dark Mode");
    }

    #[test]
    fn json_output_is_pretty() {
        let text = render_document(&json!({"a": 1}), OutputFormat::Json).expect("render");
        assert_eq!(text, "{\n  \"a\": 1\n}");
    }
}
