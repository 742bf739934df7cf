//! Patch flattening and per-field parsing helpers shared by the settings domains.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::choice::Choice;
use crate::domain::DomainKind;
use crate::error::{ValidationError, ValidationResult};

// Patterns are literals; a compile failure rejects every value rather than panicking.
static HEX_COLOR: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").ok());
static FONT_FAMILY: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{0,63}$").ok());
static PIXEL_WIDTH: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^([0-9]{1,5})px$").ok());

/// Flatten a patch object into `(dotted.path, leaf)` pairs.
///
/// Nested objects and dotted keys are equivalent. Leaves are never objects.
pub(crate) fn flatten_patch(
    domain: DomainKind,
    patch: &Value,
) -> ValidationResult<Vec<(String, &Value)>> {
    let Some(map) = patch.as_object() else {
        return Err(ValidationError::PatchNotObject { domain });
    };
    let mut fields = Vec::new();
    collect_fields(domain, None, map, &mut fields)?;
    Ok(fields)
}

fn collect_fields<'a>(
    domain: DomainKind,
    prefix: Option<&str>,
    map: &'a Map<String, Value>,
    out: &mut Vec<(String, &'a Value)>,
) -> ValidationResult<()> {
    for (key, value) in map {
        let path = prefix.map_or_else(|| key.clone(), |prefix| format!("{prefix}.{key}"));
        match value {
            Value::Object(nested) => collect_fields(domain, Some(&path), nested, out)?,
            Value::Null => {
                return Err(invalid(domain, &path, value, "a value (null is not allowed)"));
            }
            _ => out.push((path, value)),
        }
    }
    Ok(())
}

pub(crate) fn invalid(
    domain: DomainKind,
    field: &str,
    value: &Value,
    expected: impl Into<String>,
) -> ValidationError {
    ValidationError::InvalidField {
        domain,
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.into(),
    }
}

pub(crate) fn unknown(domain: DomainKind, field: &str) -> ValidationError {
    ValidationError::UnknownField {
        domain,
        field: field.to_string(),
    }
}

pub(crate) fn parse_choice<T: Choice>(
    domain: DomainKind,
    field: &str,
    value: &Value,
) -> ValidationResult<T> {
    T::from_json(value).ok_or_else(|| invalid(domain, field, value, format!("one of: {}", T::accepted())))
}

pub(crate) fn parse_bool(domain: DomainKind, field: &str, value: &Value) -> ValidationResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| invalid(domain, field, value, "a boolean"))
}

/// Integer in `[min, max]`, given as a JSON integer or an integer string.
pub(crate) fn parse_int_in_range(
    domain: DomainKind,
    field: &str,
    value: &Value,
    min: u32,
    max: u32,
) -> ValidationResult<u32> {
    let parsed = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(raw) => raw.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed
        .filter(|n| (u64::from(min)..=u64::from(max)).contains(n))
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            invalid(
                domain,
                field,
                value,
                format!("an integer between {min} and {max}"),
            )
        })
}

/// `#rgb` or `#rrggbb`, returned as `(r, g, b)`.
pub(crate) fn parse_hex_rgb(raw: &str) -> Option<(u8, u8, u8)> {
    let caps = HEX_COLOR.as_ref()?.captures(raw)?;
    let digits = caps.get(1)?.as_str();
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&expanded[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Trimmed font family name of letters, digits, spaces and hyphens.
pub(crate) fn normalize_font_family(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    FONT_FAMILY
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(trimmed))
        .then(|| trimmed.to_string())
}

/// `<digits>px` → pixel count.
pub(crate) fn parse_pixel_width(raw: &str) -> Option<u32> {
    PIXEL_WIDTH
        .as_ref()?
        .captures(raw.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_and_dotted_keys_flatten_identically() {
        let nested = json!({ "container": { "maxWidth": "1536" } });
        let dotted = json!({ "container.maxWidth": "1536" });
        let a = flatten_patch(DomainKind::Layout, &nested).unwrap();
        let b = flatten_patch(DomainKind::Layout, &dotted).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].0, "container.maxWidth");
    }

    #[test]
    fn flatten_rejects_non_objects_and_nulls() {
        assert_eq!(
            flatten_patch(DomainKind::Theme, &json!("dark")),
            Err(ValidationError::PatchNotObject {
                domain: DomainKind::Theme
            })
        );
        let err = flatten_patch(DomainKind::Theme, &json!({ "colors": { "text": null } }))
            .unwrap_err();
        assert_eq!(err.field(), Some("colors.text"));
    }

    #[test]
    fn int_range_accepts_numbers_and_numeric_strings() {
        let d = DomainKind::Typography;
        assert_eq!(parse_int_in_range(d, "baseFontSize", &json!(16), 12, 20), Ok(16));
        assert_eq!(parse_int_in_range(d, "baseFontSize", &json!("18"), 12, 20), Ok(18));
        let err = parse_int_in_range(d, "baseFontSize", &json!(50), 12, 20).unwrap_err();
        assert!(err.to_string().contains("between 12 and 20"));
        assert!(parse_int_in_range(d, "baseFontSize", &json!(16.5), 12, 20).is_err());
    }

    #[test]
    fn hex_colors_expand_short_form() {
        assert_eq!(parse_hex_rgb("#3B82F6"), Some((0x3b, 0x82, 0xf6)));
        assert_eq!(parse_hex_rgb("#fff"), Some((0xff, 0xff, 0xff)));
        assert_eq!(parse_hex_rgb("3b82f6"), None);
        assert_eq!(parse_hex_rgb("#12345"), None);
        assert_eq!(parse_hex_rgb("#gggggg"), None);
    }

    #[test]
    fn font_families_are_trimmed_and_restricted() {
        assert_eq!(
            normalize_font_family("  Playfair Display "),
            Some("Playfair Display".to_string())
        );
        assert_eq!(normalize_font_family(""), None);
        assert_eq!(normalize_font_family("Comic; drop table"), None);
    }

    #[test]
    fn pixel_widths_require_px_suffix() {
        assert_eq!(parse_pixel_width("768px"), Some(768));
        assert_eq!(parse_pixel_width("768"), None);
        assert_eq!(parse_pixel_width("48rem"), None);
    }
}
