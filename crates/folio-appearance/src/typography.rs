//! Typography domain: font families, scale, weights and link styling.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::choice::Choice;
use crate::domain::{DomainKind, SettingsDomain};
use crate::error::{ValidationError, ValidationResult};
use crate::validate::{invalid, normalize_font_family, parse_choice, parse_int_in_range, unknown};

/// Smallest accepted base font size in pixels.
pub const MIN_BASE_FONT_SIZE: u32 = 12;
/// Largest accepted base font size in pixels.
pub const MAX_BASE_FONT_SIZE: u32 = 20;
const DEFAULT_BASE_FONT_SIZE: u32 = 16;

/// Trimmed font family name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FontFamily(String);

impl FontFamily {
    /// Validate and normalize a family name.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        normalize_font_family(raw).map(Self)
    }

    /// Normalized family name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FontFamily {
    fn default() -> Self {
        Self("Inter".to_string())
    }
}

impl Display for FontFamily {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl TryFrom<String> for FontFamily {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("'{value}' is not a valid font family name"))
    }
}

impl From<FontFamily> for String {
    fn from(family: FontFamily) -> Self {
        family.0
    }
}

option_set! {
    /// Ratio between consecutive heading levels.
    pub enum HeadingScale {
        Compact => "compact",
        Standard => "standard",
        Relaxed => "relaxed",
    }
    default Standard
}

impl HeadingScale {
    /// Size multiplier between adjacent heading levels.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Compact => 1.1,
            Self::Standard => 1.2,
            Self::Relaxed => 1.3,
        }
    }
}

option_set! {
    /// Body line height.
    pub enum LineHeight {
        Compact => "compact",
        Normal => "normal",
        Relaxed => "relaxed",
    }
    default Normal
}

impl LineHeight {
    /// Unitless CSS `line-height`.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Compact => 1.3,
            Self::Normal => 1.5,
            Self::Relaxed => 1.7,
        }
    }
}

option_set! {
    /// Space between paragraphs in `em`.
    pub enum ParagraphSpacing {
        Compact => "compact",
        Normal => "normal",
        Relaxed => "relaxed",
    }
    default Normal
}

impl ParagraphSpacing {
    /// Margin after each paragraph, in `em`.
    #[must_use]
    pub const fn em(self) -> f64 {
        match self {
            Self::Compact => 1.2,
            Self::Normal => 1.5,
            Self::Relaxed => 2.0,
        }
    }
}

numeric_option_set! {
    /// Font weight for headings.
    pub enum HeadingWeight: weight { W500 = 500, W600 = 600, W700 = 700 }
    default W700
}

numeric_option_set! {
    /// Font weight for body text.
    pub enum BodyWeight: weight { W300 = 300, W400 = 400, W500 = 500 }
    default W400
}

option_set! {
    /// Letter case applied to headings.
    pub enum HeadingCase {
        Normal => "normal",
        Uppercase => "uppercase",
        Capitalize => "capitalize",
    }
    default Normal
}

impl HeadingCase {
    /// CSS `text-transform` value.
    #[must_use]
    pub const fn text_transform(self) -> &'static str {
        match self {
            Self::Normal => "none",
            Self::Uppercase => "uppercase",
            Self::Capitalize => "capitalize",
        }
    }
}

option_set! {
    /// Decoration of inline links at rest.
    pub enum LinkStyle {
        Underline => "underline",
        None => "none",
        Dotted => "dotted",
    }
    default Underline
}

option_set! {
    /// Link treatment on hover.
    pub enum LinkHoverEffect {
        Darken => "darken",
        Lighten => "lighten",
        Underline => "underline",
    }
    default Darken
}

option_set! {
    /// Curated heading/body font combinations.
    pub enum FontPair {
        Modern => "modern",
        Classic => "classic",
        Technical => "technical",
        Elegant => "elegant",
        Friendly => "friendly",
    }
}

impl FontPair {
    /// `(heading, body)` family names.
    #[must_use]
    pub const fn families(self) -> (&'static str, &'static str) {
        match self {
            Self::Modern => ("Inter", "Inter"),
            Self::Classic => ("Playfair Display", "Source Sans Pro"),
            Self::Technical => ("JetBrains Mono", "IBM Plex Sans"),
            Self::Elegant => ("Cormorant Garamond", "Lato"),
            Self::Friendly => ("Poppins", "Open Sans"),
        }
    }

    /// Display name for catalogs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Modern => "Modern",
            Self::Classic => "Classic",
            Self::Technical => "Technical",
            Self::Elegant => "Elegant",
            Self::Friendly => "Friendly",
        }
    }

    /// Every pair, in catalog order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::ALL.iter().copied()
    }
}

/// Typography domain snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct TypographyConfig {
    /// Family used for `h1` through `h6`.
    pub heading_font: FontFamily,
    /// Family used for body copy.
    pub body_font: FontFamily,
    /// Body size in pixels, within the inclusive 12..=20 range.
    pub base_font_size: u32,
    /// Ratio between heading levels.
    pub heading_scale: HeadingScale,
    /// Body line height.
    pub line_height: LineHeight,
    /// Heading font weight.
    pub heading_weight: HeadingWeight,
    /// Heading letter case.
    pub heading_case: HeadingCase,
    /// Body font weight.
    pub body_weight: BodyWeight,
    /// Space after paragraphs.
    pub paragraph_spacing: ParagraphSpacing,
    /// Link decoration at rest.
    pub link_style: LinkStyle,
    /// Link treatment on hover.
    pub link_hover_effect: LinkHoverEffect,
}

impl Default for TypographyConfig {
    fn default() -> Self {
        Self {
            heading_font: FontFamily::default(),
            body_font: FontFamily::default(),
            base_font_size: DEFAULT_BASE_FONT_SIZE,
            heading_scale: HeadingScale::default(),
            line_height: LineHeight::default(),
            heading_weight: HeadingWeight::default(),
            heading_case: HeadingCase::default(),
            body_weight: BodyWeight::default(),
            paragraph_spacing: ParagraphSpacing::default(),
            link_style: LinkStyle::default(),
            link_hover_effect: LinkHoverEffect::default(),
        }
    }
}

impl TypographyConfig {
    /// Set both families from a curated pair.
    pub fn use_pair(&mut self, pair: FontPair) {
        let (heading, body) = pair.families();
        self.heading_font = FontFamily(heading.to_string());
        self.body_font = FontFamily(body.to_string());
    }

    /// The curated pair the current families match, if any.
    #[must_use]
    pub fn matching_pair(&self) -> Option<FontPair> {
        FontPair::all().find(|pair| {
            pair.families() == (self.heading_font.as_str(), self.body_font.as_str())
        })
    }
}

fn parse_family(field: &str, value: &Value) -> ValidationResult<FontFamily> {
    value.as_str().and_then(FontFamily::new).ok_or_else(|| {
        invalid(
            DomainKind::Typography,
            field,
            value,
            "a font family name of 1-64 letters, digits, spaces or hyphens",
        )
    })
}

impl TryFrom<Value> for TypographyConfig {
    type Error = ValidationError;

    fn try_from(document: Value) -> Result<Self, Self::Error> {
        Self::from_document(&document)
    }
}

impl SettingsDomain for TypographyConfig {
    const KIND: DomainKind = DomainKind::Typography;

    fn apply_field(&mut self, field: &str, value: &Value) -> ValidationResult<()> {
        let kind = Self::KIND;
        match field {
            "headingFont" => self.heading_font = parse_family(field, value)?,
            "bodyFont" => self.body_font = parse_family(field, value)?,
            "baseFontSize" => {
                self.base_font_size =
                    parse_int_in_range(kind, field, value, MIN_BASE_FONT_SIZE, MAX_BASE_FONT_SIZE)?;
            }
            "headingScale" => self.heading_scale = parse_choice(kind, field, value)?,
            "lineHeight" => self.line_height = parse_choice(kind, field, value)?,
            "headingWeight" => self.heading_weight = parse_choice(kind, field, value)?,
            "headingCase" => self.heading_case = parse_choice(kind, field, value)?,
            "bodyWeight" => self.body_weight = parse_choice(kind, field, value)?,
            "paragraphSpacing" => self.paragraph_spacing = parse_choice(kind, field, value)?,
            "linkStyle" => self.link_style = parse_choice(kind, field, value)?,
            "linkHoverEffect" => self.link_hover_effect = parse_choice(kind, field, value)?,
            other => return Err(unknown(kind, other)),
        }
        Ok(())
    }
}
