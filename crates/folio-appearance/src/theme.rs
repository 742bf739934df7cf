//! Theme domain: palette presets, custom colors and dark-mode policy.
//!
//! `selectedPreset` and `colors` move together: a non-custom selection always
//! carries exactly that preset's palette.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::choice::Choice;
use crate::domain::{DomainKind, SettingsDomain};
use crate::error::{ValidationError, ValidationResult};
use crate::validate::{flatten_patch, invalid, parse_choice, parse_hex_rgb, unknown};

/// RGB color stored as a normalized lowercase `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    r: u8,
    g: u8,
    b: u8,
}

impl HexColor {
    /// Construct a color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as `(r, g, b)`.
    #[must_use]
    pub const fn channels(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Relative luminance per WCAG 2.x.
    #[must_use]
    pub fn luminance(self) -> f64 {
        fn linear(channel: u8) -> f64 {
            let c = f64::from(channel) / 255.0;
            if c <= 0.039_28 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.0722f64.mul_add(
            linear(self.b),
            0.2126f64.mul_add(linear(self.r), 0.7152 * linear(self.g)),
        )
    }
}

impl Display for HexColor {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_hex_rgb(raw.trim())
            .map(|(r, g, b)| Self::rgb(r, g, b))
            .ok_or_else(|| format!("'{raw}' is not a #rgb or #rrggbb color"))
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

/// The five theme colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Brand color for buttons and links.
    pub primary: HexColor,
    /// Supporting color for secondary surfaces.
    pub secondary: HexColor,
    /// Highlight color.
    pub accent: HexColor,
    /// Page background.
    pub background: HexColor,
    /// Body text.
    pub text: HexColor,
}

impl Palette {
    /// WCAG contrast ratio between text and background.
    #[must_use]
    pub fn text_contrast(&self) -> f64 {
        let (a, b) = (self.text.luminance(), self.background.luminance());
        let (light, dark) = if a > b { (a, b) } else { (b, a) };
        (light + 0.05) / (dark + 0.05)
    }
}

impl Default for Palette {
    fn default() -> Self {
        DEFAULT_PALETTE
    }
}

const DEFAULT_PALETTE: Palette = Palette {
    primary: HexColor::rgb(0x3b, 0x82, 0xf6),
    secondary: HexColor::rgb(0x1e, 0x29, 0x3b),
    accent: HexColor::rgb(0xf5, 0x9e, 0x0b),
    background: HexColor::rgb(0xff, 0xff, 0xff),
    text: HexColor::rgb(0x11, 0x18, 0x27),
};

const DARK_MODE_PALETTE: Palette = Palette {
    primary: HexColor::rgb(0x60, 0xa5, 0xfa),
    secondary: HexColor::rgb(0x94, 0xa3, 0xb8),
    accent: HexColor::rgb(0xf4, 0x72, 0xb6),
    background: HexColor::rgb(0x0f, 0x17, 0x2a),
    text: HexColor::rgb(0xf1, 0xf5, 0xf9),
};

const MINIMAL_PALETTE: Palette = Palette {
    primary: HexColor::rgb(0x11, 0x18, 0x27),
    secondary: HexColor::rgb(0x6b, 0x72, 0x80),
    accent: HexColor::rgb(0x25, 0x63, 0xeb),
    background: HexColor::rgb(0xff, 0xff, 0xff),
    text: HexColor::rgb(0x11, 0x18, 0x27),
};

const OCEAN_PALETTE: Palette = Palette {
    primary: HexColor::rgb(0x0e, 0x74, 0x90),
    secondary: HexColor::rgb(0x03, 0x69, 0xa1),
    accent: HexColor::rgb(0x22, 0xd3, 0xee),
    background: HexColor::rgb(0xf0, 0xf9, 0xff),
    text: HexColor::rgb(0x0c, 0x4a, 0x6e),
};

const SUNSET_PALETTE: Palette = Palette {
    primary: HexColor::rgb(0xea, 0x58, 0x0c),
    secondary: HexColor::rgb(0xbe, 0x12, 0x3c),
    accent: HexColor::rgb(0xfa, 0xcc, 0x15),
    background: HexColor::rgb(0xff, 0xf7, 0xed),
    text: HexColor::rgb(0x43, 0x14, 0x07),
};

const FOREST_PALETTE: Palette = Palette {
    primary: HexColor::rgb(0x15, 0x80, 0x3d),
    secondary: HexColor::rgb(0x3f, 0x62, 0x12),
    accent: HexColor::rgb(0xa1, 0x62, 0x07),
    background: HexColor::rgb(0xf7, 0xfe, 0xe7),
    text: HexColor::rgb(0x14, 0x53, 0x2d),
};

option_set! {
    /// Preset id, or `custom` for hand-edited colors.
    pub enum SelectedPreset {
        Default => "default",
        DarkMode => "dark-mode",
        Minimal => "minimal",
        Ocean => "ocean",
        Sunset => "sunset",
        Forest => "forest",
        Custom => "custom",
    }
    default Default
}

impl SelectedPreset {
    /// Palette table for a preset; `None` for `custom`.
    #[must_use]
    pub const fn palette(self) -> Option<Palette> {
        match self {
            Self::Default => Some(DEFAULT_PALETTE),
            Self::DarkMode => Some(DARK_MODE_PALETTE),
            Self::Minimal => Some(MINIMAL_PALETTE),
            Self::Ocean => Some(OCEAN_PALETTE),
            Self::Sunset => Some(SUNSET_PALETTE),
            Self::Forest => Some(FOREST_PALETTE),
            Self::Custom => None,
        }
    }

    /// Display name for pickers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::DarkMode => "Dark Mode",
            Self::Minimal => "Minimal",
            Self::Ocean => "Ocean",
            Self::Sunset => "Sunset",
            Self::Forest => "Forest",
            Self::Custom => "Custom",
        }
    }

    /// Every real preset (excludes `custom`).
    pub fn presets() -> impl Iterator<Item = Self> {
        Self::ALL.iter().copied().filter(|p| *p != Self::Custom)
    }
}

option_set! {
    /// Dark-mode policy for the public site.
    pub enum DarkModePolicy {
        Disabled => "disabled",
        Light => "light",
        Dark => "dark",
        Auto => "auto",
    }
    default Light
}

/// Dark-mode settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DarkModeSettings {
    /// Active policy.
    pub mode: DarkModePolicy,
}

/// Theme domain snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct ThemeConfig {
    /// Preset the palette came from, or `custom`.
    pub selected_preset: SelectedPreset,
    /// Active palette.
    pub colors: Palette,
    /// Dark-mode settings.
    pub dark_mode: DarkModeSettings,
}

impl ThemeConfig {
    /// Select a preset and overwrite the palette from its table in one step.
    ///
    /// `custom` only relabels the current palette.
    pub fn select(&mut self, preset: SelectedPreset) {
        if let Some(palette) = preset.palette() {
            self.colors = palette;
        }
        self.selected_preset = preset;
    }

    /// Whether the selection and the palette agree.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.selected_preset
            .palette()
            .is_none_or(|palette| palette == self.colors)
    }

    fn color_slot(&mut self, name: &str) -> Option<&mut HexColor> {
        match name {
            "primary" => Some(&mut self.colors.primary),
            "secondary" => Some(&mut self.colors.secondary),
            "accent" => Some(&mut self.colors.accent),
            "background" => Some(&mut self.colors.background),
            "text" => Some(&mut self.colors.text),
            _ => None,
        }
    }
}

fn parse_color(field: &str, value: &Value) -> ValidationResult<HexColor> {
    value
        .as_str()
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| invalid(DomainKind::Theme, field, value, "a #rgb or #rrggbb hex color"))
}

impl TryFrom<Value> for ThemeConfig {
    type Error = ValidationError;

    fn try_from(document: Value) -> Result<Self, Self::Error> {
        Self::from_document(&document)
    }
}

impl SettingsDomain for ThemeConfig {
    const KIND: DomainKind = DomainKind::Theme;

    fn apply_field(&mut self, field: &str, value: &Value) -> ValidationResult<()> {
        let kind = Self::KIND;
        if let Some(name) = field.strip_prefix("colors.") {
            let color = parse_color(field, value)?;
            let slot = self.color_slot(name).ok_or_else(|| unknown(kind, field))?;
            *slot = color;
            self.selected_preset = SelectedPreset::Custom;
            return Ok(());
        }
        match field {
            "selectedPreset" => self.select(parse_choice(kind, field, value)?),
            "darkMode.mode" => self.dark_mode.mode = parse_choice(kind, field, value)?,
            other => return Err(unknown(kind, other)),
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: &Value) -> ValidationResult<()> {
        let fields = flatten_patch(Self::KIND, patch)?;
        let requested = fields
            .iter()
            .find(|(field, _)| field == "selectedPreset")
            .map(|(field, value)| parse_choice::<SelectedPreset>(Self::KIND, field, value))
            .transpose()?;

        if let Some(preset) = requested {
            self.select(preset);
        }
        for (field, value) in &fields {
            if field != "selectedPreset" {
                self.apply_field(field, value)?;
            }
        }
        // A preset application whose colors still match the table keeps its id.
        if let Some(preset) = requested.filter(|p| p.palette() == Some(self.colors)) {
            self.selected_preset = preset;
        }
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_theme_is_the_default_preset() {
        let theme = ThemeConfig::default();
        assert_eq!(theme.selected_preset, SelectedPreset::Default);
        assert_eq!(Some(theme.colors), SelectedPreset::Default.palette());
        assert_eq!(theme.dark_mode.mode, DarkModePolicy::Light);
        assert!(theme.is_consistent());
    }

    #[test]
    fn deserialized_themes_are_always_consistent() {
        let theme: ThemeConfig = serde_json::from_value(json!({
            "selectedPreset": "ocean",
            "colors": serde_json::to_value(DEFAULT_PALETTE).unwrap(),
        }))
        .unwrap();
        assert!(theme.is_consistent());
        assert_eq!(theme.selected_preset, SelectedPreset::Custom);
        assert_eq!(theme.colors, DEFAULT_PALETTE);

        let ocean: ThemeConfig = serde_json::from_value(json!({ "selectedPreset": "ocean" })).unwrap();
        assert_eq!(ocean.colors, OCEAN_PALETTE);
        assert!(serde_json::from_value::<ThemeConfig>(json!({ "selectedPreset": "neon" })).is_err());
    }

    #[test]
    fn color_edits_switch_to_custom() {
        let mut theme = ThemeConfig::default();
        theme
            .apply_patch(&json!({ "colors": { "primary": "#FF0000" } }))
            .unwrap();
        assert_eq!(theme.selected_preset, SelectedPreset::Custom);
        assert_eq!(theme.colors.primary.to_string(), "#ff0000");
        assert_eq!(theme.colors.text, DEFAULT_PALETTE.text);
    }

    #[test]
    fn preset_patch_overwrites_every_color() {
        let mut theme = ThemeConfig::default();
        theme
            .apply_patch(&json!({ "colors": { "accent": "#000" } }))
            .unwrap();
        theme
            .apply_patch(&json!({ "selectedPreset": "ocean" }))
            .unwrap();
        assert_eq!(theme.selected_preset, SelectedPreset::Ocean);
        assert_eq!(theme.colors, OCEAN_PALETTE);
    }

    #[test]
    fn preset_with_divergent_colors_becomes_custom() {
        let mut theme = ThemeConfig::default();
        theme
            .apply_patch(&json!({
                "selectedPreset": "forest",
                "colors": { "background": "#123456" }
            }))
            .unwrap();
        assert_eq!(theme.selected_preset, SelectedPreset::Custom);
        assert_eq!(theme.colors.primary, FOREST_PALETTE.primary);
        assert_eq!(theme.colors.background.to_string(), "#123456");
        assert!(theme.is_consistent());
    }

    #[test]
    fn full_preset_application_keeps_its_id() {
        let mut theme = ThemeConfig::default();
        let forest = serde_json::to_value(FOREST_PALETTE).unwrap();
        theme
            .apply_patch(&json!({ "selectedPreset": "forest", "colors": forest }))
            .unwrap();
        assert_eq!(theme.selected_preset, SelectedPreset::Forest);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut theme = ThemeConfig::default();
        let err = theme
            .apply_patch(&json!({ "selectedPreset": "neon" }))
            .unwrap_err();
        assert_eq!(err.field(), Some("selectedPreset"));
        let err = theme
            .apply_patch(&json!({ "colors": { "primary": "blue" } }))
            .unwrap_err();
        assert_eq!(err.field(), Some("colors.primary"));
        let err = theme
            .apply_patch(&json!({ "colors": { "muted": "#fff" } }))
            .unwrap_err();
        assert_eq!(err.field(), Some("colors.muted"));
        let err = theme
            .apply_patch(&json!({ "darkMode": { "mode": "night" } }))
            .unwrap_err();
        assert_eq!(err.field(), Some("darkMode.mode"));
    }

    #[test]
    fn tampered_stored_theme_is_made_consistent() {
        let stored = json!({
            "selectedPreset": "sunset",
            "colors": { "primary": "#000000" },
            "darkMode": { "mode": "auto" }
        });
        let theme = ThemeConfig::from_stored(&stored);
        assert!(theme.is_consistent());
        assert_eq!(theme.dark_mode.mode, DarkModePolicy::Auto);
    }

    #[test]
    fn presets_have_readable_contrast() {
        for preset in SelectedPreset::presets() {
            let palette = preset.palette().unwrap();
            assert!(
                palette.text_contrast() >= 4.5,
                "{preset} text contrast too low"
            );
        }
    }
}
