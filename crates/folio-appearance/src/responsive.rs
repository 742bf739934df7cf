//! Responsive domain: breakpoints, small-screen navigation and visibility.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{DomainKind, SettingsDomain};
use crate::error::{ValidationError, ValidationResult};
use crate::validate::{invalid, parse_bool, parse_choice, parse_pixel_width, unknown};

/// Smallest accepted breakpoint width.
pub const MIN_BREAKPOINT_PX: u32 = 240;
/// Largest accepted breakpoint width.
pub const MAX_BREAKPOINT_PX: u32 = 3840;

/// Viewport width serialized as `"<n>px"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Breakpoint(u32);

impl Breakpoint {
    /// Construct a breakpoint, enforcing the accepted pixel range.
    #[must_use]
    pub const fn new(px: u32) -> Option<Self> {
        if px >= MIN_BREAKPOINT_PX && px <= MAX_BREAKPOINT_PX {
            Some(Self(px))
        } else {
            None
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn px(self) -> u32 {
        self.0
    }
}

impl Display for Breakpoint {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}px", self.0)
    }
}

impl FromStr for Breakpoint {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_pixel_width(raw).and_then(Self::new).ok_or_else(|| {
            format!("'{raw}' is not a pixel width between {MIN_BREAKPOINT_PX}px and {MAX_BREAKPOINT_PX}px")
        })
    }
}

impl TryFrom<String> for Breakpoint {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Breakpoint> for String {
    fn from(breakpoint: Breakpoint) -> Self {
        breakpoint.to_string()
    }
}

/// Device breakpoints, strictly ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Breakpoints {
    /// Upper bound of the mobile class.
    pub mobile: Breakpoint,
    /// Upper bound of the tablet class.
    pub tablet: Breakpoint,
    /// Width from which desktop layouts apply.
    pub desktop: Breakpoint,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            mobile: Breakpoint(640),
            tablet: Breakpoint(768),
            desktop: Breakpoint(1024),
        }
    }
}

option_set! {
    /// Navigation pattern used on small screens.
    pub enum NavigationStyle {
        Hamburger => "hamburger",
        Bottom => "bottom",
        Minimal => "minimal",
    }
    default Hamburger
}

option_set! {
    /// How content blocks flow on small screens.
    pub enum LayoutStyle {
        Stacked => "stacked",
        Grid => "grid",
        Masonry => "masonry",
    }
    default Stacked
}

option_set! {
    /// Font scaling applied on small screens.
    pub enum FontSizeAdjustment {
        NoChange => "no-change",
        ScaleDown => "scale-down",
        ScaleUp => "scale-up",
    }
    default NoChange
}

impl FontSizeAdjustment {
    /// Multiplier applied to font sizes on mobile.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::NoChange => 1.0,
            Self::ScaleDown => 0.875,
            Self::ScaleUp => 1.125,
        }
    }
}

/// Elements toggled on small screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementVisibility {
    /// Render the hero image.
    pub show_hero_image: bool,
    /// Render the sidebar.
    pub show_sidebar: bool,
    /// Play entrance and hover animations.
    pub enable_animations: bool,
}

impl Default for ElementVisibility {
    fn default() -> Self {
        Self {
            show_hero_image: true,
            show_sidebar: false,
            enable_animations: true,
        }
    }
}

/// Responsive domain snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct ResponsiveConfig {
    /// Device breakpoints.
    pub breakpoints: Breakpoints,
    /// Small-screen navigation pattern.
    pub navigation_style: NavigationStyle,
    /// Small-screen content flow.
    pub layout_style: LayoutStyle,
    /// Small-screen element toggles.
    pub element_visibility: ElementVisibility,
    /// Small-screen font scaling.
    pub font_size_adjustment: FontSizeAdjustment,
}

fn parse_breakpoint(field: &str, value: &Value) -> ValidationResult<Breakpoint> {
    value
        .as_str()
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| {
            invalid(
                DomainKind::Responsive,
                field,
                value,
                format!("a \"<n>px\" width between {MIN_BREAKPOINT_PX} and {MAX_BREAKPOINT_PX}"),
            )
        })
}

impl TryFrom<Value> for ResponsiveConfig {
    type Error = ValidationError;

    fn try_from(document: Value) -> Result<Self, Self::Error> {
        Self::from_document(&document)
    }
}

impl SettingsDomain for ResponsiveConfig {
    const KIND: DomainKind = DomainKind::Responsive;

    fn apply_field(&mut self, field: &str, value: &Value) -> ValidationResult<()> {
        let kind = Self::KIND;
        match field {
            "breakpoints.mobile" => self.breakpoints.mobile = parse_breakpoint(field, value)?,
            "breakpoints.tablet" => self.breakpoints.tablet = parse_breakpoint(field, value)?,
            "breakpoints.desktop" => self.breakpoints.desktop = parse_breakpoint(field, value)?,
            "navigationStyle" => self.navigation_style = parse_choice(kind, field, value)?,
            "layoutStyle" => self.layout_style = parse_choice(kind, field, value)?,
            "elementVisibility.showHeroImage" => {
                self.element_visibility.show_hero_image = parse_bool(kind, field, value)?;
            }
            "elementVisibility.showSidebar" => {
                self.element_visibility.show_sidebar = parse_bool(kind, field, value)?;
            }
            "elementVisibility.enableAnimations" => {
                self.element_visibility.enable_animations = parse_bool(kind, field, value)?;
            }
            "fontSizeAdjustment" => self.font_size_adjustment = parse_choice(kind, field, value)?,
            other => return Err(unknown(kind, other)),
        }
        Ok(())
    }

    fn check(&self) -> ValidationResult<()> {
        let Breakpoints {
            mobile,
            tablet,
            desktop,
        } = self.breakpoints;
        if tablet <= mobile {
            return Err(invalid(
                Self::KIND,
                "breakpoints.tablet",
                &Value::String(tablet.to_string()),
                format!("a width greater than the mobile breakpoint ({mobile})"),
            ));
        }
        if desktop <= tablet {
            return Err(invalid(
                Self::KIND,
                "breakpoints.desktop",
                &Value::String(desktop.to_string()),
                format!("a width greater than the tablet breakpoint ({tablet})"),
            ));
        }
        Ok(())
    }
}
