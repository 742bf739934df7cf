//! Preview Renderer: a pure mapping from [`EffectiveConfig`] to a visual
//! description.
//!
//! Everything here is a function of its input; rendering the same
//! configuration twice yields equal descriptions.

use serde::Serialize;

use crate::aggregator::EffectiveConfig;
use crate::layout::{ColumnCount, ColumnSpan, MaxWidth};
use crate::responsive::LayoutStyle;
use crate::theme::{DarkModePolicy, Palette, SelectedPreset};
use crate::typography::{HeadingScale, LinkStyle};

/// Heading levels shown in the preview, largest first.
pub const HEADING_LEVELS: [u8; 3] = [1, 2, 3];

/// Size in pixels of heading `level`: `base × scale^(4 - level)`.
#[must_use]
pub fn heading_size(base_font_size: u32, scale: HeadingScale, level: u8) -> f64 {
    let exponent = 4 - i32::from(level);
    f64::from(base_font_size) * scale.factor().powi(exponent)
}

/// Categorical rendering hint for the container width.
#[must_use]
pub const fn width_hint(max_width: MaxWidth) -> &'static str {
    match max_width {
        MaxWidth::W1024 => "3/4 width",
        MaxWidth::W1280 => "5/6 width",
        MaxWidth::W1536 => "11/12 width",
        MaxWidth::W1920 => "full width",
    }
}

/// Grid items that fit in one row when each spans `span` columns.
#[must_use]
pub fn items_per_row(columns: ColumnCount, span: ColumnSpan) -> u32 {
    let columns = columns.columns();
    (columns / span.columns().min(columns)).max(1)
}

/// Color scheme the preview renders in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Light surfaces.
    Light,
    /// Dark surfaces.
    Dark,
    /// Follows the visitor's system preference.
    System,
}

impl From<DarkModePolicy> for ColorScheme {
    fn from(policy: DarkModePolicy) -> Self {
        match policy {
            DarkModePolicy::Disabled | DarkModePolicy::Light => Self::Light,
            DarkModePolicy::Dark => Self::Dark,
            DarkModePolicy::Auto => Self::System,
        }
    }
}

/// Device class a viewport preview stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Phones, up to the mobile breakpoint.
    Mobile,
    /// Tablets, up to the tablet breakpoint.
    Tablet,
    /// Everything from the desktop breakpoint up.
    Desktop,
}

impl Device {
    /// Every device class, smallest first.
    pub const ALL: [Self; 3] = [Self::Mobile, Self::Tablet, Self::Desktop];

    /// Lowercase device name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }
}

/// Full visual description of an effective configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewDescription {
    /// Container sizing.
    pub container: ContainerPreview,
    /// Column grid.
    pub grid: GridPreview,
    /// Section spacing.
    pub spacing: SpacingPreview,
    /// Palette and scheme.
    pub colors: ColorPreview,
    /// Type specimen.
    pub typography: TypographyPreview,
    /// One entry per device class, smallest first.
    pub viewports: Vec<ViewportPreview>,
}

/// Container sizing as rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPreview {
    /// Maximum width in pixels.
    pub max_width_px: u32,
    /// Categorical width hint, e.g. `5/6 width`.
    pub width_hint: &'static str,
    /// Side padding in pixels.
    pub side_padding_px: u32,
}

/// Column grid as rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPreview {
    /// Total columns.
    pub columns: u32,
    /// Gutter in pixels.
    pub gap_px: u32,
    /// Items that fit in one row per device class.
    pub items_per_row: DeviceValues,
    /// Whether nested grids are drawn.
    pub nested: bool,
}

/// One number per device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceValues {
    /// Desktop value.
    pub desktop: u32,
    /// Tablet value.
    pub tablet: u32,
    /// Mobile value.
    pub mobile: u32,
}

/// Section spacing as rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingPreview {
    /// Gap between sections in pixels.
    pub section_gap_px: u32,
    /// Spacing between content blocks in pixels.
    pub content_spacing_px: u32,
    /// Top and bottom section padding in pixels.
    pub section_padding_vertical_px: u32,
    /// Left and right section padding in pixels.
    pub section_padding_horizontal_px: u32,
    /// Whether spacing shrinks on small viewports.
    pub auto_adjust: bool,
}

/// Palette swatches and scheme.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorPreview {
    /// Preset label shown above the swatches.
    pub preset: SelectedPreset,
    /// Swatch colors.
    pub palette: Palette,
    /// Scheme the page renders in.
    pub scheme: ColorScheme,
    /// Text against background contrast ratio.
    pub text_contrast: f64,
}

/// One heading in the type specimen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingPreview {
    /// Heading level, 1 being largest.
    pub level: u8,
    /// Rendered size in pixels.
    pub size_px: f64,
    /// Font weight.
    pub weight: u32,
    /// CSS `text-transform` value.
    pub text_transform: &'static str,
}

/// Type specimen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyPreview {
    /// Heading family.
    pub heading_font: String,
    /// Body family.
    pub body_font: String,
    /// Body size in pixels.
    pub body_size_px: f64,
    /// Body font weight.
    pub body_weight: u32,
    /// Headings, largest first.
    pub headings: Vec<HeadingPreview>,
    /// Unitless line height.
    pub line_height: f64,
    /// Paragraph spacing in `em`.
    pub paragraph_spacing_em: f64,
    /// CSS `text-decoration` for links at rest.
    pub link_decoration: &'static str,
    /// Hover treatment token.
    pub link_hover: &'static str,
    /// Whether type scales fluidly.
    pub fluid: bool,
}

/// How the page renders on one device class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportPreview {
    /// Device class.
    pub device: Device,
    /// Representative viewport width in pixels.
    pub width_px: u32,
    /// Navigation pattern token.
    pub navigation: &'static str,
    /// Content flow token.
    pub layout: &'static str,
    /// Hero image visible.
    pub show_hero_image: bool,
    /// Sidebar visible.
    pub show_sidebar: bool,
    /// Animations enabled.
    pub enable_animations: bool,
    /// Multiplier applied to font sizes.
    pub font_scale: f64,
    /// Body size after scaling, in pixels.
    pub body_size_px: f64,
}

/// Describe how `config` renders.
#[must_use]
pub fn render(config: &EffectiveConfig) -> PreviewDescription {
    PreviewDescription {
        container: render_container(config),
        grid: render_grid(config),
        spacing: render_spacing(config),
        colors: render_colors(config),
        typography: render_typography(config),
        viewports: Device::ALL
            .iter()
            .map(|device| render_viewport(config, *device))
            .collect(),
    }
}

fn render_container(config: &EffectiveConfig) -> ContainerPreview {
    let container = &config.layout.container;
    ContainerPreview {
        max_width_px: container.max_width.px(),
        width_hint: width_hint(container.max_width),
        side_padding_px: container.side_padding.px(),
    }
}

fn render_grid(config: &EffectiveConfig) -> GridPreview {
    let grid = &config.layout.grid;
    let per_row = |span| items_per_row(grid.column_count, span);
    GridPreview {
        columns: grid.column_count.columns(),
        gap_px: grid.column_gap.px(),
        items_per_row: DeviceValues {
            desktop: per_row(grid.column_spans.desktop),
            tablet: per_row(grid.column_spans.tablet),
            mobile: per_row(grid.column_spans.mobile),
        },
        nested: config.layout.advanced.nested_grid_support,
    }
}

fn render_spacing(config: &EffectiveConfig) -> SpacingPreview {
    let spacing = &config.layout.spacing;
    SpacingPreview {
        section_gap_px: spacing.section_gap.px(),
        content_spacing_px: spacing.content_spacing.px(),
        section_padding_vertical_px: spacing.section_padding.vertical.px(),
        section_padding_horizontal_px: spacing.section_padding.horizontal.px(),
        auto_adjust: config.layout.advanced.auto_adjust_spacing,
    }
}

fn render_colors(config: &EffectiveConfig) -> ColorPreview {
    let theme = &config.theme;
    ColorPreview {
        preset: theme.selected_preset,
        palette: theme.colors,
        scheme: theme.dark_mode.mode.into(),
        text_contrast: theme.colors.text_contrast(),
    }
}

fn render_typography(config: &EffectiveConfig) -> TypographyPreview {
    let typography = &config.typography;
    let headings = HEADING_LEVELS
        .iter()
        .map(|level| HeadingPreview {
            level: *level,
            size_px: heading_size(typography.base_font_size, typography.heading_scale, *level),
            weight: typography.heading_weight.weight(),
            text_transform: typography.heading_case.text_transform(),
        })
        .collect();
    TypographyPreview {
        heading_font: typography.heading_font.to_string(),
        body_font: typography.body_font.to_string(),
        body_size_px: f64::from(typography.base_font_size),
        body_weight: typography.body_weight.weight(),
        headings,
        line_height: typography.line_height.factor(),
        paragraph_spacing_em: typography.paragraph_spacing.em(),
        link_decoration: match typography.link_style {
            LinkStyle::Underline => "underline",
            LinkStyle::None => "none",
            LinkStyle::Dotted => "underline dotted",
        },
        link_hover: typography.link_hover_effect.as_str(),
        fluid: config.layout.advanced.fluid_typography,
    }
}

fn render_viewport(config: &EffectiveConfig, device: Device) -> ViewportPreview {
    let responsive = &config.responsive;
    let visibility = &responsive.element_visibility;
    let (width, navigation, layout, font_scale) = match device {
        Device::Mobile => (
            responsive.breakpoints.mobile,
            responsive.navigation_style.as_str(),
            responsive.layout_style.as_str(),
            responsive.font_size_adjustment.factor(),
        ),
        Device::Tablet => (
            responsive.breakpoints.tablet,
            responsive.navigation_style.as_str(),
            LayoutStyle::Grid.as_str(),
            1.0,
        ),
        Device::Desktop => (responsive.breakpoints.desktop, "full", LayoutStyle::Grid.as_str(), 1.0),
    };
    ViewportPreview {
        device,
        width_px: width.px(),
        navigation,
        layout,
        show_hero_image: visibility.show_hero_image,
        show_sidebar: visibility.show_sidebar && device != Device::Mobile,
        enable_animations: visibility.enable_animations,
        font_scale,
        body_size_px: f64::from(config.typography.base_font_size) * font_scale,
    }
}
