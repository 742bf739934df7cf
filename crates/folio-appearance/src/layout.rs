//! Layout domain: container, grid, spacing and advanced layout switches.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{DomainKind, SettingsDomain};
use crate::error::{ValidationError, ValidationResult};
use crate::validate::{parse_bool, parse_choice, unknown};

numeric_option_set! {
    /// Maximum content container width in pixels.
    pub enum MaxWidth: px { W1024 = 1024, W1280 = 1280, W1536 = 1536, W1920 = 1920 }
    default W1280
}

numeric_option_set! {
    /// Horizontal padding inside the container.
    pub enum SidePadding: px { P16 = 16, P24 = 24, P32 = 32, P48 = 48 }
    default P24
}

numeric_option_set! {
    /// Number of grid columns.
    pub enum ColumnCount: columns { Six = 6, Twelve = 12, Sixteen = 16 }
    default Twelve
}

numeric_option_set! {
    /// Gutter between grid columns.
    pub enum ColumnGap: px { G16 = 16, G24 = 24, G32 = 32 }
    default G24
}

numeric_option_set! {
    /// Columns an item spans on one device class.
    pub enum ColumnSpan: columns { One = 1, Two = 2, Three = 3, Four = 4, Six = 6, Twelve = 12 }
    default Twelve
}

numeric_option_set! {
    /// Vertical gap between page sections.
    pub enum SectionGap: px { G32 = 32, G64 = 64, G96 = 96, G128 = 128 }
    default G64
}

numeric_option_set! {
    /// Spacing between content blocks inside a section.
    pub enum ContentSpacing: px { S16 = 16, S24 = 24, S32 = 32, S48 = 48 }
    default S24
}

numeric_option_set! {
    /// Section padding along the vertical axis.
    pub enum VerticalPadding: px { P32 = 32, P48 = 48, P64 = 64, P96 = 96 }
    default P64
}

numeric_option_set! {
    /// Section padding along the horizontal axis.
    pub enum HorizontalPadding: px { P16 = 16, P24 = 24, P32 = 32, P48 = 48 }
    default P24
}

/// Layout domain snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct LayoutConfig {
    /// Content container sizing.
    pub container: ContainerSettings,
    /// Column grid.
    pub grid: GridSettings,
    /// Section and content spacing.
    pub spacing: SpacingSettings,
    /// Advanced layout switches.
    pub advanced: AdvancedLayout,
}

/// Content container sizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSettings {
    /// Maximum container width.
    pub max_width: MaxWidth,
    /// Horizontal padding inside the container.
    pub side_padding: SidePadding,
}

/// Column grid settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSettings {
    /// Total columns in the grid.
    pub column_count: ColumnCount,
    /// Gutter between columns.
    pub column_gap: ColumnGap,
    /// Columns a content item spans per device class.
    pub column_spans: ColumnSpans,
}

/// Per-device column spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpans {
    /// Span on desktop viewports.
    pub desktop: ColumnSpan,
    /// Span on tablet viewports.
    pub tablet: ColumnSpan,
    /// Span on mobile viewports.
    pub mobile: ColumnSpan,
}

impl Default for ColumnSpans {
    fn default() -> Self {
        Self {
            desktop: ColumnSpan::Four,
            tablet: ColumnSpan::Six,
            mobile: ColumnSpan::Twelve,
        }
    }
}

/// Section and content spacing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingSettings {
    /// Gap between page sections.
    pub section_gap: SectionGap,
    /// Spacing between blocks inside a section.
    pub content_spacing: ContentSpacing,
    /// Padding inside each section.
    pub section_padding: SectionPadding,
}

/// Padding inside each section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPadding {
    /// Top and bottom padding.
    pub vertical: VerticalPadding,
    /// Left and right padding.
    pub horizontal: HorizontalPadding,
}

/// Advanced layout switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedLayout {
    /// Shrink spacing on smaller viewports.
    pub auto_adjust_spacing: bool,
    /// Scale type smoothly with the viewport.
    pub fluid_typography: bool,
    /// Allow grids inside grid items.
    pub nested_grid_support: bool,
}

impl Default for AdvancedLayout {
    fn default() -> Self {
        Self {
            auto_adjust_spacing: true,
            fluid_typography: false,
            nested_grid_support: false,
        }
    }
}

impl TryFrom<Value> for LayoutConfig {
    type Error = ValidationError;

    fn try_from(document: Value) -> Result<Self, Self::Error> {
        Self::from_document(&document)
    }
}

impl SettingsDomain for LayoutConfig {
    const KIND: DomainKind = DomainKind::Layout;

    fn apply_field(&mut self, field: &str, value: &Value) -> ValidationResult<()> {
        let kind = Self::KIND;
        match field {
            "container.maxWidth" => self.container.max_width = parse_choice(kind, field, value)?,
            "container.sidePadding" => {
                self.container.side_padding = parse_choice(kind, field, value)?;
            }
            "grid.columnCount" => self.grid.column_count = parse_choice(kind, field, value)?,
            "grid.columnGap" => self.grid.column_gap = parse_choice(kind, field, value)?,
            "grid.columnSpans.desktop" => {
                self.grid.column_spans.desktop = parse_choice(kind, field, value)?;
            }
            "grid.columnSpans.tablet" => {
                self.grid.column_spans.tablet = parse_choice(kind, field, value)?;
            }
            "grid.columnSpans.mobile" => {
                self.grid.column_spans.mobile = parse_choice(kind, field, value)?;
            }
            "spacing.sectionGap" => self.spacing.section_gap = parse_choice(kind, field, value)?,
            "spacing.contentSpacing" => {
                self.spacing.content_spacing = parse_choice(kind, field, value)?;
            }
            "spacing.sectionPadding.vertical" => {
                self.spacing.section_padding.vertical = parse_choice(kind, field, value)?;
            }
            "spacing.sectionPadding.horizontal" => {
                self.spacing.section_padding.horizontal = parse_choice(kind, field, value)?;
            }
            "advanced.autoAdjustSpacing" => {
                self.advanced.auto_adjust_spacing = parse_bool(kind, field, value)?;
            }
            "advanced.fluidTypography" => {
                self.advanced.fluid_typography = parse_bool(kind, field, value)?;
            }
            "advanced.nestedGridSupport" => {
                self.advanced.nested_grid_support = parse_bool(kind, field, value)?;
            }
            other => return Err(unknown(kind, other)),
        }
        Ok(())
    }
}
