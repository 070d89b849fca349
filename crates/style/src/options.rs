//! Typed option bundles the layout engine consumes. The cascade that
//! produces them is an external collaborator; by the time a component
//! reaches layout, every option here is fully resolved.

use crate::dimension::{Dimension, PageSize};
use crate::font::FontSelection;
use folio_types::{Color, Thickness};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    Block,
    Inline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionMode {
    /// Normal flow placement.
    #[default]
    Flow,
    /// Flow placement, then shifted by (x, y) during arrangement.
    Relative,
    /// Taken out of flow entirely, placed at (x, y) in the containing block.
    Absolute,
}

/// What a container does when content exceeds the space available to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowAction {
    /// Continue on a fresh page.
    #[default]
    NewPage,
    /// Drop whatever does not fit.
    Truncate,
    /// Keep the content but clip it to the region bounds.
    Clip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloatMode {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    StrikeThrough,
}

/// Page-label numbering styles. `style_letter` is the /S value in a
/// PageLabels number-tree entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberingStyle {
    #[default]
    Decimal,
    UppercaseRoman,
    LowercaseRoman,
    UppercaseLetters,
    LowercaseLetters,
}

impl NumberingStyle {
    pub fn style_letter(&self) -> &'static str {
        match self {
            NumberingStyle::Decimal => "D",
            NumberingStyle::UppercaseRoman => "R",
            NumberingStyle::LowercaseRoman => "r",
            NumberingStyle::UppercaseLetters => "A",
            NumberingStyle::LowercaseLetters => "a",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionOptions {
    pub width: Dimension,
    pub height: Dimension,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub margins: Thickness,
    pub padding: Thickness,
    pub min_width: Option<f32>,
    pub min_height: Option<f32>,
    pub max_width: Option<f32>,
    pub max_height: Option<f32>,
    pub display: DisplayMode,
    pub position: PositionMode,
    pub overflow: OverflowAction,
    pub float: Option<FloatMode>,
    pub h_align: HAlign,
    pub v_align: VAlign,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOptions {
    pub count: usize,
    pub alley_width: f32,
}

impl Default for ColumnOptions {
    fn default() -> Self {
        Self {
            count: 1,
            alley_width: 10.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    pub font: FontSelection,
    pub color: Color,
    /// Baseline-to-baseline distance. `None` means 120% of the font size.
    pub leading: Option<f32>,
    pub character_spacing: Option<f32>,
    pub word_spacing: Option<f32>,
    pub decoration: TextDecoration,
    pub align: HAlign,
}

impl TextOptions {
    pub fn line_height(&self) -> f32 {
        self.leading.unwrap_or(self.font.size * 1.2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageOptions {
    pub size: PageSize,
    pub margins: Thickness,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            size: PageSize::default(),
            margins: Thickness::all(36.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageNumberOptions {
    pub style: NumberingStyle,
    pub start: Option<i32>,
    /// Label group name; pages sharing a group continue one counter.
    pub group: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderStyle {
    pub color: Color,
    pub width: f32,
}
