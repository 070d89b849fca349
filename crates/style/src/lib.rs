pub mod dimension;
pub mod font;
pub mod options;

pub use dimension::{Dimension, PageSize};
pub use font::{FontFamily, FontSelection};
pub use options::{
    BorderStyle, ColumnOptions, DisplayMode, FloatMode, HAlign, NumberingStyle, OverflowAction,
    PageNumberOptions, PageOptions, PositionMode, PositionOptions, TextDecoration, TextOptions,
    VAlign,
};

use folio_types::{Color, Thickness};
use serde::{Deserialize, Serialize};

/// A fully resolved style as delivered by the cascade. Layout never looks at
/// selectors or inheritance; it only reads the typed option bundles below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub position: PositionOptions,
    pub columns: ColumnOptions,
    pub text: TextOptions,
    pub page: PageOptions,
    pub page_numbers: Option<PageNumberOptions>,
    pub background: Option<Color>,
    pub border: Option<BorderStyle>,
}

impl Style {
    pub fn position_options(&self) -> &PositionOptions {
        &self.position
    }

    pub fn column_options(&self) -> &ColumnOptions {
        &self.columns
    }

    pub fn text_options(&self) -> &TextOptions {
        &self.text
    }

    pub fn page_options(&self) -> &PageOptions {
        &self.page
    }

    pub fn page_number_options(&self) -> Option<&PageNumberOptions> {
        self.page_numbers.as_ref()
    }

    // Builder-style helpers. Fixtures and callers assemble resolved styles
    // directly since the cascade lives outside this workspace.

    pub fn width(mut self, pt: f32) -> Self {
        self.position.width = Dimension::Pt(pt);
        self
    }

    pub fn height(mut self, pt: f32) -> Self {
        self.position.height = Dimension::Pt(pt);
        self
    }

    pub fn margins(mut self, t: Thickness) -> Self {
        self.position.margins = t;
        self
    }

    pub fn padding(mut self, t: Thickness) -> Self {
        self.position.padding = t;
        self
    }

    pub fn min_height(mut self, pt: f32) -> Self {
        self.position.min_height = Some(pt);
        self
    }

    pub fn min_width(mut self, pt: f32) -> Self {
        self.position.min_width = Some(pt);
        self
    }

    pub fn display(mut self, mode: DisplayMode) -> Self {
        self.position.display = mode;
        self
    }

    pub fn positioned(mut self, mode: PositionMode, x: f32, y: f32) -> Self {
        self.position.position = mode;
        self.position.x = Some(x);
        self.position.y = Some(y);
        self
    }

    pub fn overflow(mut self, action: OverflowAction) -> Self {
        self.position.overflow = action;
        self
    }

    pub fn float(mut self, mode: FloatMode) -> Self {
        self.position.float = Some(mode);
        self
    }

    pub fn columns_of(mut self, count: usize, alley_width: f32) -> Self {
        self.columns = ColumnOptions { count, alley_width };
        self
    }

    pub fn font(mut self, font: FontSelection) -> Self {
        self.text.font = font;
        self
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.text.font.size = size;
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.page.size = size;
        self
    }

    pub fn page_margins(mut self, t: Thickness) -> Self {
        self.page.margins = t;
        self
    }

    pub fn numbered(mut self, options: PageNumberOptions) -> Self {
        self.page_numbers = Some(options);
        self
    }
}
