//! Runs: the smallest placed units on a line.

use crate::tree::ItemId;
use folio_style::font::FontSelection;
use folio_style::TextDecoration;
use folio_types::Color;

#[derive(Debug, Clone)]
pub struct TextRun {
    pub text: String,
    pub font: FontSelection,
    pub color: Color,
    pub decoration: TextDecoration,
    /// Resource name of the font in the owning page's resource list.
    pub font_resource: String,
    pub link: Option<String>,
}

#[derive(Debug)]
pub enum Run {
    Text(TextRun),
    /// Inter-word or explicit horizontal space. Nothing is drawn.
    Spacer,
    /// Opens a styled inline span; children are part of the current line.
    InlineBegin,
    InlineEnd,
    /// An embedded component laid out as its own block, placed inline.
    Component { block: ItemId },
    /// Reference to an absolutely or relatively positioned region.
    PositionedRegion { region: ItemId },
    /// Marked-content bracket, emitted as BMC .. EMC around the span.
    MarkedContentBegin { tag: String },
    MarkedContentEnd,
    /// An image or form XObject, by resource name in the owning page.
    XObject { name: String },
}

impl Run {
    pub fn is_text(&self) -> bool {
        matches!(self, Run::Text(_))
    }

    /// Markers occupy no space and never participate in width checks.
    pub fn is_marker(&self) -> bool {
        matches!(
            self,
            Run::InlineBegin
                | Run::InlineEnd
                | Run::MarkedContentBegin { .. }
                | Run::MarkedContentEnd
        )
    }
}
