//! Shared state for one layout pass: the component tree being placed, the
//! measurement service, the document under construction and the stack of
//! open blocks/regions between the current page and the innermost flow.

use crate::document::LayoutDocument;
use crate::fonts::FontMetrics;
use crate::tree::ItemId;
use folio_dom::{ComponentId, Document};
use folio_style::{ColumnOptions, PositionOptions, Style};

/// One open (block, region) pair on the depth stack. The bottom entry is
/// always the current page's content block.
#[derive(Debug, Clone)]
pub(crate) struct OpenLevel {
    pub block: ItemId,
    pub region: ItemId,
    pub component: Option<ComponentId>,
    /// Height withheld from the region for a footer that is appended when
    /// the block ends or is split.
    pub reserved_footer: f32,
    pub footer: Option<ComponentId>,
    pub continuation_footer: Option<ComponentId>,
}

impl OpenLevel {
    pub fn plain(block: ItemId, region: ItemId, component: Option<ComponentId>) -> Self {
        Self {
            block,
            region,
            component,
            reserved_footer: 0.0,
            footer: None,
            continuation_footer: None,
        }
    }

    /// The footer template to append when this level's block closes on a
    /// continuation boundary. Falls back to the primary footer when no
    /// continuation variant exists.
    pub fn continuation_footer_template(&self) -> Option<ComponentId> {
        self.continuation_footer.or(self.footer)
    }
}

/// Everything needed to build a continuation page: the page component and
/// an immutable snapshot of the style in force when the page opened.
/// Continuations always rebuild from this snapshot, never from whatever
/// the interrupted content had mutated in the meantime.
#[derive(Debug, Clone)]
pub(crate) struct PageSetup {
    pub component: ComponentId,
    pub style: Style,
}

pub struct LayoutContext<'a> {
    pub dom: &'a Document,
    pub metrics: &'a dyn FontMetrics,
    pub doc: LayoutDocument,
    pub(crate) current_page: Option<ItemId>,
    pub(crate) levels: Vec<OpenLevel>,
    pub(crate) page_setup: Option<PageSetup>,
    /// Non-zero while laying out furniture or positioned content, where
    /// region and page moves must never fire.
    pub(crate) suppress_moves: u32,
    /// A pending list marker to inject at the start of the next line flow.
    pub(crate) pending_marker: Option<String>,
}

impl<'a> LayoutContext<'a> {
    pub fn new(dom: &'a Document, metrics: &'a dyn FontMetrics) -> Self {
        Self {
            dom,
            metrics,
            doc: LayoutDocument::new(),
            current_page: None,
            levels: Vec::new(),
            page_setup: None,
            suppress_moves: 0,
            pending_marker: None,
        }
    }

    pub(crate) fn current_level(&self) -> &OpenLevel {
        self.levels.last().expect("no open layout level")
    }

    pub(crate) fn current_level_mut(&mut self) -> &mut OpenLevel {
        self.levels.last_mut().expect("no open layout level")
    }

    pub fn current_region(&self) -> ItemId {
        self.current_level().region
    }

    pub fn current_block(&self) -> ItemId {
        self.current_level().block
    }

    pub(crate) fn push_level(&mut self, level: OpenLevel) {
        self.levels.push(level);
    }

    pub(crate) fn pop_level(&mut self) -> OpenLevel {
        self.levels.pop().expect("layout level stack underflow")
    }

    /// The formatted number of the page currently being laid out.
    pub fn page_number_text(&self) -> String {
        match self.current_page {
            Some(page) => {
                let index = self.doc.tree.page(page).page_index;
                self.doc.numbering.format_for_page(index)
            }
            None => String::new(),
        }
    }

    /// Advances the innermost block to its next column region. Returns
    /// false when every column is used up (or moves are suppressed).
    pub(crate) fn move_to_next_region(&mut self) -> bool {
        if self.suppress_moves > 0 {
            return false;
        }
        let block = self.current_block();
        match self.doc.tree.block_advance_region(block) {
            Some(region) => {
                self.current_level_mut().region = region;
                true
            }
            None => false,
        }
    }

    /// Snapshot of an open level sufficient to rebuild an equivalent block
    /// on a continuation page.
    pub(crate) fn saved_levels(&self) -> Vec<SavedLevel> {
        self.levels
            .iter()
            .skip(1)
            .map(|level| {
                let block = self.doc.tree.block(level.block);
                SavedLevel {
                    component: level.component,
                    position: block.position.clone(),
                    columns: block.columns.clone(),
                    footer: level.footer,
                    continuation_footer: level.continuation_footer,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SavedLevel {
    pub component: Option<ComponentId>,
    pub position: PositionOptions,
    pub columns: ColumnOptions,
    pub footer: Option<ComponentId>,
    pub continuation_footer: Option<ComponentId>,
}
