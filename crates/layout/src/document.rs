//! The laid-out document: all pages in creation order plus the
//! cross-cutting registries the output writer consumes.

use crate::artefacts::Artefacts;
use crate::numbering::PageNumberRegistry;
use crate::tree::{ItemId, LayoutTree};
use folio_dom::ComponentId;
use folio_types::Size;

#[derive(Debug, Default)]
pub struct LayoutDocument {
    pub tree: LayoutTree,
    pages: Vec<ItemId>,
    pub numbering: PageNumberRegistry,
    pub artefacts: Artefacts,
}

impl LayoutDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the next page. Indices are dense and monotonically
    /// increasing; serialization replays pages in exactly this order.
    pub fn add_page(&mut self, component: Option<ComponentId>, size: Size) -> ItemId {
        let index = self.pages.len();
        let page = self.tree.open_page(component, index, size);
        self.pages.push(page);
        page
    }

    pub fn all_pages(&self) -> &[ItemId] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
