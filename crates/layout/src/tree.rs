//! The layout item arena. Every placed element is a node in one flat
//! store addressed by [`ItemId`]; parent links are handles, so upward
//! walks (for example to the owning page's resource list) never create
//! ownership cycles.

use crate::block::Block;
use crate::line::Line;
use crate::page::Page;
use crate::region::{Region, RegionContent};
use crate::run::Run;
use folio_dom::ComponentId;
use folio_types::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(usize);

impl ItemId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub enum ItemKind {
    Run(Run),
    Line(Line),
    Region(Region),
    Block(Block),
    Page(Page),
}

#[derive(Debug)]
pub struct LayoutItem {
    pub bounds: Rect,
    pub component: Option<ComponentId>,
    pub parent: Option<ItemId>,
    pub closed: bool,
    pub kind: ItemKind,
}

#[derive(Debug, Default)]
pub struct LayoutTree {
    items: Vec<LayoutItem>,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        parent: Option<ItemId>,
        component: Option<ComponentId>,
        bounds: Rect,
        kind: ItemKind,
    ) -> ItemId {
        let id = ItemId(self.items.len());
        self.items.push(LayoutItem {
            bounds,
            component,
            parent,
            closed: false,
            kind,
        });
        id
    }

    pub fn get(&self, id: ItemId) -> &LayoutItem {
        &self.items[id.0]
    }

    pub fn get_mut(&mut self, id: ItemId) -> &mut LayoutItem {
        &mut self.items[id.0]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        (0..self.items.len()).map(ItemId)
    }

    pub fn bounds(&self, id: ItemId) -> Rect {
        self.items[id.0].bounds
    }

    /// Resizes an open item. Resizing after close is a usage error.
    pub fn set_bounds(&mut self, id: ItemId, bounds: Rect) {
        let item = &mut self.items[id.0];
        assert!(!item.closed, "attempt to resize a closed layout item");
        item.bounds = bounds;
    }

    pub fn is_closed(&self, id: ItemId) -> bool {
        self.items[id.0].closed
    }

    /// Finalizes an item. Closing twice is a usage error.
    pub fn close(&mut self, id: ItemId) {
        let item = &mut self.items[id.0];
        assert!(!item.closed, "layout item closed twice");
        item.closed = true;
    }

    /// Re-opens a closed item to append continuation content. The item must
    /// be re-closed afterwards.
    pub fn reopen(&mut self, id: ItemId) {
        let item = &mut self.items[id.0];
        assert!(item.closed, "reopen called on an item that is still open");
        item.closed = false;
    }

    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.items[id.0].parent
    }

    pub fn ancestors(&self, id: ItemId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.items[id.0].parent,
        }
    }

    /// Nearest enclosing page: the resource container every descendant
    /// registers fonts and XObjects into.
    pub fn owning_page(&self, id: ItemId) -> Option<ItemId> {
        if matches!(self.items[id.0].kind, ItemKind::Page(_)) {
            return Some(id);
        }
        self.ancestors(id)
            .find(|a| matches!(self.items[a.0].kind, ItemKind::Page(_)))
    }

    /// The items directly owned by `id`, in document order.
    pub fn child_items(&self, id: ItemId) -> Vec<ItemId> {
        match &self.items[id.0].kind {
            ItemKind::Run(run) => match run {
                Run::PositionedRegion { region } => vec![*region],
                Run::Component { block } => vec![*block],
                _ => Vec::new(),
            },
            ItemKind::Line(line) => line.runs.clone(),
            ItemKind::Region(region) => match &region.content {
                RegionContent::Empty => Vec::new(),
                RegionContent::Lines(items) | RegionContent::Blocks(items) => items.clone(),
            },
            ItemKind::Block(block) => block.regions.clone(),
            ItemKind::Page(page) => {
                let mut out = Vec::new();
                if let Some(h) = page.header_block {
                    out.push(h);
                }
                if let Some(c) = page.content_block {
                    out.push(c);
                }
                if let Some(f) = page.footer_block {
                    out.push(f);
                }
                out
            }
        }
    }

    /// Shifts an item and everything it owns.
    pub fn offset_subtree(&mut self, id: ItemId, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let item = &mut self.items[id.0];
        item.bounds.x += dx;
        item.bounds.y += dy;
        for child in self.child_items(id) {
            self.offset_subtree(child, dx, dy);
        }
    }

    // Typed accessors. Asking for the wrong kind is a programming error.

    pub fn run(&self, id: ItemId) -> &Run {
        match &self.items[id.0].kind {
            ItemKind::Run(r) => r,
            other => panic!("expected run item, found {}", kind_name(other)),
        }
    }

    pub fn line(&self, id: ItemId) -> &Line {
        match &self.items[id.0].kind {
            ItemKind::Line(l) => l,
            other => panic!("expected line item, found {}", kind_name(other)),
        }
    }

    pub fn line_mut(&mut self, id: ItemId) -> &mut Line {
        match &mut self.items[id.0].kind {
            ItemKind::Line(l) => l,
            other => panic!("expected line item, found {}", kind_name(other)),
        }
    }

    pub fn region(&self, id: ItemId) -> &Region {
        match &self.items[id.0].kind {
            ItemKind::Region(r) => r,
            other => panic!("expected region item, found {}", kind_name(other)),
        }
    }

    pub fn region_mut(&mut self, id: ItemId) -> &mut Region {
        match &mut self.items[id.0].kind {
            ItemKind::Region(r) => r,
            other => panic!("expected region item, found {}", kind_name(other)),
        }
    }

    pub fn block(&self, id: ItemId) -> &Block {
        match &self.items[id.0].kind {
            ItemKind::Block(b) => b,
            other => panic!("expected block item, found {}", kind_name(other)),
        }
    }

    pub fn block_mut(&mut self, id: ItemId) -> &mut Block {
        match &mut self.items[id.0].kind {
            ItemKind::Block(b) => b,
            other => panic!("expected block item, found {}", kind_name(other)),
        }
    }

    pub fn page(&self, id: ItemId) -> &Page {
        match &self.items[id.0].kind {
            ItemKind::Page(p) => p,
            other => panic!("expected page item, found {}", kind_name(other)),
        }
    }

    pub fn page_mut(&mut self, id: ItemId) -> &mut Page {
        match &mut self.items[id.0].kind {
            ItemKind::Page(p) => p,
            other => panic!("expected page item, found {}", kind_name(other)),
        }
    }
}

fn kind_name(kind: &ItemKind) -> &'static str {
    match kind {
        ItemKind::Run(_) => "run",
        ItemKind::Line(_) => "line",
        ItemKind::Region(_) => "region",
        ItemKind::Block(_) => "block",
        ItemKind::Page(_) => "page",
    }
}

pub struct Ancestors<'a> {
    tree: &'a LayoutTree,
    next: Option<ItemId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = ItemId;

    fn next(&mut self) -> Option<ItemId> {
        let current = self.next?;
        self.next = self.tree.items[current.0].parent;
        Some(current)
    }
}
