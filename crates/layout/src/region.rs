//! Regions: rectangular flow areas inside a block. A region holds lines
//! or nested blocks, never both; the first insertion fixes its mode for
//! the rest of its lifetime.

use crate::floats::FloatAddition;
use crate::tree::{ItemId, ItemKind, LayoutTree};
use folio_style::{FloatMode, PositionMode};
use folio_types::{Rect, Size};

#[derive(Debug, Default)]
pub enum RegionContent {
    #[default]
    Empty,
    Lines(Vec<ItemId>),
    Blocks(Vec<ItemId>),
}

#[derive(Debug, Default)]
pub struct Region {
    pub content: RegionContent,
    pub used: Size,
    /// Set when content is allowed to exceed the region bounds (clipped
    /// output or an explicitly tolerated overflow).
    pub overflow_permitted: bool,
    /// Present on positioned sub-areas; flow columns carry `None`.
    pub positioned: Option<PositionedRegion>,
    pub floats: Option<Box<FloatAddition>>,
}

#[derive(Debug, Clone, Copy)]
pub struct PositionedRegion {
    pub mode: PositionMode,
    pub x: f32,
    pub y: f32,
}

impl LayoutTree {
    pub fn open_region(&mut self, parent: ItemId, bounds: Rect) -> ItemId {
        self.add(
            Some(parent),
            None,
            bounds,
            ItemKind::Region(Region::default()),
        )
    }

    pub fn open_positioned_region(
        &mut self,
        parent: ItemId,
        bounds: Rect,
        mode: PositionMode,
        x: f32,
        y: f32,
    ) -> ItemId {
        let id = self.add(
            Some(parent),
            None,
            bounds,
            ItemKind::Region(Region {
                positioned: Some(PositionedRegion { mode, x, y }),
                // Positioned content never forces region or page moves.
                overflow_permitted: true,
                ..Region::default()
            }),
        );
        id
    }

    pub(crate) fn region_push_line(&mut self, region: ItemId, line: ItemId) {
        assert!(!self.is_closed(region), "line added to a closed region");
        match &mut self.region_mut(region).content {
            content @ RegionContent::Empty => *content = RegionContent::Lines(vec![line]),
            RegionContent::Lines(lines) => lines.push(line),
            RegionContent::Blocks(_) => {
                panic!("line added to a region already holding blocks")
            }
        }
    }

    pub fn region_push_block(&mut self, region: ItemId, block: ItemId) {
        assert!(!self.is_closed(region), "block added to a closed region");
        match &mut self.region_mut(region).content {
            content @ RegionContent::Empty => *content = RegionContent::Blocks(vec![block]),
            RegionContent::Blocks(blocks) => blocks.push(block),
            RegionContent::Lines(_) => {
                panic!("block added to a region already holding lines")
            }
        }
    }

    /// Extends the used height after a nested block is placed or grows.
    pub fn region_advance_used(&mut self, region: ItemId, bottom: f32, width: f32) {
        let region_bounds = self.bounds(region);
        let used = &mut self.region_mut(region).used;
        used.height = used.height.max(bottom - region_bounds.y);
        used.width = used.width.max(width);
    }

    pub fn region_available_height(&self, region: ItemId) -> f32 {
        let bounds = self.bounds(region);
        (bounds.height - self.region(region).used.height).max(0.0)
    }

    /// Y coordinate where the next item in this region starts.
    pub fn region_cursor_y(&self, region: ItemId) -> f32 {
        self.bounds(region).y + self.region(region).used.height
    }

    pub fn region_item_count(&self, region: ItemId) -> usize {
        match &self.region(region).content {
            RegionContent::Empty => 0,
            RegionContent::Lines(v) | RegionContent::Blocks(v) => v.len(),
        }
    }

    pub fn region_is_empty(&self, region: ItemId) -> bool {
        self.region_item_count(region) == 0
    }

    /// Removes the most recently added item, rolling back the used size to
    /// the previous item's extent. Supports speculative measurement of
    /// footers and similar try-then-remove flows.
    pub fn region_pop_last(&mut self, region: ItemId) -> Option<ItemId> {
        let popped = match &mut self.region_mut(region).content {
            RegionContent::Empty => None,
            RegionContent::Lines(v) | RegionContent::Blocks(v) => v.pop(),
        }?;
        let region_y = self.bounds(region).y;
        let new_used = self
            .child_items(region)
            .iter()
            .map(|c| self.bounds(*c).bottom() - region_y)
            .fold(0.0f32, f32::max);
        let new_width = self
            .child_items(region)
            .iter()
            .map(|c| self.bounds(*c).width)
            .fold(0.0f32, f32::max);
        let used = &mut self.region_mut(region).used;
        used.height = new_used;
        used.width = new_width;
        Some(popped)
    }

    pub fn region_add_float(
        &mut self,
        region: ItemId,
        mode: FloatMode,
        width: f32,
        height: f32,
        inset: f32,
        y_offset: f32,
    ) {
        let data = self.region_mut(region);
        let chain = data.floats.take();
        data.floats = Some(FloatAddition::push(
            chain, mode, width, height, inset, y_offset,
        ));
    }

    /// Line width at a vertical band once active floats are applied.
    pub fn region_line_width(&self, region: ItemId, y_offset: f32, height: f32) -> f32 {
        let width = self.bounds(region).width;
        match &self.region(region).floats {
            Some(chain) => chain.apply_width_inset(width, y_offset, height),
            None => width,
        }
    }

    /// X position where a line at the given band starts.
    pub fn region_line_x(&self, region: ItemId, y_offset: f32, height: f32) -> f32 {
        let bounds = self.bounds(region);
        match &self.region(region).floats {
            Some(chain) => bounds.x + chain.left_offset(y_offset, height),
            None => bounds.x,
        }
    }

    pub fn close_region(&mut self, region: ItemId) {
        if self.is_closed(region) {
            return;
        }
        self.close(region);
    }
}
