//! Blocks: the placed container for one component, holding one flow
//! region per column.

use crate::tree::{ItemId, ItemKind, LayoutTree};
use folio_dom::ComponentId;
use folio_style::{ColumnOptions, PositionOptions};
use folio_types::Rect;

#[derive(Debug)]
pub struct Block {
    pub regions: Vec<ItemId>,
    pub current_region: usize,
    pub position: PositionOptions,
    pub columns: ColumnOptions,
}

impl LayoutTree {
    /// Creates a block with its column regions laid side by side inside
    /// the padding box. `bounds.height` is the space offered to the block;
    /// the real height is fixed at close.
    pub fn open_block(
        &mut self,
        parent: Option<ItemId>,
        component: Option<ComponentId>,
        bounds: Rect,
        position: PositionOptions,
        columns: ColumnOptions,
    ) -> ItemId {
        let count = columns.count.max(1);
        let padding = position.padding;
        let content = bounds.inset(padding);
        let alley_total = columns.alley_width * (count as f32 - 1.0);
        let column_width = ((content.width - alley_total) / count as f32).max(0.0);

        let block = self.add(
            parent,
            component,
            bounds,
            ItemKind::Block(Block {
                regions: Vec::with_capacity(count),
                current_region: 0,
                position,
                columns: columns.clone(),
            }),
        );
        for i in 0..count {
            let x = content.x + i as f32 * (column_width + columns.alley_width);
            let region = self.open_region(
                block,
                Rect::new(x, content.y, column_width, content.height),
            );
            self.block_mut(block).regions.push(region);
        }
        block
    }

    pub fn block_current_region(&self, block: ItemId) -> ItemId {
        let data = self.block(block);
        data.regions[data.current_region]
    }

    /// Moves to the next column region, closing the current one. Returns
    /// `None` when every column is exhausted.
    pub fn block_advance_region(&mut self, block: ItemId) -> Option<ItemId> {
        let data = self.block(block);
        if data.current_region + 1 >= data.regions.len() {
            return None;
        }
        let current = data.regions[data.current_region];
        self.close_region(current);
        let data = self.block_mut(block);
        data.current_region += 1;
        Some(data.regions[data.current_region])
    }

    /// Tallest used extent across the block's columns.
    pub fn block_content_height(&self, block: ItemId) -> f32 {
        self.block(block)
            .regions
            .iter()
            .map(|r| self.region(*r).used.height)
            .fold(0.0f32, f32::max)
    }

    /// Finalizes the block. Flow-sized blocks shrink to their content;
    /// explicitly sized blocks keep the given height. Minimum constraints
    /// inflate the result after natural sizing, padding compensated.
    pub fn close_block(&mut self, block: ItemId, explicit_height: Option<f32>) -> f32 {
        let padding = self.block(block).position.padding;
        let min_height = self.block(block).position.min_height;
        let content_height = self.block_content_height(block);

        let mut height = explicit_height.unwrap_or(content_height + padding.vertical());
        if let Some(min) = min_height {
            height = height.max(min);
        }

        for region in self.block(block).regions.clone() {
            // Regions of an explicitly sized block keep their offered
            // bounds; flow regions shrink to the used extent.
            if explicit_height.is_none() && !self.is_closed(region) {
                let mut b = self.bounds(region);
                b.height = self.region(region).used.height;
                self.set_bounds(region, b);
            }
            self.close_region(region);
        }

        let mut bounds = self.bounds(block);
        bounds.height = height;
        self.set_bounds(block, bounds);
        self.close(block);
        height
    }

    /// Re-opens a closed block (and its last region) to append
    /// continuation content such as a rollover footer, granting the region
    /// `extra_height` of room beyond its used extent. The caller must
    /// close the block again.
    pub fn reopen_block(&mut self, block: ItemId, extra_height: f32) -> ItemId {
        self.reopen(block);
        let region = self.block_current_region(block);
        if self.is_closed(region) {
            self.reopen(region);
        }
        let mut b = self.bounds(region);
        b.height = self.region(region).used.height + extra_height;
        self.set_bounds(region, b);
        region
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::LayoutTree;
    use folio_style::{ColumnOptions, PositionOptions};
    use folio_types::{Rect, Thickness};

    fn columns(count: usize, alley: f32) -> ColumnOptions {
        ColumnOptions {
            count,
            alley_width: alley,
        }
    }

    #[test]
    fn column_regions_partition_the_content_width() {
        let mut tree = LayoutTree::new();
        let position = PositionOptions {
            padding: Thickness::all(5.0),
            ..PositionOptions::default()
        };
        let block = tree.open_block(
            None,
            None,
            Rect::new(0.0, 0.0, 210.0, 100.0),
            position,
            columns(2, 10.0),
        );
        let regions = tree.block(block).regions.clone();
        assert_eq!(regions.len(), 2);
        // 210 minus 10 padding and a 10pt alley leaves 95 per column.
        assert_eq!(tree.bounds(regions[0]).width, 95.0);
        assert_eq!(tree.bounds(regions[1]).x, 110.0);
        let total: f32 = regions.iter().map(|r| tree.bounds(*r).width).sum();
        assert_eq!(total + 10.0, 200.0);
    }

    #[test]
    fn close_shrinks_to_content_and_honors_min_height() {
        let mut tree = LayoutTree::new();
        let position = PositionOptions {
            min_height: Some(50.0),
            ..PositionOptions::default()
        };
        let block = tree.open_block(
            None,
            None,
            Rect::new(0.0, 0.0, 100.0, 400.0),
            position,
            columns(1, 0.0),
        );
        let region = tree.block_current_region(block);
        tree.region_advance_used(region, 20.0, 80.0);
        let height = tree.close_block(block, None);
        assert_eq!(height, 50.0);
        assert_eq!(tree.bounds(block).height, 50.0);
    }

    #[test]
    fn reopen_grants_extra_capacity_and_recloses() {
        let mut tree = LayoutTree::new();
        let block = tree.open_block(
            None,
            None,
            Rect::new(0.0, 0.0, 100.0, 300.0),
            PositionOptions::default(),
            columns(1, 0.0),
        );
        let region = tree.block_current_region(block);
        tree.region_advance_used(region, 30.0, 100.0);
        tree.close_block(block, None);
        assert!(tree.is_closed(block));

        let region = tree.reopen_block(block, 15.0);
        assert!(!tree.is_closed(block));
        assert_eq!(tree.bounds(region).height, 45.0);
        tree.region_advance_used(region, 45.0, 100.0);
        let height = tree.close_block(block, None);
        assert_eq!(height, 45.0);
    }

    #[test]
    #[should_panic(expected = "closed twice")]
    fn closing_twice_is_a_contract_violation() {
        let mut tree = LayoutTree::new();
        let block = tree.open_block(
            None,
            None,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            PositionOptions::default(),
            columns(1, 0.0),
        );
        tree.close_block(block, None);
        tree.close(block);
    }

    #[test]
    #[should_panic(expected = "resize a closed layout item")]
    fn resizing_after_close_is_a_contract_violation() {
        let mut tree = LayoutTree::new();
        let block = tree.open_block(
            None,
            None,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            PositionOptions::default(),
            columns(1, 0.0),
        );
        tree.close_block(block, None);
        tree.set_bounds(block, Rect::new(0.0, 0.0, 50.0, 50.0));
    }
}
