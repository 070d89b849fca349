//! The box-flow engine for panels and the shared open/finish helpers every
//! block-producing engine builds on.

use super::measure::Measurer;
use super::{page, EPSILON};
use crate::context::{LayoutContext, OpenLevel};
use crate::outcome::LayoutOutcome;
use crate::tree::{ItemId, ItemKind, LayoutTree};
use crate::LayoutError;
use folio_dom::ComponentId;
use folio_style::{ColumnOptions, FloatMode, HAlign, PositionOptions};
use folio_types::Rect;

pub(crate) fn layout_panel(
    ctx: &mut LayoutContext,
    comp: ComponentId,
) -> Result<LayoutOutcome, LayoutError> {
    let style = ctx.dom.tree.style(comp).clone();
    if let Some(mode) = style.position.float {
        return layout_float_panel(ctx, comp, mode);
    }
    layout_block_panel(ctx, comp, style.position.clone(), style.columns.clone())
}

/// Standard block flow: fit pre-check, block creation, children, close and
/// place. Engines with custom content (tables, lists, canvases) reuse the
/// open/finish halves around their own child placement.
pub(crate) fn layout_block_panel(
    ctx: &mut LayoutContext,
    comp: ComponentId,
    opts: PositionOptions,
    columns: ColumnOptions,
) -> Result<LayoutOutcome, LayoutError> {
    let region_height = ctx.doc.tree.bounds(ctx.current_region()).height;
    let explicit_height = opts.height.resolve(region_height);

    let Some(mut outcome) = open_component_block(ctx, comp, opts, columns)? else {
        return Ok(LayoutOutcome::Halted);
    };

    // Fixed-height blocks never split; their content overflows in place.
    if explicit_height.is_some() {
        ctx.suppress_moves += 1;
        let region = ctx.current_region();
        ctx.doc.tree.region_mut(region).overflow_permitted = true;
    }
    let children = ctx.dom.tree.children(comp).to_vec();
    let child_outcome = super::layout_children(ctx, &children)?;
    if explicit_height.is_some() {
        ctx.suppress_moves -= 1;
    }
    outcome = outcome.worst(child_outcome);

    finish_component_block(ctx, explicit_height);
    Ok(outcome)
}

/// Opens a block for `comp` in the current region, pushing a new open
/// level. Returns `None` when content cannot be placed anywhere
/// (cooperative halt), otherwise the outcome of any moves made to find
/// room.
pub(crate) fn open_component_block(
    ctx: &mut LayoutContext,
    comp: ComponentId,
    opts: PositionOptions,
    columns: ColumnOptions,
) -> Result<Option<LayoutOutcome>, LayoutError> {
    let mut outcome = LayoutOutcome::Fits;

    if ctx.suppress_moves == 0 {
        let region = ctx.current_region();
        let available_width = ctx.doc.tree.bounds(region).width;
        let measurer = Measurer::new(ctx.dom, ctx.metrics);
        let estimate = measurer.natural_size(comp, available_width);
        let available = ctx.doc.tree.region_available_height(region);
        if estimate.height > available + EPSILON && ctx.doc.tree.region_item_count(region) >= 1 {
            if ctx.move_to_next_region() || page::move_to_next_page(ctx)? {
                outcome = LayoutOutcome::Overflowed;
            } else {
                log::warn!(
                    "component {} needs {:.2}pt but only {available:.2}pt remains and no \
                     further region can be created; halting this subtree",
                    comp,
                    estimate.height
                );
                return Ok(None);
            }
        }
    }

    let region = ctx.current_region();
    let bounds = block_geometry(&ctx.doc.tree, region, &opts);
    let block = ctx
        .doc
        .tree
        .open_block(Some(region), Some(comp), bounds, opts, columns);
    ctx.doc.tree.region_push_block(region, block);
    let block_region = ctx.doc.tree.block_current_region(block);
    ctx.push_level(OpenLevel::plain(block, block_region, Some(comp)));
    Ok(Some(outcome))
}

/// Pops the innermost level, closes its block (which may be a continuation
/// of the one originally opened) and rolls its extent into the parent
/// region.
pub(crate) fn finish_component_block(ctx: &mut LayoutContext, explicit_height: Option<f32>) {
    let level = ctx.pop_level();
    let tree = &mut ctx.doc.tree;
    let explicit = if tree.is_closed(level.block) {
        // Already closed by a page move; nothing further to do.
        return;
    } else {
        explicit_height
    };
    tree.close_block(level.block, explicit);
    place_closed_block(tree, level.block);
}

/// Rolls a closed block's extent (margins included) into its parent
/// region's used size.
pub(crate) fn place_closed_block(tree: &mut LayoutTree, block: ItemId) {
    let bounds = tree.bounds(block);
    let margins = tree.block(block).position.margins;
    if let Some(parent) = tree.parent(block) {
        if matches!(tree.get(parent).kind, ItemKind::Region(_)) {
            tree.region_advance_used(
                parent,
                bounds.bottom() + margins.bottom,
                bounds.width + margins.horizontal(),
            );
        }
    }
}

/// Computes the rectangle a new block is offered: explicit or full width
/// inside margins, horizontal alignment applied when narrower, and all of
/// the region's remaining height.
pub(crate) fn block_geometry(tree: &LayoutTree, region: ItemId, opts: &PositionOptions) -> Rect {
    let rb = tree.bounds(region);
    let y = tree.region_cursor_y(region) + opts.margins.top;
    let available_width = (rb.width - opts.margins.horizontal()).max(0.0);
    let mut width = opts
        .width
        .resolve(rb.width)
        .unwrap_or(available_width)
        .min(available_width);
    if let Some(min) = opts.min_width {
        width = width.max(min);
    }
    if let Some(max) = opts.max_width {
        width = width.min(max);
    }
    let free = available_width - width;
    let x = rb.x
        + opts.margins.left
        + match opts.h_align {
            HAlign::Left => 0.0,
            HAlign::Center => (free / 2.0).max(0.0),
            HAlign::Right => free.max(0.0),
        };
    let height = (rb.bottom() - y).max(0.0);
    Rect::new(x, y, width, height)
}

/// Floats lay out like blocks but anchor to a region edge and register a
/// float addition instead of consuming vertical space; subsequent lines
/// flow beside them with a reduced width.
fn layout_float_panel(
    ctx: &mut LayoutContext,
    comp: ComponentId,
    mode: FloatMode,
) -> Result<LayoutOutcome, LayoutError> {
    let style = ctx.dom.tree.style(comp).clone();
    let opts = style.position.clone();
    let region = ctx.current_region();
    let rb = ctx.doc.tree.bounds(region);
    let y_offset = ctx.doc.tree.region(region).used.height;

    let measurer = Measurer::new(ctx.dom, ctx.metrics);
    let natural = measurer.natural_size(comp, rb.width);
    let width = opts
        .width
        .resolve(rb.width)
        .unwrap_or(natural.width)
        .min(rb.width);
    let explicit_height = opts.height.resolve(rb.height);

    let x = match mode {
        FloatMode::Left => rb.x,
        FloatMode::Right => rb.right() - width,
    };
    let y = rb.y + y_offset + opts.margins.top;
    let offered = Rect::new(x, y, width, (rb.bottom() - y).max(0.0));

    let block = ctx.doc.tree.open_block(
        Some(region),
        Some(comp),
        offered,
        opts.clone(),
        style.columns.clone(),
    );
    ctx.doc.tree.region_push_block(region, block);
    let block_region = ctx.doc.tree.block_current_region(block);
    ctx.push_level(OpenLevel::plain(block, block_region, Some(comp)));
    ctx.suppress_moves += 1;
    let children = ctx.dom.tree.children(comp).to_vec();
    let result = super::layout_children(ctx, &children);
    ctx.suppress_moves -= 1;
    let level = ctx.pop_level();
    result?;
    let height = ctx.doc.tree.close_block(level.block, explicit_height);

    ctx.doc.tree.region_add_float(
        region,
        mode,
        width + opts.margins.horizontal(),
        height + opts.margins.vertical(),
        0.0,
        y_offset,
    );
    Ok(LayoutOutcome::Fits)
}
