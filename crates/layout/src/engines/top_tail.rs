//! Panels carrying their own header and footer templates. Footer heights
//! are measured up front by speculatively laying the templates out and
//! rolling them back, so body content can never collide with the footer
//! added after it.

use crate::context::LayoutContext;
use crate::outcome::LayoutOutcome;
use crate::LayoutError;
use folio_dom::{ComponentId, ComponentKind};

pub(crate) fn layout_top_and_tailed(
    ctx: &mut LayoutContext,
    comp: ComponentId,
) -> Result<LayoutOutcome, LayoutError> {
    let style = ctx.dom.tree.style(comp).clone();
    let definition = match &ctx.dom.tree.get(comp).kind {
        ComponentKind::Panel(def) => def.clone(),
        _ => panic!("top-and-tailed engine invoked on a non-panel component"),
    };

    let region_height = ctx.doc.tree.bounds(ctx.current_region()).height;
    let explicit_height = style.position.height.resolve(region_height);

    let Some(mut outcome) = super::panel::open_component_block(
        ctx,
        comp,
        style.position.clone(),
        style.columns.clone(),
    )?
    else {
        return Ok(LayoutOutcome::Halted);
    };

    {
        let level = ctx.current_level_mut();
        level.footer = definition.footer;
        level.continuation_footer = definition.continuation_footer;
    }

    if let Some(header) = definition.header {
        outcome = outcome.worst(super::layout_children(ctx, &[header])?);
    }

    reserve_footer_space(ctx)?;

    let children = ctx.dom.tree.children(comp).to_vec();
    outcome = outcome.worst(super::layout_children(ctx, &children)?);

    // The block still open here is either the original or its latest
    // continuation; either way it gets the primary footer at the true end
    // of content. Continuation footers for earlier fragments were added
    // when those fragments closed.
    append_footer(ctx, definition.footer)?;

    super::panel::finish_component_block(ctx, explicit_height);
    Ok(outcome)
}

/// Speculatively lays out the footer and continuation footer in the
/// current level's region, records the taller of the two as reserved
/// space and removes both again.
pub(crate) fn reserve_footer_space(ctx: &mut LayoutContext) -> Result<(), LayoutError> {
    let level = ctx.current_level();
    let footer = level.footer;
    let continuation = level.continuation_footer;
    if footer.is_none() && continuation.is_none() {
        return Ok(());
    }

    let mut reserve = 0.0f32;
    if let Some(f) = footer {
        reserve = reserve.max(measure_by_layout(ctx, f)?);
    }
    if let Some(f) = continuation {
        reserve = reserve.max(measure_by_layout(ctx, f)?);
    }

    if reserve > 0.0 {
        let region = ctx.current_region();
        let mut bounds = ctx.doc.tree.bounds(region);
        bounds.height = (bounds.height - reserve).max(0.0);
        ctx.doc.tree.set_bounds(region, bounds);
        ctx.current_level_mut().reserved_footer = reserve;
    }
    Ok(())
}

/// Lays a template out in the current region, reads the height it
/// consumed and removes it again.
fn measure_by_layout(ctx: &mut LayoutContext, comp: ComponentId) -> Result<f32, LayoutError> {
    let region = ctx.current_region();
    let used_before = ctx.doc.tree.region(region).used.height;
    let count_before = ctx.doc.tree.region_item_count(region);

    ctx.suppress_moves += 1;
    let result = super::layout_children(ctx, &[comp]);
    ctx.suppress_moves -= 1;
    result?;

    let delta = ctx.doc.tree.region(region).used.height - used_before;
    while ctx.doc.tree.region_item_count(region) > count_before {
        ctx.doc.tree.region_pop_last(region);
    }
    Ok(delta)
}

/// Restores the reserved capacity on the current level and lays the given
/// footer template at the end of its content.
pub(crate) fn append_footer(
    ctx: &mut LayoutContext,
    footer: Option<ComponentId>,
) -> Result<(), LayoutError> {
    let reserved = ctx.current_level().reserved_footer;
    if reserved > 0.0 {
        let region = ctx.current_region();
        let mut bounds = ctx.doc.tree.bounds(region);
        bounds.height += reserved;
        ctx.doc.tree.set_bounds(region, bounds);
        ctx.current_level_mut().reserved_footer = 0.0;
    }
    let Some(footer) = footer else {
        return Ok(());
    };
    ctx.suppress_moves += 1;
    let result = super::layout_children(ctx, &[footer]);
    ctx.suppress_moves -= 1;
    result.map(|_| ())
}
