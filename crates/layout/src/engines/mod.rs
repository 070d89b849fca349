//! One engine per component kind behind a single dispatch seam. Shared
//! box-flow logic (fit checks, geometry, open/close bookkeeping) lives in
//! `panel`; pagination lives in `page`.

pub(crate) mod canvas;
pub(crate) mod document;
pub(crate) mod inline;
pub(crate) mod list;
pub(crate) mod measure;
pub(crate) mod page;
pub(crate) mod page_group;
pub(crate) mod panel;
pub(crate) mod table;
pub(crate) mod top_tail;

use crate::context::LayoutContext;
use crate::outcome::LayoutOutcome;
use crate::LayoutError;
use folio_dom::{ComponentId, ComponentKind};

/// Fit checks tolerate this much float error, matching the precision the
/// geometry carries.
pub(crate) const EPSILON: f32 = 0.01;

/// Dispatches a block-level component to its engine.
pub(crate) fn layout_component(
    ctx: &mut LayoutContext,
    comp: ComponentId,
) -> Result<LayoutOutcome, LayoutError> {
    let component = ctx.dom.tree.get(comp);
    match &component.kind {
        ComponentKind::Panel(def) if def.has_furniture() => {
            top_tail::layout_top_and_tailed(ctx, comp)
        }
        ComponentKind::Panel(_) => panel::layout_panel(ctx, comp),
        ComponentKind::Canvas => canvas::layout_canvas(ctx, comp),
        ComponentKind::Table(_) => table::layout_table(ctx, comp),
        ComponentKind::List(_) => list::layout_list(ctx, comp),
        ComponentKind::Text(_) | ComponentKind::PageNumberField | ComponentKind::Image(_) => {
            inline::layout_inline_group(ctx, &[comp])
        }
        ComponentKind::Page(_) | ComponentKind::PageGroup => {
            panic!("pages are driven by the document engine, not by content flow")
        }
        ComponentKind::Row(_) | ComponentKind::Cell(_) | ComponentKind::ListItem => {
            panic!(
                "component kind {} is only valid inside its container",
                component.kind_name()
            )
        }
    }
}

/// Same dispatch for a component already wrapped in a block by its caller
/// (positioned content).
pub(crate) fn layout_in_place(
    ctx: &mut LayoutContext,
    comp: ComponentId,
) -> Result<LayoutOutcome, LayoutError> {
    layout_component(ctx, comp)
}

/// Lays out a child list, grouping consecutive inline children into line
/// flows and checking the cooperative halt after every child.
pub(crate) fn layout_children(
    ctx: &mut LayoutContext,
    children: &[ComponentId],
) -> Result<LayoutOutcome, LayoutError> {
    let mut outcome = LayoutOutcome::Fits;
    let mut inline_group: Vec<ComponentId> = Vec::new();

    for &child in children {
        if measure::is_inline(ctx.dom, child) {
            inline_group.push(child);
            continue;
        }
        // A pending list marker must land before the first block child.
        if !inline_group.is_empty() || ctx.pending_marker.is_some() {
            outcome = outcome.worst(inline::layout_inline_group(ctx, &inline_group)?);
            inline_group.clear();
            if outcome.halted() {
                return Ok(outcome);
            }
        }
        outcome = outcome.worst(layout_component(ctx, child)?);
        if outcome.halted() {
            return Ok(outcome);
        }
    }
    if !inline_group.is_empty() || ctx.pending_marker.is_some() {
        outcome = outcome.worst(inline::layout_inline_group(ctx, &inline_group)?);
    }
    Ok(outcome)
}
