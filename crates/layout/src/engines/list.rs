//! Lists: items stacked vertically, each opening with a marker injected
//! into the item's first line flow. Marker text comes from the shared
//! numbering formatter.

use crate::context::LayoutContext;
use crate::numbering::format_number;
use crate::outcome::LayoutOutcome;
use crate::LayoutError;
use folio_dom::{ComponentId, ComponentKind, ListMarker};
use folio_style::ColumnOptions;

pub(crate) fn layout_list(
    ctx: &mut LayoutContext,
    comp: ComponentId,
) -> Result<LayoutOutcome, LayoutError> {
    let style = ctx.dom.tree.style(comp).clone();
    let definition = match &ctx.dom.tree.get(comp).kind {
        ComponentKind::List(def) => def.clone(),
        _ => panic!("list engine invoked on a non-list component"),
    };

    let region_height = ctx.doc.tree.bounds(ctx.current_region()).height;
    let explicit_height = style.position.height.resolve(region_height);

    let Some(mut outcome) = super::panel::open_component_block(
        ctx,
        comp,
        style.position.clone(),
        ColumnOptions {
            count: 1,
            alley_width: 0.0,
        },
    )?
    else {
        return Ok(LayoutOutcome::Halted);
    };

    let children = ctx.dom.tree.children(comp).to_vec();
    let mut index = definition.start;
    for child in children {
        let is_item = matches!(ctx.dom.tree.get(child).kind, ComponentKind::ListItem);
        if is_item {
            ctx.pending_marker = Some(marker_text(&definition.marker, index));
            index += 1;
            let item_style = ctx.dom.tree.style(child).clone();
            let item_outcome = super::panel::layout_block_panel(
                ctx,
                child,
                item_style.position.clone(),
                ColumnOptions {
                    count: 1,
                    alley_width: 0.0,
                },
            )?;
            outcome = outcome.worst(item_outcome);
        } else {
            outcome = outcome.worst(super::layout_component(ctx, child)?);
        }
        if outcome.halted() {
            break;
        }
    }

    super::panel::finish_component_block(ctx, explicit_height);
    Ok(outcome)
}

fn marker_text(marker: &ListMarker, index: usize) -> String {
    match marker {
        ListMarker::Bullet => "\u{2022}".to_string(),
        ListMarker::Numbered(style) => format!("{}.", format_number(*style, index as i32)),
    }
}
