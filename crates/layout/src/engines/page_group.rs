//! Page groups: a run of pages sharing one numbering group and, when the
//! group declares page styling, one continuation style.

use super::page;
use crate::context::LayoutContext;
use crate::outcome::LayoutOutcome;
use crate::LayoutError;
use folio_dom::{ComponentId, ComponentKind};

pub(crate) fn layout_page_group(
    ctx: &mut LayoutContext,
    comp: ComponentId,
) -> Result<LayoutOutcome, LayoutError> {
    let group_style = ctx.dom.tree.style(comp).clone();
    if let Some(options) = group_style.page_number_options() {
        ctx.doc.numbering.register(ctx.doc.page_count(), options);
    }

    let mut outcome = LayoutOutcome::Fits;
    let children = ctx.dom.tree.children(comp).to_vec();
    for child in children {
        match &ctx.dom.tree.get(child).kind {
            ComponentKind::Page(_) => {
                let page_outcome = page::layout_page_component(ctx, child, Some(&group_style))?;
                outcome = outcome.worst(page_outcome);
            }
            _ => panic!(
                "page group children must be pages, found {}",
                ctx.dom.tree.get(child).kind_name()
            ),
        }
        if outcome.halted() {
            break;
        }
    }
    Ok(outcome)
}
