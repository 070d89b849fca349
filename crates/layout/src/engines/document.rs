//! The top-level driver: one engine invocation per top-level page or page
//! group, dense page indices, cooperative halt observed between pages.

use super::{page, page_group};
use crate::context::LayoutContext;
use crate::document::LayoutDocument;
use crate::fonts::FontMetrics;
use crate::outcome::LayoutOutcome;
use crate::LayoutError;
use folio_dom::{ComponentKind, Document};

pub fn run(dom: &Document, metrics: &dyn FontMetrics) -> Result<LayoutDocument, LayoutError> {
    let mut ctx = LayoutContext::new(dom, metrics);
    let mut outcome = LayoutOutcome::Fits;

    for &comp in dom.pages() {
        let result = match &dom.tree.get(comp).kind {
            ComponentKind::Page(_) => page::layout_page_component(&mut ctx, comp, None)?,
            ComponentKind::PageGroup => page_group::layout_page_group(&mut ctx, comp)?,
            _ => {
                return Err(LayoutError::Unsupported(format!(
                    "top-level component {} must be a page or page group",
                    dom.tree.get(comp).kind_name()
                )));
            }
        };
        outcome = outcome.worst(result);
        if outcome.halted() {
            log::warn!("layout halted; the document completes with partial content");
            break;
        }
    }

    log::debug!(
        "layout complete: {} page(s), {} item(s)",
        ctx.doc.page_count(),
        ctx.doc.tree.len()
    );
    Ok(ctx.doc)
}
