//! Phase one of the output protocol: walk the finished layout tree,
//! resolve relative positioned-region offsets, push every component's
//! final page-relative placement into an arrangement map and collect the
//! artefacts whose coordinates are only known now (link annotations,
//! outline targets, named destinations).

use crate::artefacts::{AnnotationArtefact, LinkTarget, NamedDestination, OutlineArtefact};
use crate::document::LayoutDocument;
use crate::region::RegionContent;
use crate::run::Run;
use crate::tree::{ItemId, ItemKind};
use folio_dom::{ComponentId, Document};
use folio_style::PositionMode;
use folio_types::Rect;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrangement {
    pub page_index: usize,
    pub bounds: Rect,
}

/// Components may appear on several pages (splits, repeated headers);
/// arrangements are recorded in layout order.
pub type ArrangementMap = HashMap<ComponentId, Vec<Arrangement>>;

pub fn push_component_layout(doc: &mut LayoutDocument, dom: &Document) -> ArrangementMap {
    let mut arrangements = ArrangementMap::new();
    let mut registered: HashSet<ComponentId> = HashSet::new();

    for page in doc.all_pages().to_vec() {
        let page_index = doc.tree.page(page).page_index;
        // (item, inherited offset) pairs; offsets accumulate through
        // relative positioned regions.
        let mut stack: Vec<(ItemId, f32, f32)> = vec![(page, 0.0, 0.0)];
        while let Some((item, dx, dy)) = stack.pop() {
            let (own_dx, own_dy) = match &doc.tree.get(item).kind {
                ItemKind::Region(region) => match &region.positioned {
                    Some(p) if p.mode == PositionMode::Relative => (dx + p.x, dy + p.y),
                    _ => (dx, dy),
                },
                _ => (dx, dy),
            };
            if own_dx != 0.0 || own_dy != 0.0 {
                let node = doc.tree.get_mut(item);
                node.bounds.x += own_dx;
                node.bounds.y += own_dy;
            }

            let bounds = doc.tree.bounds(item);
            if let Some(comp) = doc.tree.get(item).component {
                arrangements.entry(comp).or_default().push(Arrangement {
                    page_index,
                    bounds,
                });
                collect_component_artefacts(doc, dom, comp, page_index, bounds, &mut registered);
            }
            collect_run_artefacts(doc, item, page_index, bounds);

            // Depth-first in document order: push children reversed so
            // the stack pops them first-to-last.
            for child in doc.tree.child_items(item).into_iter().rev() {
                stack.push((child, own_dx, own_dy));
            }
        }
    }

    log::debug!(
        "arrangement push complete: {} component(s), {} annotation(s), {} name(s)",
        arrangements.len(),
        doc.artefacts.annotations.len(),
        doc.artefacts.names.len()
    );
    arrangements
}

/// Named destinations and outline entries anchor at a component's first
/// placement.
fn collect_component_artefacts(
    doc: &mut LayoutDocument,
    dom: &Document,
    comp: ComponentId,
    page_index: usize,
    bounds: Rect,
    registered: &mut HashSet<ComponentId>,
) {
    let component = dom.tree.get(comp);
    if component.name.is_none() && component.outline_title.is_none() {
        return;
    }
    if !registered.insert(comp) {
        return;
    }
    if let Some(name) = &component.name {
        doc.artefacts.names.push(NamedDestination {
            name: name.clone(),
            page_index,
            y: bounds.y,
        });
    }
    if let Some(title) = &component.outline_title {
        doc.artefacts.outlines.push(OutlineArtefact {
            title: title.clone(),
            page_index,
            y: bounds.y,
        });
    }
}

fn collect_run_artefacts(doc: &mut LayoutDocument, item: ItemId, page_index: usize, bounds: Rect) {
    let link = match &doc.tree.get(item).kind {
        ItemKind::Run(Run::Text(text)) => text.link.clone(),
        _ => None,
    };
    let Some(link) = link else {
        return;
    };
    let target = match link.strip_prefix('#') {
        Some(name) => LinkTarget::Named(name.to_string()),
        None => LinkTarget::External(link),
    };
    doc.artefacts.annotations.push(AnnotationArtefact {
        page_index,
        rect: bounds,
        target,
    });
}

/// Lines and blocks a region owns, for assertion helpers and the writer.
pub fn region_children(doc: &LayoutDocument, region: ItemId) -> Vec<ItemId> {
    match &doc.tree.region(region).content {
        RegionContent::Empty => Vec::new(),
        RegionContent::Lines(v) | RegionContent::Blocks(v) => v.clone(),
    }
}
