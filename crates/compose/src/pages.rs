//! Source page-tree extraction under the conformance knob: strict mode
//! raises on any malformed structure, lenient mode logs and skips.

use crate::error::ComposeError;
use folio_dom::Conformance;
use lopdf::{Document, Object, ObjectId};
use std::collections::HashSet;

/// Ordered page object ids of a source document, walked from the catalog
/// through the page tree rather than trusting any cached page table.
pub fn collect_page_ids(
    doc: &Document,
    conformance: Conformance,
) -> Result<Vec<ObjectId>, ComposeError> {
    let root_id = match doc.trailer.get(b"Root").and_then(Object::as_reference) {
        Ok(id) => id,
        Err(_) => {
            return degrade_to_empty(
                conformance,
                ComposeError::MissingPageTree("trailer carries no Root reference".into()),
            );
        }
    };
    let catalog = match doc.get_dictionary(root_id) {
        Ok(dict) => dict,
        Err(_) => {
            return degrade_to_empty(
                conformance,
                ComposeError::MissingPageTree(format!("catalog {root_id:?} is not a dictionary")),
            );
        }
    };
    let pages_id = match catalog.get(b"Pages").and_then(Object::as_reference) {
        Ok(id) => id,
        Err(_) => {
            return degrade_to_empty(
                conformance,
                ComposeError::MissingPageTree("catalog carries no Pages reference".into()),
            );
        }
    };

    let mut out = Vec::new();
    let mut visited = HashSet::new();
    walk(doc, pages_id, conformance, &mut out, &mut visited)?;
    Ok(out)
}

fn walk(
    doc: &Document,
    node_id: ObjectId,
    conformance: Conformance,
    out: &mut Vec<ObjectId>,
    visited: &mut HashSet<ObjectId>,
) -> Result<(), ComposeError> {
    if !visited.insert(node_id) {
        log::warn!("page tree cycle at {node_id:?}; ignoring the repeated node");
        return Ok(());
    }
    let dict = match doc.get_dictionary(node_id) {
        Ok(dict) => dict,
        Err(_) => {
            return degrade(
                conformance,
                ComposeError::MissingPageTree(format!(
                    "page tree node {node_id:?} is not a dictionary"
                )),
            );
        }
    };

    let node_type = dict
        .get(b"Type")
        .and_then(Object::as_name)
        .ok()
        .map(|n| n.to_vec());
    let is_pages = match node_type.as_deref() {
        Some(b"Pages") => true,
        Some(b"Page") => false,
        // Tolerate a missing Type entry by inferring from structure.
        _ => dict.has(b"Kids"),
    };

    if !is_pages {
        out.push(node_id);
        return Ok(());
    }

    let kids = match dict.get(b"Kids").and_then(Object::as_array) {
        Ok(kids) => kids.clone(),
        Err(_) => {
            return degrade(
                conformance,
                ComposeError::MissingPageTree(format!("Pages node {node_id:?} has no Kids array")),
            );
        }
    };
    for kid in kids {
        match kid.as_reference() {
            Ok(kid_id) => walk(doc, kid_id, conformance, out, visited)?,
            Err(_) => {
                degrade(
                    conformance,
                    ComposeError::NotAReference(format!("kid entry of {node_id:?}")),
                )?;
            }
        }
    }
    Ok(())
}

/// Strict: propagate. Lenient: warn and continue.
fn degrade(conformance: Conformance, err: ComposeError) -> Result<(), ComposeError> {
    match conformance {
        Conformance::Strict => Err(err),
        Conformance::Lenient => {
            log::warn!("{err}; skipping");
            Ok(())
        }
    }
}

fn degrade_to_empty(
    conformance: Conformance,
    err: ComposeError,
) -> Result<Vec<ObjectId>, ComposeError> {
    match conformance {
        Conformance::Strict => Err(err),
        Conformance::Lenient => {
            log::warn!("{err}; treating the source as empty");
            Ok(Vec::new())
        }
    }
}
