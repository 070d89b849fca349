//! Frame resolution and output assembly. Each frame contributes a run of
//! page references from its source; writing replays those references as
//! new page objects under a fresh page tree, deep-copying everything they
//! reach and keeping in-document named destinations alive through the
//! original-to-new id mapping.

use crate::copier::{merge_resources, ObjectCopier};
use crate::error::ComposeError;
use crate::pages;
use folio_dom::{
    Conformance, FrameDefinition, FrameSource, FramesetDefinition, OverlayRepeat, PageCount,
};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Clone)]
pub struct OverlayPage {
    pub source: usize,
    pub page_id: ObjectId,
}

/// One output page: the original page object it replays plus an optional
/// overlay page merged on top.
#[derive(Debug, Clone)]
pub struct ModifyPageReference {
    pub source: usize,
    pub original_id: ObjectId,
    pub dictionary: Dictionary,
    pub overlay: Option<OverlayPage>,
}

impl ModifyPageReference {
    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }
}

pub struct FramesetComposer {
    conformance: Conformance,
    sources: Vec<Document>,
    references: Vec<ModifyPageReference>,
}

impl FramesetComposer {
    pub fn new(conformance: Conformance) -> Self {
        Self {
            conformance,
            sources: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn from_definition(definition: &FramesetDefinition) -> Result<Self, ComposeError> {
        let mut composer = Self::new(definition.conformance);
        for frame in &definition.frames {
            composer.add_frame(frame)?;
        }
        Ok(composer)
    }

    fn load_source(&mut self, source: &FrameSource) -> Result<usize, ComposeError> {
        let doc = match source {
            FrameSource::Path(path) => Document::load(path)?,
            FrameSource::Bytes(bytes) => Document::load_mem(bytes)?,
        };
        self.sources.push(doc);
        Ok(self.sources.len() - 1)
    }

    /// Resolves one frame into page references, returning how many pages
    /// it contributed. The emitted count is always
    /// `max(0, min(requested, total - start))`.
    pub fn add_frame(&mut self, frame: &FrameDefinition) -> Result<usize, ComposeError> {
        let source = self.load_source(&frame.source)?;
        let page_ids = pages::collect_page_ids(&self.sources[source], self.conformance)?;
        let total = page_ids.len();

        if frame.start_index >= total {
            let err = ComposeError::PageStartOutOfRange {
                start: frame.start_index,
                total,
            };
            match self.conformance {
                Conformance::Strict => return Err(err),
                Conformance::Lenient => {
                    log::warn!("{err}; the frame emits zero pages");
                    return Ok(0);
                }
            }
        }

        let count = match frame.count {
            PageCount::Fixed(requested) => requested.min(total - frame.start_index),
            PageCount::AppendAll => total - frame.start_index,
        };

        let overlay = match &frame.overlay {
            Some(def) => {
                let overlay_source = self.load_source(&def.source)?;
                let overlay_pages =
                    pages::collect_page_ids(&self.sources[overlay_source], self.conformance)?;
                if overlay_pages.is_empty() {
                    match self.conformance {
                        Conformance::Strict => return Err(ComposeError::EmptyOverlay),
                        Conformance::Lenient => {
                            log::warn!("overlay source has no pages; skipping the overlay");
                            None
                        }
                    }
                } else {
                    Some((overlay_source, overlay_pages, def.repeat))
                }
            }
            None => None,
        };

        let mut emitted = 0usize;
        for i in 0..count {
            let original_id = page_ids[frame.start_index + i];
            let dict = match self.sources[source].get_dictionary(original_id) {
                Ok(dict) => dict.clone(),
                Err(_) => {
                    let err = ComposeError::MissingPageTree(format!(
                        "page {original_id:?} is not a dictionary"
                    ));
                    match self.conformance {
                        Conformance::Strict => return Err(err),
                        Conformance::Lenient => {
                            log::warn!("{err}; skipping the page");
                            continue;
                        }
                    }
                }
            };
            let overlay_page = overlay.as_ref().and_then(|(src, ids, repeat)| {
                overlay_for(*repeat, i, count, ids).map(|page_id| OverlayPage {
                    source: *src,
                    page_id,
                })
            });
            self.references.push(ModifyPageReference {
                source,
                original_id,
                dictionary: dict,
                overlay: overlay_page,
            });
            emitted += 1;
        }
        log::debug!(
            "frame resolved: start {} count {:?} -> {} page(s) emitted",
            frame.start_index,
            frame.count,
            emitted
        );
        Ok(emitted)
    }

    pub fn references(&self) -> &[ModifyPageReference] {
        &self.references
    }

    pub fn page_count(&self) -> usize {
        self.references.len()
    }

    /// Builds the spliced output document.
    pub fn build_document(&self) -> Result<Document, ComposeError> {
        let mut out = Document::with_version("1.7");
        let pages_id = out.new_object_id();
        let mut id_maps: Vec<HashMap<ObjectId, ObjectId>> =
            vec![HashMap::new(); self.sources.len()];
        let mut kids: Vec<Object> = Vec::new();

        for reference in &self.references {
            // Pre-register the page so anything referring back to it
            // (annotations, destinations) maps to the new object.
            let new_page_id = out.add_object(Object::Null);
            id_maps[reference.source].insert(reference.original_id, new_page_id);

            let mut source_dict = reference.dictionary.clone();
            // The parent belongs to the new tree, never the old one.
            source_dict.remove(b"Parent");
            let remapped = {
                let map = &mut id_maps[reference.source];
                let mut copier =
                    ObjectCopier::new(&self.sources[reference.source], &mut out, map);
                copier.remap_references(Object::Dictionary(source_dict))?
            };
            let mut page_dict = match remapped {
                Object::Dictionary(dict) => dict,
                _ => unreachable!("a remapped dictionary stays a dictionary"),
            };
            page_dict.set("Parent", Object::Reference(pages_id));
            page_dict.set("Type", Object::Name(b"Page".to_vec()));

            if let Some(overlay) = &reference.overlay {
                self.apply_overlay(&mut out, &mut id_maps, &mut page_dict, overlay)?;
            }

            match out.objects.get_mut(&new_page_id) {
                Some(slot) => *slot = Object::Dictionary(page_dict),
                None => return Err(ComposeError::Other("lost page object slot".into())),
            }
            kids.push(Object::Reference(new_page_id));
        }

        let count = kids.len() as i64;
        out.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }
            .into(),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        let destinations = self.rewritten_destinations(&id_maps);
        if !destinations.is_empty() {
            let mut names_array: Vec<Object> = Vec::new();
            for (name, dest) in destinations {
                names_array.push(Object::String(name, StringFormat::Literal));
                names_array.push(dest);
            }
            catalog.set(
                "Names",
                dictionary! {
                    "Dests" => dictionary! { "Names" => names_array },
                },
            );
        }
        let catalog_id = out.add_object(catalog);
        out.trailer.set("Root", catalog_id);
        Ok(out)
    }

    pub fn write_to<W: Write>(&self, target: &mut W) -> Result<(), ComposeError> {
        let mut document = self.build_document()?;
        document.save_to(target)?;
        Ok(())
    }

    /// Appends the overlay page's content streams after the page's own
    /// and merges its resources, so overlay marks draw on top.
    fn apply_overlay(
        &self,
        out: &mut Document,
        id_maps: &mut [HashMap<ObjectId, ObjectId>],
        page_dict: &mut Dictionary,
        overlay: &OverlayPage,
    ) -> Result<(), ComposeError> {
        let overlay_doc = &self.sources[overlay.source];
        let overlay_dict = match overlay_doc.get_dictionary(overlay.page_id) {
            Ok(dict) => dict.clone(),
            Err(_) => {
                let err = ComposeError::MissingPageTree(format!(
                    "overlay page {:?} is not a dictionary",
                    overlay.page_id
                ));
                return match self.conformance {
                    Conformance::Strict => Err(err),
                    Conformance::Lenient => {
                        log::warn!("{err}; skipping the overlay");
                        Ok(())
                    }
                };
            }
        };

        let map = &mut id_maps[overlay.source];
        let mut copier = ObjectCopier::new(overlay_doc, out, map);

        let overlay_contents = match overlay_dict.get(b"Contents") {
            Ok(contents) => copier.remap_references(contents.clone())?,
            Err(_) => {
                log::warn!("overlay page has no content stream; nothing to merge");
                return Ok(());
            }
        };
        let overlay_resources = match overlay_dict.get(b"Resources") {
            Ok(Object::Reference(id)) => {
                let resolved = overlay_doc.get_dictionary(*id).map(Clone::clone);
                match resolved {
                    Ok(dict) => Some(copier.remap_references(Object::Dictionary(dict))?),
                    Err(_) => None,
                }
            }
            Ok(Object::Dictionary(dict)) => {
                Some(copier.remap_references(Object::Dictionary(dict.clone()))?)
            }
            _ => None,
        };

        // Normalize both content entries to arrays and concatenate.
        let mut contents: Vec<Object> = match page_dict.get(b"Contents") {
            Ok(Object::Array(arr)) => arr.clone(),
            Ok(other) => vec![other.clone()],
            Err(_) => Vec::new(),
        };
        match overlay_contents {
            Object::Array(arr) => contents.extend(arr),
            other => contents.push(other),
        }
        page_dict.set("Contents", Object::Array(contents));

        if let Some(Object::Dictionary(overlay_res)) = overlay_resources {
            match page_dict.get(b"Resources").cloned() {
                Ok(Object::Dictionary(mut base)) => {
                    merge_resources(&mut base, overlay_res);
                    page_dict.set("Resources", Object::Dictionary(base));
                }
                Ok(Object::Reference(id)) => {
                    if let Ok(Object::Dictionary(base)) = out.get_object_mut(id) {
                        merge_resources(base, overlay_res);
                    }
                }
                _ => {
                    page_dict.set("Resources", Object::Dictionary(overlay_res));
                }
            }
        }
        Ok(())
    }

    /// Named destinations from every source whose target page was copied,
    /// rewritten through the id maps so in-document links keep working.
    fn rewritten_destinations(
        &self,
        id_maps: &[HashMap<ObjectId, ObjectId>],
    ) -> Vec<(Vec<u8>, Object)> {
        let mut out: Vec<(Vec<u8>, Object)> = Vec::new();
        for (source_index, source) in self.sources.iter().enumerate() {
            for (name, dest) in collect_named_destinations(source) {
                if out.iter().any(|(n, _)| n == &name) {
                    continue;
                }
                if let Some(rewritten) = rewrite_destination(&dest, &id_maps[source_index]) {
                    out.push((name, rewritten));
                }
            }
        }
        out.sort_by(|(a, _), (b, _)| a.cmp(b));
        out
    }
}

fn overlay_for(
    repeat: OverlayRepeat,
    index: usize,
    count: usize,
    overlay_pages: &[ObjectId],
) -> Option<ObjectId> {
    if overlay_pages.is_empty() {
        return None;
    }
    match repeat {
        OverlayRepeat::All => Some(overlay_pages[index % overlay_pages.len()]),
        OverlayRepeat::Once => overlay_pages.get(index).copied(),
        OverlayRepeat::First => (index == 0).then(|| overlay_pages[0]),
        OverlayRepeat::Last => {
            (index + 1 == count).then(|| overlay_pages[overlay_pages.len() - 1])
        }
    }
}

/// Flattens a source's named destinations from the catalog's Dests name
/// tree (or the legacy Dests dictionary).
fn collect_named_destinations(doc: &Document) -> Vec<(Vec<u8>, Object)> {
    let mut out = Vec::new();
    let Ok(root_id) = doc.trailer.get(b"Root").and_then(Object::as_reference) else {
        return out;
    };
    let Ok(catalog) = doc.get_dictionary(root_id) else {
        return out;
    };

    if let Ok(names) = catalog.get(b"Names") {
        if let Some(names_dict) = resolve_dict(doc, names) {
            if let Ok(dests) = names_dict.get(b"Dests") {
                if let Some(dests_dict) = resolve_dict(doc, dests) {
                    collect_name_tree(doc, dests_dict, &mut out);
                }
            }
        }
    }
    if let Ok(dests) = catalog.get(b"Dests") {
        if let Some(dests_dict) = resolve_dict(doc, dests) {
            for (name, value) in dests_dict.iter() {
                out.push((name.clone(), value.clone()));
            }
        }
    }
    out
}

fn collect_name_tree(doc: &Document, node: &Dictionary, out: &mut Vec<(Vec<u8>, Object)>) {
    if let Ok(Object::Array(pairs)) = node.get(b"Names") {
        let mut iter = pairs.iter();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            if let Object::String(bytes, _) = key {
                out.push((bytes.clone(), value.clone()));
            }
        }
    }
    if let Ok(Object::Array(kids)) = node.get(b"Kids") {
        for kid in kids {
            if let Ok(kid_id) = kid.as_reference() {
                if let Ok(kid_dict) = doc.get_dictionary(kid_id) {
                    collect_name_tree(doc, kid_dict, out);
                }
            }
        }
    }
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        _ => None,
    }
}

/// A destination survives the splice only if its target page was copied.
/// `[page /FitH y]`-style arrays are rewritten; dictionary destinations
/// rewrite their /D array.
fn rewrite_destination(dest: &Object, id_map: &HashMap<ObjectId, ObjectId>) -> Option<Object> {
    match dest {
        Object::Array(arr) => {
            let first = arr.first()?;
            let old_page = first.as_reference().ok()?;
            let new_page = id_map.get(&old_page)?;
            let mut rewritten = arr.clone();
            rewritten[0] = Object::Reference(*new_page);
            Some(Object::Array(rewritten))
        }
        Object::Dictionary(dict) => {
            let inner = dict.get(b"D").ok()?;
            let rewritten = rewrite_destination(inner, id_map)?;
            let mut new_dict = dict.clone();
            new_dict.set("D", rewritten);
            Some(Object::Dictionary(new_dict))
        }
        _ => None,
    }
}
