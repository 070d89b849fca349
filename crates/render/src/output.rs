//! Structural serialization: catalog, document information, page tree,
//! per-page resources/content/annotations, fonts, image XObjects and the
//! trailer, in that fixed order. Artefacts registered during layout
//! (outlines, named destinations, form fields) are emitted exactly once.

use crate::content;
use crate::error::RenderError;
use crate::writer::{ObjId, ObjectWriter};
use folio_dom::{ComponentKind, Document, ImageDefinition};
use folio_layout::{ItemId, LayoutDocument, LinkTarget};
use std::collections::HashMap;
use std::io::{Seek, Write};

pub fn write_document<W: Write + Seek>(
    dom: &Document,
    doc: &LayoutDocument,
    writer: W,
) -> Result<W, RenderError> {
    let mut w = ObjectWriter::new(writer, "1.7")?;

    let catalog_id = w.alloc_id();
    let info_id = w.alloc_id();
    let pages_id = w.alloc_id();

    let outline_ids: Vec<ObjId> = doc.artefacts.outlines.iter().map(|_| w.alloc_id()).collect();
    let outlines_root = if outline_ids.is_empty() {
        None
    } else {
        Some(w.alloc_id())
    };
    let field_ids: Vec<ObjId> = doc.artefacts.fields.iter().map(|_| w.alloc_id()).collect();

    struct PagePlan {
        item: ItemId,
        page_id: ObjId,
        content_id: ObjId,
        annot_ids: Vec<ObjId>,
    }
    let mut plans: Vec<PagePlan> = Vec::new();
    for &page in doc.all_pages() {
        let index = doc.tree.page(page).page_index;
        let annots = doc
            .artefacts
            .annotations
            .iter()
            .filter(|a| a.page_index == index)
            .count();
        plans.push(PagePlan {
            item: page,
            page_id: w.alloc_id(),
            content_id: w.alloc_id(),
            annot_ids: (0..annots).map(|_| w.alloc_id()).collect(),
        });
    }

    // Fonts and images are shared document-wide; pages reference them
    // through their own per-page resource names.
    let mut font_objects: HashMap<String, ObjId> = HashMap::new();
    for &page in doc.all_pages() {
        for (postscript, _) in doc.tree.page(page).resources.fonts() {
            font_objects
                .entry(postscript.clone())
                .or_insert_with(|| w.alloc_id());
        }
    }
    let images = collect_images(dom);
    let mut image_objects: HashMap<String, ObjId> = HashMap::new();
    for &page in doc.all_pages() {
        for (key, _) in doc.tree.page(page).resources.images() {
            if images.contains_key(key.as_str()) {
                image_objects
                    .entry(key.clone())
                    .or_insert_with(|| w.alloc_id());
            } else {
                log::warn!("image resource {key} has no definition; dropping the XObject");
            }
        }
    }

    let page_id_for_index =
        |index: usize| -> Option<ObjId> { plans.get(index).map(|p| p.page_id) };

    // 1. Catalog.
    w.begin_object(catalog_id)?;
    w.begin_dict()?;
    w.name_pair("Type", "Catalog")?;
    w.ref_pair("Pages", pages_id)?;
    if !doc.numbering.entries().is_empty() {
        w.key("PageLabels")?;
        w.begin_dict()?;
        w.key("Nums")?;
        w.begin_array()?;
        for group in doc.numbering.entries() {
            w.integer(group.start_page_index as i64)?;
            w.begin_dict()?;
            w.name_pair("S", group.style.style_letter())?;
            if group.start_number != 1 {
                w.int_pair("St", group.start_number as i64)?;
            }
            w.end_dict()?;
        }
        w.end_array()?;
        w.end_dict()?;
    }
    if let Some(root) = outlines_root {
        w.ref_pair("Outlines", root)?;
        w.name_pair("PageMode", "UseOutlines")?;
    }
    if !doc.artefacts.names.is_empty() {
        let mut names: Vec<_> = doc.artefacts.names.iter().collect();
        names.sort_by(|a, b| a.name.cmp(&b.name));
        w.key("Names")?;
        w.begin_dict()?;
        w.key("Dests")?;
        w.begin_dict()?;
        w.key("Names")?;
        w.begin_array()?;
        for dest in names {
            if let Some(page_id) = page_id_for_index(dest.page_index) {
                let height = page_height(doc, dest.page_index);
                w.string_literal(dest.name.as_bytes())?;
                w.begin_array()?;
                w.reference(page_id)?;
                w.name("FitH")?;
                w.real(height - dest.y)?;
                w.end_array()?;
            }
        }
        w.end_array()?;
        w.end_dict()?;
        w.end_dict()?;
    }
    if !field_ids.is_empty() {
        w.key("AcroForm")?;
        w.begin_dict()?;
        w.key("Fields")?;
        w.begin_array()?;
        for id in &field_ids {
            w.reference(*id)?;
        }
        w.end_array()?;
        w.key("NeedAppearances")?;
        w.boolean(true)?;
        w.end_dict()?;
    }
    if dom.info.title.is_some() {
        w.key("ViewerPreferences")?;
        w.begin_dict()?;
        w.key("DisplayDocTitle")?;
        w.boolean(true)?;
        w.end_dict()?;
    }
    w.end_dict()?;
    w.end_object()?;

    // 2. Document information.
    w.begin_object(info_id)?;
    w.begin_dict()?;
    if let Some(title) = &dom.info.title {
        w.string_pair("Title", &content::winansi(title))?;
    }
    if let Some(author) = &dom.info.author {
        w.string_pair("Author", &content::winansi(author))?;
    }
    if let Some(subject) = &dom.info.subject {
        w.string_pair("Subject", &content::winansi(subject))?;
    }
    if let Some(keywords) = &dom.info.keywords {
        w.string_pair("Keywords", &content::winansi(keywords))?;
    }
    w.string_pair("Producer", b"folio")?;
    let created = chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string();
    w.string_pair("CreationDate", created.as_bytes())?;
    w.end_dict()?;
    w.end_object()?;

    // 3. Outline tree (one level, chained First/Last/Prev/Next).
    if let Some(root) = outlines_root {
        w.begin_object(root)?;
        w.begin_dict()?;
        w.name_pair("Type", "Outlines")?;
        w.ref_pair("First", outline_ids[0])?;
        w.ref_pair("Last", *outline_ids.last().unwrap())?;
        w.int_pair("Count", outline_ids.len() as i64)?;
        w.end_dict()?;
        w.end_object()?;

        for (i, entry) in doc.artefacts.outlines.iter().enumerate() {
            w.begin_object(outline_ids[i])?;
            w.begin_dict()?;
            w.string_pair("Title", &content::winansi(&entry.title))?;
            w.ref_pair("Parent", root)?;
            if i > 0 {
                w.ref_pair("Prev", outline_ids[i - 1])?;
            }
            if i + 1 < outline_ids.len() {
                w.ref_pair("Next", outline_ids[i + 1])?;
            }
            if let Some(page_id) = page_id_for_index(entry.page_index) {
                let height = page_height(doc, entry.page_index);
                w.key("Dest")?;
                w.begin_array()?;
                w.reference(page_id)?;
                w.name("FitH")?;
                w.real(height - entry.y)?;
                w.end_array()?;
            }
            w.end_dict()?;
            w.end_object()?;
        }
    }

    // 4. Form fields.
    for (i, field) in doc.artefacts.fields.iter().enumerate() {
        let height = page_height(doc, field.page_index);
        w.begin_object(field_ids[i])?;
        w.begin_dict()?;
        w.name_pair("Type", "Annot")?;
        w.name_pair("Subtype", "Widget")?;
        w.name_pair("FT", "Tx")?;
        w.string_pair("T", &content::winansi(&field.name))?;
        if let Some(value) = &field.value {
            w.string_pair("V", &content::winansi(value))?;
        }
        w.key("Rect")?;
        w.rect_value([
            field.rect.x,
            height - field.rect.bottom(),
            field.rect.right(),
            height - field.rect.y,
        ])?;
        if let Some(page_id) = page_id_for_index(field.page_index) {
            w.ref_pair("P", page_id)?;
        }
        w.int_pair("F", 4)?;
        w.end_dict()?;
        w.end_object()?;
    }

    // 5. Page tree.
    w.begin_object(pages_id)?;
    w.begin_dict()?;
    w.name_pair("Type", "Pages")?;
    w.key("Kids")?;
    w.begin_array()?;
    for plan in &plans {
        w.reference(plan.page_id)?;
    }
    w.end_array()?;
    w.int_pair("Count", plans.len() as i64)?;
    w.end_dict()?;
    w.end_object()?;

    // 6. Pages: content stream, link annotations, then the page object.
    for plan in &plans {
        let page = doc.tree.page(plan.item);
        let index = page.page_index;
        let size = page.size;

        let bytes = content::page_content(dom, doc, plan.item)?;
        w.stream_object(plan.content_id, &bytes)?;

        let annotations: Vec<_> = doc
            .artefacts
            .annotations
            .iter()
            .filter(|a| a.page_index == index)
            .collect();
        for (i, annotation) in annotations.iter().enumerate() {
            w.begin_object(plan.annot_ids[i])?;
            w.begin_dict()?;
            w.name_pair("Type", "Annot")?;
            w.name_pair("Subtype", "Link")?;
            w.key("Rect")?;
            w.rect_value([
                annotation.rect.x,
                size.height - annotation.rect.bottom(),
                annotation.rect.right(),
                size.height - annotation.rect.y,
            ])?;
            w.key("Border")?;
            w.begin_array()?;
            w.integer(0)?;
            w.integer(0)?;
            w.integer(0)?;
            w.end_array()?;
            match &annotation.target {
                LinkTarget::External(uri) => {
                    w.key("A")?;
                    w.begin_dict()?;
                    w.name_pair("Type", "Action")?;
                    w.name_pair("S", "URI")?;
                    w.string_pair("URI", uri.as_bytes())?;
                    w.end_dict()?;
                }
                LinkTarget::Named(name) => match doc.artefacts.destination(name) {
                    Some(dest) => {
                        if let Some(page_id) = page_id_for_index(dest.page_index) {
                            let height = page_height(doc, dest.page_index);
                            w.key("Dest")?;
                            w.begin_array()?;
                            w.reference(page_id)?;
                            w.name("FitH")?;
                            w.real(height - dest.y)?;
                            w.end_array()?;
                        }
                    }
                    None => {
                        log::warn!("link target #{name} has no destination; emitting a dead link");
                    }
                },
            }
            w.end_dict()?;
            w.end_object()?;
        }

        w.begin_object(plan.page_id)?;
        w.begin_dict()?;
        w.name_pair("Type", "Page")?;
        w.ref_pair("Parent", pages_id)?;
        w.key("MediaBox")?;
        w.rect_value([0.0, 0.0, size.width, size.height])?;
        w.ref_pair("Contents", plan.content_id)?;

        w.key("Resources")?;
        w.begin_dict()?;
        let fonts = page.resources.fonts();
        if !fonts.is_empty() {
            w.key("Font")?;
            w.begin_dict()?;
            for (postscript, resource) in fonts {
                w.ref_pair(resource, font_objects[postscript])?;
            }
            w.end_dict()?;
        }
        let page_images: Vec<_> = page
            .resources
            .images()
            .iter()
            .filter(|(key, _)| image_objects.contains_key(key))
            .collect();
        if !page_images.is_empty() {
            w.key("XObject")?;
            w.begin_dict()?;
            for (key, resource) in page_images {
                w.ref_pair(resource, image_objects[key])?;
            }
            w.end_dict()?;
        }
        w.end_dict()?;

        let mut page_annots: Vec<ObjId> = plan.annot_ids.clone();
        for (i, field) in doc.artefacts.fields.iter().enumerate() {
            if field.page_index == index {
                page_annots.push(field_ids[i]);
            }
        }
        if !page_annots.is_empty() {
            w.key("Annots")?;
            w.begin_array()?;
            for id in page_annots {
                w.reference(id)?;
            }
            w.end_array()?;
        }
        w.end_dict()?;
        w.end_object()?;
    }

    // 7. Shared font and image resources.
    for (postscript, id) in &font_objects {
        w.begin_object(*id)?;
        w.begin_dict()?;
        w.name_pair("Type", "Font")?;
        w.name_pair("Subtype", "Type1")?;
        w.name_pair("BaseFont", postscript)?;
        w.name_pair("Encoding", "WinAnsiEncoding")?;
        w.end_dict()?;
        w.end_object()?;
    }
    for (key, id) in &image_objects {
        let def = images[key.as_str()];
        write_image_xobject(&mut w, *id, def)?;
    }

    // 8. Trailer with the document ID pair.
    let file_id: [u8; 16] = rand::random();
    let out = w.finish(catalog_id, Some(info_id), file_id)?;
    log::debug!("document serialized: {} page(s)", plans.len());
    Ok(out)
}

fn page_height(doc: &LayoutDocument, page_index: usize) -> f32 {
    doc.all_pages()
        .get(page_index)
        .map(|p| doc.tree.page(*p).size.height)
        .unwrap_or(0.0)
}

fn collect_images(dom: &Document) -> HashMap<&str, &ImageDefinition> {
    let mut out = HashMap::new();
    for id in dom.tree.ids() {
        if let ComponentKind::Image(def) = &dom.tree.get(id).kind {
            out.insert(def.name.as_str(), def);
        }
    }
    out
}

/// Raw RGB image XObject. A 1x1 placeholder sample keeps the object graph
/// valid when a definition carries no data.
fn write_image_xobject<W: Write + Seek>(
    w: &mut ObjectWriter<W>,
    id: ObjId,
    def: &ImageDefinition,
) -> Result<(), RenderError> {
    let (width, height, data): (u32, u32, Vec<u8>) = match &def.data {
        Some(data) => (def.pixel_width.max(1), def.pixel_height.max(1), data.to_vec()),
        None => (1, 1, vec![0xFF, 0xFF, 0xFF]),
    };
    w.begin_object(id)?;
    w.begin_dict()?;
    w.name_pair("Type", "XObject")?;
    w.name_pair("Subtype", "Image")?;
    w.int_pair("Width", width as i64)?;
    w.int_pair("Height", height as i64)?;
    w.name_pair("ColorSpace", "DeviceRGB")?;
    w.int_pair("BitsPerComponent", 8)?;
    w.int_pair("Length", data.len() as i64)?;
    w.end_dict()?;
    w.begin_stream()?;
    w.stream_bytes(&data)?;
    w.end_stream()?;
    w.end_object()?;
    Ok(())
}
