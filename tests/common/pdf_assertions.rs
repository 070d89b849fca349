use lopdf::Document as LopdfDocument;

/// Extract all text content from a PDF document.
pub fn extract_text(doc: &LopdfDocument) -> String {
    let mut text = String::new();
    let pages = doc.get_pages();
    for page_num in 1..=pages.len() {
        if let Ok(page_text) = doc.extract_text(&[page_num as u32]) {
            text.push_str(&page_text);
            text.push('\n');
        }
    }
    text
}

/// BaseFont names referenced by any page's resources.
pub fn extract_font_names(doc: &LopdfDocument) -> Vec<String> {
    let mut fonts = std::collections::BTreeSet::new();
    for (_page_num, page_id) in doc.get_pages() {
        let Ok(page_dict) = doc.get_dictionary(page_id) else {
            continue;
        };
        let resources = match page_dict.get(b"Resources") {
            Ok(obj) => obj,
            Err(_) => continue,
        };
        let resources_dict = match resources.as_reference() {
            Ok(id) => doc.get_dictionary(id).ok(),
            Err(_) => resources.as_dict().ok(),
        };
        let Some(resources_dict) = resources_dict else {
            continue;
        };
        let Ok(font_dict_obj) = resources_dict.get(b"Font") else {
            continue;
        };
        let font_dict = match font_dict_obj.as_reference() {
            Ok(id) => doc.get_dictionary(id).ok(),
            Err(_) => font_dict_obj.as_dict().ok(),
        };
        let Some(font_dict) = font_dict else {
            continue;
        };
        for (_, value) in font_dict.iter() {
            let entry = match value.as_reference() {
                Ok(id) => doc.get_dictionary(id).ok(),
                Err(_) => value.as_dict().ok(),
            };
            if let Some(entry) = entry {
                if let Ok(base) = entry.get(b"BaseFont") {
                    if let Ok(name) = base.as_name() {
                        fonts.insert(String::from_utf8_lossy(name).to_string());
                    }
                }
            }
        }
    }
    fonts.into_iter().collect()
}

/// The raw, decoded content stream bytes of a page (1-based index).
pub fn page_content_string(doc: &LopdfDocument, page_number: u32) -> String {
    let pages = doc.get_pages();
    let Some(page_id) = pages.get(&page_number) else {
        return String::new();
    };
    match doc.get_page_content(*page_id) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(_) => String::new(),
    }
}
