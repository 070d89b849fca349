//! Pages and their resource lists.

use crate::tree::{ItemId, ItemKind, LayoutTree};
use folio_dom::ComponentId;
use folio_types::{Rect, Size};

/// Per-page registry of fonts and XObjects referenced by content. Any item
/// needing a resource registers into the nearest enclosing page, found by
/// walking parent handles.
#[derive(Debug, Default)]
pub struct ResourceList {
    fonts: Vec<(String, String)>,
    images: Vec<(String, String)>,
}

impl ResourceList {
    /// Registers a font by PostScript name, returning its resource name
    /// (`F1`, `F2`, ..). Registration is idempotent per name.
    pub fn register_font(&mut self, postscript_name: &str) -> String {
        if let Some((_, res)) = self.fonts.iter().find(|(ps, _)| ps == postscript_name) {
            return res.clone();
        }
        let res = format!("F{}", self.fonts.len() + 1);
        self.fonts.push((postscript_name.to_string(), res.clone()));
        res
    }

    /// Registers an image by document-wide key, returning its XObject
    /// resource name (`Im1`, `Im2`, ..).
    pub fn register_image(&mut self, key: &str) -> String {
        if let Some((_, res)) = self.images.iter().find(|(k, _)| k == key) {
            return res.clone();
        }
        let res = format!("Im{}", self.images.len() + 1);
        self.images.push((key.to_string(), res.clone()));
        res
    }

    /// (postscript_name, resource_name) pairs in registration order.
    pub fn fonts(&self) -> &[(String, String)] {
        &self.fonts
    }

    /// (image_key, resource_name) pairs in registration order.
    pub fn images(&self) -> &[(String, String)] {
        &self.images
    }
}

#[derive(Debug)]
pub struct Page {
    pub content_block: Option<ItemId>,
    pub header_block: Option<ItemId>,
    pub footer_block: Option<ItemId>,
    /// Dense index in the document's page list, stable once assigned.
    pub page_index: usize,
    pub size: Size,
    pub resources: ResourceList,
}

impl LayoutTree {
    pub fn open_page(
        &mut self,
        component: Option<ComponentId>,
        page_index: usize,
        size: Size,
    ) -> ItemId {
        self.add(
            None,
            component,
            Rect::from_size(size),
            ItemKind::Page(Page {
                content_block: None,
                header_block: None,
                footer_block: None,
                page_index,
                size,
                resources: ResourceList::default(),
            }),
        )
    }

    /// Registers a font against the page owning `item`.
    pub fn register_font_for(&mut self, item: ItemId, postscript_name: &str) -> String {
        let page = self
            .owning_page(item)
            .expect("layout item is not attached to a page");
        self.page_mut(page).resources.register_font(postscript_name)
    }

    /// Registers an image against the page owning `item`.
    pub fn register_image_for(&mut self, item: ItemId, key: &str) -> String {
        let page = self
            .owning_page(item)
            .expect("layout item is not attached to a page");
        self.page_mut(page).resources.register_image(key)
    }

    pub fn close_page(&mut self, page: ItemId) {
        if let Some(content) = self.page(page).content_block {
            if !self.is_closed(content) {
                self.close_block(content, None);
            }
        }
        if !self.is_closed(page) {
            self.close(page);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_registration_is_idempotent() {
        let mut list = ResourceList::default();
        let a = list.register_font("Helvetica");
        let b = list.register_font("Helvetica");
        let c = list.register_font("Times-Roman");
        assert_eq!(a, "F1");
        assert_eq!(b, "F1");
        assert_eq!(c, "F2");
        assert_eq!(list.fonts().len(), 2);
    }
}
