use crate::component::{Component, ComponentId, ComponentTree};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
}

/// A complete document: metadata plus an ordered list of top-level page
/// (or page-group) components in the tree.
#[derive(Debug, Default)]
pub struct Document {
    pub info: DocumentInfo,
    pub tree: ComponentTree,
    pages: Vec<ComponentId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info(info: DocumentInfo) -> Self {
        Self {
            info,
            ..Self::default()
        }
    }

    /// Registers a top-level page or page-group component.
    pub fn add_page(&mut self, component: Component) -> ComponentId {
        let id = self.tree.add(component);
        self.pages.push(id);
        id
    }

    pub fn pages(&self) -> &[ComponentId] {
        &self.pages
    }
}
