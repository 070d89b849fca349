//! Cross-cutting structural entities collected once per document and
//! emitted once by the output writer: link annotations, outline entries,
//! named destinations and interactive form fields.

use folio_types::Rect;

#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    /// An in-document named destination.
    Named(String),
    /// An external URI.
    External(String),
}

#[derive(Debug, Clone)]
pub struct AnnotationArtefact {
    pub page_index: usize,
    pub rect: Rect,
    pub target: LinkTarget,
}

#[derive(Debug, Clone)]
pub struct OutlineArtefact {
    pub title: String,
    pub page_index: usize,
    pub y: f32,
}

#[derive(Debug, Clone)]
pub struct NamedDestination {
    pub name: String,
    pub page_index: usize,
    pub y: f32,
}

#[derive(Debug, Clone)]
pub struct FormFieldArtefact {
    pub name: String,
    pub page_index: usize,
    pub rect: Rect,
    pub value: Option<String>,
}

#[derive(Debug, Default)]
pub struct Artefacts {
    pub annotations: Vec<AnnotationArtefact>,
    pub outlines: Vec<OutlineArtefact>,
    pub names: Vec<NamedDestination>,
    pub fields: Vec<FormFieldArtefact>,
}

impl Artefacts {
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
            && self.outlines.is_empty()
            && self.names.is_empty()
            && self.fields.is_empty()
    }

    pub fn destination(&self, name: &str) -> Option<&NamedDestination> {
        self.names.iter().find(|d| d.name == name)
    }
}
