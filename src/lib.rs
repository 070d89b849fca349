//! folio — a document-composition core: the page-flow layout engine and
//! the PDF object-graph serializer behind it.
//!
//! A [`dom::Document`] (a tree of styled components) is laid out into
//! pages, columns, lines and runs by [`folio_layout`], then serialized as
//! cross-referenced binary PDF by [`folio_render`]. Framesets splice page
//! ranges out of existing PDF files through [`folio_compose`].
//!
//! ```no_run
//! use folio::dom::{Component, Document};
//! use folio::style::Style;
//! use folio::Composer;
//! use std::io::Cursor;
//!
//! let mut doc = Document::new();
//! let page = doc.add_page(Component::page(Style::default()));
//! doc.tree.add_child(page, Component::text("Hello", Style::default()));
//!
//! let bytes = Composer::new()
//!     .generate(&doc, Cursor::new(Vec::new()))
//!     .unwrap()
//!     .into_inner();
//! ```

pub use folio_compose as compose;
pub use folio_dom as dom;
pub use folio_layout as layout;
pub use folio_render as render;
pub use folio_style as style;
pub use folio_types as types;

use folio_compose::{ComposeError, FramesetComposer};
use folio_dom::{Document, FramesetDefinition};
use folio_layout::{
    push_component_layout, ArrangementMap, BuiltinMetrics, FontMetrics, LayoutDocument,
    LayoutError,
};
use folio_render::{write_document, RenderError};
use std::io::{Seek, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// The high-level entry point: lays out a document and serializes it, or
/// splices a frameset.
pub struct Composer {
    metrics: Box<dyn FontMetrics>,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    pub fn new() -> Self {
        Self {
            metrics: Box::new(BuiltinMetrics),
        }
    }

    /// Swaps in a different measurement service (a real font engine).
    pub fn with_metrics(metrics: Box<dyn FontMetrics>) -> Self {
        Self { metrics }
    }

    /// Runs layout and the arrangement push-back without serializing,
    /// for callers that only want geometry.
    pub fn layout(&self, document: &Document) -> Result<(LayoutDocument, ArrangementMap), Error> {
        let mut laid = folio_layout::layout_document(document, self.metrics.as_ref())?;
        let arrangements = push_component_layout(&mut laid, document);
        Ok((laid, arrangements))
    }

    /// Lays the document out and writes the complete PDF to `writer`,
    /// returning the writer.
    pub fn generate<W: Write + Seek>(&self, document: &Document, writer: W) -> Result<W, Error> {
        let (laid, _arrangements) = self.layout(document)?;
        Ok(write_document(document, &laid, writer)?)
    }

    /// Like [`Composer::generate`], but also returns the per-component
    /// arrangement map for inspection.
    pub fn generate_with_arrangements<W: Write + Seek>(
        &self,
        document: &Document,
        writer: W,
    ) -> Result<(W, ArrangementMap), Error> {
        let (laid, arrangements) = self.layout(document)?;
        let out = write_document(document, &laid, writer)?;
        Ok((out, arrangements))
    }

    /// Splices a frameset into `writer` and returns the emitted page
    /// count.
    pub fn compose_frameset<W: Write>(
        &self,
        definition: &FramesetDefinition,
        writer: &mut W,
    ) -> Result<usize, Error> {
        let composer = FramesetComposer::from_definition(definition)?;
        let pages = composer.page_count();
        composer.write_to(writer)?;
        Ok(pages)
    }
}
