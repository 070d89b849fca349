pub mod fixtures;
pub mod pdf_assertions;

use folio::dom::Document;
use folio::{Composer, Error};
use lopdf::Document as LopdfDocument;
use std::io::Cursor;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wrapper around a generated PDF with helper methods.
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Save to a file for manual debugging.
    #[allow(dead_code)]
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{name}.pdf"), &self.bytes)
    }
}

/// Generate a PDF from a document tree, in memory.
pub fn generate_pdf(document: &Document) -> Result<GeneratedPdf, Error> {
    let writer = Cursor::new(Vec::new());
    let out = Composer::new().generate(document, writer)?;
    GeneratedPdf::from_bytes(out.into_inner())
        .map_err(|e| Error::Render(folio::render::RenderError::Other(e.to_string())))
}

/// Asserts that the extracted text of a generated PDF contains `needle`.
#[macro_export]
macro_rules! assert_pdf_contains_text {
    ($pdf:expr, $needle:expr) => {{
        let text = $crate::common::pdf_assertions::extract_text(&$pdf.doc);
        assert!(
            text.contains($needle),
            "expected text {:?} in extracted PDF text:\n{}",
            $needle,
            text
        );
    }};
}
