use thiserror::Error;

/// Splicing failures. In lenient conformance most of these are logged
/// and skipped instead of raised; strict mode surfaces them all.
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source document has no page tree: {0}")]
    MissingPageTree(String),

    #[error("page tree entry is not an object reference: {0}")]
    NotAReference(String),

    #[error("frame start index {start} is outside the {total}-page source")]
    PageStartOutOfRange { start: usize, total: usize },

    #[error("overlay source contains no pages")]
    EmptyOverlay,

    #[error("{0}")]
    Other(String),
}
