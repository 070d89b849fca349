//! PDF structural writers: the strictly nested object-writing protocol,
//! content-stream generation and whole-document serialization.

pub mod content;
pub mod error;
pub mod output;
pub mod writer;

pub use error::RenderError;
pub use output::write_document;
pub use writer::{ObjId, ObjectWriter};
