//! Frameset definitions: splicing page ranges out of existing PDF files
//! into a new output document, optionally overlaying content on top.

use std::path::PathBuf;
use std::sync::Arc;

/// How malformed structural data in a source file is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Conformance {
    /// Malformed structures abort composition with an error.
    Strict,
    /// Malformed structures are logged and skipped.
    #[default]
    Lenient,
}

#[derive(Debug, Clone)]
pub enum FrameSource {
    Path(PathBuf),
    Bytes(Arc<Vec<u8>>),
}

impl FrameSource {
    pub fn bytes(data: Vec<u8>) -> Self {
        FrameSource::Bytes(Arc::new(data))
    }
}

/// Number of pages a frame pulls from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCount {
    Fixed(usize),
    /// Every page from the start index to the end of the source.
    AppendAll,
}

/// How overlay pages are distributed across the frame's output pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayRepeat {
    /// Cycle overlay pages across every output page.
    All,
    /// Consume overlay pages 1:1 in order until exhausted.
    Once,
    /// Only the first output page receives the first overlay page.
    First,
    /// Only the last output page receives the last overlay page.
    Last,
}

#[derive(Debug, Clone)]
pub struct OverlayDefinition {
    pub source: FrameSource,
    pub repeat: OverlayRepeat,
}

#[derive(Debug, Clone)]
pub struct FrameDefinition {
    pub source: FrameSource,
    /// Zero-based index of the first source page to pull.
    pub start_index: usize,
    pub count: PageCount,
    pub overlay: Option<OverlayDefinition>,
}

impl FrameDefinition {
    pub fn all_of(source: FrameSource) -> Self {
        Self {
            source,
            start_index: 0,
            count: PageCount::AppendAll,
            overlay: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FramesetDefinition {
    pub frames: Vec<FrameDefinition>,
    pub conformance: Conformance,
}
