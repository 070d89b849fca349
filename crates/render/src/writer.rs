//! The ordered object-writing protocol over any `Write + Seek` sink.
//!
//! Callers drive strictly nested begin/end calls matching PDF's
//! dictionary/array/stream grammar; violating the nesting is a
//! programming error and panics rather than producing a corrupt file.
//! Byte offsets of every indirect object are recorded as they are
//! written, so the cross-reference table and trailer fall out at finish.

use crate::error::RenderError;
use std::collections::BTreeMap;
use std::io::{Seek, Write};

/// Indirect object identifier. Generation is always zero for freshly
/// written documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object,
    Dict,
    Array,
    Stream,
}

pub struct ObjectWriter<W: Write + Seek> {
    writer: W,
    offsets: BTreeMap<u32, u64>,
    next_id: u32,
    nesting: Vec<Frame>,
}

impl<W: Write + Seek> ObjectWriter<W> {
    pub fn new(mut writer: W, version: &str) -> Result<Self, RenderError> {
        writer.write_all(format!("%PDF-{version}\n").as_bytes())?;
        // Binary marker comment so transports treat the file as binary.
        writer.write_all(b"%\xE2\xE3\xCF\xD3\n")?;
        Ok(Self {
            writer,
            offsets: BTreeMap::new(),
            next_id: 0,
            nesting: Vec::new(),
        })
    }

    pub fn alloc_id(&mut self) -> ObjId {
        self.next_id += 1;
        ObjId(self.next_id)
    }

    pub fn begin_object(&mut self, id: ObjId) -> Result<(), RenderError> {
        assert!(
            self.nesting.is_empty(),
            "begin_object inside another object"
        );
        assert!(
            !self.offsets.contains_key(&id.0),
            "object {} written twice",
            id.0
        );
        let offset = self.writer.stream_position()?;
        self.offsets.insert(id.0, offset);
        write!(self.writer, "{} 0 obj\n", id.0)?;
        self.nesting.push(Frame::Object);
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<(), RenderError> {
        assert_eq!(
            self.nesting.pop(),
            Some(Frame::Object),
            "end_object without matching begin_object"
        );
        assert!(self.nesting.is_empty(), "end_object with open containers");
        self.writer.write_all(b"\nendobj\n")?;
        Ok(())
    }

    pub fn begin_dict(&mut self) -> Result<(), RenderError> {
        assert!(
            !self.nesting.is_empty(),
            "dictionary outside an object body"
        );
        self.writer.write_all(b"<< ")?;
        self.nesting.push(Frame::Dict);
        Ok(())
    }

    pub fn end_dict(&mut self) -> Result<(), RenderError> {
        assert_eq!(
            self.nesting.pop(),
            Some(Frame::Dict),
            "end_dict without matching begin_dict"
        );
        self.writer.write_all(b">> ")?;
        Ok(())
    }

    pub fn begin_array(&mut self) -> Result<(), RenderError> {
        assert!(!self.nesting.is_empty(), "array outside an object body");
        self.writer.write_all(b"[ ")?;
        self.nesting.push(Frame::Array);
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<(), RenderError> {
        assert_eq!(
            self.nesting.pop(),
            Some(Frame::Array),
            "end_array without matching begin_array"
        );
        self.writer.write_all(b"] ")?;
        Ok(())
    }

    /// Writes a dictionary key. Must be balanced by exactly one value.
    pub fn key(&mut self, name: &str) -> Result<(), RenderError> {
        assert_eq!(
            self.nesting.last(),
            Some(&Frame::Dict),
            "key written outside a dictionary"
        );
        write!(self.writer, "/{name} ")?;
        Ok(())
    }

    pub fn name(&mut self, value: &str) -> Result<(), RenderError> {
        write!(self.writer, "/{value} ")?;
        Ok(())
    }

    pub fn integer(&mut self, value: i64) -> Result<(), RenderError> {
        write!(self.writer, "{value} ")?;
        Ok(())
    }

    pub fn real(&mut self, value: f32) -> Result<(), RenderError> {
        if (value - value.round()).abs() < 0.001 {
            write!(self.writer, "{} ", value.round() as i64)?;
        } else {
            write!(self.writer, "{value:.3} ")?;
        }
        Ok(())
    }

    pub fn boolean(&mut self, value: bool) -> Result<(), RenderError> {
        self.writer
            .write_all(if value { b"true " } else { b"false " })?;
        Ok(())
    }

    pub fn reference(&mut self, id: ObjId) -> Result<(), RenderError> {
        write!(self.writer, "{} 0 R ", id.0)?;
        Ok(())
    }

    pub fn string_literal(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        self.writer.write_all(b"(")?;
        for &byte in bytes {
            if byte == b'(' || byte == b')' || byte == b'\\' {
                self.writer.write_all(b"\\")?;
            }
            self.writer.write_all(&[byte])?;
        }
        self.writer.write_all(b") ")?;
        Ok(())
    }

    pub fn string_hex(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        self.writer.write_all(b"<")?;
        for byte in bytes {
            write!(self.writer, "{byte:02X}")?;
        }
        self.writer.write_all(b"> ")?;
        Ok(())
    }

    // Key/value pairs, the common case.

    pub fn name_pair(&mut self, k: &str, v: &str) -> Result<(), RenderError> {
        self.key(k)?;
        self.name(v)
    }

    pub fn int_pair(&mut self, k: &str, v: i64) -> Result<(), RenderError> {
        self.key(k)?;
        self.integer(v)
    }

    pub fn ref_pair(&mut self, k: &str, v: ObjId) -> Result<(), RenderError> {
        self.key(k)?;
        self.reference(v)
    }

    pub fn string_pair(&mut self, k: &str, v: &[u8]) -> Result<(), RenderError> {
        self.key(k)?;
        self.string_literal(v)
    }

    /// A `[x y w h]`-style rectangle value.
    pub fn rect_value(&mut self, values: [f32; 4]) -> Result<(), RenderError> {
        self.begin_array()?;
        for v in values {
            self.real(v)?;
        }
        self.end_array()
    }

    /// Begins the data section of a stream object. The caller has already
    /// written the stream dictionary, including /Length.
    pub fn begin_stream(&mut self) -> Result<(), RenderError> {
        assert_eq!(
            self.nesting.last(),
            Some(&Frame::Object),
            "stream data outside an object (or inside an unclosed dictionary)"
        );
        self.writer.write_all(b"stream\n")?;
        self.nesting.push(Frame::Stream);
        Ok(())
    }

    pub fn stream_bytes(&mut self, data: &[u8]) -> Result<(), RenderError> {
        assert_eq!(
            self.nesting.last(),
            Some(&Frame::Stream),
            "stream bytes outside begin_stream/end_stream"
        );
        self.writer.write_all(data)?;
        Ok(())
    }

    pub fn end_stream(&mut self) -> Result<(), RenderError> {
        assert_eq!(
            self.nesting.pop(),
            Some(Frame::Stream),
            "end_stream without matching begin_stream"
        );
        self.writer.write_all(b"\nendstream")?;
        Ok(())
    }

    /// Whole stream object in one call.
    pub fn stream_object(&mut self, id: ObjId, data: &[u8]) -> Result<(), RenderError> {
        self.begin_object(id)?;
        self.begin_dict()?;
        self.int_pair("Length", data.len() as i64)?;
        self.end_dict()?;
        self.begin_stream()?;
        self.stream_bytes(data)?;
        self.end_stream()?;
        self.end_object()
    }

    /// Writes the cross-reference table and trailer and returns the sink.
    /// Every allocated object must have been written.
    pub fn finish(
        mut self,
        root: ObjId,
        info: Option<ObjId>,
        file_id: [u8; 16],
    ) -> Result<W, RenderError> {
        assert!(self.nesting.is_empty(), "finish with an open object");
        for id in 1..=self.next_id {
            assert!(
                self.offsets.contains_key(&id),
                "allocated object {id} was never written"
            );
        }

        let xref_start = self.writer.stream_position()?;
        let size = self.next_id + 1;
        writeln!(self.writer, "xref")?;
        writeln!(self.writer, "0 {size}")?;
        writeln!(self.writer, "0000000000 65535 f ")?;
        for id in 1..=self.next_id {
            writeln!(self.writer, "{:010} 00000 n ", self.offsets[&id])?;
        }

        writeln!(self.writer, "trailer")?;
        write!(self.writer, "<< /Size {size} /Root {} 0 R ", root.0)?;
        if let Some(info) = info {
            write!(self.writer, "/Info {} 0 R ", info.0)?;
        }
        self.writer.write_all(b"/ID [ ")?;
        for _ in 0..2 {
            self.writer.write_all(b"<")?;
            for byte in file_id {
                write!(self.writer, "{byte:02X}")?;
            }
            self.writer.write_all(b"> ")?;
        }
        self.writer.write_all(b"] >>\n")?;
        writeln!(self.writer, "startxref")?;
        writeln!(self.writer, "{xref_start}")?;
        self.writer.write_all(b"%%EOF")?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn writes_a_parsable_minimal_document() {
        let mut w = ObjectWriter::new(Cursor::new(Vec::new()), "1.7").unwrap();
        let catalog = w.alloc_id();
        let pages = w.alloc_id();
        let page = w.alloc_id();
        let content = w.alloc_id();

        w.begin_object(catalog).unwrap();
        w.begin_dict().unwrap();
        w.name_pair("Type", "Catalog").unwrap();
        w.ref_pair("Pages", pages).unwrap();
        w.end_dict().unwrap();
        w.end_object().unwrap();

        w.begin_object(pages).unwrap();
        w.begin_dict().unwrap();
        w.name_pair("Type", "Pages").unwrap();
        w.key("Kids").unwrap();
        w.begin_array().unwrap();
        w.reference(page).unwrap();
        w.end_array().unwrap();
        w.int_pair("Count", 1).unwrap();
        w.end_dict().unwrap();
        w.end_object().unwrap();

        w.begin_object(page).unwrap();
        w.begin_dict().unwrap();
        w.name_pair("Type", "Page").unwrap();
        w.ref_pair("Parent", pages).unwrap();
        w.key("MediaBox").unwrap();
        w.rect_value([0.0, 0.0, 612.0, 792.0]).unwrap();
        w.ref_pair("Contents", content).unwrap();
        w.end_dict().unwrap();
        w.end_object().unwrap();

        w.stream_object(content, b"BT ET").unwrap();

        let cursor = w.finish(catalog, None, [7u8; 16]).unwrap();
        let bytes = cursor.into_inner();
        let doc = lopdf::Document::load_mem(&bytes).expect("output must parse");
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    #[should_panic(expected = "end_dict without matching begin_dict")]
    fn unbalanced_nesting_panics() {
        let mut w = ObjectWriter::new(Cursor::new(Vec::new()), "1.7").unwrap();
        let id = w.alloc_id();
        w.begin_object(id).unwrap();
        w.end_dict().unwrap();
    }

    #[test]
    fn escapes_string_delimiters() {
        let mut w = ObjectWriter::new(Cursor::new(Vec::new()), "1.7").unwrap();
        let id = w.alloc_id();
        w.begin_object(id).unwrap();
        w.string_literal(b"a(b)c\\d").unwrap();
        w.end_object().unwrap();
        let cursor = w.finish(id, None, [0u8; 16]).unwrap();
        let bytes = cursor.into_inner();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(a\\(b\\)c\\\\d)"));
    }
}
