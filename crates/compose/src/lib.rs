//! Page-tree splicing: composing an output document from page ranges of
//! existing PDF files, with optional overlays and a strict/lenient
//! conformance knob for malformed source structures.

mod composer;
mod copier;
mod error;
mod pages;

pub use composer::{FramesetComposer, ModifyPageReference, OverlayPage};
pub use error::ComposeError;
pub use pages::collect_page_ids;

#[cfg(test)]
mod tests {
    use super::*;
    use folio_dom::{
        Conformance, FrameDefinition, FrameSource, FramesetDefinition, OverlayDefinition,
        OverlayRepeat, PageCount,
    };
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream, StringFormat};

    /// A small real document with one text line per page, used as both
    /// frame and overlay source.
    fn dummy_pdf(num_pages: u32, text_prefix: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = vec![];
        for i in 1..=num_pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![100.into(), 700.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("{text_prefix} {i}").into_bytes(),
                            StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            page_ids.push(page_id.into());
        }

        let count = num_pages as i64;
        doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids,
                "Count" => count,
            }
            .into(),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn frame(bytes: Vec<u8>, start: usize, count: PageCount) -> FrameDefinition {
        FrameDefinition {
            source: FrameSource::bytes(bytes),
            start_index: start,
            count,
            overlay: None,
        }
    }

    #[test]
    fn append_all_from_offset_clamps_to_source() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut composer = FramesetComposer::new(Conformance::Lenient);
        let emitted = composer
            .add_frame(&frame(dummy_pdf(10, "Page"), 5, PageCount::AppendAll))
            .unwrap();
        assert_eq!(emitted, 5);
        assert_eq!(composer.page_count(), 5);
    }

    #[test]
    fn fixed_count_clamps_to_remaining_pages() {
        let mut composer = FramesetComposer::new(Conformance::Lenient);
        let emitted = composer
            .add_frame(&frame(dummy_pdf(4, "Page"), 2, PageCount::Fixed(10)))
            .unwrap();
        assert_eq!(emitted, 2);
    }

    #[test]
    fn out_of_range_start_is_lenient_zero_or_strict_error() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut lenient = FramesetComposer::new(Conformance::Lenient);
        let emitted = lenient
            .add_frame(&frame(dummy_pdf(3, "Page"), 7, PageCount::AppendAll))
            .unwrap();
        assert_eq!(emitted, 0);

        let mut strict = FramesetComposer::new(Conformance::Strict);
        let err = strict
            .add_frame(&frame(dummy_pdf(3, "Page"), 7, PageCount::AppendAll))
            .unwrap_err();
        assert!(matches!(
            err,
            ComposeError::PageStartOutOfRange { start: 7, total: 3 }
        ));
    }

    #[test]
    fn overlay_first_marks_only_the_first_page() {
        let mut composer = FramesetComposer::new(Conformance::Lenient);
        let mut f = frame(dummy_pdf(3, "Body"), 0, PageCount::AppendAll);
        f.overlay = Some(OverlayDefinition {
            source: FrameSource::bytes(dummy_pdf(2, "Overlay")),
            repeat: OverlayRepeat::First,
        });
        composer.add_frame(&f).unwrap();

        let flags: Vec<bool> = composer.references().iter().map(|r| r.has_overlay()).collect();
        assert_eq!(flags, vec![true, false, false]);
    }

    #[test]
    fn overlay_last_marks_only_the_last_page() {
        let mut composer = FramesetComposer::new(Conformance::Lenient);
        let mut f = frame(dummy_pdf(3, "Body"), 0, PageCount::AppendAll);
        f.overlay = Some(OverlayDefinition {
            source: FrameSource::bytes(dummy_pdf(2, "Overlay")),
            repeat: OverlayRepeat::Last,
        });
        composer.add_frame(&f).unwrap();

        let flags: Vec<bool> = composer.references().iter().map(|r| r.has_overlay()).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn overlay_once_stops_when_exhausted() {
        let mut composer = FramesetComposer::new(Conformance::Lenient);
        let mut f = frame(dummy_pdf(4, "Body"), 0, PageCount::AppendAll);
        f.overlay = Some(OverlayDefinition {
            source: FrameSource::bytes(dummy_pdf(2, "Overlay")),
            repeat: OverlayRepeat::Once,
        });
        composer.add_frame(&f).unwrap();

        let overlays: Vec<bool> = composer.references().iter().map(|r| r.has_overlay()).collect();
        assert_eq!(overlays, vec![true, true, false, false]);
    }

    #[test]
    fn overlay_all_cycles_modulo_overlay_count() {
        let mut composer = FramesetComposer::new(Conformance::Lenient);
        let mut f = frame(dummy_pdf(5, "Body"), 0, PageCount::AppendAll);
        f.overlay = Some(OverlayDefinition {
            source: FrameSource::bytes(dummy_pdf(2, "Overlay")),
            repeat: OverlayRepeat::All,
        });
        composer.add_frame(&f).unwrap();

        assert!(composer.references().iter().all(|r| r.has_overlay()));
        let first = composer.references()[0].overlay.as_ref().unwrap().page_id;
        let third = composer.references()[2].overlay.as_ref().unwrap().page_id;
        assert_eq!(first, third);
    }

    #[test]
    fn spliced_output_parses_and_keeps_page_content() {
        let definition = FramesetDefinition {
            frames: vec![
                frame(dummy_pdf(3, "First"), 1, PageCount::AppendAll),
                frame(dummy_pdf(2, "Second"), 0, PageCount::Fixed(1)),
            ],
            conformance: Conformance::Lenient,
        };
        let composer = FramesetComposer::from_definition(&definition).unwrap();
        assert_eq!(composer.page_count(), 3);

        let mut bytes = Vec::new();
        composer.write_to(&mut bytes).unwrap();
        let out = Document::load_mem(&bytes).unwrap();
        let pages = out.get_pages();
        assert_eq!(pages.len(), 3);

        let first_content = out.get_page_content(pages[&1]).unwrap();
        assert!(String::from_utf8_lossy(&first_content).contains("First 2"));
        let last_content = out.get_page_content(pages[&3]).unwrap();
        assert!(String::from_utf8_lossy(&last_content).contains("Second 1"));

        // Every output page's parent points at the new page tree.
        let root = out
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .unwrap();
        let pages_id = out
            .get_dictionary(root)
            .unwrap()
            .get(b"Pages")
            .and_then(Object::as_reference)
            .unwrap();
        for (_, page_id) in pages {
            let parent = out
                .get_dictionary(page_id)
                .unwrap()
                .get(b"Parent")
                .and_then(Object::as_reference)
                .unwrap();
            assert_eq!(parent, pages_id);
        }
    }

    #[test]
    fn overlay_content_is_appended_to_the_page() {
        let definition = FramesetDefinition {
            frames: vec![FrameDefinition {
                source: FrameSource::bytes(dummy_pdf(1, "Body")),
                start_index: 0,
                count: PageCount::AppendAll,
                overlay: Some(OverlayDefinition {
                    source: FrameSource::bytes(dummy_pdf(1, "Stamp")),
                    repeat: OverlayRepeat::All,
                }),
            }],
            conformance: Conformance::Lenient,
        };
        let composer = FramesetComposer::from_definition(&definition).unwrap();
        let mut bytes = Vec::new();
        composer.write_to(&mut bytes).unwrap();

        let out = Document::load_mem(&bytes).unwrap();
        let pages = out.get_pages();
        let content = out.get_page_content(pages[&1]).unwrap();
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains("Body 1"));
        assert!(text.contains("Stamp 1"));
    }

    #[test]
    fn unparsable_source_fails_to_load() {
        let garbage = b"not a pdf at all".to_vec();
        let mut composer = FramesetComposer::new(Conformance::Lenient);
        // Conformance governs malformed structure inside a parsed file;
        // a file that does not parse at all fails in either mode.
        assert!(composer
            .add_frame(&frame(garbage, 0, PageCount::AppendAll))
            .is_err());
    }
}
