mod common;

use common::fixtures::*;
use common::{generate_pdf, TestResult};
use folio::dom::{Component, ComponentKind, Document, ImageDefinition};
use folio::style::{PositionMode, Style};
use folio::Composer;
use std::sync::Arc;

#[test]
fn canvas_children_place_at_styled_coordinates() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut doc = Document::new();
    let page = doc.add_page(Component::page(bare_page_style(400.0, 400.0)));
    let canvas = doc.tree.add_child(
        page,
        Component::canvas(Style::default().height(200.0)),
    );
    let child = doc.tree.add_child(
        canvas,
        Component::panel(
            Style::default()
                .width(60.0)
                .height(40.0)
                .positioned(PositionMode::Absolute, 100.0, 50.0),
        ),
    );
    doc.tree
        .add_child(child, Component::text("pinned", Style::default()));

    let (_, arrangements) = Composer::new()
        .generate_with_arrangements(&doc, std::io::Cursor::new(Vec::new()))?;
    let placed = arrangements.get(&child).expect("child not arranged");
    // Absolute placement inside the canvas content box.
    assert_eq!(placed[0].bounds.x, 100.0);
    assert_eq!(placed[0].bounds.y, 50.0);
    assert_eq!(placed[0].bounds.width, 60.0);
    Ok(())
}

#[test]
fn relative_offsets_shift_content_during_arrangement() -> TestResult {
    let mut doc = Document::new();
    let page = doc.add_page(Component::page(bare_page_style(400.0, 400.0)));
    let shifted = doc.tree.add_child(
        page,
        Component::panel(
            Style::default()
                .width(80.0)
                .height(20.0)
                .positioned(PositionMode::Relative, 15.0, 25.0),
        ),
    );
    doc.tree
        .add_child(shifted, Component::text("moved", Style::default()));

    let (_, arrangements) = Composer::new()
        .generate_with_arrangements(&doc, std::io::Cursor::new(Vec::new()))?;
    let placed = arrangements.get(&shifted).expect("panel not arranged");
    assert_eq!(placed[0].bounds.x, 15.0);
    assert_eq!(placed[0].bounds.y, 25.0);
    Ok(())
}

#[test]
fn images_emit_xobjects_in_page_resources() -> TestResult {
    let mut doc = Document::new();
    let page = doc.add_page(Component::page(bare_page_style(400.0, 400.0)));
    doc.tree.add_child(
        page,
        Component::new(
            ComponentKind::Image(ImageDefinition {
                name: "logo".into(),
                pixel_width: 2,
                pixel_height: 2,
                data: Some(Arc::new(vec![255u8; 12])),
            }),
            Style::default().width(80.0),
        ),
    );

    let pdf = generate_pdf(&doc)?;
    let raw = String::from_utf8_lossy(&pdf.bytes).to_string();
    assert!(raw.contains("/Subtype /Image"), "missing image XObject");
    assert!(raw.contains("/XObject"), "missing XObject resource entry");
    let content = common::pdf_assertions::page_content_string(&pdf.doc, 1);
    assert!(content.contains("Do"), "missing Do operator: {content}");
    Ok(())
}
