mod common;

use common::fixtures::*;
use common::{generate_pdf, TestResult};
use folio::dom::{Component, ComponentKind, Document, TextContent};
use folio::style::Style;

#[test]
fn internal_links_produce_annotations_and_destinations() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut doc = Document::new();
    let first = doc.add_page(Component::page(bare_page_style(300.0, 300.0)));
    doc.tree.add_child(
        first,
        Component::new(
            ComponentKind::Text(TextContent {
                text: "jump to the appendix".into(),
                link: Some("#appendix".into()),
            }),
            Style::default(),
        ),
    );
    let second = doc.add_page(Component::page(bare_page_style(300.0, 300.0)));
    let target = doc
        .tree
        .add_child(second, Component::panel(Style::default()).named("appendix"));
    doc.tree
        .add_child(target, Component::text("Appendix content", Style::default()));

    let pdf = generate_pdf(&doc)?;
    assert_eq!(pdf.page_count(), 2);

    let raw = String::from_utf8_lossy(&pdf.bytes).to_string();
    assert!(raw.contains("/Annots"), "missing annotations");
    assert!(raw.contains("/Subtype /Link"), "missing link annotation");
    assert!(raw.contains("(appendix)"), "missing named destination");
    Ok(())
}

#[test]
fn external_links_emit_uri_actions() -> TestResult {
    let mut doc = Document::new();
    let page = doc.add_page(Component::page(bare_page_style(300.0, 300.0)));
    doc.tree.add_child(
        page,
        Component::new(
            ComponentKind::Text(TextContent {
                text: "project home".into(),
                link: Some("https://example.com/".into()),
            }),
            Style::default(),
        ),
    );

    let pdf = generate_pdf(&doc)?;
    let raw = String::from_utf8_lossy(&pdf.bytes).to_string();
    assert!(raw.contains("/S /URI"), "missing URI action");
    assert!(raw.contains("example.com"), "missing URI target");
    Ok(())
}

#[test]
fn outline_titles_build_a_bookmark_tree() -> TestResult {
    let mut doc = Document::new();
    for chapter in ["Introduction", "Methods", "Results"] {
        let page = doc.add_page(Component::page(bare_page_style(300.0, 300.0)));
        let panel = doc
            .tree
            .add_child(page, Component::panel(Style::default()).with_outline(chapter));
        doc.tree
            .add_child(panel, Component::text(chapter, Style::default()));
    }

    let pdf = generate_pdf(&doc)?;
    let raw = String::from_utf8_lossy(&pdf.bytes).to_string();
    assert!(raw.contains("/Outlines"), "missing outline root");
    assert!(raw.contains("(Introduction)"), "missing first entry");
    assert!(raw.contains("(Results)"), "missing last entry");
    assert!(raw.contains("/PageMode /UseOutlines"));
    Ok(())
}
