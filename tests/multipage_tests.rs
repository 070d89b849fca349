mod common;

use common::fixtures::*;
use common::{generate_pdf, TestResult};
use folio::dom::{Component, ComponentKind, Document, PageDefinition};
use folio::style::{NumberingStyle, PageNumberOptions, Style};

#[test]
fn overflowing_content_continues_on_a_second_page() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut doc = Document::new();
    let page = doc.add_page(Component::page(bare_page_style(300.0, 120.0)));
    let words = vec!["overflow"; 80].join(" ");
    doc.tree.add_child(page, Component::text(words, Style::default()));

    let pdf = generate_pdf(&doc)?;
    assert!(
        pdf.page_count() >= 2,
        "expected at least two pages, got {}",
        pdf.page_count()
    );
    assert_pdf_contains_text!(pdf, "overflow");
    Ok(())
}

#[test]
fn page_headers_and_footers_repeat_on_continuations() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut doc = Document::new();
    let header = doc
        .tree
        .add(Component::text("RunningHeader", Style::default()));
    let footer = doc
        .tree
        .add(Component::text("RunningFooter", Style::default()));
    let page = doc.add_page(Component::new(
        ComponentKind::Page(PageDefinition {
            header: Some(header),
            footer: Some(footer),
            continuation_footer: None,
        }),
        bare_page_style(300.0, 150.0),
    ));
    let words = vec!["body"; 200].join(" ");
    doc.tree.add_child(page, Component::text(words, Style::default()));

    let pdf = generate_pdf(&doc)?;
    assert!(pdf.page_count() >= 2);

    // Header and footer text must appear on every page.
    for page_num in 1..=pdf.page_count() as u32 {
        let text = pdf.doc.extract_text(&[page_num]).unwrap_or_default();
        assert!(
            text.contains("RunningHeader"),
            "page {page_num} misses the header: {text}"
        );
        assert!(
            text.contains("RunningFooter"),
            "page {page_num} misses the footer: {text}"
        );
    }
    Ok(())
}

#[test]
fn numbering_groups_emit_page_labels() -> TestResult {
    let mut doc = Document::new();
    let front = doc.add_page(Component::page(bare_page_style(200.0, 200.0).numbered(
        PageNumberOptions {
            style: NumberingStyle::LowercaseRoman,
            start: Some(1),
            group: Some("front".into()),
        },
    )));
    doc.tree
        .add_child(front, Component::text("preface", Style::default()));

    let body = doc.add_page(Component::page(bare_page_style(200.0, 200.0).numbered(
        PageNumberOptions {
            style: NumberingStyle::Decimal,
            start: Some(1),
            group: Some("body".into()),
        },
    )));
    doc.tree
        .add_child(body, Component::text("chapter", Style::default()));

    let pdf = generate_pdf(&doc)?;
    assert_eq!(pdf.page_count(), 2);

    let raw = String::from_utf8_lossy(&pdf.bytes).to_string();
    assert!(raw.contains("PageLabels"), "missing PageLabels: {raw}");
    assert!(raw.contains("/Nums"), "missing Nums array");
    Ok(())
}

#[test]
fn page_number_fields_resolve_per_page() -> TestResult {
    let mut doc = Document::new();
    let footer_panel = doc.tree.add(Component::panel(Style::default()));
    doc.tree
        .add_child(footer_panel, Component::text("Page", Style::default()));
    doc.tree.add_child(
        footer_panel,
        Component::new(ComponentKind::PageNumberField, Style::default()),
    );
    let page = doc.add_page(Component::new(
        ComponentKind::Page(PageDefinition {
            header: None,
            footer: Some(footer_panel),
            continuation_footer: None,
        }),
        bare_page_style(300.0, 150.0),
    ));
    let words = vec!["fill"; 400].join(" ");
    doc.tree.add_child(page, Component::text(words, Style::default()));

    let pdf = generate_pdf(&doc)?;
    assert!(pdf.page_count() >= 2);
    let second = pdf.doc.extract_text(&[2]).unwrap_or_default();
    assert!(second.contains('2'), "page 2 footer should show 2: {second}");
    Ok(())
}
