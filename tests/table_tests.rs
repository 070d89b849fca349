mod common;

use common::fixtures::*;
use common::{generate_pdf, TestResult};
use folio::dom::{
    CellDefinition, Component, ComponentKind, Document, RowDefinition, TableDefinition,
};
use folio::style::Style;

#[test]
fn basic_table_renders_every_cell() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut doc, page) = a4_document();
    add_table(
        &mut doc,
        page,
        &[50.0, 50.0],
        &[&["Alpha", "Beta"], &["Gamma", "Delta"]],
    );

    let pdf = generate_pdf(&doc)?;
    for cell in ["Alpha", "Beta", "Gamma", "Delta"] {
        assert_pdf_contains_text!(pdf, cell);
    }
    Ok(())
}

#[test]
fn colspan_cells_render_with_spanned_width() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut doc, page) = a4_document();
    let table = doc.tree.add_child(
        page,
        Component::new(
            ComponentKind::Table(TableDefinition::default()),
            Style::default(),
        ),
    );
    let header_row = doc.tree.add_child(
        table,
        Component::new(ComponentKind::Row(RowDefinition::default()), Style::default()),
    );
    let wide = doc.tree.add_child(
        header_row,
        Component::new(
            ComponentKind::Cell(CellDefinition {
                row_span: 1,
                col_span: 2,
            }),
            Style::default(),
        ),
    );
    doc.tree
        .add_child(wide, Component::text("SpannedHeading", Style::default()));
    for row_texts in [["one", "two"], ["three", "four"]] {
        let row = doc.tree.add_child(
            table,
            Component::new(ComponentKind::Row(RowDefinition::default()), Style::default()),
        );
        for t in row_texts {
            let cell = doc.tree.add_child(
                row,
                Component::new(
                    ComponentKind::Cell(CellDefinition::default()),
                    Style::default(),
                ),
            );
            doc.tree.add_child(cell, Component::text(t, Style::default()));
        }
    }

    let pdf = generate_pdf(&doc)?;
    assert_pdf_contains_text!(pdf, "SpannedHeading");
    assert_pdf_contains_text!(pdf, "four");
    Ok(())
}

#[test]
fn long_table_spans_pages_and_repeats_headers() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut doc = Document::new();
    let page = doc.add_page(Component::page(bare_page_style(300.0, 200.0)));
    let table = doc.tree.add_child(
        page,
        Component::new(
            ComponentKind::Table(TableDefinition::default()),
            Style::default(),
        ),
    );
    let header = doc.tree.add_child(
        table,
        Component::new(
            ComponentKind::Row(RowDefinition { repeat_at_top: true }),
            Style::default(),
        ),
    );
    let header_cell = doc.tree.add_child(
        header,
        Component::new(
            ComponentKind::Cell(CellDefinition::default()),
            Style::default(),
        ),
    );
    doc.tree
        .add_child(header_cell, Component::text("ColumnTitle", Style::default()));

    for i in 0..30 {
        let row = doc.tree.add_child(
            table,
            Component::new(ComponentKind::Row(RowDefinition::default()), Style::default()),
        );
        let cell = doc.tree.add_child(
            row,
            Component::new(
                ComponentKind::Cell(CellDefinition::default()),
                Style::default(),
            ),
        );
        doc.tree
            .add_child(cell, Component::text(format!("row{i}"), Style::default()));
    }

    let pdf = generate_pdf(&doc)?;
    assert!(pdf.page_count() >= 2, "got {} page(s)", pdf.page_count());
    assert_pdf_contains_text!(pdf, "row0");
    assert_pdf_contains_text!(pdf, "row29");

    // The repeat-at-top header appears on the continuation page too.
    let second = pdf.doc.extract_text(&[2]).unwrap_or_default();
    assert!(
        second.contains("ColumnTitle"),
        "continuation page misses the repeated header: {second}"
    );
    Ok(())
}

#[test]
fn lists_number_their_items() -> TestResult {
    let (mut doc, page) = a4_document();
    let list = doc.tree.add_child(
        page,
        Component::new(
            ComponentKind::List(folio::dom::ListDefinition::default()),
            Style::default(),
        ),
    );
    for name in ["first item", "second item", "third item"] {
        let item = doc
            .tree
            .add_child(list, Component::new(ComponentKind::ListItem, Style::default()));
        doc.tree.add_child(item, Component::text(name, Style::default()));
    }

    let pdf = generate_pdf(&doc)?;
    assert_pdf_contains_text!(pdf, "1.");
    assert_pdf_contains_text!(pdf, "3.");
    assert_pdf_contains_text!(pdf, "second");
    Ok(())
}
