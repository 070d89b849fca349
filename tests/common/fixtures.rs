//! Builders for the document trees the integration tests exercise.

use folio::dom::{
    CellDefinition, Component, ComponentId, ComponentKind, Document, RowDefinition,
    TableColumnDefinition, TableDefinition,
};
use folio::style::dimension::{Dimension, PageSize};
use folio::style::Style;
use folio::types::Thickness;

/// A page with a custom size and zero margins, the workhorse of layout
/// tests.
pub fn bare_page_style(width: f32, height: f32) -> Style {
    Style::default()
        .page_size(PageSize::Custom { width, height })
        .page_margins(Thickness::zero())
}

pub fn a4_document() -> (Document, ComponentId) {
    let mut doc = Document::new();
    let page = doc.add_page(Component::page(Style::default()));
    (doc, page)
}

pub fn single_text_document(text: &str) -> Document {
    let mut doc = Document::new();
    let page = doc.add_page(Component::page(Style::default()));
    doc.tree.add_child(page, Component::text(text, Style::default()));
    doc
}

/// Adds a table with the given percent column widths and rows of plain
/// text cells.
pub fn add_table(
    doc: &mut Document,
    parent: ComponentId,
    percent_columns: &[f32],
    rows: &[&[&str]],
) -> ComponentId {
    let columns = percent_columns
        .iter()
        .map(|p| TableColumnDefinition {
            width: Dimension::Percent(*p),
        })
        .collect();
    let table = doc.tree.add_child(
        parent,
        Component::new(
            ComponentKind::Table(TableDefinition { columns }),
            Style::default(),
        ),
    );
    for row in rows {
        let row_id = doc.tree.add_child(
            table,
            Component::new(ComponentKind::Row(RowDefinition::default()), Style::default()),
        );
        for cell_text in *row {
            let cell = doc.tree.add_child(
                row_id,
                Component::new(
                    ComponentKind::Cell(CellDefinition::default()),
                    Style::default(),
                ),
            );
            doc.tree
                .add_child(cell, Component::text(*cell_text, Style::default()));
        }
    }
    table
}
