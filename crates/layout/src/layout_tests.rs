//! Engine-level tests driving whole documents through layout and
//! inspecting the resulting item tree.

use crate::engines::EPSILON;
use crate::fonts::BuiltinMetrics;
use crate::region::RegionContent;
use crate::run::Run;
use crate::tree::{ItemId, ItemKind};
use crate::{layout_document, LayoutDocument};
use folio_dom::{CellDefinition, Component, ComponentId, ComponentKind, Document, RowDefinition,
    TableDefinition, PanelDefinition};
use folio_style::dimension::PageSize;
use folio_style::Style;
use folio_types::Thickness;

fn small_page_style(width: f32, height: f32) -> Style {
    Style::default()
        .page_size(PageSize::Custom { width, height })
        .page_margins(Thickness::zero())
}

fn layout(dom: &Document) -> LayoutDocument {
    let _ = env_logger::builder().is_test(true).try_init();
    layout_document(dom, &BuiltinMetrics).expect("layout failed")
}

fn blocks_for(doc: &LayoutDocument, comp: ComponentId) -> Vec<ItemId> {
    doc.tree
        .ids()
        .filter(|id| {
            doc.tree.get(*id).component == Some(comp)
                && matches!(doc.tree.get(*id).kind, ItemKind::Block(_))
        })
        .collect()
}

fn all_text(doc: &LayoutDocument) -> String {
    let mut out = String::new();
    for id in doc.tree.ids() {
        if let ItemKind::Run(Run::Text(t)) = &doc.tree.get(id).kind {
            out.push_str(&t.text);
            out.push(' ');
        }
    }
    out
}

fn assert_line_fit(doc: &LayoutDocument) {
    for id in doc.tree.ids() {
        if let ItemKind::Line(line) = &doc.tree.get(id).kind {
            if line.overflow_tolerant {
                continue;
            }
            let sum: f32 = line.runs.iter().map(|r| doc.tree.bounds(*r).width).sum();
            assert!(
                sum <= line.available_width + 0.1,
                "line {id:?} runs total {sum} exceed available {}",
                line.available_width
            );
        }
    }
}

fn assert_region_containment(doc: &LayoutDocument) {
    for id in doc.tree.ids() {
        if let ItemKind::Region(region) = &doc.tree.get(id).kind {
            if region.overflow_permitted || !doc.tree.is_closed(id) {
                continue;
            }
            let bounds = doc.tree.bounds(id);
            assert!(
                region.used.height <= bounds.height + 0.1,
                "region {id:?} used {} exceeds bounds {}",
                region.used.height,
                bounds.height
            );
        }
    }
}

#[test]
fn explicit_width_panel_sizes_to_content() {
    // A 200pt-wide panel with a single short line of text in a roomy page:
    // the block height is the line plus padding, no move happens.
    let mut dom = Document::new();
    let page = dom.add_page(Component::page(small_page_style(500.0, 500.0)));
    let panel = dom.tree.add_child(
        page,
        Component::panel(Style::default().width(200.0).padding(Thickness::all(10.0))),
    );
    dom.tree
        .add_child(panel, Component::text("alpha beta", Style::default()));

    let doc = layout(&dom);
    assert_eq!(doc.page_count(), 1);

    let blocks = blocks_for(&doc, panel);
    assert_eq!(blocks.len(), 1);
    let bounds = doc.tree.bounds(blocks[0]);
    assert_eq!(bounds.width, 200.0);
    // One 14.4pt line plus 20pt of vertical padding.
    assert!((bounds.height - 34.4).abs() < 0.5, "height {}", bounds.height);

    assert_line_fit(&doc);
    assert_region_containment(&doc);
}

#[test]
fn overflowing_panel_moves_to_a_new_page() {
    // Two panels fill most of the page; the third cannot fit and the
    // region already holds items, so a continuation page is created.
    let mut dom = Document::new();
    let page = dom.add_page(Component::page(small_page_style(300.0, 100.0)));
    for text in ["first block", "second block", "third block"] {
        let panel = dom
            .tree
            .add_child(page, Component::panel(Style::default().min_height(40.0)));
        dom.tree
            .add_child(panel, Component::text(text, Style::default()));
    }

    let doc = layout(&dom);
    assert_eq!(doc.page_count(), 2);
    for (i, page_item) in doc.all_pages().iter().enumerate() {
        assert_eq!(doc.tree.page(*page_item).page_index, i);
    }
    assert_region_containment(&doc);
}

#[test]
fn long_text_paginates_line_by_line() {
    let mut dom = Document::new();
    let page = dom.add_page(Component::page(small_page_style(200.0, 120.0)));
    let words = vec!["lorem"; 60].join(" ");
    dom.tree.add_child(page, Component::text(words, Style::default()));

    let doc = layout(&dom);
    assert!(doc.page_count() >= 2, "expected pagination, got {} page(s)", doc.page_count());
    for (i, page_item) in doc.all_pages().iter().enumerate() {
        assert_eq!(doc.tree.page(*page_item).page_index, i);
    }
    assert_line_fit(&doc);
    assert_region_containment(&doc);
}

#[test]
fn two_column_panel_fills_both_columns() {
    let mut dom = Document::new();
    let page = dom.add_page(Component::page(small_page_style(200.0, 100.0)));
    let panel = dom
        .tree
        .add_child(page, Component::panel(Style::default().columns_of(2, 10.0)));
    let words = vec!["flow"; 40].join(" ");
    dom.tree.add_child(panel, Component::text(words, Style::default()));

    let doc = layout(&dom);
    let blocks = blocks_for(&doc, panel);
    assert!(!blocks.is_empty());
    let regions = doc.tree.block(blocks[0]).regions.clone();
    assert_eq!(regions.len(), 2);
    assert!(doc.tree.region_item_count(regions[0]) > 0);
    assert!(doc.tree.region_item_count(regions[1]) > 0);
    assert_line_fit(&doc);
}

#[test]
fn float_insets_following_lines() {
    let mut dom = Document::new();
    let page = dom.add_page(Component::page(small_page_style(300.0, 300.0)));
    let float = dom.tree.add_child(
        page,
        Component::panel(
            Style::default()
                .width(50.0)
                .height(50.0)
                .float(folio_style::FloatMode::Left),
        ),
    );
    dom.tree
        .add_child(float, Component::text("aside", Style::default()));
    dom.tree
        .add_child(page, Component::text("body text beside the float", Style::default()));

    let doc = layout(&dom);
    // The first body line must start to the right of the 50pt float.
    let mut found = false;
    for id in doc.tree.ids() {
        if let ItemKind::Line(line) = &doc.tree.get(id).kind {
            let has_body = line.runs.iter().any(|r| {
                matches!(&doc.tree.get(*r).kind, ItemKind::Run(Run::Text(t)) if t.text.contains("body"))
            });
            if has_body {
                assert!(doc.tree.bounds(id).x >= 50.0 - EPSILON);
                found = true;
            }
        }
    }
    assert!(found, "body line not found");
}

#[test]
fn footer_panel_reserves_and_appends() {
    let mut dom = Document::new();
    let page = dom.add_page(Component::page(small_page_style(300.0, 300.0)));
    let footer = dom
        .tree
        .add(Component::text("footnote", Style::default()));
    let panel = dom.tree.add_child(
        page,
        Component::new(
            ComponentKind::Panel(PanelDefinition {
                header: None,
                footer: Some(footer),
                continuation_footer: None,
            }),
            Style::default(),
        ),
    );
    dom.tree
        .add_child(panel, Component::text("body content", Style::default()));

    let doc = layout(&dom);
    let text = all_text(&doc);
    assert!(text.contains("body"), "missing body in {text}");
    assert!(text.contains("footnote"), "missing footer in {text}");

    // The footer line sits below the body line.
    let mut body_y = 0.0f32;
    let mut footer_y = 0.0f32;
    for id in doc.tree.ids() {
        if let ItemKind::Run(Run::Text(t)) = &doc.tree.get(id).kind {
            if t.text.contains("body") {
                body_y = doc.tree.bounds(id).y;
            }
            if t.text.contains("footnote") {
                footer_y = doc.tree.bounds(id).y;
            }
        }
    }
    assert!(footer_y > body_y, "footer {footer_y} not below body {body_y}");
}

#[test]
fn table_colspan_widths_are_sufficient() {
    let mut dom = Document::new();
    let page = dom.add_page(Component::page(small_page_style(400.0, 400.0)));
    let table = dom.tree.add_child(
        page,
        Component::new(
            ComponentKind::Table(TableDefinition::default()),
            Style::default(),
        ),
    );

    let mut cells: Vec<ComponentId> = Vec::new();
    for row in 0..3 {
        let row_id = dom.tree.add_child(
            table,
            Component::new(ComponentKind::Row(RowDefinition::default()), Style::default()),
        );
        let row_cells = if row == 0 { 2 } else { 3 };
        for col in 0..row_cells {
            let span = if row == 0 && col == 0 { 2 } else { 1 };
            let cell = dom.tree.add_child(
                row_id,
                Component::new(
                    ComponentKind::Cell(CellDefinition {
                        row_span: 1,
                        col_span: span,
                    }),
                    Style::default(),
                ),
            );
            dom.tree.add_child(
                cell,
                Component::text(format!("cell {row} {col}"), Style::default()),
            );
            cells.push(cell);
        }
    }

    let doc = layout(&dom);
    // The spanning cell's block must be at least as wide as both of the
    // single-column cells beneath it combined... at minimum, wider than a
    // single column's share.
    let span_block = blocks_for(&doc, cells[0]);
    assert_eq!(span_block.len(), 1);
    let below_left = blocks_for(&doc, cells[2]);
    let below_mid = blocks_for(&doc, cells[3]);
    let span_width = doc.tree.bounds(span_block[0]).width;
    let sum = doc.tree.bounds(below_left[0]).width + doc.tree.bounds(below_mid[0]).width;
    assert!(
        (span_width - sum).abs() < 0.1,
        "span width {span_width} should equal the two columns {sum}"
    );
    assert!(all_text(&doc).contains("cell 2 2"));
}

#[test]
fn pages_share_numbering_groups() {
    use folio_style::{NumberingStyle, PageNumberOptions};
    let mut dom = Document::new();
    let group = dom.add_page(Component::new(
        ComponentKind::PageGroup,
        Style::default().numbered(PageNumberOptions {
            style: NumberingStyle::LowercaseRoman,
            start: Some(1),
            group: Some("front".into()),
        }),
    ));
    for _ in 0..2 {
        let page = dom
            .tree
            .add_child(group, Component::page(small_page_style(200.0, 200.0)));
        dom.tree
            .add_child(page, Component::text("hello", Style::default()));
    }

    let doc = layout(&dom);
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.numbering.format_for_page(0), "i");
    assert_eq!(doc.numbering.format_for_page(1), "ii");
    assert_eq!(doc.numbering.entries().len(), 1);
}

#[test]
fn arrangements_carry_page_relative_bounds() {
    let mut dom = Document::new();
    let page = dom.add_page(Component::page(small_page_style(300.0, 300.0)));
    let panel = dom.tree.add_child(
        page,
        Component::panel(Style::default().width(120.0)).named("target"),
    );
    dom.tree
        .add_child(panel, Component::text("anchored", Style::default()));

    let mut doc = layout(&dom);
    let arrangements = crate::push_component_layout(&mut doc, &dom);
    let placed = arrangements.get(&panel).expect("panel not arranged");
    assert_eq!(placed[0].page_index, 0);
    assert_eq!(placed[0].bounds.width, 120.0);
    assert!(doc.artefacts.destination("target").is_some());
}

#[test]
fn region_content_kinds_never_mix() {
    let mut dom = Document::new();
    let page = dom.add_page(Component::page(small_page_style(300.0, 300.0)));
    let panel = dom.tree.add_child(page, Component::panel(Style::default()));
    dom.tree
        .add_child(panel, Component::text("inline first", Style::default()));
    let inner = dom.tree.add_child(panel, Component::panel(Style::default()));
    dom.tree
        .add_child(inner, Component::text("block second", Style::default()));

    let doc = layout(&dom);
    for id in doc.tree.ids() {
        if let ItemKind::Region(region) = &doc.tree.get(id).kind {
            match &region.content {
                RegionContent::Lines(items) => {
                    for i in items {
                        assert!(matches!(doc.tree.get(*i).kind, ItemKind::Line(_)));
                    }
                }
                RegionContent::Blocks(items) => {
                    for i in items {
                        assert!(matches!(doc.tree.get(*i).kind, ItemKind::Block(_)));
                    }
                }
                RegionContent::Empty => {}
            }
        }
    }
}
