//! Content-stream generation: walks one page's item tree in document
//! order and emits text, graphics and marked-content operators. Layout
//! works top-down; PDF user space is bottom-up, so every coordinate is
//! flipped against the page height here and nowhere else.

use crate::error::RenderError;
use folio_dom::Document;
use folio_layout::{ItemId, ItemKind, LayoutDocument, Run, TextRun};
use folio_types::{Color, Rect};
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

pub fn page_content(
    dom: &Document,
    doc: &LayoutDocument,
    page: ItemId,
) -> Result<Vec<u8>, RenderError> {
    let page_height = doc.tree.page(page).size.height;
    let mut ops: Vec<Operation> = Vec::new();
    emit_item(dom, doc, page, page_height, &mut ops);
    Content { operations: ops }
        .encode()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

fn emit_item(
    dom: &Document,
    doc: &LayoutDocument,
    item: ItemId,
    page_height: f32,
    ops: &mut Vec<Operation>,
) {
    match &doc.tree.get(item).kind {
        ItemKind::Block(_) => {
            if let Some(comp) = doc.tree.get(item).component {
                let style = dom.tree.style(comp);
                let bounds = doc.tree.bounds(item);
                if let Some(background) = style.background {
                    fill_rect(ops, bounds, background, page_height);
                }
                if let Some(border) = style.border {
                    stroke_rect(ops, bounds, border.color, border.width, page_height);
                }
            }
        }
        ItemKind::Line(_) => {
            emit_line(dom, doc, item, page_height, ops);
            return;
        }
        _ => {}
    }
    for child in doc.tree.child_items(item) {
        emit_item(dom, doc, child, page_height, ops);
    }
}

fn emit_line(
    dom: &Document,
    doc: &LayoutDocument,
    line: ItemId,
    page_height: f32,
    ops: &mut Vec<Operation>,
) {
    let line_bounds = doc.tree.bounds(line);
    let baseline = doc.tree.line(line).baseline;
    for run_id in doc.tree.line(line).runs.clone() {
        let run_bounds = doc.tree.bounds(run_id);
        match doc.tree.run(run_id) {
            Run::Text(text) => {
                emit_text_run(text, run_bounds, line_bounds.y + baseline, page_height, ops);
            }
            Run::XObject { name } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        run_bounds.width.into(),
                        0.into(),
                        0.into(),
                        run_bounds.height.into(),
                        run_bounds.x.into(),
                        (page_height - run_bounds.bottom()).into(),
                    ],
                ));
                ops.push(Operation::new(
                    "Do",
                    vec![Object::Name(name.as_bytes().to_vec())],
                ));
                ops.push(Operation::new("Q", vec![]));
            }
            Run::MarkedContentBegin { tag } => {
                ops.push(Operation::new(
                    "BMC",
                    vec![Object::Name(winansi(tag))],
                ));
            }
            Run::MarkedContentEnd => {
                ops.push(Operation::new("EMC", vec![]));
            }
            Run::PositionedRegion { region } => {
                // Positioned content renders where its region was placed.
                let region = *region;
                for child in doc.tree.child_items(region) {
                    emit_item(dom, doc, child, page_height, ops);
                }
            }
            Run::Component { block } => {
                let block = *block;
                emit_item(dom, doc, block, page_height, ops);
            }
            Run::Spacer | Run::InlineBegin | Run::InlineEnd => {}
        }
    }
}

fn emit_text_run(
    text: &TextRun,
    bounds: Rect,
    baseline_y: f32,
    page_height: f32,
    ops: &mut Vec<Operation>,
) {
    let (r, g, b) = text.color.to_unit_rgb();
    let y = page_height - baseline_y;
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![
            Object::Name(text.font_resource.as_bytes().to_vec()),
            text.font.size.into(),
        ],
    ));
    ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
    ops.push(Operation::new("Td", vec![bounds.x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(winansi(&text.text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));

    match text.decoration {
        folio_style::TextDecoration::Underline => {
            let rule = Rect::new(bounds.x, baseline_y + 1.5, bounds.width, 0.7);
            fill_rect(ops, rule, text.color, page_height);
        }
        folio_style::TextDecoration::StrikeThrough => {
            let rule = Rect::new(
                bounds.x,
                baseline_y - text.font.size * 0.28,
                bounds.width,
                0.7,
            );
            fill_rect(ops, rule, text.color, page_height);
        }
        folio_style::TextDecoration::None => {}
    }
}

fn fill_rect(ops: &mut Vec<Operation>, rect: Rect, color: Color, page_height: f32) {
    let (r, g, b) = color.to_unit_rgb();
    ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
    ops.push(Operation::new(
        "re",
        vec![
            rect.x.into(),
            (page_height - rect.bottom()).into(),
            rect.width.into(),
            rect.height.into(),
        ],
    ));
    ops.push(Operation::new("f", vec![]));
}

fn stroke_rect(ops: &mut Vec<Operation>, rect: Rect, color: Color, width: f32, page_height: f32) {
    let (r, g, b) = color.to_unit_rgb();
    ops.push(Operation::new("RG", vec![r.into(), g.into(), b.into()]));
    ops.push(Operation::new("w", vec![width.into()]));
    ops.push(Operation::new(
        "re",
        vec![
            rect.x.into(),
            (page_height - rect.bottom()).into(),
            rect.width.into(),
            rect.height.into(),
        ],
    ));
    ops.push(Operation::new("S", vec![]));
}

/// WinAnsi (CP-1252) encoding for the standard-14 fonts: ASCII passes
/// through, the common typographic characters map to their CP-1252 slots
/// and anything else degrades to '?'.
pub fn winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' => c as u8,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}
