//! The grid engine: builds the table reference matrix, solves column
//! widths and row heights, and places rows grid by grid across region and
//! page breaks, repeating flagged header rows at the top of every grid.

use super::measure::Measurer;
use super::{page, EPSILON};
use crate::context::{LayoutContext, OpenLevel};
use crate::grid::{self, CellKind, TableGrid};
use crate::outcome::LayoutOutcome;
use crate::LayoutError;
use folio_dom::{ComponentId, ComponentKind, Document};
use folio_style::ColumnOptions;
use folio_types::Rect;

/// Builds the cell reference matrix from the table component's rows.
/// Malformed structure (non-row children, non-cell row children, spans
/// colliding) is a programming-contract violation and fails fast.
pub(crate) fn build_grid(dom: &Document, table: ComponentId) -> TableGrid {
    let component = dom.tree.get(table);
    let mut rows = Vec::new();
    for &child in &component.children {
        match &dom.tree.get(child).kind {
            ComponentKind::Row(_) => rows.push(child),
            _ => panic!(
                "table children must be rows, found {}",
                dom.tree.get(child).kind_name()
            ),
        }
    }

    // First pass: simulate placement to find the column count, accounting
    // for spans pushing later cells to the right.
    struct Placement {
        row: usize,
        col: usize,
        component: ComponentId,
        row_span: usize,
        col_span: usize,
    }
    let mut placements: Vec<Placement> = Vec::new();
    let mut occupied: std::collections::HashSet<(usize, usize)> = std::collections::HashSet::new();
    let mut cols = 0usize;

    for (r, &row_id) in rows.iter().enumerate() {
        let mut c = 0usize;
        for &cell_id in dom.tree.children(row_id) {
            let def = match &dom.tree.get(cell_id).kind {
                ComponentKind::Cell(def) => def.clone(),
                _ => panic!(
                    "row children must be cells, found {}",
                    dom.tree.get(cell_id).kind_name()
                ),
            };
            while occupied.contains(&(r, c)) {
                c += 1;
            }
            let row_span = def.row_span.max(1);
            let col_span = def.col_span.max(1);
            for rr in r..r + row_span {
                for cc in c..c + col_span {
                    occupied.insert((rr, cc));
                }
            }
            placements.push(Placement {
                row: r,
                col: c,
                component: cell_id,
                row_span,
                col_span,
            });
            c += col_span;
            cols = cols.max(c);
        }
    }

    let mut grid = TableGrid::new(rows.len(), cols);
    for p in placements {
        let row_span = p.row_span.min(grid.rows() - p.row);
        grid.set_content(p.row, p.col, p.component, row_span, p.col_span);
    }
    grid.fill_remaining_empty();

    let repeat_flags: Vec<bool> = rows
        .iter()
        .map(|&row_id| {
            matches!(
                &dom.tree.get(row_id).kind,
                ComponentKind::Row(def) if def.repeat_at_top
            )
        })
        .collect();
    for row in grid::repeat_row_indices(&repeat_flags) {
        grid.mark_repeat_row(row);
    }
    grid
}

pub(crate) fn layout_table(
    ctx: &mut LayoutContext,
    comp: ComponentId,
) -> Result<LayoutOutcome, LayoutError> {
    let style = ctx.dom.tree.style(comp).clone();
    let columns_def = match &ctx.dom.tree.get(comp).kind {
        ComponentKind::Table(def) => def.columns.clone(),
        _ => panic!("table engine invoked on a non-table component"),
    };
    let mut grid = build_grid(ctx.dom, comp);

    let region_height = ctx.doc.tree.bounds(ctx.current_region()).height;
    let explicit_height = style.position.height.resolve(region_height);

    let Some(mut outcome) = super::panel::open_component_block(
        ctx,
        comp,
        style.position.clone(),
        ColumnOptions {
            count: 1,
            alley_width: 0.0,
        },
    )?
    else {
        return Ok(LayoutOutcome::Halted);
    };

    let available_width = ctx.doc.tree.bounds(ctx.current_region()).width;
    let measurer = Measurer::new(ctx.dom, ctx.metrics);
    let widths = grid::solve_column_widths(&grid, &columns_def, available_width, &|r, c| {
        measurer.cell_natural_width(&grid, r, c)
    });
    let heights: Vec<f32> = (0..grid.rows())
        .map(|r| {
            grid.max_cell_height_for_row(r, &|rr, cc| {
                measurer.cell_measured_height(&grid, &widths, rr, cc)
            })
        })
        .collect();

    let mut rows_in_current_grid = 0usize;
    for row in 0..grid.rows() {
        let row_height = heights[row];
        let region = ctx.current_region();
        let available = ctx.doc.tree.region_available_height(region);
        let must_break = row_height > available + EPSILON
            && (rows_in_current_grid > 0 || ctx.doc.tree.region_item_count(region) >= 1);

        if must_break {
            if ctx.suppress_moves == 0
                && (ctx.move_to_next_region() || page::move_to_next_page(ctx)?)
            {
                outcome = LayoutOutcome::Overflowed;
                grid.begin_new_grid(row);
                rows_in_current_grid = 0;
                for &header_row in &grid.repeat_rows().to_vec() {
                    if header_row < row {
                        place_row(ctx, &grid, header_row, &widths, &heights)?;
                    }
                }
            } else {
                log::warn!(
                    "table row {row} of {:.2}pt cannot fit and no further region is \
                     available; halting the table",
                    row_height
                );
                outcome = LayoutOutcome::Halted;
                break;
            }
        }

        place_row(ctx, &grid, row, &widths, &heights)?;
        grid.record_row(row);
        rows_in_current_grid += 1;
    }

    super::panel::finish_component_block(ctx, explicit_height);
    Ok(outcome)
}

/// Places one row: every content cell whose origin is this row becomes a
/// block at its column offset, closed at the uniform row height (or the
/// summed heights it spans).
fn place_row(
    ctx: &mut LayoutContext,
    grid: &TableGrid,
    row: usize,
    widths: &[f32],
    heights: &[f32],
) -> Result<(), LayoutError> {
    let region = ctx.current_region();
    let region_bounds = ctx.doc.tree.bounds(region);
    let y = ctx.doc.tree.region_cursor_y(region);
    let x0 = region_bounds.x;
    let row_height = heights[row];

    for col in 0..grid.cols() {
        let (component, row_span, col_span) = match grid.kind(row, col) {
            Some(CellKind::Content {
                component,
                row_span,
                col_span,
            }) => (*component, *row_span, *col_span),
            _ => continue,
        };
        let x = x0 + widths[..col].iter().sum::<f32>();
        let span_width: f32 = widths[col..(col + col_span).min(widths.len())].iter().sum();
        let cell_height: f32 = heights[row..(row + row_span).min(heights.len())].iter().sum();
        let cell_height = cell_height.max(row_height);

        let style = ctx.dom.tree.style(component).clone();
        let block = ctx.doc.tree.open_block(
            Some(region),
            Some(component),
            Rect::new(x, y, span_width, cell_height),
            style.position.clone(),
            ColumnOptions {
                count: 1,
                alley_width: 0.0,
            },
        );
        ctx.doc.tree.region_push_block(region, block);
        let block_region = ctx.doc.tree.block_current_region(block);
        // Cell heights are pushed uniformly; content never forces moves.
        ctx.doc.tree.region_mut(block_region).overflow_permitted = true;
        ctx.push_level(OpenLevel::plain(block, block_region, Some(component)));
        ctx.suppress_moves += 1;
        let children = ctx.dom.tree.children(component).to_vec();
        let result = super::layout_children(ctx, &children);
        ctx.suppress_moves -= 1;
        let level = ctx.pop_level();
        result?;
        ctx.doc.tree.close_block(level.block, Some(cell_height));
    }

    let total_width: f32 = widths.iter().sum();
    ctx.doc
        .tree
        .region_advance_used(region, y + row_height, total_width);
    Ok(())
}
