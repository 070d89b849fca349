//! The table reference model: a row-by-column matrix of cell references
//! plus the contiguous "grids" a table is broken into when page or column
//! breaks interrupt it.
//!
//! Structural mistakes here (double-adding a cell, spans overlapping) are
//! programming-contract violations and abort construction immediately.

use folio_dom::ComponentId;
use itertools::Itertools;

#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    /// A declared cell with no content.
    Empty,
    Content {
        component: ComponentId,
        row_span: usize,
        col_span: usize,
    },
    /// Covered by a content cell above. Placeholders always occupy a
    /// single matrix slot regardless of the owner's real span.
    SpannedRow { owner: (usize, usize) },
    /// Covered by a content cell to the left.
    SpannedColumn { owner: (usize, usize) },
}

/// A maximal run of rows laid out in one uninterrupted region. `end_row`
/// is exclusive and is truncated whenever a break starts a new grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRange {
    pub first_row: usize,
    pub end_row: usize,
}

#[derive(Debug)]
pub struct TableGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<CellKind>>,
    grids: Vec<GridRange>,
    repeat_rows: Vec<usize>,
}

impl TableGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
            grids: vec![GridRange {
                first_row: 0,
                end_row: 0,
            }],
            repeat_rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn slot(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell reference ({row}, {col}) outside a {}x{} table",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    pub fn kind(&self, row: usize, col: usize) -> Option<&CellKind> {
        self.cells[self.slot(row, col)].as_ref()
    }

    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.kind(row, col).is_some()
    }

    /// Places a content cell and its span placeholders. Re-adding an
    /// occupied slot is a contract violation.
    pub fn set_content(
        &mut self,
        row: usize,
        col: usize,
        component: ComponentId,
        row_span: usize,
        col_span: usize,
    ) {
        let row_span = row_span.max(1);
        let col_span = col_span.max(1);
        assert!(
            row + row_span <= self.rows && col + col_span <= self.cols,
            "cell ({row}, {col}) span {row_span}x{col_span} exceeds the {}x{} table",
            self.rows,
            self.cols
        );
        for r in row..row + row_span {
            for c in col..col + col_span {
                let slot = self.slot(r, c);
                assert!(
                    self.cells[slot].is_none(),
                    "cell ({r}, {c}) populated twice"
                );
                let kind = if r == row && c == col {
                    CellKind::Content {
                        component,
                        row_span,
                        col_span,
                    }
                } else if r > row {
                    CellKind::SpannedRow { owner: (row, col) }
                } else {
                    CellKind::SpannedColumn { owner: (row, col) }
                };
                self.cells[slot] = Some(kind);
            }
        }
    }

    pub fn set_empty(&mut self, row: usize, col: usize) {
        let slot = self.slot(row, col);
        assert!(
            self.cells[slot].is_none(),
            "cell ({row}, {col}) populated twice"
        );
        self.cells[slot] = Some(CellKind::Empty);
    }

    /// Fills every still-unpopulated slot with `Empty`, completing the
    /// matrix after ragged rows.
    pub fn fill_remaining_empty(&mut self) {
        for cell in &mut self.cells {
            if cell.is_none() {
                *cell = Some(CellKind::Empty);
            }
        }
    }

    pub fn is_fully_populated(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    /// Content cells as (row, col, component, row_span, col_span).
    pub fn content_cells(
        &self,
    ) -> impl Iterator<Item = (usize, usize, ComponentId, usize, usize)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, c)| match c {
            Some(CellKind::Content {
                component,
                row_span,
                col_span,
            }) => Some((
                i / self.cols,
                i % self.cols,
                *component,
                *row_span,
                *col_span,
            )),
            _ => None,
        })
    }

    /// First sizing pass: the widest natural width among unspanned content
    /// cells of the column.
    pub fn max_cell_width_for_column(
        &self,
        col: usize,
        natural: &dyn Fn(usize, usize) -> f32,
    ) -> f32 {
        (0..self.rows)
            .filter_map(|row| match self.kind(row, col) {
                Some(CellKind::Content { col_span, .. }) if *col_span == 1 => {
                    Some(natural(row, col))
                }
                _ => None,
            })
            .fold(0.0f32, f32::max)
    }

    /// Correction pass: walking each column, any column-spanning content
    /// cell whose span terminates there must find the sum of its spanned
    /// column widths at least equal to its required width. Any deficit is
    /// added to the final spanned column, never distributed.
    pub fn ensure_sufficient_width_for_spanned_cells(
        &self,
        widths: &mut [f32],
        required: &dyn Fn(usize, usize) -> f32,
    ) {
        assert_eq!(widths.len(), self.cols, "width slots must match columns");
        for col in 0..self.cols {
            for row in 0..self.rows {
                let owner = match self.kind(row, col) {
                    Some(CellKind::SpannedColumn { owner }) => *owner,
                    _ => continue,
                };
                let (o_row, o_col) = owner;
                let span = match self.kind(o_row, o_col) {
                    Some(CellKind::Content { col_span, .. }) => *col_span,
                    other => panic!(
                        "spanned cell ({row}, {col}) owner ({o_row}, {o_col}) is not content: {other:?}"
                    ),
                };
                // Only act where the span terminates.
                if o_col + span - 1 != col {
                    continue;
                }
                let current: f32 = widths[o_col..=col].iter().sum();
                let needed = required(o_row, o_col);
                if current < needed {
                    widths[col] += needed - current;
                }
            }
        }
    }

    /// Row heights are the max content-block height among the row's
    /// unspanned cells; spanning cells borrow from the rows they cover.
    pub fn max_cell_height_for_row(
        &self,
        row: usize,
        height: &dyn Fn(usize, usize) -> f32,
    ) -> f32 {
        (0..self.cols)
            .filter_map(|col| match self.kind(row, col) {
                Some(CellKind::Content { row_span, .. }) if *row_span == 1 => {
                    Some(height(row, col))
                }
                _ => None,
            })
            .fold(0.0f32, f32::max)
    }

    // Grid tracking.

    /// Starts a new contiguous grid at `first_row`, truncating the
    /// previous grid's end.
    pub fn begin_new_grid(&mut self, first_row: usize) {
        if let Some(last) = self.grids.last_mut() {
            last.end_row = last.end_row.min(first_row);
        }
        self.grids.push(GridRange {
            first_row,
            end_row: first_row,
        });
    }

    /// Records that `row` was laid out in the current grid.
    pub fn record_row(&mut self, row: usize) {
        let last = self
            .grids
            .last_mut()
            .expect("a table always has at least one grid");
        last.end_row = last.end_row.max(row + 1);
    }

    pub fn grids(&self) -> &[GridRange] {
        &self.grids
    }

    pub fn mark_repeat_row(&mut self, row: usize) {
        if !self.repeat_rows.contains(&row) {
            self.repeat_rows.push(row);
        }
    }

    pub fn repeat_rows(&self) -> &[usize] {
        &self.repeat_rows
    }
}

/// Resolves final column widths: declared point/percent widths first, the
/// natural-width pass for auto columns, remaining space distributed across
/// auto columns, then the spanned-cell correction pass.
pub fn solve_column_widths(
    grid: &TableGrid,
    declared: &[folio_dom::TableColumnDefinition],
    available: f32,
    natural: &dyn Fn(usize, usize) -> f32,
) -> Vec<f32> {
    use folio_style::dimension::Dimension;

    let cols = grid.cols();
    let mut widths = vec![0.0f32; cols];
    let mut auto_cols = Vec::new();

    for col in 0..cols {
        let declared_width = declared.get(col).map(|d| d.width).unwrap_or_default();
        match declared_width {
            Dimension::Pt(w) => widths[col] = w,
            Dimension::Percent(p) => widths[col] = available * p / 100.0,
            Dimension::Auto => {
                widths[col] = grid.max_cell_width_for_column(col, natural);
                auto_cols.push(col);
            }
        }
    }

    // Auto columns share whatever the declared columns leave over.
    if !auto_cols.is_empty() {
        let taken: f32 = widths.iter().sum();
        let spare = available - taken;
        if spare > 0.0 {
            let share = spare / auto_cols.len() as f32;
            for col in &auto_cols {
                widths[*col] += share;
            }
        }
    }

    grid.ensure_sufficient_width_for_spanned_cells(&mut widths, natural);

    let total: f32 = widths.iter().sum();
    if total > available + 0.01 {
        log::warn!(
            "table columns total {total:.2}pt exceed the available {available:.2}pt; \
             the table will overflow horizontally"
        );
    }
    widths
}

/// Rows marked repeat-at-top, in declaration order.
pub fn repeat_row_indices(repeat_flags: &[bool]) -> Vec<usize> {
    repeat_flags.iter().positions(|flag| *flag).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_dom::{Component, ComponentTree};
    use folio_style::Style;

    fn cell_id(tree: &mut ComponentTree) -> ComponentId {
        tree.add(Component::panel(Style::default()))
    }

    fn grid_3x3_with_colspan(tree: &mut ComponentTree) -> TableGrid {
        // cell(0,0) spans two columns.
        let mut grid = TableGrid::new(3, 3);
        grid.set_content(0, 0, cell_id(tree), 1, 2);
        grid.set_content(0, 2, cell_id(tree), 1, 1);
        for row in 1..3 {
            for col in 0..3 {
                grid.set_content(row, col, cell_id(tree), 1, 1);
            }
        }
        grid
    }

    #[test]
    fn spanned_placeholders_cover_the_span_rectangle() {
        let mut tree = ComponentTree::new();
        let grid = grid_3x3_with_colspan(&mut tree);
        assert!(matches!(
            grid.kind(0, 1),
            Some(CellKind::SpannedColumn { owner: (0, 0) })
        ));
        assert!(grid.is_fully_populated());
    }

    #[test]
    fn every_slot_is_populated_exactly_once() {
        let mut tree = ComponentTree::new();
        let mut grid = TableGrid::new(2, 2);
        grid.set_content(0, 0, cell_id(&mut tree), 2, 2);
        // The whole matrix is covered by the single span.
        for row in 0..2 {
            for col in 0..2 {
                assert!(grid.is_occupied(row, col));
            }
        }
    }

    #[test]
    #[should_panic(expected = "populated twice")]
    fn double_population_fails_fast() {
        let mut tree = ComponentTree::new();
        let mut grid = TableGrid::new(2, 2);
        let id = cell_id(&mut tree);
        grid.set_content(0, 0, id, 1, 2);
        grid.set_content(0, 1, id, 1, 1);
    }

    #[test]
    #[should_panic(expected = "populated twice")]
    fn overlapping_spans_fail_fast() {
        let mut tree = ComponentTree::new();
        let mut grid = TableGrid::new(3, 3);
        let a = cell_id(&mut tree);
        let b = cell_id(&mut tree);
        grid.set_content(0, 0, a, 2, 2);
        grid.set_content(1, 1, b, 1, 1);
    }

    #[test]
    fn spanned_correction_inflates_last_column() {
        let mut tree = ComponentTree::new();
        let grid = grid_3x3_with_colspan(&mut tree);
        // Natural widths: spanning cell needs 120, singles need 40.
        let natural = |row: usize, col: usize| {
            if row == 0 && col == 0 {
                120.0
            } else {
                40.0
            }
        };
        let mut widths = vec![40.0, 40.0, 40.0];
        grid.ensure_sufficient_width_for_spanned_cells(&mut widths, &natural);
        assert_eq!(widths[0], 40.0);
        assert_eq!(widths[1], 80.0);
        assert_eq!(widths[2], 40.0);
        assert!(widths[0] + widths[1] >= 120.0);
    }

    #[test]
    fn grids_truncate_at_breaks() {
        let mut tree = ComponentTree::new();
        let mut grid = grid_3x3_with_colspan(&mut tree);
        grid.record_row(0);
        grid.record_row(1);
        grid.begin_new_grid(2);
        grid.record_row(2);
        assert_eq!(
            grid.grids(),
            &[
                GridRange {
                    first_row: 0,
                    end_row: 2
                },
                GridRange {
                    first_row: 2,
                    end_row: 3
                }
            ]
        );
    }

    #[test]
    fn repeat_rows_from_flags() {
        assert_eq!(repeat_row_indices(&[true, true, false, false]), vec![0, 1]);
    }
}
