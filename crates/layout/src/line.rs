//! Lines: ordered runs with a computed height and baseline.

use crate::run::Run;
use crate::tree::{ItemId, ItemKind, LayoutTree};
use folio_style::HAlign;
use folio_types::{Rect, Size};

#[derive(Debug, Default)]
pub struct Line {
    pub runs: Vec<ItemId>,
    /// Distance from the top of the line to the text baseline.
    pub baseline: f32,
    /// Width available when the line was opened, floats already applied.
    pub available_width: f32,
    pub used_width: f32,
    /// Set when an unbreakable run wider than the line was admitted.
    pub overflow_tolerant: bool,
}

impl LayoutTree {
    /// Opens a new line at the given absolute position. The caller has
    /// already applied float insets to `x` and `available_width`.
    pub fn open_line(&mut self, region: ItemId, x: f32, y: f32, available_width: f32) -> ItemId {
        let line = self.add(
            Some(region),
            None,
            Rect::new(x, y, available_width, 0.0),
            ItemKind::Line(Line {
                available_width,
                ..Line::default()
            }),
        );
        self.region_push_line(region, line);
        line
    }

    /// Appends a run to an open line and returns its id. `size` and
    /// `ascent` become immutable inputs to the line's height and baseline
    /// once the line closes.
    pub fn push_run(&mut self, line: ItemId, run: Run, size: Size, ascent: f32) -> ItemId {
        assert!(!self.is_closed(line), "run pushed onto a closed line");
        let line_bounds = self.bounds(line);
        let used = self.line(line).used_width;
        let run_bounds = Rect::new(line_bounds.x + used, line_bounds.y, size.width, size.height);
        let run_id = self.add(Some(line), None, run_bounds, ItemKind::Run(run));

        let item = self.get_mut(line);
        item.bounds.height = item.bounds.height.max(size.height);
        let data = match &mut item.kind {
            ItemKind::Line(l) => l,
            _ => unreachable!(),
        };
        data.runs.push(run_id);
        data.used_width += size.width;
        data.baseline = data.baseline.max(ascent);
        run_id
    }

    /// Marks the line as deliberately wider than its available width
    /// (a single unbreakable run).
    pub fn mark_line_overflow_tolerant(&mut self, line: ItemId) {
        self.line_mut(line).overflow_tolerant = true;
    }

    /// Finalizes a line: merges adjacent compatible text runs, applies
    /// horizontal alignment and rolls the line's extent into the region.
    pub fn close_line(&mut self, line: ItemId, align: HAlign) {
        self.merge_text_runs(line);

        let data = self.line(line);
        let extra = data.available_width - data.used_width;
        let run_ids = data.runs.clone();
        if extra > 0.0 {
            let dx = match align {
                HAlign::Left => 0.0,
                HAlign::Center => extra / 2.0,
                HAlign::Right => extra,
            };
            if dx > 0.0 {
                for run in &run_ids {
                    // Embedded component blocks travel with their run;
                    // absolutely positioned regions stay where they are.
                    if matches!(self.run(*run), Run::Component { .. }) {
                        self.offset_subtree(*run, dx, 0.0);
                    } else {
                        let mut b = self.bounds(*run);
                        b.x += dx;
                        self.set_bounds(*run, b);
                    }
                }
            }
        }
        for run in run_ids {
            if !self.is_closed(run) {
                self.close(run);
            }
        }
        self.close(line);

        let line_bounds = self.bounds(line);
        let line_width = self.line(line).used_width;
        if let Some(region) = self.parent(line) {
            let region_bounds = self.bounds(region);
            let used = &mut self.region_mut(region).used;
            used.height = (line_bounds.bottom() - region_bounds.y).max(used.height);
            used.width = used.width.max(line_width);
        }
    }

    /// Collapses `Text Spacer Text` sequences with identical styling into a
    /// single run so the content stream carries whole phrases.
    fn merge_text_runs(&mut self, line: ItemId) {
        let runs = self.line(line).runs.clone();
        let mut merged: Vec<ItemId> = Vec::with_capacity(runs.len());
        let mut i = 0;
        while i < runs.len() {
            let current = runs[i];
            if !self.run(current).is_text() {
                merged.push(current);
                i += 1;
                continue;
            }
            let mut acc_text = match self.run(current) {
                Run::Text(t) => t.text.clone(),
                _ => unreachable!(),
            };
            let mut acc_width = self.bounds(current).width;
            let mut j = i + 1;
            while j + 1 < runs.len()
                && matches!(self.run(runs[j]), Run::Spacer)
                && self.text_runs_compatible(current, runs[j + 1])
            {
                let spacer_w = self.bounds(runs[j]).width;
                let next = runs[j + 1];
                let next_b = self.bounds(next);
                let next_text = match self.run(next) {
                    Run::Text(t) => t.text.clone(),
                    _ => unreachable!(),
                };
                acc_text.push(' ');
                acc_text.push_str(&next_text);
                acc_width += spacer_w + next_b.width;
                j += 2;
            }
            if let ItemKind::Run(Run::Text(t)) = &mut self.get_mut(current).kind {
                t.text = acc_text;
            }
            let mut b = self.bounds(current);
            b.width = acc_width;
            self.set_bounds(current, b);
            merged.push(current);
            i = j;
        }
        self.line_mut(line).runs = merged;
    }

    fn text_runs_compatible(&self, a: ItemId, b: ItemId) -> bool {
        if self.get(a).component != self.get(b).component {
            return false;
        }
        match (self.run(a), self.run(b)) {
            (Run::Text(ra), Run::Text(rb)) => {
                ra.font == rb.font
                    && ra.color == rb.color
                    && ra.decoration == rb.decoration
                    && ra.link == rb.link
                    && ra.font_resource == rb.font_resource
            }
            _ => false,
        }
    }
}

/// Line-fit accounting used by tests and assertions: the sum of run widths
/// of a closed line, which must not exceed the available width unless the
/// line is overflow tolerant.
pub fn run_width_sum(tree: &LayoutTree, line: ItemId) -> f32 {
    tree.line(line)
        .runs
        .iter()
        .map(|r| tree.bounds(*r).width)
        .sum()
}
