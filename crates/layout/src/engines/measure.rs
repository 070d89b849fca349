//! Natural-size measurement: a lightweight pass over a component subtree
//! used for fit checks, explicit sizing of positioned content and table
//! cell solving. The real layout pass remains the source of truth; these
//! sizes only have to be good enough to decide placement.

use crate::fonts::FontMetrics;
use crate::grid::{self, TableGrid};
use folio_dom::{ComponentId, ComponentKind, Document, ImageDefinition};
use folio_style::dimension::Dimension;
use folio_style::Style;
use folio_types::Size;

pub(crate) struct Measurer<'a> {
    pub dom: &'a Document,
    pub metrics: &'a dyn FontMetrics,
}

impl<'a> Measurer<'a> {
    pub fn new(dom: &'a Document, metrics: &'a dyn FontMetrics) -> Self {
        Self { dom, metrics }
    }

    /// Natural size of a component at the given available width. The
    /// returned height includes the component's own margins; the width is
    /// the border box.
    pub fn natural_size(&self, comp: ComponentId, available_width: f32) -> Size {
        let component = self.dom.tree.get(comp);
        let style = &component.style;
        let margins = style.position.margins;
        let padding = style.position.padding;

        let content_width = style
            .position
            .width
            .resolve(available_width)
            .unwrap_or(available_width)
            - padding.horizontal();
        let content_width = content_width.max(0.0);

        let mut size = match &component.kind {
            ComponentKind::Text(_) | ComponentKind::PageNumberField => {
                self.inline_extent(&[comp], content_width)
            }
            ComponentKind::Image(def) => image_display_size(style, def),
            ComponentKind::Panel(_) | ComponentKind::ListItem | ComponentKind::Cell(_) => {
                self.stacked_children(component.children.as_slice(), content_width)
            }
            ComponentKind::Canvas => self.canvas_extent(component.children.as_slice()),
            ComponentKind::Table(def) => {
                let grid = super::table::build_grid(self.dom, comp);
                self.table_extent(&grid, &def.columns, content_width)
            }
            ComponentKind::List(_) => {
                self.stacked_children(component.children.as_slice(), content_width)
            }
            ComponentKind::Row(_) => self.stacked_children(component.children.as_slice(), content_width),
            ComponentKind::Page(_) | ComponentKind::PageGroup => Size::zero(),
        };

        if let Dimension::Pt(h) = style.position.height {
            size.height = h - padding.vertical();
        }

        let mut width = size.width + padding.horizontal();
        let mut height = size.height + padding.vertical();
        if let Some(w) = style.position.width.resolve(available_width) {
            width = w;
        }
        if let Some(min) = style.position.min_width {
            width = width.max(min);
        }
        if let Some(min) = style.position.min_height {
            height = height.max(min);
        }

        Size::new(width, height + margins.vertical())
    }

    /// Children stacked vertically, consecutive inline children wrapped as
    /// one flow.
    fn stacked_children(&self, children: &[ComponentId], width: f32) -> Size {
        let mut height = 0.0f32;
        let mut max_width = 0.0f32;
        let mut inline_group: Vec<ComponentId> = Vec::new();

        for &child in children {
            if is_inline(self.dom, child) {
                inline_group.push(child);
                continue;
            }
            if !inline_group.is_empty() {
                let extent = self.inline_extent(&inline_group, width);
                height += extent.height;
                max_width = max_width.max(extent.width);
                inline_group.clear();
            }
            let child_size = self.natural_size(child, width);
            height += child_size.height;
            max_width = max_width.max(child_size.width);
        }
        if !inline_group.is_empty() {
            let extent = self.inline_extent(&inline_group, width);
            height += extent.height;
            max_width = max_width.max(extent.width);
        }
        Size::new(max_width, height)
    }

    /// Greedy wrap of the words of an inline run sequence.
    pub(crate) fn inline_extent(&self, comps: &[ComponentId], width: f32) -> Size {
        let mut words = Vec::new();
        for &comp in comps {
            self.collect_words(comp, &mut words);
        }
        if words.is_empty() {
            return Size::zero();
        }

        let mut line_width = 0.0f32;
        let mut max_line = 0.0f32;
        let mut line_height = 0.0f32;
        let mut total_height = 0.0f32;

        for (word_width, word_height, space_width, hard_break) in words {
            if hard_break && line_width > 0.0 {
                total_height += line_height;
                max_line = max_line.max(line_width);
                line_width = 0.0;
                line_height = 0.0;
            }
            let needed = if line_width > 0.0 {
                space_width + word_width
            } else {
                word_width
            };
            if line_width > 0.0 && line_width + needed > width {
                total_height += line_height;
                max_line = max_line.max(line_width);
                line_width = word_width;
                line_height = word_height;
            } else {
                line_width += needed;
                line_height = line_height.max(word_height);
            }
        }
        total_height += line_height;
        max_line = max_line.max(line_width);
        Size::new(max_line.min(width.max(0.0)), total_height)
    }

    /// Flattens a component into (width, line_height, space_width,
    /// hard_break_before) word tuples.
    fn collect_words(&self, comp: ComponentId, out: &mut Vec<(f32, f32, f32, bool)>) {
        let component = self.dom.tree.get(comp);
        let text_opts = component.style.text_options();
        match &component.kind {
            ComponentKind::Text(content) => {
                let font = &text_opts.font;
                let space = self.metrics.text_width(" ", font);
                let height = text_opts.line_height();
                for (i, paragraph) in content.text.split('\n').enumerate() {
                    let mut first = i > 0;
                    for word in paragraph.split_whitespace() {
                        let w = self.metrics.text_width(word, font);
                        out.push((w, height, space, first));
                        first = false;
                    }
                }
            }
            ComponentKind::PageNumberField => {
                let font = &text_opts.font;
                let sample = "88";
                out.push((
                    self.metrics.text_width(sample, font),
                    text_opts.line_height(),
                    self.metrics.text_width(" ", font),
                    false,
                ));
            }
            ComponentKind::Image(def) => {
                let size = image_display_size(&component.style, def);
                out.push((size.width, size.height, 0.0, false));
            }
            ComponentKind::Panel(_) => {
                for &child in &component.children {
                    self.collect_words(child, out);
                }
            }
            _ => {}
        }
    }

    fn canvas_extent(&self, children: &[ComponentId]) -> Size {
        let mut extent = Size::zero();
        for &child in children {
            let style = self.dom.tree.style(child);
            let size = self.natural_size(child, f32::INFINITY);
            let x = style.position.x.unwrap_or(0.0);
            let y = style.position.y.unwrap_or(0.0);
            extent.width = extent.width.max(x + size.width);
            extent.height = extent.height.max(y + size.height);
        }
        extent
    }

    fn table_extent(
        &self,
        grid: &TableGrid,
        columns: &[folio_dom::TableColumnDefinition],
        width: f32,
    ) -> Size {
        let natural = |row: usize, col: usize| self.cell_natural_width(grid, row, col);
        let widths = grid::solve_column_widths(grid, columns, width, &natural);
        let mut height = 0.0f32;
        for row in 0..grid.rows() {
            let row_height = grid.max_cell_height_for_row(row, &|r, c| {
                self.cell_measured_height(grid, &widths, r, c)
            });
            height += row_height;
        }
        Size::new(widths.iter().sum::<f32>().min(width), height)
    }

    pub(crate) fn cell_natural_width(&self, grid: &TableGrid, row: usize, col: usize) -> f32 {
        match grid.kind(row, col) {
            Some(crate::grid::CellKind::Content { component, .. }) => {
                self.natural_size(*component, f32::INFINITY).width
            }
            _ => 0.0,
        }
    }

    pub(crate) fn cell_measured_height(
        &self,
        grid: &TableGrid,
        widths: &[f32],
        row: usize,
        col: usize,
    ) -> f32 {
        match grid.kind(row, col) {
            Some(crate::grid::CellKind::Content {
                component,
                col_span,
                ..
            }) => {
                let span_width: f32 = widths[col..(col + col_span).min(widths.len())].iter().sum();
                self.natural_size(*component, span_width).height
            }
            _ => 0.0,
        }
    }
}

/// Display size of an image: explicit dimensions win, a single explicit
/// dimension preserves the pixel aspect ratio, and bare images map one
/// pixel to one point.
pub(crate) fn image_display_size(style: &Style, def: &ImageDefinition) -> Size {
    let pw = def.pixel_width.max(1) as f32;
    let ph = def.pixel_height.max(1) as f32;
    let width = match style.position.width {
        Dimension::Pt(w) => Some(w),
        _ => None,
    };
    let height = match style.position.height {
        Dimension::Pt(h) => Some(h),
        _ => None,
    };
    match (width, height) {
        (Some(w), Some(h)) => Size::new(w, h),
        (Some(w), None) => Size::new(w, w * ph / pw),
        (None, Some(h)) => Size::new(h * pw / ph, h),
        (None, None) => Size::new(pw, ph),
    }
}

/// Whether a component participates in line flow rather than opening its
/// own block. Positioned content is carried by a zero-size run on a line,
/// so it also flows inline.
pub(crate) fn is_inline(dom: &Document, comp: ComponentId) -> bool {
    use folio_style::{DisplayMode, PositionMode};
    let component = dom.tree.get(comp);
    if component.style.position.position != PositionMode::Flow {
        return true;
    }
    match &component.kind {
        ComponentKind::Text(_) | ComponentKind::PageNumberField => true,
        ComponentKind::Panel(_) | ComponentKind::Image(_) => {
            component.style.position.display == DisplayMode::Inline
        }
        _ => false,
    }
}
