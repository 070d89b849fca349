//! Inline flow: words, spacers, markers and positioned-region runs placed
//! on lines inside an anonymous flow block. Lines are atomic for
//! pagination; when the next line does not fit, the flow closes and
//! continues in the next region or on a continuation page.

use super::measure::{image_display_size, Measurer};
use super::{page, EPSILON};
use crate::context::{LayoutContext, OpenLevel};
use crate::outcome::LayoutOutcome;
use crate::run::{Run, TextRun};
use crate::tree::ItemId;
use crate::LayoutError;
use folio_dom::{ComponentId, ComponentKind};
use folio_style::{ColumnOptions, HAlign, PositionMode, PositionOptions, TextOptions};
use folio_types::{Point, Rect, Size};

pub(crate) struct LineFlow {
    pub block: ItemId,
    pub region: ItemId,
    pub line: Option<ItemId>,
    pub align: HAlign,
    pub outcome: LayoutOutcome,
    /// The component whose content is currently flowing; new runs are
    /// tagged with it so arrangement push-back can find them.
    pub source: Option<ComponentId>,
}

/// Lays out a run of consecutive inline components as one flow. An empty
/// slice still opens a flow when a list marker is pending.
pub(crate) fn layout_inline_group(
    ctx: &mut LayoutContext,
    children: &[ComponentId],
) -> Result<LayoutOutcome, LayoutError> {
    let align = children
        .first()
        .map(|c| ctx.dom.tree.style(*c).text.align)
        .unwrap_or_default();

    let mut flow = open_flow(ctx, align);

    if let Some(marker) = ctx.pending_marker.take() {
        let opts = children
            .first()
            .map(|c| ctx.dom.tree.style(*c).text_options().clone())
            .unwrap_or_default();
        flow_word(ctx, &mut flow, &marker, &opts, None)?;
    }

    for &child in children {
        flow_component(ctx, &mut flow, child)?;
        if flow.outcome.halted() {
            break;
        }
    }
    close_flow(ctx, &mut flow);
    Ok(flow.outcome)
}

pub(crate) fn open_flow(ctx: &mut LayoutContext, align: HAlign) -> LineFlow {
    let region = ctx.current_region();
    let tree = &mut ctx.doc.tree;
    let bounds = tree.bounds(region);
    let y = tree.region_cursor_y(region);
    let available = tree.region_available_height(region);
    let block = tree.open_block(
        Some(region),
        None,
        Rect::new(bounds.x, y, bounds.width, available),
        PositionOptions::default(),
        ColumnOptions {
            count: 1,
            alley_width: 0.0,
        },
    );
    tree.region_push_block(region, block);
    let flow_region = tree.block_current_region(block);
    LineFlow {
        block,
        region: flow_region,
        line: None,
        align,
        outcome: LayoutOutcome::Fits,
        source: None,
    }
}

pub(crate) fn close_flow(ctx: &mut LayoutContext, flow: &mut LineFlow) {
    close_current_line(ctx, flow);
    let tree = &mut ctx.doc.tree;
    let parent = tree
        .parent(flow.block)
        .expect("flow block always sits in a region");
    if tree.region_is_empty(flow.region) {
        // Nothing flowed here; drop the empty block from its region.
        tree.close_block(flow.block, None);
        tree.region_pop_last(parent);
        return;
    }
    tree.close_block(flow.block, None);
    let b = tree.bounds(flow.block);
    tree.region_advance_used(parent, b.bottom(), b.width);
}

fn close_current_line(ctx: &mut LayoutContext, flow: &mut LineFlow) {
    if let Some(line) = flow.line.take() {
        ctx.doc.tree.close_line(line, flow.align);
    }
}

/// Returns an open line with at least `needed_height` of room, moving to
/// the next region or page when necessary. `None` means layout of this
/// subtree must halt.
fn ensure_line(
    ctx: &mut LayoutContext,
    flow: &mut LineFlow,
    needed_height: f32,
) -> Result<Option<ItemId>, LayoutError> {
    loop {
        if let Some(line) = flow.line {
            return Ok(Some(line));
        }
        let tree = &ctx.doc.tree;
        let region_bounds = tree.bounds(flow.region);
        let used = tree.region(flow.region).used.height;
        let available = region_bounds.height - used;

        if needed_height > available + EPSILON {
            let oversized = needed_height > region_bounds.height + EPSILON && used <= EPSILON;
            if oversized || !attempt_move(ctx, flow)? {
                if flow.outcome.halted() {
                    return Ok(None);
                }
                log::warn!(
                    "line of {needed_height:.2}pt cannot fit a region of \
                     {:.2}pt; permitting overflow",
                    region_bounds.height
                );
                ctx.doc.tree.region_mut(flow.region).overflow_permitted = true;
            } else {
                flow.outcome = flow.outcome.worst(LayoutOutcome::Overflowed);
                continue;
            }
        }

        let tree = &mut ctx.doc.tree;
        let parent = tree
            .parent(flow.block)
            .expect("flow block always sits in a region");
        let used = tree.region(flow.region).used.height;
        let y_abs = tree.bounds(flow.region).y + used;
        let y_in_parent = y_abs - tree.bounds(parent).y;
        let x = tree.region_line_x(parent, y_in_parent, needed_height.max(1.0));
        let width = tree.region_line_width(parent, y_in_parent, needed_height.max(1.0));
        let line = tree.open_line(flow.region, x, y_abs, width);
        flow.line = Some(line);
        return Ok(Some(line));
    }
}

/// Closes the flow and moves to the next region or page, reopening a fresh
/// flow there. On failure the flow is reopened in place and the outcome is
/// marked halted.
fn attempt_move(ctx: &mut LayoutContext, flow: &mut LineFlow) -> Result<bool, LayoutError> {
    if ctx.suppress_moves > 0 {
        return Ok(false);
    }
    let align = flow.align;
    let outcome = flow.outcome;
    let source = flow.source;
    close_flow(ctx, flow);

    let moved = ctx.move_to_next_region() || page::move_to_next_page(ctx)?;
    *flow = open_flow(ctx, align);
    flow.outcome = outcome;
    flow.source = source;
    if !moved {
        log::warn!("no further region or page is available; halting layout of this content");
        flow.outcome = LayoutOutcome::Halted;
    }
    Ok(moved)
}

pub(crate) fn flow_component(
    ctx: &mut LayoutContext,
    flow: &mut LineFlow,
    comp: ComponentId,
) -> Result<(), LayoutError> {
    let component = ctx.dom.tree.get(comp);
    flow.source = Some(comp);
    match &component.kind {
        ComponentKind::Text(content) => {
            let opts = component.style.text_options().clone();
            let link = content.link.clone();
            let text = content.text.clone();
            for (i, paragraph) in text.split('\n').enumerate() {
                if i > 0 {
                    close_current_line(ctx, flow);
                }
                for word in paragraph.split_whitespace() {
                    flow_word(ctx, flow, word, &opts, link.as_deref())?;
                    if flow.outcome.halted() {
                        return Ok(());
                    }
                }
            }
        }
        ComponentKind::PageNumberField => {
            let opts = component.style.text_options().clone();
            let number = ctx.page_number_text();
            if !number.is_empty() {
                flow_word(ctx, flow, &number, &opts, None)?;
            }
        }
        ComponentKind::Image(def) => {
            let size = image_display_size(&component.style, def);
            let key = def.name.clone();
            flow_image(ctx, flow, &key, size)?;
        }
        ComponentKind::Panel(_) if component.style.position.position != PositionMode::Flow => {
            flow_positioned(ctx, flow, comp, Point::zero(), false)?;
        }
        ComponentKind::Panel(_) if !component.style.position.width.is_auto() => {
            flow_embedded_block(ctx, flow, comp)?;
        }
        ComponentKind::Panel(_) => {
            let name = component.name.clone();
            let children = component.children.clone();
            push_marker(ctx, flow, Run::InlineBegin)?;
            if let Some(tag) = &name {
                push_marker(ctx, flow, Run::MarkedContentBegin { tag: tag.clone() })?;
            }
            for child in children {
                flow_component(ctx, flow, child)?;
                if flow.outcome.halted() {
                    return Ok(());
                }
            }
            if name.is_some() {
                push_marker(ctx, flow, Run::MarkedContentEnd)?;
            }
            push_marker(ctx, flow, Run::InlineEnd)?;
        }
        _ if component.style.position.position != PositionMode::Flow => {
            flow_positioned(ctx, flow, comp, Point::zero(), false)?;
        }
        _ => {
            panic!(
                "component kind {} cannot participate in inline flow",
                component.kind_name()
            );
        }
    }
    Ok(())
}

fn push_marker(
    ctx: &mut LayoutContext,
    flow: &mut LineFlow,
    run: Run,
) -> Result<(), LayoutError> {
    let Some(line) = ensure_line(ctx, flow, 0.0)? else {
        return Ok(());
    };
    ctx.doc.tree.push_run(line, run, Size::zero(), 0.0);
    Ok(())
}

pub(crate) fn flow_word(
    ctx: &mut LayoutContext,
    flow: &mut LineFlow,
    word: &str,
    opts: &TextOptions,
    link: Option<&str>,
) -> Result<(), LayoutError> {
    let font = opts.font.clone();
    let word_width = ctx.metrics.text_width(word, &font);
    let space_width = ctx.metrics.text_width(" ", &font);
    let line_height = opts.line_height();
    let ascent = ctx.metrics.ascent(&font);

    let Some(line) = ensure_line(ctx, flow, line_height)? else {
        return Ok(());
    };

    let data = ctx.doc.tree.line(line);
    let empty = data.runs.is_empty();
    let fits = data.used_width + space_width + word_width <= data.available_width + EPSILON;

    let line = if !empty && !fits {
        close_current_line(ctx, flow);
        match ensure_line(ctx, flow, line_height)? {
            Some(l) => l,
            None => return Ok(()),
        }
    } else {
        if !empty {
            ctx.doc.tree.push_run(
                line,
                Run::Spacer,
                Size::new(space_width, line_height),
                0.0,
            );
        }
        line
    };

    // A single unbreakable word wider than the line is admitted and the
    // line flagged overflow tolerant.
    let data = ctx.doc.tree.line(line);
    if data.runs.is_empty() && word_width > data.available_width + EPSILON {
        log::warn!(
            "unbreakable word of {word_width:.2}pt exceeds the line width {:.2}pt",
            data.available_width
        );
        ctx.doc.tree.mark_line_overflow_tolerant(line);
    }

    let font_resource = ctx.doc.tree.register_font_for(flow.block, font.postscript_name());
    let run = ctx.doc.tree.push_run(
        line,
        Run::Text(TextRun {
            text: word.to_string(),
            font,
            color: opts.color,
            decoration: opts.decoration,
            font_resource,
            link: link.map(str::to_string),
        }),
        Size::new(word_width, line_height),
        ascent,
    );
    ctx.doc.tree.get_mut(run).component = flow.source;
    Ok(())
}

fn flow_image(
    ctx: &mut LayoutContext,
    flow: &mut LineFlow,
    key: &str,
    size: Size,
) -> Result<(), LayoutError> {
    let Some(line) = ensure_line(ctx, flow, size.height)? else {
        return Ok(());
    };
    let data = ctx.doc.tree.line(line);
    let line = if !data.runs.is_empty() && data.used_width + size.width > data.available_width {
        close_current_line(ctx, flow);
        match ensure_line(ctx, flow, size.height)? {
            Some(l) => l,
            None => return Ok(()),
        }
    } else {
        line
    };
    let name = ctx.doc.tree.register_image_for(flow.block, key);
    ctx.doc.tree.push_run(
        line,
        Run::XObject { name },
        size,
        // Images sit on the baseline.
        size.height,
    );
    Ok(())
}

/// An inline panel with an explicit width becomes an embedded component
/// run: its content is laid out as a private block placed on the line
/// like an oversized glyph.
fn flow_embedded_block(
    ctx: &mut LayoutContext,
    flow: &mut LineFlow,
    comp: ComponentId,
) -> Result<(), LayoutError> {
    let style = ctx.dom.tree.style(comp).clone();
    let opts = style.position.clone();
    let region_width = ctx.doc.tree.bounds(flow.region).width;
    let width = opts
        .width
        .resolve(region_width)
        .expect("embedded blocks always carry an explicit width");
    let measurer = Measurer::new(ctx.dom, ctx.metrics);
    let natural = measurer.natural_size(comp, width);
    let explicit_height = match opts.height {
        folio_style::Dimension::Pt(h) => Some(h),
        _ => None,
    };
    let height = explicit_height.unwrap_or(natural.height - opts.margins.vertical());

    let Some(line) = ensure_line(ctx, flow, height)? else {
        return Ok(());
    };
    let data = ctx.doc.tree.line(line);
    let line = if !data.runs.is_empty() && data.used_width + width > data.available_width {
        close_current_line(ctx, flow);
        match ensure_line(ctx, flow, height)? {
            Some(l) => l,
            None => return Ok(()),
        }
    } else {
        line
    };

    let line_bounds = ctx.doc.tree.bounds(line);
    let x = line_bounds.x + ctx.doc.tree.line(line).used_width;
    let bounds = Rect::new(x, line_bounds.y, width, height);
    let block = ctx.doc.tree.open_block(
        Some(line),
        Some(comp),
        bounds,
        opts,
        style.columns.clone(),
    );
    let block_region = ctx.doc.tree.block_current_region(block);
    ctx.push_level(OpenLevel::plain(block, block_region, Some(comp)));
    ctx.suppress_moves += 1;
    let children = ctx.dom.tree.children(comp).to_vec();
    let result = super::layout_children(ctx, &children);
    ctx.suppress_moves -= 1;
    let level = ctx.pop_level();
    result?;
    let final_height = ctx.doc.tree.close_block(level.block, explicit_height);

    ctx.doc.tree.push_run(
        line,
        Run::Component { block },
        Size::new(width, final_height),
        final_height,
    );
    Ok(())
}

/// Places a positioned component: its content is laid out into a
/// positioned region owned by a zero-size run on the current line.
/// `base` is the origin absolute coordinates are resolved against;
/// `force_absolute` makes flow-positioned children behave as absolute
/// (canvas children).
pub(crate) fn flow_positioned(
    ctx: &mut LayoutContext,
    flow: &mut LineFlow,
    comp: ComponentId,
    base: Point,
    force_absolute: bool,
) -> Result<(), LayoutError> {
    let style = ctx.dom.tree.style(comp).clone();
    let opts = style.position.clone();
    let mode = if force_absolute || opts.position == PositionMode::Absolute {
        PositionMode::Absolute
    } else {
        PositionMode::Relative
    };

    let region_width = ctx.doc.tree.bounds(flow.region).width;
    let measurer = Measurer::new(ctx.dom, ctx.metrics);
    let natural = measurer.natural_size(comp, region_width);
    let width = opts.width.resolve(region_width).unwrap_or(natural.width);
    let explicit_height = match opts.height {
        folio_style::Dimension::Pt(h) => Some(h),
        _ => None,
    };
    let height = explicit_height.unwrap_or(natural.height - opts.margins.vertical());

    let Some(line) = ensure_line(ctx, flow, 0.0)? else {
        return Ok(());
    };

    let (x, y, dx, dy) = match mode {
        PositionMode::Absolute => (
            base.x + opts.x.unwrap_or(0.0),
            base.y + opts.y.unwrap_or(0.0),
            0.0,
            0.0,
        ),
        _ => {
            let line_bounds = ctx.doc.tree.bounds(line);
            let cursor_x = line_bounds.x + ctx.doc.tree.line(line).used_width;
            (
                cursor_x,
                line_bounds.y,
                opts.x.unwrap_or(0.0),
                opts.y.unwrap_or(0.0),
            )
        }
    };

    let bounds = Rect::new(x, y, width, height);
    let region = ctx
        .doc
        .tree
        .open_positioned_region(flow.block, bounds, mode, dx, dy);

    let is_panel = matches!(ctx.dom.tree.get(comp).kind, ComponentKind::Panel(_));
    // Panels pour their children straight into the positioned block; any
    // other kind keeps its own engine and lays out inside a wrapper.
    let (block_comp, block_opts) = if is_panel {
        (Some(comp), opts)
    } else {
        (None, PositionOptions::default())
    };
    let block = ctx.doc.tree.open_block(
        Some(region),
        block_comp,
        bounds,
        block_opts,
        style.columns.clone(),
    );
    ctx.doc.tree.region_push_block(region, block);
    let block_region = ctx.doc.tree.block_current_region(block);
    ctx.push_level(OpenLevel::plain(block, block_region, block_comp));
    ctx.suppress_moves += 1;
    let result = if is_panel {
        let children = ctx.dom.tree.children(comp).to_vec();
        super::layout_children(ctx, &children)
    } else {
        super::layout_in_place(ctx, comp)
    };
    ctx.suppress_moves -= 1;
    let level = ctx.pop_level();
    result?;
    ctx.doc.tree.close_block(level.block, explicit_height);
    ctx.doc.tree.close_region(region);

    ctx.doc
        .tree
        .push_run(line, Run::PositionedRegion { region }, Size::zero(), 0.0);
    Ok(())
}
