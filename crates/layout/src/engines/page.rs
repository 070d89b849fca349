//! Page construction and overflow control. `move_to_next_page` is the
//! heart of pagination: it closes the whole open depth stack from the
//! innermost flow outwards, rebuilds an equivalent page from the original
//! style snapshot and reopens equivalent blocks so the interrupted content
//! continues seamlessly.

use super::measure::Measurer;
use super::{panel, top_tail};
use crate::context::{LayoutContext, OpenLevel, PageSetup};
use crate::outcome::LayoutOutcome;
use crate::tree::ItemId;
use crate::LayoutError;
use folio_dom::{ComponentId, ComponentKind, PageDefinition};
use folio_style::{ColumnOptions, OverflowAction, PositionOptions, Style};
use folio_types::{Rect, Size};

pub(crate) fn layout_page_component(
    ctx: &mut LayoutContext,
    comp: ComponentId,
    group_style: Option<&Style>,
) -> Result<LayoutOutcome, LayoutError> {
    let style = ctx.dom.tree.style(comp).clone();

    let next_index = ctx.doc.page_count();
    if let Some(options) = style.page_number_options() {
        ctx.doc.numbering.register(next_index, options);
    }

    // Continuation pages rebuild from a pre-layout snapshot; a page-group
    // style overrides it when the group declares page options of its own.
    let continuation_style = match group_style {
        Some(group) if group.page != Default::default() => group.clone(),
        _ => style.clone(),
    };
    ctx.page_setup = Some(PageSetup {
        component: comp,
        style: continuation_style,
    });

    begin_page(ctx, comp, &style, false)?;
    let children = ctx.dom.tree.children(comp).to_vec();
    let outcome = super::layout_children(ctx, &children)?;
    finish_page(ctx);

    ctx.page_setup = None;
    ctx.current_page = None;
    Ok(outcome)
}

fn page_definition(ctx: &LayoutContext, comp: ComponentId) -> PageDefinition {
    match &ctx.dom.tree.get(comp).kind {
        ComponentKind::Page(def) => def.clone(),
        _ => panic!("page engine invoked on a non-page component"),
    }
}

/// Builds a page: size and margins from style, header laid out at the
/// top, footer (continuation variant on continuation pages) at the
/// bottom, and the content block with its column regions in between.
/// Header and footer templates are rendered fresh for every page.
fn begin_page(
    ctx: &mut LayoutContext,
    comp: ComponentId,
    style: &Style,
    continuation: bool,
) -> Result<(), LayoutError> {
    let definition = page_definition(ctx, comp);
    let (width, height) = style.page.size.dimensions_pt();
    let content = Rect::from_size(Size::new(width, height)).inset(style.page.margins);
    if content.width <= 0.0 || content.height <= 0.0 {
        return Err(LayoutError::EmptyContentArea(width, height));
    }

    let page = ctx.doc.add_page(Some(comp), Size::new(width, height));
    ctx.current_page = Some(page);

    let mut top = content.y;
    let mut bottom = content.bottom();

    if let Some(header) = definition.header {
        let (block, header_height) =
            layout_furniture(ctx, page, header, content.x, top, content.width, bottom - top)?;
        ctx.doc.tree.page_mut(page).header_block = Some(block);
        top += header_height;
    }

    let footer_template = if continuation {
        definition.continuation_footer.or(definition.footer)
    } else {
        definition.footer
    };
    if let Some(footer) = footer_template {
        let measurer = Measurer::new(ctx.dom, ctx.metrics);
        let footer_height = measurer.natural_size(footer, content.width).height;
        let footer_y = (bottom - footer_height).max(top);
        let (block, _) = layout_furniture(
            ctx,
            page,
            footer,
            content.x,
            footer_y,
            content.width,
            footer_height.max(1.0),
        )?;
        ctx.doc.tree.page_mut(page).footer_block = Some(block);
        bottom = footer_y;
    }

    let body = Rect::new(content.x, top, content.width, (bottom - top).max(0.0));
    if body.height <= 0.0 {
        return Err(LayoutError::EmptyContentArea(width, height));
    }

    let position = PositionOptions {
        overflow: style.position.overflow,
        ..PositionOptions::default()
    };
    let content_block = ctx
        .doc
        .tree
        .open_block(Some(page), Some(comp), body, position, style.columns.clone());
    ctx.doc.tree.page_mut(page).content_block = Some(content_block);
    let region = ctx.doc.tree.block_current_region(content_block);
    ctx.levels.clear();
    ctx.push_level(OpenLevel::plain(content_block, region, None));
    Ok(())
}

/// Lays a header or footer template into a standalone block attached to
/// the page itself, outside the content flow.
fn layout_furniture(
    ctx: &mut LayoutContext,
    page: ItemId,
    comp: ComponentId,
    x: f32,
    y: f32,
    width: f32,
    max_height: f32,
) -> Result<(ItemId, f32), LayoutError> {
    let block = ctx.doc.tree.open_block(
        Some(page),
        None,
        Rect::new(x, y, width, max_height.max(0.0)),
        PositionOptions::default(),
        ColumnOptions {
            count: 1,
            alley_width: 0.0,
        },
    );
    let region = ctx.doc.tree.block_current_region(block);
    ctx.push_level(OpenLevel::plain(block, region, None));
    ctx.suppress_moves += 1;
    let result = super::layout_children(ctx, &[comp]);
    ctx.suppress_moves -= 1;
    ctx.pop_level();
    result?;
    let height = ctx.doc.tree.close_block(block, None);
    Ok((block, height))
}

fn finish_page(ctx: &mut LayoutContext) {
    while !ctx.levels.is_empty() {
        let level = ctx.pop_level();
        if !ctx.doc.tree.is_closed(level.block) {
            ctx.doc.tree.close_block(level.block, None);
            panel::place_closed_block(&mut ctx.doc.tree, level.block);
        }
    }
    if let Some(page) = ctx.current_page {
        ctx.doc.tree.close_page(page);
    }
}

/// Moves layout onto a fresh continuation page. Succeeds only when the
/// page's overflow action allows it; on success the whole depth stack has
/// been closed and equivalent blocks reopened on the new page, and the
/// context's current region points into the innermost reopened block.
pub(crate) fn move_to_next_page(ctx: &mut LayoutContext) -> Result<bool, LayoutError> {
    if ctx.suppress_moves > 0 {
        return Ok(false);
    }
    let Some(setup) = ctx.page_setup.clone() else {
        return Ok(false);
    };
    if setup.style.position.overflow != OverflowAction::NewPage {
        log::warn!(
            "content does not fit and the page overflow action {:?} does not allow a \
             continuation page",
            setup.style.position.overflow
        );
        return Ok(false);
    }

    let saved = ctx.saved_levels();

    // Close every open level from the innermost flow outwards. A block
    // carrying footer templates is closed, reopened to take its
    // continuation footer in the space reserved for it, and closed again.
    while ctx.levels.len() > 1 {
        let level = ctx.pop_level();
        if !ctx.doc.tree.is_closed(level.block) {
            ctx.doc.tree.close_block(level.block, None);
        }
        if let Some(template) = level.continuation_footer_template() {
            let region = ctx.doc.tree.reopen_block(level.block, level.reserved_footer);
            let mut reopened = level.clone();
            reopened.region = region;
            reopened.reserved_footer = 0.0;
            ctx.push_level(reopened);
            ctx.suppress_moves += 1;
            let result = super::layout_children(ctx, &[template]);
            ctx.suppress_moves -= 1;
            ctx.pop_level();
            result?;
            ctx.doc.tree.close_block(level.block, None);
        }
        panel::place_closed_block(&mut ctx.doc.tree, level.block);
    }
    let base = ctx.pop_level();
    if !ctx.doc.tree.is_closed(base.block) {
        ctx.doc.tree.close_block(base.block, None);
    }
    if let Some(page) = ctx.current_page.take() {
        ctx.doc.tree.close_page(page);
    }

    begin_page(ctx, setup.component, &setup.style, true)?;

    // Reopen an equivalent block for every interrupted level, outermost
    // first, so the innermost flow resumes in a region of the same shape.
    for saved_level in saved {
        let region = ctx.current_region();
        let bounds = panel::block_geometry(&ctx.doc.tree, region, &saved_level.position);
        let block = ctx.doc.tree.open_block(
            Some(region),
            saved_level.component,
            bounds,
            saved_level.position.clone(),
            saved_level.columns.clone(),
        );
        ctx.doc.tree.region_push_block(region, block);
        let block_region = ctx.doc.tree.block_current_region(block);
        let mut level = OpenLevel::plain(block, block_region, saved_level.component);
        level.footer = saved_level.footer;
        level.continuation_footer = saved_level.continuation_footer;
        ctx.push_level(level);
        if level_has_footers(ctx) {
            top_tail::reserve_footer_space(ctx)?;
        }
    }
    Ok(true)
}

fn level_has_footers(ctx: &LayoutContext) -> bool {
    let level = ctx.current_level();
    level.footer.is_some() || level.continuation_footer.is_some()
}
