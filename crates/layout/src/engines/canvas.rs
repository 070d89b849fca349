//! Canvases: every child is taken out of flow and placed at its styled
//! (x, y) inside the canvas content box, carried by positioned-region
//! runs on a single line.

use super::inline;
use crate::context::LayoutContext;
use crate::outcome::LayoutOutcome;
use crate::run::Run;
use crate::LayoutError;
use folio_dom::ComponentId;
use folio_style::{ColumnOptions, HAlign};

pub(crate) fn layout_canvas(
    ctx: &mut LayoutContext,
    comp: ComponentId,
) -> Result<LayoutOutcome, LayoutError> {
    let style = ctx.dom.tree.style(comp).clone();
    let region_height = ctx.doc.tree.bounds(ctx.current_region()).height;
    let explicit_height = style.position.height.resolve(region_height);

    let Some(outcome) = super::panel::open_component_block(
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

    let canvas_region = ctx.current_region();
    let origin = ctx.doc.tree.bounds(canvas_region).origin();

    let mut flow = inline::open_flow(ctx, HAlign::Left);
    ctx.suppress_moves += 1;
    let children = ctx.dom.tree.children(comp).to_vec();
    let mut result: Result<(), LayoutError> = Ok(());
    for child in children {
        result = inline::flow_positioned(ctx, &mut flow, child, origin, true);
        if result.is_err() {
            break;
        }
    }
    ctx.suppress_moves -= 1;

    // Auto-height canvases grow to their furthest child extent.
    if let Some(line) = flow.line {
        let runs = ctx.doc.tree.line(line).runs.clone();
        let mut max_bottom = origin.y;
        let mut max_right: f32 = 0.0;
        for run in runs {
            if let Run::PositionedRegion { region } = ctx.doc.tree.run(run) {
                let b = ctx.doc.tree.bounds(*region);
                max_bottom = max_bottom.max(b.bottom());
                max_right = max_right.max(b.right());
            }
        }
        ctx.doc
            .tree
            .region_advance_used(canvas_region, max_bottom, max_right - origin.x);
    }
    inline::close_flow(ctx, &mut flow);
    result?;

    super::panel::finish_component_block(ctx, explicit_height);
    Ok(outcome)
}
