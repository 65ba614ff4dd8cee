//! Block formatting context.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block. The vertical
//! distance between two sibling boxes is determined by the 'margin'
//! properties. Vertical margins between adjacent block-level boxes in a
//! block formatting context collapse."

use super::box_model::{EPSILON, Rect};
use super::float::{FloatContext, Lane};
use super::formatting_context::{
    CollapsedMargin, LayoutContext, collapsed_margin_bottom, collapsed_margin_top,
    collapses_through_bottom, collapses_through_top, is_empty_collapsible,
};
use super::inline::layout_inline;
use super::layout_box::LayoutBox;
use crate::style::ClearSide;

impl LayoutBox {
    /// [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth) and
    /// [§ 10.6.3](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
    ///
    /// Lay out a block container with its border-box top at `y`.
    pub(crate) fn layout_block(
        &mut self,
        ctx: &mut LayoutContext<'_>,
        cb: Rect,
        y: f32,
        floats: &mut FloatContext,
    ) {
        // STEP 1: Width, padding, border and margins.
        self.compute_width(ctx, cb.width);
        self.resolve_vertical_margins(cb.width);

        // STEP 2: Position the content box.
        let d = &mut self.dimensions;
        d.content.x = cb.x + d.margin.left + d.border.left + d.padding.left;
        d.content.y = y + d.border.top + d.padding.top;

        // STEP 3: Lay out the children in this box's formatting context,
        // or in a new one if the box establishes one.
        let cb_height = cb.height.is_finite().then_some(cb.height);
        let mut own_floats = FloatContext::new();
        let floats = if self.formatting_root {
            &mut own_floats
        } else {
            floats
        };
        let mut content_height = if self.has_inline_content() {
            layout_inline(self, ctx, floats)
        } else {
            self.layout_block_children(ctx, cb.width, cb_height, floats)
        };

        // STEP 4: Contain floats.
        // [§ 10.6.7 'Auto' heights for block formatting context roots](https://www.w3.org/TR/CSS2/visudet.html#root-height)
        if self.formatting_root
            && let Some(bottom) = floats.max_float_bottom()
        {
            content_height = content_height.max(bottom - self.dimensions.content.y);
        }

        // STEP 5: Height.
        self.finish_height(ctx, content_height, cb_height);
    }

    /// Lay out block-level children one after another, collapsing adjoining
    /// margins. Returns the content height.
    fn layout_block_children(
        &mut self,
        ctx: &mut LayoutContext<'_>,
        cb_width: f32,
        cb_height: Option<f32>,
        floats: &mut FloatContext,
    ) -> f32 {
        let content = self.dimensions.content;
        let inner_height = self
            .specified_content_height(cb_height)
            .unwrap_or(f32::INFINITY);
        let inner = Rect::new(content.x, content.y, content.width, inner_height);
        let lane = Lane::of(inner);
        let through_top = collapses_through_top(self, cb_width);
        let through_bottom = collapses_through_bottom(self, cb_width);

        let mut cursor = content.y;
        let mut pending = CollapsedMargin::default();
        let mut at_start = true;

        for child in &mut self.children {
            // [§ 10.3.7] The static position is where the box would have been
            // in the normal flow.
            if child.style.is_absolutely_positioned() {
                child.static_position = Some((inner.x, cursor + pending.resolve()));
                continue;
            }
            if child.style.is_floated() {
                layout_float(child, ctx, inner, cursor + pending.resolve(), floats);
                continue;
            }
            if child.is_collapsible_whitespace() {
                continue;
            }

            // [§ 8.3.1] "If the top and bottom margins of a box are adjoining,
            // then it is possible for margins to collapse through it."
            if child.style.clear == ClearSide::None && is_empty_collapsible(child, inner.width) {
                let top = collapsed_margin_top(child, inner.width);
                let position = if at_start && through_top {
                    cursor
                } else {
                    cursor + pending.adjoin(top).resolve()
                };
                child.layout(ctx, inner, position, floats);
                pending = pending
                    .adjoin(top)
                    .adjoin(collapsed_margin_bottom(child, inner.width));
                continue;
            }

            // STEP 1: Collapse the child's top margin with what precedes it.
            // "The top margin of an in-flow block element collapses with its
            // first in-flow block-level child's top margin if the element has
            // no top border, no top padding, and the child has no clearance."
            let margin_top = collapsed_margin_top(child, inner.width);
            let mut top = if at_start && through_top && child.style.clear == ClearSide::None {
                cursor
            } else {
                cursor + pending.adjoin(margin_top).resolve()
            };

            // STEP 2: Clearance.
            // [§ 9.5.2] "the top border edge of the box [is] below the bottom
            // outer edge of any floats"
            if child.style.clear != ClearSide::None {
                top = floats.clear(child.style.clear, top);
            }

            // STEP 3: Lay out. A box that establishes a new formatting context
            // "must not overlap the margin box of any floats in the same block
            // formatting context as the element itself."
            if child.formatting_root && floats.intrudes(top, EPSILON, lane) {
                layout_beside_floats(child, ctx, inner, top, floats);
            } else {
                child.layout(ctx, inner, top, floats);
            }

            // Relative offsets leave the flow where it was.
            cursor = child.border_box().bottom() - child.relative_offset.1;
            pending = collapsed_margin_bottom(child, inner.width);
            at_start = false;
        }

        // "The bottom margin of an in-flow block box ... collapses with its
        // last in-flow block-level child's bottom margin"
        let end = if through_bottom || (at_start && through_top) {
            cursor
        } else {
            cursor + pending.resolve()
        };
        (end - content.y).max(0.0)
    }
}

/// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
///
/// Lay out a float in `cb` and place it in `floats` no higher than `y`.
pub(crate) fn layout_float(
    child: &mut LayoutBox,
    ctx: &mut LayoutContext<'_>,
    cb: Rect,
    y: f32,
    floats: &mut FloatContext,
) {
    child.layout(ctx, cb, y, &mut FloatContext::new());
    let margin_box = child.margin_box();
    let placed = floats.place_float(
        child.style.float,
        margin_box.width,
        margin_box.height,
        y,
        Lane::of(cb),
    );
    child.shift(placed.x - margin_box.x, placed.y - margin_box.y);
}

/// Lay out a formatting context root next to the floats it would overlap,
/// narrowing it to the space between them or moving it below them.
fn layout_beside_floats(
    child: &mut LayoutBox,
    ctx: &mut LayoutContext<'_>,
    inner: Rect,
    mut top: f32,
    floats: &mut FloatContext,
) {
    let lane = Lane::of(inner);
    for _ in 0..=floats.floats().len() {
        let (left, avail) = floats.available_range(top, EPSILON, lane);
        let narrowed = Rect::new(left, inner.y, avail, inner.height);
        child.layout(ctx, narrowed, top, floats);
        let margin_box = child.margin_box();
        let (_, avail_over_height) =
            floats.available_range(margin_box.y, margin_box.height.max(EPSILON), lane);
        if margin_box.width <= avail_over_height + EPSILON {
            return;
        }
        let next = floats.next_float_bottom_after(top);
        if next <= top {
            return;
        }
        top = next;
    }
}
