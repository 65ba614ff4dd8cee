//! CSS Positioned Layout.
//!
//! [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
//!
//! "In the absolute positioning model, a box is removed from the normal flow
//! entirely and assigned a position with respect to a containing block."
//!
//! Absolutely positioned boxes are laid out after the flow they sit in, by
//! the nearest positioned ancestor (or the root), from the static position
//! their placeholder recorded.

use super::box_model::Rect;
use super::float::FloatContext;
use super::formatting_context::LayoutContext;
use super::layout_box::LayoutBox;
use crate::style::{AutoLength, BoxSizing, LengthValue};

/// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
///
/// Used `(top, right, bottom, left)` insets, `None` for `auto`.
/// "The offset is a percentage of the containing block's width (for 'left'
/// or 'right') or height (for 'top' or 'bottom')."
fn resolve_insets(b: &LayoutBox, cb: Rect) -> [Option<f32>; 4] {
    let height = cb.height.is_finite().then_some(cb.height);
    let inset = &b.style.inset;
    [
        inset.top.resolve_definite(height),
        inset.right.resolve_definite(Some(cb.width)),
        inset.bottom.resolve_definite(height),
        inset.left.resolve_definite(Some(cb.width)),
    ]
}

/// A content size as a specified `width`/`height` under `box-sizing`.
fn as_specified(b: &LayoutBox, content: f32, chrome: f32) -> AutoLength {
    AutoLength::Length(LengthValue::Px(match b.style.box_sizing {
        BoxSizing::ContentBox => content,
        BoxSizing::BorderBox => content + chrome,
    }))
}

/// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
///
/// "'left' + 'margin-left' + 'border-left-width' + 'padding-left' + 'width'
/// + 'padding-right' + 'border-right-width' + 'margin-right' + 'right' =
/// width of containing block"
///
/// Lays out `b` against `cb`, the padding box of its containing block.
pub(crate) fn layout_absolute(b: &mut LayoutBox, ctx: &mut LayoutContext<'_>, cb: Rect) {
    let [top, right, bottom, left] = resolve_insets(b, cb);
    let (static_x, static_y) = b.static_position.unwrap_or((cb.x, cb.y));

    // STEP 1: Width. Shrink-to-fit unless both horizontal insets are given.
    b.compute_width(ctx, cb.width);
    let d = b.dimensions;
    let chrome_x = d.horizontal_chrome();
    let mut width = d.content.width;
    if b.style.width.is_auto()
        && let (Some(l), Some(r)) = (left, right)
    {
        let fill = cb.width - l - r - d.margin.left - d.margin.right - chrome_x;
        width = b.clamp_content_width(fill.max(0.0), cb.width);
    }
    let outer_width = width + chrome_x + d.margin.left + d.margin.right;

    // STEP 2: Horizontal position of the margin box.
    // "If all three of 'left', 'width', and 'right' are 'auto'... set 'left'
    // to the static position"
    let margin_x = match (left, right) {
        (Some(l), _) => cb.x + l,
        (None, Some(r)) => cb.right() - r - outer_width,
        (None, None) => static_x,
    };

    // STEP 3: Fill the height when both vertical insets are given.
    // [§ 10.6.4](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-height)
    let saved = (b.style.width, b.style.height);
    b.style.width = as_specified(b, width, chrome_x);
    b.resolve_vertical_margins(cb.width);
    let (margin_top, margin_bottom) = (b.dimensions.margin.top, b.dimensions.margin.bottom);
    if b.style.height.is_auto()
        && cb.height.is_finite()
        && let (Some(t), Some(bt)) = (top, bottom)
    {
        let chrome_y = b.dimensions.vertical_chrome();
        let fill = (cb.height - t - bt - margin_top - margin_bottom - chrome_y).max(0.0);
        b.style.height = as_specified(b, fill, chrome_y);
    }

    // STEP 4: Lay out the contents.
    let margin_y = top.map_or(static_y, |t| cb.y + t);
    let slot = Rect::new(margin_x, cb.y, outer_width, cb.height);
    b.layout(ctx, slot, margin_y + margin_top, &mut FloatContext::new());
    (b.style.width, b.style.height) = saved;
    b.containing_block = cb;

    // STEP 5: "If 'top' is 'auto' and 'bottom' is not, solve for 'top'."
    if top.is_none()
        && let Some(bt) = bottom
        && cb.height.is_finite()
    {
        let margin_box = b.margin_box();
        b.shift(0.0, cb.bottom() - bt - margin_box.bottom());
    }

    // STEP 6: This box is the containing block of its own absolutely
    // positioned descendants.
    let padding_box = b.dimensions.padding_box();
    b.layout_positioned_descendants(ctx, padding_box);

    #[cfg(feature = "layout-trace")]
    eprintln!(
        "[POSITIONED] {:?} at ({:.1}, {:.1}) {:.1}x{:.1}",
        b.id,
        b.dimensions.content.x,
        b.dimensions.content.y,
        b.dimensions.content.width,
        b.dimensions.content.height
    );
}

/// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
///
/// "Once a box has been laid out according to the normal flow, it may be
/// shifted relative to its normal position."
///
/// "If neither 'left' nor 'right' is 'auto', the position is
/// over-constrained, and one of them has to be ignored. If the 'direction'
/// property of the containing block is 'ltr', the value of 'left' wins"
pub(crate) fn apply_relative_offset(b: &mut LayoutBox, cb: Rect) {
    let [top, right, bottom, left] = resolve_insets(b, cb);
    let dx = left.or_else(|| right.map(|r| -r)).unwrap_or(0.0);
    let dy = top.or_else(|| bottom.map(|v| -v)).unwrap_or(0.0);
    b.shift(dx, dy);
    b.relative_offset = (dx, dy);
}
