//! CSS Flexbox Layout Algorithm.
//!
//! [§ 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)
//!
//! Supported:
//! - `flex-direction` row and column, plus the `-reverse` variants
//! - `flex-wrap` line breaking, `row-gap` / `column-gap`
//! - `flex-basis` (definite, `auto` via the main size property, aspect-ratio
//!   transfer, or content size)
//! - `flex-grow` / `flex-shrink` with the § 9.7 freeze loop and min/max clamps
//! - `justify-content`, `align-items` / `align-self`
//!
//! Not implemented: `order`, `align-content`, multi-line stretch of lines.

use super::box_model::{EPSILON, Rect};
use super::float::FloatContext;
use super::formatting_context::LayoutContext;
use super::layout_box::{BoxKind, LayoutBox};
use crate::style::{AlignItems, AutoLength, BoxSizing, FlexWrap, JustifyContent, LengthValue};

/// Per-item data collected during flex layout.
///
/// [§ 9.2 Line Length Determination](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)
#[derive(Debug, Clone)]
struct FlexItem {
    /// Index into `container.children`.
    index: usize,
    /// [§ 9.2 step 3](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)
    /// The flex base size, as a content size.
    base_size: f32,
    /// "The hypothetical main size is the item's flex base size clamped
    /// according to its used min and max main sizes."
    hypothetical_size: f32,
    /// Used min main size.
    min_main: f32,
    /// Used max main size.
    max_main: f32,
    /// flex-grow factor.
    grow: f32,
    /// flex-shrink factor.
    shrink: f32,
    /// The resolved target main size after § 9.7.
    target_size: f32,
    /// Whether this item is frozen during the § 9.7 loop.
    frozen: bool,
    /// Margin, border and padding on the main axis.
    outer_main: f32,
}

impl FlexItem {
    fn outer_hypothetical(&self) -> f32 {
        self.hypothetical_size + self.outer_main
    }

    fn outer_target(&self) -> f32 {
        self.target_size + self.outer_main
    }
}

/// Whether the item has a preferred aspect ratio, which makes its cross size
/// follow its main size instead of stretching.
fn has_preferred_ratio(b: &LayoutBox) -> bool {
    b.style.aspect_ratio.is_some() || (b.kind == BoxKind::Replaced && b.intrinsic_size.is_some())
}

/// Override a width or height with a content-box pixel size, respecting the
/// item's `box-sizing`.
fn fixed_size(b: &LayoutBox, content: f32, chrome: f32) -> AutoLength {
    let specified = match b.style.box_sizing {
        BoxSizing::ContentBox => content,
        BoxSizing::BorderBox => content + chrome,
    };
    AutoLength::Length(LengthValue::Px(specified))
}

/// Main entry point for flex layout.
///
/// [§ 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)
pub(crate) fn layout_flex(container: &mut LayoutBox, ctx: &mut LayoutContext<'_>, cb: Rect, y: f32) {
    #[cfg(feature = "layout-trace")]
    eprintln!(
        "[FLEX] {} items, direction={}",
        container.children.len(),
        container.style.flex_direction
    );

    // STEP 1: Resolve the container's own width and position.
    //
    // [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    // The flex container is a block-level box, so its own width is determined
    // by the same constraint equation.
    container.compute_width(ctx, cb.width);
    container.resolve_vertical_margins(cb.width);
    let d = &mut container.dimensions;
    d.content.x = cb.x + d.margin.left + d.border.left + d.padding.left;
    d.content.y = y + d.border.top + d.padding.top;
    let content = container.dimensions.content;
    let cb_height = cb.height.is_finite().then_some(cb.height);
    let definite_height = container.specified_content_height(cb_height);

    let row = container.style.flex_direction.is_row();
    let reverse = container.style.flex_direction.is_reverse();
    let main_gap = if row {
        container.style.column_gap.resolve(content.width)
    } else {
        container.style.row_gap.resolve(definite_height.unwrap_or(0.0))
    };
    let cross_gap = if row {
        container.style.row_gap.resolve(definite_height.unwrap_or(0.0))
    } else {
        container.style.column_gap.resolve(content.width)
    };
    let available_main = if row { Some(content.width) } else { definite_height };

    // STEP 2: Determine the flex base size and hypothetical main size of
    // each item.
    //
    // [§ 4.1 Absolutely-Positioned Flex Children](https://www.w3.org/TR/css-flexbox-1/#abspos-items)
    // "An absolutely-positioned child of a flex container does not
    // participate in flex layout."
    let mut items = Vec::new();
    for index in 0..container.children.len() {
        let child = &mut container.children[index];
        if child.style.is_absolutely_positioned() {
            child.static_position = Some((content.x, content.y));
            continue;
        }
        if child.is_collapsible_whitespace() {
            continue;
        }
        child.flex_item = true;
        items.push(flex_item(child, ctx, index, content, definite_height, row));
    }

    // STEP 3: Collect flex items into flex lines.
    // [§ 9.3 step 5](https://www.w3.org/TR/css-flexbox-1/#algo-line-break)
    let mut lines = collect_lines(
        items,
        container.style.flex_wrap,
        available_main,
        main_gap,
    );

    // STEP 4: Resolve flexible lengths, lay out each item at its main size
    // and find each line's cross size.
    let definite_cross = if row { definite_height } else { Some(content.width) };
    let mut line_cross_sizes = Vec::with_capacity(lines.len());
    let mut used_main: f32 = 0.0;
    for line in &mut lines {
        #[allow(clippy::cast_precision_loss)]
        let gaps = main_gap * line.len().saturating_sub(1) as f32;
        let line_main = available_main.unwrap_or_else(|| {
            line.iter().map(FlexItem::outer_hypothetical).sum::<f32>() + gaps
        });
        resolve_flexible_lengths(line, line_main - gaps);
        let mut cross: f32 = 0.0;
        for item in line.iter() {
            let align_items = container.style.align_items;
            let child = &mut container.children[item.index];
            let align = child.style.align_self.unwrap_or(align_items);
            layout_item_main(child, ctx, item, content, align, row);
            let margin_box = child.margin_box();
            cross = cross.max(if row { margin_box.height } else { margin_box.width });
        }
        // [§ 9.4 step 8] "If the flex container is single-line and has a
        // definite cross size, the cross size of the flex line is the flex
        // container's inner cross size."
        if container.style.flex_wrap == FlexWrap::Nowrap
            && let Some(definite) = definite_cross
        {
            cross = definite;
        }
        let total: f32 = line.iter().map(FlexItem::outer_target).sum::<f32>() + gaps;
        used_main = used_main.max(total);
        line_cross_sizes.push(cross);
    }

    // STEP 5: Align items on both axes.
    let main_size = available_main.unwrap_or(used_main);
    let mut cross_offset = 0.0;
    for (line, &line_cross) in lines.iter().zip(&line_cross_sizes) {
        #[allow(clippy::cast_precision_loss)]
        let gaps = main_gap * line.len().saturating_sub(1) as f32;
        let total: f32 = line.iter().map(FlexItem::outer_target).sum::<f32>() + gaps;
        let free = main_size - total;
        let (initial, between) =
            compute_justify_offsets(container.style.justify_content, free, line.len());
        let baseline = line_baseline(container, line, row, container.style.align_items);

        let mut main_pos = initial;
        for item in line {
            let align = container.children[item.index]
                .style
                .align_self
                .unwrap_or(container.style.align_items);
            let child = &mut container.children[item.index];
            stretch_item(child, ctx, align, line_cross, content, row);
            let margin_box = child.margin_box();
            let (outer_main, outer_cross) = if row {
                (margin_box.width, margin_box.height)
            } else {
                (margin_box.height, margin_box.width)
            };
            // [§ 8.3 Cross-axis Alignment](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
            let cross_pos = cross_offset
                + match align {
                    AlignItems::FlexEnd => line_cross - outer_cross,
                    AlignItems::Center => (line_cross - outer_cross) / 2.0,
                    AlignItems::Baseline if row => baseline - first_baseline(child),
                    _ => 0.0,
                };
            // "flex-direction: row-reverse... main-start and main-end
            // directions are swapped."
            let main_start = if reverse {
                main_size - main_pos - outer_main
            } else {
                main_pos
            };
            let (tx, ty) = if row {
                (content.x + main_start, content.y + cross_pos)
            } else {
                (content.x + cross_pos, content.y + main_start)
            };
            child.shift(tx - margin_box.x, ty - margin_box.y);
            main_pos += outer_main + between + main_gap;
        }
        cross_offset += line_cross + cross_gap;
    }

    // STEP 6: Container height.
    //
    // [§ 9.9 Cross Size Determination](https://www.w3.org/TR/css-flexbox-1/#algo-cross-container)
    // "If the cross size property is a definite size, use that; otherwise,
    // use the sum of the flex lines' cross sizes."
    #[allow(clippy::cast_precision_loss)]
    let cross_gaps = cross_gap * line_cross_sizes.len().saturating_sub(1) as f32;
    let content_height = if row {
        line_cross_sizes.iter().sum::<f32>() + cross_gaps
    } else {
        used_main
    };
    container.finish_height(ctx, content_height, cb_height);
}

/// Gather the sizes of one item.
fn flex_item(
    child: &mut LayoutBox,
    ctx: &mut LayoutContext<'_>,
    index: usize,
    content: Rect,
    definite_height: Option<f32>,
    row: bool,
) -> FlexItem {
    child.resolve_padding_and_border(content.width);
    let m = child.style.margin;
    let (main_start, main_end) = if row { (m.left, m.right) } else { (m.top, m.bottom) };
    let margins = main_start.resolve_definite(Some(content.width)).unwrap_or(0.0)
        + main_end.resolve_definite(Some(content.width)).unwrap_or(0.0);
    let chrome = if row {
        child.dimensions.horizontal_chrome()
    } else {
        child.dimensions.vertical_chrome()
    };
    let main_basis = if row { Some(content.width) } else { definite_height };

    // [§ 9.2 step 3](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)
    //   A. "If the item has a definite used flex basis, that's the flex base size."
    //   B. "If the flex item has an intrinsic aspect ratio, a used flex basis
    //      of content, and a definite cross size, then the flex base size is
    //      calculated from its inner cross size and the flex item's intrinsic
    //      aspect ratio."
    //   E. "Otherwise, size the item into the available space using its used
    //      flex basis in place of its main size"
    let from_basis = child
        .style
        .flex_basis
        .resolve_definite(main_basis)
        .map(|b| to_content(child, b, row));
    let from_main_size = || {
        if row {
            child.specified_content_width(content.width)
        } else {
            child.specified_content_height(definite_height)
        }
    };
    let from_ratio = || {
        let ratio = child.style.aspect_ratio?;
        if row {
            child
                .specified_content_height(definite_height)
                .map(|h| h * ratio)
        } else {
            child.specified_content_width(content.width).map(|w| w / ratio)
        }
    };
    let base_size = match from_basis.or_else(from_main_size).or_else(from_ratio) {
        Some(size) => size,
        None if row => child.content_intrinsic_widths(ctx).1,
        None => ctx.measuring(|ctx| {
            let mut probe = child.clone();
            probe.flex_item = true;
            probe.layout(ctx, content, content.y, &mut FloatContext::new());
            probe.dimensions.content.height
        }),
    };

    let (min_main, max_main) = if row {
        (
            child.clamp_content_width(0.0, content.width),
            child.clamp_content_width(f32::INFINITY, content.width),
        )
    } else {
        (
            child.clamp_content_height(0.0, definite_height),
            child.clamp_content_height(f32::INFINITY, definite_height),
        )
    };
    let hypothetical_size = base_size.clamp(min_main, max_main.max(min_main));

    FlexItem {
        index,
        base_size,
        hypothetical_size,
        min_main,
        max_main: max_main.max(min_main),
        grow: child.style.flex_grow,
        shrink: child.style.flex_shrink,
        target_size: hypothetical_size,
        frozen: false,
        outer_main: margins + chrome,
    }
}

/// A border-box main size as a content size.
fn to_content(b: &LayoutBox, size: f32, row: bool) -> f32 {
    if row {
        b.content_width_from(size)
    } else {
        b.content_height_from(size)
    }
}

/// [§ 9.3 step 5](https://www.w3.org/TR/css-flexbox-1/#algo-line-break)
///
/// "collect consecutive items one by one until the first time that the next
/// collected item would not fit into the flex container's inner main size"
fn collect_lines(
    items: Vec<FlexItem>,
    wrap: FlexWrap,
    available_main: Option<f32>,
    gap: f32,
) -> Vec<Vec<FlexItem>> {
    let Some(limit) = available_main.filter(|_| wrap != FlexWrap::Nowrap) else {
        return vec![items];
    };
    let mut lines: Vec<Vec<FlexItem>> = Vec::new();
    let mut current: Vec<FlexItem> = Vec::new();
    let mut used = 0.0;
    for item in items {
        let extra = if current.is_empty() { 0.0 } else { gap };
        if !current.is_empty() && used + extra + item.outer_hypothetical() > limit + EPSILON {
            lines.push(std::mem::take(&mut current));
            used = 0.0;
        }
        used += if current.is_empty() { 0.0 } else { gap } + item.outer_hypothetical();
        current.push(item);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    if wrap == FlexWrap::WrapReverse {
        lines.reverse();
    }
    lines
}

/// Lay out an item with its main size fixed to its target size.
///
/// [§ 9.4 Cross Size Determination](https://www.w3.org/TR/css-flexbox-1/#algo-cross-item)
/// "Determine the hypothetical cross size of each item by performing layout
/// with the used main size and the available space"
fn layout_item_main(
    child: &mut LayoutBox,
    ctx: &mut LayoutContext<'_>,
    item: &FlexItem,
    content: Rect,
    align: AlignItems,
    row: bool,
) {
    let saved = (child.style.width, child.style.height);
    if row {
        let chrome = child.dimensions.horizontal_chrome();
        child.style.width = fixed_size(child, item.target_size, chrome);
    } else {
        let chrome = child.dimensions.vertical_chrome();
        child.style.height = fixed_size(child, item.target_size, chrome);
        // Column items that do not stretch shrink to fit their content.
        if child.style.width.is_auto() && !stretches(child, align) {
            let (min, max) = child.content_intrinsic_widths(ctx);
            let width = min.max(content.width - child.dimensions.horizontal_chrome()).min(max);
            let chrome = child.dimensions.horizontal_chrome();
            child.style.width = fixed_size(child, width, chrome);
        }
    }
    let cb = Rect::new(content.x, content.y, content.width, f32::INFINITY);
    child.layout(ctx, cb, content.y, &mut FloatContext::new());
    (child.style.width, child.style.height) = saved;
}

/// Whether `stretch` alignment will size the item's cross axis.
fn stretches(child: &LayoutBox, align: AlignItems) -> bool {
    align == AlignItems::Stretch && !has_preferred_ratio(child)
}

/// [§ 9.4 step 11](https://www.w3.org/TR/css-flexbox-1/#algo-stretch)
///
/// "If a flex item has align-self: stretch, its computed cross size
/// property is auto, and neither of its cross-axis margins are auto, the
/// used outer cross size is the used cross size of its flex line, clamped
/// according to the item's used min and max cross sizes."
///
/// Items with a preferred aspect ratio keep the cross size that follows
/// from their main size.
fn stretch_item(
    child: &mut LayoutBox,
    ctx: &mut LayoutContext<'_>,
    align: AlignItems,
    line_cross: f32,
    content: Rect,
    row: bool,
) {
    if !stretches(child, align) {
        return;
    }
    let m = child.style.margin;
    let (cross_property, start, end) = if row {
        (child.style.height, m.top, m.bottom)
    } else {
        (child.style.width, m.left, m.right)
    };
    if !cross_property.is_auto() || start.is_auto() || end.is_auto() {
        return;
    }
    let margin_box = child.margin_box();
    let d = child.dimensions;
    let saved = (child.style.width, child.style.height);
    let cb = Rect::new(content.x, content.y, content.width, f32::INFINITY);
    if row {
        let target = line_cross - d.margin.top - d.margin.bottom - d.vertical_chrome();
        if (target - d.content.height).abs() < EPSILON {
            return;
        }
        child.style.width = fixed_size(child, d.content.width, d.horizontal_chrome());
        let target = child.clamp_content_height(target.max(0.0), None);
        child.style.height = fixed_size(child, target, d.vertical_chrome());
    } else {
        let target = line_cross - d.margin.left - d.margin.right - d.horizontal_chrome();
        if (target - d.content.width).abs() < EPSILON {
            return;
        }
        child.style.height = fixed_size(child, d.content.height, d.vertical_chrome());
        let target = child.clamp_content_width(target.max(0.0), content.width);
        child.style.width = fixed_size(child, target, d.horizontal_chrome());
    }
    child.layout(ctx, cb, margin_box.y + d.margin.top, &mut FloatContext::new());
    (child.style.width, child.style.height) = saved;
    let moved = child.margin_box();
    child.shift(margin_box.x - moved.x, margin_box.y - moved.y);
}

/// Distance from an item's top margin edge to its first baseline.
fn first_baseline(b: &LayoutBox) -> f32 {
    fn find(b: &LayoutBox) -> Option<f32> {
        b.lines.first().map(|l| l.baseline).or_else(|| {
            b.children
                .iter()
                .filter(|c| c.is_in_flow_block())
                .find_map(find)
        })
    }
    let top = b.margin_box().y;
    find(b).map_or(b.margin_box().height, |baseline| baseline - top)
}

/// [§ 8.3](https://www.w3.org/TR/css-flexbox-1/#baseline-participation)
/// The largest first-baseline offset among baseline-aligned items of a line.
fn line_baseline(container: &LayoutBox, line: &[FlexItem], row: bool, align_items: AlignItems) -> f32 {
    if !row {
        return 0.0;
    }
    line.iter()
        .map(|item| &container.children[item.index])
        .filter(|c| c.style.align_self.unwrap_or(align_items) == AlignItems::Baseline)
        .map(first_baseline)
        .fold(0.0, f32::max)
}

/// [§ 9.7 Resolving Flexible Lengths](https://www.w3.org/TR/css-flexbox-1/#resolve-flexible-lengths)
///
/// Full iterative freeze-loop algorithm.
fn resolve_flexible_lengths(items: &mut [FlexItem], available_main: f32) {
    if items.is_empty() {
        return;
    }

    // STEP 1: "Determine the used flex factor."
    //
    // "If the sum of the outer hypothetical main sizes of all items on the
    // line is less than the flex container's inner main size, use the flex
    // grow factor for the rest of this algorithm; otherwise, use the flex
    // shrink factor."
    let sum_outer_hypo: f32 = items.iter().map(FlexItem::outer_hypothetical).sum();
    let growing = sum_outer_hypo < available_main;

    // STEP 2: "Size inflexible items."
    //
    // "Freeze, setting its target main size to its hypothetical main size...
    //   - any item that has a flex factor of zero
    //   - if using the flex grow factor: any item that has a flex base size
    //     greater than its hypothetical main size
    //   - if using the flex shrink factor: any item that has a flex base size
    //     less than its hypothetical main size"
    for item in items.iter_mut() {
        let factor = if growing { item.grow } else { item.shrink };
        item.target_size = item.hypothetical_size;
        item.frozen = factor == 0.0
            || (growing && item.base_size > item.hypothetical_size)
            || (!growing && item.base_size < item.hypothetical_size);
    }

    // STEP 3: "Calculate initial free space."
    let free_space_now = |items: &[FlexItem]| {
        available_main
            - items
                .iter()
                .map(|item| {
                    if item.frozen {
                        item.outer_target()
                    } else {
                        item.base_size + item.outer_main
                    }
                })
                .sum::<f32>()
    };
    let initial_free_space = free_space_now(items);

    // STEP 4: Loop until all items are frozen.
    while !items.iter().all(|item| item.frozen) {
        // 4b. Calculate remaining free space.
        let remaining_free = free_space_now(items);

        // 4c. "If the sum of the unfrozen flex factors is less than one,
        //      multiply the initial free space by this sum."
        let unfrozen_factor_sum: f32 = items
            .iter()
            .filter(|item| !item.frozen)
            .map(|item| if growing { item.grow } else { item.shrink })
            .sum();
        let free_space = if unfrozen_factor_sum < 1.0 {
            let scaled = initial_free_space * unfrozen_factor_sum;
            if scaled.abs() < remaining_free.abs() {
                scaled
            } else {
                remaining_free
            }
        } else {
            remaining_free
        };

        // 4d. Distribute free space.
        if growing {
            // "Find the ratio of the item's flex grow factor to the sum of
            // the flex grow factors of all unfrozen items on the line."
            for item in items.iter_mut().filter(|item| !item.frozen) {
                let ratio = item.grow / unfrozen_factor_sum;
                item.target_size = free_space.mul_add(ratio, item.base_size);
            }
        } else {
            // "For every unfrozen item on the line, multiply its flex shrink
            // factor by its inner flex base size, and note this as its scaled
            // flex shrink factor."
            let scaled_shrink_sum: f32 = items
                .iter()
                .filter(|item| !item.frozen)
                .map(|item| item.shrink * item.base_size)
                .sum();
            for item in items.iter_mut().filter(|item| !item.frozen) {
                let ratio = if scaled_shrink_sum > 0.0 {
                    item.shrink * item.base_size / scaled_shrink_sum
                } else {
                    0.0
                };
                item.target_size = free_space.abs().mul_add(-ratio, item.base_size);
            }
        }

        // 4e. "Fix min/max violations. Clamp each non-frozen item's target
        // main size by its used min and max main sizes and floor its content
        //-box size at zero."
        let mut total_violation = 0.0_f32;
        let mut adjustments = Vec::with_capacity(items.len());
        for item in items.iter_mut().filter(|item| !item.frozen) {
            let clamped = item.target_size.clamp(item.min_main, item.max_main).max(0.0);
            let adjustment = clamped - item.target_size;
            total_violation += adjustment;
            item.target_size = clamped;
            adjustments.push((item.index, adjustment));
        }

        // 4f. "Freeze over-flexed items."
        //   Zero: freeze all items.
        //   Positive: freeze all the items with min violations.
        //   Negative: freeze all the items with max violations.
        for item in items.iter_mut().filter(|item| !item.frozen) {
            let adjustment = adjustments
                .iter()
                .find(|(index, _)| *index == item.index)
                .map_or(0.0, |(_, a)| *a);
            item.frozen = if total_violation.abs() < EPSILON {
                true
            } else if total_violation > 0.0 {
                adjustment > 0.0
            } else {
                adjustment < 0.0
            };
        }
    }
}

/// Compute justify-content alignment offsets.
///
/// [§ 8.2 Axis Alignment: the justify-content property](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
///
/// Returns `(initial_offset, gap_between_items)`.
fn compute_justify_offsets(keyword: JustifyContent, free_space: f32, item_count: usize) -> (f32, f32) {
    if item_count == 0 {
        return (0.0, 0.0);
    }
    #[allow(clippy::cast_precision_loss)]
    let count = item_count as f32;

    match keyword {
        // "Flex items are packed toward the end of the line."
        JustifyContent::FlexEnd => (free_space, 0.0),

        // "Flex items are packed toward the center of the line."
        JustifyContent::Center => (free_space / 2.0, 0.0),

        // "If the leftover free-space is negative or there is only a single
        // flex item on the line, this value is identical to flex-start."
        JustifyContent::SpaceBetween => {
            if item_count <= 1 || free_space <= 0.0 {
                (0.0, 0.0)
            } else {
                (0.0, free_space / (count - 1.0))
            }
        }

        // "Flex items are evenly distributed in the line, with half-size
        // spaces on either end."
        JustifyContent::SpaceAround => {
            if free_space <= 0.0 {
                (free_space / 2.0, 0.0)
            } else {
                let gap = free_space / count;
                (gap / 2.0, gap)
            }
        }

        // [§ 5.3 Distributed Alignment](https://www.w3.org/TR/css-align-3/#valdef-align-content-space-evenly)
        // "The alignment subjects are evenly distributed in the alignment
        // container, with a full-size space on either end."
        JustifyContent::SpaceEvenly => {
            if free_space <= 0.0 {
                (free_space / 2.0, 0.0)
            } else {
                let gap = free_space / (count + 1.0);
                (gap, gap)
            }
        }

        // "Flex items are packed toward the start of the line."
        JustifyContent::FlexStart => (0.0, 0.0),
    }
}

/// [§ 9.9.1 Flex Container Intrinsic Main Sizes](https://www.w3.org/TR/css-flexbox-1/#intrinsic-main-sizes)
///
/// `(min-content, max-content)` content widths of a flex container.
pub(crate) fn intrinsic_widths(container: &LayoutBox, ctx: &mut LayoutContext<'_>) -> (f32, f32) {
    let row = container.style.flex_direction.is_row();
    let gap = container.style.column_gap.resolve(0.0);
    let mut min: f32 = 0.0;
    let mut max: f32 = 0.0;
    let mut count = 0_usize;
    for child in container
        .children
        .iter()
        .filter(|c| !c.style.is_absolutely_positioned() && !c.is_collapsible_whitespace())
    {
        let (cmin, cmax) = child.outer_intrinsic_widths(ctx);
        if row {
            min = min.max(cmin);
            max += cmax;
        } else {
            min = min.max(cmin);
            max = max.max(cmax);
        }
        count += 1;
    }
    if row {
        #[allow(clippy::cast_precision_loss)]
        let gaps = gap * count.saturating_sub(1) as f32;
        max += gaps;
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(index: usize, base: f32, grow: f32, shrink: f32) -> FlexItem {
        FlexItem {
            index,
            base_size: base,
            hypothetical_size: base,
            min_main: 0.0,
            max_main: f32::INFINITY,
            grow,
            shrink,
            target_size: 0.0,
            frozen: false,
            outer_main: 0.0,
        }
    }

    #[test]
    fn test_grow_distributes_by_factor() {
        let mut items = [item(0, 100.0, 1.0, 1.0), item(1, 100.0, 3.0, 1.0)];
        resolve_flexible_lengths(&mut items, 600.0);
        assert_eq!(items[0].target_size, 200.0);
        assert_eq!(items[1].target_size, 400.0);
    }

    #[test]
    fn test_shrink_is_weighted_by_base_size() {
        let mut items = [item(0, 300.0, 0.0, 1.0), item(1, 100.0, 0.0, 1.0)];
        resolve_flexible_lengths(&mut items, 200.0);
        assert_eq!(items[0].target_size, 150.0);
        assert_eq!(items[1].target_size, 50.0);
    }

    #[test]
    fn test_max_violation_freezes_and_redistributes() {
        let mut first = item(0, 0.0, 1.0, 1.0);
        first.max_main = 50.0;
        let mut items = [first, item(1, 0.0, 1.0, 1.0)];
        resolve_flexible_lengths(&mut items, 300.0);
        assert_eq!(items[0].target_size, 50.0);
        assert_eq!(items[1].target_size, 250.0);
    }

    #[test]
    fn test_justify_offsets() {
        assert_eq!(
            compute_justify_offsets(JustifyContent::SpaceBetween, 100.0, 3),
            (0.0, 50.0)
        );
        assert_eq!(
            compute_justify_offsets(JustifyContent::SpaceEvenly, 100.0, 3),
            (25.0, 25.0)
        );
        assert_eq!(
            compute_justify_offsets(JustifyContent::Center, 100.0, 3),
            (50.0, 0.0)
        );
    }
}
