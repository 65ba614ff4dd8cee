//! Layout box types and the shared sizing algorithms.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)

use quire_common::DiagnosticId;
use quire_dom::NodeId;
use serde::Serialize;
use strum_macros::IntoStaticStr;

use super::box_model::{BoxDimensions, EPSILON, EdgeSizes, Rect};
use super::float::FloatContext;
use super::formatting_context::LayoutContext;
use super::inline::{LineBox, measure_inline_content};
use super::{flex, positioned, table};
use crate::style::{AutoLength, BoxSizing, ComputedStyle, OuterDisplayType};

/// Stable identity of a box within one box tree, assigned in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct BoxId(pub usize);

/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// What kind of box a [`LayoutBox`] is, which selects its formatting context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BoxKind {
    /// A block container generated by an element.
    Block,
    /// [§ 9.2.2](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    /// "An inline box is one that is both inline-level and whose contents
    /// participate in its containing inline formatting context."
    Inline,
    /// An atomic inline-level block container.
    InlineBlock,
    /// [§ 9.2 Flex Containers](https://www.w3.org/TR/css-flexbox-1/#flex-containers)
    FlexContainer,
    /// [§ 17.4 Tables in the visual formatting model](https://www.w3.org/TR/CSS2/tables.html#model)
    /// The table wrapper and table box, merged.
    TableWrapper,
    /// `display: table-row`, or an anonymous row.
    TableRow,
    /// `display: table-cell`, or an anonymous cell.
    TableCell,
    /// [§ 2.3 Generating Marker Boxes](https://www.w3.org/TR/css-display-3/#list-items)
    ListItem,
    /// The `::marker` box of a list item.
    Marker,
    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    Anonymous,
    /// [§ 9.2.2.1 Anonymous inline boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous)
    /// A run of text.
    Text(String),
    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    /// An image or other replaced element.
    Replaced,
}

/// A box in the box tree.
///
/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// Geometry is in continuous coordinates: one strip of page width, before
/// fragmentation splits it into pages.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutBox {
    /// Document-order identity.
    pub id: BoxId,
    /// Box type.
    pub kind: BoxKind,
    /// Generating DOM node. Pseudo-element, marker and anonymous boxes carry
    /// the node of their originating element, or none.
    pub node: Option<NodeId>,
    /// Tag name of the generating element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// `id` attribute of the generating element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    /// Computed style.
    #[serde(skip)]
    pub style: ComputedStyle,
    /// Used geometry.
    pub dimensions: BoxDimensions,
    /// The containing block used for the last layout.
    #[serde(skip)]
    pub containing_block: Rect,
    /// Whether the box establishes a new block formatting context.
    pub formatting_root: bool,
    /// Whether the box is a flex item.
    #[serde(skip)]
    pub flex_item: bool,
    /// Child boxes in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutBox>,
    /// Line boxes, for block containers with inline content.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<LineBox>,
    /// Natural `(width, height)` of a replaced element, from its attributes.
    #[serde(skip)]
    pub intrinsic_size: Option<(f32, f32)>,
    /// `colspan` of a table cell.
    #[serde(skip)]
    pub colspan: usize,
    /// [§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
    /// Static position of an absolutely positioned box, recorded by the flow
    /// its placeholder sits in.
    #[serde(skip)]
    pub static_position: Option<(f32, f32)>,
    /// A `<br>`: ends the current line.
    #[serde(skip)]
    pub forced_line_break: bool,
    /// `(dx, dy)` applied by `position: relative` after flow layout.
    #[serde(skip)]
    pub relative_offset: (f32, f32),
}

impl LayoutBox {
    /// A box with default geometry and no children.
    #[must_use]
    pub fn new(kind: BoxKind, style: ComputedStyle) -> Self {
        Self {
            id: BoxId::default(),
            kind,
            node: None,
            tag: None,
            element_id: None,
            style,
            dimensions: BoxDimensions::default(),
            containing_block: Rect::default(),
            formatting_root: false,
            flex_item: false,
            children: Vec::new(),
            lines: Vec::new(),
            intrinsic_size: None,
            colspan: 1,
            static_position: None,
            forced_line_break: false,
            relative_offset: (0.0, 0.0),
        }
    }

    /// Text of a text box.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            BoxKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Out of flow: floated or absolutely positioned.
    #[must_use]
    pub fn is_out_of_flow(&self) -> bool {
        self.style.is_floated() || self.style.is_absolutely_positioned()
    }

    /// [§ 9.2.2 Inline-level elements](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    #[must_use]
    pub fn is_inline_level(&self) -> bool {
        match self.kind {
            BoxKind::Inline | BoxKind::Text(_) | BoxKind::Marker | BoxKind::InlineBlock => true,
            BoxKind::Replaced | BoxKind::FlexContainer | BoxKind::TableWrapper => {
                self.style.display.outer == OuterDisplayType::Inline && !self.flex_item
            }
            _ => false,
        }
    }

    /// Inline-level boxes laid out as one unbreakable unit.
    #[must_use]
    pub fn is_atomic_inline(&self) -> bool {
        self.is_inline_level()
            && matches!(
                self.kind,
                BoxKind::InlineBlock
                    | BoxKind::Replaced
                    | BoxKind::FlexContainer
                    | BoxKind::TableWrapper
            )
    }

    /// In-flow block-level box.
    #[must_use]
    pub fn is_in_flow_block(&self) -> bool {
        !self.is_out_of_flow() && !self.is_inline_level()
    }

    /// Whether the box contains inline-level in-flow children, so it lays
    /// out line boxes. Anonymous box generation guarantees a block
    /// container holds either only block-level or only inline-level
    /// in-flow children.
    #[must_use]
    pub fn has_inline_content(&self) -> bool {
        self.children
            .iter()
            .any(|c| !c.is_out_of_flow() && c.is_inline_level())
    }

    /// A text box holding nothing but white space that collapses away.
    #[must_use]
    pub fn is_collapsible_whitespace(&self) -> bool {
        self.text().is_some_and(|t| {
            t.chars().all(char::is_whitespace)
                && self.style.white_space.collapses_spaces()
                && !self.style.white_space.preserves_newlines()
        })
    }

    /// Border box in continuous coordinates.
    #[must_use]
    pub fn border_box(&self) -> Rect {
        self.dimensions.border_box()
    }

    /// Margin box in continuous coordinates.
    #[must_use]
    pub fn margin_box(&self) -> Rect {
        self.dimensions.margin_box()
    }

    /// Descendant reached by a path of child indices.
    #[must_use]
    pub fn descendant(&self, path: &[usize]) -> Option<&Self> {
        path.iter().try_fold(self, |b, &i| b.children.get(i))
    }

    /// Mutable descendant reached by a path of child indices.
    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Self> {
        let mut current = self;
        for &i in path {
            current = current.children.get_mut(i)?;
        }
        Some(current)
    }

    /// Visit this box and all descendants in pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Self)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// First box in pre-order matching `pred`.
    #[must_use]
    pub fn find(&self, pred: impl Fn(&Self) -> bool) -> Option<&Self> {
        let mut found = None;
        self.walk(&mut |b| {
            if found.is_none() && pred(b) {
                found = Some(b);
            }
        });
        found
    }

    /// The box generated by the element with `id` attribute `id`.
    #[must_use]
    pub fn find_by_element_id(&self, id: &str) -> Option<&Self> {
        self.find(|b| b.element_id.as_deref() == Some(id) && !matches!(b.kind, BoxKind::Marker))
    }

    /// Number this box and its descendants in pre-order, starting at `next`.
    pub fn assign_ids(&mut self, next: &mut usize) {
        self.id = BoxId(*next);
        *next += 1;
        for child in &mut self.children {
            child.assign_ids(next);
        }
    }

    /// Move this box, its line boxes and all descendants by `(dx, dy)`.
    pub fn shift(&mut self, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.dimensions.translate(dx, dy);
        if let Some((x, y)) = self.static_position.as_mut() {
            *x += dx;
            *y += dy;
        }
        for line in &mut self.lines {
            line.shift(dx, dy);
        }
        for child in &mut self.children {
            child.shift(dx, dy);
        }
    }

    /// Lay out this box in `cb` with its border-box top at `y`.
    ///
    /// `floats` is the float context of the enclosing block formatting
    /// context; boxes that establish their own use a fresh one.
    pub fn layout(
        &mut self,
        ctx: &mut LayoutContext<'_>,
        cb: Rect,
        y: f32,
        floats: &mut FloatContext,
    ) {
        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[LAYOUT] {:?} <{}> cb=({:.1},{:.1} {:.1}x{:.1}) y={y:.1}",
            self.id,
            self.tag.as_deref().unwrap_or("-"),
            cb.x,
            cb.y,
            cb.width,
            cb.height
        );
        self.containing_block = cb;
        match self.kind {
            BoxKind::Replaced => self.layout_replaced(cb, y),
            BoxKind::FlexContainer => flex::layout_flex(self, ctx, cb, y),
            BoxKind::TableWrapper => table::layout_table(self, ctx, cb, y),
            _ => self.layout_block(ctx, cb, y, floats),
        }
        // [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
        // "If the element has 'position: relative'... the containing block is
        // formed by the padding edge of the ancestor."
        if self.style.position == crate::style::PositionType::Relative {
            let padding_box = self.dimensions.padding_box();
            self.layout_positioned_descendants(ctx, padding_box);
            positioned::apply_relative_offset(self, cb);
        }
    }

    /// Lay out absolutely positioned descendants whose containing block is
    /// `abs_cb`: direct children and those inside non-positioned
    /// descendants.
    pub fn layout_positioned_descendants(&mut self, ctx: &mut LayoutContext<'_>, abs_cb: Rect) {
        for child in &mut self.children {
            if child.style.is_absolutely_positioned() {
                let cb = if child.style.position == crate::style::PositionType::Fixed {
                    ctx.page_area
                } else {
                    abs_cb
                };
                positioned::layout_absolute(child, ctx, cb);
            } else if !child.style.position.is_positioned() {
                child.layout_positioned_descendants(ctx, abs_cb);
            }
        }
    }

    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    /// "The percentage is calculated with respect to the width of the
    /// generated box's containing block."
    pub(crate) fn resolve_padding_and_border(&mut self, cb_width: f32) {
        let p = &self.style.padding;
        self.dimensions.padding = EdgeSizes {
            top: p.top.resolve(cb_width),
            right: p.right.resolve(cb_width),
            bottom: p.bottom.resolve(cb_width),
            left: p.left.resolve(cb_width),
        };
        let [top, right, bottom, left] = self.style.border_width;
        self.dimensions.border = EdgeSizes {
            top,
            right,
            bottom,
            left,
        };
    }

    /// Used vertical margins, `auto` as zero.
    pub(crate) fn resolve_vertical_margins(&mut self, cb_width: f32) {
        let m = &self.style.margin;
        self.dimensions.margin.top = m.top.resolve_definite(Some(cb_width)).unwrap_or(0.0);
        self.dimensions.margin.bottom = m.bottom.resolve_definite(Some(cb_width)).unwrap_or(0.0);
    }

    /// Content width from a specified width, honouring `box-sizing`.
    pub(crate) fn content_width_from(&self, specified: f32) -> f32 {
        match self.style.box_sizing {
            BoxSizing::ContentBox => specified,
            BoxSizing::BorderBox => (specified - self.dimensions.horizontal_chrome()).max(0.0),
        }
    }

    /// Content height from a specified height, honouring `box-sizing`.
    pub(crate) fn content_height_from(&self, specified: f32) -> f32 {
        match self.style.box_sizing {
            BoxSizing::ContentBox => specified,
            BoxSizing::BorderBox => (specified - self.dimensions.vertical_chrome()).max(0.0),
        }
    }

    /// Specified width as a content width, `None` for `auto`.
    pub(crate) fn specified_content_width(&self, cb_width: f32) -> Option<f32> {
        self.style
            .width
            .resolve_definite(Some(cb_width))
            .map(|w| self.content_width_from(w))
    }

    /// Specified height as a content height, `None` for `auto` or a
    /// percentage of an indefinite height.
    pub(crate) fn specified_content_height(&self, cb_height: Option<f32>) -> Option<f32> {
        self.style
            .height
            .resolve_definite(cb_height)
            .map(|h| self.content_height_from(h))
    }

    /// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    ///
    /// "1. The tentative used width is calculated (without 'min-width' and
    /// 'max-width')...
    /// 2. If the tentative used width is greater than 'max-width', the rules
    /// above are applied again, but this time using the computed value of
    /// 'max-width' as the computed value for 'width'.
    /// 3. If the resulting width is smaller than 'min-width', the rules above
    /// are applied again, but this time using the value of 'min-width' as the
    /// computed value for 'width'."
    pub(crate) fn clamp_content_width(&self, width: f32, cb_width: f32) -> f32 {
        let max = self
            .style
            .max_width
            .map_or(f32::INFINITY, |m| self.content_width_from(m.resolve(cb_width)));
        let min = self.content_width_from(self.style.min_width.resolve(cb_width));
        width.min(max).max(min)
    }

    /// [§ 10.7 Minimum and maximum heights](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
    pub(crate) fn clamp_content_height(&self, height: f32, cb_height: Option<f32>) -> f32 {
        let max = self
            .style
            .max_height
            .and_then(|m| m.resolve_definite(cb_height))
            .map_or(f32::INFINITY, |m| self.content_height_from(m));
        let min = self
            .style
            .min_height
            .resolve_definite(cb_height)
            .map_or(0.0, |m| self.content_height_from(m));
        height.min(max).max(min)
    }

    /// Whether auto widths shrink to fit instead of filling the line.
    ///
    /// [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width),
    /// [§ 10.3.9](https://www.w3.org/TR/CSS2/visudet.html#inlineblock-width):
    /// floats and inline-blocks use the shrink-to-fit width.
    fn shrinks_to_fit(&self) -> bool {
        self.style.is_floated()
            || self.style.is_absolutely_positioned()
            || self.is_atomic_inline()
    }

    /// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    ///
    /// "'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
    /// 'padding-right' + 'border-right-width' + 'margin-right' = width of
    /// containing block"
    ///
    /// Sets padding, border, horizontal margins and content width.
    pub(crate) fn compute_width(&mut self, ctx: &mut LayoutContext<'_>, cb_width: f32) {
        // STEP 1: Resolve padding and border.
        self.resolve_padding_and_border(cb_width);
        let chrome = self.dimensions.horizontal_chrome();
        let margin_left = self.style.margin.left.resolve_definite(Some(cb_width));
        let margin_right = self.style.margin.right.resolve_definite(Some(cb_width));

        // STEP 2: Tentative width.
        let specified = self.specified_content_width(cb_width);
        let shrink = self.shrinks_to_fit();
        let width = match specified {
            Some(w) => w,
            None if shrink => {
                // [§ 10.3.5] "the shrink-to-fit width is:
                // min(max(preferred minimum width, available width), preferred width)"
                let available = cb_width
                    - margin_left.unwrap_or(0.0)
                    - margin_right.unwrap_or(0.0)
                    - chrome;
                let (min, max) = self.content_intrinsic_widths(ctx);
                min.max(available).min(max)
            }
            None => {
                cb_width - margin_left.unwrap_or(0.0) - margin_right.unwrap_or(0.0) - chrome
            }
        };
        // STEP 3: Min/max clamps.
        let width = self.clamp_content_width(width.max(0.0), cb_width);

        // STEP 4: Solve the margins.
        // "If both 'margin-left' and 'margin-right' are 'auto', their used
        // values are equal. This horizontally centers the element"
        let (ml, mr) = if shrink || self.is_inline_level() {
            (margin_left.unwrap_or(0.0), margin_right.unwrap_or(0.0))
        } else {
            let remaining = cb_width - width - chrome;
            match (margin_left, margin_right) {
                (None, None) => {
                    let half = (remaining / 2.0).max(0.0);
                    (half, half)
                }
                (None, Some(r)) => ((remaining - r).max(0.0), r),
                // Over-constrained: 'margin-right' is ignored in ltr.
                (Some(l), _) => (l, remaining - l),
            }
        };
        self.dimensions.margin.left = ml;
        self.dimensions.margin.right = mr;
        self.dimensions.content.width = width;
    }

    /// [§ 10.6.3 Block-level non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
    ///
    /// Sets the content height from the specified height, an aspect ratio,
    /// or the height of the content, then applies min/max.
    pub(crate) fn finish_height(
        &mut self,
        ctx: &mut LayoutContext<'_>,
        content_height: f32,
        cb_height: Option<f32>,
    ) {
        let specified = self.specified_content_height(cb_height).or_else(|| {
            // [§ 5.1 aspect-ratio](https://www.w3.org/TR/css-sizing-4/#aspect-ratio)
            self.style
                .aspect_ratio
                .map(|ratio| self.dimensions.content.width / ratio)
        });
        let height = self.clamp_content_height(specified.unwrap_or(content_height), cb_height);
        if specified.is_some() && content_height > height + EPSILON && self.style.overflow.is_visible() {
            ctx.warn(
                DiagnosticId::ContentOverflow,
                format!(
                    "{} content is {content_height:.1}px tall but its height is {height:.1}px",
                    self.describe()
                ),
            );
        }
        self.dimensions.content.height = height;
    }

    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// Replaced elements size from their specified size, their natural size
    /// or their ratio, falling back to 300x150.
    fn layout_replaced(&mut self, cb: Rect, y: f32) {
        self.resolve_padding_and_border(cb.width);
        self.resolve_vertical_margins(cb.width);
        self.dimensions.margin.left = self
            .style
            .margin
            .left
            .resolve_definite(Some(cb.width))
            .unwrap_or(0.0);
        self.dimensions.margin.right = self
            .style
            .margin
            .right
            .resolve_definite(Some(cb.width))
            .unwrap_or(0.0);
        let (width, height) = self.replaced_size(cb.width, cb.height);
        self.dimensions.content = Rect::new(
            cb.x + self.dimensions.margin.left
                + self.dimensions.border.left
                + self.dimensions.padding.left,
            y + self.dimensions.border.top + self.dimensions.padding.top,
            width,
            height,
        );
    }

    /// Used content size of a replaced box.
    ///
    /// "if 'height' and 'width' both have computed values of 'auto' and the
    /// element also has an intrinsic width, then that intrinsic width is the
    /// used value of 'width'... Otherwise, if 'width' has a computed value of
    /// 'auto', and the element has an intrinsic ratio then the used value of
    /// 'width' is: (used height) * (intrinsic ratio)"
    pub(crate) fn replaced_size(&self, cb_width: f32, cb_height: f32) -> (f32, f32) {
        let cb_height = cb_height.is_finite().then_some(cb_height);
        let ratio = self.style.aspect_ratio.or_else(|| {
            self.intrinsic_size
                .filter(|(_, h)| *h > 0.0)
                .map(|(w, h)| w / h)
        });
        let width = self.specified_content_width(cb_width);
        let height = self.specified_content_height(cb_height);
        let (w, h) = match (width, height, ratio) {
            (Some(w), Some(h), _) => (w, h),
            (Some(w), None, Some(r)) => (w, w / r),
            (None, Some(h), Some(r)) => (h * r, h),
            (Some(w), None, None) => (w, self.intrinsic_size.map_or(150.0, |(_, h)| h)),
            (None, Some(h), None) => (self.intrinsic_size.map_or(300.0, |(w, _)| w), h),
            (None, None, _) => match self.intrinsic_size {
                Some(size) => size,
                None => ratio.map_or((300.0, 150.0), |r| (300.0, 300.0 / r)),
            },
        };
        (
            self.clamp_content_width(w, cb_width),
            self.clamp_content_height(h, cb_height),
        )
    }

    /// [§ 5.1 Intrinsic Sizes](https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes)
    ///
    /// `(min-content, max-content)` widths of the content box.
    pub(crate) fn content_intrinsic_widths(&self, ctx: &mut LayoutContext<'_>) -> (f32, f32) {
        match self.kind {
            BoxKind::Replaced => {
                let (w, _) = self.replaced_size(0.0, f32::INFINITY);
                (w, w)
            }
            BoxKind::TableWrapper => table::intrinsic_widths(self, ctx),
            BoxKind::FlexContainer => flex::intrinsic_widths(self, ctx),
            _ if self.has_inline_content() => measure_inline_content(self, ctx),
            _ => self
                .children
                .iter()
                .filter(|c| !c.style.is_absolutely_positioned())
                .map(|c| c.outer_intrinsic_widths(ctx))
                .fold((0.0_f32, 0.0_f32), |(min, max), (cmin, cmax)| {
                    (min.max(cmin), max.max(cmax))
                }),
        }
    }

    /// Intrinsic widths of the margin box: a definite width replaces the
    /// content contribution; percentages count as zero.
    pub(crate) fn outer_intrinsic_widths(&self, ctx: &mut LayoutContext<'_>) -> (f32, f32) {
        let px = |l: AutoLength| match l {
            AutoLength::Length(crate::style::LengthValue::Px(v)) => v,
            _ => 0.0,
        };
        let padding = self.style.padding.left.resolve(0.0) + self.style.padding.right.resolve(0.0);
        let border = self.style.border_width[1] + self.style.border_width[3];
        let margin = px(self.style.margin.left) + px(self.style.margin.right);
        let chrome = padding + border;
        let (min, max) = match self.style.width {
            AutoLength::Length(crate::style::LengthValue::Px(w)) => {
                let content = match self.style.box_sizing {
                    BoxSizing::ContentBox => w,
                    BoxSizing::BorderBox => (w - chrome).max(0.0),
                };
                (content, content)
            }
            _ => self.content_intrinsic_widths(ctx),
        };
        let min_w = match self.style.min_width {
            crate::style::LengthValue::Px(v) => v,
            crate::style::LengthValue::Percent(_) => 0.0,
        };
        let (min, max) = (min.max(min_w), max.max(min_w));
        (min + chrome + margin, max + chrome + margin)
    }

    /// Human-readable name for diagnostics: `<p id="x">` or the box kind.
    #[must_use]
    pub fn describe(&self) -> String {
        match (&self.tag, &self.element_id) {
            (Some(tag), Some(id)) => format!("<{tag} id=\"{id}\">"),
            (Some(tag), None) => format!("<{tag}>"),
            _ => {
                let kind: &'static str = (&self.kind).into();
                format!("anonymous {kind} box")
            }
        }
    }
}
