//! CSS Formatting Contexts.
//!
//! [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow)
//!
//! Shared state for one layout pass ([`LayoutContext`]), the predicate that
//! decides which boxes establish a new block formatting context, and the
//! margin collapsing rules of [§ 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins).

use quire_common::{DiagnosticId, Diagnostics};
use std::collections::BTreeSet;

use super::box_model::Rect;
use super::layout_box::{BoxKind, LayoutBox};
use crate::fonts::{FallbackStrategy, FontProvider, TextRun};
use crate::style::{ClearSide, ComputedStyle, InnerDisplayType, Overflow};

/// State shared by every formatting context during one layout pass.
pub struct LayoutContext<'a> {
    /// Faces available for text.
    pub fonts: &'a FontProvider,
    /// How characters missing from the first font are matched.
    pub fallback: FallbackStrategy,
    /// Where layout diagnostics go.
    pub diagnostics: &'a mut Diagnostics,
    /// The page content area; the containing block of fixed boxes.
    pub page_area: Rect,
    /// Characters already reported as missing in this pass.
    missing: BTreeSet<char>,
    /// Nesting depth of measuring layouts whose results are thrown away.
    measuring: usize,
}

impl<'a> LayoutContext<'a> {
    /// A fresh context for one pass.
    pub fn new(
        fonts: &'a FontProvider,
        fallback: FallbackStrategy,
        diagnostics: &'a mut Diagnostics,
        page_area: Rect,
    ) -> Self {
        Self {
            fonts,
            fallback,
            diagnostics,
            page_area,
            missing: BTreeSet::new(),
            measuring: 0,
        }
    }

    /// Report a layout warning, unless this is a measuring layout.
    pub fn warn(&mut self, id: DiagnosticId, message: impl Into<String>) {
        if self.measuring == 0 {
            self.diagnostics.warn(id, message);
        }
    }

    /// Run `f` as a measuring layout: its warnings are dropped because the
    /// box is laid out again for real afterwards.
    pub fn measuring<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.measuring += 1;
        let out = f(self);
        self.measuring -= 1;
        out
    }

    /// [§ 5 Font Matching](https://www.w3.org/TR/css-fonts-4/#font-matching-algorithm)
    ///
    /// Split `text` into runs of one face each, using the fallback strategy
    /// for characters the preferred faces do not cover. White space stays in
    /// the face of the text before it.
    pub fn shape(&mut self, text: &str, style: &ComputedStyle) -> Vec<TextRun> {
        let candidates = self
            .fonts
            .candidates(&style.font_family, style.font_weight, style.italic);
        let primary = candidates.first().copied().unwrap_or(0);
        let mut runs: Vec<TextRun> = Vec::new();
        for ch in text.chars() {
            let face = if ch.is_whitespace() {
                runs.last().map_or(primary, |r| r.face)
            } else if let Some(face) = self.fonts.select(&candidates, ch, self.fallback) {
                face
            } else {
                if self.missing.insert(ch) {
                    self.diagnostics.warn(
                        DiagnosticId::MissingGlyph,
                        format!("no font covers U+{:04X} '{ch}'", u32::from(ch)),
                    );
                }
                primary
            };
            let advance = self
                .fonts
                .face(face)
                .map_or(0.0, |f| f.advance(ch, style.font_size));
            match runs.last_mut() {
                Some(run) if run.face == face => {
                    run.text.push(ch);
                    run.width += advance;
                }
                _ => runs.push(TextRun {
                    text: ch.to_string(),
                    face,
                    width: advance,
                }),
            }
        }
        runs
    }

    /// Advance width of `text` in `style`.
    pub fn measure(&mut self, text: &str, style: &ComputedStyle) -> f32 {
        self.shape(text, style).iter().map(|r| r.width).sum()
    }

    /// Name of face `index`.
    #[must_use]
    pub fn face_name(&self, index: usize) -> String {
        self.fonts
            .face(index)
            .map(|f| f.name.clone())
            .unwrap_or_default()
    }

    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// `(ascent, descent)` of an inline box above and below its baseline,
    /// including half-leading: "L = 'line-height' - AD ... A' = A + L/2,
    /// D' = D + L/2".
    #[must_use]
    pub fn line_metrics(&self, face: usize, style: &ComputedStyle) -> (f32, f32) {
        let size = style.font_size;
        let Some(f) = self.fonts.face(face) else {
            let lh = style.line_height.resolve(size, 1.2);
            return (lh * 0.8, lh * 0.2);
        };
        let (a, d) = (f.ascent(size), f.descent(size));
        let lh = style.line_height.resolve(size, f.line_height_ratio);
        let half_leading = (lh - (a + d)) / 2.0;
        (a + half_leading, d + half_leading)
    }

    /// Metrics of the element's strut: "a zero-width inline box with the
    /// element's font and line height properties".
    #[must_use]
    pub fn strut(&self, style: &ComputedStyle) -> (f32, f32) {
        let face = self
            .fonts
            .primary(&style.font_family, style.font_weight, style.italic);
        self.line_metrics(face, style)
    }
}

/// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
///
/// "Floats, absolutely positioned elements, block containers (such as
/// inline-blocks, table-cells, and table-captions) that are not block boxes,
/// and block boxes with 'overflow' other than 'visible' (except when that
/// value has been propagated to the viewport) establish new block formatting
/// contexts for their contents."
///
/// Flex items, `flow-root` boxes and the root element do too.
#[must_use]
pub fn establishes_bfc(style: &ComputedStyle, kind: &BoxKind, flex_item: bool, root: bool) -> bool {
    root || flex_item
        || style.is_floated()
        || style.is_absolutely_positioned()
        || style.overflow != Overflow::Visible
        || style.display.inner == InnerDisplayType::FlowRoot
        || matches!(
            kind,
            BoxKind::InlineBlock
                | BoxKind::TableCell
                | BoxKind::TableWrapper
                | BoxKind::FlexContainer
                | BoxKind::Replaced
        )
}

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// "When two or more margins collapse, the resulting margin width is the
/// maximum of the collapsing margins' widths. In the case of negative
/// margins, the maximum of the absolute values of the negative adjoining
/// margins is deducted from the maximum of the positive adjoining margins."
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollapsedMargin {
    positive: f32,
    negative: f32,
}

impl CollapsedMargin {
    /// A single margin.
    #[must_use]
    pub fn new(margin: f32) -> Self {
        Self::default().adjoin_px(margin)
    }

    /// Collapse with one more margin.
    #[must_use]
    pub fn adjoin_px(self, margin: f32) -> Self {
        Self {
            positive: self.positive.max(margin),
            negative: self.negative.min(margin),
        }
    }

    /// Collapse with another set of adjoining margins.
    #[must_use]
    pub fn adjoin(self, other: Self) -> Self {
        Self {
            positive: self.positive.max(other.positive),
            negative: self.negative.min(other.negative),
        }
    }

    /// The used width of the collapsed margin.
    #[must_use]
    pub fn resolve(self) -> f32 {
        self.positive + self.negative
    }
}

/// Margins of a box on the block axis, `auto` as zero.
fn vertical_margins(b: &LayoutBox, cb_width: f32) -> (f32, f32) {
    let m = &b.style.margin;
    (
        m.top.resolve_definite(Some(cb_width)).unwrap_or(0.0),
        m.bottom.resolve_definite(Some(cb_width)).unwrap_or(0.0),
    )
}

/// Block containers whose margins can collapse with their children.
fn is_collapsible_container(b: &LayoutBox) -> bool {
    !b.formatting_root
        && matches!(b.kind, BoxKind::Block | BoxKind::ListItem | BoxKind::Anonymous)
        && !b.has_inline_content()
}

/// "The top margin of an in-flow block element collapses with its first
/// in-flow block-level child's top margin if the element has no top border,
/// no top padding, and the child has no clearance."
#[must_use]
pub fn collapses_through_top(b: &LayoutBox, cb_width: f32) -> bool {
    is_collapsible_container(b)
        && b.style.border_width[0] == 0.0
        && b.style.padding.top.resolve(cb_width) == 0.0
}

/// "The bottom margin of an in-flow block box with a 'height' of 'auto' and
/// a 'min-height' of zero collapses with its last in-flow block-level child's
/// bottom margin if the box has no bottom padding and no bottom border"
#[must_use]
pub fn collapses_through_bottom(b: &LayoutBox, cb_width: f32) -> bool {
    is_collapsible_container(b)
        && b.style.height.is_auto()
        && b.style.min_height.resolve(0.0) == 0.0
        && b.style.border_width[2] == 0.0
        && b.style.padding.bottom.resolve(cb_width) == 0.0
}

/// "top and bottom margins of a box that does not establish a new block
/// formatting context and that has zero computed 'min-height', zero or 'auto'
/// computed 'height', and no in-flow children" collapse through it.
#[must_use]
pub fn is_empty_collapsible(b: &LayoutBox, cb_width: f32) -> bool {
    if b.formatting_root
        || !matches!(b.kind, BoxKind::Block | BoxKind::ListItem | BoxKind::Anonymous)
    {
        return false;
    }
    let zero_height = match b.style.height.resolve_definite(None) {
        None => b.style.height.is_auto(),
        Some(h) => h == 0.0,
    };
    zero_height
        && b.style.min_height.resolve(0.0) == 0.0
        && b.style.border_width[0] == 0.0
        && b.style.border_width[2] == 0.0
        && b.style.padding.top.resolve(cb_width) == 0.0
        && b.style.padding.bottom.resolve(cb_width) == 0.0
        && b.children.iter().all(|c| {
            c.is_out_of_flow()
                || c.is_collapsible_whitespace()
                || (!c.is_inline_level() && is_empty_collapsible(c, cb_width))
        })
}

/// The collapsed top margin of `b`, including the margins of first children
/// that collapse through its top edge.
#[must_use]
pub fn collapsed_margin_top(b: &LayoutBox, cb_width: f32) -> CollapsedMargin {
    let (top, _) = vertical_margins(b, cb_width);
    let mut margin = CollapsedMargin::new(top);
    if !collapses_through_top(b, cb_width) {
        return margin;
    }
    for child in b.children.iter().filter(|c| c.is_in_flow_block()) {
        if child.style.clear != ClearSide::None {
            break;
        }
        margin = margin.adjoin(collapsed_margin_top(child, cb_width));
        if is_empty_collapsible(child, cb_width) {
            margin = margin.adjoin(collapsed_margin_bottom(child, cb_width));
        } else {
            break;
        }
    }
    margin
}

/// The collapsed bottom margin of `b`, including the margins of last
/// children that collapse through its bottom edge.
#[must_use]
pub fn collapsed_margin_bottom(b: &LayoutBox, cb_width: f32) -> CollapsedMargin {
    let (_, bottom) = vertical_margins(b, cb_width);
    let mut margin = CollapsedMargin::new(bottom);
    if !collapses_through_bottom(b, cb_width) {
        return margin;
    }
    for child in b.children.iter().rev().filter(|c| c.is_in_flow_block()) {
        margin = margin.adjoin(collapsed_margin_bottom(child, cb_width));
        if is_empty_collapsible(child, cb_width) {
            margin = margin.adjoin(collapsed_margin_top(child, cb_width));
        } else {
            break;
        }
    }
    margin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed_margin_arithmetic() {
        assert_eq!(CollapsedMargin::new(20.0).adjoin_px(10.0).resolve(), 20.0);
        assert_eq!(CollapsedMargin::new(20.0).adjoin_px(-5.0).resolve(), 15.0);
        assert_eq!(CollapsedMargin::new(-20.0).adjoin_px(-5.0).resolve(), -20.0);
        assert_eq!(CollapsedMargin::default().resolve(), 0.0);
    }
}
