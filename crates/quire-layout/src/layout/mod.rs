//! CSS Layout Engine
//!
//! This module implements the CSS Visual Formatting Model on one continuous
//! strip as wide as the page content area. [`crate::paginate`] splits the
//! result into pages afterwards.
//!
//! # Relevant Specifications
//!
//! - [CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html)
//! - [CSS 2.1 Visual formatting model details](https://www.w3.org/TR/CSS2/visudet.html)
//! - [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//! - [CSS Flexible Box Layout Module Level 1](https://www.w3.org/TR/css-flexbox-1/)
//! - [CSS Text Module Level 3](https://www.w3.org/TR/css-text-3/)
//!
//! # Module Structure
//!
//! - [`box_model`] - Box dimensions, rectangles, and edge sizes
//! - [`layout_box`] - Layout box types, width/height resolution, intrinsic sizes
//! - [`formatting_context`] - Shared pass state, BFC roots, margin collapsing
//! - [`block`] - Block formatting context
//! - [`inline`] - Inline formatting context with line box model
//! - [`float`] - Float placement and clearance
//! - [`flex`] - Flex layout algorithm
//! - [`table`] - Table layout algorithm
//! - [`positioned`] - Relative, absolute and fixed positioning

pub mod block;
pub mod box_model;
pub mod flex;
pub mod float;
pub mod formatting_context;
pub mod inline;
pub mod layout_box;
pub mod positioned;
pub mod table;

// Re-exports for convenience
pub use box_model::{BoxDimensions, EPSILON, EdgeSizes, Rect};
pub use float::{FloatContext, Lane, PlacedFloat};
pub use formatting_context::{CollapsedMargin, LayoutContext, establishes_bfc};
pub use inline::{FragmentContent, LineBox, LineFragment};
pub use layout_box::{BoxId, BoxKind, LayoutBox};

/// Lay out a whole box tree on a strip `width` pixels wide.
///
/// The root's margin box starts at the origin. Absolutely positioned boxes
/// without a positioned ancestor use the initial containing block: the first
/// page's content area.
pub fn layout_document(root: &mut LayoutBox, ctx: &mut LayoutContext<'_>, width: f32) {
    let initial = Rect::new(0.0, 0.0, width, f32::INFINITY);
    let margin_top = root
        .style
        .margin
        .top
        .resolve_definite(Some(width))
        .unwrap_or(0.0);
    let mut floats = FloatContext::new();
    root.layout(ctx, initial, margin_top, &mut floats);
    // A positioned root already laid out its absolutely positioned
    // descendants against its own padding box.
    if !root.style.position.is_positioned() {
        let icb = Rect::new(0.0, 0.0, width, ctx.page_area.height);
        root.layout_positioned_descendants(ctx, icb);
    }
}
