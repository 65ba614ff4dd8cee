//! Layout tests for the continuous strip: margins, floats and flex.

use quickcheck_macros::quickcheck;
use quire_dom::{StyledDocumentSpec, StyledNodeSpec as N};
use quire_layout::{ConversionConfig, LayoutBox, PagedDocument, convert};

/// Helper to run a conversion with the default configuration.
fn layout(root: N) -> PagedDocument {
    let tree = StyledDocumentSpec::new(root).into_styled_tree().unwrap();
    convert(&tree, &ConversionConfig::default()).unwrap()
}

/// Helper to find an element's box by its `id` attribute.
fn by_id<'a>(paged: &'a PagedDocument, id: &str) -> &'a LayoutBox {
    paged
        .box_tree
        .find_by_element_id(id)
        .unwrap_or_else(|| panic!("no box for #{id}"))
}

/// A 20px tall block with the given vertical margins.
fn sized_block(id: &str, margin_top: i32, margin_bottom: i32) -> N {
    N::element("div")
        .attr("id", id)
        .style("height", "20px")
        .style("margin-top", &format!("{margin_top}px"))
        .style("margin-bottom", &format!("{margin_bottom}px"))
}

/// Distance between the border boxes of `#a` and `#b`.
fn gap(paged: &PagedDocument) -> f32 {
    by_id(paged, "b").border_box().y - by_id(paged, "a").border_box().bottom()
}

#[test]
fn test_sibling_margins_collapse_to_the_larger() {
    let paged = layout(
        N::element("html")
            .child(sized_block("a", 0, 20))
            .child(sized_block("b", 10, 0)),
    );
    assert!((gap(&paged) - 20.0).abs() < 0.01, "gap {}", gap(&paged));
}

#[test]
fn test_negative_margin_is_subtracted() {
    let paged = layout(
        N::element("html")
            .child(sized_block("a", 0, 30))
            .child(sized_block("b", -10, 0)),
    );
    assert!((gap(&paged) - 20.0).abs() < 0.01, "gap {}", gap(&paged));
}

/// Adjoining margins collapse to the largest positive margin plus the most
/// negative one.
#[quickcheck]
fn prop_adjoining_margins_collapse(bottom: i8, top: i8) -> bool {
    let (bottom, top) = (i32::from(bottom % 40), i32::from(top % 40));
    let paged = layout(
        N::element("html")
            .child(sized_block("a", 0, bottom))
            .child(sized_block("b", top, 0)),
    );
    let expected = bottom.max(top).max(0) + bottom.min(top).min(0);
    (gap(&paged) - expected as f32).abs() < 0.01
}

#[test]
fn test_formatting_root_contains_floats() {
    let float = || {
        N::element("div")
            .style("float", "left")
            .style("width", "50px")
            .style("height", "80px")
    };
    let paged = layout(
        N::element("html")
            .child(
                N::element("div")
                    .attr("id", "bfc")
                    .style("overflow", "hidden")
                    .child(float()),
            )
            .child(N::element("div").attr("id", "plain").child(float())),
    );

    assert!((by_id(&paged, "bfc").dimensions.content.height - 80.0).abs() < 0.01);
    // A block that is not a formatting root lets its floats hang out.
    assert!(by_id(&paged, "plain").dimensions.content.height.abs() < 0.01);
}

#[test]
fn test_lines_are_shortened_beside_a_float() {
    let paged = layout(
        N::element("html")
            .child(
                N::element("div")
                    .style("float", "left")
                    .style("width", "100px")
                    .style("height", "40px"),
            )
            .child(N::element("p").attr("id", "p").child(N::text("Text beside a float"))),
    );
    let p = by_id(&paged, "p");
    assert!(!p.lines.is_empty());
    assert!((p.lines[0].rect.x - 100.0).abs() < 0.01, "x {}", p.lines[0].rect.x);
}

#[test]
fn test_outside_floats_do_not_reach_into_a_formatting_root() {
    let paged = layout(
        N::element("html")
            .child(
                N::element("div")
                    .style("float", "left")
                    .style("width", "100px")
                    .style("height", "80px"),
            )
            .child(
                N::element("div")
                    .attr("id", "bfc")
                    .style("overflow", "hidden")
                    .child(
                        N::element("div")
                            .attr("id", "cleared")
                            .style("clear", "left")
                            .style("height", "10px"),
                    )
                    .child(N::element("p").attr("id", "p").child(N::text("Inside"))),
            ),
    );
    let bfc = by_id(&paged, "bfc").dimensions.content;
    assert!((bfc.x - 100.0).abs() < 0.01, "x {}", bfc.x);
    // The float belongs to the outer context: nothing inside clears it.
    let cleared = by_id(&paged, "cleared").border_box();
    assert!((cleared.y - bfc.y).abs() < 0.01, "y {}", cleared.y);
    let p = by_id(&paged, "p");
    assert!((p.lines[0].rect.x - bfc.x).abs() < 0.01, "x {}", p.lines[0].rect.x);
}

/// A `size` px square with `position` and the given `top`/`left` insets.
fn positioned(id: &str, position: &str, top: &str, left: &str, size: u32) -> N {
    N::element("div")
        .attr("id", id)
        .style("position", position)
        .style("top", top)
        .style("left", left)
        .style("width", &format!("{size}px"))
        .style("height", &format!("{size}px"))
}

#[test]
fn test_absolute_insets_use_the_nearest_positioned_ancestor() {
    let paged = layout(
        N::element("html")
            .child(N::element("div").style("height", "40px"))
            .child(
                N::element("div")
                    .attr("id", "cb")
                    .style("position", "relative")
                    .style("height", "100px")
                    .child(
                        N::element("div")
                            .child(positioned("abs", "absolute", "10px", "20px", 30)),
                    ),
            ),
    );
    let abs = by_id(&paged, "abs").border_box();
    assert!((abs.x - 20.0).abs() < 0.01, "x {}", abs.x);
    assert!((abs.y - 50.0).abs() < 0.01, "y {}", abs.y);
}

#[test]
fn test_absolute_box_leaves_margins_collapsing() {
    let paged = layout(
        N::element("html")
            .child(sized_block("a", 0, 20))
            .child(positioned("abs", "absolute", "auto", "auto", 50))
            .child(sized_block("b", 10, 0)),
    );
    assert!((gap(&paged) - 20.0).abs() < 0.01, "gap {}", gap(&paged));
    // With every inset `auto` the box sits at its static position.
    let abs = by_id(&paged, "abs").border_box();
    assert!((abs.y - 40.0).abs() < 0.01, "y {}", abs.y);
}

#[test]
fn test_relative_offset_does_not_move_the_flow() {
    let paged = layout(
        N::element("html")
            .child(sized_block("a", 0, 0))
            .child(positioned("rel", "relative", "5px", "7px", 20))
            .child(sized_block("b", 0, 0)),
    );
    let rel = by_id(&paged, "rel").border_box();
    assert!((rel.x - 7.0).abs() < 0.01, "x {}", rel.x);
    assert!((rel.y - 25.0).abs() < 0.01, "y {}", rel.y);
    assert!((by_id(&paged, "b").border_box().y - 40.0).abs() < 0.01);
}

#[test]
fn test_flex_items_stretch_unless_they_have_a_ratio() {
    let paged = layout(
        N::element("html").child(
            N::element("div")
                .style("display", "flex")
                .style("height", "200px")
                .child(
                    N::element("div")
                        .attr("id", "square")
                        .style("width", "100px")
                        .style("aspect-ratio", "1"),
                )
                .child(N::element("div").attr("id", "stretched").style("width", "50px")),
        ),
    );

    let square = &by_id(&paged, "square").dimensions.content;
    assert!((square.width - 100.0).abs() < 0.01);
    assert!((square.height - 100.0).abs() < 0.01, "height {}", square.height);

    let stretched = &by_id(&paged, "stretched").dimensions.content;
    assert!((stretched.height - 200.0).abs() < 0.01, "height {}", stretched.height);
    // Items are placed side by side on the main axis.
    assert!((stretched.x - 100.0).abs() < 0.01, "x {}", stretched.x);
}

#[test]
fn test_layout_is_deterministic() {
    let doc = || {
        N::element("html")
            .child(N::element("h1").child(N::text("Title")))
            .child(
                N::element("ul")
                    .child(N::element("li").child(N::text("one")))
                    .child(N::element("li").child(N::text("two"))),
            )
    };
    let first = serde_json::to_string(&layout(doc())).unwrap();
    let second = serde_json::to_string(&layout(doc())).unwrap();
    assert_eq!(first, second);
}
