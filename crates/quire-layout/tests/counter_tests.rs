//! Counter, list marker and `target-counter()` tests.

use quickcheck_macros::quickcheck;
use quire_common::DiagnosticId;
use quire_dom::{StyledDocumentSpec, StyledNodeSpec as N};
use quire_layout::counters::CounterStore;
use quire_layout::{ConversionConfig, PageSize, PagedDocument, convert};

/// Helper to run a conversion.
fn convert_with(root: N, config: &ConversionConfig) -> PagedDocument {
    let tree = StyledDocumentSpec::new(root).into_styled_tree().unwrap();
    convert(&tree, config).unwrap()
}

/// A paragraph whose `::after` refers to the page of its `href`.
fn page_reference(href: &str) -> N {
    N::element("p")
        .attr("href", href)
        .after("content", "\"page \" target-counter(attr(href), page)")
}

#[test]
fn test_page_reference_converges() {
    let paged = convert_with(
        N::element("html")
            .child(page_reference("#ch2"))
            .child(
                N::element("h2")
                    .attr("id", "ch2")
                    .style("break-before", "page")
                    .child(N::text("Two")),
            ),
        &ConversionConfig::default(),
    );
    assert_eq!(paged.pages.len(), 2);
    assert_eq!(paged.page_of("ch2"), Some(2));
    assert_eq!(paged.pages[0].text(), "page 2");
    assert_eq!(paged.relayout_passes, 2);
    assert_eq!(paged.diagnostics.count(DiagnosticId::RelayoutBudgetExceeded), 0);
}

#[test]
fn test_table_of_contents_converges() {
    let chapter = |id: &str| {
        N::element("h2")
            .attr("id", id)
            .style("break-before", "page")
            .child(N::text(id))
    };
    let paged = convert_with(
        N::element("html")
            .child(page_reference("#c2"))
            .child(page_reference("#c3"))
            .child(page_reference("#c4"))
            .child(chapter("c2"))
            .child(chapter("c3"))
            .child(chapter("c4")),
        &ConversionConfig::default(),
    );
    assert_eq!(paged.pages.len(), 4);
    assert_eq!(paged.pages[0].text(), "page 2\npage 3\npage 4");
    assert_eq!(paged.page_of("c4"), Some(4));
    assert_eq!(paged.relayout_passes, 2);
    assert!(paged.diagnostics.is_empty());
}

#[test]
fn test_longer_value_moves_a_later_target() {
    let config = ConversionConfig::default()
        .with_page(PageSize {
            width: 400.0,
            height: 100.0,
        })
        .with_margins([0.0; 4]);
    let line_height = |n: N| n.style("line-height", "20px");
    // Three lines, then a reference that wraps once its value is known.
    let filler = line_height(N::element("p").style("white-space", "pre"))
        .child(N::text("one\ntwo\nthree"));
    let reference = line_height(N::element("p"))
        .style("width", "40px")
        .style("font-size", "10px")
        .after("content", "\"n \" target-counter(url(#t), big)");
    let target = line_height(N::element("p"))
        .attr("id", "t")
        .style("counter-reset", "big 123456789")
        .child(N::text("target"));
    let paged = convert_with(
        N::element("html")
            .child(filler)
            .child(reference)
            .child(target)
            .child(page_reference("#t")),
        &config,
    );

    assert_eq!(paged.page_of("t"), Some(2));
    assert!(paged.pages[0].text().contains("123456789"), "{}", paged.pages[0].text());
    // The page reference after the target followed it to page 2.
    assert!(paged.pages[1].text().ends_with("page 2"), "{}", paged.pages[1].text());
    assert_eq!(paged.relayout_passes, 3);
    assert_eq!(paged.diagnostics.count(DiagnosticId::RelayoutBudgetExceeded), 0);
}

#[test]
fn test_named_counter_at_target() {
    let figure = |id: &str| {
        N::element("figure")
            .attr("id", id)
            .style("counter-increment", "figure")
            .child(N::text(id))
    };
    let paged = convert_with(
        N::element("html")
            .style("counter-reset", "figure")
            .child(
                N::element("p")
                    .after("content", "\"see figure \" target-counter(url(#f2), figure)"),
            )
            .child(figure("f1"))
            .child(figure("f2")),
        &ConversionConfig::default(),
    );
    assert!(
        paged.pages[0].text().starts_with("see figure 2"),
        "{}",
        paged.pages[0].text()
    );
    assert!(paged.diagnostics.is_empty());
}

#[test]
fn test_missing_target_reads_zero() {
    let paged = convert_with(
        N::element("html").child(page_reference("#missing")),
        &ConversionConfig::default(),
    );
    assert_eq!(paged.pages[0].text(), "page 0");
    assert_eq!(paged.diagnostics.count(DiagnosticId::UnresolvedTargetCounter), 1);
}

#[test]
fn test_disabled_target_counters_render_nothing() {
    let config = ConversionConfig::default().with_target_counters(false);
    let paged = convert_with(
        N::element("html")
            .child(page_reference("#ch2"))
            .child(N::element("h2").attr("id", "ch2").child(N::text("Two"))),
        &config,
    );
    assert_eq!(paged.relayout_passes, 1);
    assert_eq!(paged.diagnostics.count(DiagnosticId::TargetCounterDisabled), 1);
    assert!(!paged.pages[0].text().contains('0'));
}

#[test]
fn test_nested_list_counters() {
    let item = |text: &str| {
        N::element("li")
            .style("list-style-type", "none")
            .before("content", "counters(list-item, \".\") \" \"")
            .child(N::text(text))
    };
    let paged = convert_with(
        N::element("html").child(
            N::element("ol").child(
                item("a").child(N::element("ol").child(item("b")).child(item("c"))),
            ),
        ),
        &ConversionConfig::default(),
    );
    let text = paged.pages[0].text();
    assert!(text.contains("1 a"), "{text}");
    assert!(text.contains("1.1 b"), "{text}");
    assert!(text.contains("1.2 c"), "{text}");
}

#[test]
fn test_list_markers_follow_style_type() {
    let paged = convert_with(
        N::element("html").child(
            N::element("ol")
                .style("list-style-type", "lower-alpha")
                .child(N::element("li").child(N::text("first")))
                .child(N::element("li").child(N::text("second"))),
        ),
        &ConversionConfig::default(),
    );
    let text = paged.pages[0].text();
    assert!(text.contains("a."), "{text}");
    assert!(text.contains("b."), "{text}");
    assert!(paged.diagnostics.is_empty());
}

#[test]
fn test_unsupported_list_style_falls_back_to_decimal() {
    let paged = convert_with(
        N::element("html").child(
            N::element("ol")
                .style("list-style-type", "hebrew")
                .child(N::element("li").child(N::text("first")))
                .child(N::element("li").child(N::text("second"))),
        ),
        &ConversionConfig::default(),
    );
    let text = paged.pages[0].text();
    assert!(text.contains("1."), "{text}");
    assert!(text.contains("2."), "{text}");
    assert_eq!(paged.diagnostics.count(DiagnosticId::UnsupportedListStyleType), 1);
}

/// A counter reset inside an element's children nests below the outer one
/// and disappears with the frame.
#[quickcheck]
fn prop_nested_reset_restores_outer_counter(outer: i16, steps: Vec<i8>) -> bool {
    let outer = i32::from(outer);
    let mut store = CounterStore::new();
    store.reset("c", outer);
    store.enter_children();
    store.reset("c", 0);
    for step in &steps {
        store.increment("c", i32::from(*step));
    }
    let nested = store.values("c");
    store.leave_children();

    let sum: i32 = steps.iter().map(|s| i32::from(*s)).sum();
    nested == [outer, sum] && store.value("c") == Some(outer) && store.depth() == 1
}
