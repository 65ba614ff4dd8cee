//! Fragmentation tests on small pages.
//!
//! Pages are 100px tall with no margins and every paragraph sets one 20px
//! line per source line, so five lines fill a page.

use quickcheck_macros::quickcheck;
use quire_common::DiagnosticId;
use quire_dom::{StyledDocumentSpec, StyledNodeSpec as N};
use quire_layout::{ConversionConfig, PageSize, PagedDocument, convert};

/// 400x100 pages without margins.
fn small_pages() -> ConversionConfig {
    ConversionConfig::default()
        .with_page(PageSize {
            width: 400.0,
            height: 100.0,
        })
        .with_margins([0.0; 4])
}

/// Helper to run a conversion.
fn paginate(root: N, config: &ConversionConfig) -> PagedDocument {
    let tree = StyledDocumentSpec::new(root).into_styled_tree().unwrap();
    convert(&tree, config).unwrap()
}

/// An element with `lines` preformatted 20px lines of text.
fn lines_of(tag: &str, id: &str, lines: usize) -> N {
    let text = (1..=lines)
        .map(|i| format!("{id} line {i}"))
        .collect::<Vec<_>>()
        .join("\n");
    N::element(tag)
        .attr("id", id)
        .style("white-space", "pre")
        .style("line-height", "20px")
        .child(N::text(&text))
}

/// A paragraph of `lines` lines.
fn para(id: &str, lines: usize) -> N {
    lines_of("p", id, lines)
}

/// Number of `#id`'s lines on each page.
fn lines_per_page(paged: &PagedDocument, id: &str) -> Vec<usize> {
    let box_id = paged.box_tree.find_by_element_id(id).unwrap().id;
    paged
        .pages
        .iter()
        .map(|page| page.lines.iter().filter(|l| l.box_id == box_id).count())
        .collect()
}

#[test]
fn test_paragraph_splits_between_lines() {
    let paged = paginate(
        N::element("html").child(para("a", 3)).child(para("b", 4)),
        &small_pages(),
    );
    assert_eq!(paged.pages.len(), 2);
    assert_eq!(lines_per_page(&paged, "a"), [3, 0]);
    assert_eq!(lines_per_page(&paged, "b"), [2, 2]);
    assert!(paged.diagnostics.is_empty());
}

#[test]
fn test_widows_push_the_paragraph() {
    // Splitting after two lines would leave one widow.
    let paged = paginate(
        N::element("html").child(para("a", 3)).child(para("b", 3)),
        &small_pages(),
    );
    assert_eq!(lines_per_page(&paged, "b"), [0, 3]);
    assert!(paged.diagnostics.is_empty());
}

#[test]
fn test_orphans_push_the_paragraph() {
    let paged = paginate(
        N::element("html")
            .child(para("a", 3))
            .child(para("b", 5).style("orphans", "3")),
        &small_pages(),
    );
    assert_eq!(lines_per_page(&paged, "b"), [0, 5]);
}

#[test]
fn test_allowed_violation_is_reported() {
    let config = small_pages().with_widow_orphan_violation(true);
    let paged = paginate(
        N::element("html").child(para("a", 4)).child(para("b", 3)),
        &config,
    );
    assert_eq!(lines_per_page(&paged, "b"), [1, 2]);
    assert_eq!(paged.diagnostics.count(DiagnosticId::WidowOrphanViolation), 1);
}

/// Unless a violation is reported, every piece of a split paragraph but the
/// last has at least `orphans` lines and the last has at least `widows`.
#[quickcheck]
fn prop_split_paragraphs_honour_orphans_and_widows(
    filler: u8,
    lines: u8,
    orphans: u8,
    widows: u8,
) -> bool {
    let filler = 20 * u32::from(filler % 5);
    let lines = 1 + usize::from(lines % 14);
    let (orphans, widows) = (1 + orphans % 4, 1 + widows % 4);
    let paged = paginate(
        N::element("html")
            .child(N::element("div").style("height", &format!("{filler}px")))
            .child(
                para("p", lines)
                    .style("orphans", &orphans.to_string())
                    .style("widows", &widows.to_string()),
            ),
        &small_pages(),
    );
    if paged.diagnostics.count(DiagnosticId::WidowOrphanViolation) > 0 {
        return true;
    }
    let pieces: Vec<usize> = lines_per_page(&paged, "p")
        .into_iter()
        .filter(|&n| n > 0)
        .collect();
    if pieces.iter().sum::<usize>() != lines {
        return false;
    }
    let Some((last, rest)) = pieces.split_last() else {
        return false;
    };
    rest.is_empty()
        || (rest.iter().all(|&n| n >= usize::from(orphans)) && *last >= usize::from(widows))
}

#[test]
fn test_break_inside_avoid_keeps_the_block_together() {
    let paged = paginate(
        N::element("html")
            .child(para("a", 3))
            .child(lines_of("div", "kept", 4).style("break-inside", "avoid")),
        &small_pages(),
    );
    assert_eq!(lines_per_page(&paged, "kept"), [0, 4]);
    let kept = paged.box_tree.find_by_element_id("kept").unwrap().id;
    let fragments = paged.fragments_of(kept);
    assert_eq!(fragments.len(), 1);
    assert!(!fragments[0].continues);
    assert_eq!(fragments[0].page_index, 1);
}

#[test]
fn test_keep_together_taller_than_a_page_is_split() {
    let paged = paginate(
        N::element("html")
            .child(para("a", 1))
            .child(lines_of("div", "tall", 7).style("break-inside", "avoid")),
        &small_pages(),
    );
    assert_eq!(paged.diagnostics.count(DiagnosticId::ElementDoesNotFit), 1);
    let pieces = lines_per_page(&paged, "tall");
    assert_eq!(pieces.iter().sum::<usize>(), 7);
    let tall = paged.box_tree.find_by_element_id("tall").unwrap().id;
    let fragments = paged.fragments_of(tall);
    assert!(fragments.len() > 1);
    assert!(fragments[0].continues);
    assert!(!fragments[fragments.len() - 1].continues);
}

#[test]
fn test_continuous_container_keeps_paragraphs_together() {
    let doc = || N::element("html").child(para("a", 3)).child(para("b", 4));

    let paged = paginate(doc(), &small_pages());
    assert_eq!(lines_per_page(&paged, "b"), [2, 2]);

    let paged = paginate(doc(), &small_pages().with_continuous_container(true));
    assert_eq!(lines_per_page(&paged, "b"), [0, 4]);
}

#[test]
fn test_keep_together_on_a_table_is_reported() {
    let mut table = N::element("table").attr("id", "t").style("break-inside", "avoid");
    for i in 0..8 {
        table = table.child(
            N::element("tr").child(N::element("td").child(N::text(&format!("row {i}")))),
        );
    }
    let paged = paginate(N::element("html").child(para("a", 1)).child(table), &small_pages());
    assert_eq!(paged.diagnostics.count(DiagnosticId::KeepTogetherUnsupported), 1);
    assert!(paged.pages.len() > 1);
}

#[test]
fn test_forced_page_break() {
    let paged = paginate(
        N::element("html")
            .child(para("a", 1))
            .child(para("b", 1).style("break-before", "page"))
            .child(para("c", 1)),
        &small_pages(),
    );
    assert_eq!(paged.pages.len(), 2);
    assert_eq!(lines_per_page(&paged, "b"), [0, 1]);
    assert_eq!(lines_per_page(&paged, "c"), [0, 1]);
}

#[test]
fn test_break_to_right_page_inserts_a_blank_page() {
    let paged = paginate(
        N::element("html")
            .child(para("a", 1).style("break-after", "right"))
            .child(para("b", 1)),
        &small_pages(),
    );
    let blank: Vec<bool> = paged.pages.iter().map(|p| p.blank).collect();
    assert_eq!(blank, [false, true, false]);
    assert_eq!(lines_per_page(&paged, "b"), [0, 0, 1]);
    let numbers: Vec<usize> = paged.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, [1, 2, 3]);
}

#[test]
fn test_replaced_element_moves_to_next_page() {
    let paged = paginate(
        N::element("html").child(para("a", 3)).child(
            N::element("img")
                .attr("id", "img")
                .attr("width", "80")
                .attr("height", "80")
                .style("display", "block"),
        ),
        &small_pages(),
    );
    assert_eq!(paged.page_of("img"), Some(2));
    let img = paged.box_tree.find_by_element_id("img").unwrap().id;
    let fragments = paged.fragments_of(img);
    assert_eq!(fragments.len(), 1);
    assert!(!fragments[0].continues);
}

#[test]
fn test_tall_replaced_element_is_reported() {
    let paged = paginate(
        N::element("html").child(
            N::element("img")
                .attr("id", "img")
                .attr("width", "50")
                .attr("height", "250")
                .style("display", "block"),
        ),
        &small_pages(),
    );
    assert_eq!(paged.diagnostics.count(DiagnosticId::ElementDoesNotFit), 1);
    let img = paged.box_tree.find_by_element_id("img").unwrap().id;
    assert_eq!(paged.fragments_of(img).len(), 1);
}

/// A `width` x `height` left float.
fn float_box(id: &str, width: u32, height: u32) -> N {
    N::element("div")
        .attr("id", id)
        .style("float", "left")
        .style("width", &format!("{width}px"))
        .style("height", &format!("{height}px"))
}

#[test]
fn test_float_crossing_the_page_end_moves_to_the_next_page() {
    let paged = paginate(
        N::element("html")
            .child(N::element("div").style("height", "80px"))
            .child(float_box("float", 50, 60))
            .child(para("text", 6).style("orphans", "1").style("widows", "1")),
        &small_pages(),
    );
    let float = paged.box_tree.find_by_element_id("float").unwrap().id;
    let fragments = paged.fragments_of(float);
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].page_index, 1);
    assert!(fragments[0].rect.y.abs() < 0.01);
    assert!(fragments[0].rect.bottom() <= 100.0 + 0.01);
    assert!(paged.diagnostics.is_empty());
}

#[test]
fn test_float_among_lines_takes_its_line_along() {
    let text = (1..=3)
        .map(|i| format!("line {i}"))
        .collect::<Vec<_>>()
        .join("\n");
    let paged = paginate(
        N::element("html").child(para("a", 4)).child(
            N::element("div")
                .attr("id", "b")
                .style("white-space", "pre")
                .style("line-height", "20px")
                .style("orphans", "1")
                .style("widows", "1")
                .child(float_box("float", 50, 60))
                .child(N::text(&text)),
        ),
        &small_pages(),
    );
    assert_eq!(lines_per_page(&paged, "b"), [0, 3]);
    let float = paged.box_tree.find_by_element_id("float").unwrap().id;
    assert_eq!(paged.fragments_of(float)[0].page_index, 1);
    assert!(paged.diagnostics.is_empty());
}

#[test]
fn test_float_taller_than_a_page_is_reported() {
    let paged = paginate(
        N::element("html")
            .child(para("a", 1))
            .child(float_box("float", 50, 150)),
        &small_pages(),
    );
    assert_eq!(paged.diagnostics.count(DiagnosticId::ElementDoesNotFit), 1);
}

#[test]
fn test_fixed_box_repeats_on_every_page() {
    let header = N::element("div")
        .attr("id", "header")
        .style("position", "fixed")
        .style("top", "0")
        .style("left", "0")
        .style("width", "50px")
        .style("height", "10px");
    let paged = paginate(
        N::element("html")
            .child(header)
            .child(para("a", 3))
            .child(para("b", 4)),
        &small_pages(),
    );
    assert_eq!(paged.pages.len(), 2);
    let header = paged.box_tree.find_by_element_id("header").unwrap().id;
    let fragments = paged.fragments_of(header);
    let pages: Vec<usize> = fragments.iter().map(|f| f.page_index).collect();
    assert_eq!(pages, [0, 1]);
    assert!(fragments.iter().all(|f| f.rect.y.abs() < 0.01 && !f.continues));
}

#[test]
fn test_absolute_box_is_drawn_on_the_page_holding_its_top() {
    let late = N::element("div")
        .attr("id", "late")
        .style("position", "absolute")
        .style("top", "150px")
        .style("height", "10px");
    let paged = paginate(
        N::element("html")
            .child(para("a", 3))
            .child(para("b", 4))
            .child(late),
        &small_pages(),
    );
    let late = paged.box_tree.find_by_element_id("late").unwrap().id;
    let fragments = paged.fragments_of(late);
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].page_index, 1);
    assert!((fragments[0].rect.y - 50.0).abs() < 0.01, "y {}", fragments[0].rect.y);
}

#[test]
fn test_page_coordinates_include_margins() {
    let config = ConversionConfig::default()
        .with_page(PageSize {
            width: 400.0,
            height: 200.0,
        })
        .with_margins([30.0, 20.0, 50.0, 10.0]);
    let paged = paginate(N::element("html").child(para("a", 1)), &config);
    let page = &paged.pages[0];
    assert!((page.content_area.x - 10.0).abs() < 0.01);
    assert!((page.content_area.y - 30.0).abs() < 0.01);
    assert!((page.content_area.height - 120.0).abs() < 0.01);
    assert!((page.lines[0].rect.y - 30.0).abs() < 0.01);
}

#[test]
fn test_pagination_is_idempotent() {
    let doc = || {
        N::element("html")
            .child(para("a", 4))
            .child(para("b", 6))
            .child(para("c", 2).style("break-before", "page"))
    };
    let first = paginate(doc(), &small_pages());
    let second = paginate(doc(), &small_pages());
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

/// Converting the same tree twice gives the same pages, whatever the
/// paragraph lengths.
#[quickcheck]
fn prop_pagination_is_idempotent(lengths: Vec<u8>) -> bool {
    let mut root = N::element("html");
    for (i, len) in lengths.iter().take(8).enumerate() {
        root = root.child(para(&format!("p{i}"), usize::from(len % 9) + 1));
    }
    let tree = StyledDocumentSpec::new(root).into_styled_tree().unwrap();
    let first = convert(&tree, &small_pages()).unwrap();
    let second = convert(&tree, &small_pages()).unwrap();
    serde_json::to_string(&first).unwrap() == serde_json::to_string(&second).unwrap()
}
