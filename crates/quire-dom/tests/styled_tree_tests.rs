//! Tests for styled tree construction and inheritance.

use quickcheck_macros::quickcheck;
use quire_dom::{
    DomError, INHERITED_PROPERTIES, NodeId, PseudoElement, StyledDocumentSpec, StyledNodeSpec,
    ValueOrigin,
};

/// Helper: build a styled tree from a root node spec.
fn styled(root: StyledNodeSpec) -> quire_dom::StyledTree {
    StyledDocumentSpec::new(root)
        .into_styled_tree()
        .expect("valid document")
}

/// Helper: the element with the given id attribute.
fn by_id(tree: &quire_dom::StyledTree, id: &str) -> NodeId {
    tree.dom().find_by_id(id).expect("element exists")
}

#[test]
fn test_root_gets_initial_values() {
    let tree = styled(StyledNodeSpec::element("html").attr("id", "root"));
    let root = by_id(&tree, "root");
    let style = tree.style(root);

    let orphans = style.get("orphans").expect("orphans present");
    assert_eq!(orphans.text, "2");
    assert_eq!(orphans.origin, ValueOrigin::Initial);
    for name in INHERITED_PROPERTIES {
        assert!(style.contains(name), "root is missing {name}");
    }
}

#[test]
fn test_inherited_values_are_tagged() {
    let tree = styled(
        StyledNodeSpec::element("html")
            .style("widows", "3")
            .child(StyledNodeSpec::element("p").attr("id", "p")),
    );
    let p = tree.style(by_id(&tree, "p"));
    let widows = p.get("widows").expect("widows inherited");
    assert_eq!(widows.text, "3");
    assert_eq!(widows.origin, ValueOrigin::Inherited);
    assert_eq!(p.specified("widows"), None);
}

#[test]
fn test_initial_keyword_resets_to_initial_value() {
    let tree = styled(
        StyledNodeSpec::element("html")
            .style("list-style-type", "upper-roman")
            .child(
                StyledNodeSpec::element("ul")
                    .attr("id", "ul")
                    .style("list-style-type", "initial"),
            ),
    );
    let ul = tree.style(by_id(&tree, "ul"));
    assert_eq!(ul.value("list-style-type"), Some("disc"));
    assert_eq!(
        ul.get("list-style-type").map(|v| v.origin),
        Some(ValueOrigin::Initial)
    );
}

#[test]
fn test_em_font_sizes_do_not_compound_through_inheritance() {
    let tree = styled(
        StyledNodeSpec::element("html").style("font-size", "20px").child(
            StyledNodeSpec::element("div")
                .attr("id", "div")
                .style("font-size", "1.5em")
                .child(StyledNodeSpec::element("span").attr("id", "span")),
        ),
    );
    assert_eq!(tree.style(by_id(&tree, "div")).value("font-size"), Some("30px"));
    assert_eq!(tree.style(by_id(&tree, "span")).value("font-size"), Some("30px"));
}

#[test]
fn test_line_height_em_is_absolutized_against_own_font_size() {
    let tree = styled(
        StyledNodeSpec::element("html").child(
            StyledNodeSpec::element("p")
                .attr("id", "p")
                .style("font-size", "10px")
                .style("line-height", "2em"),
        ),
    );
    assert_eq!(tree.style(by_id(&tree, "p")).value("line-height"), Some("20px"));
}

#[test]
fn test_pseudo_elements_inherit_from_their_element() {
    let tree = styled(
        StyledNodeSpec::element("html").child(
            StyledNodeSpec::element("h1")
                .attr("id", "h")
                .style("color", "red")
                .before("content", "'Chapter '"),
        ),
    );
    let h = by_id(&tree, "h");
    let before = tree
        .pseudo(h, PseudoElement::Before)
        .expect("before map present");
    assert_eq!(before.value("content"), Some("'Chapter '"));
    assert_eq!(before.value("color"), Some("red"));
    assert!(tree.pseudo(h, PseudoElement::After).is_none());
}

#[test]
fn test_text_nodes_use_parent_style() {
    let tree = styled(
        StyledNodeSpec::element("p")
            .style("text-align", "center")
            .child(StyledNodeSpec::text("hi")),
    );
    let p = tree.dom().document_element().expect("root element");
    let text = tree.dom().first_child(p).expect("text child");
    assert_eq!(tree.style(text).value("text-align"), Some("center"));
    assert_eq!(tree.dom().text_content(p), "hi");
}

#[test]
fn test_json_round_trip_into_tree() {
    let json = r#"{
        "base_url": "file:///book/index.html",
        "root": { "tag": "html", "children": [
            { "tag": "p", "attrs": { "id": "a" }, "children": [ { "text": "One" } ] },
            { "tag": "p", "attrs": { "id": "b" }, "children": [ { "text": "Two" } ] }
        ] }
    }"#;
    let tree = StyledDocumentSpec::from_json(json)
        .and_then(StyledDocumentSpec::into_styled_tree)
        .expect("valid json document");
    assert_eq!(tree.base_url(), Some("file:///book/index.html"));
    let a = by_id(&tree, "a");
    let b = by_id(&tree, "b");
    assert!(a < b, "document order is allocation order");
    assert_eq!(tree.dom().next_sibling(a), Some(b));
    assert_eq!(tree.dom().text_content(NodeId::ROOT), "OneTwo");
}

#[test]
fn test_invalid_nodes_are_rejected() {
    let bad = StyledNodeSpec::element("html").child(StyledNodeSpec::default());
    let err = StyledDocumentSpec::new(bad).into_styled_tree();
    assert!(matches!(err, Err(DomError::InvalidNode { path }) if path == "root/0"));

    let text_root = StyledDocumentSpec::new(StyledNodeSpec::text("x")).into_styled_tree();
    assert!(matches!(text_root, Err(DomError::RootNotElement)));

    assert!(matches!(
        StyledDocumentSpec::from_json("{ \"root\": 3 }"),
        Err(DomError::Json(_))
    ));
}

/// Every element of an arbitrarily deep chain carries all inherited
/// properties, and a value set on the root reaches the deepest element.
#[quickcheck]
fn prop_inheritance_reaches_every_depth(depth: u8, orphans: u8) -> bool {
    let depth = usize::from(depth % 16);
    let orphans = u32::from(orphans % 9) + 1;
    let mut node = StyledNodeSpec::element("div").attr("id", "leaf");
    for _ in 0..depth {
        node = StyledNodeSpec::element("div").child(node);
    }
    let root = StyledNodeSpec::element("html")
        .style("orphans", &orphans.to_string())
        .child(node);
    let tree = styled(root);
    let leaf = tree.style(by_id(&tree, "leaf"));
    INHERITED_PROPERTIES.iter().all(|p| leaf.contains(p))
        && leaf.value("orphans") == Some(orphans.to_string().as_str())
}
