//! Box tree construction.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! "An element's display type determines the type of principal box it
//! generates."
//!
//! [`BoxTreeBuilder`] walks the styled tree once in document order. Along the
//! way it validates declared values, applies counters, generates list markers
//! and `::before`/`::after` content, and records `target-counter()` requests.
//! The anonymous box fix-ups of CSS 2.1 § 9.2.1.1, § 17.2.1 and Flexbox § 4
//! run as each container's children are complete.

use std::collections::BTreeSet;

use quire_common::url::fragment_id;
use quire_common::{DiagnosticId, Diagnostics};
use quire_dom::{
    ElementData, NodeId, PropertyMap, PseudoElement, StyleValue, StyledTree, ValueOrigin,
    initial_value, is_inherited,
};

use crate::config::ConversionConfig;
use crate::content::{ContentItem, TargetRef, parse_content, quote_mark};
use crate::counters::CounterStore;
use crate::error::QuireError;
use crate::layout::{BoxKind, LayoutBox, establishes_bfc};
use crate::style::{
    ComputedStyle, DisplayValue, FloatSide, InnerDisplayType, ListStyleType, OuterDisplayType,
    WhiteSpace, default_display_for_element, parse_display, parse_list_style_type,
};
use crate::target::{CounterSnapshots, TargetCounterRequest, TargetValues};

/// The counter every list item increments.
///
/// [§ 4.3 The Implicit list-item Counter](https://www.w3.org/TR/css-lists-3/#list-item-counter)
const LIST_ITEM: &str = "list-item";

/// Elements kept on one page by `continuous_container`.
pub const CONTINUOUS_CONTAINERS: [&str; 7] = ["div", "p", "ul", "ol", "li", "section", "article"];

/// Result of one build.
#[derive(Debug, Clone)]
pub struct BuiltTree {
    /// The principal box of the document element, ids assigned.
    pub root: LayoutBox,
    /// `target-counter()` references in document order.
    pub requests: Vec<TargetCounterRequest>,
    /// Counter values at every element with an `id`.
    pub snapshots: CounterSnapshots,
}

/// Builds the box tree of a [`StyledTree`] for one layout pass.
pub struct BoxTreeBuilder<'a> {
    tree: &'a StyledTree,
    config: &'a ConversionConfig,
    targets: &'a TargetValues,
    diagnostics: &'a mut Diagnostics,
    counters: CounterStore,
    requests: Vec<TargetCounterRequest>,
    snapshots: CounterSnapshots,
    quote_depth: usize,
    reported_list_styles: BTreeSet<String>,
}

/// Where an element's box sits, as far as box generation cares.
#[derive(Debug, Clone, Copy)]
struct Placement {
    root: bool,
    in_flex: bool,
}

impl<'a> BoxTreeBuilder<'a> {
    /// A builder that renders `target-counter()` from `targets`, the values
    /// resolved by the previous pass.
    pub fn new(
        tree: &'a StyledTree,
        config: &'a ConversionConfig,
        targets: &'a TargetValues,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            tree,
            config,
            targets,
            diagnostics,
            counters: CounterStore::new(),
            requests: Vec::new(),
            snapshots: CounterSnapshots::new(),
            quote_depth: 0,
            reported_list_styles: BTreeSet::new(),
        }
    }

    /// Build the box tree.
    ///
    /// # Errors
    ///
    /// Returns [`QuireError::NoRootElement`] if the tree has no document
    /// element.
    pub fn build(mut self) -> Result<BuiltTree, QuireError> {
        let dom = self.tree.dom();
        let root_node = dom.document_element().ok_or(QuireError::NoRootElement)?;
        let placement = Placement {
            root: true,
            in_flex: false,
        };
        // A root with `display: none` still needs a box for the initial
        // containing block's content.
        let mut root = self.element(root_node, None, placement).unwrap_or_else(|| {
            let mut b = LayoutBox::new(BoxKind::Block, ComputedStyle::default());
            b.node = Some(root_node);
            b
        });
        mark_formatting_roots(&mut root, true);
        root.assign_ids(&mut 0);
        Ok(BuiltTree {
            root,
            requests: self.requests,
            snapshots: self.snapshots,
        })
    }

    /// [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
    ///
    /// Validate `map` and settle what inheritance left open.
    ///
    /// STEP 1: inherited values are re-read from the parent's cleaned map, so
    ///         an invalid value never propagates.
    /// STEP 2: explicit defaulting keywords on non-inherited properties.
    /// STEP 3: every other declared value goes through the configured
    ///         validator; rejects are reported and treated as undeclared.
    fn clean_map(&mut self, map: &PropertyMap, parent: Option<&PropertyMap>, what: &str) -> PropertyMap {
        let fallback = |name: &str| -> Option<StyleValue> {
            parent
                .and_then(|p| p.get(name))
                .map(|v| StyleValue {
                    text: v.text.clone(),
                    origin: ValueOrigin::Inherited,
                })
                .or_else(|| {
                    initial_value(name).map(|text| StyleValue {
                        text: text.to_string(),
                        origin: ValueOrigin::Initial,
                    })
                })
        };
        let mut out = PropertyMap::new();
        for (name, value) in map.iter() {
            let settled = match value.origin {
                // STEP 1
                ValueOrigin::Inherited => fallback(name).or_else(|| Some(value.clone())),
                ValueOrigin::Initial => Some(value.clone()),
                ValueOrigin::Specified => {
                    let text = value.text.trim();
                    let keyword = text.to_ascii_lowercase();
                    match keyword.as_str() {
                        // STEP 2
                        "inherit" => parent.and_then(|p| p.get(name)).map(|v| StyleValue {
                            text: v.text.clone(),
                            origin: ValueOrigin::Inherited,
                        }),
                        "unset" if is_inherited(name) => fallback(name),
                        "initial" | "unset" | "revert" => initial_value(name).map(|text| StyleValue {
                            text: text.to_string(),
                            origin: ValueOrigin::Initial,
                        }),
                        // STEP 3
                        _ if self.config.validator.validate(name, text) => Some(value.clone()),
                        _ => {
                            self.diagnostics.warn(
                                DiagnosticId::InvalidPropertyValue,
                                format!("{what}: ignoring '{name}: {text}'"),
                            );
                            if is_inherited(name) { fallback(name) } else { None }
                        }
                    }
                }
            };
            if let Some(v) = settled {
                out.insert(name, v);
            }
        }
        out
    }

    /// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
    ///
    /// The used display of an element or pseudo-element. `None` is
    /// `display: none`.
    fn display(&mut self, map: &PropertyMap, tag: Option<&str>, what: &str) -> Option<DisplayValue> {
        match map.specified("display") {
            Some(text) => match parse_display(text) {
                Ok(display) => display,
                Err(unsupported) => {
                    self.diagnostics.warn(
                        DiagnosticId::UnsupportedDisplay,
                        format!("{what}: display '{}' laid out as block", unsupported.0),
                    );
                    Some(DisplayValue::block())
                }
            },
            None => match tag {
                Some(tag) => default_display_for_element(tag),
                None => Some(DisplayValue::inline()),
            },
        }
    }

    /// Style of a box after [§ 9.7](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
    /// blockification.
    fn computed(map: &PropertyMap, display: DisplayValue, placement: Placement) -> ComputedStyle {
        let mut style = ComputedStyle::compute(map);
        // "if 'position' has the value 'absolute' or 'fixed', the box is
        // absolutely positioned, the computed value of 'float' is 'none'"
        if style.is_absolutely_positioned() || placement.in_flex {
            style.float = FloatSide::None;
        }
        let blockify = placement.root
            || placement.in_flex
            || style.is_floated()
            || style.is_absolutely_positioned();
        style.display = if blockify {
            display.blockified()
        } else {
            display
        };
        style
    }

    fn element(
        &mut self,
        node: NodeId,
        parent: Option<&PropertyMap>,
        placement: Placement,
    ) -> Option<LayoutBox> {
        let tree = self.tree;
        let dom = tree.dom();
        let data = dom.as_element(node)?;
        let what = describe(data);

        // STEP 1: Validate and settle the declared values.
        let map = self.clean_map(tree.style(node), parent, &what);

        // STEP 2: Display. "The element and its descendants generate no
        // boxes or text runs", and none of their counters apply.
        let display = self.display(&map, Some(&data.tag_name), &what)?;
        let mut style = Self::computed(&map, display, placement);
        // [§ 15.3.9 Tables] "table { border-spacing: 2px; }"
        if data.is("table") && map.get("border-spacing").map(|v| v.origin) != Some(ValueOrigin::Specified) {
            style.border_spacing = (2.0, 2.0);
        }

        // STEP 3: Counters, in the element's own scope.
        self.apply_counters(data, &mut style);
        if let Some(id) = data.id() {
            let snapshot = self.counters.snapshot();
            let _ = self.snapshots.entry(id.to_string()).or_insert(snapshot);
        }

        // STEP 4: The principal box.
        let kind = if data.is("img") {
            BoxKind::Replaced
        } else if data.is("br") {
            BoxKind::Inline
        } else {
            kind_for(style.display)
        };
        let mut b = LayoutBox::new(kind, style);
        b.node = Some(node);
        b.tag = Some(data.tag_name.clone());
        b.element_id = data.id().map(str::to_string);
        if data.is("br") {
            b.forced_line_break = true;
            return Some(b);
        }
        if b.kind == BoxKind::Replaced {
            b.intrinsic_size = intrinsic_size(data);
            return Some(b);
        }
        if b.kind == BoxKind::TableCell {
            b.colspan = data
                .attr("colspan")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n >= 1)
                .unwrap_or(1);
        }

        // STEP 5: Children, with ::marker and ::before/::after.
        let marker = b
            .style
            .display
            .list_item
            .then(|| self.marker(node, &b.style))
            .flatten();
        self.counters.enter_children();
        let child_placement = Placement {
            root: false,
            in_flex: b.kind == BoxKind::FlexContainer,
        };
        let mut children = Vec::new();
        if let Some(before) = self.pseudo(node, PseudoElement::Before, &map, child_placement) {
            children.push(before);
        }
        for &child in dom.children(node) {
            if let Some(text) = dom.as_text(child) {
                children.push(text_box(text, child, &b.style));
            } else if let Some(child_box) = self.element(child, Some(&map), child_placement) {
                children.push(child_box);
            }
        }
        if let Some(after) = self.pseudo(node, PseudoElement::After, &map, child_placement) {
            children.push(after);
        }
        self.counters.leave_children();

        // STEP 6: Anonymous box fix-ups.
        b.children = match b.kind {
            BoxKind::FlexContainer => fix_flex_children(&b.style, children),
            BoxKind::TableWrapper => fix_table_children(&b.style, children),
            BoxKind::TableRow => fix_row_children(&b.style, children),
            BoxKind::Inline => children,
            _ if b.style.display.inner == InnerDisplayType::TableRowGroup => children,
            _ => fix_block_children(&b.style, children),
        };
        if let Some(marker) = marker {
            insert_marker(&mut b, marker);
        }
        Some(b)
    }

    /// [§ 4.3 The Implicit list-item Counter](https://www.w3.org/TR/css-lists-3/#list-item-counter)
    ///
    /// "list items automatically increment the special list-item counter",
    /// unless the author's own `counter-increment` names it. `ol`/`ul` reset
    /// it, honouring `start`; `li[value]` sets it.
    fn apply_counters(&mut self, data: &ElementData, style: &mut ComputedStyle) {
        let names = |list: &[(String, i32)]| list.iter().any(|(n, _)| n == LIST_ITEM);
        if (data.is("ol") || data.is("ul")) && !names(&style.counter_reset) {
            let start = data
                .attr("start")
                .filter(|_| data.is("ol"))
                .and_then(|v| v.trim().parse::<i32>().ok())
                .unwrap_or(1);
            style
                .counter_reset
                .insert(0, (LIST_ITEM.to_string(), start.saturating_sub(1)));
        }
        if style.display.list_item {
            if let Some(value) = data
                .attr("value")
                .filter(|_| data.is("li"))
                .and_then(|v| v.trim().parse::<i32>().ok())
                && !names(&style.counter_set)
            {
                style
                    .counter_set
                    .push((LIST_ITEM.to_string(), value.saturating_sub(1)));
            }
            if !names(&style.counter_increment) {
                style.counter_increment.push((LIST_ITEM.to_string(), 1));
            }
        }
        self.counters.apply(style);
    }

    /// The counter style named `name`, or `decimal` with a diagnostic.
    fn list_style(&mut self, name: &str) -> ListStyleType {
        parse_list_style_type(name).unwrap_or_else(|| {
            if self.reported_list_styles.insert(name.to_string()) {
                self.diagnostics.warn(
                    DiagnosticId::UnsupportedListStyleType,
                    format!("list-style-type '{name}' rendered as decimal"),
                );
            }
            ListStyleType::Decimal
        })
    }

    /// [§ 3 Markers](https://www.w3.org/TR/css-lists-3/#markers)
    ///
    /// The `::marker` box of a list item, holding the marker string.
    fn marker(&mut self, node: NodeId, li: &ComputedStyle) -> Option<LayoutBox> {
        let declared = li.list_style_type.trim();
        // "<string>: The specified string is used as the marker."
        let text = if let Some(quoted) = declared
            .strip_prefix(['"', '\''])
            .and_then(|s| s.strip_suffix(['"', '\'']))
        {
            quoted.to_string()
        } else {
            let value = self.counters.value(LIST_ITEM).unwrap_or(0);
            self.list_style(declared).marker_text(value)
        };
        if text.is_empty() {
            return None;
        }
        let mut style = inline_style(li);
        style.white_space = WhiteSpace::Pre;
        let mut marker = LayoutBox::new(BoxKind::Marker, style.clone());
        marker.node = Some(node);
        marker.children.push(LayoutBox::new(BoxKind::Text(text), style));
        Some(marker)
    }

    /// [§ 1.1 ::before and ::after](https://www.w3.org/TR/css-pseudo-4/#generated-content)
    ///
    /// "When the computed value of content is ... none or normal, the
    /// pseudo-element does not generate a box."
    fn pseudo(
        &mut self,
        node: NodeId,
        which: PseudoElement,
        element_map: &PropertyMap,
        placement: Placement,
    ) -> Option<LayoutBox> {
        let tree = self.tree;
        let declared = tree.pseudo(node, which)?;
        let dom = tree.dom();
        let data = dom.as_element(node)?;
        let what = format!(
            "{}::{}",
            describe(data),
            match which {
                PseudoElement::Before => "before",
                PseudoElement::After => "after",
            }
        );
        let map = self.clean_map(declared, Some(element_map), &what);
        let items = match parse_content(map.value("content")?) {
            Ok(items) => items?,
            Err(err) => {
                self.diagnostics.warn(
                    DiagnosticId::InvalidPropertyValue,
                    format!("{what}: ignoring 'content': {err}"),
                );
                return None;
            }
        };
        let display = self.display(&map, None, &what)?;
        let mut style = Self::computed(&map, display, placement);
        // Generated content holds a single text run; table layout of it is
        // not supported.
        if matches!(
            style.display.inner,
            InnerDisplayType::Table
                | InnerDisplayType::TableRowGroup
                | InnerDisplayType::TableRow
                | InnerDisplayType::TableCell
        ) {
            style.display = DisplayValue::block();
        }
        self.counters.apply(&style);

        let text = self.render_content(&items, data);
        let mut b = LayoutBox::new(kind_for(style.display), style);
        b.node = Some(node);
        if !text.is_empty() {
            b.children.push(text_box(&text, node, &b.style));
        }
        if b.kind == BoxKind::FlexContainer {
            b.children = fix_flex_children(&b.style, std::mem::take(&mut b.children));
        }
        Some(b)
    }

    /// Render a `content` list to text.
    fn render_content(&mut self, items: &[ContentItem], data: &ElementData) -> String {
        let mut out = String::new();
        for item in items {
            match item {
                ContentItem::Text { value } => out.push_str(value),
                ContentItem::Counter { name, style } => {
                    let value = self.counters.value(name).unwrap_or(0);
                    out.push_str(&self.list_style(style).format(value));
                }
                ContentItem::Counters {
                    name,
                    separator,
                    style,
                } => {
                    let style = self.list_style(style);
                    let mut values = self.counters.values(name);
                    if values.is_empty() {
                        values.push(0);
                    }
                    let parts: Vec<String> = values.iter().map(|v| style.format(*v)).collect();
                    out.push_str(&parts.join(separator));
                }
                ContentItem::Attr { name } => out.push_str(data.attr(name).unwrap_or("")),
                ContentItem::TargetCounter {
                    target,
                    counter,
                    style,
                } => out.push_str(&self.target_counter(target, counter, style, data)),
                ContentItem::OpenQuote => {
                    out.push_str(quote_mark(self.quote_depth, true));
                    self.quote_depth += 1;
                }
                ContentItem::CloseQuote => {
                    self.quote_depth = self.quote_depth.saturating_sub(1);
                    out.push_str(quote_mark(self.quote_depth, false));
                }
                ContentItem::NoOpenQuote => self.quote_depth += 1,
                ContentItem::NoCloseQuote => {
                    self.quote_depth = self.quote_depth.saturating_sub(1);
                }
            }
        }
        out
    }

    /// [§ 3.3 target-counter()](https://www.w3.org/TR/css-gcpm-3/#target-counter)
    ///
    /// Records the request and renders the previous pass's value for it.
    fn target_counter(
        &mut self,
        target: &TargetRef,
        counter: &str,
        style: &str,
        data: &ElementData,
    ) -> String {
        if !self.config.target_counters {
            self.diagnostics.warn(
                DiagnosticId::TargetCounterDisabled,
                format!("{}: target-counter() ignored", describe(data)),
            );
            return String::new();
        }
        let id = match target {
            TargetRef::Fragment(id) => Some(id.clone()),
            TargetRef::Attr(name) => data
                .attr(name)
                .and_then(fragment_id)
                .map(str::to_string),
        };
        let style = self.list_style(style);
        let Some(id) = id else {
            self.diagnostics.warn(
                DiagnosticId::UnresolvedTargetCounter,
                format!("{}: target-counter() has no fragment to follow", describe(data)),
            );
            return style.format(0);
        };
        let value = self.targets.get(&id, counter).unwrap_or(0);
        self.requests.push(TargetCounterRequest {
            id: self.requests.len(),
            target: id,
            counter: counter.to_string(),
            style,
        });
        style.format(value)
    }
}

/// Box kind for a principal box of the given display type.
fn kind_for(display: DisplayValue) -> BoxKind {
    match display.inner {
        InnerDisplayType::Flex => BoxKind::FlexContainer,
        InnerDisplayType::Table => BoxKind::TableWrapper,
        InnerDisplayType::TableRow => BoxKind::TableRow,
        InnerDisplayType::TableCell => BoxKind::TableCell,
        _ if display.list_item => BoxKind::ListItem,
        InnerDisplayType::FlowRoot if display.outer == OuterDisplayType::Inline => {
            BoxKind::InlineBlock
        }
        InnerDisplayType::Flow if display.outer == OuterDisplayType::Inline => BoxKind::Inline,
        _ => BoxKind::Block,
    }
}

/// `<tag id="x">`, for diagnostics.
fn describe(data: &ElementData) -> String {
    match data.id() {
        Some(id) => format!("<{} id=\"{id}\">", data.tag_name),
        None => format!("<{}>", data.tag_name),
    }
}

/// Natural size of an `img` from its `width`/`height` attributes.
fn intrinsic_size(data: &ElementData) -> Option<(f32, f32)> {
    let dim = |name: &str| {
        data.attr(name)
            .map(|v| v.trim().trim_end_matches("px"))
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|v| *v >= 0.0)
    };
    match (dim("width"), dim("height")) {
        (Some(w), Some(h)) => Some((w, h)),
        _ => None,
    }
}

/// Style of anonymous inline content of a box styled `parent`.
fn inline_style(parent: &ComputedStyle) -> ComputedStyle {
    ComputedStyle {
        display: DisplayValue::inline(),
        ..ComputedStyle::anonymous_from(parent)
    }
}

/// [§ 9.2.2.1 Anonymous inline boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous)
fn text_box(text: &str, node: NodeId, parent: &ComputedStyle) -> LayoutBox {
    let mut b = LayoutBox::new(BoxKind::Text(text.to_string()), inline_style(parent));
    b.node = Some(node);
    b
}

fn anonymous(kind: BoxKind, parent: &ComputedStyle, children: Vec<LayoutBox>) -> LayoutBox {
    let mut b = LayoutBox::new(kind, ComputedStyle::anonymous_from(parent));
    b.children = children;
    b
}

fn is_row_group(b: &LayoutBox) -> bool {
    b.kind == BoxKind::Block && b.style.display.inner == InnerDisplayType::TableRowGroup
}

fn is_table_part(b: &LayoutBox) -> bool {
    matches!(b.kind, BoxKind::TableRow | BoxKind::TableCell) || is_row_group(b)
}

/// Whether an inline box contains in-flow block-level boxes.
fn has_block_descendant(b: &LayoutBox) -> bool {
    b.children.iter().any(|c| {
        c.is_in_flow_block() || (c.kind == BoxKind::Inline && has_block_descendant(c))
    })
}

/// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
///
/// "When an inline box contains an in-flow block-level box, the inline box
/// (and its inline ancestors within the same line box) are broken around
/// the block-level box"
///
/// Each piece of the broken inline box keeps the element's style and node.
fn split_block_in_inline(mut b: LayoutBox) -> Vec<LayoutBox> {
    if b.kind != BoxKind::Inline || !has_block_descendant(&b) {
        return vec![b];
    }
    let children = std::mem::take(&mut b.children);
    let mut out = Vec::new();
    let mut current = b.clone();
    for child in children {
        for piece in split_block_in_inline(child) {
            if piece.is_in_flow_block() {
                if !current.children.is_empty() {
                    out.push(std::mem::replace(&mut current, b.clone()));
                }
                out.push(piece);
            } else {
                current.children.push(piece);
            }
        }
    }
    if !current.children.is_empty() {
        out.push(current);
    }
    out
}

/// Wrap runs of table-internal boxes outside a table in anonymous tables.
///
/// [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
/// "If a child C of a 'table' or 'inline-table' box is not a proper table
/// child, then generate an anonymous 'table-row' box around C..."
fn wrap_table_parts(parent: &ComputedStyle, children: Vec<LayoutBox>) -> Vec<LayoutBox> {
    if !children.iter().any(is_table_part) {
        return children;
    }
    let mut out = Vec::new();
    let mut run = Vec::new();
    let flush = |run: &mut Vec<LayoutBox>, out: &mut Vec<LayoutBox>| {
        if !run.is_empty() {
            let mut table = anonymous(BoxKind::TableWrapper, parent, Vec::new());
            table.children = fix_table_children(&table.style, std::mem::take(run));
            out.push(table);
        }
    };
    for child in children {
        if is_table_part(&child) || (!run.is_empty() && child.is_collapsible_whitespace()) {
            run.push(child);
        } else {
            flush(&mut run, &mut out);
            out.push(child);
        }
    }
    flush(&mut run, &mut out);
    out
}

/// Children of a block container: every in-flow child block-level, or every
/// in-flow child inline-level.
fn fix_block_children(style: &ComputedStyle, children: Vec<LayoutBox>) -> Vec<LayoutBox> {
    // STEP 1: Break inline boxes around block-level descendants.
    let children: Vec<LayoutBox> = children.into_iter().flat_map(split_block_in_inline).collect();
    // STEP 2: Table parts outside tables.
    let children = wrap_table_parts(style, children);

    // STEP 3: Anonymous blocks around inline runs, when mixed.
    let has_block = children.iter().any(LayoutBox::is_in_flow_block);
    if !has_block {
        return children;
    }
    let mut out = Vec::new();
    let mut run: Vec<LayoutBox> = Vec::new();
    let flush = |run: &mut Vec<LayoutBox>, out: &mut Vec<LayoutBox>| {
        let has_content = run
            .iter()
            .any(|c| c.is_inline_level() && !c.is_out_of_flow() && !c.is_collapsible_whitespace());
        if has_content {
            out.push(anonymous(BoxKind::Anonymous, style, std::mem::take(run)));
        } else {
            // Only white space and out-of-flow boxes: the white space
            // generates nothing.
            out.extend(run.drain(..).filter(|c| !c.is_collapsible_whitespace()));
        }
    };
    for child in children {
        if child.is_in_flow_block() {
            flush(&mut run, &mut out);
            out.push(child);
        } else {
            run.push(child);
        }
    }
    flush(&mut run, &mut out);
    out
}

/// [§ 4 Flex Items](https://www.w3.org/TR/css-flexbox-1/#flex-items)
///
/// "Each in-flow child of a flex container becomes a flex item, and each
/// contiguous sequence of child text runs is wrapped in an anonymous block
/// container flex item. However, if the entire sequence of child text runs
/// contains only white space ... it is instead not rendered"
fn fix_flex_children(style: &ComputedStyle, children: Vec<LayoutBox>) -> Vec<LayoutBox> {
    let mut out = Vec::new();
    let mut run: Vec<LayoutBox> = Vec::new();
    let flush = |run: &mut Vec<LayoutBox>, out: &mut Vec<LayoutBox>| {
        if run.iter().any(|c| !c.is_collapsible_whitespace()) {
            let mut item = anonymous(BoxKind::Anonymous, style, std::mem::take(run));
            item.flex_item = true;
            out.push(item);
        }
        run.clear();
    };
    for mut child in children {
        if matches!(child.kind, BoxKind::Text(_)) || child.forced_line_break {
            run.push(child);
            continue;
        }
        flush(&mut run, &mut out);
        child.flex_item = !child.style.is_absolutely_positioned();
        out.push(child);
    }
    flush(&mut run, &mut out);
    out
}

/// Table children: row groups flattened into rows, everything else wrapped
/// in anonymous rows.
fn fix_table_children(style: &ComputedStyle, children: Vec<LayoutBox>) -> Vec<LayoutBox> {
    let mut rows = Vec::new();
    let mut loose = Vec::new();
    let flush = |loose: &mut Vec<LayoutBox>, rows: &mut Vec<LayoutBox>| {
        if !loose.is_empty() {
            let mut row = anonymous(BoxKind::TableRow, style, Vec::new());
            row.children = fix_row_children(style, std::mem::take(loose));
            rows.push(row);
        }
    };
    let mut queue: Vec<LayoutBox> = children;
    queue.reverse();
    while let Some(child) = queue.pop() {
        if is_row_group(&child) {
            // Row groups are not laid out; their rows join the table.
            queue.extend(child.children.into_iter().rev());
        } else if child.kind == BoxKind::TableRow {
            flush(&mut loose, &mut rows);
            let mut row = child;
            let row_children = std::mem::take(&mut row.children);
            row.children = fix_row_children(&row.style, row_children);
            rows.push(row);
        } else if !child.is_collapsible_whitespace() {
            loose.push(child);
        }
    }
    flush(&mut loose, &mut rows);
    rows
}

/// Row children: runs of non-cells wrapped in anonymous cells.
fn fix_row_children(style: &ComputedStyle, children: Vec<LayoutBox>) -> Vec<LayoutBox> {
    let mut out = Vec::new();
    let mut run = Vec::new();
    let flush = |run: &mut Vec<LayoutBox>, out: &mut Vec<LayoutBox>| {
        if run.iter().any(|c: &LayoutBox| !c.is_collapsible_whitespace()) {
            let cell_style = ComputedStyle::anonymous_from(style);
            let children = fix_block_children(&cell_style, std::mem::take(run));
            let mut cell = LayoutBox::new(BoxKind::TableCell, cell_style);
            cell.children = children;
            out.push(cell);
        }
        run.clear();
    };
    for child in children {
        if child.kind == BoxKind::TableCell {
            flush(&mut run, &mut out);
            out.push(child);
        } else {
            run.push(child);
        }
    }
    flush(&mut run, &mut out);
    out
}

/// [§ 3.1.1 list-style-position](https://www.w3.org/TR/css-lists-3/#list-style-position-property)
///
/// Put the marker at the start of the list item's first line: into the
/// first box with inline content, descending through leading block boxes.
fn insert_marker(li: &mut LayoutBox, marker: LayoutBox) {
    fn first_line_container(b: &mut LayoutBox) -> Option<&mut LayoutBox> {
        if b.has_inline_content() || !b.children.iter().any(|c| !c.is_out_of_flow()) {
            return Some(b);
        }
        let first = b.children.iter_mut().find(|c| !c.is_out_of_flow())?;
        if matches!(
            first.kind,
            BoxKind::Block | BoxKind::Anonymous | BoxKind::ListItem
        ) && !establishes_bfc(&first.style, &first.kind, first.flex_item, false)
        {
            first_line_container(first)
        } else {
            None
        }
    }

    match first_line_container(li) {
        Some(container) => container.children.insert(0, marker),
        None => {
            let wrapper = anonymous(BoxKind::Anonymous, &li.style, vec![marker]);
            li.children.insert(0, wrapper);
        }
    }
}

/// Set [`LayoutBox::formatting_root`] throughout the tree.
fn mark_formatting_roots(b: &mut LayoutBox, root: bool) {
    b.formatting_root = establishes_bfc(&b.style, &b.kind, b.flex_item, root);
    for child in &mut b.children {
        mark_formatting_roots(child, false);
    }
}

/// Whether `b` is kept on one page by `continuous_container`.
#[must_use]
pub fn is_continuous_container(b: &LayoutBox) -> bool {
    b.tag
        .as_deref()
        .is_some_and(|t| CONTINUOUS_CONTAINERS.contains(&t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::PropertyValidator;
    use quire_dom::{StyledDocumentSpec, StyledNodeSpec as N};

    fn build(root: N) -> (BuiltTree, Diagnostics) {
        let tree = StyledDocumentSpec::new(root).into_styled_tree().unwrap();
        let config = ConversionConfig::default();
        let targets = TargetValues::new();
        let mut diagnostics = Diagnostics::new();
        let built = BoxTreeBuilder::new(&tree, &config, &targets, &mut diagnostics)
            .build()
            .unwrap();
        (built, diagnostics)
    }

    /// Accepts every declared value.
    #[derive(Debug)]
    struct AcceptAll;

    impl PropertyValidator for AcceptAll {
        fn validate(&self, _property: &str, _value: &str) -> bool {
            true
        }
    }

    #[test]
    fn test_unparsable_content_is_reported() {
        let tree = StyledDocumentSpec::new(
            N::element("html").child(
                N::element("p")
                    .after("content", "counter(")
                    .child(N::text("x")),
            ),
        )
        .into_styled_tree()
        .unwrap();
        let config = ConversionConfig::default().with_validator(std::sync::Arc::new(AcceptAll));
        let targets = TargetValues::new();
        let mut diagnostics = Diagnostics::new();
        let built = BoxTreeBuilder::new(&tree, &config, &targets, &mut diagnostics)
            .build()
            .unwrap();
        assert_eq!(diagnostics.count(DiagnosticId::InvalidPropertyValue), 1);
        assert_eq!(text_of(&built.root), "x");
    }

    fn marker_texts(root: &LayoutBox) -> Vec<String> {
        let mut out = Vec::new();
        root.walk(&mut |b| {
            if b.kind == BoxKind::Marker {
                out.push(b.children[0].text().unwrap_or("").to_string());
            }
        });
        out
    }

    fn text_of(b: &LayoutBox) -> String {
        let mut out = String::new();
        b.walk(&mut |b| out.push_str(b.text().unwrap_or("")));
        out
    }

    #[test]
    fn test_mixed_children_get_anonymous_blocks() {
        let (built, _) = build(
            N::element("html").child(
                N::element("div")
                    .child(N::text("before"))
                    .child(N::element("p").child(N::text("para")))
                    .child(N::text("  ")),
            ),
        );
        let div = &built.root.children[0];
        let kinds: Vec<&BoxKind> = div.children.iter().map(|c| &c.kind).collect();
        assert_eq!(kinds, [&BoxKind::Anonymous, &BoxKind::Block]);
        assert_eq!(text_of(&div.children[0]), "before");
    }

    #[test]
    fn test_block_inside_inline_splits_the_inline() {
        let (built, _) = build(
            N::element("html").child(
                N::element("span")
                    .child(N::text("a"))
                    .child(N::element("div").child(N::text("b")))
                    .child(N::text("c")),
            ),
        );
        let kinds: Vec<&BoxKind> = built.root.children.iter().map(|c| &c.kind).collect();
        assert_eq!(kinds, [&BoxKind::Anonymous, &BoxKind::Block, &BoxKind::Anonymous]);
        assert_eq!(text_of(&built.root.children[2]), "c");
    }

    #[test]
    fn test_ordered_list_markers_honour_start_and_value() {
        let (built, _) = build(
            N::element("html").child(
                N::element("ol")
                    .style("list-style-type", "decimal")
                    .attr("start", "3")
                    .child(N::element("li").child(N::text("a")))
                    .child(N::element("li").attr("value", "10").child(N::text("b")))
                    .child(N::element("li").child(N::text("c"))),
            ),
        );
        assert_eq!(marker_texts(&built.root), ["3. ", "10. ", "11. "]);
    }

    #[test]
    fn test_unsupported_list_style_falls_back_to_decimal() {
        let item = || N::element("li").child(N::text("x"));
        let (built, diagnostics) = build(
            N::element("html").child(
                N::element("ol")
                    .style("list-style-type", "hebrew")
                    .child(item())
                    .child(item()),
            ),
        );
        assert_eq!(marker_texts(&built.root), ["1. ", "2. "]);
        assert_eq!(diagnostics.count(DiagnosticId::UnsupportedListStyleType), 1);
    }

    #[test]
    fn test_display_none_and_unsupported_display() {
        let (built, diagnostics) = build(
            N::element("html")
                .child(N::element("p").style("display", "none").child(N::text("gone")))
                .child(N::element("div").style("display", "grid").child(N::text("kept"))),
        );
        assert_eq!(built.root.children.len(), 1);
        assert_eq!(built.root.children[0].kind, BoxKind::Block);
        assert_eq!(diagnostics.count(DiagnosticId::UnsupportedDisplay), 1);
    }

    #[test]
    fn test_invalid_value_is_reported_and_ignored() {
        let (built, diagnostics) = build(
            N::element("html").child(N::element("p").style("width", "wide").child(N::text("x"))),
        );
        assert_eq!(diagnostics.count(DiagnosticId::InvalidPropertyValue), 1);
        assert_eq!(built.root.children[0].style.width, ComputedStyle::default().width);
    }

    #[test]
    fn test_flex_text_runs_become_anonymous_items() {
        let (built, _) = build(
            N::element("html").child(
                N::element("div")
                    .style("display", "flex")
                    .child(N::text("loose"))
                    .child(N::element("span").child(N::text("item")))
                    .child(N::text("   ")),
            ),
        );
        let flex = &built.root.children[0];
        assert_eq!(flex.kind, BoxKind::FlexContainer);
        assert_eq!(flex.children.len(), 2);
        assert!(flex.children.iter().all(|c| c.flex_item));
        assert_eq!(flex.children[1].style.display, DisplayValue::block());
    }

    #[test]
    fn test_table_parts_are_wrapped() {
        let (built, _) = build(
            N::element("html").child(
                N::element("table").child(
                    N::element("tbody").child(
                        N::element("tr")
                            .child(N::element("td").child(N::text("a")))
                            .child(N::text("b")),
                    ),
                ),
            ),
        );
        let table = &built.root.children[0];
        assert_eq!(table.kind, BoxKind::TableWrapper);
        assert_eq!(table.style.border_spacing, (2.0, 2.0));
        let row = &table.children[0];
        assert_eq!(row.kind, BoxKind::TableRow);
        assert_eq!(row.children.len(), 2);
        assert!(row.children.iter().all(|c| c.kind == BoxKind::TableCell));
    }

    #[test]
    fn test_generated_content_reads_counters() {
        let heading = || {
            N::element("h2")
                .style("counter-increment", "chapter")
                .before("content", "\"Chapter \" counter(chapter, upper-roman) \": \"")
                .child(N::text("Title"))
        };
        let (built, _) = build(
            N::element("html")
                .style("counter-reset", "chapter")
                .child(heading())
                .child(heading()),
        );
        assert_eq!(text_of(&built.root.children[1]), "Chapter II: Title");
    }

    #[test]
    fn test_target_counter_records_requests_and_snapshots() {
        let (built, diagnostics) = build(
            N::element("html")
                .child(
                    N::element("a")
                        .attr("href", "#fig")
                        .after("content", "\" on page \" target-counter(attr(href), page)"),
                )
                .child(N::element("p").attr("id", "fig").child(N::text("figure"))),
        );
        assert_eq!(built.requests.len(), 1);
        assert_eq!(built.requests[0].target, "fig");
        assert!(built.requests[0].is_page());
        assert!(built.snapshots.contains_key("fig"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_outside_marker_goes_into_first_paragraph() {
        let (built, _) = build(
            N::element("html").child(
                N::element("ul").child(
                    N::element("li").child(N::element("p").child(N::text("first"))),
                ),
            ),
        );
        let li = &built.root.children[0].children[0];
        assert_eq!(li.kind, BoxKind::ListItem);
        assert_eq!(li.children[0].children[0].kind, BoxKind::Marker);
        assert_eq!(marker_texts(li), ["• "]);
    }
}
