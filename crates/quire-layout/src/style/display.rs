//! The `display` property.
//!
//! [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)

use serde::Serialize;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// [§ 2.1 Outer Display Roles](https://www.w3.org/TR/css-display-3/#outer-role)
///
/// "The `<display-outside>` keywords specify the element's outer display type,
/// which is essentially its principal box's role in flow layout."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OuterDisplayType {
    /// "The element generates a block-level box when placed in flow layout."
    Block,
    /// "The element generates an inline-level box when placed in flow layout."
    Inline,
}

/// [§ 2.2 Inner Display Layout Models](https://www.w3.org/TR/css-display-3/#inner-model)
///
/// "The `<display-inside>` keywords specify the element's inner display type,
/// which defines the type of formatting context that lays out its contents."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InnerDisplayType {
    /// "The element lays out its contents using flow layout (block-and-inline layout)."
    Flow,
    /// Flow layout that always establishes a new block formatting context.
    FlowRoot,
    /// "The element lays out its contents using table layout."
    Table,
    /// [§ 2.4 Layout-Internal Display](https://www.w3.org/TR/css-display-3/#layout-specific-display)
    /// `table-row-group`, `table-header-group` and `table-footer-group`.
    TableRowGroup,
    /// `table-row`
    TableRow,
    /// `table-cell`
    TableCell,
    /// "The element lays out its contents using flex layout."
    Flex,
}

/// Combined display value.
/// [§ 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#the-display-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayValue {
    /// "The outer display type, which dictates how the box participates in flow layout."
    pub outer: OuterDisplayType,
    /// "The inner display type, which dictates how its descendant boxes are laid out."
    pub inner: InnerDisplayType,
    /// [§ 2.3 Generating Marker Boxes](https://www.w3.org/TR/css-display-3/#list-items)
    /// "The list-item keyword causes the element to generate a ::marker
    /// pseudo-element box"
    pub list_item: bool,
}

impl Default for DisplayValue {
    fn default() -> Self {
        Self::inline()
    }
}

impl DisplayValue {
    const fn new(outer: OuterDisplayType, inner: InnerDisplayType) -> Self {
        Self {
            outer,
            inner,
            list_item: false,
        }
    }

    /// `display: block` - block outer, flow inner
    #[must_use]
    pub const fn block() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::Flow)
    }

    /// `display: inline` - inline outer, flow inner
    #[must_use]
    pub const fn inline() -> Self {
        Self::new(OuterDisplayType::Inline, InnerDisplayType::Flow)
    }

    /// `display: inline-block` - inline outer, flow-root inner
    #[must_use]
    pub const fn inline_block() -> Self {
        Self::new(OuterDisplayType::Inline, InnerDisplayType::FlowRoot)
    }

    /// `display: list-item` - block outer, flow inner, with a marker
    #[must_use]
    pub const fn list_item() -> Self {
        Self {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::Flow,
            list_item: true,
        }
    }

    /// `display: flex` - block outer, flex inner
    #[must_use]
    pub const fn flex() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::Flex)
    }

    /// `display: table` - block outer, table inner
    #[must_use]
    pub const fn table() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::Table)
    }

    /// Whether the principal box is block-level.
    #[must_use]
    pub fn is_block_level(self) -> bool {
        self.outer == OuterDisplayType::Block
    }

    /// [§ 2.7 Automatic Box Type Transformations](https://www.w3.org/TR/css-display-3/#transformations)
    ///
    /// "Some layout effects require blockification or inlinification of the
    /// box type... Blockification: if a layout-internal or inline-level box
    /// is blockified, its inner display type is preserved."
    ///
    /// Used for floats, absolutely positioned boxes, flex items and the root.
    #[must_use]
    pub const fn blockified(self) -> Self {
        let inner = match self.inner {
            // An inline-block becomes a block that still establishes a BFC.
            InnerDisplayType::FlowRoot => InnerDisplayType::FlowRoot,
            InnerDisplayType::TableRowGroup
            | InnerDisplayType::TableRow
            | InnerDisplayType::TableCell => InnerDisplayType::Flow,
            other => other,
        };
        Self {
            outer: OuterDisplayType::Block,
            inner,
            list_item: self.list_item,
        }
    }
}

/// The `display` keywords the engine implements.
///
/// Anything else (`grid`, `contents`, `run-in`, `table-caption`, ...) is
/// reported as unsupported and laid out as `block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
enum DisplayKeyword {
    None,
    Block,
    Inline,
    InlineBlock,
    FlowRoot,
    ListItem,
    Flex,
    InlineFlex,
    Table,
    InlineTable,
    TableRowGroup,
    TableHeaderGroup,
    TableFooterGroup,
    TableRow,
    TableCell,
}

/// A `display` value that names a layout mode the engine does not implement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedDisplay(pub String);

/// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// Parse a display value. `Ok(None)` means `display: none`.
///
/// # Errors
///
/// Returns [`UnsupportedDisplay`] for values outside the supported set; the
/// caller reports it and falls back to `block`.
pub fn parse_display(text: &str) -> Result<Option<DisplayValue>, UnsupportedDisplay> {
    use InnerDisplayType as I;
    use OuterDisplayType as O;

    let keyword = DisplayKeyword::from_str(text.trim())
        .map_err(|_| UnsupportedDisplay(text.trim().to_string()))?;
    let value = match keyword {
        DisplayKeyword::None => return Ok(None),
        DisplayKeyword::Block => DisplayValue::block(),
        DisplayKeyword::Inline => DisplayValue::inline(),
        DisplayKeyword::InlineBlock => DisplayValue::inline_block(),
        DisplayKeyword::FlowRoot => DisplayValue::new(O::Block, I::FlowRoot),
        DisplayKeyword::ListItem => DisplayValue::list_item(),
        DisplayKeyword::Flex => DisplayValue::flex(),
        DisplayKeyword::InlineFlex => DisplayValue::new(O::Inline, I::Flex),
        DisplayKeyword::Table => DisplayValue::table(),
        DisplayKeyword::InlineTable => DisplayValue::new(O::Inline, I::Table),
        DisplayKeyword::TableRowGroup
        | DisplayKeyword::TableHeaderGroup
        | DisplayKeyword::TableFooterGroup => DisplayValue::new(O::Block, I::TableRowGroup),
        DisplayKeyword::TableRow => DisplayValue::new(O::Block, I::TableRow),
        DisplayKeyword::TableCell => DisplayValue::new(O::Block, I::TableCell),
    };
    Ok(Some(value))
}

/// [§ 15.3 Non-replaced elements](https://html.spec.whatwg.org/multipage/rendering.html#non-replaced-elements)
///
/// The user agent `display` of an element that has no `display` declaration.
/// `None` means the element is hidden.
#[must_use]
pub fn default_display_for_element(tag_name: &str) -> Option<DisplayValue> {
    // [§ 15.3.1 Hidden elements]
    // "The following elements must have their display set to none:"
    let hidden = [
        "area", "base", "basefont", "datalist", "head", "link", "meta", "noembed", "noframes",
        "param", "rp", "script", "style", "template", "title",
    ];
    if hidden.contains(&tag_name) {
        return None;
    }

    // [§ 15.3.3 Flow content]
    let block_elements = [
        "address",
        "article",
        "aside",
        "blockquote",
        "body",
        "center",
        "dd",
        "details",
        "dialog",
        "div",
        "dl",
        "dt",
        "fieldset",
        "figcaption",
        "figure",
        "footer",
        "form",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "header",
        "hgroup",
        "hr",
        "html",
        "legend",
        "main",
        "menu",
        "nav",
        "ol",
        "p",
        "pre",
        "section",
        "summary",
        "ul",
    ];
    if block_elements.contains(&tag_name) {
        return Some(DisplayValue::block());
    }

    // [§ 15.3.8 Lists]
    // "li { display: list-item; }"
    // [§ 15.3.9 Tables]
    let display = match tag_name {
        "li" => DisplayValue::list_item(),
        "table" => DisplayValue::table(),
        "thead" | "tbody" | "tfoot" => {
            DisplayValue::new(OuterDisplayType::Block, InnerDisplayType::TableRowGroup)
        }
        "tr" => DisplayValue::new(OuterDisplayType::Block, InnerDisplayType::TableRow),
        "td" | "th" => DisplayValue::new(OuterDisplayType::Block, InnerDisplayType::TableCell),
        // Form controls and replaced content sit in the line as atomic boxes.
        "button" | "input" | "select" | "textarea" => DisplayValue::inline_block(),
        _ => DisplayValue::inline(),
    };
    Some(display)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_keywords() {
        assert_eq!(parse_display("block"), Ok(Some(DisplayValue::block())));
        assert_eq!(parse_display("INLINE-BLOCK"), Ok(Some(DisplayValue::inline_block())));
        assert_eq!(parse_display("none"), Ok(None));
        assert!(parse_display("list-item").unwrap().unwrap().list_item);
    }

    #[test]
    fn test_unsupported_keywords_are_reported() {
        assert_eq!(
            parse_display("grid"),
            Err(UnsupportedDisplay("grid".to_string()))
        );
        assert!(parse_display("contents").is_err());
    }

    #[test]
    fn test_blockify_keeps_inner_type() {
        let inline_flex = parse_display("inline-flex").unwrap().unwrap();
        assert_eq!(inline_flex.blockified(), DisplayValue::flex());
        assert_eq!(
            DisplayValue::inline_block().blockified().inner,
            InnerDisplayType::FlowRoot
        );
    }

    #[test]
    fn test_user_agent_defaults() {
        assert_eq!(default_display_for_element("head"), None);
        assert_eq!(default_display_for_element("p"), Some(DisplayValue::block()));
        assert_eq!(default_display_for_element("span"), Some(DisplayValue::inline()));
        assert!(default_display_for_element("li").unwrap().list_item);
    }
}
