//! Property maps and inheritance.
//!
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/)
//!
//! Selector matching and the cascade happen outside this crate. What arrives
//! here is, per element, the winning declared value of every property the
//! author set. [`StyledTreeBuilder::build`] then performs the last step of
//! value resolution that depends on the tree: inheritance and initial values.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::tree::{DomTree, NodeId};

/// Where a value in a [`PropertyMap`] came from.
///
/// [§ 7 Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueOrigin {
    /// Declared on the element itself.
    Specified,
    /// "the inherited value ... is the computed value of the property on the
    /// element's parent."
    Inherited,
    /// "Each property has an initial value, defined in the property's
    /// definition table."
    Initial,
}

/// One property value together with its origin tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleValue {
    /// Value text, e.g. `"12pt"` or `"counter(chapter) '. '"`.
    pub text: String,
    /// Origin tag.
    pub origin: ValueOrigin,
}

impl StyleValue {
    /// A value declared by the author.
    #[must_use]
    pub fn specified(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: ValueOrigin::Specified,
        }
    }
}

/// Property name to value map of one element or pseudo-element.
///
/// Ordered by property name so that serialization and iteration are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap {
    values: BTreeMap<String, StyleValue>,
}

impl PropertyMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map of specified values from `(name, value)` pairs.
    #[must_use]
    pub fn from_declarations<'a>(decls: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut map = Self::new();
        for (name, value) in decls {
            map.set_specified(name, value);
        }
        map
    }

    /// Record a specified value, replacing any previous value.
    pub fn set_specified(&mut self, name: &str, value: &str) {
        self.insert(name, StyleValue::specified(value.trim()));
    }

    /// Insert a value with an explicit origin.
    pub fn insert(&mut self, name: &str, value: StyleValue) {
        let _ = self.values.insert(name.to_ascii_lowercase(), value);
    }

    /// Full entry for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.values.get(name)
    }

    /// Value text for `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|v| v.text.as_str())
    }

    /// Value text for `name`, only if the author declared it on this element.
    #[must_use]
    pub fn specified(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .filter(|v| v.origin == ValueOrigin::Specified)
            .map(|v| v.text.as_str())
    }

    /// Whether `name` has any value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate in property-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Pseudo-elements that can generate boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoElement {
    /// `::before`
    Before,
    /// `::after`
    After,
}

/// Property maps attached to one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStyle {
    /// The element's own properties.
    pub element: PropertyMap,
    /// `::before` properties, if any were declared.
    pub before: Option<PropertyMap>,
    /// `::after` properties, if any were declared.
    pub after: Option<PropertyMap>,
}

/// Inherited properties the layout engine reads.
///
/// [§ 7.2 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
/// Each property's definition table states whether it is inherited.
pub const INHERITED_PROPERTIES: &[&str] = &[
    "border-collapse",
    "border-spacing",
    "color",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "line-height",
    "list-style-position",
    "list-style-type",
    "orphans",
    "quotes",
    "text-align",
    "text-indent",
    "visibility",
    "white-space",
    "widows",
];

/// Whether `name` inherits by default.
#[must_use]
pub fn is_inherited(name: &str) -> bool {
    INHERITED_PROPERTIES.binary_search(&name).is_ok()
}

/// Initial value of an inherited property, as it is stored on the root.
#[must_use]
pub fn initial_value(name: &str) -> Option<&'static str> {
    Some(match name {
        "border-collapse" => "separate",
        "border-spacing" | "text-indent" => "0px",
        "color" => "black",
        "font-family" => "serif",
        "font-size" => "16px",
        "font-style" | "font-weight" | "line-height" | "white-space" => "normal",
        "list-style-position" => "outside",
        "list-style-type" => "disc",
        "orphans" | "widows" => "2",
        "quotes" => "auto",
        "text-align" => "start",
        "visibility" => "visible",
        _ => return None,
    })
}

/// Root font size used for `rem` and the `medium` keyword.
const MEDIUM_FONT_SIZE: f32 = 16.0;

/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// Absolutize a `font-size` value against the parent's computed size.
/// Relative units must be resolved before inheritance, otherwise `1.2em`
/// would compound at every level.
fn absolute_font_size(text: &str, parent_px: f32) -> Option<f32> {
    let text = text.trim();
    let keyword = match text {
        "xx-small" => Some(MEDIUM_FONT_SIZE * 3.0 / 5.0),
        "x-small" => Some(MEDIUM_FONT_SIZE * 3.0 / 4.0),
        "small" => Some(MEDIUM_FONT_SIZE * 8.0 / 9.0),
        "medium" => Some(MEDIUM_FONT_SIZE),
        "large" => Some(MEDIUM_FONT_SIZE * 6.0 / 5.0),
        "x-large" => Some(MEDIUM_FONT_SIZE * 3.0 / 2.0),
        "xx-large" => Some(MEDIUM_FONT_SIZE * 2.0),
        "smaller" => Some(parent_px / 1.2),
        "larger" => Some(parent_px * 1.2),
        _ => None,
    };
    if keyword.is_some() {
        return keyword;
    }
    let (number, unit) = split_number(text)?;
    Some(match unit {
        "px" => number,
        "em" => number * parent_px,
        "rem" => number * MEDIUM_FONT_SIZE,
        "%" => number * parent_px / 100.0,
        "pt" => number * 96.0 / 72.0,
        "pc" => number * 16.0,
        "in" => number * 96.0,
        "cm" => number * 96.0 / 2.54,
        "mm" => number * 96.0 / 25.4,
        _ => return None,
    })
}

/// Split `"1.5em"` into `(1.5, "em")`.
fn split_number(text: &str) -> Option<(f32, &str)> {
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(text.len());
    let number = text[..end].parse::<f32>().ok()?;
    Some((number, &text[end..]))
}

fn format_px(px: f32) -> String {
    format!("{}px", (px * 1000.0).round() / 1000.0)
}

/// Resolve `font-size` and `line-height` on `map` in place, then fill in
/// inherited and initial values from `parent`.
fn resolve_map(map: &mut PropertyMap, parent: Option<&PropertyMap>) {
    let parent_font_px = parent
        .and_then(|p| p.value("font-size"))
        .and_then(|v| absolute_font_size(v, MEDIUM_FONT_SIZE))
        .unwrap_or(MEDIUM_FONT_SIZE);

    if let Some(size) = map.specified("font-size").map(str::to_string) {
        // Invalid sizes fall back to the inherited size.
        match absolute_font_size(&size, parent_font_px) {
            Some(px) if px >= 0.0 => map.set_specified("font-size", &format_px(px)),
            _ => {
                let _ = map.values.remove("font-size");
            }
        }
    }

    // [§ 4.2 line-height](https://www.w3.org/TR/css-inline-3/#line-height-property)
    // Lengths and percentages inherit as absolute lengths; numbers inherit
    // as numbers.
    if let Some(lh) = map.specified("line-height").map(str::to_string) {
        let own_font_px = map
            .value("font-size")
            .and_then(|v| absolute_font_size(v, parent_font_px))
            .unwrap_or(parent_font_px);
        let px = match split_number(&lh) {
            Some((number, "em")) => Some(number * own_font_px),
            Some((number, "rem")) => Some(number * MEDIUM_FONT_SIZE),
            Some((number, "%")) => Some(number * own_font_px / 100.0),
            _ => None,
        };
        if let Some(px) = px {
            map.set_specified("line-height", &format_px(px));
        }
    }

    for &name in INHERITED_PROPERTIES {
        let explicit = map.specified(name).map(str::to_string);
        // [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
        let inherit = match explicit.as_deref() {
            None | Some("inherit" | "unset") => true,
            Some("initial") => false,
            Some(_) => continue,
        };
        let inherited = if inherit {
            parent.and_then(|p| p.get(name)).map(|v| StyleValue {
                text: v.text.clone(),
                origin: ValueOrigin::Inherited,
            })
        } else {
            None
        };
        let value = inherited.or_else(|| {
            initial_value(name).map(|text| StyleValue {
                text: text.to_string(),
                origin: ValueOrigin::Initial,
            })
        });
        if let Some(value) = value {
            map.insert(name, value);
        }
    }
}

/// Collects property maps for a [`DomTree`] before inheritance runs.
#[derive(Debug, Clone)]
pub struct StyledTreeBuilder {
    dom: DomTree,
    styles: HashMap<NodeId, NodeStyle>,
    base_url: Option<String>,
}

impl StyledTreeBuilder {
    /// Start styling `dom`.
    #[must_use]
    pub fn new(dom: DomTree) -> Self {
        Self {
            dom,
            styles: HashMap::new(),
            base_url: None,
        }
    }

    /// Mutable access to the DOM while it is still being assembled.
    pub const fn dom_mut(&mut self) -> &mut DomTree {
        &mut self.dom
    }

    /// Set the document's base URL, used to resolve links and imports.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Replace the element map of `node`.
    pub fn set_style(&mut self, node: NodeId, map: PropertyMap) {
        self.styles.entry(node).or_default().element = map;
    }

    /// Replace a pseudo-element map of `node`.
    pub fn set_pseudo(&mut self, node: NodeId, pseudo: PseudoElement, map: PropertyMap) {
        let style = self.styles.entry(node).or_default();
        match pseudo {
            PseudoElement::Before => style.before = Some(map),
            PseudoElement::After => style.after = Some(map),
        }
    }

    /// Run inheritance top-down and freeze the result.
    ///
    /// Every element ends up with a value for every property in
    /// [`INHERITED_PROPERTIES`], tagged with its origin. Pseudo-elements
    /// inherit from their originating element.
    #[must_use]
    pub fn build(mut self) -> StyledTree {
        let order = self.dom.descendants(NodeId::ROOT);
        for node in order {
            if self.dom.as_element(node).is_none() {
                continue;
            }
            let parent_map = self
                .dom
                .ancestors(node)
                .find(|&a| self.dom.as_element(a).is_some())
                .and_then(|a| self.styles.get(&a))
                .map(|s| s.element.clone());

            let style = self.styles.entry(node).or_default();
            resolve_map(&mut style.element, parent_map.as_ref());
            let element = style.element.clone();
            if let Some(before) = style.before.as_mut() {
                resolve_map(before, Some(&element));
            }
            if let Some(after) = style.after.as_mut() {
                resolve_map(after, Some(&element));
            }
        }

        StyledTree {
            dom: self.dom,
            styles: self.styles,
            base_url: self.base_url,
            empty: PropertyMap::new(),
        }
    }
}

/// A DOM tree whose elements carry fully inherited property maps.
///
/// Read-only: build a new one with [`StyledTreeBuilder`] to change styles.
#[derive(Debug, Clone)]
pub struct StyledTree {
    dom: DomTree,
    styles: HashMap<NodeId, NodeStyle>,
    base_url: Option<String>,
    empty: PropertyMap,
}

impl StyledTree {
    /// The underlying DOM.
    #[must_use]
    pub const fn dom(&self) -> &DomTree {
        &self.dom
    }

    /// The document's base URL.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Properties of `node`.
    ///
    /// Text nodes use their parent element's map; nodes without styles get
    /// an empty map.
    #[must_use]
    pub fn style(&self, node: NodeId) -> &PropertyMap {
        let element = if self.dom.as_text(node).is_some() {
            self.dom.parent(node).unwrap_or(node)
        } else {
            node
        };
        self.styles.get(&element).map_or(&self.empty, |s| &s.element)
    }

    /// Properties of a pseudo-element of `node`, if declared.
    #[must_use]
    pub fn pseudo(&self, node: NodeId, pseudo: PseudoElement) -> Option<&PropertyMap> {
        let style = self.styles.get(&node)?;
        match pseudo {
            PseudoElement::Before => style.before.as_ref(),
            PseudoElement::After => style.after.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inherited_list_is_sorted_for_binary_search() {
        let mut sorted = INHERITED_PROPERTIES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, INHERITED_PROPERTIES);
        assert!(is_inherited("orphans"));
        assert!(!is_inherited("margin-top"));
    }

    #[test]
    fn font_size_units() {
        assert_eq!(absolute_font_size("2em", 10.0), Some(20.0));
        assert_eq!(absolute_font_size("150%", 10.0), Some(15.0));
        assert_eq!(absolute_font_size("12pt", 10.0), Some(16.0));
        assert_eq!(absolute_font_size("medium", 99.0), Some(16.0));
        assert_eq!(absolute_font_size("bogus", 10.0), None);
    }
}
