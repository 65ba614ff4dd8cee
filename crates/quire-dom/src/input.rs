//! JSON input format for styled documents.
//!
//! The external style resolver hands over one JSON object per document:
//!
//! ```json
//! {
//!   "base_url": "file:///book/index.html",
//!   "root": {
//!     "tag": "html",
//!     "children": [
//!       { "tag": "p", "attrs": { "id": "intro" },
//!         "style": { "margin-top": "20px" },
//!         "before": { "content": "counter(chapter) '. '" },
//!         "children": [ { "text": "Hello" } ] }
//!     ]
//!   }
//! }
//! ```
//!
//! A node is an element when it has `tag`, a text node when it has `text`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::style::{PropertyMap, PseudoElement, StyledTree, StyledTreeBuilder};
use crate::tree::{DomTree, ElementData, NodeId, NodeType};

/// Errors raised while reading a styled document.
#[derive(Debug, Error)]
pub enum DomError {
    /// The input is not valid JSON or does not match the node shape.
    #[error("malformed styled document: {0}")]
    Json(#[from] serde_json::Error),
    /// A node has neither `tag` nor `text`, or both.
    #[error("node at {path} must have exactly one of 'tag' or 'text'")]
    InvalidNode {
        /// Child-index path from the root, e.g. `root/0/3`.
        path: String,
    },
    /// The document root is not an element.
    #[error("document root must be an element")]
    RootNotElement,
}

/// One node of the input document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledNodeSpec {
    /// Element tag name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Text node content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Element attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    /// Declared properties of the element.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    /// Declared properties of `::before`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<BTreeMap<String, String>>,
    /// Declared properties of `::after`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<BTreeMap<String, String>>,
    /// Child nodes in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StyledNodeSpec>,
}

impl StyledNodeSpec {
    /// An element node.
    #[must_use]
    pub fn element(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            ..Self::default()
        }
    }

    /// A text node.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    /// Add a declared property, builder style.
    #[must_use]
    pub fn style(mut self, name: &str, value: &str) -> Self {
        let _ = self.style.insert(name.to_string(), value.to_string());
        self
    }

    /// Add an attribute, builder style.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let _ = self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Add a `::before` property, builder style.
    #[must_use]
    pub fn before(mut self, name: &str, value: &str) -> Self {
        let _ = self
            .before
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Add an `::after` property, builder style.
    #[must_use]
    pub fn after(mut self, name: &str, value: &str) -> Self {
        let _ = self
            .after
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Append a child, builder style.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

/// A whole input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledDocumentSpec {
    /// Base URL for relative references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// The document element.
    pub root: StyledNodeSpec,
}

impl StyledDocumentSpec {
    /// Wrap a root element.
    #[must_use]
    pub const fn new(root: StyledNodeSpec) -> Self {
        Self {
            base_url: None,
            root,
        }
    }

    /// Parse the JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Json`] if the text is not a valid document.
    pub fn from_json(text: &str) -> Result<Self, DomError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the DOM, attach property maps and run inheritance.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::RootNotElement`] if the root is a text node and
    /// [`DomError::InvalidNode`] for nodes that are neither element nor text.
    pub fn into_styled_tree(self) -> Result<StyledTree, DomError> {
        if self.root.tag.is_none() {
            return Err(DomError::RootNotElement);
        }
        let mut builder = StyledTreeBuilder::new(DomTree::new());
        if let Some(base) = self.base_url {
            builder = builder.base_url(base);
        }
        insert_node(&mut builder, NodeId::ROOT, self.root, "root")?;
        Ok(builder.build())
    }
}

fn to_map(decls: &BTreeMap<String, String>) -> PropertyMap {
    PropertyMap::from_declarations(decls.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

fn insert_node(
    builder: &mut StyledTreeBuilder,
    parent: NodeId,
    spec: StyledNodeSpec,
    path: &str,
) -> Result<(), DomError> {
    let id = match (spec.tag, spec.text) {
        (Some(tag), None) => {
            let mut data = ElementData::new(&tag);
            data.attrs.extend(spec.attrs);
            let id = builder.dom_mut().alloc(NodeType::Element(data));
            builder.set_style(id, to_map(&spec.style));
            if let Some(before) = &spec.before {
                builder.set_pseudo(id, PseudoElement::Before, to_map(before));
            }
            if let Some(after) = &spec.after {
                builder.set_pseudo(id, PseudoElement::After, to_map(after));
            }
            id
        }
        (None, Some(text)) => builder.dom_mut().alloc(NodeType::Text(text)),
        _ => {
            return Err(DomError::InvalidNode {
                path: path.to_string(),
            });
        }
    };
    builder.dom_mut().append_child(parent, id);

    for (i, child) in spec.children.into_iter().enumerate() {
        insert_node(builder, id, child, &format!("{path}/{i}"))?;
    }
    Ok(())
}
