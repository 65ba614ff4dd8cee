//! Arena DOM tree.
//!
//! [DOM Living Standard § 4 Nodes](https://dom.spec.whatwg.org/#nodes)
//!
//! Only what layout reads is modelled: a document node, elements with their
//! local name and attributes, and text. Nodes are appended once while the
//! input is read and never move afterwards, so siblings are found through the
//! parent's child list instead of being stored per node.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attributes of an element, ordered by name.
pub type AttributesMap = BTreeMap<String, String>;

/// Index of a node in its [`DomTree`].
///
/// Boxes and fragments carry the id of the node that generated them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document node.
    pub const ROOT: Self = Self(0);
}

/// One node of the arena.
#[derive(Debug, Clone)]
pub struct Node {
    /// Document, element or text.
    pub node_type: NodeType,
    /// [§ 4.2.1 Trees](https://dom.spec.whatwg.org/#concept-tree-parent)
    pub parent: Option<NodeId>,
    /// Children in tree order.
    pub children: Vec<NodeId>,
}

/// The node kinds that reach layout. Comments, doctypes and processing
/// instructions are dropped by whoever builds the tree.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// The document, always [`NodeId::ROOT`].
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// Character data.
    Text(String),
}

/// Local name and attributes of an element.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// Lowercased local name. Namespaces play no part in layout.
    pub tag_name: String,
    /// Attribute values by name.
    pub attrs: AttributesMap,
}

impl ElementData {
    /// An element `tag` without attributes.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag_name: tag.to_ascii_lowercase(),
            attrs: AttributesMap::new(),
        }
    }

    /// [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes)
    ///
    /// The `id` attribute, the target of fragment links and
    /// `target-counter()`.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Value of attribute `name`.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Whether this is a `tag` element.
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }
}

/// Nodes stored in one vector and linked by [`NodeId`].
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// A tree holding only the document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                node_type: NodeType::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The node `id`, if it belongs to this tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, the document included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node is created with the tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a detached node and return its id.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    /// [§ 4.2.3 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Make `child` the last child of `parent`. Unknown ids and nodes that
    /// already have a parent are left alone.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let known = |id: NodeId| id.0 < self.nodes.len();
        if !known(parent) || !known(child) || parent == child {
            return;
        }
        if self.nodes[child.0].parent.is_some() {
            return;
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Parent of `id`.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Children of `id` in tree order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| &n.children)
    }

    /// First child of `id`.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// The sibling after `id`.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let at = siblings.iter().position(|&s| s == id)?;
        siblings.get(at + 1).copied()
    }

    /// The sibling before `id`.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let at = siblings.iter().position(|&s| s == id)?;
        at.checked_sub(1).map(|i| siblings[i])
    }

    /// Ancestors of `id`, nearest first, ending with the document.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&a| self.parent(a))
    }

    /// Nodes below `id` in tree order, `id` itself excluded.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Element data of `id`, if it is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.get(id)?.node_type {
            NodeType::Element(data) => Some(data),
            NodeType::Document | NodeType::Text(_) => None,
        }
    }

    /// Character data of `id`, if it is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.node_type {
            NodeType::Text(text) => Some(text),
            NodeType::Document | NodeType::Element(_) => None,
        }
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// The text of `id` and all text below it, in tree order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        match self.as_text(id) {
            Some(text) => text.to_string(),
            None => self
                .descendants(id)
                .into_iter()
                .filter_map(|n| self.as_text(n))
                .collect(),
        }
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// The first element child of the document.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|&id| self.as_element(id).is_some())
    }

    /// The first element in tree order whose `id` attribute is `id`.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(NodeId::ROOT)
            .into_iter()
            .find(|&n| self.as_element(n).and_then(ElementData::id) == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
        let id = tree.alloc(NodeType::Element(ElementData::new(tag)));
        tree.append_child(parent, id);
        id
    }

    #[test]
    fn test_siblings_follow_child_order() {
        let mut tree = DomTree::new();
        let html = element(&mut tree, NodeId::ROOT, "HTML");
        let a = element(&mut tree, html, "p");
        let b = element(&mut tree, html, "p");

        assert_eq!(tree.document_element(), Some(html));
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.prev_sibling(b), Some(a));
        assert_eq!(tree.prev_sibling(a), None);
        assert_eq!(tree.ancestors(b).collect::<Vec<_>>(), [html, NodeId::ROOT]);
        assert!(tree.as_element(html).is_some_and(|e| e.is("html")));
    }

    #[test]
    fn test_append_is_ignored_for_attached_nodes() {
        let mut tree = DomTree::new();
        let html = element(&mut tree, NodeId::ROOT, "html");
        let p = element(&mut tree, html, "p");
        tree.append_child(NodeId::ROOT, p);
        tree.append_child(NodeId(99), p);
        assert_eq!(tree.parent(p), Some(html));
        assert_eq!(tree.children(NodeId::ROOT), [html]);
    }
}
