//! Styled DOM tree for the Quire layout engine.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), together with the
//! per-element property maps produced by an external style resolver.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues.
//!
//! Style values carry a [`ValueOrigin`] tag recording whether they were
//! specified by the author, inherited from the parent, or filled in from the
//! property's initial value. A [`StyledTree`] is produced by
//! [`StyledTreeBuilder::build`], which runs inheritance once; the result is
//! read-only.

mod input;
mod style;
mod tree;

pub use input::{DomError, StyledDocumentSpec, StyledNodeSpec};
pub use style::{
    INHERITED_PROPERTIES, NodeStyle, PropertyMap, PseudoElement, StyleValue, StyledTree,
    StyledTreeBuilder, ValueOrigin, initial_value, is_inherited,
};
pub use tree::{AttributesMap, DomTree, ElementData, Node, NodeId, NodeType};
