//! The capability interface over a live node tree.

use crate::value::Value;
use core::{fmt::Debug, hash::Hash};

/// Classification of a live node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	Text,
	/// An element, with its tag name as reported by the tree (possibly upper-cased).
	Element(String),
}

impl NodeKind {
	/// Whether this is an element whose tag matches `tag`, ignoring ASCII case.
	#[must_use]
	pub fn is_element(&self, tag: &str) -> bool {
		match self {
			NodeKind::Element(name) => name.eq_ignore_ascii_case(tag),
			NodeKind::Text => false,
		}
	}
}

/// Mutation and inspection primitives the reconciler drives a live tree through.
///
/// Every operation is assumed to succeed synchronously.
/// Implementations may panic on contract violations (foreign nodes, inserting a node into itself).
///
/// `append_child`, `insert_before` and `replace_child` move a node that is already attached elsewhere,
/// like their DOM namesakes.
pub trait NodeAdapter {
	/// A cheap handle with identity semantics.
	type Node: Clone + Eq + Hash + Debug;

	fn create_element(&mut self, tag: &str) -> Self::Node;
	fn create_text(&mut self, text: &str) -> Self::Node;

	fn node_kind(&self, node: &Self::Node) -> NodeKind;

	/// The content of a text node.
	fn text(&self, node: &Self::Node) -> String;
	fn set_text(&mut self, node: &Self::Node, text: &str);

	/// The currently set attributes of an element, by canonical name (see [`crate::attribute::resolve`]).
	fn attributes(&self, node: &Self::Node) -> Vec<(String, Value)>;

	/// Applies one attribute by canonical name. `None` removes it.
	///
	/// Event handler attachment and style maps are the adapter's business, see [`crate::attribute::AttributeKind`].
	fn set_attribute(&mut self, node: &Self::Node, name: &str, value: Option<&Value>);

	fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
	fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

	fn child_at(&self, parent: &Self::Node, index: usize) -> Option<Self::Node> {
		self.children(parent).get(index).cloned()
	}

	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node> {
		let parent = self.parent(node)?;
		let siblings = self.children(&parent);
		let index = siblings.iter().position(|sibling| sibling == node)?;
		siblings.get(index + 1).cloned()
	}

	fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);
	fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, reference: &Self::Node);
	fn replace_child(&mut self, parent: &Self::Node, new_child: &Self::Node, old_child: &Self::Node);

	/// Detaches `node` from its parent, if it has one.
	fn remove_node(&mut self, node: &Self::Node);

	/// `node` left the reconciler's control and won't be passed in again.
	///
	/// Called once per node of a discarded subtree, after its components were unmounted.
	fn discard(&mut self, _node: &Self::Node) {}

	/// Called at the end of each outermost reconciliation pass or state update.
	fn flush(&mut self) {}
}
