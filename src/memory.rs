//! A headless, arena-backed live tree that records every mutation it receives.
//!
//! Useful to count mutations in tests and to render without a browser.

use crate::{
	adapter::{NodeAdapter, NodeKind},
	attribute::{self, AttributeKind},
	value::Value,
};
use core::any::Any;
use std::fmt::Write as _;
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
	#[must_use]
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

/// One primitive operation applied to a [`MemoryDom`].
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
	CreateElement { node: NodeId, tag: String },
	CreateText { node: NodeId },
	SetText { node: NodeId },
	SetAttribute { node: NodeId, name: String },
	RemoveAttribute { node: NodeId, name: String },
	AppendChild { parent: NodeId, child: NodeId },
	InsertBefore { parent: NodeId, child: NodeId, reference: NodeId },
	ReplaceChild { parent: NodeId, new_child: NodeId, old_child: NodeId },
	RemoveNode { node: NodeId },
}

impl Mutation {
	#[must_use]
	pub fn is_creation(&self) -> bool {
		matches!(self, Mutation::CreateElement { .. } | Mutation::CreateText { .. })
	}

	#[must_use]
	pub fn is_attribute(&self) -> bool {
		matches!(self, Mutation::SetAttribute { .. } | Mutation::RemoveAttribute { .. })
	}
}

#[derive(Debug)]
enum Content {
	Text(String),
	Element { tag: String, attributes: Vec<(String, Value)> },
}

#[derive(Debug)]
struct MemoryNode {
	content: Content,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

/// # Panics
///
/// All operations panic when given a [`NodeId`] that wasn't created by the same [`MemoryDom`],
/// and structural operations panic when asked to treat a text node as a parent.
#[derive(Debug, Default)]
pub struct MemoryDom {
	nodes: Vec<MemoryNode>,
	mutations: Vec<Mutation>,
}

impl MemoryDom {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Every mutation since creation or the last [`take_mutations`](`MemoryDom::take_mutations`), in order.
	#[must_use]
	pub fn mutations(&self) -> &[Mutation] {
		&self.mutations
	}

	pub fn take_mutations(&mut self) -> Vec<Mutation> {
		std::mem::take(&mut self.mutations)
	}

	/// Serializes `node` and its subtree as HTML-like markup. Handlers are omitted, attributes appear in the order they were first set.
	#[must_use]
	pub fn to_markup(&self, node: NodeId) -> String {
		let mut markup = String::new();
		self.write_markup(node, &mut markup);
		markup
	}

	/// [`to_markup`](`MemoryDom::to_markup`) of each child of `node`, concatenated.
	#[must_use]
	pub fn inner_markup(&self, node: NodeId) -> String {
		let mut markup = String::new();
		for &child in &self.node(node).children {
			self.write_markup(child, &mut markup);
		}
		markup
	}

	/// Calls the handler attached to `node` for `event_type` (`"click"` for `onClick`), if any.
	///
	/// Returns whether a handler was called.
	pub fn dispatch(&self, node: NodeId, event_type: &str, event: &dyn Any) -> bool {
		let name = format!("on{}", event_type.to_ascii_lowercase());
		let handler = match &self.node(node).content {
			Content::Element { attributes, .. } => attributes.iter().find(|(n, _)| *n == name).and_then(|(_, value)| value.as_handler()).cloned(),
			Content::Text(_) => None,
		};
		match handler {
			Some(handler) => {
				trace!(?node, event_type, "Dispatching event.");
				handler.call(event);
				true
			}
			None => false,
		}
	}

	/// The value of attribute `name` (canonical spelling) of `node`.
	#[must_use]
	pub fn attribute(&self, node: NodeId, name: &str) -> Option<&Value> {
		match &self.node(node).content {
			Content::Element { attributes, .. } => attributes.iter().find(|(n, _)| n == name).map(|(_, value)| value),
			Content::Text(_) => None,
		}
	}

	/// Number of nodes ever created.
	#[must_use]
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	fn node(&self, id: NodeId) -> &MemoryNode {
		self.nodes.get(id.index()).unwrap_or_else(|| panic!("{:?} doesn't belong to this `MemoryDom`", id))
	}

	fn node_mut(&mut self, id: NodeId) -> &mut MemoryNode {
		self.nodes.get_mut(id.index()).unwrap_or_else(|| panic!("{:?} doesn't belong to this `MemoryDom`", id))
	}

	fn push(&mut self, content: Content) -> NodeId {
		let id = NodeId(self.nodes.len() as u32);
		self.nodes.push(MemoryNode {
			content,
			parent: None,
			children: Vec::new(),
		});
		id
	}

	fn detach(&mut self, child: NodeId) {
		if let Some(parent) = self.node_mut(child).parent.take() {
			self.node_mut(parent).children.retain(|&c| c != child);
		}
	}

	fn assert_element(&self, parent: NodeId) {
		assert!(matches!(self.node(parent).content, Content::Element { .. }), "{:?} is a text node and can't have children", parent);
	}

	fn write_markup(&self, node: NodeId, markup: &mut String) {
		let node = self.node(node);
		match &node.content {
			Content::Text(text) => escape_into(text, markup),
			Content::Element { tag, attributes } => {
				markup.push('<');
				markup.push_str(tag);
				for (name, value) in attributes {
					if let Some(value) = markup_value(value) {
						write!(markup, " {}=\"", name).expect("infallible");
						escape_into(&value, markup);
						markup.push('"');
					}
				}
				markup.push('>');
				for &child in &node.children {
					self.write_markup(child, markup);
				}
				write!(markup, "</{}>", tag).expect("infallible");
			}
		}
	}
}

fn markup_value(value: &Value) -> Option<String> {
	match value {
		Value::Style(style) => {
			let mut declarations: Vec<_> = style.iter().filter_map(|(property, value)| Some((property, css_value(value)?))).collect();
			declarations.sort();
			Some(declarations.into_iter().map(|(property, value)| format!("{}: {};", property, value)).collect::<Vec<_>>().join(" "))
		}
		other => other.to_attribute_string().map(Into::into),
	}
}

/// Numbers are pixel lengths.
pub(crate) fn css_value(value: &Value) -> Option<String> {
	match value {
		Value::Number(number) => Some(format!("{}px", number)),
		other => other.to_attribute_string().map(Into::into),
	}
}

fn escape_into(text: &str, markup: &mut String) {
	for c in text.chars() {
		match c {
			'<' => markup.push_str("&lt;"),
			'>' => markup.push_str("&gt;"),
			'&' => markup.push_str("&amp;"),
			'"' => markup.push_str("&quot;"),
			c => markup.push(c),
		}
	}
}

impl NodeAdapter for MemoryDom {
	type Node = NodeId;

	fn create_element(&mut self, tag: &str) -> NodeId {
		let node = self.push(Content::Element {
			tag: tag.to_owned(),
			attributes: Vec::new(),
		});
		self.mutations.push(Mutation::CreateElement { node, tag: tag.to_owned() });
		node
	}

	fn create_text(&mut self, text: &str) -> NodeId {
		let node = self.push(Content::Text(text.to_owned()));
		self.mutations.push(Mutation::CreateText { node });
		node
	}

	fn node_kind(&self, node: &NodeId) -> NodeKind {
		match &self.node(*node).content {
			Content::Text(_) => NodeKind::Text,
			Content::Element { tag, .. } => NodeKind::Element(tag.clone()),
		}
	}

	fn text(&self, node: &NodeId) -> String {
		match &self.node(*node).content {
			Content::Text(text) => text.clone(),
			Content::Element { .. } => {
				let mut text = String::new();
				for child in &self.node(*node).children {
					text.push_str(&self.text(child));
				}
				text
			}
		}
	}

	fn set_text(&mut self, node: &NodeId, text: &str) {
		match &mut self.node_mut(*node).content {
			Content::Text(content) => *content = text.to_owned(),
			Content::Element { .. } => panic!("{:?} is an element, not a text node", node),
		}
		self.mutations.push(Mutation::SetText { node: *node });
	}

	fn attributes(&self, node: &NodeId) -> Vec<(String, Value)> {
		match &self.node(*node).content {
			Content::Element { attributes, .. } => attributes.clone(),
			Content::Text(_) => Vec::new(),
		}
	}

	fn set_attribute(&mut self, node: &NodeId, name: &str, value: Option<&Value>) {
		let resolved = attribute::resolve(name);
		let applicable = match value {
			None | Some(Value::Bool(false)) => false,
			Some(Value::Handler(_)) => resolved.kind == AttributeKind::EventHandler,
			Some(Value::Style(_)) => resolved.kind == AttributeKind::Style,
			Some(Value::Text(_)) => resolved.kind != AttributeKind::EventHandler,
			Some(Value::Number(_)) | Some(Value::Bool(true)) => resolved.kind == AttributeKind::Plain,
		};
		let value = match value {
			Some(value) if applicable => Some(value.clone()),
			Some(value) if *value != Value::Bool(false) => {
				if cfg!(feature = "dangerous-logging") {
					warn!(kind = ?resolved.kind, ?value, "Value can't be applied to this attribute; removing it instead.");
				} else {
					warn!(kind = ?resolved.kind, "Value can't be applied to this attribute; removing it instead.");
				}
				None
			}
			_ => None,
		};

		let attributes = match &mut self.node_mut(*node).content {
			Content::Element { attributes, .. } => attributes,
			Content::Text(_) => panic!("{:?} is a text node and has no attributes", node),
		};
		let name = resolved.name.into_owned();
		let position = attributes.iter().position(|(n, _)| *n == name);
		let mutation = match (position, value) {
			(Some(position), Some(value)) => {
				attributes[position].1 = value;
				Mutation::SetAttribute { node: *node, name }
			}
			(None, Some(value)) => {
				attributes.push((name.clone(), value));
				Mutation::SetAttribute { node: *node, name }
			}
			(position, None) => {
				if let Some(position) = position {
					attributes.remove(position);
				}
				Mutation::RemoveAttribute { node: *node, name }
			}
		};
		self.mutations.push(mutation);
	}

	fn parent(&self, node: &NodeId) -> Option<NodeId> {
		self.node(*node).parent
	}

	fn children(&self, node: &NodeId) -> Vec<NodeId> {
		self.node(*node).children.clone()
	}

	fn child_at(&self, parent: &NodeId, index: usize) -> Option<NodeId> {
		self.node(*parent).children.get(index).copied()
	}

	fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
		let siblings = &self.node(self.node(*node).parent?).children;
		let index = siblings.iter().position(|sibling| sibling == node)?;
		siblings.get(index + 1).copied()
	}

	fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
		self.assert_element(*parent);
		self.detach(*child);
		self.node_mut(*parent).children.push(*child);
		self.node_mut(*child).parent = Some(*parent);
		self.mutations.push(Mutation::AppendChild { parent: *parent, child: *child });
	}

	fn insert_before(&mut self, parent: &NodeId, child: &NodeId, reference: &NodeId) {
		self.assert_element(*parent);
		self.detach(*child);
		let index = self
			.node(*parent)
			.children
			.iter()
			.position(|c| c == reference)
			.unwrap_or_else(|| panic!("{:?} is not a child of {:?}", reference, parent));
		self.node_mut(*parent).children.insert(index, *child);
		self.node_mut(*child).parent = Some(*parent);
		self.mutations.push(Mutation::InsertBefore {
			parent: *parent,
			child: *child,
			reference: *reference,
		});
	}

	fn replace_child(&mut self, parent: &NodeId, new_child: &NodeId, old_child: &NodeId) {
		self.assert_element(*parent);
		self.detach(*new_child);
		let index = self
			.node(*parent)
			.children
			.iter()
			.position(|c| c == old_child)
			.unwrap_or_else(|| panic!("{:?} is not a child of {:?}", old_child, parent));
		self.node_mut(*parent).children[index] = *new_child;
		self.node_mut(*new_child).parent = Some(*parent);
		self.node_mut(*old_child).parent = None;
		self.mutations.push(Mutation::ReplaceChild {
			parent: *parent,
			new_child: *new_child,
			old_child: *old_child,
		});
	}

	fn remove_node(&mut self, node: &NodeId) {
		if self.node(*node).parent.is_some() {
			self.detach(*node);
			self.mutations.push(Mutation::RemoveNode { node: *node });
		}
	}
}
