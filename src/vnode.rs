//! Virtual nodes: immutable descriptions of the desired tree, freshly produced by every render.

use crate::{
	component::ComponentType,
	value::{Key, Props, Value},
};
use hashbrown::HashMap;

/// Attributes of a [`VElement`], by name as written (`className`, `onClick` etc. are resolved by [`crate::attribute::resolve`]).
pub type Attributes = HashMap<String, Value>;

#[derive(Debug, Clone)]
pub enum VNode {
	Text(String),
	Element(VElement),
	Component(VComponent),
}

impl VNode {
	pub fn text(text: impl Into<String>) -> Self {
		VNode::Text(text.into())
	}

	#[must_use]
	pub fn key(&self) -> Option<&Key> {
		match self {
			VNode::Text(_) => None,
			VNode::Element(element) => element.key.as_ref(),
			VNode::Component(component) => component.key.as_ref(),
		}
	}
}

/// Shorthand for [`VElement::new`].
pub fn h(tag: impl Into<String>) -> VElement {
	VElement::new(tag)
}

#[derive(Debug, Clone)]
pub struct VElement {
	pub tag: String,
	pub key: Option<Key>,
	pub attrs: Attributes,
	pub children: Vec<VNode>,
}

impl VElement {
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			key: None,
			attrs: Attributes::new(),
			children: Vec::new(),
		}
	}

	#[must_use]
	pub fn key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	#[must_use]
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attrs.insert(name.into(), value.into());
		self
	}

	#[must_use]
	pub fn child(mut self, child: impl Into<VNode>) -> Self {
		self.children.push(child.into());
		self
	}

	#[must_use]
	pub fn children<I>(mut self, children: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<VNode>,
	{
		self.children.extend(children.into_iter().map(Into::into));
		self
	}
}

/// A virtual node whose subtree is produced by a component.
#[derive(Debug, Clone)]
pub struct VComponent {
	pub ty: ComponentType,
	pub key: Option<Key>,
	pub props: Props,
}

impl VComponent {
	#[must_use]
	pub fn new(ty: &ComponentType) -> Self {
		Self {
			ty: ty.clone(),
			key: None,
			props: Props::new(),
		}
	}

	#[must_use]
	pub fn key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	#[must_use]
	pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.props.insert(name.into(), value.into());
		self
	}

	#[must_use]
	pub fn props(mut self, props: Props) -> Self {
		self.props.extend(props);
		self
	}
}

impl From<VElement> for VNode {
	fn from(element: VElement) -> Self {
		VNode::Element(element)
	}
}

impl From<VComponent> for VNode {
	fn from(component: VComponent) -> Self {
		VNode::Component(component)
	}
}

impl From<&str> for VNode {
	fn from(text: &str) -> Self {
		VNode::Text(text.to_owned())
	}
}

impl From<String> for VNode {
	fn from(text: String) -> Self {
		VNode::Text(text)
	}
}

/// Booleans render as empty text, so `condition && …`-style children keep their position.
impl From<bool> for VNode {
	fn from(_: bool) -> Self {
		VNode::Text(String::new())
	}
}

impl From<f64> for VNode {
	fn from(number: f64) -> Self {
		VNode::Text(number.to_string())
	}
}

impl From<i32> for VNode {
	fn from(number: i32) -> Self {
		VNode::Text(number.to_string())
	}
}

impl From<i64> for VNode {
	fn from(number: i64) -> Self {
		VNode::Text(number.to_string())
	}
}

impl From<usize> for VNode {
	fn from(number: usize) -> Self {
		VNode::Text(number.to_string())
	}
}

/// Absent nodes render as empty text.
impl<T: Into<VNode>> From<Option<T>> for VNode {
	fn from(node: Option<T>) -> Self {
		node.map_or_else(|| VNode::Text(String::new()), Into::into)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn text_of(node: VNode) -> String {
		match node {
			VNode::Text(text) => text,
			other => panic!("expected text, found {:?}", other),
		}
	}

	#[test]
	fn primitives_normalize_to_text() {
		assert_eq!(text_of(None::<&str>.into()), "");
		assert_eq!(text_of(true.into()), "");
		assert_eq!(text_of(false.into()), "");
		assert_eq!(text_of(2.0.into()), "2");
		assert_eq!(text_of(1.5.into()), "1.5");
		assert_eq!(text_of(7.into()), "7");
		assert_eq!(text_of(Some("x").into()), "x");
	}

	#[test]
	fn builder_collects_children_and_key() {
		let node: VNode = h("ul").key(3).children(vec!["a", "b"]).child(h("li")).into();
		assert_eq!(node.key(), Some(&Key::Number(3)));
		match node {
			VNode::Element(element) => assert_eq!(element.children.len(), 3),
			other => panic!("expected element, found {:?}", other),
		}
	}
}
