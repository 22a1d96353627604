//! [`NodeAdapter`] over the browser DOM through [`web_sys`].
//!
//! Event handlers are bound through one JS closure per distinct [`Handler`], shared by all nodes it's attached to
//! and freed by [`flush`](`NodeAdapter::flush`) once no node uses it any more.

use crate::{
	adapter::{NodeAdapter, NodeKind},
	attribute::{self, AttributeKind},
	memory::css_value,
	rc_hash_map::RcHashMap,
	value::{Handler, Value},
};
use core::{
	cell::Cell,
	convert::TryFrom,
	hash::{Hash, Hasher},
};
use hashbrown::{hash_map::Entry, HashMap};
use js_sys::{Function, Reflect};
use tracing::{error, info, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue, UnwrapThrowExt};

/// Name of the expando property that carries a node's hash identity.
const IDENTITY_PROPERTY: &str = "__xylemDomId";

thread_local! {
	static NEXT_IDENTITY: Cell<u32> = Cell::new(1);
}

/// A [`web_sys::Node`] handle that compares and hashes by JS object identity.
#[derive(Debug, Clone)]
pub struct WebNode(web_sys::Node);

impl WebNode {
	#[must_use]
	pub fn new(node: web_sys::Node) -> Self {
		Self(node)
	}

	#[must_use]
	pub fn as_node(&self) -> &web_sys::Node {
		&self.0
	}

	#[must_use]
	pub fn into_node(self) -> web_sys::Node {
		self.0
	}

	/// Reads the identity stamped on the node, stamping a fresh one first if necessary.
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	fn identity(&self) -> u32 {
		let key = JsValue::from_str(IDENTITY_PROPERTY);
		let target: &JsValue = self.0.as_ref();
		if let Some(identity) = Reflect::get(target, &key).ok().and_then(|value| value.as_f64()) {
			return identity as u32;
		}

		let identity = NEXT_IDENTITY.with(|next| {
			let identity = next.get();
			next.set(identity.wrapping_add(1));
			identity
		});
		Reflect::set(target, &key, &JsValue::from(identity)).expect_throw("xylem-dom: Can't stamp identity on DOM node.");
		identity
	}
}

impl From<web_sys::Node> for WebNode {
	fn from(node: web_sys::Node) -> Self {
		Self(node)
	}
}

impl PartialEq for WebNode {
	fn eq(&self, other: &Self) -> bool {
		let this: &JsValue = self.0.as_ref();
		let other: &JsValue = other.0.as_ref();
		this == other
	}
}
impl Eq for WebNode {}

impl Hash for WebNode {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.identity().hash(state)
	}
}

/// Drives a [`web_sys::Document`]'s nodes.
pub struct WebAdapter {
	document: web_sys::Document,
	listeners: RcHashMap<usize, u16, Closure<dyn Fn(web_sys::Event)>>,
	/// Handlers currently bound per node, by canonical attribute name.
	bindings: HashMap<WebNode, Vec<(String, Handler)>>,
	/// Last applied attribute values, since the DOM can't report handlers and style maps faithfully.
	applied: HashMap<WebNode, HashMap<String, Value>>,
}

impl WebAdapter {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self {
			document,
			listeners: RcHashMap::new(),
			bindings: HashMap::new(),
			applied: HashMap::new(),
		}
	}

	/// An adapter for the document `node` belongs to.
	#[must_use]
	pub fn for_node(node: &web_sys::Node) -> Self {
		Self::new(node.owner_document().expect_throw("xylem-dom: No owner document found for node."))
	}

	/// Number of distinct handlers currently backed by a JS closure.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	fn bind_handler(&mut self, node: &WebNode, element: &web_sys::Element, name: &str, event_type: &str, handler: Option<&Handler>) {
		let bindings = self.bindings.entry(node.clone()).or_default();

		if let Some(index) = bindings.iter().position(|(bound, _)| bound == name) {
			let (_, previous) = bindings.remove(index);
			match self.listeners.release(&previous.key()) {
				Ok(Some(listener)) => {
					trace!(event_type, "Removing event listener.");
					element
						.remove_event_listener_with_callback(event_type, listener.as_ref().unchecked_ref::<Function>())
						.unwrap_throw();
				}
				Ok(None) => error!("xylem-dom bug: Bound handler without listener."),
				Err(_) => error!("xylem-dom bug: Listener released more often than acquired."),
			}
		}

		if let Some(handler) = handler {
			let listener = self
				.listeners
				.acquire_or_insert_with(handler.key(), || {
					let handler = handler.clone();
					Closure::wrap(Box::new(move |event: web_sys::Event| handler.call(&event)) as Box<dyn Fn(web_sys::Event)>)
				})
				.expect_throw("Too many (more than 65k) active bindings of the same `Handler`");
			trace!(event_type, "Adding event listener.");
			element
				.add_event_listener_with_callback(event_type, listener.as_ref().unchecked_ref::<Function>())
				.unwrap_throw();
			bindings.push((name.to_owned(), handler.clone()));
		}

		if bindings.is_empty() {
			self.bindings.remove(node);
		}
	}

	fn apply_style(element: &web_sys::Element, value: Option<&Value>) {
		let style = match element.dyn_ref::<web_sys::HtmlElement>() {
			Some(element) => element.style(),
			None => return warn!("Style can only be applied to HTML elements."),
		};

		match value {
			None | Some(Value::Bool(false)) => style.set_css_text(""),
			Some(Value::Text(css)) => style.set_css_text(css),
			Some(Value::Style(map)) => {
				style.set_css_text("");
				for (property, value) in map.iter() {
					let value = css_value(value).unwrap_or_default();
					style.set_property(property, &value).unwrap_throw();
				}
			}
			Some(_) => warn!("Unsupported style value."),
		}
	}
}

fn dom_attributes(element: &web_sys::Element) -> HashMap<String, Value> {
	let attributes = element.attributes();
	(0..attributes.length())
		.filter_map(|i| attributes.item(i))
		.map(|attribute| (attribute.name(), Value::from(attribute.value())))
		.collect()
}

impl NodeAdapter for WebAdapter {
	type Node = WebNode;

	fn create_element(&mut self, tag: &str) -> WebNode {
		let element = self.document.create_element(tag).unwrap_throw();
		let node: &web_sys::Node = element.as_ref();
		WebNode(node.clone())
	}

	fn create_text(&mut self, text: &str) -> WebNode {
		WebNode(self.document.create_text_node(text).into())
	}

	fn node_kind(&self, node: &WebNode) -> NodeKind {
		match node.0.dyn_ref::<web_sys::Element>() {
			Some(element) => NodeKind::Element(element.local_name()),
			None => NodeKind::Text,
		}
	}

	fn text(&self, node: &WebNode) -> String {
		node.0.text_content().unwrap_or_default()
	}

	fn set_text(&mut self, node: &WebNode, text: &str) {
		node.0.set_text_content(Some(text))
	}

	fn attributes(&self, node: &WebNode) -> Vec<(String, Value)> {
		if let Some(applied) = self.applied.get(node) {
			return applied.iter().map(|(name, value)| (name.clone(), value.clone())).collect();
		}
		match node.0.dyn_ref::<web_sys::Element>() {
			Some(element) => dom_attributes(element).into_iter().collect(),
			None => Vec::new(),
		}
	}

	#[instrument(skip(self, value))]
	fn set_attribute(&mut self, node: &WebNode, name: &str, value: Option<&Value>) {
		let element = match node.0.dyn_ref::<web_sys::Element>() {
			Some(element) => element.clone(),
			None => return error!("Tried to set an attribute on a non-element node."),
		};
		let resolved = attribute::resolve(name);

		match resolved.kind {
			AttributeKind::EventHandler => {
				let handler = match value {
					Some(Value::Handler(handler)) => Some(handler),
					None | Some(Value::Bool(false)) => None,
					Some(_) => {
						warn!("Event handler attributes only accept handlers.");
						None
					}
				};
				let event_type = resolved.event_type().unwrap_or_default();
				self.bind_handler(node, &element, &resolved.name, event_type, handler);
			}
			AttributeKind::Style => Self::apply_style(&element, value),
			AttributeKind::Plain => match value.and_then(Value::to_attribute_string) {
				Some(text) => element.set_attribute(&resolved.name, &text).unwrap_throw(),
				None => element.remove_attribute(&resolved.name).unwrap_throw(),
			},
		}

		let applied = match self.applied.entry(node.clone()) {
			Entry::Occupied(occupied) => occupied.into_mut(),
			Entry::Vacant(vacant) => vacant.insert(dom_attributes(&element)),
		};
		match value {
			Some(value) if *value != Value::Bool(false) => {
				applied.insert(resolved.name.into_owned(), value.clone());
			}
			_ => {
				applied.remove(&*resolved.name);
			}
		}
	}

	fn parent(&self, node: &WebNode) -> Option<WebNode> {
		node.0.parent_node().map(WebNode)
	}

	fn children(&self, node: &WebNode) -> Vec<WebNode> {
		let child_nodes = node.0.child_nodes();
		(0..child_nodes.length()).filter_map(|i| child_nodes.get(i)).map(WebNode).collect()
	}

	fn child_at(&self, parent: &WebNode, index: usize) -> Option<WebNode> {
		let index = u32::try_from(index).ok()?;
		parent.0.child_nodes().get(index).map(WebNode)
	}

	fn next_sibling(&self, node: &WebNode) -> Option<WebNode> {
		node.0.next_sibling().map(WebNode)
	}

	fn append_child(&mut self, parent: &WebNode, child: &WebNode) {
		parent.0.append_child(&child.0).unwrap_throw();
	}

	fn insert_before(&mut self, parent: &WebNode, child: &WebNode, reference: &WebNode) {
		parent.0.insert_before(&child.0, Some(&reference.0)).unwrap_throw();
	}

	fn replace_child(&mut self, parent: &WebNode, new_child: &WebNode, old_child: &WebNode) {
		parent.0.replace_child(&new_child.0, &old_child.0).unwrap_throw();
	}

	fn remove_node(&mut self, node: &WebNode) {
		if let Some(parent) = node.0.parent_node() {
			parent.remove_child(&node.0).unwrap_throw();
		}
	}

	fn discard(&mut self, node: &WebNode) {
		self.applied.remove(node);
		let element = match node.0.dyn_ref::<web_sys::Element>() {
			Some(element) => element.clone(),
			None => return,
		};
		let names: Vec<String> = match self.bindings.get(node) {
			Some(bindings) => bindings.iter().map(|(name, _)| name.clone()).collect(),
			None => return,
		};
		for name in names {
			let resolved = attribute::resolve(&name);
			let event_type = resolved.event_type().unwrap_or_default();
			self.bind_handler(node, &element, &name, event_type, None);
		}
	}

	fn flush(&mut self) {
		let freed = self.listeners.drain_released().count();
		trace!("Freed {} event listener(s).", freed);
		info!("Event listener count/cached capacity: {}/{}", self.listeners.len(), self.listeners.capacity());
	}
}
