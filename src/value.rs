//! Values carried by attributes, component props and component state.

use core::{
	any::Any,
	fmt::{self, Debug, Display, Formatter},
};
use hashbrown::HashMap;
use std::{borrow::Cow, rc::Rc};

/// Component input data, by name.
pub type Props = HashMap<String, Value>;

/// Component state, by name. Only ever changed through a (shallow-merging) state update.
pub type State = HashMap<String, Value>;

/// A style declaration map, by CSS property name (`"background-color"`, not `"backgroundColor"`).
pub type StyleMap = HashMap<String, Value>;

/// Collects name/value pairs into a [`Props`], [`State`] or [`StyleMap`].
///
/// ```
/// use xylem_dom::value::{map, Value};
///
/// let props = map([("label", Value::from("OK")), ("width", Value::from(3.0))]);
/// assert_eq!(props["label"], Value::from("OK"));
/// ```
pub fn map<K: Into<String>, V: Into<Value>>(pairs: impl IntoIterator<Item = (K, V)>) -> HashMap<String, Value> {
	pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// An attribute, prop or state value.
///
/// [`Handler`]s and [`Style`](`Value::Style`) maps compare by reference identity.
/// Changing a style map's contents therefore requires a new map.
#[derive(Clone)]
pub enum Value {
	Bool(bool),
	Number(f64),
	Text(Rc<str>),
	Handler(Handler),
	Style(Rc<StyleMap>),
}

impl Value {
	/// The string form of this value as a plain DOM attribute.
	///
	/// `None` means the attribute should be absent.
	#[must_use]
	pub fn to_attribute_string(&self) -> Option<Cow<'_, str>> {
		match self {
			Value::Bool(true) => Some(Cow::Borrowed("")),
			Value::Bool(false) | Value::Handler(_) | Value::Style(_) => None,
			Value::Number(number) => Some(Cow::Owned(number.to_string())),
			Value::Text(text) => Some(Cow::Borrowed(text)),
		}
	}

	#[must_use]
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Value::Text(text) => Some(text),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_number(&self) -> Option<f64> {
		match *self {
			Value::Number(number) => Some(number),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_bool(&self) -> Option<bool> {
		match *self {
			Value::Bool(b) => Some(b),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_handler(&self) -> Option<&Handler> {
		match self {
			Value::Handler(handler) => Some(handler),
			_ => None,
		}
	}
}

impl PartialEq for Value {
	#[allow(clippy::float_cmp)]
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Number(a), Value::Number(b)) => a == b,
			(Value::Text(a), Value::Text(b)) => a == b,
			(Value::Handler(a), Value::Handler(b)) => a == b,
			(Value::Style(a), Value::Style(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl Debug for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Value::Bool(b) => Debug::fmt(b, f),
			Value::Number(number) => Debug::fmt(number, f),
			Value::Text(text) => Debug::fmt(text, f),
			Value::Handler(handler) => Debug::fmt(handler, f),
			Value::Style(style) => f.debug_tuple("Style").field(&Rc::as_ptr(style)).finish(),
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<f64> for Value {
	fn from(number: f64) -> Self {
		Value::Number(number)
	}
}

impl From<i32> for Value {
	fn from(number: i32) -> Self {
		Value::Number(number.into())
	}
}

impl From<u32> for Value {
	fn from(number: u32) -> Self {
		Value::Number(number.into())
	}
}

impl From<&str> for Value {
	fn from(text: &str) -> Self {
		Value::Text(text.into())
	}
}

impl From<String> for Value {
	fn from(text: String) -> Self {
		Value::Text(text.into())
	}
}

impl From<Handler> for Value {
	fn from(handler: Handler) -> Self {
		Value::Handler(handler)
	}
}

impl From<StyleMap> for Value {
	fn from(style: StyleMap) -> Self {
		Value::Style(Rc::new(style))
	}
}

/// An event handler attached through an `on…` attribute.
///
/// The argument is the adapter's native event type, e.g. `web_sys::Event` for the browser DOM adapter.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&dyn Any)>);

impl Handler {
	pub fn new(handler: impl Fn(&dyn Any) + 'static) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &dyn Any) {
		(self.0)(event)
	}

	/// Identity of the shared callback, stable while any clone of this [`Handler`] is alive.
	#[must_use]
	pub fn key(&self) -> usize {
		Rc::as_ptr(&self.0).cast::<()>() as usize
	}
}

impl PartialEq for Handler {
	fn eq(&self, other: &Self) -> bool {
		self.key() == other.key()
	}
}
impl Eq for Handler {}

impl Debug for Handler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "Handler({:#x})", self.key())
	}
}

/// Application-supplied identity of a child across renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
	Text(Rc<str>),
	Number(i64),
}

impl Display for Key {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Key::Text(text) => Display::fmt(text, f),
			Key::Number(number) => Display::fmt(number, f),
		}
	}
}

impl From<&str> for Key {
	fn from(text: &str) -> Self {
		Key::Text(text.into())
	}
}

impl From<String> for Key {
	fn from(text: String) -> Self {
		Key::Text(text.into())
	}
}

impl From<i64> for Key {
	fn from(number: i64) -> Self {
		Key::Number(number)
	}
}

impl From<i32> for Key {
	fn from(number: i32) -> Self {
		Key::Number(number.into())
	}
}

impl From<u32> for Key {
	fn from(number: u32) -> Self {
		Key::Number(number.into())
	}
}
