//! Attribute name policy, resolved once per name: aliasing and the plain/handler/style split.

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
	/// Written to the node's attribute store as text.
	Plain,
	/// `on…`: attaches a [`Handler`](`crate::value::Handler`) for the event named by the rest of the name.
	EventHandler,
	/// `style`: either CSS text or a [`StyleMap`](`crate::value::StyleMap`) applied key by key.
	Style,
}

/// An attribute name in its canonical spelling, with its [`AttributeKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeName<'a> {
	pub name: Cow<'a, str>,
	pub kind: AttributeKind,
}

impl AttributeName<'_> {
	/// The event type of an [`AttributeKind::EventHandler`] attribute (`"click"` for `onclick`).
	#[must_use]
	pub fn event_type(&self) -> Option<&str> {
		match self.kind {
			AttributeKind::EventHandler => self.name.get(2..),
			AttributeKind::Plain | AttributeKind::Style => None,
		}
	}
}

/// Resolves `name` to its canonical spelling and kind.
///
/// - `className` is an alias of `class`.
/// - `on` followed by a letter is an event handler; its canonical name is lower-cased (`onClick` ⇒ `onclick`).
/// - `style` is the style attribute.
///
/// ```
/// use xylem_dom::attribute::{resolve, AttributeKind};
///
/// assert_eq!(resolve("className").name, "class");
/// assert_eq!(resolve("onClick").event_type(), Some("click"));
/// assert_eq!(resolve("style").kind, AttributeKind::Style);
/// assert_eq!(resolve("one").kind, AttributeKind::EventHandler);
/// assert_eq!(resolve("on").kind, AttributeKind::Plain);
/// ```
#[must_use]
pub fn resolve(name: &str) -> AttributeName<'_> {
	if name == "className" {
		return AttributeName {
			name: Cow::Borrowed("class"),
			kind: AttributeKind::Plain,
		};
	}
	if name == "style" {
		return AttributeName {
			name: Cow::Borrowed(name),
			kind: AttributeKind::Style,
		};
	}

	let bytes = name.as_bytes();
	if bytes.len() > 2 && bytes[..2].eq_ignore_ascii_case(b"on") && bytes[2].is_ascii_alphabetic() {
		let name = if bytes.iter().any(u8::is_ascii_uppercase) {
			Cow::Owned(name.to_ascii_lowercase())
		} else {
			Cow::Borrowed(name)
		};
		return AttributeName {
			name,
			kind: AttributeKind::EventHandler,
		};
	}

	AttributeName {
		name: Cow::Borrowed(name),
		kind: AttributeKind::Plain,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lower_case_handler_names_are_borrowed() {
		assert!(matches!(resolve("onclick").name, Cow::Borrowed("onclick")));
		assert!(matches!(resolve("onMouseDown").name, Cow::Owned(ref name) if name == "onmousedown"));
	}

	#[test]
	fn plain_names_pass_through() {
		let resolved = resolve("data-id");
		assert_eq!(resolved.kind, AttributeKind::Plain);
		assert_eq!(resolved.name, "data-id");
		assert_eq!(resolved.event_type(), None);
	}
}
