use super::Reconciler;
use crate::{
	adapter::NodeAdapter,
	attribute,
	value::Value,
	vnode::Attributes,
};
use hashbrown::HashMap;
use tracing::{trace, trace_span};

impl<A: NodeAdapter> Reconciler<A> {
	/// Clears attributes missing from `target` and (re)applies those whose value differs. Unchanged ones aren't written.
	///
	/// `false` counts as absent.
	pub(super) fn reconcile_attributes(&mut self, element: &A::Node, target: &Attributes) {
		let span = trace_span!("Reconciling attributes", target = target.len());
		let _enter = span.enter();

		let current = self.adapter.attributes(element);
		let target: HashMap<_, _> = target
			.iter()
			.filter(|(_, value)| **value != Value::Bool(false))
			.map(|(name, value)| (attribute::resolve(name).name, value))
			.collect();

		for (name, _) in &current {
			if !target.contains_key(name.as_str()) {
				trace!(name = name.as_str(), "Removing attribute.");
				self.adapter.set_attribute(element, name, None);
			}
		}

		for (name, value) in &target {
			let unchanged = current.iter().any(|(current_name, current_value)| current_name == name && current_value == *value);
			if !unchanged {
				if cfg!(feature = "dangerous-logging") {
					trace!(name = &**name, ?value, "Setting attribute.");
				} else {
					trace!(name = &**name, "Setting attribute.");
				}
				self.adapter.set_attribute(element, name, Some(*value));
			}
		}
	}
}
