use super::Reconciler;
use crate::{
	adapter::{NodeAdapter, NodeKind},
	value::Key,
	vnode::VNode,
};
use hashbrown::{HashMap, HashSet};
use tracing::{trace, trace_span};

impl<A: NodeAdapter> Reconciler<A> {
	/// Matches the live children of `parent` to `targets` and reorders, inserts and removes until they agree.
	///
	/// Keyed targets claim the live child with the same key.
	/// Unkeyed targets claim the first still unclaimed, type-compatible unkeyed live child,
	/// scanning from a lower bound that advances past claims made right at it.
	/// This is greedy, not a minimal edit script.
	pub(super) fn reconcile_children(&mut self, parent: &A::Node, targets: &[VNode], depth: usize) {
		let span = trace_span!("Reconciling children", targets = targets.len());
		let _enter = span.enter();

		let existing = self.adapter.children(parent);
		let mut keyed = HashMap::<Key, A::Node>::new();
		let mut unkeyed = Vec::with_capacity(existing.len());
		for child in &existing {
			match self.key_of(child) {
				Some(key) => {
					keyed.insert(key.clone(), child.clone());
				}
				None => unkeyed.push(Some(child.clone())),
			}
		}

		let mut placed = HashSet::with_capacity(targets.len());
		let mut min = 0;
		let mut len = unkeyed.len();
		for (i, target) in targets.iter().enumerate() {
			let candidate = match target.key() {
				Some(key) => keyed.remove(key),
				None => {
					let mut candidate = None;
					for j in min..len {
						if !unkeyed[j].as_ref().map_or(false, |child| self.is_same_node_type(child, target)) {
							continue;
						}
						candidate = unkeyed[j].take();
						if j == len - 1 {
							len -= 1;
						}
						if j == min {
							min += 1;
						}
						break;
					}
					candidate
				}
			};
			trace!(i, reused = candidate.is_some(), key = ?target.key());

			let node = self.diff_node(candidate, target, None, depth).node;
			self.set_key(&node, target.key());

			match self.adapter.child_at(parent, i) {
				None => {
					trace!(i, "Appending.");
					self.adapter.append_child(parent, &node);
				}
				Some(occupant) if occupant == node => (),
				Some(occupant) if self.adapter.next_sibling(&occupant).as_ref() == Some(&node) => {
					trace!(i, "Removing stale occupant.");
					self.adapter.remove_node(&occupant);
				}
				Some(occupant) => {
					trace!(i, "Inserting.");
					self.adapter.insert_before(parent, &node, &occupant);
				}
			}
			placed.insert(node);
		}

		for stale in existing.iter().filter(|child| !placed.contains(*child)) {
			self.dispose(stale);
		}
	}

	/// Text matches text, elements match by tag (ignoring ASCII case), components by constructor identity.
	fn is_same_node_type(&self, live: &A::Node, target: &VNode) -> bool {
		match target {
			VNode::Text(_) => self.adapter.node_kind(live) == NodeKind::Text,
			VNode::Element(element) => self.adapter.node_kind(live).is_element(&element.tag),
			VNode::Component(component) => self.is_component_of_type(live, &component.ty),
		}
	}
}
