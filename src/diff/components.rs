use super::{Outcome, Reconciler};
use crate::{
	adapter::NodeAdapter,
	component::{Component, ComponentId, ComponentType, Lifecycle},
	value::{Props, State},
	vnode::VComponent,
};
use std::rc::Rc;
use tracing::{error, trace, trace_span, warn};

pub(super) struct Instance<N> {
	pub(super) ty: ComponentType,
	pub(super) component: Rc<dyn Component>,
	pub(super) props: Props,
	pub(super) state: State,
	pub(super) base: Option<N>,
	pub(super) lifecycle: Lifecycle,
	/// The component this instance rendered as its root, sharing its `base`.
	pub(super) child: Option<ComponentId>,
	/// The component that rendered this instance as its root.
	pub(super) parent: Option<ComponentId>,
}

impl<A: NodeAdapter> Reconciler<A> {
	pub(super) fn diff_component(&mut self, live: Option<A::Node>, vcomponent: &VComponent, owner: Option<ComponentId>, depth: usize) -> Outcome<A::Node> {
		let span = trace_span!("Diffing component", ty = vcomponent.ty.name(), key = ?vcomponent.key);
		let _enter = span.enter();

		if let Some(previous) = self.component_at_position(live.as_ref(), owner) {
			if self.components.get(&previous).map_or(false, |instance| instance.ty == vcomponent.ty) {
				trace!(?previous, "Updating props.");
				self.set_props(previous, vcomponent.props.clone(), depth);
				return Outcome {
					node: self.rendered_base(previous),
					component: Some(previous),
				};
			}

			trace!(?previous, "Component type changed.");
			self.unmount_component(previous);
		}

		let id = self.create_component(&vcomponent.ty, &vcomponent.props);
		self.set_props(id, vcomponent.props.clone(), depth);
		let node = self.rendered_base(id);
		if let Some(live) = live {
			if live != node {
				self.replace(&live, &node);
			}
		}
		Outcome { node, component: Some(id) }
	}

	/// Whether `live` is the root of a component of type `ty`.
	pub(super) fn is_component_of_type(&self, live: &A::Node, ty: &ComponentType) -> bool {
		self.component_of(live)
			.and_then(|id| self.components.get(&id))
			.map_or(false, |instance| &instance.ty == ty)
	}

	/// A non-component virtual node takes over this position: unmount the component that held it.
	pub(super) fn release_position(&mut self, live: Option<&A::Node>, owner: Option<ComponentId>) {
		if let Some(previous) = self.component_at_position(live, owner) {
			trace!(?previous, "Position no longer holds a component.");
			self.unmount_component(previous);
		}
	}

	/// For an owner's render output, the position belongs to the component it rendered as root last time.
	/// Otherwise it belongs to the outermost component rendered into `live`.
	fn component_at_position(&self, live: Option<&A::Node>, owner: Option<ComponentId>) -> Option<ComponentId> {
		match owner {
			Some(owner) => self.components.get(&owner).and_then(|instance| instance.child),
			None => live.and_then(|live| self.component_of(live)),
		}
	}

	fn create_component(&mut self, ty: &ComponentType, props: &Props) -> ComponentId {
		let id = ComponentId(self.next_component_id);
		self.next_component_id += 1;
		trace!(?id, ty = ty.name(), "Constructing component.");

		let component = ty.construct(props);
		let state = component.initial_state(props);
		self.components.insert(
			id,
			Instance {
				ty: ty.clone(),
				component,
				props: props.clone(),
				state,
				base: None,
				lifecycle: Lifecycle::Unattached,
				child: None,
				parent: None,
			},
		);
		id
	}

	fn set_props(&mut self, id: ComponentId, props: Props, depth: usize) {
		let (component, first) = match self.components.get(&id) {
			Some(instance) => (Rc::clone(&instance.component), instance.base.is_none()),
			None => return warn!("Not setting props of unmounted component {:?}.", id),
		};

		if first {
			component.will_mount(&mut self.hook_context(id));
		} else {
			component.will_receive_props(&props, &mut self.hook_context(id));
		}

		match self.components.get_mut(&id) {
			Some(instance) => instance.props = props,
			None => return warn!("Component {:?} was unmounted before receiving its props.", id),
		}
		self.render_component(id, depth);
	}

	pub(super) fn render_component(&mut self, id: ComponentId, depth: usize) {
		let span = trace_span!("Rendering component", ?id);
		let _enter = span.enter();

		let (component, props, state, previous) = match self.components.get_mut(&id) {
			Some(instance) => {
				if instance.base.is_some() {
					instance.lifecycle = Lifecycle::Updating;
				}
				(Rc::clone(&instance.component), instance.props.clone(), instance.state.clone(), instance.base.clone())
			}
			None => return warn!("Not rendering unmounted component {:?}.", id),
		};

		let vnode = component.render(&props, &state);
		let outcome = self.diff_node(previous.clone(), &vnode, Some(id), depth.saturating_sub(1));

		if let Some(child) = outcome.component {
			if let Some(child) = self.components.get_mut(&child) {
				child.parent = Some(id);
			}
		}
		match self.components.get_mut(&id) {
			Some(instance) => instance.child = outcome.component,
			None => return warn!("Component {:?} was unmounted during its own render.", id),
		}

		self.commit_base(id, &outcome.node);

		let mut cx = self.hook_context(id);
		if previous.is_none() {
			component.did_mount(&mut cx);
		} else {
			component.did_update(&mut cx);
		}
	}

	/// Reassigns `base` of `id` and of every component that renders it as root, and points `node` back at the outermost of them.
	fn commit_base(&mut self, id: ComponentId, node: &A::Node) {
		let previous = match self.components.get_mut(&id) {
			Some(instance) => {
				instance.lifecycle = Lifecycle::Mounted;
				instance.base.replace(node.clone())
			}
			None => return,
		};

		let mut top = id;
		while let Some(parent) = self.components.get(&top).and_then(|instance| instance.parent) {
			match self.components.get_mut(&parent) {
				Some(instance) => {
					instance.base = Some(node.clone());
					top = parent;
				}
				None => break,
			}
		}

		if let Some(previous) = previous.filter(|previous| previous != node) {
			self.update_meta(&previous, |meta| {
				if meta.component == Some(top) {
					meta.component = None
				}
			});
		}
		self.meta.entry(node.clone()).or_default().component = Some(top);
	}

	/// Fires `will_unmount` and discards `id` and the components it rendered as root. Doesn't touch the tree.
	pub(super) fn unmount_component(&mut self, id: ComponentId) {
		let instance = match self.components.remove(&id) {
			Some(instance) => instance,
			None => return,
		};
		trace!(?id, ty = instance.ty.name(), "Unmounting component.");
		instance.component.will_unmount();

		if let Some(parent) = instance.parent {
			if let Some(parent) = self.components.get_mut(&parent) {
				if parent.child == Some(id) {
					parent.child = None;
				}
			}
		}
		if let Some(base) = &instance.base {
			self.update_meta(base, |meta| {
				if meta.component == Some(id) {
					meta.component = None
				}
			});
		}
		if let Some(child) = instance.child {
			self.unmount_component(child);
		}
	}

	fn rendered_base(&mut self, id: ComponentId) -> A::Node {
		match self.base(id).cloned() {
			Some(base) => base,
			None => {
				error!("Component {:?} was unmounted before completing its first render.", id);
				self.adapter.create_text("")
			}
		}
	}
}
