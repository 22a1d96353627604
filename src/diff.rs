use crate::{
	adapter::{NodeAdapter, NodeKind},
	component::{ComponentId, Context, Lifecycle, Runtime},
	value::{Key, Props, State},
	vnode::{VElement, VNode},
};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use tracing::{error, instrument, trace, trace_span, warn};

mod attributes;
mod children;
mod components;

use components::Instance;

/// Recursion budget of a pass unless configured through [`Reconciler::with_depth_limit`].
pub const DEFAULT_DEPTH_LIMIT: usize = 1024;

/// Brings a live tree, reached through a [`NodeAdapter`], into agreement with virtual node trees,
/// and owns the component instances rendered into it.
///
/// # Fault Safety
///
/// Mutations are applied eagerly while diffing. If a render function, lifecycle hook or adapter operation panics,
/// the live tree is left in whatever partially updated state the interrupted pass produced.
///
/// # Reentrancy
///
/// State updates issued from lifecycle hooks re-render synchronously, in the middle of the ongoing pass.
pub struct Reconciler<A: NodeAdapter> {
	adapter: A,
	depth_limit: usize,
	components: HashMap<ComponentId, Instance<A::Node>>,
	next_component_id: u64,
	/// Non-owning side-table: key and outermost owning component per live node.
	meta: HashMap<A::Node, NodeMeta>,
	pass_depth: usize,
}

#[derive(Debug, Default)]
struct NodeMeta {
	key: Option<Key>,
	component: Option<ComponentId>,
}

impl NodeMeta {
	fn is_empty(&self) -> bool {
		self.key.is_none() && self.component.is_none()
	}
}

/// A reconciled position: the definitive live node and, if a component rendered it, that component.
struct Outcome<N> {
	node: N,
	component: Option<ComponentId>,
}

impl<N> Outcome<N> {
	fn plain(node: N) -> Self {
		Self { node, component: None }
	}
}

impl<A: NodeAdapter> Reconciler<A> {
	#[must_use]
	pub fn new(adapter: A) -> Self {
		Self {
			adapter,
			depth_limit: DEFAULT_DEPTH_LIMIT,
			components: HashMap::new(),
			next_component_id: 0,
			meta: HashMap::new(),
			pass_depth: 0,
		}
	}

	/// Bounds the nesting depth of a single pass. Deeper subtrees are logged as errors and left as they are.
	#[must_use]
	pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
		self.depth_limit = depth_limit;
		self
	}

	pub fn adapter(&self) -> &A {
		&self.adapter
	}

	pub fn adapter_mut(&mut self) -> &mut A {
		&mut self.adapter
	}

	/// Unmounts all remaining components (without touching the tree) and returns the adapter.
	pub fn into_adapter(mut self) -> A {
		let mut ids: Vec<_> = self.components.keys().copied().collect();
		ids.sort_unstable();
		for id in ids {
			self.unmount_component(id);
		}
		self.adapter
	}

	/// Reconciles `live` (if any) against `vnode` and returns the live node that now represents `vnode`.
	///
	/// If `live` can't be reused, its replacement takes its place in its parent.
	/// If `container` is given and the result isn't one of its children yet, the result is appended to it.
	#[instrument(skip(self, vnode))]
	pub fn reconcile(&mut self, live: Option<&A::Node>, vnode: &VNode, container: Option<&A::Node>) -> A::Node {
		self.pass_depth += 1;
		let depth = self.depth_limit;
		let node = self.diff_node(live.cloned(), vnode, None, depth).node;

		if let Some(container) = container {
			if self.adapter.parent(&node).as_ref() != Some(container) {
				trace!("Appending result to container.");
				self.adapter.append_child(container, &node);
			}
		}

		self.end_pass();
		node
	}

	/// Detaches `node` and discards it and its subtree, unmounting the components rendered into it.
	#[instrument(skip(self))]
	pub fn unmount(&mut self, node: &A::Node) {
		self.pass_depth += 1;
		self.dispose(node);
		self.end_pass();
	}

	/// Shallow-merges `partial` into the state of component `id` (later keys win) and re-renders it before returning.
	///
	/// There is no batching: each call renders once.
	/// Before the first render completed (e.g. from [`will_mount`](`crate::Component::will_mount`)) the state is only merged,
	/// since that first render is still to come.
	/// Updates for unmounted instances are logged and ignored.
	#[instrument(skip(self, partial))]
	pub fn set_state(&mut self, id: ComponentId, partial: State) {
		match self.components.get_mut(&id) {
			Some(instance) => {
				instance.state.extend(partial);
				if instance.lifecycle == Lifecycle::Unattached {
					return trace!("Deferring to the pending first render.");
				}
			}
			None => return warn!("Ignoring state update for unmounted component {:?}.", id),
		}

		self.pass_depth += 1;
		let depth = self.depth_limit;
		self.render_component(id, depth);
		self.end_pass();
	}

	/// The outermost component that rendered `node` as its root, if any.
	#[must_use]
	pub fn component_of(&self, node: &A::Node) -> Option<ComponentId> {
		self.meta.get(node).and_then(|meta| meta.component)
	}

	/// The key `node` was last reconciled with as a child.
	#[must_use]
	pub fn key_of(&self, node: &A::Node) -> Option<&Key> {
		self.meta.get(node).and_then(|meta| meta.key.as_ref())
	}

	#[must_use]
	pub fn lifecycle(&self, id: ComponentId) -> Lifecycle {
		self.components.get(&id).map_or(Lifecycle::Unmounted, |instance| instance.lifecycle)
	}

	#[must_use]
	pub fn props(&self, id: ComponentId) -> Option<&Props> {
		self.components.get(&id).map(|instance| &instance.props)
	}

	#[must_use]
	pub fn state(&self, id: ComponentId) -> Option<&State> {
		self.components.get(&id).map(|instance| &instance.state)
	}

	/// The live node of the instance's most recent render.
	#[must_use]
	pub fn base(&self, id: ComponentId) -> Option<&A::Node> {
		self.components.get(&id).and_then(|instance| instance.base.as_ref())
	}

	/// The component `id` rendered as its root in its most recent render, if any.
	#[must_use]
	pub fn rendered_component(&self, id: ComponentId) -> Option<ComponentId> {
		self.components.get(&id).and_then(|instance| instance.child)
	}

	/// Number of live component instances.
	#[must_use]
	pub fn component_count(&self) -> usize {
		self.components.len()
	}

	fn end_pass(&mut self) {
		self.pass_depth -= 1;
		if self.pass_depth == 0 {
			self.adapter.flush();
		}
	}

	/// `owner` is the component whose render output is being reconciled at this position, if any.
	fn diff_node(&mut self, live: Option<A::Node>, vnode: &VNode, owner: Option<ComponentId>, depth: usize) -> Outcome<A::Node> {
		if depth == 0 {
			error!("Depth limit reached");
			return Outcome::plain(match live {
				Some(live) => live,
				None => self.adapter.create_text(""),
			});
		}

		match vnode {
			VNode::Component(component) => self.diff_component(live, component, owner, depth),
			VNode::Text(text) => {
				self.release_position(live.as_ref(), owner);
				Outcome::plain(self.diff_text(live, text))
			}
			VNode::Element(element) => {
				self.release_position(live.as_ref(), owner);
				Outcome::plain(self.diff_element(live, element, depth))
			}
		}
	}

	fn diff_text(&mut self, live: Option<A::Node>, text: &str) -> A::Node {
		let span = if cfg!(feature = "dangerous-logging") {
			trace_span!("Diffing text node", text)
		} else {
			trace_span!("Diffing text node", len = text.len())
		};
		let _enter = span.enter();

		if let Some(live) = live {
			if self.adapter.node_kind(&live) == NodeKind::Text {
				if self.adapter.text(&live) != text {
					trace!("Updating text.");
					self.adapter.set_text(&live, text);
				}
				return live;
			}

			trace!("Replacing element with text node.");
			let node = self.adapter.create_text(text);
			self.replace(&live, &node);
			return node;
		}

		self.adapter.create_text(text)
	}

	fn diff_element(&mut self, live: Option<A::Node>, element: &VElement, depth: usize) -> A::Node {
		let span = trace_span!("Diffing element", tag = %element.tag, key = ?element.key);
		let _enter = span.enter();

		let node = match live {
			Some(live) if self.adapter.node_kind(&live).is_element(&element.tag) => live,
			live => {
				let node = self.adapter.create_element(&element.tag);
				if let Some(live) = live {
					trace!(from = ?self.adapter.node_kind(&live), "Recreating node with different tag.");
					for child in self.adapter.children(&live) {
						self.adapter.append_child(&node, &child);
					}
					self.replace(&live, &node);
				}
				node
			}
		};

		if !element.children.is_empty() || self.adapter.child_at(&node, 0).is_some() {
			self.reconcile_children(&node, &element.children, depth - 1);
		}
		self.reconcile_attributes(&node, &element.attrs);
		node
	}

	/// Puts `new` where `old` is (keeping `old`'s key) and forgets `old`.
	///
	/// Components rendered into `old`'s remaining subtree are unmounted.
	/// Components rendered into `old` itself were already dealt with by the caller.
	fn replace(&mut self, old: &A::Node, new: &A::Node) {
		if let Some(parent) = self.adapter.parent(old) {
			self.adapter.replace_child(&parent, new, old);
		}

		if let Some(NodeMeta { key: Some(key), .. }) = self.meta.remove(old) {
			self.meta.entry(new.clone()).or_default().key = Some(key);
		}
		for child in self.adapter.children(old) {
			self.dispose_subtree(&child);
		}
		self.adapter.discard(old);
	}

	/// Detaches `node`, then unmounts and forgets everything rendered into its subtree.
	fn dispose(&mut self, node: &A::Node) {
		trace!(?node, "Disposing node.");
		self.adapter.remove_node(node);
		self.dispose_subtree(node);
	}

	fn dispose_subtree(&mut self, node: &A::Node) {
		if let Some(meta) = self.meta.remove(node) {
			if let Some(id) = meta.component {
				if self.base(id) == Some(node) {
					self.unmount_component(id);
				}
			}
		}
		for child in self.adapter.children(node) {
			self.dispose_subtree(&child);
		}
		self.adapter.discard(node);
	}

	fn set_key(&mut self, node: &A::Node, key: Option<&Key>) {
		match key {
			Some(key) => self.meta.entry(node.clone()).or_default().key = Some(key.clone()),
			None => self.update_meta(node, |meta| meta.key = None),
		}
	}

	/// Applies `f` to an existing entry and drops the entry if it became empty.
	fn update_meta(&mut self, node: &A::Node, f: impl FnOnce(&mut NodeMeta)) {
		if let Some(meta) = self.meta.get_mut(node) {
			f(meta);
			if meta.is_empty() {
				self.meta.remove(node);
			}
		}
	}
}

impl<A: NodeAdapter + Debug> Debug for Reconciler<A> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Reconciler")
			.field("adapter", &self.adapter)
			.field("depth_limit", &self.depth_limit)
			.field("components", &self.components.len())
			.field("meta", &self.meta)
			.finish()
	}
}

impl<A: NodeAdapter> Runtime for Reconciler<A> {
	fn set_state(&mut self, id: ComponentId, partial: State) {
		Reconciler::set_state(self, id, partial)
	}

	fn props(&self, id: ComponentId) -> Option<&Props> {
		Reconciler::props(self, id)
	}

	fn state(&self, id: ComponentId) -> Option<&State> {
		Reconciler::state(self, id)
	}
}

impl<A: NodeAdapter> Reconciler<A> {
	fn hook_context(&mut self, id: ComponentId) -> Context<'_> {
		Context::new(self, id)
	}
}
