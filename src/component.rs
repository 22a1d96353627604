//! Components: the two flavors (plain render functions and stateful lifecycle objects) behind one trait.

use crate::{
	value::{Props, State},
	vnode::VNode,
};
use core::fmt::{self, Debug, Formatter};
use std::{borrow::Cow, rc::Rc};

/// Handle of a component instance owned by a [`Reconciler`](`crate::Reconciler`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u64);

/// Lifecycle phase of a component instance.
///
/// `Unattached` → `Mounted` ⇄ `Updating` → `Unmounted` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
	/// Constructed, first render not yet completed.
	Unattached,
	Mounted,
	/// A render of an already mounted instance is in progress.
	Updating,
	Unmounted,
}

/// A component. All hooks are optional.
///
/// Instances are shared (`Rc`) so that hooks may re-enter rendering of the same instance through [`Context::set_state`].
/// Mutable data belongs in [`State`]; anything else needs interior mutability.
pub trait Component {
	fn render(&self, props: &Props, state: &State) -> VNode;

	/// State of a new instance, before [`will_mount`](`Component::will_mount`).
	fn initial_state(&self, _props: &Props) -> State {
		State::new()
	}

	/// Before the first render.
	fn will_mount(&self, _cx: &mut Context<'_>) {}

	/// Before `next` is committed as the instance's props, on every update after the first.
	fn will_receive_props(&self, _next: &Props, _cx: &mut Context<'_>) {}

	/// After the first render was committed.
	fn did_mount(&self, _cx: &mut Context<'_>) {}

	/// After each later render was committed.
	fn did_update(&self, _cx: &mut Context<'_>) {}

	/// The instance is discarded after this returns.
	fn will_unmount(&self) {}
}

struct FunctionComponent(Rc<dyn Fn(&Props) -> VNode>);
impl Component for FunctionComponent {
	fn render(&self, props: &Props, _: &State) -> VNode {
		(self.0)(props)
	}
}

/// Constructor identity of a component.
///
/// Two virtual component nodes target "the same kind of component" iff their [`ComponentType`]s are clones of each other.
#[derive(Clone)]
pub struct ComponentType(Rc<ComponentTypeInner>);

struct ComponentTypeInner {
	name: Cow<'static, str>,
	construct: Box<dyn Fn(&Props) -> Rc<dyn Component>>,
}

impl ComponentType {
	/// Registers a stateless component that renders `render(props)`.
	pub fn function(name: impl Into<Cow<'static, str>>, render: impl Fn(&Props) -> VNode + 'static) -> Self {
		let render: Rc<dyn Fn(&Props) -> VNode> = Rc::new(render);
		Self::from_constructor(name.into(), move |_| Rc::new(FunctionComponent(Rc::clone(&render))))
	}

	/// Registers a component constructed by `construct(initial_props)` for each new instance.
	pub fn stateful<C: Component + 'static>(name: impl Into<Cow<'static, str>>, construct: impl Fn(&Props) -> C + 'static) -> Self {
		Self::from_constructor(name.into(), move |props| Rc::new(construct(props)))
	}

	fn from_constructor(name: Cow<'static, str>, construct: impl Fn(&Props) -> Rc<dyn Component> + 'static) -> Self {
		Self(Rc::new(ComponentTypeInner {
			name,
			construct: Box::new(construct),
		}))
	}

	#[must_use]
	pub fn name(&self) -> &str {
		&self.0.name
	}

	pub(crate) fn construct(&self, props: &Props) -> Rc<dyn Component> {
		(self.0.construct)(props)
	}
}

impl PartialEq for ComponentType {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
impl Eq for ComponentType {}

impl Debug for ComponentType {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ComponentType").field(&self.0.name).finish()
	}
}

/// What a lifecycle hook can reach of the runtime.
pub(crate) trait Runtime {
	fn set_state(&mut self, id: ComponentId, partial: State);
	fn props(&self, id: ComponentId) -> Option<&Props>;
	fn state(&self, id: ComponentId) -> Option<&State>;
}

/// Passed to lifecycle hooks.
pub struct Context<'a> {
	id: ComponentId,
	runtime: &'a mut (dyn Runtime + 'a),
}

impl<'a> Context<'a> {
	pub(crate) fn new(runtime: &'a mut (dyn Runtime + 'a), id: ComponentId) -> Self {
		Self { id, runtime }
	}

	/// The instance this hook runs for.
	#[must_use]
	pub fn id(&self) -> ComponentId {
		self.id
	}

	/// The instance's committed props. `None` once it was unmounted.
	#[must_use]
	pub fn props(&self) -> Option<&Props> {
		self.runtime.props(self.id)
	}

	/// `None` once the instance was unmounted.
	#[must_use]
	pub fn state(&self) -> Option<&State> {
		self.runtime.state(self.id)
	}

	/// Shallow-merges `partial` into the instance's state and re-renders it before returning.
	///
	/// See [`Reconciler::set_state`](`crate::Reconciler::set_state`).
	pub fn set_state(&mut self, partial: State) {
		self.runtime.set_state(self.id, partial)
	}
}

impl Debug for Context<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Context").field("id", &self.id).finish_non_exhaustive()
	}
}
