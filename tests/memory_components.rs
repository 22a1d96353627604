use std::{cell::RefCell, rc::Rc};
use xylem_dom::{
	h,
	memory::{MemoryDom, Mutation, NodeId},
	value::map,
	Component, ComponentType, Context, Lifecycle, NodeAdapter, Props, Reconciler, State, VComponent, VNode, Value,
};

fn init_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_max_level(tracing::Level::TRACE)
		.with_test_writer()
		.try_init();
}

fn setup() -> (Reconciler<MemoryDom>, NodeId) {
	init_test_logging();
	let mut reconciler = Reconciler::new(MemoryDom::new());
	let body = reconciler.adapter_mut().create_element("body");
	reconciler.adapter_mut().take_mutations();
	(reconciler, body)
}

type Log = Rc<RefCell<Vec<String>>>;

/// Renders its `count` state into a `<span>` and logs every hook call.
struct Counter {
	log: Log,
}

impl Component for Counter {
	fn initial_state(&self, _props: &Props) -> State {
		map([("count", 0)])
	}

	fn render(&self, _props: &Props, state: &State) -> VNode {
		self.log.borrow_mut().push("render".to_owned());
		h("span").child(state["count"].as_number().unwrap_or_default()).into()
	}

	fn will_mount(&self, _cx: &mut Context<'_>) {
		self.log.borrow_mut().push("will_mount".to_owned());
	}

	fn will_receive_props(&self, next: &Props, cx: &mut Context<'_>) {
		let current = cx.props().and_then(|props| props.get("step")).and_then(Value::as_number);
		let next = next.get("step").and_then(Value::as_number);
		self.log.borrow_mut().push(format!("will_receive_props {:?} -> {:?}", current, next));
	}

	fn did_mount(&self, _cx: &mut Context<'_>) {
		self.log.borrow_mut().push("did_mount".to_owned());
	}

	fn did_update(&self, _cx: &mut Context<'_>) {
		self.log.borrow_mut().push("did_update".to_owned());
	}

	fn will_unmount(&self) {
		self.log.borrow_mut().push("will_unmount".to_owned());
	}
}

fn counter(log: &Log) -> ComponentType {
	let log = Rc::clone(log);
	ComponentType::stateful("Counter", move |_| Counter { log: Rc::clone(&log) })
}

fn take(log: &Log) -> Vec<String> {
	log.borrow_mut().drain(..).collect()
}

#[test]
fn mount_runs_hooks_in_order() {
	let (mut reconciler, body) = setup();
	let log = Log::default();
	let ty = counter(&log);

	let span = reconciler.reconcile(None, &VComponent::new(&ty).into(), Some(&body));

	assert_eq!(take(&log), ["will_mount", "render", "did_mount"]);
	let id = reconciler.component_of(&span).unwrap();
	assert_eq!(reconciler.lifecycle(id), Lifecycle::Mounted);
	assert_eq!(reconciler.base(id), Some(&span));
	assert_eq!(reconciler.adapter().to_markup(body), "<body><span>0</span></body>");
}

#[test]
fn state_update_renders_once() {
	let (mut reconciler, body) = setup();
	let log = Log::default();
	let ty = counter(&log);
	let span = reconciler.reconcile(None, &VComponent::new(&ty).into(), Some(&body));
	let id = reconciler.component_of(&span).unwrap();
	let text = reconciler.adapter().child_at(&span, 0).unwrap();
	take(&log);
	reconciler.adapter_mut().take_mutations();

	reconciler.set_state(id, map([("count", 1)]));

	assert_eq!(take(&log), ["render", "did_update"]);
	assert_eq!(reconciler.adapter_mut().take_mutations(), vec![Mutation::SetText { node: text }]);
	assert_eq!(reconciler.base(id), Some(&span));
	assert_eq!(reconciler.state(id).unwrap()["count"], Value::from(1));
	assert_eq!(reconciler.adapter().to_markup(body), "<body><span>1</span></body>");
}

#[test]
fn state_updates_merge_shallowly() {
	let (mut reconciler, body) = setup();
	let log = Log::default();
	let span = reconciler.reconcile(None, &VComponent::new(&counter(&log)).into(), Some(&body));
	let id = reconciler.component_of(&span).unwrap();

	reconciler.set_state(id, map([("other", "x")]));
	reconciler.set_state(id, map([("count", 2)]));

	let state = reconciler.state(id).unwrap();
	assert_eq!(state["count"], Value::from(2));
	assert_eq!(state["other"], Value::from("x"));
}

#[test]
fn new_props_are_announced_before_commit() {
	let (mut reconciler, body) = setup();
	let log = Log::default();
	let ty = counter(&log);
	let span = reconciler.reconcile(None, &VComponent::new(&ty).into(), Some(&body));
	let id = reconciler.component_of(&span).unwrap();
	take(&log);

	let same = reconciler.reconcile(Some(&span), &VComponent::new(&ty).prop("step", 2).into(), Some(&body));

	assert_eq!(same, span);
	assert_eq!(reconciler.component_of(&span), Some(id));
	assert_eq!(take(&log), ["will_receive_props None -> Some(2.0)", "render", "did_update"]);
	assert_eq!(reconciler.props(id).unwrap()["step"], Value::from(2));
}

#[test]
fn type_change_unmounts_and_replaces() {
	let (mut reconciler, body) = setup();
	let log = Log::default();
	let span = reconciler.reconcile(None, &VComponent::new(&counter(&log)).into(), Some(&body));
	let id = reconciler.component_of(&span).unwrap();
	take(&log);

	let paragraph = ComponentType::function("Paragraph", |_| h("p").into());
	let p = reconciler.reconcile(Some(&span), &VComponent::new(&paragraph).into(), Some(&body));

	assert_eq!(take(&log), ["will_unmount"]);
	assert_eq!(reconciler.lifecycle(id), Lifecycle::Unmounted);
	assert_ne!(reconciler.component_of(&p), Some(id));
	assert!(reconciler.component_of(&p).is_some());
	assert_eq!(reconciler.component_count(), 1);
	assert_eq!(reconciler.adapter().to_markup(body), "<body><p></p></body>");
}

#[test]
fn plain_node_replacing_component_unmounts_it() {
	let (mut reconciler, body) = setup();
	let log = Log::default();
	let span = reconciler.reconcile(None, &VComponent::new(&counter(&log)).into(), Some(&body));
	let id = reconciler.component_of(&span).unwrap();
	take(&log);

	let span = reconciler.reconcile(Some(&span), &h("span").child("plain").into(), Some(&body));

	assert_eq!(take(&log), ["will_unmount"]);
	assert_eq!(reconciler.lifecycle(id), Lifecycle::Unmounted);
	assert_eq!(reconciler.component_of(&span), None);
	assert_eq!(reconciler.adapter().to_markup(body), "<body><span>plain</span></body>");
}

#[test]
fn removed_children_unmount_their_components() {
	let (mut reconciler, body) = setup();
	let log = Log::default();
	let ty = counter(&log);
	let div = reconciler.reconcile(
		None,
		&h("div").child(VComponent::new(&ty).key(1)).child(VComponent::new(&ty).key(2)).into(),
		Some(&body),
	);
	let children = reconciler.adapter().children(&div);
	let first = reconciler.component_of(&children[0]).unwrap();
	let second = reconciler.component_of(&children[1]).unwrap();
	take(&log);

	reconciler.reconcile(Some(&div), &h("div").child(VComponent::new(&ty).key(2)).into(), Some(&body));

	assert_eq!(reconciler.lifecycle(first), Lifecycle::Unmounted);
	assert_eq!(reconciler.lifecycle(second), Lifecycle::Mounted);
	assert_eq!(take(&log).iter().filter(|entry| *entry == "will_unmount").count(), 1);
	assert_eq!(reconciler.adapter().children(&div), vec![children[1]]);
}

#[test]
fn function_components_render_props() {
	let (mut reconciler, body) = setup();
	let greeting = ComponentType::function("Greeting", |props| {
		h("b").child(props.get("name").and_then(Value::as_text).unwrap_or_default().to_owned()).into()
	});

	let b = reconciler.reconcile(None, &VComponent::new(&greeting).prop("name", "Ada").into(), Some(&body));
	reconciler.reconcile(Some(&b), &VComponent::new(&greeting).prop("name", "Grace").into(), Some(&body));

	assert_eq!(reconciler.adapter().to_markup(body), "<body><b>Grace</b></body>");
	assert_eq!(reconciler.component_count(), 1);
}

#[test]
fn components_rendering_components_share_their_base() {
	let (mut reconciler, body) = setup();
	let log = Log::default();
	let inner = counter(&log);
	let outer = {
		let inner = inner.clone();
		ComponentType::function("Outer", move |_| VComponent::new(&inner).into())
	};

	let span = reconciler.reconcile(None, &VComponent::new(&outer).into(), Some(&body));
	let outer_id = reconciler.component_of(&span).unwrap();
	let inner_id = reconciler.rendered_component(outer_id).unwrap();
	assert_eq!(reconciler.base(inner_id), Some(&span));
	assert_eq!(reconciler.base(outer_id), Some(&span));

	reconciler.set_state(inner_id, map([("count", 5)]));
	assert_eq!(reconciler.component_of(&span), Some(outer_id));
	assert_eq!(reconciler.adapter().to_markup(body), "<body><span>5</span></body>");
	take(&log);

	let same = reconciler.reconcile(Some(&span), &VComponent::new(&outer).into(), Some(&body));
	assert_eq!(same, span);
	assert_eq!(reconciler.rendered_component(outer_id), Some(inner_id));
	assert_eq!(take(&log), ["will_receive_props None -> None", "render", "did_update"]);
	assert_eq!(reconciler.adapter().to_markup(body), "<body><span>5</span></body>");

	reconciler.unmount(&span);
	assert_eq!(reconciler.lifecycle(outer_id), Lifecycle::Unmounted);
	assert_eq!(reconciler.lifecycle(inner_id), Lifecycle::Unmounted);
	assert_eq!(reconciler.component_count(), 0);
}

#[test]
fn unkeyed_components_match_by_type() {
	let (mut reconciler, body) = setup();
	let log = Log::default();
	let first_type = counter(&log);
	let second_type = counter(&log);
	let div = reconciler.reconcile(
		None,
		&h("div").child(VComponent::new(&first_type)).child(VComponent::new(&second_type)).into(),
		Some(&body),
	);
	let before = reconciler.adapter().children(&div);
	let first = reconciler.component_of(&before[0]).unwrap();
	let second = reconciler.component_of(&before[1]).unwrap();
	take(&log);

	reconciler.reconcile(
		Some(&div),
		&h("div").child(VComponent::new(&second_type)).child(VComponent::new(&first_type)).into(),
		Some(&body),
	);

	let after = reconciler.adapter().children(&div);
	assert_eq!(after, vec![before[1], before[0]]);
	assert_eq!(reconciler.component_of(&after[0]), Some(second));
	assert_eq!(reconciler.component_of(&after[1]), Some(first));
	assert_eq!(reconciler.component_count(), 2);
	assert!(!take(&log).iter().any(|entry| entry == "will_unmount"));
}

/// Marks itself ready before its first render.
struct Greeter {
	log: Log,
}

impl Component for Greeter {
	fn render(&self, props: &Props, state: &State) -> VNode {
		let name = props.get("name").and_then(Value::as_text).unwrap_or("<none>").to_owned();
		let ready = state.get("ready").and_then(Value::as_bool);
		self.log.borrow_mut().push(format!("render name={} ready={:?}", name, ready));
		h("p").child(name).into()
	}

	fn will_mount(&self, cx: &mut Context<'_>) {
		let name = cx.props().and_then(|props| props.get("name")).and_then(Value::as_text).map(str::to_owned);
		self.log.borrow_mut().push(format!("will_mount name={:?}", name));
		cx.set_state(map([("ready", true)]));
	}

	fn did_mount(&self, _cx: &mut Context<'_>) {
		self.log.borrow_mut().push("did_mount".to_owned());
	}

	fn did_update(&self, _cx: &mut Context<'_>) {
		self.log.borrow_mut().push("did_update".to_owned());
	}
}

#[test]
fn state_set_before_mount_joins_the_first_render() {
	let (mut reconciler, body) = setup();
	let log = Log::default();
	let greeter = {
		let log = Rc::clone(&log);
		ComponentType::stateful("Greeter", move |_| Greeter { log: Rc::clone(&log) })
	};

	let p = reconciler.reconcile(None, &VComponent::new(&greeter).prop("name", "Ada").into(), Some(&body));

	assert_eq!(
		take(&log),
		[r#"will_mount name=Some("Ada")"#, "render name=Ada ready=Some(true)", "did_mount"],
	);
	let id = reconciler.component_of(&p).unwrap();
	assert_eq!(reconciler.lifecycle(id), Lifecycle::Mounted);
	assert_eq!(reconciler.state(id).unwrap()["ready"], Value::from(true));
	assert_eq!(reconciler.adapter().to_markup(body), "<body><p>Ada</p></body>");
}

/// Loads its content right after mounting.
struct Loader {
	renders: Rc<RefCell<usize>>,
}

impl Component for Loader {
	fn render(&self, _props: &Props, state: &State) -> VNode {
		*self.renders.borrow_mut() += 1;
		let loaded = state.get("loaded").and_then(Value::as_bool).unwrap_or(false);
		h("i").child(if loaded { "loaded" } else { "loading" }).into()
	}

	fn did_mount(&self, cx: &mut Context<'_>) {
		cx.set_state(map([("loaded", true)]));
	}
}

#[test]
fn hooks_may_update_state() {
	let (mut reconciler, body) = setup();
	let renders = Rc::new(RefCell::new(0));
	let loader = {
		let renders = Rc::clone(&renders);
		ComponentType::stateful("Loader", move |_| Loader { renders: Rc::clone(&renders) })
	};

	let i = reconciler.reconcile(None, &VComponent::new(&loader).into(), Some(&body));

	assert_eq!(*renders.borrow(), 2);
	assert_eq!(reconciler.adapter().to_markup(body), "<body><i>loaded</i></body>");
	let id = reconciler.component_of(&i).unwrap();
	assert_eq!(reconciler.lifecycle(id), Lifecycle::Mounted);
}

#[test]
fn updates_for_unmounted_components_are_ignored() {
	let (mut reconciler, body) = setup();
	let log = Log::default();
	let span = reconciler.reconcile(None, &VComponent::new(&counter(&log)).into(), Some(&body));
	let id = reconciler.component_of(&span).unwrap();
	reconciler.unmount(&span);
	take(&log);

	reconciler.set_state(id, map([("count", 1)]));

	assert!(take(&log).is_empty());
	assert_eq!(reconciler.state(id), None);
}

#[test]
fn into_adapter_unmounts_everything() {
	let (mut reconciler, body) = setup();
	let log = Log::default();
	let ty = counter(&log);
	reconciler.reconcile(None, &h("div").child(VComponent::new(&ty)).child(VComponent::new(&ty)).into(), Some(&body));
	take(&log);

	let dom = reconciler.into_adapter();

	assert_eq!(take(&log), ["will_unmount", "will_unmount"]);
	assert_eq!(dom.inner_markup(body), "<div><span>0</span><span>0</span></div>");
}
