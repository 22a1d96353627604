//! Reading existing live nodes back into virtual nodes, e.g. to adopt server-rendered markup or to snapshot a tree.

use crate::{
	adapter::{NodeAdapter, NodeKind},
	vnode::{Attributes, VElement, VNode},
};

pub fn load_node<A: NodeAdapter>(adapter: &A, node: &A::Node) -> VNode {
	match adapter.node_kind(node) {
		NodeKind::Text => VNode::Text(adapter.text(node)),
		NodeKind::Element(tag) => VNode::Element(load_element(adapter, node, tag)),
	}
}

pub fn load_element<A: NodeAdapter>(adapter: &A, element: &A::Node, tag: String) -> VElement {
	VElement {
		tag,
		key: None,
		attrs: load_attributes(adapter, element),
		children: load_child_nodes(adapter, element),
	}
}

pub fn load_child_nodes<A: NodeAdapter>(adapter: &A, parent: &A::Node) -> Vec<VNode> {
	adapter.children(parent).iter().map(|child| load_node(adapter, child)).collect()
}

pub fn load_attributes<A: NodeAdapter>(adapter: &A, element: &A::Node) -> Attributes {
	adapter.attributes(element).into_iter().collect()
}
