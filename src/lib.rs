//! A keyed virtual DOM reconciler with stateful components.
//!
//! [`Reconciler`] brings a live node tree, reached only through a [`NodeAdapter`], into agreement with a [`VNode`] tree,
//! mutating eagerly and reusing live nodes wherever kind, tag, key or component type allow it.
//! [`memory::MemoryDom`] is a headless tree for tests and off-browser use. On wasm32, `web::WebAdapter` drives the browser DOM.
//!
//! # Logging
//!
//! Diagnostics go through [`tracing`]. Node contents (text, attribute values) only appear in log fields
//! with the `"dangerous-logging"` feature enabled.

#![doc(html_root_url = "https://docs.rs/xylem-dom/0.0.1")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod adapter;
pub mod attribute;
pub mod component;
pub mod diff;
pub mod load;
pub mod memory;
pub mod value;
pub mod vnode;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod rc_hash_map;

pub use adapter::{NodeAdapter, NodeKind};
pub use component::{Component, ComponentId, ComponentType, Context, Lifecycle};
pub use diff::Reconciler;
pub use value::{Handler, Key, Props, State, Value};
pub use vnode::{h, VComponent, VElement, VNode};
