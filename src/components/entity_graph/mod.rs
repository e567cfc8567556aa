//! Layered entity-relationship graph of the planning dashboard.
//!
//! [`EntityGraphCanvas`] mounts a [`GraphEngine`] on a canvas. The engine itself is
//! browser-free: it builds the model from a [`DashboardSnapshot`], runs the layered force
//! layout, and turns pointer input and commands into a [`Scene`] of draw commands.

mod builder;
mod component;
mod config;
mod controls;
mod engine;
mod error;
mod hover;
mod layout;
mod render;
mod routing;
mod scene;
mod selection;
mod types;
mod viewport;

pub use builder::{CONDITIONS_3Y, GraphModel, PARENT, PART_OF, VALIDATES};
pub use component::EntityGraphCanvas;
pub use config::{EdgeStyle, GraphConfig, LayoutConfig, ViewportConfig};
pub use engine::{GraphEngine, RenderOutcome};
pub use error::SnapshotError;
pub use scene::Scene;
pub use types::{
	DashboardSnapshot, Edge, EntityRecord, Layer, Node, NodeStyle, NodeType, OutgoingRelation,
	Point, SelectionEvent,
};
pub use viewport::{ViewTransform, ViewportController};
