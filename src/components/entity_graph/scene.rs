//! Pure scene description: what to draw for the current engine state.
//!
//! Nothing here touches a drawing surface. `render.rs` replays a [`Scene`] onto a canvas;
//! any other surface only needs its own replay of the same commands.

use super::builder::{CONDITIONS_3Y, GraphModel, PARENT, PART_OF, VALIDATES};
use super::config::EdgeStyle;
use super::hover::HoverState;
use super::routing::EdgeRoute;
use super::selection::SelectionController;
use super::types::Point;
use super::viewport::ViewTransform;

pub const BACKGROUND: &str = "#1a1a2e";
pub const EMPTY_MESSAGE: &str = "No tracks, conditions, hypotheses, projects or tasks to show yet.";

#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
	pub radius: f64,
	pub color: &'static str,
	pub width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
	Clear {
		width: f64,
		height: f64,
		color: &'static str,
	},
	/// Applies to every command up to the matching `PopTransform`.
	PushTransform(ViewTransform),
	Edge {
		route: EdgeRoute,
		color: &'static str,
		alpha: f64,
		width: f64,
		dashed: bool,
	},
	Node {
		center: Point,
		radius: f64,
		color: &'static str,
		alpha: f64,
		ring: Option<Ring>,
	},
	Label {
		text: String,
		at: Point,
		font_px: f64,
		alpha: f64,
	},
	PopTransform,
	EmptyState {
		message: &'static str,
		at: Point,
	},
}

/// A surface-independent list of draw commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	/// Surface width in pixels.
	pub width: f64,
	/// Surface height in pixels.
	pub height: f64,
	/// Commands in paint order.
	pub commands: Vec<DrawCommand>,
}

impl Scene {
	/// True when the scene is the empty-state placeholder.
	pub fn is_empty_state(&self) -> bool {
		self.commands
			.iter()
			.any(|c| matches!(c, DrawCommand::EmptyState { .. }))
	}

	/// Node circles drawn.
	pub fn node_count(&self) -> usize {
		self.commands
			.iter()
			.filter(|c| matches!(c, DrawCommand::Node { .. }))
			.count()
	}

	/// Edges drawn.
	pub fn edge_count(&self) -> usize {
		self.commands
			.iter()
			.filter(|c| matches!(c, DrawCommand::Edge { .. }))
			.count()
	}
}

/// Everything a scene is derived from.
pub struct Frame<'a> {
	pub model: &'a GraphModel,
	pub routes: &'a [EdgeRoute],
	pub transform: ViewTransform,
	pub selection: &'a SelectionController,
	pub hover: &'a HoverState,
	pub style: &'a EdgeStyle,
	pub width: f64,
	pub height: f64,
}

/// Stroke colour per relation label; relations outside the built-in set are dashed.
pub fn relation_stroke(relation_type: &str) -> (&'static str, bool) {
	match relation_type {
		PART_OF | PARENT => ("#64748b", false),
		VALIDATES => ("#f59e0b", false),
		CONDITIONS_3Y => ("#8b5cf6", false),
		_ => ("#94a3b8", true),
	}
}

pub fn empty_scene(width: f64, height: f64) -> Scene {
	Scene {
		width,
		height,
		commands: vec![DrawCommand::EmptyState {
			message: EMPTY_MESSAGE,
			at: Point::new(width / 2.0, height / 2.0),
		}],
	}
}

pub fn build_scene(frame: &Frame<'_>) -> Scene {
	let k = frame.transform.k;
	let mut commands = Vec::with_capacity(frame.model.nodes.len() * 2 + frame.routes.len() + 3);
	commands.push(DrawCommand::Clear {
		width: frame.width,
		height: frame.height,
		color: BACKGROUND,
	});
	commands.push(DrawCommand::PushTransform(frame.transform));

	let hover = frame.hover;
	let t = if hover.has_active_highlight() { hover.strength() } else { 0.0 };

	// t=0: every edge at base alpha; t=1: highlighted edges brighten, the rest dim
	for (edge, route) in frame.model.edges.iter().zip(frame.routes) {
		let lit = hover.is_highlighted(edge.source) && hover.is_highlighted(edge.target);
		let (alpha, width) = if lit {
			(0.6 + 0.3 * t, frame.style.line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, frame.style.line_width * (1.0 - 0.3 * t))
		};
		let (color, dashed) = relation_stroke(&edge.relation_type);
		commands.push(DrawCommand::Edge {
			route: *route,
			color,
			alpha,
			width: width / k,
			dashed,
		});
	}

	// Highlighted nodes go last so they sit on top.
	let font_px = 10.0 / k.max(0.5);
	let (dim, lit): (Vec<usize>, Vec<usize>) =
		(0..frame.model.nodes.len()).partition(|&i| !(t > 0.0 && hover.is_highlighted(i)));
	for idx in dim.into_iter().chain(lit) {
		let node = &frame.model.nodes[idx];
		let highlighted = t > 0.0 && hover.is_highlighted(idx);
		let (alpha, radius) = if t == 0.0 || highlighted {
			let grow = if hover.is_hovered(idx) { 0.35 } else if highlighted { 0.2 } else { 0.0 };
			(1.0, node.radius * (1.0 + grow * t))
		} else {
			(1.0 - 0.7 * t, node.radius * (1.0 - 0.15 * t))
		};
		let ring = frame.selection.is_selected(idx).then(|| Ring {
			radius: radius + 3.0 / k,
			color: "#ffffff",
			width: 2.0 / k,
		});
		commands.push(DrawCommand::Node {
			center: node.position,
			radius,
			color: node.color,
			alpha,
			ring,
		});
		commands.push(DrawCommand::Label {
			text: node.name.clone(),
			at: Point::new(node.position.x + radius + 3.0, node.position.y + 3.0),
			font_px,
			alpha: if highlighted { 1.0 } else { alpha * 0.8 },
		});
	}

	commands.push(DrawCommand::PopTransform);
	Scene {
		width: frame.width,
		height: frame.height,
		commands,
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::components::entity_graph::builder::build_model;
	use crate::components::entity_graph::routing::EdgeRouter;
	use crate::components::entity_graph::types::{DashboardSnapshot, EntityRecord};

	fn fixture() -> (GraphModel, EdgeRouter) {
		let model = build_model(&DashboardSnapshot {
			tracks: vec![Arc::new(EntityRecord::new("T1").with_relation("K1", "watches"))],
			projects: vec![Arc::new(EntityRecord::new("P1").with_parent("T1"))],
			tasks: vec![Arc::new(EntityRecord::new("K1").with_project("P1"))],
			..Default::default()
		});
		let mut router = EdgeRouter::new(EdgeStyle::default());
		router.update(&model);
		(model, router)
	}

	#[test]
	fn scene_lists_every_node_and_edge_inside_one_transform() {
		let (model, router) = fixture();
		let selection = SelectionController::default();
		let hover = HoverState::default();
		let scene = build_scene(&Frame {
			model: &model,
			routes: router.routes(),
			transform: ViewTransform::IDENTITY,
			selection: &selection,
			hover: &hover,
			style: router.style(),
			width: 800.0,
			height: 600.0,
		});

		assert_eq!(scene.node_count(), 3);
		assert_eq!(scene.edge_count(), 3);
		assert!(!scene.is_empty_state());
		assert!(matches!(scene.commands[1], DrawCommand::PushTransform(_)));
		assert_eq!(scene.commands.last(), Some(&DrawCommand::PopTransform));
	}

	#[test]
	fn selected_node_gets_a_ring_and_custom_relations_are_dashed() {
		let (model, router) = fixture();
		let mut selection = SelectionController::default();
		selection.select(&model, 1);
		let hover = HoverState::default();
		let scene = build_scene(&Frame {
			model: &model,
			routes: router.routes(),
			transform: ViewTransform::IDENTITY,
			selection: &selection,
			hover: &hover,
			style: router.style(),
			width: 800.0,
			height: 600.0,
		});

		let rings = scene
			.commands
			.iter()
			.filter(|c| matches!(c, DrawCommand::Node { ring: Some(_), .. }))
			.count();
		assert_eq!(rings, 1);
		let dashed = scene
			.commands
			.iter()
			.filter(|c| matches!(c, DrawCommand::Edge { dashed: true, .. }))
			.count();
		assert_eq!(dashed, 1);
	}

	#[test]
	fn empty_scene_is_only_the_placeholder() {
		let scene = empty_scene(640.0, 480.0);
		assert!(scene.is_empty_state());
		assert_eq!(scene.commands.len(), 1);
		assert_eq!(scene.node_count() + scene.edge_count(), 0);
	}
}
