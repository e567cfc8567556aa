//! Tunables for layout, viewport and edge drawing.

use serde::Deserialize;

use super::types::Layer;

/// Everything the graph can be tuned with. Deserialises from partial JSON.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Force simulation.
	pub layout: LayoutConfig,
	/// Zoom, pan and pointer handling.
	pub viewport: ViewportConfig,
	/// Edge geometry and stroke.
	pub edges: EdgeStyle,
}

impl GraphConfig {
	/// Parse a partial JSON override; unspecified fields keep their defaults.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}

/// Force layout parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Strategy band centre as a fraction of canvas height.
	pub strategy_fraction: f64,
	/// Execution band centre.
	pub execution_fraction: f64,
	/// Task band centre.
	pub task_fraction: f64,
	/// Rest length of a link.
	pub link_distance: f64,
	/// How hard links pull toward their rest length, 0 to 1.
	pub link_strength: f64,
	/// Many-body repulsion passed to `force_graph`.
	pub charge: f32,
	/// Mass of every simulated node.
	pub node_mass: f32,
	/// Velocity damping per step.
	pub damping: f32,
	/// Velocity scale of the integrator.
	pub node_speed: f32,
	/// Cap on the force applied to one node per step.
	pub max_force: f32,
	/// Pull toward the horizontal centre.
	pub center_strength: f64,
	/// Pull toward the layer band.
	pub layer_strength: f64,
	/// Share of the simulated y kept after each tick; the rest snaps to the layer band.
	pub layer_blend: f64,
	/// Clearance kept around every circle.
	pub collision_margin: f64,
	/// Share of an overlap resolved per tick.
	pub collision_strength: f64,
	/// Rate at which alpha approaches its target.
	pub alpha_decay: f64,
	/// Alpha below which the simulation stops.
	pub alpha_min: f64,
	/// Alpha target held while a node is dragged.
	pub drag_alpha_target: f64,
	/// Largest distance a node may travel in one tick.
	pub max_step: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			strategy_fraction: 0.15,
			execution_fraction: 0.5,
			task_fraction: 0.85,
			link_distance: 100.0,
			link_strength: 0.5,
			charge: 150.0,
			node_mass: 10.0,
			damping: 0.9,
			node_speed: 3000.0,
			max_force: 100.0,
			center_strength: 0.05,
			layer_strength: 0.8,
			layer_blend: 0.1,
			collision_margin: 6.0,
			collision_strength: 0.7,
			// 1 - alpha_min^(1/300): cools to alpha_min in roughly 300 ticks
			alpha_decay: 0.0228,
			alpha_min: 0.001,
			drag_alpha_target: 0.3,
			max_step: 40.0,
		}
	}
}

impl LayoutConfig {
	/// Band centre of `layer` as a fraction of canvas height.
	pub fn layer_fraction(&self, layer: Layer) -> f64 {
		match layer {
			Layer::Strategy => self.strategy_fraction,
			Layer::Execution => self.execution_fraction,
			Layer::Task => self.task_fraction,
		}
	}
}

/// Viewport limits and pointer thresholds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
	/// Smallest zoom the user can reach.
	pub min_zoom: f64,
	/// Largest zoom the user can reach.
	pub max_zoom: f64,
	/// Zoom step per wheel notch.
	pub wheel_factor: f64,
	/// Zoom step of the zoom buttons.
	pub button_factor: f64,
	/// Screen padding kept by zoom-to-fit.
	pub fit_padding: f64,
	/// Zoom-to-fit never scales past this.
	pub fit_max_scale: f64,
	/// Duration of fit and reset transitions.
	pub transition_ms: f64,
	/// Pointer travel below which a press on a node counts as a click.
	pub click_slop: f64,
	/// Extra hit-test radius around nodes, in graph units.
	pub hit_slop: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.1,
			max_zoom: 4.0,
			wheel_factor: 1.1,
			button_factor: 1.2,
			fit_padding: 40.0,
			fit_max_scale: 1.5,
			transition_ms: 750.0,
			click_slop: 3.0,
			hit_slop: 2.0,
		}
	}
}

/// Edge geometry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EdgeStyle {
	/// Upward shift of the curve's control point.
	pub arc_offset: f64,
	/// Gap left before the target circle for the arrowhead.
	pub arrow_margin: f64,
	/// Arrowhead length.
	pub arrow_size: f64,
	/// Stroke width.
	pub line_width: f64,
}

impl Default for EdgeStyle {
	fn default() -> Self {
		Self {
			arc_offset: 20.0,
			arrow_margin: 6.0,
			arrow_size: 8.0,
			line_width: 1.5,
		}
	}
}
