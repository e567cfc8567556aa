//! Zoom, pan and animated view transitions.

use log::debug;

use super::builder::GraphModel;
use super::config::ViewportConfig;
use super::types::Point;

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Graph-to-screen transform: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in pixels.
	pub x: f64,
	/// Vertical translation in pixels.
	pub y: f64,
	/// Scale.
	pub k: f64,
}

impl ViewTransform {
	/// No zoom, no pan.
	pub const IDENTITY: ViewTransform = ViewTransform { x: 0.0, y: 0.0, k: 1.0 };

	/// Inverse of [`Self::graph_to_screen`].
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Where a graph point lands on screen.
	pub fn graph_to_screen(&self, p: Point) -> Point {
		Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	fn lerp(&self, to: &ViewTransform, t: f64) -> ViewTransform {
		ViewTransform {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug)]
struct Transition {
	from: ViewTransform,
	to: ViewTransform,
	elapsed_ms: f64,
	duration_ms: f64,
}

/// Zoom and pan of one surface, with animated fit and reset.
pub struct ViewportController {
	/// Transform currently drawn.
	pub transform: ViewTransform,
	/// Background drag in progress.
	pub pan: PanState,
	transition: Option<Transition>,
	config: ViewportConfig,
	width: f64,
	height: f64,
}

impl ViewportController {
	/// Identity view of a surface of the given size.
	pub fn new(config: ViewportConfig, width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform::IDENTITY,
			pan: PanState::default(),
			transition: None,
			config,
			width,
			height,
		}
	}

	/// Limits in use.
	pub fn config(&self) -> &ViewportConfig {
		&self.config
	}

	/// Surface size in pixels.
	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// New surface size; the transform is kept.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// True while a fit or reset transition runs.
	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	/// Final transform of the running transition, or the current one.
	pub fn target(&self) -> ViewTransform {
		self.transition.as_ref().map_or(self.transform, |t| t.to)
	}

	/// Graph point under a screen point.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		self.transform.screen_to_graph(sx, sy)
	}

	/// Zoom by `factor` keeping the screen point (sx, sy) fixed. Interrupts any transition.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.transition = None;
		let new_k = (self.transform.k * factor).clamp(self.config.min_zoom, self.config.max_zoom);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Zoom about the viewport centre.
	pub fn zoom_by(&mut self, factor: f64) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, factor);
	}

	/// Wheel notch: scrolling down zooms out. Purely horizontal scrolls are ignored.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if delta_y == 0.0 || delta_y.is_nan() {
			return;
		}
		let factor = if delta_y > 0.0 {
			1.0 / self.config.wheel_factor
		} else {
			self.config.wheel_factor
		};
		self.zoom_at(sx, sy, factor);
	}

	/// Begin a background pan. Interrupts any transition.
	pub fn pan_start(&mut self, sx: f64, sy: f64) {
		self.transition = None;
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	/// Follow the pointer while panning.
	pub fn pan_move(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
	}

	/// Stop panning.
	pub fn pan_end(&mut self) {
		self.pan.active = false;
	}

	/// Transform that shows every node circle inside the padded viewport, or None for an
	/// empty model.
	pub fn fit_transform(&self, model: &GraphModel) -> Option<ViewTransform> {
		let mut nodes = model.nodes.iter();
		let first = nodes.next()?;
		let init = (
			first.position.x - first.radius,
			first.position.y - first.radius,
			first.position.x + first.radius,
			first.position.y + first.radius,
		);
		let (min_x, min_y, max_x, max_y) = nodes.fold(init, |(x0, y0, x1, y1), n| {
			(
				x0.min(n.position.x - n.radius),
				y0.min(n.position.y - n.radius),
				x1.max(n.position.x + n.radius),
				y1.max(n.position.y + n.radius),
			)
		});

		let (box_w, box_h) = (max_x - min_x, max_y - min_y);
		let padding = self.config.fit_padding;
		let (avail_w, avail_h) = (
			(self.width - 2.0 * padding).max(1.0),
			(self.height - 2.0 * padding).max(1.0),
		);
		let mut k = self.config.fit_max_scale;
		if box_w > 0.0 {
			k = k.min(avail_w / box_w);
		}
		if box_h > 0.0 {
			k = k.min(avail_h / box_h);
		}
		if !k.is_finite() || k <= 0.0 {
			return None;
		}

		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		Some(ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		})
	}

	/// Animate to [`Self::fit_transform`]; no-op on an empty model.
	pub fn zoom_to_fit(&mut self, model: &GraphModel) {
		if let Some(target) = self.fit_transform(model) {
			debug!("zoom to fit: k={:.3}", target.k);
			self.animate_to(target);
		}
	}

	/// Animate back to the identity transform.
	pub fn reset(&mut self) {
		self.pan_end();
		self.animate_to(ViewTransform::IDENTITY);
	}

	/// Start a transition from the current transform, replacing any running one.
	pub fn animate_to(&mut self, to: ViewTransform) {
		self.transition = Some(Transition {
			from: self.transform,
			to,
			elapsed_ms: 0.0,
			duration_ms: self.config.transition_ms,
		});
	}

	/// Advance the running transition. Returns true while it is still in flight.
	pub fn advance(&mut self, dt_ms: f64) -> bool {
		let Some(transition) = self.transition.as_mut() else {
			return false;
		};
		transition.elapsed_ms += dt_ms;
		let t = if transition.duration_ms <= 0.0 {
			1.0
		} else {
			(transition.elapsed_ms / transition.duration_ms).min(1.0)
		};
		self.transform = transition.from.lerp(&transition.to, ease_out_cubic(t));
		if t >= 1.0 {
			self.transform = transition.to;
			self.transition = None;
			return false;
		}
		true
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use proptest::prelude::*;

	use super::*;
	use crate::components::entity_graph::builder::build_model;
	use crate::components::entity_graph::types::{DashboardSnapshot, EntityRecord};

	fn model_with_positions(points: &[(f64, f64)]) -> GraphModel {
		let snapshot = DashboardSnapshot {
			tasks: (0..points.len())
				.map(|i| Arc::new(EntityRecord::new(format!("K{i}"))))
				.collect(),
			..Default::default()
		};
		let mut model = build_model(&snapshot);
		for (node, &(x, y)) in model.nodes.iter_mut().zip(points) {
			node.position = Point::new(x, y);
		}
		model
	}

	#[test]
	fn horizontal_scroll_leaves_zoom_alone() {
		let mut viewport = ViewportController::new(ViewportConfig::default(), 800.0, 600.0);
		viewport.wheel(300.0, 200.0, 0.0);
		viewport.wheel(300.0, 200.0, f64::NAN);
		assert_eq!(viewport.transform, ViewTransform::IDENTITY);
	}

	#[test]
	fn wheel_zoom_keeps_pointer_fixed_and_clamps() {
		let mut viewport = ViewportController::new(ViewportConfig::default(), 800.0, 600.0);
		let anchor = viewport.screen_to_graph(300.0, 200.0);
		viewport.wheel(300.0, 200.0, -1.0);
		let after = viewport.screen_to_graph(300.0, 200.0);
		assert!(anchor.distance(after) < 1e-9);
		assert!(viewport.transform.k > 1.0);

		for _ in 0..200 {
			viewport.wheel(300.0, 200.0, -1.0);
		}
		assert_eq!(viewport.transform.k, ViewportConfig::default().max_zoom);
		for _ in 0..400 {
			viewport.wheel(300.0, 200.0, 1.0);
		}
		assert_eq!(viewport.transform.k, ViewportConfig::default().min_zoom);
	}

	#[test]
	fn pan_follows_pointer_only_while_active() {
		let mut viewport = ViewportController::new(ViewportConfig::default(), 800.0, 600.0);
		viewport.pan_move(50.0, 50.0);
		assert_eq!(viewport.transform, ViewTransform::IDENTITY);

		viewport.pan_start(10.0, 10.0);
		viewport.pan_move(40.0, 5.0);
		assert_eq!((viewport.transform.x, viewport.transform.y), (30.0, -5.0));
		viewport.pan_end();
		viewport.pan_move(400.0, 400.0);
		assert_eq!((viewport.transform.x, viewport.transform.y), (30.0, -5.0));
	}

	#[test]
	fn small_graph_fit_is_capped() {
		let viewport = ViewportController::new(ViewportConfig::default(), 800.0, 600.0);
		let model = model_with_positions(&[(400.0, 300.0)]);
		let fit = viewport.fit_transform(&model).expect("non-empty");
		assert_eq!(fit.k, ViewportConfig::default().fit_max_scale);
		let center = fit.graph_to_screen(Point::new(400.0, 300.0));
		assert!(center.distance(Point::new(400.0, 600.0 / 2.0)) < 1e-9);
	}

	#[test]
	fn empty_model_has_no_fit() {
		let viewport = ViewportController::new(ViewportConfig::default(), 800.0, 600.0);
		assert!(viewport.fit_transform(&GraphModel::default()).is_none());
	}

	#[test]
	fn transition_eases_to_target_and_can_be_replaced() {
		let mut viewport = ViewportController::new(ViewportConfig::default(), 800.0, 600.0);
		let model = model_with_positions(&[(0.0, 0.0), (2000.0, 1500.0)]);
		viewport.zoom_to_fit(&model);
		let fit = viewport.target();
		assert!(viewport.advance(100.0));
		assert!(viewport.transform.k < 1.0 && viewport.transform.k > fit.k);

		viewport.reset();
		assert_eq!(viewport.target(), ViewTransform::IDENTITY);
		while viewport.advance(16.0) {}
		assert_eq!(viewport.transform, ViewTransform::IDENTITY);
		assert!(!viewport.is_animating());
	}

	#[test]
	fn user_zoom_interrupts_transition() {
		let mut viewport = ViewportController::new(ViewportConfig::default(), 800.0, 600.0);
		viewport.animate_to(ViewTransform { x: 10.0, y: 10.0, k: 2.0 });
		viewport.zoom_by(1.2);
		assert!(!viewport.is_animating());
	}

	proptest! {
		#[test]
		fn fit_never_exceeds_cap_and_contains_every_node(
			points in prop::collection::vec((-5000.0f64..5000.0, -5000.0f64..5000.0), 1..40),
			width in 200.0f64..2000.0,
			height in 200.0f64..2000.0,
		) {
			let config = ViewportConfig::default();
			let viewport = ViewportController::new(config.clone(), width, height);
			let model = model_with_positions(&points);
			let fit = viewport.fit_transform(&model).expect("non-empty");
			prop_assert!(fit.k <= config.fit_max_scale);
			for node in &model.nodes {
				let p = fit.graph_to_screen(node.position);
				prop_assert!(p.x >= config.fit_padding - 1e-6 && p.x <= width - config.fit_padding + 1e-6);
				prop_assert!(p.y >= config.fit_padding - 1e-6 && p.y <= height - config.fit_padding + 1e-6);
			}
		}
	}
}
