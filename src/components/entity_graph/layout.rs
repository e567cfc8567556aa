//! Layered force layout.
//!
//! `force_graph` supplies the many-body repulsion and velocity integration. On top of each of
//! its steps this module applies the link, horizontal centering, layer pull and collision
//! forces, scales the whole displacement by the simulation energy (`alpha`), and finally snaps
//! every free node most of the way back onto its layer band.

use force_graph::{DefaultNodeIdx, ForceGraph, NodeData, SimulationParameters};

use super::builder::GraphModel;
use super::config::LayoutConfig;
use super::types::{Layer, Point};

/// Soft layer constraint: keep `blend` of the simulated y and take the rest from the band.
///
/// This is deliberately not a hard constraint. Nodes still wobble a little around their band,
/// which keeps motion readable while dragging.
pub fn soft_layer_constraint(simulated_y: f64, target_y: f64, blend: f64) -> f64 {
	target_y + blend * (simulated_y - target_y)
}

pub struct LayeredForceLayout {
	graph: ForceGraph<usize, ()>,
	handles: Vec<DefaultNodeIdx>,
	config: LayoutConfig,
	width: f64,
	height: f64,
	alpha: f64,
	alpha_target: f64,
}

impl LayeredForceLayout {
	pub fn new(model: &GraphModel, config: LayoutConfig, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: config.charge,
			// Links are resolved here against a rest length, not by force_graph's springs.
			force_spring: 0.0,
			force_max: config.max_force,
			node_speed: config.node_speed,
			damping_factor: config.damping,
		});
		let handles = model
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				graph.add_node(NodeData {
					x: node.position.x as f32,
					y: node.position.y as f32,
					mass: config.node_mass,
					is_anchor: false,
					user_data: i,
				})
			})
			.collect();

		Self {
			graph,
			handles,
			config,
			width,
			height,
			alpha: 1.0,
			alpha_target: 0.0,
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	/// Whether another tick would still move anything.
	pub fn is_active(&self) -> bool {
		self.alpha >= self.config.alpha_min || self.alpha_target >= self.config.alpha_min
	}

	pub fn node_count(&self) -> usize {
		self.handles.len()
	}

	pub fn layer_target_y(&self, layer: Layer) -> f64 {
		self.height * self.config.layer_fraction(layer)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Spread each layer's members evenly across the canvas width, on the layer's band.
	pub fn initialize_positions(&self, model: &mut GraphModel) {
		for layer in Layer::ALL {
			let members: Vec<usize> = model.layer_members(layer).collect();
			let y = self.layer_target_y(layer);
			let step = self.width / (members.len() + 1) as f64;
			for (slot, idx) in members.into_iter().enumerate() {
				let node = &mut model.nodes[idx];
				node.position = Point::new(step * (slot + 1) as f64, y);
				node.pinned = None;
			}
		}
	}

	/// Lay the nodes out again from scratch at full energy.
	pub fn reset(&mut self, model: &mut GraphModel) {
		self.initialize_positions(model);
		self.alpha = 1.0;
		self.alpha_target = 0.0;
	}

	/// Advance one step. Returns false once the simulation has cooled down.
	pub fn tick(&mut self, model: &mut GraphModel, dt: f32) -> bool {
		if !self.is_active() || model.nodes.len() != self.handles.len() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		let alpha = self.alpha;

		let before: Vec<Point> = model.nodes.iter().map(|n| n.pinned.unwrap_or(n.position)).collect();
		let free: Vec<bool> = model.nodes.iter().map(|n| n.pinned.is_none()).collect();

		self.graph.visit_nodes_mut(|node| {
			let i = node.data.user_data;
			node.data.x = before[i].x as f32;
			node.data.y = before[i].y as f32;
			node.data.is_anchor = !free[i];
		});
		self.graph.update(dt);

		let mut next = before.clone();
		self.graph.visit_nodes(|node| {
			let i = node.data.user_data;
			let (x, y) = (node.x() as f64, node.y() as f64);
			if free[i] && x.is_finite() && y.is_finite() {
				next[i] = Point::new(
					before[i].x + (x - before[i].x) * alpha,
					before[i].y + (y - before[i].y) * alpha,
				);
			}
		});

		self.apply_links(model, &free, &mut next, alpha);
		self.apply_anchoring(model, &free, &mut next, alpha);
		self.apply_collisions(model, &free, &mut next);

		let max_step = self.config.max_step;
		for (i, node) in model.nodes.iter_mut().enumerate() {
			if let Some(pin) = node.pinned {
				node.position = pin;
				continue;
			}
			let (mut dx, mut dy) = (next[i].x - before[i].x, next[i].y - before[i].y);
			let travel = dx.hypot(dy);
			if !travel.is_finite() {
				continue;
			}
			if travel > max_step {
				dx *= max_step / travel;
				dy *= max_step / travel;
			}
			let target_y = self.height * self.config.layer_fraction(node.layer);
			node.position = Point::new(
				before[i].x + dx,
				soft_layer_constraint(before[i].y + dy, target_y, self.config.layer_blend),
			);
		}
		self.separate_layers(model);
		true
	}

	/// Pull linked nodes toward the rest length, the less-connected end moving more.
	fn apply_links(&self, model: &GraphModel, free: &[bool], next: &mut [Point], alpha: f64) {
		let mut degree = vec![0usize; model.nodes.len()];
		for edge in &model.edges {
			degree[edge.source] += 1;
			degree[edge.target] += 1;
		}

		for edge in &model.edges {
			let (s, t) = (edge.source, edge.target);
			if s == t {
				continue;
			}
			let (dx, dy) = (next[t].x - next[s].x, next[t].y - next[s].y);
			let dist = dx.hypot(dy);
			if dist < 1e-6 {
				continue;
			}
			let l = (dist - self.config.link_distance) / dist * alpha * self.config.link_strength;
			let bias = degree[s] as f64 / (degree[s] + degree[t]) as f64;
			if free[t] {
				next[t].x -= dx * l * bias;
				next[t].y -= dy * l * bias;
			}
			if free[s] {
				next[s].x += dx * l * (1.0 - bias);
				next[s].y += dy * l * (1.0 - bias);
			}
		}
	}

	/// Weak pull to the horizontal centre and strong pull to the layer band.
	fn apply_anchoring(&self, model: &GraphModel, free: &[bool], next: &mut [Point], alpha: f64) {
		let center_x = self.width / 2.0;
		for (i, node) in model.nodes.iter().enumerate() {
			if !free[i] {
				continue;
			}
			let target_y = self.layer_target_y(node.layer);
			next[i].x += (center_x - next[i].x) * self.config.center_strength * alpha;
			next[i].y += (target_y - next[i].y) * self.config.layer_strength * alpha;
		}
	}

	/// Push apart node circles (radius plus margin) that overlap.
	fn apply_collisions(&self, model: &GraphModel, free: &[bool], next: &mut [Point]) {
		let margin = self.config.collision_margin;
		let strength = self.config.collision_strength;
		let n = model.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				if !free[i] && !free[j] {
					continue;
				}
				let min = model.nodes[i].radius + model.nodes[j].radius + 2.0 * margin;
				let (mut dx, mut dy) = (next[j].x - next[i].x, next[j].y - next[i].y);
				let mut dist = dx.hypot(dy);
				if dist >= min {
					continue;
				}
				if dist < 1e-6 {
					// Coincident centres: separate sideways, deterministically.
					(dx, dy, dist) = (1.0, 0.0, 1.0);
				}
				let push = (min - dist) / dist * strength;
				let (mut px, mut py) = (dx * push, dy * push);
				if model.nodes[i].layer == model.nodes[j].layer {
					// Same band: push sideways, the blend would undo a vertical push.
					let sign = if dx < 0.0 { -1.0 } else { 1.0 };
					(px, py) = (sign * (min - dist) * strength, 0.0);
				}
				match (free[i], free[j]) {
					(true, true) => {
						next[i].x -= px * 0.5;
						next[i].y -= py * 0.5;
						next[j].x += px * 0.5;
						next[j].y += py * 0.5;
					}
					(true, false) => {
						next[i].x -= px;
						next[i].y -= py;
					}
					_ => {
						next[j].x += px;
						next[j].y += py;
					}
				}
			}
		}
	}

	/// Spread free nodes that still overlap on a band apart along x.
	///
	/// Members are swept left to right and right to left, each sweep pushing a node just
	/// clear of the previous one; the two results are averaged so the band does not drift.
	fn separate_layers(&self, model: &mut GraphModel) {
		let margin = self.config.collision_margin;
		for layer in Layer::ALL {
			let mut members: Vec<usize> = model
				.layer_members(layer)
				.filter(|&i| model.nodes[i].pinned.is_none())
				.collect();
			if members.len() < 2 {
				continue;
			}
			members.sort_by(|&a, &b| {
				model.nodes[a]
					.position
					.x
					.total_cmp(&model.nodes[b].position.x)
					.then(a.cmp(&b))
			});
			let gap = |a: usize, b: usize| model.nodes[a].radius + model.nodes[b].radius + 2.0 * margin;

			let xs: Vec<f64> = members.iter().map(|&i| model.nodes[i].position.x).collect();
			let mut rightward = xs.clone();
			for k in 1..members.len() {
				rightward[k] = rightward[k].max(rightward[k - 1] + gap(members[k - 1], members[k]));
			}
			let mut leftward = xs;
			for k in (0..members.len() - 1).rev() {
				leftward[k] = leftward[k].min(leftward[k + 1] - gap(members[k], members[k + 1]));
			}
			for (k, &i) in members.iter().enumerate() {
				model.nodes[i].position.x = (rightward[k] + leftward[k]) / 2.0;
			}
		}
	}
}
