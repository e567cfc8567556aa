//! Hover highlight of a node and its neighbours, with fade in/out.

use super::builder::GraphModel;
use super::viewport::ease_out_cubic;

/// Seconds the pointer has to rest on a node before its neighbourhood lights up.
const HOVER_DELAY: f64 = 0.08;
const FADE_IN_RATE: f64 = 1.8;
const FADE_OUT_RATE: f64 = 1.26;

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	/// Node whose neighbourhood is lit. Kept after the pointer leaves until the fade ends.
	focus: Option<usize>,
	/// Sorted neighbourhood of `focus`.
	lit: Vec<usize>,
	pointer_on_focus: bool,
	level: f64,
	rest: f64,
}

impl HoverState {
	/// Node currently under the pointer.
	pub fn hovered(&self) -> Option<usize> {
		self.focus.filter(|_| self.pointer_on_focus)
	}

	pub fn set(&mut self, model: &GraphModel, node: Option<usize>) {
		match node {
			None => self.pointer_on_focus = false,
			Some(idx) if self.hovered() == Some(idx) => {}
			Some(idx) => {
				if !self.pointer_on_focus {
					self.rest = 0.0;
				}
				self.focus = Some(idx);
				self.lit = model.neighborhood(idx);
				self.pointer_on_focus = true;
			}
		}
	}

	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.lit.binary_search(&idx).is_ok()
	}

	pub fn is_hovered(&self, idx: usize) -> bool {
		self.focus == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.focus.is_some()
	}

	/// Eased highlight strength in [0, 1].
	pub fn strength(&self) -> f64 {
		ease_out_cubic(self.level.clamp(0.0, 1.0))
	}

	/// Returns true while the fade is still changing.
	pub fn tick(&mut self, dt: f64) -> bool {
		let before = self.level;
		if self.pointer_on_focus {
			self.rest = (self.rest + dt).min(HOVER_DELAY);
			if self.rest >= HOVER_DELAY {
				self.level += (1.0 - self.level) * FADE_IN_RATE * dt;
			}
			return self.level < 0.99 || (self.level - before).abs() > 1e-4;
		}
		self.level -= self.level * FADE_OUT_RATE * dt;
		if self.level < 0.01 {
			self.level = 0.0;
			self.focus = None;
			self.lit.clear();
		}
		(self.level - before).abs() > 1e-4
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::components::entity_graph::builder::build_model;
	use crate::components::entity_graph::types::{DashboardSnapshot, EntityRecord};

	fn model() -> GraphModel {
		build_model(&DashboardSnapshot {
			tracks: vec![Arc::new(EntityRecord::new("T1"))],
			projects: vec![Arc::new(EntityRecord::new("P1").with_parent("T1"))],
			tasks: vec![Arc::new(EntityRecord::new("K1"))],
			..Default::default()
		})
	}

	#[test]
	fn hover_highlights_neighbors_then_fades() {
		let model = model();
		let mut hover = HoverState::default();
		hover.set(&model, Some(0));
		assert_eq!(hover.hovered(), Some(0));
		assert!(hover.is_highlighted(0) && hover.is_highlighted(1));
		assert!(!hover.is_highlighted(2));

		for _ in 0..120 {
			hover.tick(0.016);
		}
		assert!(hover.strength() > 0.9);

		hover.set(&model, None);
		assert_eq!(hover.hovered(), None);
		assert!(hover.is_highlighted(1), "fading highlight keeps neighbours");
		for _ in 0..600 {
			hover.tick(0.016);
		}
		assert!(!hover.has_active_highlight());
		assert!(!hover.is_highlighted(0));
		assert_eq!(hover.strength(), 0.0);
	}

	#[test]
	fn moving_to_another_node_switches_the_neighbourhood() {
		let model = model();
		let mut hover = HoverState::default();
		hover.set(&model, Some(0));
		for _ in 0..60 {
			hover.tick(0.016);
		}
		let lit = hover.strength();

		hover.set(&model, Some(2));
		assert!(hover.is_hovered(2) && !hover.is_hovered(0));
		assert!(!hover.is_highlighted(1));
		hover.tick(0.016);
		assert!(hover.strength() >= lit, "no fade between adjacent hovers");
	}
}
