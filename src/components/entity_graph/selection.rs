//! Single-node selection.

use log::debug;

use super::builder::GraphModel;
use super::types::SelectionEvent;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionController {
	selected: Option<usize>,
}

impl SelectionController {
	pub fn selected(&self) -> Option<usize> {
		self.selected
	}

	pub fn is_selected(&self, idx: usize) -> bool {
		self.selected == Some(idx)
	}

	/// Make `idx` the only selected node and describe it for the detail panel.
	pub fn select(&mut self, model: &GraphModel, idx: usize) -> Option<SelectionEvent> {
		let node = model.nodes.get(idx)?;
		self.selected = Some(idx);
		Some(SelectionEvent {
			id: node.id.clone(),
			node_type: node.node_type,
			name: node.name.clone(),
			data: node.data.clone(),
		})
	}

	/// Same as [`select`](Self::select) after an id lookup. Unknown ids leave the selection as is.
	pub fn select_by_id(&mut self, model: &GraphModel, id: &str) -> Option<SelectionEvent> {
		let Some(idx) = model.index_of(id) else {
			debug!("select_by_id: no node with id {id:?}");
			return None;
		};
		self.select(model, idx)
	}

	pub fn clear(&mut self) {
		self.selected = None;
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::components::entity_graph::builder::build_model;
	use crate::components::entity_graph::types::{DashboardSnapshot, EntityRecord, NodeType};

	fn model() -> GraphModel {
		build_model(&DashboardSnapshot {
			tracks: vec![Arc::new(EntityRecord::new("T1").with_name("Growth"))],
			tasks: vec![Arc::new(EntityRecord::new("K1"))],
			..Default::default()
		})
	}

	#[test]
	fn selecting_another_node_replaces_selection() {
		let model = model();
		let mut selection = SelectionController::default();
		assert_eq!(selection.selected(), None);

		let event = selection.select(&model, 0).expect("node 0");
		assert_eq!(event.id, "T1");
		assert_eq!(event.node_type, NodeType::Track);
		assert_eq!(event.name, "Growth");
		assert!(Arc::ptr_eq(&event.data, &model.nodes[0].data));

		selection.select(&model, 1).expect("node 1");
		assert!(selection.is_selected(1));
		assert!(!selection.is_selected(0));
	}

	#[test]
	fn unknown_id_is_a_no_op() {
		let model = model();
		let mut selection = SelectionController::default();
		selection.select_by_id(&model, "K1").expect("K1 exists");
		assert!(selection.select_by_id(&model, "nope").is_none());
		assert_eq!(selection.selected(), model.index_of("K1"));
	}

	#[test]
	fn out_of_range_index_is_ignored() {
		let model = model();
		let mut selection = SelectionController::default();
		assert!(selection.select(&model, 99).is_none());
		assert_eq!(selection.selected(), None);
	}
}
