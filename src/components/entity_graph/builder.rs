//! Turns a dashboard snapshot into the node/edge model.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use super::types::{DashboardSnapshot, Edge, EntityRecord, Layer, Node, NodeType, Point};

/// Containment: a parent or track holds the entity.
pub const PART_OF: &str = "part_of";
/// A project owns a task.
pub const PARENT: &str = "parent";
/// The entity tests a hypothesis.
pub const VALIDATES: &str = "validates";
/// The entity contributes to a three-year condition.
pub const CONDITIONS_3Y: &str = "conditions_3y";

/// Nodes and edges built from one snapshot, with an id index.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	/// One node per unique entity id, in collection order.
	pub nodes: Vec<Node>,
	/// Resolved relations; never dangling.
	pub edges: Vec<Edge>,
	index: HashMap<String, usize>,
}

impl GraphModel {
	/// Index of the node with `id`.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Node with `id`.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index_of(id).map(|idx| &self.nodes[idx])
	}

	/// Indices of nodes adjacent to `idx` in either direction.
	pub fn neighbors(&self, idx: usize) -> Vec<usize> {
		let mut out: Vec<usize> = self
			.edges
			.iter()
			.filter_map(|e| {
				if e.source == idx {
					Some(e.target)
				} else if e.target == idx {
					Some(e.source)
				} else {
					None
				}
			})
			.collect();
		out.sort_unstable();
		out.dedup();
		out
	}

	/// `idx` together with its neighbours, sorted.
	pub fn neighborhood(&self, idx: usize) -> Vec<usize> {
		let mut out = self.neighbors(idx);
		if let Err(at) = out.binary_search(&idx) {
			out.insert(at, idx);
		}
		out
	}

	/// Indices of the nodes on `layer`.
	pub fn layer_members(&self, layer: Layer) -> impl Iterator<Item = usize> + '_ {
		self.nodes
			.iter()
			.enumerate()
			.filter(move |(_, n)| n.layer == layer)
			.map(|(i, _)| i)
	}

	/// True when there are no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	fn link(&mut self, source_id: &str, target_id: &str, relation_type: &str) {
		let (Some(source), Some(target)) = (self.index_of(source_id), self.index_of(target_id)) else {
			debug!("dropping dangling {relation_type} relation {source_id} -> {target_id}");
			return;
		};
		self.edges.push(Edge {
			source,
			target,
			source_id: source_id.to_owned(),
			target_id: target_id.to_owned(),
			relation_type: relation_type.to_owned(),
		});
	}
}

/// Build the graph model from a snapshot.
///
/// The first pass creates one node per entity and indexes it by id; an id seen a second time
/// keeps its first node. The second pass resolves relation fields through that index, dropping
/// references to ids that are not in the snapshot.
pub fn build_model(snapshot: &DashboardSnapshot) -> GraphModel {
	let mut model = GraphModel::default();

	for (node_type, records) in snapshot.collections() {
		for record in records {
			if model.index.contains_key(&record.entity_id) {
				warn!(
					"duplicate entity id {:?} ({}) ignored; the first occurrence owns it",
					record.entity_id,
					node_type.label()
				);
				continue;
			}
			let style = node_type.style();
			model.index.insert(record.entity_id.clone(), model.nodes.len());
			model.nodes.push(Node {
				id: record.entity_id.clone(),
				node_type,
				name: record.display_name().to_owned(),
				radius: style.radius,
				color: style.color,
				layer: node_type.layer(),
				position: Point::default(),
				pinned: None,
				data: record.clone(),
			});
		}
	}

	for (node_type, records) in snapshot.collections() {
		for record in records {
			// Skipped duplicates contribute no relations.
			if model
				.node(&record.entity_id)
				.is_none_or(|node| !Arc::ptr_eq(&node.data, record))
			{
				continue;
			}
			link_relations(&mut model, node_type, record);
		}
	}

	model
}

fn link_relations(model: &mut GraphModel, node_type: NodeType, record: &EntityRecord) {
	let id = record.entity_id.as_str();

	if let Some(parent) = record.parent_id.as_deref() {
		model.link(parent, id, PART_OF);
	}
	if node_type == NodeType::Project {
		if let Some(track) = record.track_id.as_deref() {
			if record.parent_id.as_deref() != Some(track) {
				model.link(track, id, PART_OF);
			}
		}
	}
	if node_type == NodeType::Task {
		if let Some(project) = record.project_id.as_deref() {
			model.link(project, id, PARENT);
		}
	}
	for hypothesis in &record.validates {
		model.link(id, hypothesis, VALIDATES);
	}
	for condition in &record.conditions_3y {
		model.link(id, condition, CONDITIONS_3Y);
	}
	for relation in &record.outgoing_relations {
		model.link(id, &relation.target_id, &relation.relation_type);
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;
	use std::sync::Arc;

	use proptest::prelude::*;

	use super::*;

	fn edge_triples(model: &GraphModel) -> Vec<(&str, &str, &str)> {
		model
			.edges
			.iter()
			.map(|e| (e.source_id.as_str(), e.target_id.as_str(), e.relation_type.as_str()))
			.collect()
	}

	#[test]
	fn dangling_validates_reference_is_dropped() {
		let snapshot = DashboardSnapshot {
			tracks: vec![Arc::new(EntityRecord::new("T1"))],
			projects: vec![Arc::new(EntityRecord::new("P1").with_parent("T1"))],
			tasks: vec![Arc::new(EntityRecord::new("K1").with_project("P1").validating("H1"))],
			..Default::default()
		};
		let model = build_model(&snapshot);

		assert_eq!(model.nodes.len(), 3);
		assert_eq!(edge_triples(&model), vec![("T1", "P1", PART_OF), ("P1", "K1", PARENT)]);
	}

	#[test]
	fn track_equal_to_parent_is_linked_once() {
		let snapshot = DashboardSnapshot {
			tracks: vec![Arc::new(EntityRecord::new("T1")), Arc::new(EntityRecord::new("T2"))],
			projects: vec![
				Arc::new(EntityRecord::new("P2").with_parent("T1").with_track("T1")),
				Arc::new(EntityRecord::new("P3").with_parent("T1").with_track("T2")),
			],
			..Default::default()
		};
		let model = build_model(&snapshot);
		let edges = edge_triples(&model);

		assert_eq!(edges.iter().filter(|(_, t, _)| *t == "P2").count(), 1);
		assert_eq!(
			edges.iter().filter(|(_, t, r)| *t == "P3" && *r == PART_OF).count(),
			2
		);
	}

	#[test]
	fn track_id_only_applies_to_projects() {
		let snapshot = DashboardSnapshot {
			tracks: vec![Arc::new(EntityRecord::new("T1"))],
			tasks: vec![Arc::new(EntityRecord::new("K1").with_track("T1"))],
			..Default::default()
		};
		assert!(build_model(&snapshot).edges.is_empty());
	}

	#[test]
	fn multiple_labels_between_one_pair_are_all_kept() {
		let snapshot = DashboardSnapshot {
			hypotheses: vec![Arc::new(EntityRecord::new("H1"))],
			projects: vec![Arc::new(
				EntityRecord::new("P1")
					.validating("H1")
					.with_relation("H1", "depends_on"),
			)],
			..Default::default()
		};
		let model = build_model(&snapshot);
		assert_eq!(
			edge_triples(&model),
			vec![("P1", "H1", VALIDATES), ("P1", "H1", "depends_on")]
		);
	}

	#[test]
	fn conditions_and_outgoing_relations_resolve() {
		let snapshot = DashboardSnapshot {
			tracks: vec![Arc::new(EntityRecord::new("T1").with_relation("C1", "enables"))],
			conditions: vec![Arc::new(EntityRecord::new("C1"))],
			tasks: vec![Arc::new(EntityRecord::new("K1").with_condition("C1").with_condition("C9"))],
			..Default::default()
		};
		let model = build_model(&snapshot);
		assert_eq!(
			edge_triples(&model),
			vec![("T1", "C1", "enables"), ("K1", "C1", CONDITIONS_3Y)]
		);
	}

	#[test]
	fn duplicate_id_keeps_first_node() {
		let snapshot = DashboardSnapshot {
			projects: vec![Arc::new(EntityRecord::new("X").with_name("project"))],
			tasks: vec![Arc::new(EntityRecord::new("X").with_name("task").with_parent("X"))],
			..Default::default()
		};
		let model = build_model(&snapshot);
		assert_eq!(model.nodes.len(), 1);
		assert_eq!(model.nodes[0].node_type, NodeType::Project);
		assert_eq!(model.nodes[0].name, "project");
		assert!(model.edges.is_empty());
	}

	#[test]
	fn nodes_carry_type_style_and_source_record() {
		let record = Arc::new(EntityRecord::new("H1").with_name("Users want exports"));
		let snapshot = DashboardSnapshot {
			hypotheses: vec![record.clone()],
			..Default::default()
		};
		let model = build_model(&snapshot);
		let node = model.node("H1").expect("node exists");
		assert_eq!(node.layer, Layer::Execution);
		assert_eq!(node.radius, NodeType::Hypothesis.style().radius);
		assert_eq!(node.name, "Users want exports");
		assert!(Arc::ptr_eq(&node.data, &record));
	}

	#[test]
	fn neighbors_are_undirected_and_unique() {
		let snapshot = DashboardSnapshot {
			tracks: vec![Arc::new(EntityRecord::new("T1"))],
			projects: vec![
				Arc::new(EntityRecord::new("P1").with_parent("T1").with_relation("T1", "reports_to")),
				Arc::new(EntityRecord::new("P2").with_parent("T1")),
			],
			..Default::default()
		};
		let model = build_model(&snapshot);
		let t1 = model.index_of("T1").expect("T1");
		assert_eq!(model.neighbors(t1).len(), 2);
		assert_eq!(model.neighborhood(t1), vec![0, 1, 2]);
		assert_eq!(model.neighborhood(2), vec![0, 2]);
	}

	fn arb_snapshot() -> impl Strategy<Value = DashboardSnapshot> {
		// Ids are unique per position; references may point anywhere, including ids that do
		// not exist.
		let refs = || prop::collection::vec(0usize..40, 0..3);
		let record = (refs(), refs(), refs(), prop::option::of(0usize..40), prop::option::of(0usize..40));
		prop::collection::vec((0usize..5, record), 0..30).prop_map(|entries| {
			let mut snapshot = DashboardSnapshot::default();
			for (i, (kind, (validates, conditions, relations, parent, track))) in entries.into_iter().enumerate() {
				let mut entity = EntityRecord::new(format!("E{i}"));
				entity.parent_id = parent.map(|p| format!("E{p}"));
				entity.track_id = track.map(|t| format!("E{t}"));
				entity.project_id = track.map(|t| format!("E{t}"));
				entity.validates = validates.iter().map(|v| format!("E{v}")).collect();
				entity.conditions_3y = conditions.iter().map(|c| format!("E{c}")).collect();
				for r in relations {
					entity = entity.with_relation(format!("E{r}"), "relates_to");
				}
				let entity = Arc::new(entity);
				match kind {
					0 => snapshot.tracks.push(entity),
					1 => snapshot.conditions.push(entity),
					2 => snapshot.hypotheses.push(entity),
					3 => snapshot.projects.push(entity),
					_ => snapshot.tasks.push(entity),
				}
			}
			snapshot
		})
	}

	proptest! {
		#[test]
		fn one_node_per_unique_entity(snapshot in arb_snapshot()) {
			let model = build_model(&snapshot);
			prop_assert_eq!(model.nodes.len(), snapshot.entity_count());
			let ids: HashSet<&str> = model.nodes.iter().map(|n| n.id.as_str()).collect();
			prop_assert_eq!(ids.len(), model.nodes.len());
		}

		#[test]
		fn no_edge_is_dangling(snapshot in arb_snapshot()) {
			let model = build_model(&snapshot);
			for edge in &model.edges {
				prop_assert_eq!(model.index_of(&edge.source_id), Some(edge.source));
				prop_assert_eq!(model.index_of(&edge.target_id), Some(edge.target));
			}
		}
	}
}
