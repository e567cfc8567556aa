//! Dashboard entity snapshot and the typed node/edge model built from it.

use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::error::SnapshotError;

/// A typed relation declared by a Track or Task.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct OutgoingRelation {
	/// Entity the relation points at.
	pub target_id: String,
	/// Free-form relation label, used as the edge type.
	#[serde(rename = "type")]
	pub relation_type: String,
}

/// One planning entity as delivered by the dashboard state.
///
/// All entity kinds share this shape; fields that do not apply to a kind are simply absent.
/// `validates` and `conditions_3y` arrive as either a string or a list of strings and are
/// normalised to a list here, so the graph builder never has to look at the raw shape.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EntityRecord {
	/// Identifier, unique across all five collections.
	pub entity_id: String,
	/// Display name.
	#[serde(default)]
	pub entity_name: Option<String>,
	/// Workflow status as reported by the dashboard.
	#[serde(default)]
	pub status: Option<String>,
	/// Containing entity.
	#[serde(default)]
	pub parent_id: Option<String>,
	/// Owning track, on projects.
	#[serde(default)]
	pub track_id: Option<String>,
	/// Owning project, on tasks.
	#[serde(default)]
	pub project_id: Option<String>,
	/// Hypotheses this entity validates.
	#[serde(default, deserialize_with = "one_or_many")]
	pub validates: Vec<String>,
	/// Three-year conditions this entity contributes to.
	#[serde(default, deserialize_with = "one_or_many")]
	pub conditions_3y: Vec<String>,
	/// Typed links declared on tracks and tasks.
	#[serde(default, deserialize_with = "null_as_empty")]
	pub outgoing_relations: Vec<OutgoingRelation>,
	/// Fields the graph does not interpret, kept for the detail panel.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
	One(String),
	Many(Vec<String>),
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
	let ids = match Option::<OneOrMany>::deserialize(deserializer)? {
		Some(OneOrMany::One(id)) => vec![id],
		Some(OneOrMany::Many(ids)) => ids,
		None => Vec::new(),
	};
	Ok(ids.into_iter().filter(|id| !id.is_empty()).collect())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl EntityRecord {
	/// A record with only an id.
	pub fn new(entity_id: impl Into<String>) -> Self {
		Self {
			entity_id: entity_id.into(),
			..Self::default()
		}
	}

	/// Sets `entity_name`.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.entity_name = Some(name.into());
		self
	}

	/// Sets `parent_id`.
	pub fn with_parent(mut self, id: impl Into<String>) -> Self {
		self.parent_id = Some(id.into());
		self
	}

	/// Sets `track_id`.
	pub fn with_track(mut self, id: impl Into<String>) -> Self {
		self.track_id = Some(id.into());
		self
	}

	/// Sets `project_id`.
	pub fn with_project(mut self, id: impl Into<String>) -> Self {
		self.project_id = Some(id.into());
		self
	}

	/// Adds a `validates` target.
	pub fn validating(mut self, id: impl Into<String>) -> Self {
		self.validates.push(id.into());
		self
	}

	/// Adds a `conditions_3y` target.
	pub fn with_condition(mut self, id: impl Into<String>) -> Self {
		self.conditions_3y.push(id.into());
		self
	}

	/// Adds an outgoing relation.
	pub fn with_relation(mut self, target_id: impl Into<String>, relation_type: impl Into<String>) -> Self {
		self.outgoing_relations.push(OutgoingRelation {
			target_id: target_id.into(),
			relation_type: relation_type.into(),
		});
		self
	}

	/// Name shown on the node, falling back to the id.
	pub fn display_name(&self) -> &str {
		self.entity_name
			.as_deref()
			.filter(|name| !name.is_empty())
			.unwrap_or(&self.entity_id)
	}

	/// Every entity id this record points at, in declaration order.
	pub fn referenced_ids(&self) -> Vec<&str> {
		let mut ids: Vec<&str> = [&self.parent_id, &self.track_id, &self.project_id]
			.into_iter()
			.flatten()
			.map(String::as_str)
			.collect();
		ids.extend(self.validates.iter().map(String::as_str));
		ids.extend(self.conditions_3y.iter().map(String::as_str));
		ids.extend(self.outgoing_relations.iter().map(|r| r.target_id.as_str()));
		ids
	}
}

/// Read-only snapshot of the five planning collections.
///
/// Records sit behind `Arc` so graph nodes can point at their source entity without copying
/// it and the snapshot can live inside reactive signals.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardSnapshot {
	/// Strategic tracks.
	pub tracks: Vec<Arc<EntityRecord>>,
	/// Three-year conditions.
	pub conditions: Vec<Arc<EntityRecord>>,
	/// Hypotheses under test.
	pub hypotheses: Vec<Arc<EntityRecord>>,
	/// Projects.
	pub projects: Vec<Arc<EntityRecord>>,
	/// Tasks.
	pub tasks: Vec<Arc<EntityRecord>>,
}

impl DashboardSnapshot {
	/// Parse a dashboard payload. Missing collections default to empty.
	pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
		Ok(serde_json::from_str(json)?)
	}

	/// True when all five collections are empty.
	pub fn is_empty(&self) -> bool {
		self.collections().iter().all(|(_, records)| records.is_empty())
	}

	/// Records across all collections, duplicates included.
	pub fn entity_count(&self) -> usize {
		self.collections().iter().map(|(_, records)| records.len()).sum()
	}

	/// Records in the collection for `node_type`.
	pub fn count_of(&self, node_type: NodeType) -> usize {
		self.collections()
			.iter()
			.find(|(kind, _)| *kind == node_type)
			.map_or(0, |(_, records)| records.len())
	}

	/// Collections in id-precedence order.
	pub fn collections(&self) -> [(NodeType, &[Arc<EntityRecord>]); 5] {
		[
			(NodeType::Track, self.tracks.as_slice()),
			(NodeType::Condition, self.conditions.as_slice()),
			(NodeType::Hypothesis, self.hypotheses.as_slice()),
			(NodeType::Project, self.projects.as_slice()),
			(NodeType::Task, self.tasks.as_slice()),
		]
	}
}

/// Horizontal band a node is drawn in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
	/// Tracks and conditions, top band.
	Strategy,
	/// Projects and hypotheses, middle band.
	Execution,
	/// Tasks, bottom band.
	Task,
}

impl Layer {
	/// Top to bottom.
	pub const ALL: [Layer; 3] = [Layer::Strategy, Layer::Execution, Layer::Task];
}

/// Kind of planning entity a node stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
	/// From `tracks`.
	Track,
	/// From `conditions`.
	Condition,
	/// From `projects`.
	Project,
	/// From `hypotheses`.
	Hypothesis,
	/// From `tasks`.
	Task,
}

/// Per-type visual defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	/// Circle radius in graph units.
	pub radius: f64,
	/// CSS colour.
	pub color: &'static str,
}

impl NodeType {
	/// Legend order.
	pub const ALL: [NodeType; 5] = [
		NodeType::Track,
		NodeType::Condition,
		NodeType::Project,
		NodeType::Hypothesis,
		NodeType::Task,
	];

	/// Band the type is drawn in; fixed for the node's lifetime.
	pub fn layer(self) -> Layer {
		match self {
			NodeType::Track | NodeType::Condition => Layer::Strategy,
			NodeType::Project | NodeType::Hypothesis => Layer::Execution,
			NodeType::Task => Layer::Task,
		}
	}

	/// Radius and colour for the type.
	pub fn style(self) -> NodeStyle {
		let (radius, color) = match self {
			NodeType::Track => (22.0, "#6366f1"),
			NodeType::Condition => (18.0, "#8b5cf6"),
			NodeType::Project => (16.0, "#10b981"),
			NodeType::Hypothesis => (14.0, "#f59e0b"),
			NodeType::Task => (10.0, "#3b82f6"),
		};
		NodeStyle { radius, color }
	}

	/// Human-readable name.
	pub fn label(self) -> &'static str {
		match self {
			NodeType::Track => "Track",
			NodeType::Condition => "Condition",
			NodeType::Project => "Project",
			NodeType::Hypothesis => "Hypothesis",
			NodeType::Task => "Task",
		}
	}
}

/// A position in graph or screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

impl Point {
	/// Point at (x, y).
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance.
	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}
}

/// One entity in the graph model.
#[derive(Clone, Debug)]
pub struct Node {
	/// Source `entity_id`.
	pub id: String,
	/// Kind of entity.
	pub node_type: NodeType,
	/// Label drawn next to the circle.
	pub name: String,
	/// Circle radius.
	pub radius: f64,
	/// Fill colour.
	pub color: &'static str,
	/// Band the node is held to.
	pub layer: Layer,
	/// Current layout position.
	pub position: Point,
	/// Fixed position while the node is being dragged.
	pub pinned: Option<Point>,
	/// The record the node was built from.
	pub data: Arc<EntityRecord>,
}

/// A directed relationship between two nodes, by index and by id.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	/// Id of the source node.
	pub source_id: String,
	/// Id of the target node.
	pub target_id: String,
	/// Relation label.
	pub relation_type: String,
}

/// Payload handed to the detail panel when a node becomes selected.
#[derive(Clone, Debug)]
pub struct SelectionEvent {
	/// Id of the selected node.
	pub id: String,
	/// Its type.
	pub node_type: NodeType,
	/// Its display name.
	pub name: String,
	/// The full source record.
	pub data: Arc<EntityRecord>,
}
