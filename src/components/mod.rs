//! Reusable UI components.

pub mod entity_graph;
