use thiserror::Error;

/// Failure to ingest a dashboard payload.
#[derive(Debug, Error)]
pub enum SnapshotError {
	#[error("malformed dashboard snapshot: {0}")]
	Json(#[from] serde_json::Error),
}
