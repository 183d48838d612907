//! JSON schema validation and version handling for vocabulary store files.

use crate::graph::VocabGraph;
use anyhow::{Context, Result};

pub const CURRENT_VERSION: &str = "1.0.0";

/// Validate a store's schema version.
pub fn validate_version(graph: &VocabGraph) -> Result<()> {
    if graph.version != CURRENT_VERSION {
        anyhow::bail!(
            "vocabulary store version mismatch: expected {}, found {}",
            CURRENT_VERSION,
            graph.version
        );
    }
    Ok(())
}

/// Serialize a store to a pretty-printed JSON string.
pub fn to_json(graph: &VocabGraph) -> Result<String> {
    serde_json::to_string_pretty(graph).context("failed to serialize vocabulary store to JSON")
}

/// Deserialize a store from a JSON string and check its version.
///
/// The result is raw: indexes are empty until
/// [`storage::prepare`](crate::storage::prepare) runs.
pub fn from_json(json: &str) -> Result<VocabGraph> {
    let graph: VocabGraph =
        serde_json::from_str(json).context("failed to deserialize vocabulary store from JSON")?;
    validate_version(&graph)?;
    Ok(graph)
}
