//! Block unit handed to the coordinator's rebuild queue.
//!
//! The gateway treats blocks as opaque payloads; only the rebuild queue
//! and the coordinator's chain logic look inside.

use serde::{Deserialize, Serialize};

/// A block as carried through the rebuild pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    /// Block identifier, absent for blocks still being assembled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Chain height this block claims.
    pub height: u64,
    /// Serialized block content, opaque at this layer.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl BlockData {
    pub fn new(height: u64) -> Self {
        Self {
            id: None,
            height,
            payload: serde_json::Value::Null,
        }
    }
}
