//! Engine snapshots.

use crate::description::TableDescription;
use crate::engine::EngineOwner;
use serde::{Deserialize, Serialize};

/// Point-in-time copy of an engine, suitable for handing to an external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Current state at snapshot time.
    pub current_state: String,

    /// Previous state at snapshot time.
    pub previous_state: String,

    /// Registered states, in insertion order.
    pub states: Vec<String>,

    /// Registered conditions, in insertion order.
    pub conditions: Vec<String>,

    /// Transition table, in table order.
    pub transitions: TableDescription,

    /// Owner of the tracked entity, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<EngineOwner>,

    /// CRC32C of the canonical table serialization. Empty skips verification
    /// on restore.
    #[serde(default)]
    pub checksum: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TransitionEngine;

    #[test]
    fn test_snapshot_json_roundtrip() {
        let engine = TransitionEngine::new().with_owner(EngineOwner::new("t-1", "u-1"));
        engine.next().unwrap();

        let snapshot = engine.snapshot().unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["current_state"], "Running");
        assert_eq!(json["previous_state"], "Created");
        assert_eq!(json["owner"]["tenant_id"], "t-1");
        assert_eq!(json["transitions"]["Created-Continue"], "Running");

        let decoded: EngineSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_snapshot_without_owner_or_checksum() {
        let json = serde_json::json!({
            "current_state": "a",
            "previous_state": "a",
            "states": ["a", "b"],
            "conditions": ["go"],
            "transitions": {"a-go": "b"}
        });

        let snapshot: EngineSnapshot = serde_json::from_value(json).unwrap();
        assert!(snapshot.owner.is_none());
        assert!(snapshot.checksum.is_empty());

        let engine = TransitionEngine::restore(&snapshot).unwrap();
        assert_eq!(engine.change_state("GO").unwrap(), "b");
    }
}
