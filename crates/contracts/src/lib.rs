//! Cross-boundary contracts shared by the economy core, the HTTP API, and the
//! CLI client. The serialized field names in this crate are the wire contract;
//! nothing else in the workspace spells them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Id of the designated starting node; always present in `unlocked_locations`.
pub const START_LOCATION: &str = "earth";

pub const DEFAULT_REPLICATION_COST: f64 = 100.0;
pub const DEFAULT_MINING_RATE: f64 = 1.0;

/// The single persisted game entity. Serialized camelCase: these eight field
/// names are exactly what `GET /api/game` returns and `POST /api/game`
/// accepts, and what the snapshot row's encoded columns decode into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub resources: f64,
    /// Signed on the wire so an out-of-range count reaches the validator
    /// instead of dying inside deserialization.
    pub probes: i64,
    pub replication_cost: f64,
    pub mining_rate: f64,
    pub current_location: String,
    pub unlocked_locations: BTreeSet<String>,
    pub upgrades: BTreeMap<String, bool>,
    pub total_mined: f64,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            resources: 0.0,
            probes: 1,
            replication_cost: DEFAULT_REPLICATION_COST,
            mining_rate: DEFAULT_MINING_RATE,
            current_location: START_LOCATION.to_string(),
            unlocked_locations: BTreeSet::from([START_LOCATION.to_string()]),
            upgrades: BTreeMap::new(),
            total_mined: 0.0,
        }
    }
}

impl GameState {
    pub fn is_purchased(&self, upgrade_id: &str) -> bool {
        self.upgrades.get(upgrade_id).copied().unwrap_or(false)
    }
}

/// A loaded snapshot with idle earnings folded in. `idle_earnings` is the
/// amount this load reconciled; it is reported, not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledState {
    #[serde(flatten)]
    pub state: GameState,
    pub idle_earnings: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveReceipt {
    pub success: bool,
}

impl SaveReceipt {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Error body for the HTTP surface: `{error}` with an optional `details`
/// list of itemized validation violations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_state_wire_field_names_are_camel_case() {
        let encoded = serde_json::to_value(GameState::default()).expect("serialize");
        let object = encoded.as_object().expect("object");

        for key in [
            "resources",
            "probes",
            "replicationCost",
            "miningRate",
            "currentLocation",
            "unlockedLocations",
            "upgrades",
            "totalMined",
        ] {
            assert!(object.contains_key(key), "missing wire field {key}");
        }
        assert_eq!(object.len(), 8);
    }

    #[test]
    fn reconciled_state_flattens_with_idle_earnings() {
        let reconciled = ReconciledState {
            state: GameState::default(),
            idle_earnings: 12.5,
        };

        let encoded = serde_json::to_value(&reconciled).expect("serialize");
        let object = encoded.as_object().expect("object");
        assert_eq!(object.len(), 9);
        assert_eq!(object["idleEarnings"], 12.5);
        assert_eq!(object["currentLocation"], START_LOCATION);
    }

    #[test]
    fn canonical_defaults() {
        let state = GameState::default();
        assert_eq!(state.resources, 0.0);
        assert_eq!(state.probes, 1);
        assert_eq!(state.replication_cost, 100.0);
        assert_eq!(state.mining_rate, 1.0);
        assert_eq!(state.current_location, "earth");
        assert!(state.unlocked_locations.contains("earth"));
        assert_eq!(state.unlocked_locations.len(), 1);
        assert!(state.upgrades.is_empty());
        assert_eq!(state.total_mined, 0.0);
    }

    #[test]
    fn error_body_omits_absent_details() {
        let encoded = serde_json::to_value(ErrorBody::new("storage failure")).expect("serialize");
        assert!(encoded.get("details").is_none());

        let detailed =
            ErrorBody::with_details("invalid game state", vec!["Invalid probes value".into()]);
        let encoded = serde_json::to_value(&detailed).expect("serialize");
        assert_eq!(encoded["details"][0], "Invalid probes value");
    }
}
