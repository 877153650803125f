use contracts::GameState;

use crate::locations::LocationGraph;
use crate::upgrades::UpgradeCatalog;

/// Structural, range, and referential checks on an externally supplied
/// candidate state. Accumulates every violation instead of failing fast; an
/// empty list means the candidate is acceptable.
///
/// Runs only at trust boundaries (decoded request bodies and decoded snapshot
/// rows), never on internally produced state.
pub fn validate_candidate(
    state: &GameState,
    locations: &LocationGraph,
    upgrades: &UpgradeCatalog,
) -> Vec<String> {
    let mut violations = Vec::new();

    if !state.resources.is_finite() || state.resources < 0.0 {
        violations.push("Invalid resources value".to_string());
    }
    if state.probes < 1 {
        violations.push("Invalid probes value".to_string());
    }
    if !state.replication_cost.is_finite() || state.replication_cost < 0.0 {
        violations.push("Invalid replicationCost value".to_string());
    }
    if !state.mining_rate.is_finite() || state.mining_rate < 0.0 {
        violations.push("Invalid miningRate value".to_string());
    }

    if !locations.contains(&state.current_location) {
        violations.push(format!(
            "Unknown currentLocation: {}",
            state.current_location
        ));
    }

    if state.unlocked_locations.is_empty() {
        violations.push("Empty unlockedLocations".to_string());
    }
    for id in &state.unlocked_locations {
        if !locations.contains(id) {
            violations.push(format!("Unknown location in unlockedLocations: {id}"));
        }
    }
    if locations.contains(&state.current_location)
        && !state.unlocked_locations.contains(&state.current_location)
    {
        violations.push("currentLocation is not in unlockedLocations".to_string());
    }

    for id in state.upgrades.keys() {
        if !upgrades.contains(id) {
            violations.push(format!("Unknown upgrade: {id}"));
        }
    }

    if !state.total_mined.is_finite() || state.total_mined < 0.0 {
        violations.push("Invalid totalMined value".to_string());
    }

    violations
}
