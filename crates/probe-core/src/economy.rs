use std::fmt;

use contracts::GameState;

use crate::locations::LocationGraph;
use crate::upgrades::{UpgradeCatalog, UpgradeEffect};

/// Fixed growth policy for the replication price; not configurable per call.
pub const REPLICATION_COST_GROWTH: f64 = 1.15;

/// Expected operation outcomes, not exceptional conditions: callers are
/// expected to check affordability and eligibility before offering an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    InsufficientResources,
    NoSuchLocation(String),
    NotReachable(String),
    UnknownUpgrade(String),
    AlreadyPurchased(String),
    PrerequisiteNotMet(String),
}

impl fmt::Display for EconomyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientResources => write!(f, "insufficient resources"),
            Self::NoSuchLocation(id) => write!(f, "no such location: {id}"),
            Self::NotReachable(id) => write!(f, "location is not reachable from here: {id}"),
            Self::UnknownUpgrade(id) => write!(f, "unknown upgrade: {id}"),
            Self::AlreadyPurchased(id) => write!(f, "upgrade already purchased: {id}"),
            Self::PrerequisiteNotMet(id) => write!(f, "missing prerequisite upgrade: {id}"),
        }
    }
}

impl std::error::Error for EconomyError {}

/// The economy model: owns the static catalogs and funnels every state
/// mutation through the single canonical accrual formula. The surrounding
/// interface layer owns the one long-lived `GameState`; operations here take
/// it by `&mut` and either succeed atomically or leave it untouched.
#[derive(Debug, Clone)]
pub struct Economy {
    locations: LocationGraph,
    upgrades: UpgradeCatalog,
}

impl Economy {
    pub fn new(locations: LocationGraph, upgrades: UpgradeCatalog) -> Self {
        Self {
            locations,
            upgrades,
        }
    }

    /// Economy over the builtin catalogs.
    pub fn default_catalogs() -> Self {
        Self::new(
            LocationGraph::default_catalog(),
            UpgradeCatalog::default_catalog(),
        )
    }

    pub fn locations(&self) -> &LocationGraph {
        &self.locations
    }

    pub fn upgrades(&self) -> &UpgradeCatalog {
        &self.upgrades
    }

    /// The one accrual formula. Continuous ticking, the discrete manual mine,
    /// and idle reconciliation all call this; no other accrual arithmetic
    /// exists in the workspace.
    ///
    /// Any validated state has a known `current_location`; an unknown id
    /// contributes a neutral multiplier rather than a failure.
    pub fn accrual(&self, state: &GameState, elapsed_seconds: f64) -> f64 {
        let location_multiplier = self
            .locations
            .multiplier_of(&state.current_location)
            .unwrap_or(1.0);

        state.mining_rate
            * state.probes as f64
            * location_multiplier
            * self.automation_bonus(state)
            * elapsed_seconds.max(0.0)
    }

    /// Product of every purchased passive accrual multiplier. Driven entirely
    /// by catalog data: additional passive upgrades compose multiplicatively
    /// without touching the accrual formula.
    pub fn automation_bonus(&self, state: &GameState) -> f64 {
        self.upgrades
            .iter()
            .filter(|upgrade| state.is_purchased(&upgrade.id))
            .fold(1.0, |bonus, upgrade| match upgrade.effect {
                UpgradeEffect::AccrualMultiplier { factor } => bonus * factor,
                _ => bonus,
            })
    }

    /// Advance the state by `elapsed_seconds`. Negative elapsed is treated as
    /// zero. Never fails; returns the gain.
    pub fn tick(&self, state: &mut GameState, elapsed_seconds: f64) -> f64 {
        let gained = self.accrual(state, elapsed_seconds);
        state.resources += gained;
        state.total_mined += gained;
        gained
    }

    /// Manual mining action: one discrete unit at the continuous formula's
    /// unit rate.
    pub fn mine_once(&self, state: &mut GameState) -> f64 {
        self.tick(state, 1.0)
    }

    /// Buy the next probe: debit the replication cost, then grow it
    /// geometrically with integer floor.
    pub fn replicate(&self, state: &mut GameState) -> Result<(), EconomyError> {
        if state.resources < state.replication_cost {
            return Err(EconomyError::InsufficientResources);
        }

        state.resources -= state.replication_cost;
        state.probes += 1;
        state.replication_cost = (state.replication_cost * REPLICATION_COST_GROWTH).floor();
        Ok(())
    }

    /// Buy a one-time upgrade. The purchased flag gates re-application, so a
    /// retried purchase fails with `AlreadyPurchased` instead of double
    /// charging or double applying.
    pub fn purchase_upgrade(&self, state: &mut GameState, id: &str) -> Result<(), EconomyError> {
        let Some(upgrade) = self.upgrades.get(id) else {
            return Err(EconomyError::UnknownUpgrade(id.to_string()));
        };
        if state.is_purchased(id) {
            return Err(EconomyError::AlreadyPurchased(id.to_string()));
        }
        if let Some(prerequisite) = &upgrade.prerequisite {
            if !state.is_purchased(prerequisite) {
                return Err(EconomyError::PrerequisiteNotMet(prerequisite.clone()));
            }
        }
        if state.resources < upgrade.cost {
            return Err(EconomyError::InsufficientResources);
        }

        state.resources -= upgrade.cost;
        state.upgrades.insert(id.to_string(), true);
        apply_effect(state, upgrade.effect);
        Ok(())
    }

    /// Move to an adjacent location, paying its unlock cost the first time.
    /// Unlocking uses set semantics: an already-unlocked target is never
    /// charged again. On success the current location changes unconditionally.
    pub fn travel(&self, state: &mut GameState, target: &str) -> Result<(), EconomyError> {
        let Some(node) = self.locations.node(target) else {
            return Err(EconomyError::NoSuchLocation(target.to_string()));
        };
        if !self
            .locations
            .neighbors_of(&state.current_location)
            .iter()
            .any(|neighbor| neighbor == target)
        {
            return Err(EconomyError::NotReachable(target.to_string()));
        }

        if !state.unlocked_locations.contains(target) {
            if state.resources < node.unlock_cost {
                return Err(EconomyError::InsufficientResources);
            }
            state.resources -= node.unlock_cost;
            state.unlocked_locations.insert(target.to_string());
        }

        state.current_location = target.to_string();
        Ok(())
    }
}

/// Apply a one-shot effect at purchase time. Passive effects contribute
/// through `automation_bonus` instead and mutate nothing here.
fn apply_effect(state: &mut GameState, effect: UpgradeEffect) {
    match effect {
        UpgradeEffect::AdditiveRateBonus { amount } => state.mining_rate += amount,
        UpgradeEffect::ReplicationCostScale { factor } => state.replication_cost *= factor,
        UpgradeEffect::AccrualMultiplier { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mine_once_matches_one_second_tick() {
        let economy = Economy::default_catalogs();
        let mut ticked = GameState::default();
        let mut mined = GameState::default();

        economy.tick(&mut ticked, 1.0);
        economy.mine_once(&mut mined);

        assert_eq!(ticked, mined);
    }

    #[test]
    fn tick_feeds_resources_and_total_mined() {
        let economy = Economy::default_catalogs();
        let mut state = GameState::default();

        let gained = economy.tick(&mut state, 5.0);
        assert_eq!(gained, 5.0);
        assert_eq!(state.resources, 5.0);
        assert_eq!(state.total_mined, 5.0);
    }

    #[test]
    fn negative_elapsed_accrues_nothing() {
        let economy = Economy::default_catalogs();
        let mut state = GameState::default();

        assert_eq!(economy.tick(&mut state, -3.0), 0.0);
        assert_eq!(state.resources, 0.0);
    }

    #[test]
    fn replicate_debits_and_grows_cost_with_floor() {
        let economy = Economy::default_catalogs();
        let mut state = GameState::default();
        state.resources = 100.0;

        economy.replicate(&mut state).expect("affordable");
        assert_eq!(state.resources, 0.0);
        assert_eq!(state.probes, 2);
        assert_eq!(state.replication_cost, 115.0);

        assert_eq!(
            economy.replicate(&mut state),
            Err(EconomyError::InsufficientResources)
        );
        assert_eq!(state.probes, 2, "failed replicate must not mutate");
    }

    #[test]
    fn purchase_applies_effect_exactly_once() {
        let economy = Economy::default_catalogs();
        let mut state = GameState::default();
        state.resources = 600.0;

        economy
            .purchase_upgrade(&mut state, "mining1")
            .expect("affordable");
        assert_eq!(state.resources, 100.0);
        assert_eq!(state.mining_rate, 2.0);
        assert!(state.is_purchased("mining1"));

        let before = state.clone();
        assert_eq!(
            economy.purchase_upgrade(&mut state, "mining1"),
            Err(EconomyError::AlreadyPurchased("mining1".to_string()))
        );
        assert_eq!(state, before, "second purchase must not change state");
    }

    #[test]
    fn efficiency_upgrade_rescales_replication_cost() {
        let economy = Economy::default_catalogs();
        let mut state = GameState::default();
        state.resources = 1000.0;

        economy
            .purchase_upgrade(&mut state, "efficiency1")
            .expect("affordable");
        assert_eq!(state.replication_cost, 90.0);
    }

    #[test]
    fn automation_bonus_is_catalog_driven() {
        let economy = Economy::default_catalogs();
        let mut state = GameState::default();
        assert_eq!(economy.automation_bonus(&state), 1.0);

        state.upgrades.insert("automation1".to_string(), true);
        assert_eq!(economy.automation_bonus(&state), 2.0);

        // A rate upgrade is not a passive multiplier.
        state.upgrades.insert("mining1".to_string(), true);
        assert_eq!(economy.automation_bonus(&state), 2.0);
    }

    #[test]
    fn travel_unlocks_once_and_never_double_charges() {
        let economy = Economy::default_catalogs();
        let mut state = GameState::default();
        state.resources = 400.0;

        economy.travel(&mut state, "mars").expect("affordable unlock");
        assert_eq!(state.resources, 100.0);
        assert_eq!(state.current_location, "mars");
        assert!(state.unlocked_locations.contains("mars"));

        economy.travel(&mut state, "earth").expect("already unlocked");
        economy.travel(&mut state, "mars").expect("already unlocked");
        assert_eq!(state.resources, 100.0, "revisit must be free");
    }

    #[test]
    fn travel_failure_leaves_location_locked_and_uncharged() {
        let economy = Economy::default_catalogs();
        let mut state = GameState::default();
        state.resources = 100.0;

        assert_eq!(
            economy.travel(&mut state, "mars"),
            Err(EconomyError::InsufficientResources)
        );
        assert_eq!(state.resources, 100.0);
        assert_eq!(state.current_location, "earth");
        assert!(!state.unlocked_locations.contains("mars"));
    }
}
