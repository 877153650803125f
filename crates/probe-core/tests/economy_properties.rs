use contracts::GameState;
use probe_core::economy::{Economy, EconomyError};
use proptest::prelude::*;

fn economy() -> Economy {
    Economy::default_catalogs()
}

fn state_at(location: &str, resources: f64) -> GameState {
    let mut state = GameState::default();
    state.resources = resources;
    state.unlocked_locations.insert(location.to_string());
    state.current_location = location.to_string();
    state
}

fn approx_eq(left: f64, right: f64) -> bool {
    let scale = left.abs().max(right.abs()).max(1.0);
    (left - right).abs() <= 1e-9 * scale
}

#[test]
fn scenario_baseline_accrual_at_earth() {
    // rate 1, one probe, earth (x1), no upgrades, 10 seconds.
    let economy = economy();
    let state = GameState::default();
    assert_eq!(economy.accrual(&state, 10.0), 10.0);
}

#[test]
fn scenario_location_and_automation_compound() {
    // Same baseline at a x1.5 location with the x2 automation bonus owned.
    let economy = economy();
    let mut state = state_at("asteroid-belt", 0.0);
    state.upgrades.insert("automation1".to_string(), true);

    assert_eq!(economy.accrual(&state, 10.0), 30.0);
}

#[test]
fn scenario_travel_reachability_beats_wealth() {
    let economy = economy();

    // Moving to an already-unlocked neighbor is free and always succeeds.
    let mut state = GameState::default();
    state.unlocked_locations.insert("mars".to_string());
    economy.travel(&mut state, "mars").expect("free move");
    assert_eq!(state.resources, 0.0);
    assert_eq!(state.current_location, "mars");

    // A non-adjacent node is rejected no matter the bankroll.
    let mut state = state_at("earth", 1e12);
    assert_eq!(
        economy.travel(&mut state, "saturn"),
        Err(EconomyError::NotReachable("saturn".to_string()))
    );
    assert_eq!(state.current_location, "earth");

    let mut state = state_at("earth", 1e12);
    assert_eq!(
        economy.travel(&mut state, "nibiru"),
        Err(EconomyError::NoSuchLocation("nibiru".to_string()))
    );
}

#[test]
fn scenario_prerequisite_beats_affordability() {
    let economy = economy();
    let mut state = GameState::default();
    state.resources = 1e9;

    assert_eq!(
        economy.purchase_upgrade(&mut state, "mining2"),
        Err(EconomyError::PrerequisiteNotMet("mining1".to_string()))
    );
    assert_eq!(state.resources, 1e9, "failed purchase must not charge");
    assert!(!state.is_purchased("mining2"));
}

#[test]
fn prerequisite_chain_resolves_through_sequential_purchases() {
    let economy = economy();
    let mut state = GameState::default();
    state.resources = 3000.0;

    economy
        .purchase_upgrade(&mut state, "mining1")
        .expect("first link");
    economy
        .purchase_upgrade(&mut state, "mining2")
        .expect("second link");

    assert_eq!(state.resources, 0.0);
    // mining1 (+1) then mining2 (+2) on the base rate of 1.
    assert_eq!(state.mining_rate, 4.0);
}

#[test]
fn spending_never_reduces_total_mined() {
    let economy = economy();
    let mut state = GameState::default();

    economy.tick(&mut state, 200.0);
    let mined_before = state.total_mined;

    economy.replicate(&mut state).expect("affordable");
    assert_eq!(state.total_mined, mined_before);
    assert!(state.resources < mined_before);
}

proptest! {
    #[test]
    fn accrual_is_linear_in_elapsed(
        first in 0.0_f64..10_000.0,
        second in 0.0_f64..10_000.0,
        probes in 1_i64..1_000,
        rate in 0.0_f64..100.0,
    ) {
        let economy = economy();
        let mut state = state_at("jupiter", 0.0);
        state.probes = probes;
        state.mining_rate = rate;

        let joint = economy.accrual(&state, first + second);
        let split = economy.accrual(&state, first) + economy.accrual(&state, second);
        prop_assert!(approx_eq(joint, split), "joint={joint} split={split}");
    }

    #[test]
    fn replication_cost_compounds_with_floor_each_step(calls in 1_usize..40) {
        let economy = economy();
        let mut state = GameState::default();
        state.resources = 1e18;

        let mut expected_cost = state.replication_cost;
        for call in 0..calls {
            economy.replicate(&mut state).expect("bankroll covers the run");
            let previous = expected_cost;
            expected_cost = (expected_cost * 1.15).floor();

            prop_assert_eq!(state.replication_cost, expected_cost);
            prop_assert!(state.replication_cost > previous, "cost must strictly increase");
            prop_assert_eq!(state.probes, 1 + call as i64 + 1);
        }
    }

    #[test]
    fn tick_keeps_resources_and_total_mined_in_step(elapsed in 0.0_f64..5_000.0) {
        let economy = economy();
        let mut state = GameState::default();

        let gained = economy.tick(&mut state, elapsed);
        prop_assert_eq!(state.resources, gained);
        prop_assert_eq!(state.total_mined, gained);
        prop_assert!(gained >= 0.0);
    }
}
