//! Checkpoint Tests - Population Snapshots
//!
//! Critical invariants tested:
//! - Determinism: snapshots of identically seeded runs match at every cycle
//! - Integrity: snapshots taken from a live run always validate
//! - Config hash: stable per config, sensitive to every parameter

use inertia_simulator_core_rs::orchestrator::{
    compute_config_hash, compute_openings, validate_snapshot, Orchestrator, PolicyKind,
    PopulationSnapshot, SimulationConfig, SimulationError,
};

fn create_test_config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        population_size: 250,
        capacity_p: 50,
        num_cycles: 80,
        policy: PolicyKind::Quota,
        quota_min_b_share: 0.3,
        seed,
        ..Default::default()
    }
}

#[test]
fn test_snapshot_captures_current_cycle_and_rng() {
    let mut orchestrator = Orchestrator::new(create_test_config(42)).unwrap();
    for _ in 0..5 {
        orchestrator.tick();
    }

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.cycle, 5);
    assert_eq!(snapshot.rng_state, orchestrator.rng_state());
    assert_eq!(snapshot.tier_count(), orchestrator.population().tier_count());
    assert_eq!(snapshot.to_population().unwrap(), *orchestrator.population());
}

#[test]
fn test_live_snapshots_always_validate() {
    let config = create_test_config(7);
    let max_tier = config.capacity_p + compute_openings(config.capacity_p, usize::MAX);
    let mut orchestrator = Orchestrator::new(config).unwrap();

    for _ in 0..80 {
        orchestrator.tick();
        validate_snapshot(&orchestrator.snapshot(), max_tier).unwrap();
    }
}

#[test]
fn test_snapshot_json_round_trip_preserves_state() {
    let mut orchestrator = Orchestrator::new(create_test_config(3)).unwrap();
    for _ in 0..10 {
        orchestrator.tick();
    }
    let snapshot = orchestrator.snapshot();

    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: PopulationSnapshot = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, snapshot);
}

#[test]
fn test_validate_snapshot_rejects_length_mismatch() {
    let snapshot = PopulationSnapshot {
        cycle: 0,
        rng_state: 1,
        group_b: vec![true, false, true],
        in_tier: vec![false, false],
        capital: vec![0.0, 0.0, 0.0],
    };

    assert!(validate_snapshot(&snapshot, 10).is_err());
    assert!(snapshot.to_population().is_err());
}

#[test]
fn test_validate_snapshot_rejects_oversized_tier() {
    let snapshot = PopulationSnapshot {
        cycle: 0,
        rng_state: 1,
        group_b: vec![false; 4],
        in_tier: vec![true; 4],
        capital: vec![0.0; 4],
    };

    assert!(validate_snapshot(&snapshot, 3).is_err());
    assert!(validate_snapshot(&snapshot, 4).is_ok());
}

#[test]
fn test_config_hash_stable_and_sensitive() {
    let base = create_test_config(1);
    let same = create_test_config(1);
    let other_seed = create_test_config(2);
    let other_beta = SimulationConfig {
        beta: 0.31,
        ..create_test_config(1)
    };

    let hash = compute_config_hash(&base).unwrap();
    assert_eq!(hash, compute_config_hash(&same).unwrap());
    assert_ne!(hash, compute_config_hash(&other_seed).unwrap());
    assert_ne!(hash, compute_config_hash(&other_beta).unwrap());

    let orchestrator = Orchestrator::new(base).unwrap();
    assert_eq!(orchestrator.config_hash(), hash);
}

#[test]
fn test_snapshot_json_keeps_every_capital_bit() {
    let mut orchestrator = Orchestrator::new(create_test_config(3)).unwrap();
    for _ in 0..10 {
        orchestrator.tick();
    }
    let snapshot = orchestrator.snapshot();

    let restored: PopulationSnapshot =
        serde_json::from_str(&serde_json::to_string(&snapshot).unwrap()).unwrap();

    let changed = snapshot
        .capital
        .iter()
        .zip(&restored.capital)
        .filter(|(a, b)| a.to_bits() != b.to_bits())
        .count();
    assert_eq!(changed, 0, "{} of {} capital values changed", changed, snapshot.capital.len());
}

#[test]
fn test_config_json_round_trip_is_exact() {
    let config = SimulationConfig {
        beta: 0.1 + 0.2,
        alpha: 1.175840358408628,
        gamma: std::f64::consts::FRAC_1_SQRT_2,
        ..create_test_config(11)
    };

    let restored: SimulationConfig =
        serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();

    assert_eq!(restored, config);
    assert_eq!(compute_config_hash(&restored).unwrap(), compute_config_hash(&config).unwrap());
}

#[test]
fn test_resume_from_snapshot_matches_uninterrupted_run() {
    let config = create_test_config(21);

    let mut uninterrupted = Orchestrator::new(config.clone()).unwrap();
    for _ in 0..30 {
        uninterrupted.tick();
    }
    let checkpoint = uninterrupted.snapshot();
    let expected = uninterrupted.run();
    let expected_state = uninterrupted.snapshot();

    let mut resumed = Orchestrator::from_snapshot(config, &checkpoint).unwrap();
    assert_eq!(resumed.current_cycle(), 30);
    assert_eq!(resumed.rng_state(), checkpoint.rng_state);

    let report = resumed.run();
    assert_eq!(report, expected);
    assert_eq!(resumed.snapshot(), expected_state);
}

#[test]
fn test_resume_rejects_mismatched_snapshot() {
    let config = create_test_config(5);
    let orchestrator = Orchestrator::new(config.clone()).unwrap();
    let snapshot = orchestrator.snapshot();

    let smaller = SimulationConfig {
        population_size: 100,
        ..config.clone()
    };
    assert!(matches!(
        Orchestrator::from_snapshot(smaller, &snapshot),
        Err(SimulationError::StateValidationError(_))
    ));

    let mut corrupt = snapshot.clone();
    corrupt.capital[0] = 40.0;
    assert!(Orchestrator::from_snapshot(config.clone(), &corrupt).is_err());

    let mut past_end = snapshot;
    past_end.cycle = config.num_cycles + 1;
    assert!(Orchestrator::from_snapshot(config, &past_end).is_err());
}
