//! Property tests for the cycle engine invariants
//!
//! Random parameter sets must never break the capital bound, the
//! admission limit, or seed determinism.

use inertia_simulator_core_rs::orchestrator::{
    compute_openings, Orchestrator, PolicyKind, SimulationConfig,
};
use inertia_simulator_core_rs::{CAPITAL_MAX, CAPITAL_MIN};
use proptest::prelude::*;

fn policy_strategy() -> impl Strategy<Value = PolicyKind> {
    prop_oneof![
        Just(PolicyKind::Weighted),
        Just(PolicyKind::Quota),
        Just(PolicyKind::Random),
    ]
}

prop_compose! {
    fn config_strategy()(
        sizes in (0usize..120, 0usize..80, 0usize..25),
        shares in (
            0.0f64..=1.0,
            0.0f64..=1.0,
            0.0f64..=1.0,
            0.0f64..=1.0,
            0.0f64..=1.0,
            0.0f64..=1.0,
        ),
        weights in (0.0f64..3.0, 0.0f64..2.0, 0.0f64..2.0, -2.0f64..2.0, 0.0f64..2.0),
        policy in policy_strategy(),
        seed in any::<u64>(),
    ) -> SimulationConfig {
        let (population_size, capacity_p, num_cycles) = sizes;
        let (pop_share_b, beta, turnover_rate, retention_a, retention_b, quota_min_b_share) = shares;
        let (tau, alpha, gamma, k, noise_sd) = weights;

        SimulationConfig {
            population_size,
            pop_share_b,
            beta,
            tau,
            alpha,
            gamma,
            capacity_p,
            turnover_rate,
            retention_a,
            retention_b,
            num_cycles,
            policy,
            quota_min_b_share,
            k,
            noise_sd,
            seed,
            record_trajectory: false,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_capital_and_admissions_bounded(config in config_strategy()) {
        let capacity = config.capacity_p;
        let min_open = compute_openings(capacity, usize::MAX);
        let cycles = config.num_cycles;
        let mut orchestrator = Orchestrator::new(config).unwrap();
        let mut prev_tier = 0usize;

        for _ in 0..cycles {
            let result = orchestrator.tick();
            let before = prev_tier - result.retention_exits - result.turnover_exits;

            prop_assert!(result.admitted <= result.openings);
            prop_assert!(result.admitted_b <= result.admitted);
            prop_assert!(result.tier_size <= capacity.max(before + min_open));
            prop_assert!((0.0..=1.0).contains(&result.representation_b));
            for &c in orchestrator.population().capitals() {
                prop_assert!((CAPITAL_MIN..=CAPITAL_MAX).contains(&c));
            }
            prev_tier = result.tier_size;
        }
    }

    #[test]
    fn prop_same_seed_same_outcome(config in config_strategy()) {
        let mut orch1 = Orchestrator::new(config.clone()).unwrap();
        let mut orch2 = Orchestrator::new(config).unwrap();

        let report1 = orch1.run();
        let report2 = orch2.run();

        prop_assert_eq!(report1.representation_b.to_bits(), report2.representation_b.to_bits());
        prop_assert_eq!(orch1.snapshot(), orch2.snapshot());
    }
}
