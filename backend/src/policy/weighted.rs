//! Weighted Policy
//!
//! Score-ranked admission with an intervention bonus for Group B.
//!
//! # Behavior
//!
//! - Group B candidates get `ln(max(1 + tau, 1e-12))` added to their score
//! - The `min(openings, pool size)` highest scores are admitted
//! - `tau = 0` reduces to pure merit ranking on the biased base score

use super::{rank_top, safe_log, CandidatePool, ScoringParams, SelectionPolicy};
use crate::models::Population;
use crate::rng::RngManager;

/// Weighted policy: rank by (possibly boosted) score
///
/// # Example
///
/// ```
/// use inertia_simulator_core_rs::policy::{CandidatePool, ScoringParams, SelectionPolicy, WeightedPolicy};
/// use inertia_simulator_core_rs::{Population, RngManager};
///
/// let population = Population::from_parts(vec![false, true], vec![false, false], vec![0.0, 0.0]).unwrap();
/// let pool = CandidatePool::new(&[0, 1], &[0.2, 0.1], &[false, true]);
/// let scoring = ScoringParams { k: 0.5, beta: 0.0 };
/// let mut rng = RngManager::new(1);
///
/// // A large intervention lifts the Group B candidate above the Group A one
/// let mut policy = WeightedPolicy::new(1.0);
/// let chosen = policy.select(&pool, 1, &scoring, &population, &mut rng);
/// assert_eq!(chosen, vec![1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedPolicy {
    tau: f64,
}

impl WeightedPolicy {
    pub fn new(tau: f64) -> Self {
        Self { tau }
    }
}

impl Default for WeightedPolicy {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl SelectionPolicy for WeightedPolicy {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn select(
        &mut self,
        pool: &CandidatePool<'_>,
        openings: usize,
        _scoring: &ScoringParams,
        _population: &Population,
        _rng: &mut RngManager,
    ) -> Vec<usize> {
        let bonus = safe_log(1.0 + self.tau);
        let boosted: Vec<f64> = pool
            .scores
            .iter()
            .zip(pool.group_b)
            .map(|(&score, &is_b)| if is_b { score + bonus } else { score })
            .collect();

        rank_top(pool.indices, &boosted, pool.pick_count(openings))
    }
}
