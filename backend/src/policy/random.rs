//! Random Policy
//!
//! Baseline that ignores score entirely: `min(openings, pool size)`
//! candidates are drawn uniformly without replacement.

use super::{CandidatePool, ScoringParams, SelectionPolicy};
use crate::models::Population;
use crate::rng::RngManager;

/// Random policy: uniform draw from the candidate pool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RandomPolicy;

impl RandomPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl SelectionPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn select(
        &mut self,
        pool: &CandidatePool<'_>,
        openings: usize,
        _scoring: &ScoringParams,
        _population: &Population,
        rng: &mut RngManager,
    ) -> Vec<usize> {
        rng.choose_without_replacement(pool.indices, pool.pick_count(openings))
    }
}
