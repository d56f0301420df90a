//! Selection Policy Module
//!
//! This module defines the policy interface for filling tier openings.
//!
//! # Overview
//!
//! Each cycle the orchestrator computes how many openings the power tier
//! has, scores every agent outside the tier, and hands the candidate pool
//! to the configured policy. The policy decides **who** is admitted.
//!
//! # Policy Interface
//!
//! All policies implement the `SelectionPolicy` trait:
//! ```rust
//! use inertia_simulator_core_rs::policy::{CandidatePool, ScoringParams, SelectionPolicy};
//! use inertia_simulator_core_rs::{Population, RngManager};
//!
//! struct LowestIndexFirst;
//!
//! impl SelectionPolicy for LowestIndexFirst {
//!     fn name(&self) -> &'static str {
//!         "lowest_index_first"
//!     }
//!
//!     fn select(
//!         &mut self,
//!         pool: &CandidatePool<'_>,
//!         openings: usize,
//!         _scoring: &ScoringParams,
//!         _population: &Population,
//!         _rng: &mut RngManager,
//!     ) -> Vec<usize> {
//!         pool.indices.iter().take(openings).copied().collect()
//!     }
//! }
//! ```
//!
//! Available policies:
//! 1. **Weighted**: Rank by score with an intervention bonus for Group B
//! 2. **Quota**: Rank by score, then back-fill a minimum Group B share
//! 3. **Random**: Uniform draw ignoring score (baseline)

use crate::models::Population;
use crate::rng::RngManager;

pub mod quota;
pub mod random;
pub mod weighted;

pub use quota::QuotaPolicy;
pub use random::RandomPolicy;
pub use weighted::WeightedPolicy;

/// Floor applied before every logarithm in score computation
pub const LOG_FLOOR: f64 = 1e-12;

/// `ln(max(x, LOG_FLOOR))`
pub fn safe_log(x: f64) -> f64 {
    x.max(LOG_FLOOR).ln()
}

/// Structural bias added to a candidate's score
///
/// Group B receives `ln(1 - beta)`, Group A receives `ln(1 + beta)`.
pub fn bias_term(is_b: bool, beta: f64) -> f64 {
    if is_b {
        safe_log(1.0 - beta)
    } else {
        safe_log(1.0 + beta)
    }
}

/// Un-boosted selection score: `k * capital + bias_term`
pub fn base_score(capital: f64, is_b: bool, k: f64, beta: f64) -> f64 {
    k * capital + bias_term(is_b, beta)
}

/// Scoring parameters shared by the engine and the policies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    /// Weight of capital in the score
    pub k: f64,
    /// Structural bias against Group B
    pub beta: f64,
}

impl ScoringParams {
    pub fn score(&self, capital: f64, is_b: bool) -> f64 {
        base_score(capital, is_b, self.k, self.beta)
    }
}

/// Candidates eligible for admission this cycle
///
/// Parallel slices in ascending agent-index order: `indices[j]` is the
/// agent, `scores[j]` its base score, `group_b[j]` its group flag.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePool<'a> {
    pub indices: &'a [usize],
    pub scores: &'a [f64],
    pub group_b: &'a [bool],
}

impl<'a> CandidatePool<'a> {
    pub fn new(indices: &'a [usize], scores: &'a [f64], group_b: &'a [bool]) -> Self {
        debug_assert_eq!(indices.len(), scores.len());
        debug_assert_eq!(indices.len(), group_b.len());
        Self {
            indices,
            scores,
            group_b,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Admissions possible this cycle: `min(openings, pool size)`
    pub fn pick_count(&self, openings: usize) -> usize {
        openings.min(self.len())
    }
}

/// Policy interface for tier admission
///
/// Implementations must return distinct agent indices drawn from
/// `pool.indices`, at most `pool.pick_count(openings)` of them. Any
/// randomness must come from `rng`.
pub trait SelectionPolicy {
    /// Short identifier used in logs and reports
    fn name(&self) -> &'static str;

    /// Choose which candidates fill this cycle's openings
    fn select(
        &mut self,
        pool: &CandidatePool<'_>,
        openings: usize,
        scoring: &ScoringParams,
        population: &Population,
        rng: &mut RngManager,
    ) -> Vec<usize>;
}

/// Highest-scoring `n` candidates, returned worst first
///
/// Positions are ordered by score ascending; equal scores are ordered by
/// descending agent index so that, after taking the last `n`, the lower
/// index wins a tie.
pub fn rank_top(indices: &[usize], scores: &[f64], n: usize) -> Vec<usize> {
    let n = n.min(indices.len());
    let mut order: Vec<usize> = (0..indices.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .total_cmp(&scores[b])
            .then_with(|| indices[b].cmp(&indices[a]))
    });
    order[order.len() - n..]
        .iter()
        .map(|&pos| indices[pos])
        .collect()
}
