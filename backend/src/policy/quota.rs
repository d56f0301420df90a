//! Quota Policy
//!
//! Score-ranked admission with a best-effort minimum Group B share.
//!
//! # Behavior
//!
//! 1. Take the preliminary top `n_pick` by un-boosted score
//! 2. `target = ceil(quota_min_b_share * n_pick)`
//! 3. If the preliminary set holds fewer Group B members than `target`,
//!    draw the shortfall uniformly from Group B candidates outside the
//!    preliminary set
//! 4. Substitute the draws for the lowest-scoring Group A members of the
//!    preliminary set, worst first
//!
//! The floor is best-effort: when the pool cannot supply enough extra
//! Group B candidates, or the preliminary set has too few Group A members
//! to replace, as many substitutions as possible are made.
//!
//! The replacement order re-scores the chosen agents from their capital
//! and group rather than reusing the pool's score vector.

use super::{rank_top, CandidatePool, ScoringParams, SelectionPolicy};
use crate::models::Population;
use crate::rng::RngManager;
use std::collections::HashSet;

/// Quota policy: ranked selection plus Group B back-fill
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaPolicy {
    quota_min_b_share: f64,
}

impl QuotaPolicy {
    pub fn new(quota_min_b_share: f64) -> Self {
        Self { quota_min_b_share }
    }

    /// Group B admissions required for `n_pick` openings
    pub fn target_b_count(&self, n_pick: usize) -> usize {
        (self.quota_min_b_share * n_pick as f64).ceil() as usize
    }
}

impl SelectionPolicy for QuotaPolicy {
    fn name(&self) -> &'static str {
        "quota"
    }

    fn select(
        &mut self,
        pool: &CandidatePool<'_>,
        openings: usize,
        scoring: &ScoringParams,
        population: &Population,
        rng: &mut RngManager,
    ) -> Vec<usize> {
        let n_pick = pool.pick_count(openings);
        let prelim = rank_top(pool.indices, pool.scores, n_pick);
        let mut chosen = prelim.clone();

        let current_b = prelim.iter().filter(|&&i| population.is_b(i)).count();
        let target_b = self.target_b_count(n_pick);
        if current_b >= target_b {
            return chosen;
        }

        let needed = target_b - current_b;
        let in_prelim: HashSet<usize> = prelim.iter().copied().collect();
        let extra_b: Vec<usize> = pool
            .indices
            .iter()
            .zip(pool.group_b)
            .filter(|(i, is_b)| **is_b && !in_prelim.contains(*i))
            .map(|(&i, _)| i)
            .collect();
        if extra_b.is_empty() {
            tracing::trace!(needed, "quota shortfall with no Group B candidates left");
            return chosen;
        }

        let add_b = rng.choose_without_replacement(&extra_b, needed);

        let mut slots_a: Vec<usize> = (0..chosen.len())
            .filter(|&pos| !population.is_b(chosen[pos]))
            .collect();
        if slots_a.is_empty() {
            return chosen;
        }

        let chosen_scores: Vec<f64> = chosen
            .iter()
            .map(|&i| scoring.score(population.capital(i), population.is_b(i)))
            .collect();
        // Stable sort keeps earlier slots first among equal scores
        slots_a.sort_by(|&a, &b| chosen_scores[a].total_cmp(&chosen_scores[b]));

        let to_replace = add_b.len().min(slots_a.len());
        for (&slot, &agent) in slots_a.iter().zip(&add_b).take(to_replace) {
            chosen[slot] = agent;
        }

        tracing::trace!(
            n_pick,
            target_b,
            prelim_b = current_b,
            substituted = to_replace,
            "quota back-fill"
        );

        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Agents 0..4 are Group A with descending capital, 4..8 Group B with low capital
    fn skewed_population() -> Population {
        Population::from_parts(
            vec![false, false, false, false, true, true, true, true],
            vec![false; 8],
            vec![4.0, 3.0, 2.0, 1.0, -1.0, -2.0, -3.0, -4.0],
        )
        .unwrap()
    }

    fn pool_scores(population: &Population, scoring: &ScoringParams) -> (Vec<usize>, Vec<f64>, Vec<bool>) {
        let indices = population.candidates();
        let scores = indices
            .iter()
            .map(|&i| scoring.score(population.capital(i), population.is_b(i)))
            .collect();
        let flags = indices.iter().map(|&i| population.is_b(i)).collect();
        (indices, scores, flags)
    }

    #[test]
    fn test_target_rounds_up() {
        let policy = QuotaPolicy::new(0.3);
        assert_eq!(policy.target_b_count(10), 3);
        assert_eq!(policy.target_b_count(4), 2);
        assert_eq!(policy.target_b_count(0), 0);
    }

    #[test]
    fn test_backfill_replaces_lowest_scoring_a() {
        let population = skewed_population();
        let scoring = ScoringParams { k: 1.0, beta: 0.0 };
        let (indices, scores, flags) = pool_scores(&population, &scoring);
        let pool = CandidatePool::new(&indices, &scores, &flags);
        let mut rng = RngManager::new(5);

        let chosen = QuotaPolicy::new(0.5).select(&pool, 4, &scoring, &population, &mut rng);

        assert_eq!(chosen.len(), 4);
        let b_count = chosen.iter().filter(|&&i| population.is_b(i)).count();
        assert_eq!(b_count, 2);
        // The two best Group A agents survive
        assert!(chosen.contains(&0));
        assert!(chosen.contains(&1));
        assert!(!chosen.contains(&2));
        assert!(!chosen.contains(&3));
    }

    #[test]
    fn test_satisfied_quota_matches_ranking_without_draws() {
        let population = skewed_population();
        let scoring = ScoringParams { k: 1.0, beta: 0.0 };
        let (indices, scores, flags) = pool_scores(&population, &scoring);
        let pool = CandidatePool::new(&indices, &scores, &flags);
        let mut rng = RngManager::new(5);
        let before = rng.get_state();

        let chosen = QuotaPolicy::new(0.0).select(&pool, 3, &scoring, &population, &mut rng);

        assert_eq!(chosen, rank_top(&indices, &scores, 3));
        assert_eq!(rng.get_state(), before);
    }

    #[test]
    fn test_best_effort_when_b_pool_short() {
        // Only one Group B agent exists but the quota asks for all openings
        let population = Population::from_parts(
            vec![false, false, false, true],
            vec![false; 4],
            vec![3.0, 2.0, 1.0, -5.0],
        )
        .unwrap();
        let scoring = ScoringParams { k: 1.0, beta: 0.0 };
        let (indices, scores, flags) = pool_scores(&population, &scoring);
        let pool = CandidatePool::new(&indices, &scores, &flags);
        let mut rng = RngManager::new(11);

        let chosen = QuotaPolicy::new(1.0).select(&pool, 3, &scoring, &population, &mut rng);

        assert_eq!(chosen.len(), 3);
        assert!(chosen.contains(&3));
        // Agent 2 was the lowest-scoring Group A member of the preliminary pick
        assert!(!chosen.contains(&2));
    }

    #[test]
    fn test_chosen_is_distinct() {
        let population = skewed_population();
        let scoring = ScoringParams { k: 1.0, beta: 0.3 };
        let (indices, scores, flags) = pool_scores(&population, &scoring);
        let pool = CandidatePool::new(&indices, &scores, &flags);

        for seed in 0..50 {
            let mut rng = RngManager::new(seed);
            let mut chosen = QuotaPolicy::new(0.75).select(&pool, 5, &scoring, &population, &mut rng);
            let len = chosen.len();
            chosen.sort_unstable();
            chosen.dedup();
            assert_eq!(chosen.len(), len, "seed {} produced duplicates", seed);
        }
    }
}
