//! Agent Population State
//!
//! Structure-of-arrays holding every agent's group, tier membership and
//! capital. The population is created once per run and mutated in place by
//! the orchestrator; agent indices are stable for the run's lifetime.
//!
//! # Critical Invariants
//!
//! 1. **Fixed Size**: No agent is ever added or removed, only `in_tier` toggles
//! 2. **Immutable Groups**: `group_b[i]` never changes after initialization
//! 3. **Bounded Capital**: After every capital update, `capital[i]` lies in
//!    `[CAPITAL_MIN, CAPITAL_MAX]`

use crate::models::group::Group;
use crate::rng::RngManager;
use thiserror::Error;

/// Lower clamp for agent capital
pub const CAPITAL_MIN: f64 = -12.0;

/// Upper clamp for agent capital
pub const CAPITAL_MAX: f64 = 12.0;

/// Errors raised when assembling a population from raw vectors
#[derive(Debug, Error, PartialEq)]
pub enum PopulationError {
    #[error("Attribute vectors disagree in length: group_b={group_b}, in_tier={in_tier}, capital={capital}")]
    LengthMismatch {
        group_b: usize,
        in_tier: usize,
        capital: usize,
    },
}

/// Complete agent population
///
/// # Example
///
/// ```rust
/// use inertia_simulator_core_rs::{Population, RngManager};
///
/// let mut rng = RngManager::new(7);
/// let population = Population::initialize(100, 0.3, &mut rng);
/// assert_eq!(population.len(), 100);
/// assert_eq!(population.tier_count(), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    /// Group B membership per agent (false = Group A)
    group_b: Vec<bool>,

    /// Power tier membership per agent
    in_tier: Vec<bool>,

    /// Accumulated capital per agent
    capital: Vec<f64>,
}

impl Population {
    /// Draw a fresh population
    ///
    /// Consumes `n` uniforms for group assignment followed by `n` standard
    /// normals for initial capital. Nobody starts in the tier.
    pub fn initialize(n: usize, pop_share_b: f64, rng: &mut RngManager) -> Self {
        let group_b = (0..n).map(|_| rng.bernoulli(pop_share_b)).collect();
        let capital = rng.normal_vec(n);

        Self {
            group_b,
            in_tier: vec![false; n],
            capital,
        }
    }

    /// Assemble a population from explicit attribute vectors
    pub fn from_parts(
        group_b: Vec<bool>,
        in_tier: Vec<bool>,
        capital: Vec<f64>,
    ) -> Result<Self, PopulationError> {
        if group_b.len() != in_tier.len() || group_b.len() != capital.len() {
            return Err(PopulationError::LengthMismatch {
                group_b: group_b.len(),
                in_tier: in_tier.len(),
                capital: capital.len(),
            });
        }

        Ok(Self {
            group_b,
            in_tier,
            capital,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn len(&self) -> usize {
        self.group_b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.group_b.is_empty()
    }

    pub fn group(&self, index: usize) -> Group {
        Group::from_is_b(self.group_b[index])
    }

    pub fn is_b(&self, index: usize) -> bool {
        self.group_b[index]
    }

    pub fn is_in_tier(&self, index: usize) -> bool {
        self.in_tier[index]
    }

    pub fn capital(&self, index: usize) -> f64 {
        self.capital[index]
    }

    pub fn group_flags(&self) -> &[bool] {
        &self.group_b
    }

    pub fn tier_flags(&self) -> &[bool] {
        &self.in_tier
    }

    pub fn capitals(&self) -> &[f64] {
        &self.capital
    }

    /// Indices of current tier members, ascending
    pub fn tier_members(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.in_tier[i]).collect()
    }

    /// Indices of agents outside the tier, ascending
    pub fn candidates(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| !self.in_tier[i]).collect()
    }

    pub fn tier_count(&self) -> usize {
        self.in_tier.iter().filter(|&&z| z).count()
    }

    /// Number of Group B agents currently in the tier
    pub fn tier_count_b(&self) -> usize {
        self.in_tier
            .iter()
            .zip(&self.group_b)
            .filter(|(z, b)| **z && **b)
            .count()
    }

    /// Number of Group B agents in the whole population
    pub fn count_b(&self) -> usize {
        self.group_b.iter().filter(|&&b| b).count()
    }

    /// Fraction of tier members belonging to Group B (0.0 on an empty tier)
    pub fn representation_b(&self) -> f64 {
        let members = self.tier_count();
        if members == 0 {
            return 0.0;
        }
        self.tier_count_b() as f64 / members as f64
    }

    // ========================================================================
    // Mutators (orchestrator only)
    // ========================================================================

    pub fn admit(&mut self, index: usize) {
        self.in_tier[index] = true;
    }

    pub fn remove(&mut self, index: usize) {
        self.in_tier[index] = false;
    }

    pub(crate) fn capital_mut(&mut self) -> &mut [f64] {
        &mut self.capital
    }

    pub fn clamp_capital(&mut self, lo: f64, hi: f64) {
        for c in &mut self.capital {
            *c = c.clamp(lo, hi);
        }
    }
}
