//! Orchestrator Engine
//!
//! Main simulation loop integrating all components:
//! - Retention exits and forced turnover (tier attrition)
//! - Opening computation (capacity plus churn floor)
//! - Candidate scoring and policy selection (tier admission)
//! - Capital update (membership feedback and noise)
//!
//! # Architecture
//!
//! The Orchestrator implements the cycle loop:
//!
//! ```text
//! For each cycle t:
//! 1. Retention exit (per-group exit probability, one uniform per agent)
//! 2. Forced turnover (uniform removal of round(rate * tier size) members)
//! 3. Openings = max(capacity - tier size, max(1, floor(0.08 * capacity)))
//! 4. Score every agent outside the tier
//! 5. Delegate admission to the selection policy
//! 6. Capital += alpha * in_tier + gamma * N(0,1) + noise_sd * N(0,1), clamped
//! ```
//!
//! The order is load-bearing: each step observes the effects of the
//! previous ones within the same cycle.
//!
//! # Example
//!
//! ```rust
//! use inertia_simulator_core_rs::orchestrator::{Orchestrator, PolicyKind, SimulationConfig};
//!
//! let config = SimulationConfig {
//!     population_size: 200,
//!     capacity_p: 40,
//!     num_cycles: 25,
//!     policy: PolicyKind::Quota,
//!     quota_min_b_share: 0.3,
//!     seed: 7,
//!     ..Default::default()
//! };
//!
//! let mut orchestrator = Orchestrator::new(config).unwrap();
//! let first = orchestrator.tick();
//! assert_eq!(first.cycle, 0);
//!
//! let report = orchestrator.run();
//! assert_eq!(report.cycles, 25);
//! assert!((0.0..=1.0).contains(&report.representation_b));
//! ```

use crate::models::{Group, Population, CAPITAL_MAX, CAPITAL_MIN};
use crate::orchestrator::checkpoint::{
    compute_config_hash, validate_snapshot, PopulationSnapshot,
};
use crate::policy::{
    CandidatePool, QuotaPolicy, RandomPolicy, ScoringParams, SelectionPolicy, WeightedPolicy,
};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Fraction of capacity guaranteed as openings every cycle
pub const MIN_OPENING_FRACTION: f64 = 0.08;

// ============================================================================
// Configuration Types
// ============================================================================

/// Selection policy choice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Score ranking with the `tau` intervention bonus for Group B
    #[default]
    Weighted,

    /// Score ranking with a best-effort Group B floor
    Quota,

    /// Uniform draw ignoring score
    Random,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Weighted => "weighted",
            PolicyKind::Quota => "quota",
            PolicyKind::Random => "random",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weighted" => Ok(PolicyKind::Weighted),
            "quota" => Ok(PolicyKind::Quota),
            "random" => Ok(PolicyKind::Random),
            _ => Err(SimulationError::InvalidConfig(format!(
                "Invalid policy: '{}'. Must be 'weighted', 'quota' or 'random'",
                s
            ))),
        }
    }
}

/// Complete simulation configuration
///
/// Every field has a default, so partial JSON documents deserialize. The
/// short parameter names (`N`, `pop_share_B`, `rA`, `T`, ...) are accepted
/// as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of agents (N)
    #[serde(alias = "N")]
    pub population_size: usize,

    /// Probability that an agent is drawn into Group B
    #[serde(alias = "pop_share_B")]
    pub pop_share_b: f64,

    /// Structural scoring bias against Group B, in [0, 1]
    pub beta: f64,

    /// Intervention bonus for Group B (weighted policy only)
    pub tau: f64,

    /// Capital gained per cycle while in the tier
    pub alpha: f64,

    /// Scale of the random capital drift
    pub gamma: f64,

    /// Tier capacity (capacity_P)
    #[serde(alias = "capacity_P")]
    pub capacity_p: usize,

    /// Fraction of remaining members forcibly removed each cycle
    pub turnover_rate: f64,

    /// Per-cycle retention probability for Group A (rA)
    #[serde(alias = "rA")]
    pub retention_a: f64,

    /// Per-cycle retention probability for Group B (rB)
    #[serde(alias = "rB")]
    pub retention_b: f64,

    /// Number of cycles to run (T)
    #[serde(alias = "T")]
    pub num_cycles: usize,

    /// Selection policy
    pub policy: PolicyKind,

    /// Minimum Group B share of admissions (quota policy only)
    #[serde(alias = "quota_min_B_share")]
    pub quota_min_b_share: f64,

    /// Weight of capital in the selection score
    pub k: f64,

    /// Extra capital noise scale
    pub noise_sd: f64,

    /// RNG seed for deterministic simulation
    pub seed: u64,

    /// Keep every cycle's result in the run report
    pub record_trajectory: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population_size: 800,
            pop_share_b: 0.3,
            beta: 0.3,
            tau: 0.0,
            alpha: 0.4,
            gamma: 0.15,
            capacity_p: 150,
            turnover_rate: 0.1,
            retention_a: 0.95,
            retention_b: 0.92,
            num_cycles: 400,
            policy: PolicyKind::Weighted,
            quota_min_b_share: 0.5,
            k: 0.5,
            noise_sd: 0.0,
            seed: 0,
            record_trajectory: false,
        }
    }
}

impl SimulationConfig {
    /// Check every parameter against its constraint
    ///
    /// Integer parameters are unsigned, so negative sizes and cycle counts
    /// cannot be expressed; the real-valued parameters are checked here.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let probabilities = [
            ("pop_share_b", self.pop_share_b),
            ("beta", self.beta),
            ("turnover_rate", self.turnover_rate),
            ("retention_a", self.retention_a),
            ("retention_b", self.retention_b),
            ("quota_min_b_share", self.quota_min_b_share),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimulationError::InvalidParameter {
                    name,
                    value,
                    constraint: "must lie in [0, 1]",
                });
            }
        }

        let non_negative = [
            ("tau", self.tau),
            ("alpha", self.alpha),
            ("gamma", self.gamma),
            ("noise_sd", self.noise_sd),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::InvalidParameter {
                    name,
                    value,
                    constraint: "must be finite and >= 0",
                });
            }
        }

        if !self.k.is_finite() {
            return Err(SimulationError::InvalidParameter {
                name: "k",
                value: self.k,
                constraint: "must be finite",
            });
        }

        Ok(())
    }

    /// Scoring parameters derived from this configuration
    pub fn scoring(&self) -> ScoringParams {
        ScoringParams {
            k: self.k,
            beta: self.beta,
        }
    }

    /// Per-cycle retention probability for `group`
    pub fn retention(&self, group: Group) -> f64 {
        match group {
            Group::A => self.retention_a,
            Group::B => self.retention_b,
        }
    }

    /// Build the configured selection policy
    pub fn build_policy(&self) -> Box<dyn SelectionPolicy> {
        match self.policy {
            PolicyKind::Weighted => Box::new(WeightedPolicy::new(self.tau)),
            PolicyKind::Quota => Box::new(QuotaPolicy::new(self.quota_min_b_share)),
            PolicyKind::Random => Box::new(RandomPolicy::new()),
        }
    }
}

/// Openings for a cycle given the current tier size
///
/// `max(capacity - tier size, max(1, floor(0.08 * capacity)))`
pub fn compute_openings(capacity: usize, current_in_tier: usize) -> usize {
    let free = capacity.saturating_sub(current_in_tier);
    let min_open = ((MIN_OPENING_FRACTION * capacity as f64) as usize).max(1);
    free.max(min_open)
}

// ============================================================================
// Errors and Results
// ============================================================================

/// Simulation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A parameter violated its constraint
    #[error("Invalid parameter {name} = {value}: {constraint}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },

    /// Configuration could not be interpreted
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Config or snapshot serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Snapshot failed integrity checks
    #[error("State validation error: {0}")]
    StateValidationError(String),
}

/// Result of a single cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleResult {
    /// Cycle number (0-based)
    pub cycle: usize,

    /// Members removed by retention draws
    pub retention_exits: usize,

    /// Members removed by forced turnover
    pub turnover_exits: usize,

    /// Openings offered this cycle
    pub openings: usize,

    /// Size of the candidate pool
    pub candidates: usize,

    /// Agents admitted this cycle
    pub admitted: usize,

    /// Group B agents admitted this cycle
    pub admitted_b: usize,

    /// Tier size after admission
    pub tier_size: usize,

    /// Group B tier members after admission
    pub tier_size_b: usize,

    /// Group B share of the tier after admission
    pub representation_b: f64,
}

/// Final outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Group B share of the tier after the last cycle (0.0 if empty)
    pub representation_b: f64,

    /// Group A share of the tier (0.0 if empty)
    pub representation_a: f64,

    /// `representation_b - pop_share_b`
    pub representation_gap: f64,

    /// Configured Group B population share
    pub pop_share_b: f64,

    /// Cycles executed
    pub cycles: usize,

    /// Tier size after the last cycle
    pub final_tier_size: usize,

    /// Policy used for admission
    pub policy: PolicyKind,

    /// Per-cycle results when `record_trajectory` is set
    pub trajectory: Option<Vec<CycleResult>>,

    /// SHA-256 of the canonical configuration
    pub config_hash: String,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Main orchestrator managing simulation state and cycle loop
///
/// # Determinism
///
/// All randomness is via `rng_manager` with seeded xorshift64*.
/// Same seed + same config = identical results (deterministic replay).
pub struct Orchestrator {
    /// Run configuration
    config: SimulationConfig,

    /// Agent population (groups, tier flags, capital)
    population: Population,

    /// Deterministic RNG
    rng_manager: RngManager,

    /// Admission policy
    policy: Box<dyn SelectionPolicy>,

    /// Score weights
    scoring: ScoringParams,

    /// Cycles executed so far
    current_cycle: usize,

    /// Recorded cycle results (only when `record_trajectory`)
    trajectory: Vec<CycleResult>,

    /// Hash of `config`, computed once
    config_hash: String,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("policy", &self.policy.name())
            .field("current_cycle", &self.current_cycle)
            .field("population_size", &self.population.len())
            .field("tier_size", &self.population.tier_count())
            .finish()
    }
}

impl Orchestrator {
    /// Create new orchestrator from configuration
    ///
    /// Validates the configuration, then seeds the RNG and draws the
    /// initial population. Nothing is constructed for an invalid config.
    ///
    /// # Errors
    ///
    /// * `SimulationError::InvalidParameter` - a parameter is out of range
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let config_hash = compute_config_hash(&config)?;

        let mut rng_manager = RngManager::new(config.seed);
        let population =
            Population::initialize(config.population_size, config.pop_share_b, &mut rng_manager);
        let policy = config.build_policy();

        info!(
            policy = policy.name(),
            n = config.population_size,
            capacity = config.capacity_p,
            cycles = config.num_cycles,
            seed = config.seed,
            initial_b = population.count_b(),
            "simulation initialized"
        );

        Ok(Self {
            scoring: config.scoring(),
            config,
            population,
            rng_manager,
            policy,
            current_cycle: 0,
            trajectory: Vec::new(),
            config_hash,
        })
    }

    /// Resume a run from a snapshot taken under the same configuration
    ///
    /// The restored orchestrator continues exactly where the snapshotted
    /// one stopped: same population, same RNG state, same cycle counter.
    /// Trajectory recording restarts empty.
    ///
    /// # Errors
    ///
    /// * `SimulationError::InvalidParameter` - a parameter is out of range
    /// * `SimulationError::StateValidationError` - the snapshot does not
    ///   fit the configuration or violates a state invariant
    pub fn from_snapshot(
        config: SimulationConfig,
        snapshot: &PopulationSnapshot,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        if snapshot.group_b.len() != config.population_size {
            return Err(SimulationError::StateValidationError(format!(
                "Snapshot holds {} agents, config expects {}",
                snapshot.group_b.len(),
                config.population_size
            )));
        }
        if snapshot.cycle > config.num_cycles {
            return Err(SimulationError::StateValidationError(format!(
                "Snapshot cycle {} is past the configured {} cycles",
                snapshot.cycle, config.num_cycles
            )));
        }
        if snapshot.rng_state == 0 {
            return Err(SimulationError::StateValidationError(
                "RNG state must be non-zero".to_string(),
            ));
        }
        validate_snapshot(snapshot, config.population_size)?;

        let config_hash = compute_config_hash(&config)?;
        let population = snapshot.to_population()?;
        let policy = config.build_policy();

        info!(
            policy = policy.name(),
            cycle = snapshot.cycle,
            tier_size = population.tier_count(),
            "simulation resumed from snapshot"
        );

        Ok(Self {
            scoring: config.scoring(),
            config,
            population,
            rng_manager: RngManager::new(snapshot.rng_state),
            policy,
            current_cycle: snapshot.cycle,
            trajectory: Vec::new(),
            config_hash,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of cycles executed so far
    pub fn current_cycle(&self) -> usize {
        self.current_cycle
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Current RNG state (advances with every draw)
    pub fn rng_state(&self) -> u64 {
        self.rng_manager.get_state()
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    /// Group B share of the current tier
    pub fn representation_b(&self) -> f64 {
        self.population.representation_b()
    }

    /// Whether the configured number of cycles has been executed
    pub fn is_finished(&self) -> bool {
        self.current_cycle >= self.config.num_cycles
    }

    /// Capture the population and RNG state
    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot::capture(self.current_cycle, &self.population, &self.rng_manager)
    }

    // ========================================================================
    // Cycle Loop Implementation
    // ========================================================================

    /// Execute one simulation cycle
    ///
    /// Runs steps 1-6 in order and returns the cycle's summary.
    pub fn tick(&mut self) -> CycleResult {
        let cycle = self.current_cycle;

        // STEP 1: RETENTION EXIT
        let retention_exits = self.apply_retention_exits();

        // STEP 2: FORCED TURNOVER
        let turnover_exits = self.apply_forced_turnover();

        // STEP 3: OPENINGS
        let openings = compute_openings(self.config.capacity_p, self.population.tier_count());

        // STEPS 4-5: SCORING AND SELECTION
        let (candidates, admitted) = self.admit_candidates(openings);
        let admitted_b = admitted.iter().filter(|&&i| self.population.is_b(i)).count();

        // STEP 6: CAPITAL UPDATE
        self.update_capital();

        let result = CycleResult {
            cycle,
            retention_exits,
            turnover_exits,
            openings,
            candidates,
            admitted: admitted.len(),
            admitted_b,
            tier_size: self.population.tier_count(),
            tier_size_b: self.population.tier_count_b(),
            representation_b: self.population.representation_b(),
        };

        debug!(
            cycle,
            retention_exits,
            turnover_exits,
            openings,
            admitted = result.admitted,
            admitted_b,
            tier_size = result.tier_size,
            representation_b = result.representation_b,
            "cycle complete"
        );

        if self.config.record_trajectory {
            self.trajectory.push(result.clone());
        }
        self.current_cycle += 1;
        result
    }

    /// Execute the remaining configured cycles and report
    pub fn run(&mut self) -> RunReport {
        while !self.is_finished() {
            self.tick();
        }
        let report = self.report();

        info!(
            cycles = report.cycles,
            tier_size = report.final_tier_size,
            representation_b = report.representation_b,
            gap = report.representation_gap,
            "simulation finished"
        );
        report
    }

    /// Summarize the current state
    pub fn report(&self) -> RunReport {
        let representation_b = self.population.representation_b();
        let final_tier_size = self.population.tier_count();
        let representation_a = if final_tier_size == 0 {
            0.0
        } else {
            1.0 - representation_b
        };

        RunReport {
            representation_b,
            representation_a,
            representation_gap: representation_b - self.config.pop_share_b,
            pop_share_b: self.config.pop_share_b,
            cycles: self.current_cycle,
            final_tier_size,
            policy: self.config.policy,
            trajectory: self
                .config
                .record_trajectory
                .then(|| self.trajectory.clone()),
            config_hash: self.config_hash.clone(),
        }
    }

    /// Remove tier members whose retention draw falls below their exit probability
    ///
    /// One uniform is drawn for every agent so the draw count does not
    /// depend on tier occupancy; only tier members can exit.
    fn apply_retention_exits(&mut self) -> usize {
        let draws = self.rng_manager.uniform_vec(self.population.len());
        let mut exits = 0;

        for (i, u) in draws.into_iter().enumerate() {
            if !self.population.is_in_tier(i) {
                continue;
            }
            if u < 1.0 - self.config.retention(self.population.group(i)) {
                self.population.remove(i);
                exits += 1;
            }
        }
        exits
    }

    /// Remove `round(turnover_rate * tier size)` members uniformly at random
    ///
    /// Rounds half to even.
    fn apply_forced_turnover(&mut self) -> usize {
        if self.config.turnover_rate <= 0.0 {
            return 0;
        }

        let members = self.population.tier_members();
        let n_turnover = (self.config.turnover_rate * members.len() as f64).round_ties_even() as usize;
        if n_turnover == 0 {
            return 0;
        }

        let dropped = self
            .rng_manager
            .choose_without_replacement(&members, n_turnover);
        for &i in &dropped {
            self.population.remove(i);
        }
        dropped.len()
    }

    /// Score the candidate pool, ask the policy, and admit its choice
    ///
    /// Returns the pool size and the admitted agents.
    fn admit_candidates(&mut self, openings: usize) -> (usize, Vec<usize>) {
        let indices = self.population.candidates();
        if openings == 0 || indices.is_empty() {
            return (indices.len(), Vec::new());
        }

        let group_b: Vec<bool> = indices.iter().map(|&i| self.population.is_b(i)).collect();
        let scores: Vec<f64> = indices
            .iter()
            .zip(&group_b)
            .map(|(&i, &is_b)| self.scoring.score(self.population.capital(i), is_b))
            .collect();

        let pool = CandidatePool::new(&indices, &scores, &group_b);
        let chosen = self.policy.select(
            &pool,
            openings,
            &self.scoring,
            &self.population,
            &mut self.rng_manager,
        );
        debug_assert!(chosen.len() <= pool.pick_count(openings));

        for &i in &chosen {
            self.population.admit(i);
        }
        (indices.len(), chosen)
    }

    /// Apply membership gain and noise to every agent, then clamp
    ///
    /// Draws the full `gamma` normal vector before the `noise_sd` vector.
    fn update_capital(&mut self) {
        let n = self.population.len();
        let drift = self.rng_manager.normal_vec(n);
        let noise = self.rng_manager.normal_vec(n);

        let alpha = self.config.alpha;
        let gamma = self.config.gamma;
        let noise_sd = self.config.noise_sd;
        let in_tier = self.population.tier_flags().to_vec();

        for (i, c) in self.population.capital_mut().iter_mut().enumerate() {
            let membership = if in_tier[i] { 1.0 } else { 0.0 };
            *c += alpha * membership + gamma * drift[i] + noise_sd * noise[i];
        }
        self.population.clamp_capital(CAPITAL_MIN, CAPITAL_MAX);
    }
}

// ============================================================================
// Run Driver
// ============================================================================

/// Run a full simulation and return the final Group B tier share
///
/// Pure function of `config`: identical inputs give identical output.
///
/// # Example
///
/// ```rust
/// use inertia_simulator_core_rs::orchestrator::{run_simulation, SimulationConfig};
///
/// let config = SimulationConfig { population_size: 100, capacity_p: 20, num_cycles: 10, ..Default::default() };
/// let share = run_simulation(config.clone()).unwrap();
/// assert_eq!(share, run_simulation(config).unwrap());
/// ```
pub fn run_simulation(config: SimulationConfig) -> Result<f64, SimulationError> {
    Ok(run_report(config)?.representation_b)
}

/// Run a full simulation and return the complete report
pub fn run_report(config: SimulationConfig) -> Result<RunReport, SimulationError> {
    let mut orchestrator = Orchestrator::new(config)?;
    Ok(orchestrator.run())
}
