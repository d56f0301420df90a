//! Checkpoint - Population Snapshots and Config Hashing
//!
//! Captures the complete mutable state of a run at a cycle boundary so two
//! runs can be compared state-for-state. Snapshots are in-memory values;
//! nothing here touches the filesystem.
//!
//! # Critical Invariants
//!
//! - **Determinism**: Same seed + config produces identical snapshots at every cycle
//! - **Fixed Size**: All attribute vectors share one length
//! - **Bounded Capital**: Every capital value lies in [CAPITAL_MIN, CAPITAL_MAX]

use crate::models::{Population, CAPITAL_MAX, CAPITAL_MIN};
use crate::orchestrator::SimulationError;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Population and RNG state at a cycle boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    /// Cycles executed when the snapshot was taken
    pub cycle: usize,

    /// RNG state at time of snapshot (CRITICAL for determinism)
    pub rng_state: u64,

    /// Group B membership per agent
    pub group_b: Vec<bool>,

    /// Tier membership per agent
    pub in_tier: Vec<bool>,

    /// Capital per agent
    pub capital: Vec<f64>,
}

impl PopulationSnapshot {
    pub fn capture(cycle: usize, population: &Population, rng: &RngManager) -> Self {
        Self {
            cycle,
            rng_state: rng.get_state(),
            group_b: population.group_flags().to_vec(),
            in_tier: population.tier_flags().to_vec(),
            capital: population.capitals().to_vec(),
        }
    }

    /// Rebuild the population this snapshot describes
    pub fn to_population(&self) -> Result<Population, SimulationError> {
        Population::from_parts(
            self.group_b.clone(),
            self.in_tier.clone(),
            self.capital.clone(),
        )
        .map_err(|e| SimulationError::StateValidationError(e.to_string()))
    }

    pub fn tier_count(&self) -> usize {
        self.in_tier.iter().filter(|&&z| z).count()
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// SHA-256 of a configuration, as lowercase hex
///
/// The value is first lowered to a `serde_json::Value` tree whose object
/// keys are re-sorted at every level, so the digest depends only on field
/// names and values. The canonical JSON is streamed straight into the hasher.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    let value = serde_json::to_value(config).map_err(hash_error)?;

    let mut hasher = Sha256::new();
    serde_json::to_writer(&mut hasher, &sorted_keys(value)).map_err(hash_error)?;
    Ok(format!("{:x}", hasher.finalize()))
}

fn sorted_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, inner)| (key, sorted_keys(inner)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted_keys).collect()),
        leaf => leaf,
    }
}

fn hash_error(e: serde_json::Error) -> SimulationError {
    SimulationError::SerializationError(format!("Config hashing failed: {}", e))
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validate snapshot integrity
///
/// Checks critical invariants:
/// - Attribute vectors agree in length
/// - Capital within bounds
/// - Tier size within `capacity + min_open` of the cycle that produced it
pub fn validate_snapshot(
    snapshot: &PopulationSnapshot,
    max_tier_size: usize,
) -> Result<(), SimulationError> {
    let n = snapshot.group_b.len();
    if snapshot.in_tier.len() != n || snapshot.capital.len() != n {
        return Err(SimulationError::StateValidationError(format!(
            "Attribute length mismatch: group_b={}, in_tier={}, capital={}",
            n,
            snapshot.in_tier.len(),
            snapshot.capital.len()
        )));
    }

    if let Some((agent, c)) = snapshot
        .capital
        .iter()
        .enumerate()
        .find(|(_, c)| !(CAPITAL_MIN..=CAPITAL_MAX).contains(*c))
    {
        return Err(SimulationError::StateValidationError(format!(
            "Capital out of bounds for agent {}: {}",
            agent, c
        )));
    }

    let tier = snapshot.tier_count();
    if tier > max_tier_size {
        return Err(SimulationError::StateValidationError(format!(
            "Tier size {} exceeds maximum {}",
            tier, max_tier_size
        )));
    }

    Ok(())
}
