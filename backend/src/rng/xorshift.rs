//! xorshift64* random number generator
//!
//! This is a fast, high-quality PRNG that is deterministic and suitable
//! for simulation purposes.
//!
//! # Algorithm
//!
//! xorshift64* is a variant of xorshift that passes TestU01's BigCrush
//! statistical tests. It uses 64-bit state and produces 64-bit output.
//! Normal draws use the Box-Muller transform (cosine branch, one normal
//! per two uniforms) so every normal consumes exactly two `next()` calls.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. This is CRITICAL for:
//! - Debugging (reproduce exact simulation)
//! - Testing (verify behavior)
//! - Research (validate results)

use serde::{Deserialize, Serialize};

/// Smallest uniform fed into `ln` by Box-Muller.
const MIN_UNIFORM: f64 = 1e-300;

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use inertia_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let range_value = rng.range(0, 100); // [0, 100)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// # Arguments
    /// * `seed` - Initial seed value (u64)
    ///
    /// # Example
    /// ```
    /// use inertia_simulator_core_rs::RngManager;
    ///
    /// let rng = RngManager::new(12345);
    /// assert_eq!(rng.get_state(), 12345);
    /// ```
    pub fn new(seed: u64) -> Self {
        // Ensure seed is never zero (xorshift requirement)
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    ///
    /// This advances the internal state and returns a random value.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    ///
    /// # Example
    /// ```
    /// use inertia_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let slot = rng.range(0, 10);
    /// assert!((0..10).contains(&slot));
    /// ```
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Get current RNG state (for snapshots/replay)
    ///
    /// A generator rebuilt with `RngManager::new(state)` continues the
    /// exact same sequence.
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    ///
    /// # Example
    /// ```
    /// use inertia_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let probability = rng.next_f64();
    /// assert!(probability >= 0.0 && probability < 1.0);
    /// ```
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Top 53 bits scaled by 2^-53
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// `true` with probability `p`
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// `n` consecutive uniform draws in [0.0, 1.0)
    pub fn uniform_vec(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.next_f64()).collect()
    }

    /// Sample from the standard normal distribution (Box-Muller transform).
    pub fn standard_normal(&mut self) -> f64 {
        let u1 = self.next_f64().max(MIN_UNIFORM);
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// `n` consecutive standard normal draws
    pub fn normal_vec(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.standard_normal()).collect()
    }

    /// Choose `m` distinct elements of `items` uniformly without replacement
    ///
    /// Runs a partial Fisher-Yates shuffle over a copy of `items` and
    /// returns the first `min(m, items.len())` slots, in draw order. Only
    /// as many `next()` calls as elements drawn are made, so `m == 0` or an
    /// empty input leaves the generator untouched.
    ///
    /// # Example
    /// ```
    /// use inertia_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// let picked = rng.choose_without_replacement(&[3, 5, 8, 13], 2);
    /// assert_eq!(picked.len(), 2);
    /// assert_ne!(picked[0], picked[1]);
    /// ```
    pub fn choose_without_replacement(&mut self, items: &[usize], m: usize) -> Vec<usize> {
        let take = m.min(items.len());
        let mut pool = items.to_vec();
        for i in 0..take {
            let j = self.range(i as i64, pool.len() as i64) as usize;
            pool.swap(i, j);
        }
        pool.truncate(take);
        pool
    }
}
