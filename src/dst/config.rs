//! SimConfig - Simulation Configuration
//!
//! TigerStyle: Seed management for deterministic testing.

use rand::Rng;
use std::env;

use crate::constants::DST_SEED_ENV;

/// Configuration for a simulated backend.
///
/// TigerStyle:
/// - Immutable after creation
/// - Seed logged for reproducibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Random seed for deterministic execution
    seed: u64,
}

impl SimConfig {
    /// Create config with explicit seed.
    ///
    /// # Example
    /// ```
    /// use flowstore::dst::SimConfig;
    /// let config = SimConfig::with_seed(12345);
    /// assert_eq!(config.seed(), 12345);
    /// ```
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Create config from `DST_SEED` env var or random.
    ///
    /// A generated seed is logged so the run can be replayed.
    ///
    /// # Panics
    /// Panics if `DST_SEED` is set but is not a valid u64.
    #[must_use]
    pub fn from_env_or_random() -> Self {
        let seed = match env::var(DST_SEED_ENV) {
            Ok(seed_str) => seed_str.parse::<u64>().unwrap_or_else(|_| {
                panic!("{DST_SEED_ENV} must be a valid u64, got: {seed_str}");
            }),
            Err(_) => {
                let seed = rand::thread_rng().gen::<u64>();
                tracing::info!(seed, "DST: generated random seed (replay with {DST_SEED_ENV}={seed})");
                seed
            }
        };

        Self::with_seed(seed)
    }

    /// Get the seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::with_seed(0)
    }
}
