//! Configuration types for rounds and tournaments
//!
//! Level 4 - Utilities and configuration

use std::time::Duration;

use bracket_core::{validate_batch_size, BracketError, Result};

/// Pairs per oracle call when the caller does not say otherwise
pub const DEFAULT_BATCH_SIZE: usize = 4;

/// Role the oracle judges candidates for when none is given
pub const DEFAULT_ROLE: &str = "software engineering";

/// Settings for a single round
#[derive(Clone, Debug, PartialEq)]
pub struct RoundConfig {
    /// Pairs per oracle call (must be even)
    pub batch_size: usize,
    /// Role context handed to the oracle
    pub role: String,
    /// Maximum batches judged at once (1 = sequential)
    pub max_concurrency: usize,
    /// Pause between consecutive batches when running sequentially
    pub batch_delay: Duration,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            role: DEFAULT_ROLE.to_string(),
            max_concurrency: 1,
            batch_delay: Duration::ZERO,
        }
    }
}

impl RoundConfig {
    /// Set batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set role context
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Set concurrency limit
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set delay between sequential batches
    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }

    /// Reject settings no round could run with
    pub fn validate(&self) -> Result<()> {
        validate_batch_size(self.batch_size)?;
        if self.max_concurrency == 0 {
            return Err(BracketError::InvalidConfiguration(
                "max concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tournament configuration
#[derive(Clone, Debug, PartialEq)]
pub struct TournamentConfig {
    /// Settings applied to every round
    pub round: RoundConfig,
    /// Shuffle the initial items before round 1
    pub shuffle: bool,
    /// Random seed for shuffling and fallback picks (None = entropy)
    pub seed: Option<u64>,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            round: RoundConfig::default(),
            shuffle: true,
            seed: None,
        }
    }
}

impl TournamentConfig {
    /// Create config with the given round settings
    pub fn new(round: RoundConfig) -> Self {
        Self {
            round,
            ..Default::default()
        }
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable the initial shuffle
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.round.validate()
    }
}
