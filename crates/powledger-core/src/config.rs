use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIFFICULTY, GENESIS_PAYLOAD, HASH_HEX_SIZE, ROOT_HASH};
use crate::error::ConfigError;

/// How `Chain::append` searches for a nonce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MiningStrategy {
    #[default]
    Sequential,
    Parallel,
}

/// Parameters fixed for the lifetime of a chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Leading `'0'` hex characters required of every mined hash.
    pub difficulty: usize,
    pub genesis_payload: String,
    /// `previous_hash` of the genesis block.
    pub root_hash: String,
    /// Ceiling for `Chain::try_append`. `None` mines without bound.
    pub max_attempts: Option<u64>,
    pub strategy: MiningStrategy,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            genesis_payload: GENESIS_PAYLOAD.to_string(),
            root_hash: ROOT_HASH.to_string(),
            max_attempts: None,
            strategy: MiningStrategy::Sequential,
        }
    }
}

impl ChainConfig {
    pub fn with_difficulty(mut self, difficulty: usize) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_strategy(mut self, strategy: MiningStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.difficulty > HASH_HEX_SIZE {
            return Err(ConfigError::DifficultyTooHigh {
                difficulty: self.difficulty,
                max: HASH_HEX_SIZE,
            });
        }
        if self.max_attempts == Some(0) {
            return Err(ConfigError::ZeroMaxAttempts);
        }
        Ok(())
    }
}
