use thiserror::Error;

/// The first integrity failure found while auditing a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("block #{index} is not valid: stored hash {stored} does not match recomputed {computed}")]
    HashMismatch {
        index: u64,
        stored: String,
        computed: String,
    },
    #[error("block #{index} has invalid previous hash: expected {expected}, found {found}")]
    LinkMismatch {
        index: u64,
        expected: String,
        found: String,
    },
}

impl ValidationError {
    /// Index of the offending block.
    pub fn index(&self) -> u64 {
        match self {
            ValidationError::HashMismatch { index, .. } => *index,
            ValidationError::LinkMismatch { index, .. } => *index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiningError {
    #[error("no nonce for block #{index} met difficulty {difficulty} within {attempts} attempts")]
    AttemptsExhausted {
        index: u64,
        difficulty: usize,
        attempts: u64,
    },
    #[error("difficulty {difficulty} exceeds the {max}-character digest")]
    DifficultyTooHigh { difficulty: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("difficulty {difficulty} exceeds the {max}-character digest")]
    DifficultyTooHigh { difficulty: usize, max: usize },
    #[error("max_attempts must be at least 1 when set")]
    ZeroMaxAttempts,
}
