use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::clock::Clock;
use crate::constants::{HASH_HEX_SIZE, NONCES_PER_BATCH};
use crate::error::MiningError;
use crate::pow::{meets_difficulty, sha256_hex};

/// One record of the chain, identified by the hash of its own fields.
///
/// Fields are private: once a block is mined the only way to change it is to
/// build a new one, and the chain only hands out shared references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Block {
    pub(crate) index: u64,
    pub(crate) payload: String,
    pub(crate) previous_hash: String,
    pub(crate) timestamp: u64,
    pub(crate) nonce: u64,
    pub(crate) hash: String,
}

impl Block {
    pub fn new(
        index: u64,
        payload: impl Into<String>,
        previous_hash: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        let mut block = Self {
            index,
            payload: payload.into(),
            previous_hash: previous_hash.into(),
            timestamp,
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Like [`Block::new`], stamping the block with `clock.now()`.
    pub fn with_clock<C: Clock>(
        index: u64,
        payload: impl Into<String>,
        previous_hash: impl Into<String>,
        clock: &C,
    ) -> Self {
        Self::new(index, payload, previous_hash, clock.now())
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The cached content hash: the last value computed at construction or
    /// while mining.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Bytes fed to SHA-256. Variable-length fields carry a u64 length prefix
    /// so distinct field values never encode to the same bytes.
    pub fn hash_bytes(&self) -> Vec<u8> {
        self.encode_with_nonce(self.nonce)
    }

    fn encode_with_nonce(&self, nonce: u64) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(8 * 5 + self.previous_hash.len() + self.payload.len());
        bytes.extend_from_slice(&self.index.to_le_bytes());
        bytes.extend_from_slice(&(self.previous_hash.len() as u64).to_le_bytes());
        bytes.extend_from_slice(self.previous_hash.as_bytes());
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        bytes.extend_from_slice(&(self.payload.len() as u64).to_le_bytes());
        bytes.extend_from_slice(self.payload.as_bytes());
        bytes.extend_from_slice(&nonce.to_le_bytes());
        bytes
    }

    /// Recompute the hash from the current fields. Does not touch the cache.
    pub fn compute_hash(&self) -> String {
        sha256_hex(&self.hash_bytes())
    }

    fn hash_with_nonce(&self, nonce: u64) -> String {
        sha256_hex(&self.encode_with_nonce(nonce))
    }

    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        meets_difficulty(&self.hash, difficulty)
    }

    /// Increment the nonce until the hash starts with `difficulty` zeros.
    /// Returns the number of hashes tried; 0 if the current hash already
    /// qualifies.
    ///
    /// There is no upper bound. A difficulty above the digest width never
    /// returns; use [`Block::mine_bounded`] when that matters.
    pub fn mine(&mut self, difficulty: usize) -> u64 {
        let mut attempts = 0u64;
        while !self.meets_difficulty(difficulty) {
            self.nonce = self.nonce.wrapping_add(1);
            self.hash = self.compute_hash();
            attempts += 1;
        }
        self.log_mined(attempts);
        attempts
    }

    /// [`Block::mine`] with a ceiling of `max_attempts` hashes. On failure the
    /// nonce and hash stay at the last value tried.
    pub fn mine_bounded(&mut self, difficulty: usize, max_attempts: u64) -> Result<u64, MiningError> {
        if difficulty > HASH_HEX_SIZE {
            return Err(MiningError::DifficultyTooHigh {
                difficulty,
                max: HASH_HEX_SIZE,
            });
        }
        let mut attempts = 0u64;
        while !self.meets_difficulty(difficulty) {
            if attempts == max_attempts {
                return Err(MiningError::AttemptsExhausted {
                    index: self.index,
                    difficulty,
                    attempts,
                });
            }
            self.nonce = self.nonce.wrapping_add(1);
            self.hash = self.compute_hash();
            attempts += 1;
        }
        self.log_mined(attempts);
        Ok(attempts)
    }

    /// Search nonces on the rayon pool, one batch at a time. Within a batch
    /// the lowest qualifying nonce wins, so the result is the same nonce
    /// [`Block::mine`] would find.
    pub fn mine_parallel(&mut self, difficulty: usize) -> u64 {
        if self.meets_difficulty(difficulty) {
            self.log_mined(0);
            return 0;
        }
        let start = self.nonce;
        let mut batch_start = start.wrapping_add(1);
        let (nonce, hash) = loop {
            let batch_end = batch_start.saturating_add(NONCES_PER_BATCH);
            let template = &*self;
            let found = (batch_start..batch_end)
                .into_par_iter()
                .map(|nonce| (nonce, template.hash_with_nonce(nonce)))
                .find_first(|(_, hash)| meets_difficulty(hash, difficulty));
            if let Some(hit) = found {
                break hit;
            }
            batch_start = batch_end;
        };
        self.nonce = nonce;
        self.hash = hash;
        let attempts = nonce.wrapping_sub(start);
        self.log_mined(attempts);
        attempts
    }

    fn log_mined(&self, attempts: u64) {
        info!(
            index = self.index,
            nonce = self.nonce,
            attempts,
            "Mined block {} with hash {}",
            self.index,
            self.hash
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    const TS: u64 = 1_600_000_000;
    const GENESIS_HASH: &str = "7d612413b7f8ba7f73e360634374a06a65a52b410e32d787464f9bbd31062d56";

    fn first_block() -> Block {
        Block::new(1, "First Block Data", GENESIS_HASH, TS)
    }

    #[test]
    fn block_new_example() {
        let block = first_block();
        assert_eq!(block.index(), 1);
        assert_eq!(block.payload(), "First Block Data");
        assert_eq!(block.previous_hash(), GENESIS_HASH);
        assert_eq!(block.timestamp(), TS);
        assert_eq!(block.nonce(), 0);
        assert_eq!(block.hash(), block.compute_hash());
    }

    #[test]
    fn block_hash_example() {
        let genesis = Block::new(0, "Genesis Block", "0", TS);
        assert_eq!(genesis.hash(), GENESIS_HASH);
        assert_eq!(
            first_block().hash(),
            "3db064c50aaa16e0519d095fffa9dc4e482fcef7b25ce572f6161a7ccd90c593"
        );
    }

    #[test]
    fn with_clock_uses_clock_time() {
        let block = Block::with_clock(1, "First Block Data", GENESIS_HASH, &FixedClock(TS));
        assert_eq!(block, first_block());
    }

    #[test]
    fn block_hash_consistency() {
        let block = first_block();
        assert_eq!(block.compute_hash(), block.compute_hash());
    }

    #[test]
    fn hash_bytes_layout() {
        let block = Block::new(7, "ab", "0", 42);
        let bytes = block.hash_bytes();
        assert_eq!(bytes.len(), 8 + 8 + 1 + 8 + 8 + 2 + 8);
        assert_eq!(&bytes[0..8], &7u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &1u64.to_le_bytes());
        assert_eq!(bytes[16], b'0');
        assert_eq!(&bytes[17..25], &42u64.to_le_bytes());
        assert_eq!(&bytes[25..33], &2u64.to_le_bytes());
        assert_eq!(&bytes[33..35], b"ab");
        assert_eq!(&bytes[35..43], &0u64.to_le_bytes());
    }

    #[test]
    fn length_prefix_separates_fields() {
        // Without the prefixes these two would hash the same concatenation.
        let a = Block::new(1, "bc", "a", TS);
        let b = Block::new(1, "c", "ab", TS);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn block_hash_changes_with_nonce() {
        let mut block = first_block();
        let before = block.compute_hash();
        block.nonce += 1;
        assert_ne!(before, block.compute_hash());
    }

    #[test]
    fn mine_block_example() {
        let mut block = first_block();
        let attempts = block.mine(2);
        assert_eq!(block.nonce(), 425);
        assert_eq!(attempts, 425);
        assert_eq!(
            block.hash(),
            "00d3f01a503713de69808d4049a147bb5ac436dcd60eb61be2ae378163aa13a4"
        );
        assert!(block.hash().starts_with("00"));
        assert_eq!(block.hash(), block.compute_hash());
    }

    #[test]
    fn mine_difficulty_three() {
        let mut block = first_block();
        block.mine(3);
        assert_eq!(block.nonce(), 15537);
        assert!(block.hash().starts_with("000"));
    }

    #[test]
    fn mine_zero_difficulty_keeps_nonce() {
        let mut block = first_block();
        let hash = block.hash().to_string();
        assert_eq!(block.mine(0), 0);
        assert_eq!(block.nonce(), 0);
        assert_eq!(block.hash(), hash);
    }

    #[test]
    fn mine_only_touches_nonce_and_hash() {
        let mut block = first_block();
        block.mine(2);
        assert_eq!(block.index(), 1);
        assert_eq!(block.payload(), "First Block Data");
        assert_eq!(block.previous_hash(), GENESIS_HASH);
        assert_eq!(block.timestamp(), TS);
    }

    #[test]
    fn mining_twice_is_a_no_op() {
        let mut block = first_block();
        block.mine(2);
        let mined = block.clone();
        assert_eq!(block.mine(2), 0);
        assert_eq!(block, mined);
    }

    #[test]
    fn mine_bounded_succeeds_within_budget() {
        let mut block = first_block();
        assert_eq!(block.mine_bounded(2, 425), Ok(425));
        assert_eq!(block.nonce(), 425);
    }

    #[test]
    fn mine_bounded_exhausts_budget() {
        let mut block = first_block();
        let err = block.mine_bounded(2, 424).unwrap_err();
        assert_eq!(
            err,
            MiningError::AttemptsExhausted {
                index: 1,
                difficulty: 2,
                attempts: 424
            }
        );
        assert_eq!(block.nonce(), 424);
        assert_eq!(block.hash(), block.compute_hash());
    }

    #[test]
    fn mine_bounded_rejects_impossible_difficulty() {
        let mut block = first_block();
        assert_eq!(
            block.mine_bounded(65, 1_000),
            Err(MiningError::DifficultyTooHigh {
                difficulty: 65,
                max: 64
            })
        );
        assert_eq!(block.nonce(), 0);
    }

    #[test]
    fn parallel_mining_matches_sequential() {
        let mut sequential = first_block();
        let mut parallel = first_block();
        let a = sequential.mine(3);
        let b = parallel.mine_parallel(3);
        assert_eq!(a, b);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn parallel_mining_zero_difficulty() {
        let mut block = first_block();
        assert_eq!(block.mine_parallel(0), 0);
        assert_eq!(block.nonce(), 0);
    }

    #[test]
    fn block_serialization_example() {
        let block = first_block();
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["index"], 1);
        assert_eq!(json["payload"], "First Block Data");
        assert_eq!(json["previous_hash"], GENESIS_HASH);
        assert_eq!(json["timestamp"], TS);
        assert_eq!(json["nonce"], 0);
        assert_eq!(json["hash"], block.hash());
    }
}
