use tracing::{debug, warn};

use crate::block::Block;
use crate::clock::{Clock, SystemClock};
use crate::config::{ChainConfig, MiningStrategy};
use crate::error::{ConfigError, MiningError, ValidationError};

/// Append-only sequence of mined blocks, seeded with a genesis block.
///
/// Appending needs `&mut self`, so there is exactly one writer at a time and a
/// block only becomes visible once it has been mined.
#[derive(Clone, Debug)]
pub struct Chain<C: Clock = SystemClock> {
    blocks: Vec<Block>,
    config: ChainConfig,
    clock: C,
}

impl Chain<SystemClock> {
    /// Default configuration (difficulty 2) on the wall clock.
    pub fn new() -> Self {
        Self::build(ChainConfig::default(), SystemClock)
    }

    pub fn with_config(config: ChainConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for Chain<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Chain<C> {
    pub fn with_clock(config: ChainConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: ChainConfig, clock: C) -> Self {
        let genesis = genesis_block(&config, &clock);
        debug!(hash = %genesis.hash(), "created genesis block");
        Self {
            blocks: vec![genesis],
            config,
            clock,
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn difficulty(&self) -> usize {
        self.config.difficulty
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    /// The most recently appended block (genesis on a fresh chain).
    pub fn tip(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: a chain holds at least its genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Unmined block linked to the current tip.
    fn candidate(&self, payload: String) -> Block {
        Block::with_clock(
            self.blocks.len() as u64,
            payload,
            self.tip().compute_hash(),
            &self.clock,
        )
    }

    fn push(&mut self, block: Block) -> &Block {
        debug!(index = block.index(), nonce = block.nonce(), "appending block");
        let position = self.blocks.len();
        self.blocks.push(block);
        &self.blocks[position]
    }

    /// Mine `payload` into a new block on top of the tip. Never fails; mining
    /// runs until a qualifying nonce turns up.
    pub fn append(&mut self, payload: impl Into<String>) -> &Block {
        let mut block = self.candidate(payload.into());
        let difficulty = self.config.difficulty;
        match self.config.strategy {
            MiningStrategy::Sequential => block.mine(difficulty),
            MiningStrategy::Parallel => block.mine_parallel(difficulty),
        };
        self.push(block)
    }

    /// [`Chain::append`] under the configured `max_attempts` ceiling. Bounded
    /// mining is sequential. On error nothing is appended.
    pub fn try_append(&mut self, payload: impl Into<String>) -> Result<&Block, MiningError> {
        let Some(max_attempts) = self.config.max_attempts else {
            return Ok(self.append(payload));
        };
        let mut block = self.candidate(payload.into());
        block.mine_bounded(self.config.difficulty, max_attempts)?;
        Ok(self.push(block))
    }

    /// Audit every block after genesis: its stored hash must match a fresh
    /// recomputation, then its `previous_hash` must equal the predecessor's
    /// stored hash. Stops at the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (offset, pair) in self.blocks.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let index = offset as u64 + 1;

            let computed = current.compute_hash();
            if computed != current.hash() {
                return Err(ValidationError::HashMismatch {
                    index,
                    stored: current.hash().to_string(),
                    computed,
                });
            }

            if current.previous_hash() != previous.hash() {
                return Err(ValidationError::LinkMismatch {
                    index,
                    expected: previous.hash().to_string(),
                    found: current.previous_hash().to_string(),
                });
            }
        }
        Ok(())
    }

    /// [`Chain::validate`] as a yes/no answer. The failure, if any, is
    /// reported as a warning.
    pub fn is_valid(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(err) => {
                warn!(index = err.index(), "{err}");
                false
            }
        }
    }
}

impl<'a, C: Clock> IntoIterator for &'a Chain<C> {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// Index 0, the configured genesis payload, linked to the root sentinel.
/// Not mined: its hash is accepted whatever the difficulty.
pub fn genesis_block<C: Clock>(config: &ChainConfig, clock: &C) -> Block {
    Block::with_clock(0, config.genesis_payload.clone(), config.root_hash.clone(), clock)
}
