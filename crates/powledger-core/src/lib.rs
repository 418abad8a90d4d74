//! Append-only chain of blocks, each bound to its predecessor by hash and
//! admitted only after a proof-of-work search.
//!
//! ```
//! use powledger_core::Chain;
//!
//! let mut chain = Chain::new();
//! chain.append("First Block Data");
//! chain.append("Second Block Data");
//! assert_eq!(chain.len(), 3);
//! assert!(chain.tip().hash().starts_with("00"));
//! assert!(chain.is_valid());
//! ```

pub mod block;
pub mod chain;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod pow;

pub use block::Block;
pub use chain::{genesis_block, Chain};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ChainConfig, MiningStrategy};
pub use error::{ConfigError, MiningError, ValidationError};
