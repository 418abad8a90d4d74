#![allow(dead_code)]

use powledger_core::{Chain, ChainConfig, FixedClock};
use rand::{distributions::Alphanumeric, rngs::StdRng, Rng, SeedableRng};

pub const TIMESTAMP: u64 = 1_600_000_000;

pub fn fixed_chain(config: ChainConfig) -> Chain<FixedClock> {
    Chain::with_clock(config, FixedClock(TIMESTAMP)).expect("valid config")
}

/// Reproducible random payloads, `count` of them, up to 64 characters each.
pub fn random_payloads(seed: u64, count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let len = rng.gen_range(0..64);
            (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect()
        })
        .collect()
}
