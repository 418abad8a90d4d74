pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const DEFAULT_DIFFICULTY: usize = 2;
pub const GENESIS_PAYLOAD: &str = "Genesis Block";
pub const ROOT_HASH: &str = "0";
/// Nonces handed to the thread pool per round of parallel mining.
pub const NONCES_PER_BATCH: u64 = 4096;
