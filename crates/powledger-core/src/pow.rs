use sha2::{Digest, Sha256};

/// SHA-256 of `bytes`, rendered as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Number of leading `'0'` characters in a hex digest.
pub fn leading_zero_digits(hash: &str) -> usize {
    hash.bytes().take_while(|b| *b == b'0').count()
}

/// True when the first `difficulty` characters of `hash` are all `'0'`.
/// A hash shorter than `difficulty` never qualifies.
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    hash.len() >= difficulty && hash.as_bytes()[..difficulty].iter().all(|b| *b == b'0')
}

/// Leading zero bits of a hex digest, scanned nibble by nibble.
/// Non-hex characters end the scan.
pub fn leading_zero_bits(hash: &str) -> u32 {
    let mut bits = 0u32;
    for b in hash.bytes() {
        let v = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => 10 + (b - b'a'),
            b'A'..=b'F' => 10 + (b - b'A'),
            _ => break,
        };
        if v == 0 {
            bits += 4;
        } else {
            bits += v.leading_zeros() - 4;
            break;
        }
    }
    bits
}
