use std::fmt::Write;

use chrono::DateTime;
use powledger_core::{Block, Chain, Clock, ValidationError};

/// `ctime`-style UTC rendering, falling back to raw seconds when out of range.
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%a %b %e %H:%M:%S %Y").to_string())
        .unwrap_or_else(|| secs.to_string())
}

pub fn render_block(block: &Block) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "Block #{}", block.index());
    let _ = writeln!(out, "Timestamp: {}", format_timestamp(block.timestamp()));
    let _ = writeln!(out, "Data: {}", block.payload());
    let _ = writeln!(out, "Previous Hash: {}", block.previous_hash());
    let _ = writeln!(out, "Hash: {}", block.hash());
    let _ = writeln!(out, "Nonce: {}", block.nonce());
    out
}

pub fn render_chain<C: Clock>(chain: &Chain<C>) -> String {
    chain
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn validity_line(result: &Result<(), ValidationError>) -> String {
    match result {
        Ok(()) => "Blockchain is valid.".to_string(),
        Err(err) => format!("Blockchain is not valid: {err}"),
    }
}
