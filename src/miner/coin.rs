// src/miner/coin.rs
//! Digest evaluation
//!
//! A digest qualifies as a coin when its first character is anything
//! other than `'0'`. The test is a literal string prefix check, not a
//! leading-zero-bits difficulty target.

/// A winning digest together with the payload that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coin {
    /// Hex digest returned by the hashing service
    pub digest: String,
    /// Raw payload returned by the randomness service
    pub payload: Vec<u8>,
}

/// Outcome of evaluating one digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The digest starts with `'0'`; nothing to record
    NoCoin,
    /// The digest qualifies and must be recorded
    Coin(Coin),
}

/// Evaluates a digest produced from `payload`
pub fn evaluate(digest: &str, payload: &[u8]) -> Outcome {
    if digest.starts_with('0') {
        Outcome::NoCoin
    } else {
        Outcome::Coin(Coin {
            digest: digest.to_string(),
            payload: payload.to_vec(),
        })
    }
}

impl Coin {
    /// Payload rendered for logs
    ///
    /// Text payloads are shown as-is, binary ones as hex.
    pub fn payload_display(&self) -> String {
        match std::str::from_utf8(&self.payload) {
            Ok(text) if !text.chars().any(char::is_control) => text.to_string(),
            _ => hex::encode(&self.payload),
        }
    }
}
