//! Vote and block value types for the ballot chain

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Sentinel `previous_hash` carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Proof value carried by the genesis block.
pub const GENESIS_PROOF: u64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoteError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// A single cast vote.
///
/// `voter_fingerprint` is a one-way hash of the voter's identifier, never
/// the raw identifier. A deterministic digest of a known voter id can be
/// reversed by dictionary attack, so fingerprints are pseudonymous, not
/// anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter_fingerprint: String,
    pub candidate_id: String,
}

impl Vote {
    pub fn new(
        voter_fingerprint: impl Into<String>,
        candidate_id: impl Into<String>,
    ) -> Result<Self, VoteError> {
        let voter_fingerprint = voter_fingerprint.into();
        let candidate_id = candidate_id.into();
        if voter_fingerprint.is_empty() {
            return Err(VoteError::EmptyField("voter_fingerprint"));
        }
        if candidate_id.is_empty() {
            return Err(VoteError::EmptyField("candidate_id"));
        }
        Ok(Self {
            voter_fingerprint,
            candidate_id,
        })
    }
}

/// An immutable snapshot of votes plus linkage metadata.
///
/// Blocks are constructed once and appended whole; nothing mutates a block
/// after it enters a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain, contiguous.
    pub index: u64,
    /// Seconds since the Unix epoch, millisecond precision.
    pub timestamp: f64,
    /// Votes sealed into this block, in submission order.
    pub votes: Vec<Vote>,
    /// Caller-supplied placeholder; never verified against any target.
    pub proof: u64,
    /// Hash of the preceding block, or `"1"` for genesis.
    pub previous_hash: String,
}

impl Block {
    /// First block of every chain: `index = 1`, no votes, `proof = 100`,
    /// `previous_hash = "1"`.
    pub fn genesis() -> Self {
        Self {
            index: 1,
            timestamp: now_epoch(),
            votes: Vec::new(),
            proof: GENESIS_PROOF,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        }
    }

    /// Build the block that extends a chain of `index - 1` blocks.
    pub fn next(index: u64, votes: Vec<Vote>, proof: u64, previous_hash: String) -> Self {
        Self {
            index,
            timestamp: now_epoch(),
            votes,
            proof,
            previous_hash,
        }
    }

    /// Canonical encoding used for hashing: compact JSON with keys in
    /// lexicographic order at every level, UTF-8, no whitespace.
    ///
    /// `serde_json` stores object members in a sorted map, so routing the
    /// block through [`serde_json::Value`] gives a stable byte sequence
    /// regardless of field declaration order. This encoding is the only
    /// bit-exact compatibility surface of the chain; changing it breaks
    /// validation of every previously produced chain.
    pub fn canonical_json(&self) -> String {
        serde_json::json!({
            "index": self.index,
            "previous_hash": &self.previous_hash,
            "proof": self.proof,
            "timestamp": self.timestamp,
            "votes": &self.votes,
        })
        .to_string()
    }

    /// SHA-256 of the canonical encoding, lowercase hex.
    pub fn hash(&self) -> String {
        hex::encode(Sha256::digest(self.canonical_json().as_bytes()))
    }
}

fn now_epoch() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Block {
        Block {
            index: 2,
            timestamp: 1700000000.5,
            votes: vec![Vote::new("fp", "c1").unwrap()],
            proof: 101,
            previous_hash: "abc".to_string(),
        }
    }

    #[test]
    fn genesis_block_shape() {
        let genesis = Block::genesis();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.proof, GENESIS_PROOF);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert!(genesis.votes.is_empty());
        assert!(genesis.timestamp > 0.0);
    }

    #[test]
    fn vote_rejects_empty_fields() {
        assert_eq!(
            Vote::new("", "c1"),
            Err(VoteError::EmptyField("voter_fingerprint"))
        );
        assert_eq!(
            Vote::new("fp", ""),
            Err(VoteError::EmptyField("candidate_id"))
        );
        assert!(Vote::new("fp", "c1").is_ok());
    }

    #[test]
    fn canonical_json_is_compact_and_key_sorted() {
        let block = sample_block();
        assert_eq!(
            block.canonical_json(),
            r#"{"index":2,"previous_hash":"abc","proof":101,"timestamp":1700000000.5,"votes":[{"candidate_id":"c1","voter_fingerprint":"fp"}]}"#
        );
    }

    #[test]
    fn hash_is_deterministic() {
        let block = sample_block();
        assert_eq!(block.hash(), block.hash());
        assert_eq!(block.hash(), block.clone().hash());
    }

    #[test]
    fn hash_ignores_source_key_order() {
        // Same logical block arriving with shuffled keys hashes identically.
        let shuffled: Block = serde_json::from_str(
            r#"{"votes":[{"voter_fingerprint":"fp","candidate_id":"c1"}],"proof":101,"previous_hash":"abc","index":2,"timestamp":1700000000.5}"#,
        )
        .unwrap();
        assert_eq!(shuffled.hash(), sample_block().hash());
    }

    #[test]
    fn hash_changes_with_content() {
        let block = sample_block();
        let mut tampered = block.clone();
        tampered.votes[0].candidate_id = "c2".to_string();
        assert_ne!(block.hash(), tampered.hash());

        let mut reproofed = block.clone();
        reproofed.proof += 1;
        assert_ne!(block.hash(), reproofed.hash());
    }
}
