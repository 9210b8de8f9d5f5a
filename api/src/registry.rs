//! In-memory voter records keyed by voter id
//!
//! This is the identity store the ledger relies on for the
//! one-voter-one-vote gate: the ledger itself never checks for duplicate
//! fingerprints, so `has_voted` must be consulted and flipped here before
//! a vote reaches it.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;

/// Unsalted SHA-256 hex digest, used for stored passwords and voter
/// fingerprints alike. Deterministic, so a fingerprint of a known voter id
/// can be recovered by dictionary attack; fingerprints are pseudonymous,
/// not anonymous.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("voter id already registered")]
    DuplicateVoterId,
    #[error("unknown voter id")]
    UnknownVoter,
}

#[derive(Debug, Clone)]
pub struct Voter {
    pub name: String,
    pub voter_id: String,
    pub password_hash: String,
    pub has_voted: bool,
}

#[derive(Debug, Default)]
pub struct VoterRegistry {
    voters: HashMap<String, Voter>,
}

impl VoterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &str,
        voter_id: &str,
        password: &str,
    ) -> Result<(), RegistryError> {
        if self.voters.contains_key(voter_id) {
            return Err(RegistryError::DuplicateVoterId);
        }
        self.voters.insert(
            voter_id.to_string(),
            Voter {
                name: name.to_string(),
                voter_id: voter_id.to_string(),
                password_hash: sha256_hex(password),
                has_voted: false,
            },
        );
        Ok(())
    }

    pub fn verify_password(&self, voter_id: &str, password: &str) -> bool {
        self.voters
            .get(voter_id)
            .is_some_and(|v| v.password_hash == sha256_hex(password))
    }

    pub fn lookup(&self, voter_id: &str) -> Option<&Voter> {
        self.voters.get(voter_id)
    }

    pub fn mark_voted(&mut self, voter_id: &str) -> Result<(), RegistryError> {
        let voter = self
            .voters
            .get_mut(voter_id)
            .ok_or(RegistryError::UnknownVoter)?;
        voter.has_voted = true;
        Ok(())
    }
}
