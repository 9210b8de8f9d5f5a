//! Ballot chain core library
//!
//! In-memory, append-only ledger of cast votes grouped into hash-linked
//! blocks. The ledger is pure data structure code: no I/O, no locking.
//! Callers that share a [`Ledger`] across tasks must serialize access to
//! it as a whole.

pub mod block;
pub mod ledger;

// Re-export main types
pub use block::{Block, Vote, VoteError, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
pub use ledger::Ledger;
