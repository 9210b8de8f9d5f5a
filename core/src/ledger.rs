//! The append-only ledger: sealed blocks plus the pending-vote buffer

use std::collections::BTreeMap;

use log::debug;

use crate::block::{Block, Vote};

/// Ordered sequence of hash-linked blocks plus the buffer of votes not yet
/// sealed into one.
///
/// Both sequences only ever grow (the buffer is drained into a block, never
/// dropped). The chain always holds at least the genesis block.
#[derive(Debug, Clone)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Vote>,
}

impl Ledger {
    /// Fresh ledger: genesis block, empty vote buffer.
    pub fn new() -> Self {
        Self {
            chain: vec![Block::genesis()],
            pending: Vec::new(),
        }
    }

    /// Queue a vote for the next block. Returns the index the vote will
    /// receive once that block is sealed.
    ///
    /// No duplicate detection happens here; whether this voter already
    /// voted is the identity store's decision, made before calling in.
    pub fn submit_vote(&mut self, vote: Vote) -> u64 {
        self.pending.push(vote);
        self.chain.len() as u64 + 1
    }

    /// Seal the pending votes into a new block linked to the current tip,
    /// append it, and empty the buffer. Returns a copy of the new block.
    ///
    /// `proof` is recorded as-is; no verification is performed. Sealing
    /// with an empty buffer produces an empty block, which is permitted;
    /// callers that consider empty blocks undesirable must check first.
    pub fn seal_block(&mut self, proof: u64) -> Block {
        let previous_hash = self.last_block().hash();
        let block = Block::next(
            self.chain.len() as u64 + 1,
            std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        );
        debug!(
            "sealed block {} with {} vote(s)",
            block.index,
            block.votes.len()
        );
        self.chain.push(block.clone());
        block
    }

    /// The most recently sealed block.
    pub fn last_block(&self) -> &Block {
        self.chain.last().expect("chain holds at least the genesis block")
    }

    /// Full ordered block sequence, genesis first.
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Votes submitted but not yet sealed, in submission order.
    pub fn pending(&self) -> &[Vote] {
        &self.pending
    }

    /// Per-candidate vote counts over all sealed blocks. Pending votes are
    /// not counted.
    pub fn tally(&self) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        for block in &self.chain {
            for vote in &block.votes {
                *counts.entry(vote.candidate_id.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Check hash linkage from the second block onward: every block's
    /// `previous_hash` must equal the recomputed hash of its predecessor.
    ///
    /// This is deliberately narrow: proof values, index monotonicity and
    /// vote contents are not checked. A single-block chain is valid; an
    /// empty slice is not a chain at all and yields `false`.
    pub fn is_chain_valid(chain: &[Block]) -> bool {
        let Some(first) = chain.first() else {
            debug!("validation requested for an empty chain");
            return false;
        };
        let mut previous = first;
        for block in &chain[1..] {
            if block.previous_hash != previous.hash() {
                debug!("hash linkage broken at block {}", block.index);
                return false;
            }
            previous = block;
        }
        true
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF};

    fn vote(fp: &str, candidate: &str) -> Vote {
        Vote::new(fp, candidate).unwrap()
    }

    #[test]
    fn sealing_snapshots_pending_in_submission_order() {
        let mut ledger = Ledger::new();
        let votes = vec![vote("a", "c1"), vote("b", "c2"), vote("c", "c1")];
        for v in &votes {
            assert_eq!(ledger.submit_vote(v.clone()), 2);
        }
        assert_eq!(ledger.pending().len(), 3);

        let block = ledger.seal_block(101);
        assert_eq!(block.index, 2);
        assert_eq!(block.votes, votes);
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn sealing_twice_produces_an_empty_second_block() {
        let mut ledger = Ledger::new();
        ledger.submit_vote(vote("a", "c1"));
        ledger.seal_block(101);
        let empty = ledger.seal_block(102);
        assert_eq!(empty.index, 3);
        assert!(empty.votes.is_empty());
    }

    #[test]
    fn submit_vote_returns_the_next_block_index() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.submit_vote(vote("a", "c1")), 2);
        ledger.seal_block(101);
        assert_eq!(ledger.submit_vote(vote("b", "c1")), 3);
    }

    #[test]
    fn chains_grown_through_sealing_validate() {
        let mut ledger = Ledger::new();
        assert!(Ledger::is_chain_valid(ledger.chain()));
        for i in 0..5 {
            ledger.submit_vote(vote(&format!("voter-{i}"), "c1"));
            ledger.seal_block(101 + i);
            assert!(Ledger::is_chain_valid(ledger.chain()));
        }
        assert_eq!(ledger.chain().len(), 6);
    }

    #[test]
    fn indexes_are_one_based_and_contiguous() {
        let mut ledger = Ledger::new();
        for i in 0..4 {
            ledger.seal_block(101 + i);
        }
        for (i, block) in ledger.chain().iter().enumerate() {
            assert_eq!(block.index, i as u64 + 1);
        }
    }

    #[test]
    fn returned_blocks_are_detached_copies() {
        let mut ledger = Ledger::new();
        ledger.submit_vote(vote("a", "c1"));
        let mut sealed = ledger.seal_block(101);
        sealed.votes.push(vote("intruder", "c2"));
        sealed.proof = 9999;

        assert_eq!(ledger.last_block().votes.len(), 1);
        assert_eq!(ledger.last_block().proof, 101);
        assert!(Ledger::is_chain_valid(ledger.chain()));
    }

    #[test]
    fn tampering_with_a_copy_breaks_validation_of_the_copy() {
        let mut ledger = Ledger::new();
        ledger.submit_vote(vote("a", "c1"));
        ledger.seal_block(101);
        ledger.submit_vote(vote("b", "c2"));
        ledger.seal_block(102);
        assert_eq!(ledger.chain().len(), 3);

        let mut copy = ledger.chain().to_vec();
        copy[1].votes[0].candidate_id = "c2".to_string();
        assert!(!Ledger::is_chain_valid(&copy));
        // The ledger's own chain is untouched.
        assert!(Ledger::is_chain_valid(ledger.chain()));
    }

    #[test]
    fn empty_slice_is_not_a_valid_chain() {
        assert!(!Ledger::is_chain_valid(&[]));
    }

    #[test]
    fn tally_counts_sealed_votes_only() {
        let mut ledger = Ledger::new();
        ledger.submit_vote(vote("a", "c1"));
        ledger.submit_vote(vote("b", "c1"));
        ledger.submit_vote(vote("c", "c2"));
        ledger.seal_block(101);
        ledger.submit_vote(vote("d", "c3"));

        let counts = ledger.tally();
        assert_eq!(counts.get("c1"), Some(&2));
        assert_eq!(counts.get("c2"), Some(&1));
        assert_eq!(counts.get("c3"), None);
    }

    #[test]
    fn genesis_vote_seal_end_to_end() {
        let mut ledger = Ledger::new();
        let genesis = ledger.last_block().clone();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert_eq!(genesis.proof, GENESIS_PROOF);
        assert!(genesis.votes.is_empty());

        let v = vote("abc", "c1");
        assert_eq!(ledger.submit_vote(v.clone()), 2);

        let block = ledger.seal_block(101);
        assert_eq!(block.index, 2);
        assert_eq!(block.votes, vec![v]);
        assert_eq!(block.previous_hash, genesis.hash());
        assert!(ledger.pending().is_empty());
    }
}
