//! # Replay Store
//!
//! Per-wallet two-part nonce space. A nonce `(block, index)` is accepted iff
//! its block is strictly greater than the stored block, or equal to it with
//! an index not yet consumed in that block.
//!
//! Requests that exclude the owner never touch the nonce. Each of them is
//! accepted once per sign hash.

use super::value_objects::{Hash, Nonce};
use crate::errors::RelayError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Replay state of one wallet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceRecord {
    /// Highest nonce consumed so far (zero before the first relay).
    highest: Nonce,
    /// Indices consumed in `highest.block()`.
    used_indices: BTreeSet<u128>,
    /// Sign hashes of executed requests that bypass the nonce.
    executed: BTreeSet<Hash>,
}

impl NonceRecord {
    /// Highest nonce consumed so far.
    #[must_use]
    pub fn current(&self) -> Nonce {
        self.highest
    }

    /// Checks `nonce` without consuming it.
    ///
    /// `current_block + block_bound` caps how far ahead the block component
    /// may run, so a single relay cannot burn the whole nonce space.
    pub fn check(&self, nonce: Nonce, current_block: u64, block_bound: u64) -> Result<(), RelayError> {
        if nonce.is_zero() {
            debug!("Rejected zero nonce");
            return Err(RelayError::DuplicateOrStaleNonce);
        }

        let ceiling = u128::from(current_block).saturating_add(u128::from(block_bound));
        if nonce.block() > ceiling {
            debug!(block = nonce.block(), ceiling, "Rejected nonce beyond block bound");
            return Err(RelayError::DuplicateOrStaleNonce);
        }

        let stored_block = self.highest.block();
        let accepted = nonce.block() > stored_block
            || (nonce.block() == stored_block && !self.index_used(nonce.index()));
        if !accepted {
            debug!(?nonce, stored = ?self.highest, "Rejected duplicate or stale nonce");
            return Err(RelayError::DuplicateOrStaleNonce);
        }
        Ok(())
    }

    /// Records a nonce that already passed `check`.
    pub fn record(&mut self, nonce: Nonce) {
        if nonce.block() > self.highest.block() {
            self.used_indices.clear();
        }
        self.used_indices.insert(nonce.index());
        if nonce > self.highest {
            self.highest = nonce;
        }
    }

    /// Checks then records.
    pub fn consume(&mut self, nonce: Nonce, current_block: u64, block_bound: u64) -> Result<(), RelayError> {
        self.check(nonce, current_block, block_bound)?;
        self.record(nonce);
        Ok(())
    }

    /// Checks that `sign_hash` has not been executed yet.
    pub fn check_unexecuted(&self, sign_hash: &Hash) -> Result<(), RelayError> {
        if self.executed.contains(sign_hash) {
            debug!(?sign_hash, "Rejected already executed request");
            return Err(RelayError::DuplicateOrStaleNonce);
        }
        Ok(())
    }

    /// Marks `sign_hash` as executed.
    pub fn record_executed(&mut self, sign_hash: Hash) {
        self.executed.insert(sign_hash);
    }

    fn index_used(&self, index: u128) -> bool {
        self.used_indices.contains(&index)
    }

    /// Record whose highest consumed nonce is `nonce`.
    #[must_use]
    pub fn starting_at(nonce: Nonce) -> Self {
        let mut record = Self::default();
        if !nonce.is_zero() {
            record.record(nonce);
        }
        record
    }
}
