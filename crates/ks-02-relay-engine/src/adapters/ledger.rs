//! # Ledger Adapter
//!
//! In-memory world state with a transactional undo journal.
//!
//! Every write made through a [`LedgerTransaction`] records the previous
//! value. Savepoints let the engine discard the module phase of a relay
//! alone; dropping an uncommitted transaction rolls everything back.

use crate::domain::daily_limit::DailyLimit;
use crate::domain::entities::WalletRecord;
use crate::domain::nonce::NonceRecord;
use crate::domain::value_objects::{Asset, Hash, U256};
use crate::errors::LedgerError;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use shared_types::Address;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Module-scoped storage slot: `(module, wallet, key)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StorageSlot {
    /// Module owning the slot.
    pub module: Address,
    /// Wallet the slot belongs to.
    pub wallet: Address,
    /// Slot key.
    pub key: Hash,
}

// =============================================================================
// WORLD STATE
// =============================================================================

/// Everything the engine persists.
#[derive(Debug, Default)]
pub struct WorldState {
    wallets: HashMap<Address, WalletRecord>,
    balances: HashMap<(Address, Asset), U256>,
    nonces: HashMap<Address, NonceRecord>,
    limits: HashMap<Address, DailyLimit>,
    storage: HashMap<StorageSlot, U256>,
}

impl WorldState {
    /// Start a journaled transaction.
    pub fn begin(&mut self) -> LedgerTransaction<'_> {
        LedgerTransaction {
            state: self,
            journal: Vec::new(),
            committed: false,
        }
    }

    /// Wallet record, if initialised.
    #[must_use]
    pub fn wallet(&self, wallet: &Address) -> Option<&WalletRecord> {
        self.wallets.get(wallet)
    }

    /// Balance of `holder` in `asset`.
    #[must_use]
    pub fn balance_of(&self, holder: &Address, asset: Asset) -> U256 {
        self.balances
            .get(&(*holder, asset))
            .copied()
            .unwrap_or_default()
    }

    /// Nonce record of `wallet` (empty if none consumed yet).
    #[must_use]
    pub fn nonce_record(&self, wallet: &Address) -> NonceRecord {
        self.nonces.get(wallet).cloned().unwrap_or_default()
    }

    /// Stored daily limit of `wallet`, if one was ever written.
    #[must_use]
    pub fn daily_limit(&self, wallet: &Address) -> Option<DailyLimit> {
        self.limits.get(wallet).copied()
    }

    /// Value of a storage slot (zero if never written).
    #[must_use]
    pub fn storage(&self, slot: &StorageSlot) -> U256 {
        self.storage.get(slot).copied().unwrap_or_default()
    }
}

// =============================================================================
// TRANSACTION
// =============================================================================

/// Previous value of one journaled write.
#[derive(Debug)]
enum UndoEntry {
    Wallet(Address, Option<WalletRecord>),
    Balance((Address, Asset), Option<U256>),
    Nonce(Address, Option<NonceRecord>),
    Limit(Address, Option<DailyLimit>),
    Storage(StorageSlot, Option<U256>),
}

/// Position in the journal to roll back to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Savepoint(usize);

/// Journaled view over [`WorldState`]. Rolls back on drop unless committed.
#[derive(Debug)]
pub struct LedgerTransaction<'l> {
    state: &'l mut WorldState,
    journal: Vec<UndoEntry>,
    committed: bool,
}

impl LedgerTransaction<'_> {
    /// Read-only view of the state including uncommitted writes.
    #[must_use]
    pub fn state(&self) -> &WorldState {
        self.state
    }

    /// Wallet record, if initialised.
    #[must_use]
    pub fn wallet(&self, wallet: &Address) -> Option<&WalletRecord> {
        self.state.wallet(wallet)
    }

    /// Replace a wallet record.
    pub fn put_wallet(&mut self, wallet: Address, record: WalletRecord) {
        let previous = self.state.wallets.insert(wallet, record);
        self.journal.push(UndoEntry::Wallet(wallet, previous));
    }

    /// Balance of `holder` in `asset`.
    #[must_use]
    pub fn balance_of(&self, holder: &Address, asset: Asset) -> U256 {
        self.state.balance_of(holder, asset)
    }

    fn set_balance(&mut self, holder: Address, asset: Asset, amount: U256) {
        let key = (holder, asset);
        let previous = self.state.balances.insert(key, amount);
        self.journal.push(UndoEntry::Balance(key, previous));
    }

    /// Move `amount` of `asset` from `from` to `to`.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        asset: Asset,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(from, asset);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset,
                required: amount,
                available,
            });
        }
        if from == to || amount.is_zero() {
            return Ok(());
        }
        let credited = self.balance_of(to, asset).saturating_add(amount);
        self.set_balance(*from, asset, available - amount);
        self.set_balance(*to, asset, credited);
        Ok(())
    }

    /// Nonce record of `wallet`.
    #[must_use]
    pub fn nonce_record(&self, wallet: &Address) -> NonceRecord {
        self.state.nonce_record(wallet)
    }

    /// Replace the nonce record of `wallet`.
    pub fn put_nonce_record(&mut self, wallet: Address, record: NonceRecord) {
        let previous = self.state.nonces.insert(wallet, record);
        self.journal.push(UndoEntry::Nonce(wallet, previous));
    }

    /// Stored daily limit of `wallet`.
    #[must_use]
    pub fn daily_limit(&self, wallet: &Address) -> Option<DailyLimit> {
        self.state.daily_limit(wallet)
    }

    /// Replace the daily limit of `wallet`.
    pub fn put_daily_limit(&mut self, wallet: Address, limit: DailyLimit) {
        let previous = self.state.limits.insert(wallet, limit);
        self.journal.push(UndoEntry::Limit(wallet, previous));
    }

    /// Value of a storage slot.
    #[must_use]
    pub fn storage(&self, slot: &StorageSlot) -> U256 {
        self.state.storage(slot)
    }

    /// Write a storage slot.
    pub fn set_storage(&mut self, slot: StorageSlot, value: U256) {
        let previous = self.state.storage.insert(slot, value);
        self.journal.push(UndoEntry::Storage(slot, previous));
    }

    /// Mark the current journal position.
    #[must_use]
    pub fn savepoint(&self) -> Savepoint {
        Savepoint(self.journal.len())
    }

    /// Undo every write made after `savepoint`.
    pub fn rollback_to(&mut self, savepoint: Savepoint) {
        let undone = self.journal.len().saturating_sub(savepoint.0);
        while self.journal.len() > savepoint.0 {
            if let Some(entry) = self.journal.pop() {
                self.undo(entry);
            }
        }
        debug!(undone, "Rolled back to savepoint");
    }

    /// Keep every write.
    pub fn commit(mut self) {
        self.committed = true;
        self.journal.clear();
    }

    /// Undo every write.
    pub fn rollback(mut self) {
        self.rollback_to(Savepoint(0));
    }

    fn undo(&mut self, entry: UndoEntry) {
        match entry {
            UndoEntry::Wallet(key, previous) => restore(&mut self.state.wallets, key, previous),
            UndoEntry::Balance(key, previous) => restore(&mut self.state.balances, key, previous),
            UndoEntry::Nonce(key, previous) => restore(&mut self.state.nonces, key, previous),
            UndoEntry::Limit(key, previous) => restore(&mut self.state.limits, key, previous),
            UndoEntry::Storage(key, previous) => restore(&mut self.state.storage, key, previous),
        }
    }
}

impl Drop for LedgerTransaction<'_> {
    fn drop(&mut self) {
        if !self.committed && !self.journal.is_empty() {
            self.rollback_to(Savepoint(0));
        }
    }
}

fn restore<K: std::hash::Hash + Eq, V>(map: &mut HashMap<K, V>, key: K, previous: Option<V>) {
    match previous {
        Some(value) => {
            map.insert(key, value);
        }
        None => {
            map.remove(&key);
        }
    }
}

// =============================================================================
// SHARED LEDGER HANDLE
// =============================================================================

/// Shared handle to the in-memory world state.
///
/// Clones share the same state. The engine takes the write lock for the
/// whole pipeline of a relay, so relays are serialized.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLedger {
    state: Arc<RwLock<WorldState>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint `amount` of `asset` to `holder` (funding, outside any relay).
    pub fn credit(&self, holder: Address, asset: Asset, amount: U256) {
        let mut state = self.state.write();
        let entry = state.balances.entry((holder, asset)).or_default();
        *entry = entry.saturating_add(amount);
    }

    /// Balance of `holder` in `asset`.
    #[must_use]
    pub fn balance_of(&self, holder: &Address, asset: Asset) -> U256 {
        self.state.read().balance_of(holder, asset)
    }

    /// Copy of a wallet record.
    #[must_use]
    pub fn wallet(&self, wallet: &Address) -> Option<WalletRecord> {
        self.state.read().wallet(wallet).cloned()
    }

    /// Stored daily limit of `wallet`.
    #[must_use]
    pub fn daily_limit_of(&self, wallet: &Address) -> Option<DailyLimit> {
        self.state.read().daily_limit(wallet)
    }

    /// Value of a storage slot.
    #[must_use]
    pub fn storage(&self, slot: &StorageSlot) -> U256 {
        self.state.read().storage(slot)
    }

    /// Shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, WorldState> {
        self.state.read()
    }

    /// Exclusive access; call [`WorldState::begin`] on the guard.
    pub fn write(&self) -> RwLockWriteGuard<'_, WorldState> {
        self.state.write()
    }
}
