//! # Adapters
//!
//! In-memory implementations of the engine's outbound ports.

pub mod event_log;
pub mod ledger;
pub mod price_storage;
pub mod signature;

pub use event_log::InMemoryEventLog;
pub use ledger::{InMemoryLedger, LedgerTransaction, Savepoint, StorageSlot, WorldState};
pub use price_storage::TokenPriceStorage;
pub use signature::EcdsaRecoveryAdapter;
