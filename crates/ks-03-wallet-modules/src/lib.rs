//! # KS-03 Wallet Modules - Reference Capabilities
//!
//! **Subsystem ID:** 3
//!
//! Capability modules implementing [`WalletModule`]. Each publishes its
//! authorization descriptors and runs its operations through a
//! [`ModuleContext`](ks_02_relay_engine::context::ModuleContext).
//!
//! | Module | Operations | Descriptor |
//! |--------|------------|------------|
//! | `ModuleManager` | `addModule` (relayable) | 1, owner first |
//! | `GuardianManager` | `addGuardian`, `revokeGuardian` | 1, owner first |
//! | `TransferManager` | `transferToken` (daily-limited) | 1, owner first |
//! | `LimitManager` | `changeLimit`, `disableLimit` | 1, owner first |
//! | `ApprovedTransfer` | `transferToken`, `changeLimit` | 1 + ceil(g/2), owner first |
//! | `RecoveryManager` | `executeRecovery` | ceil(g/2), owner excluded |
//! | | `finalizeRecovery` | 0, anyone |
//! | | `cancelRecovery` | ceil((g+1)/2), owner optional |
//!
//! Every module also exposes `addModule` callable only by the owner directly.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod approved_transfer;
pub mod base;
pub mod guardian_manager;
pub mod limit_manager;
pub mod module_manager;
pub mod recovery_manager;
pub mod transfer_manager;

pub use approved_transfer::ApprovedTransfer;
pub use guardian_manager::GuardianManager;
pub use limit_manager::LimitManager;
pub use module_manager::ModuleManager;
pub use recovery_manager::{PendingRecovery, RecoveryManager};
pub use transfer_manager::TransferManager;

use ks_02_relay_engine::prelude::WalletModule;
use std::sync::Arc;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 3;

/// One instance of every reference module, at consecutive addresses
/// starting from `base`.
#[must_use]
pub fn standard_modules(base: u64) -> Vec<Arc<dyn WalletModule>> {
    use shared_types::Address;
    vec![
        Arc::new(ModuleManager::new(Address::from_low_u64(base))),
        Arc::new(GuardianManager::new(Address::from_low_u64(base + 1))),
        Arc::new(TransferManager::new(Address::from_low_u64(base + 2))),
        Arc::new(LimitManager::new(Address::from_low_u64(base + 3))),
        Arc::new(ApprovedTransfer::new(Address::from_low_u64(base + 4))),
        Arc::new(RecoveryManager::new(Address::from_low_u64(base + 5))),
    ]
}
