//! # KS-02 Relay Engine - Relay & Authorization Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Accepts transaction requests submitted on behalf of a wallet owner,
//! verifies that the correct quorum of signers authorized them, enforces
//! replay protection, executes the request against a pluggable wallet
//! module and refunds the submitter from the wallet's own funds, subject to
//! a rolling daily limit.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | A consumed `(wallet, nonce)` never succeeds again | `domain/nonce.rs` - `NonceRecord::check()` |
//! | Signature count matches the module descriptor | `domain/quorum.rs` - `check_signature_count()` |
//! | Owner position and signer ordering | `domain/quorum.rs` - `check_signers()` |
//! | Payload is bound to the wallet | `service.rs` - `bound_selector()` |
//! | Relaying into the engine itself is forbidden | `domain/deny_list.rs` - `DenyList::default_for()` |
//! | Refund within the daily limit | `domain/daily_limit.rs` - `DailyLimit::spend()` |
//! | A rejected relay changes nothing | `adapters/ledger.rs` - `LedgerTransaction` rollback on drop |
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure checks and value types
//! - **Ports Layer** (`ports/`): `RelayApi` inbound; `WalletModule`,
//!   `PriceOracle`, `SignatureVerifier`, `EventSink` outbound
//! - **Adapters** (`adapters/`): journaled in-memory ledger, price storage,
//!   event log, ECDSA recovery over KS-01
//! - **Service** (`service.rs`): `RelayEngine`, the relay pipeline
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ks_02_relay_engine::prelude::*;
//!
//! let engine = RelayEngine::new(config, registry, ledger, verifier, prices, events)?;
//! engine.deploy_module(Arc::new(my_module));
//! engine.init_wallet(wallet, owner, &[my_module_address])?;
//!
//! let outcome = engine.relay(request, submission)?;
//! if !outcome.success {
//!     println!("module failed: {:?}", outcome.error_detail);
//! }
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod context;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        BlockInfo, DirectCall, RefundReceipt, RelayOutcome, RelayRequest, RelaySubmission,
        WalletRecord,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        Asset, AuthorizationDescriptor, Bytes, CallData, GasMeter, Hash, Nonce,
        OwnerSignatureRequirement, Selector, BASE_ASSET_ADDRESS, U256,
    };

    // Domain services
    pub use crate::domain::access::{Managed, Owned};
    pub use crate::domain::daily_limit::DailyLimit;
    pub use crate::domain::deny_list::{DenyEntry, DenyList, ModuleTarget};
    pub use crate::domain::nonce::NonceRecord;
    pub use crate::domain::refund::PRICE_SCALE;
    pub use crate::domain::registry::{ModuleRegistry, RegistryUpdate};

    // Ports
    pub use crate::ports::inbound::RelayApi;
    pub use crate::ports::outbound::{
        EventSink, NullEventSink, PriceOracle, SignatureVerifier, WalletModule,
    };

    // Context
    pub use crate::context::{CallOrigin, ModuleContext};

    // Events
    pub use crate::events::RelayEvent;

    // Errors
    pub use crate::errors::{AccessError, LedgerError, ModuleError, RelayError, WalletError};

    // Config
    pub use crate::config::{ConfigError, EngineConfig, GasCheckPolicy, GasSchedule};

    // Adapters
    pub use crate::adapters::{
        EcdsaRecoveryAdapter, InMemoryEventLog, InMemoryLedger, StorageSlot, TokenPriceStorage,
    };

    // Service
    pub use crate::service::{DefaultRelayEngine, RelayEngine, ServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 2;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Relay Engine";

// =============================================================================
// TESTS
// =============================================================================
