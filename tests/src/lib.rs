//! # Keystone Scenario Suite
//!
//! End-to-end scenarios driving the relay engine with the reference
//! modules and real secp256k1 signers.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs          # Signers, test modules, the `World` harness
//! └── integration/
//!     ├── relayer.rs      # Validation pipeline and replay protection
//!     ├── refund.rs       # Refunds and daily-limit accounting
//!     ├── module_management.rs
//!     └── recovery.rs     # Guardian quorums and ownership recovery
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ks-tests
//! cargo test -p ks-tests integration::refund::
//! ```

pub mod integration;
pub mod support;
