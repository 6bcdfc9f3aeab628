//! # Signature Verification Subsystem (KS-01)
//!
//! Recovers the signers of relay authorizations.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Pure cryptographic logic, no I/O
//! - **Ports Layer** (`ports/`): Trait definitions for the inbound API
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: Signatures with high S values are rejected
//! - **Scalar Range Validation**: R and S must be in [1, n-1]
//! - **Message Binding**: relay hashes are wrapped as EIP-191 personal messages
//!   before signing, so a relay signature can never be replayed as a raw
//!   transaction signature

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::ecdsa::{
    address_from_pubkey, batch_recover, eth_signed_message_hash, recover_address,
};
pub use domain::entities::{BatchRecoveryResult, EcdsaSignature, RecoveryRequest, RecoveryResult};
pub use domain::errors::SignatureError;
pub use ports::inbound::SignatureVerificationApi;
pub use service::SignatureVerificationService;

#[cfg(any(test, feature = "test-helpers"))]
pub use domain::ecdsa::test_helpers;
