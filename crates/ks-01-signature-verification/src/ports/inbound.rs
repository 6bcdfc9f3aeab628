//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use crate::domain::entities::{BatchRecoveryResult, EcdsaSignature, RecoveryRequest};
use crate::domain::errors::SignatureError;
use shared_types::{Address, Hash};

/// Primary Signature Verification API.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait SignatureVerificationApi: Send + Sync {
    /// Recover the signer of a raw 32-byte digest.
    ///
    /// # Security
    /// - Rejects signatures with high S values (EIP-2 malleability protection)
    fn recover_address(
        &self,
        message_hash: &Hash,
        signature: &EcdsaSignature,
    ) -> Result<Address, SignatureError>;

    /// Recover the signer of `hash` wrapped as an EIP-191 personal message.
    fn recover_eth_signed(
        &self,
        hash: &Hash,
        signature: &EcdsaSignature,
    ) -> Result<Address, SignatureError>;

    /// Recover many signers in parallel, preserving order.
    fn batch_recover(&self, requests: &[RecoveryRequest]) -> BatchRecoveryResult;
}
