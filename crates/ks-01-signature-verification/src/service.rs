//! # Signature Verification Service
//!
//! Application service layer that implements the `SignatureVerificationApi` trait.
//! Delegates cryptographic operations to the domain layer and records the
//! outcome at debug level.

use crate::domain::ecdsa;
use crate::domain::entities::{BatchRecoveryResult, EcdsaSignature, RecoveryRequest};
use crate::domain::errors::SignatureError;
use crate::ports::inbound::SignatureVerificationApi;
use shared_types::{Address, Hash};
use tracing::debug;

/// Signature Verification Service.
///
/// Stateless; cheap to clone and share between engines.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureVerificationService;

impl SignatureVerificationService {
    /// Create a new signature verification service.
    pub fn new() -> Self {
        Self
    }
}

impl SignatureVerificationApi for SignatureVerificationService {
    fn recover_address(
        &self,
        message_hash: &Hash,
        signature: &EcdsaSignature,
    ) -> Result<Address, SignatureError> {
        let result = ecdsa::recover_address(message_hash, signature);
        if let Err(ref e) = result {
            debug!(hash = %message_hash, error = %e, "Signer recovery failed");
        }
        result
    }

    fn recover_eth_signed(
        &self,
        hash: &Hash,
        signature: &EcdsaSignature,
    ) -> Result<Address, SignatureError> {
        self.recover_address(&ecdsa::eth_signed_message_hash(hash), signature)
    }

    fn batch_recover(&self, requests: &[RecoveryRequest]) -> BatchRecoveryResult {
        let batch = ecdsa::batch_recover(requests);
        if let Some(index) = batch.first_failure {
            debug!(index, total = requests.len(), "Batch recovery had failures");
        }
        batch
    }
}
