//! # Signature Recovery Adapter
//!
//! Bridges the engine's [`SignatureVerifier`] port to the ks-01 ECDSA
//! service. Multiple signatures are recovered as one parallel batch.

use crate::domain::value_objects::Hash;
use crate::errors::RelayError;
use crate::ports::outbound::SignatureVerifier;
use ks_01_signature_verification::{
    EcdsaSignature, RecoveryRequest, SignatureError, SignatureVerificationApi,
    SignatureVerificationService,
};
use shared_types::Address;

/// Recovery through [`SignatureVerificationService`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EcdsaRecoveryAdapter {
    service: SignatureVerificationService,
}

impl EcdsaRecoveryAdapter {
    /// Create the adapter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SignatureVerifier for EcdsaRecoveryAdapter {
    fn ecrecover(&self, digest: &Hash, signature: &EcdsaSignature) -> Result<Address, SignatureError> {
        self.service.recover_address(digest, signature)
    }

    fn recover_all(
        &self,
        digest: &Hash,
        signatures: &[EcdsaSignature],
    ) -> Result<Vec<Address>, RelayError> {
        if signatures.len() < 2 {
            return signatures
                .iter()
                .enumerate()
                .map(|(index, sig)| {
                    self.ecrecover(digest, sig)
                        .map_err(|source| RelayError::InvalidSignature { index, source })
                })
                .collect();
        }

        let requests: Vec<RecoveryRequest> = signatures
            .iter()
            .map(|signature| RecoveryRequest {
                message_hash: *digest,
                signature: *signature,
            })
            .collect();
        let batch = self.service.batch_recover(&requests);
        if let Some(index) = batch.first_failure {
            let source = batch.results[index]
                .error
                .clone()
                .unwrap_or(SignatureError::RecoveryFailed);
            return Err(RelayError::InvalidSignature { index, source });
        }
        batch
            .into_signers()
            .map_err(|source| RelayError::InvalidSignature { index: 0, source })
    }
}
