//! # Domain Entities
//!
//! Core data structures for signer recovery.

use super::errors::SignatureError;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash};

/// Length of a serialized `r || s || v` signature.
pub const SIGNATURE_LENGTH: usize = 65;

// =============================================================================
// ECDSA Types (secp256k1)
// =============================================================================

/// ECDSA signature on the secp256k1 curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
    /// Recovery ID (0, 1, 27, or 28)
    pub v: u8,
}

impl EcdsaSignature {
    /// Parses the 65-byte `r || s || v` wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::InvalidLength(bytes.len()));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    /// Serializes to the 65-byte `r || s || v` wire form.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }
}

// =============================================================================
// Recovery Request/Result Types
// =============================================================================

/// A hash and the signature claimed over it.
#[derive(Clone, Debug)]
pub struct RecoveryRequest {
    /// The digest that was signed (already EIP-191 wrapped where applicable)
    pub message_hash: Hash,
    /// The signature to recover from
    pub signature: EcdsaSignature,
}

/// Result of recovering one signer.
#[derive(Clone, Debug)]
pub struct RecoveryResult {
    /// The recovered address (if recovery succeeded)
    pub signer: Option<Address>,
    /// Error details (if recovery failed)
    pub error: Option<SignatureError>,
}

impl RecoveryResult {
    /// Create a successful result.
    pub fn recovered(signer: Address) -> Self {
        Self {
            signer: Some(signer),
            error: None,
        }
    }

    /// Create a failed result.
    pub fn failed(error: SignatureError) -> Self {
        Self {
            signer: None,
            error: Some(error),
        }
    }

    /// Converts into a `Result`.
    pub fn into_result(self) -> Result<Address, SignatureError> {
        match (self.signer, self.error) {
            (Some(signer), _) => Ok(signer),
            (None, Some(error)) => Err(error),
            (None, None) => Err(SignatureError::RecoveryFailed),
        }
    }
}

/// Result of batch recovery. `results` keeps request order.
#[derive(Clone, Debug)]
pub struct BatchRecoveryResult {
    /// Individual results for each request
    pub results: Vec<RecoveryResult>,
    /// Whether every signature recovered
    pub all_valid: bool,
    /// Index of the first failing signature
    pub first_failure: Option<usize>,
}

impl BatchRecoveryResult {
    /// Create a batch result from individual results.
    pub fn from_results(results: Vec<RecoveryResult>) -> Self {
        let first_failure = results.iter().position(|r| r.signer.is_none());
        Self {
            all_valid: first_failure.is_none(),
            first_failure,
            results,
        }
    }

    /// Recovered signers in request order, or the first error.
    pub fn into_signers(self) -> Result<Vec<Address>, SignatureError> {
        self.results
            .into_iter()
            .map(RecoveryResult::into_result)
            .collect()
    }
}
