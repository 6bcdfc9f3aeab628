//! # ECDSA Recovery (secp256k1)
//!
//! Pure domain logic for recovering the signer of a relay authorization.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: S must be STRICTLY LESS THAN SECP256K1_HALF_ORDER
//! - **Scalar Range Validation**: R and S must be in [1, n-1]
//! - **Constant-Time Operations**: Uses `subtle` crate for side-channel resistance
//! - Uses k256 crate for cryptographic operations

use super::entities::{BatchRecoveryResult, EcdsaSignature, RecoveryRequest, RecoveryResult};
use super::errors::SignatureError;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use shared_types::{keccak256, Address, Hash};
use subtle::{Choice, ConstantTimeEq};

/// secp256k1 curve order n
/// n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Half of the secp256k1 curve order (for malleability check).
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Prefix of an EIP-191 personal message carrying a 32-byte payload.
const ETH_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

// =============================================================================
// MESSAGE HASHING
// =============================================================================

/// Wraps a 32-byte digest as an EIP-191 personal message and hashes it.
///
/// This is the digest wallet signers actually sign: `personal_sign(hash)`.
pub fn eth_signed_message_hash(hash: &Hash) -> Hash {
    let mut buf = [0u8; ETH_MESSAGE_PREFIX.len() + 32];
    buf[..ETH_MESSAGE_PREFIX.len()].copy_from_slice(ETH_MESSAGE_PREFIX);
    buf[ETH_MESSAGE_PREFIX.len()..].copy_from_slice(hash.as_bytes());
    keccak256(&buf)
}

// =============================================================================
// CORE RECOVERY FUNCTIONS
// =============================================================================

/// Recover the signer's address from a signature over `message_hash`.
///
/// Security validations performed:
/// 1. R and S are in valid range [1, n-1] per SEC1 standard
/// 2. S is in lower half per EIP-2 malleability protection
/// 3. Recovery ID (v) is valid (0, 1, 27, or 28)
/// 4. Public key recovery succeeds
pub fn recover_address(
    message_hash: &Hash,
    signature: &EcdsaSignature,
) -> Result<Address, SignatureError> {
    use zeroize::Zeroize;

    if !is_valid_scalar(&signature.r) || !is_valid_scalar(&signature.s) {
        return Err(SignatureError::InvalidFormat);
    }
    if !is_low_s(&signature.s) {
        return Err(SignatureError::MalleableSignature);
    }

    let recovery_id = parse_recovery_id(signature.v)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let parsed = Signature::from_slice(&sig_bytes);
    sig_bytes.zeroize();
    let sig = parsed.map_err(|_| SignatureError::InvalidFormat)?;

    let recovered_key = VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Recover every signer in parallel. Result order matches request order.
pub fn batch_recover(requests: &[RecoveryRequest]) -> BatchRecoveryResult {
    use rayon::prelude::*;

    let results: Vec<RecoveryResult> = requests
        .par_iter()
        .map(|req| match recover_address(&req.message_hash, &req.signature) {
            Ok(signer) => RecoveryResult::recovered(signer),
            Err(e) => RecoveryResult::failed(e),
        })
        .collect();

    BatchRecoveryResult::from_results(results)
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Derive Ethereum address from public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    // Keccak256 of the 64-byte key without the 0x04 prefix; last 20 bytes
    let hash = keccak256(&pubkey_bytes.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash.as_bytes()[12..]);
    Address(address)
}

/// Check if S value is in lower half of curve order (EIP-2 malleability protection).
///
/// Constant-time: the loop never exits early.
fn is_low_s(s: &[u8; 32]) -> bool {
    ct_less_than(s, &SECP256K1_HALF_ORDER).into()
}

/// Check if a scalar value is in valid range [1, n-1] for ECDSA.
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }
    (!is_zero & ct_less_than(scalar, &SECP256K1_ORDER)).into()
}

/// Constant-time big-endian `a < b`.
fn ct_less_than(a: &[u8; 32], b: &[u8; 32]) -> Choice {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        let byte_less = Choice::from(u8::from(a[i] < b[i]));
        let byte_greater = Choice::from(u8::from(a[i] > b[i]));

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    less
}

/// Parse recovery ID from v value.
///
/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}

/// Invert S value: s' = n - s
pub fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = i32::from(SECP256K1_ORDER[i]) - i32::from(s[i]) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

// =============================================================================
// TEST HELPERS
// =============================================================================

/// Signing helpers for tests in this and downstream crates.
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use super::*;
    use k256::ecdsa::SigningKey;

    /// Generate a random keypair and its address.
    pub fn generate_keypair() -> (SigningKey, Address) {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_pubkey(signing_key.verifying_key());
        (signing_key, address)
    }

    /// Deterministic signing key derived from a seed.
    pub fn signing_key_from_seed(seed: &[u8]) -> SigningKey {
        let secret = keccak256(seed);
        SigningKey::from_slice(secret.as_bytes()).expect("seed hash is a valid scalar")
    }

    /// Sign a raw 32-byte digest, normalized to low S with `v` in {27, 28}.
    pub fn sign(message_hash: &Hash, private_key: &SigningKey) -> EcdsaSignature {
        let (sig, recid) = private_key
            .sign_prehash_recoverable(message_hash.as_bytes())
            .expect("signing failed");

        let sig_bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..]);

        let mut parity = recid.to_byte() & 1;
        if !is_low_s(&s) {
            s = invert_s(&s);
            parity ^= 1;
        }

        EcdsaSignature { r, s, v: 27 + parity }
    }

    /// Sign `hash` the way a wallet's `personal_sign` does.
    pub fn sign_eth_message(hash: &Hash, private_key: &SigningKey) -> EcdsaSignature {
        sign(&eth_signed_message_hash(hash), private_key)
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
