//! # Canonical Request Hash
//!
//! The digest every relay signer signs, bound to the engine, the chain and
//! each economically relevant request field.

use super::entities::RelayRequest;
use super::value_objects::{Hash, U256};
use ks_01_signature_verification::eth_signed_message_hash;
use shared_types::{keccak256, u256_to_word, Address};

/// Pre-image prefix: EIP-191 version 0 ("data with intended validator").
const PREFIX: [u8; 2] = [0x19, 0x00];

/// `keccak256(0x19 || 0x00 || engine || wallet || module || value || payload
/// || chain_id || nonce || gas_price || gas_limit || refund_token || refund_address)`.
///
/// `value` is always zero: relays never move the base asset by themselves.
#[must_use]
pub fn relay_request_hash(engine: &Address, chain_id: u64, request: &RelayRequest) -> Hash {
    let payload = request.payload.as_slice();
    let mut buf = Vec::with_capacity(2 + 20 * 5 + 32 * 5 + payload.len());
    buf.extend_from_slice(&PREFIX);
    buf.extend_from_slice(engine.as_bytes());
    buf.extend_from_slice(request.wallet.as_bytes());
    buf.extend_from_slice(request.target_module.as_bytes());
    buf.extend_from_slice(&[0u8; 32]);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&u256_to_word(U256::from(chain_id)));
    buf.extend_from_slice(&u256_to_word(request.nonce.as_u256()));
    buf.extend_from_slice(&u256_to_word(request.gas_price));
    buf.extend_from_slice(&u256_to_word(U256::from(request.gas_limit)));
    buf.extend_from_slice(request.refund_token.as_bytes());
    buf.extend_from_slice(request.refund_address.as_bytes());
    keccak256(&buf)
}

/// The digest signatures are recovered against.
#[must_use]
pub fn signing_digest(engine: &Address, chain_id: u64, request: &RelayRequest) -> Hash {
    eth_signed_message_hash(&relay_request_hash(engine, chain_id, request))
}
