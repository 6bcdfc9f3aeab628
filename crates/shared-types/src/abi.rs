//! # Call Encoding
//!
//! Module calls are a 4-byte operation selector followed by fixed-size
//! 32-byte argument words. The first argument of every wallet operation is
//! the wallet it targets.

use crate::entities::{u256_to_word, Address, Bytes, Hash, U256};
use crate::errors::CallDataError;
use crate::hashing::keccak256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of an argument word.
pub const WORD_SIZE: usize = 32;

/// Size of an operation selector.
pub const SELECTOR_SIZE: usize = 4;

// =============================================================================
// SELECTOR
// =============================================================================

/// First four bytes of the Keccak hash of an operation signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    /// Derives the selector of an operation signature such as
    /// `"transferToken(address,address,address,uint256)"`.
    #[must_use]
    pub fn from_signature(signature: &str) -> Self {
        let hash = keccak256(signature.as_bytes());
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&hash.as_bytes()[..4]);
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// =============================================================================
// TOKEN
// =============================================================================

/// A single static argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// Left-padded 20-byte address.
    Address(Address),
    /// Big-endian unsigned integer.
    Uint(U256),
    /// 0 or 1.
    Bool(bool),
    /// Raw 32-byte word.
    FixedBytes(Hash),
}

impl Token {
    fn to_word(self) -> [u8; 32] {
        match self {
            Token::Address(addr) => addr.to_word(),
            Token::Uint(value) => u256_to_word(value),
            Token::Bool(flag) => u256_to_word(U256::from(u8::from(flag))),
            Token::FixedBytes(hash) => hash.0,
        }
    }
}

// =============================================================================
// CALL DATA
// =============================================================================

/// Selector-prefixed call payload.
///
/// Decoding is lazy: the bytes are kept as submitted and arguments are read
/// on demand, so malformed payloads can still be hashed and signed over.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CallData(Bytes);

impl CallData {
    /// Encodes `selector` followed by one word per token.
    #[must_use]
    pub fn encode(selector: Selector, args: &[Token]) -> Self {
        let mut out = Vec::with_capacity(SELECTOR_SIZE + args.len() * WORD_SIZE);
        out.extend_from_slice(&selector.0);
        for arg in args {
            out.extend_from_slice(&arg.to_word());
        }
        Self(Bytes(out))
    }

    /// Wraps raw bytes without validation.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// The raw payload.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Total payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Operation selector.
    pub fn selector(&self) -> Result<Selector, CallDataError> {
        let data = self.as_slice();
        if data.len() < SELECTOR_SIZE {
            return Err(CallDataError::MissingSelector { len: data.len() });
        }
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&data[..SELECTOR_SIZE]);
        Ok(Selector(bytes))
    }

    /// Number of complete argument words.
    #[must_use]
    pub fn arg_count(&self) -> usize {
        self.len().saturating_sub(SELECTOR_SIZE) / WORD_SIZE
    }

    /// Raw argument word `index`.
    pub fn word(&self, index: usize) -> Result<[u8; 32], CallDataError> {
        let start = SELECTOR_SIZE + index * WORD_SIZE;
        let end = start + WORD_SIZE;
        let data = self.as_slice();
        if data.len() < end {
            return Err(CallDataError::MissingArgument { index });
        }
        let mut word = [0u8; 32];
        word.copy_from_slice(&data[start..end]);
        Ok(word)
    }

    /// Argument `index` decoded as an address. The 12 padding bytes must be zero.
    pub fn address_arg(&self, index: usize) -> Result<Address, CallDataError> {
        let word = self.word(index)?;
        if word[..12].iter().any(|b| *b != 0) {
            return Err(CallDataError::NotAnAddress { index });
        }
        Address::from_slice(&word[12..]).ok_or(CallDataError::NotAnAddress { index })
    }

    /// Argument `index` decoded as an unsigned integer.
    pub fn uint_arg(&self, index: usize) -> Result<U256, CallDataError> {
        let word = self.word(index)?;
        Ok(U256::from_big_endian(&word))
    }

    /// Argument `index` decoded as a bool.
    pub fn bool_arg(&self, index: usize) -> Result<bool, CallDataError> {
        let value = self.uint_arg(index)?;
        if value.is_zero() {
            Ok(false)
        } else if value == U256::one() {
            Ok(true)
        } else {
            Err(CallDataError::NotABool { index })
        }
    }

    /// Argument `index` as a raw 32-byte value.
    pub fn hash_arg(&self, index: usize) -> Result<Hash, CallDataError> {
        self.word(index).map(Hash)
    }
}

impl fmt::Debug for CallData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallData({:?})", self.0)
    }
}

impl From<Vec<u8>> for CallData {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes(bytes))
    }
}

// =============================================================================
// TESTS
// =============================================================================
