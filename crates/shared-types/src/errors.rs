//! # Error Types
//!
//! Errors raised while parsing or decoding shared value types.

use thiserror::Error;

/// Errors parsing textual representations (hex addresses).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded value had the wrong number of bytes.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Errors decoding selector-prefixed call data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallDataError {
    /// Payload shorter than the 4-byte selector.
    #[error("Call data too short: {len} bytes")]
    MissingSelector { len: usize },

    /// Requested argument word lies beyond the payload.
    #[error("Missing argument {index}")]
    MissingArgument { index: usize },

    /// Word does not hold a left-padded address.
    #[error("Argument {index} is not an address")]
    NotAnAddress { index: usize },

    /// Word does not hold 0 or 1.
    #[error("Argument {index} is not a bool")]
    NotABool { index: usize },
}
