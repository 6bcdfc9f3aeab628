//! # Shared Types Crate
//!
//! Value types and encoding helpers used by every Keystone crate.
//!
//! ## Contents
//!
//! - **Identities**: `Address` (20 bytes, numerically ordered), `Hash`.
//! - **Relay primitives**: `Nonce` (`(block, index)` packed in a `U256`).
//! - **Call encoding**: `Selector` and `CallData`, a 4-byte selector followed
//!   by 32-byte argument words.
//! - **Hashing**: `keccak256`.

pub mod abi;
pub mod entities;
pub mod errors;
pub mod hashing;

pub use abi::{CallData, Selector, Token};
pub use entities::*;
pub use errors::*;
pub use hashing::keccak256;
