//! # Domain Layer
//!
//! Pure signature logic. No I/O, no shared state.

pub mod ecdsa;
pub mod entities;
pub mod errors;
