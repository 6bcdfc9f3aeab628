//! # Domain Layer
//!
//! Pure relay logic: replay store, quorum rules, refund planning, daily
//! limits, the deny-list, the canonical request hash, the module registry
//! and access roles. No I/O, no locks.

pub mod access;
pub mod daily_limit;
pub mod deny_list;
pub mod entities;
pub mod nonce;
pub mod quorum;
pub mod refund;
pub mod registry;
pub mod request_hash;
pub mod value_objects;
