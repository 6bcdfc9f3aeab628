//! # Ports Layer
//!
//! Inbound API exposed to the relay engine.

pub mod inbound;
