//! # Ports
//!
//! - `inbound`: the API the engine offers (driving side)
//! - `outbound`: the collaborators the engine depends on (driven side)

pub mod inbound;
pub mod outbound;

pub use inbound::RelayApi;
pub use outbound::{EventSink, PriceOracle, SignatureVerifier, WalletModule};
