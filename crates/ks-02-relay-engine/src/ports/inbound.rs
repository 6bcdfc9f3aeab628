//! # Driving Ports (API - Inbound)
//!
//! The operations the relay engine offers to submitters, wallet owners and
//! the registry owner.

use crate::domain::entities::{DirectCall, RelayOutcome, RelayRequest, RelaySubmission};
use crate::domain::registry::RegistryUpdate;
use crate::domain::value_objects::{Bytes, Hash, Nonce};
use crate::errors::{AccessError, RelayError, WalletError};
use shared_types::Address;

/// Primary API of the relay engine.
pub trait RelayApi: Send + Sync {
    /// Initialise `wallet` with its first owner and modules.
    fn init_wallet(
        &self,
        wallet: Address,
        owner: Address,
        modules: &[Address],
    ) -> Result<(), WalletError>;

    /// Whether `module` is attached to `wallet`.
    fn is_authorized(&self, wallet: &Address, module: &Address) -> bool;

    /// Highest nonce consumed for `wallet`.
    fn current_nonce(&self, wallet: &Address) -> Result<Nonce, RelayError>;

    /// Digest signers must sign for `request`.
    fn signing_digest(&self, request: &RelayRequest) -> Hash;

    /// Validate, execute and refund a relayed request.
    ///
    /// `Ok` means the request was accepted and its nonce consumed; the
    /// module itself may still have failed (`success == false`).
    fn relay(
        &self,
        request: RelayRequest,
        submission: RelaySubmission,
    ) -> Result<RelayOutcome, RelayError>;

    /// Direct path: no signatures, nonce or refund.
    fn invoke(&self, call: DirectCall) -> Result<Bytes, RelayError>;

    /// Apply an owner-gated registry update.
    fn update_registry(&self, caller: &Address, update: RegistryUpdate) -> Result<(), AccessError>;
}
