//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the relay engine depends on. Adapters implement these traits
//! to provide:
//! - Capability modules
//! - Token prices for refunds
//! - Signer recovery
//! - Event publication

use crate::context::ModuleContext;
use crate::domain::entities::WalletRecord;
use crate::domain::value_objects::{AuthorizationDescriptor, Bytes, CallData, Hash, Selector, U256};
use crate::errors::{ModuleError, RelayError};
use crate::events::RelayEvent;
use ks_01_signature_verification::{EcdsaSignature, SignatureError};
use shared_types::Address;
use std::sync::Arc;

// =============================================================================
// CAPABILITY MODULE
// =============================================================================

/// A pluggable wallet capability.
///
/// Each module publishes, per callable operation, how many signatures a
/// relayed call needs and what role the owner's signature plays. The engine
/// never interprets a module's domain errors.
pub trait WalletModule: Send + Sync {
    /// Identity the module is registered and attached under.
    fn address(&self) -> Address;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Authorization requirement of `selector` for `wallet`, or `None` if the
    /// module does not expose the operation.
    fn authorization_descriptor(
        &self,
        selector: &Selector,
        wallet: &WalletRecord,
    ) -> Option<AuthorizationDescriptor>;

    /// Run the operation. All state access goes through `ctx`.
    fn execute(&self, ctx: &mut ModuleContext<'_, '_>, call: &CallData) -> Result<Bytes, ModuleError>;
}

impl<M: WalletModule + ?Sized> WalletModule for Arc<M> {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn authorization_descriptor(
        &self,
        selector: &Selector,
        wallet: &WalletRecord,
    ) -> Option<AuthorizationDescriptor> {
        (**self).authorization_descriptor(selector, wallet)
    }

    fn execute(&self, ctx: &mut ModuleContext<'_, '_>, call: &CallData) -> Result<Bytes, ModuleError> {
        (**self).execute(ctx, call)
    }
}

// =============================================================================
// PRICE LOOKUP
// =============================================================================

/// Token price source. Trusted by the engine.
pub trait PriceOracle: Send + Sync {
    /// Base-asset value of one whole token, scaled by 10^18. `None` if unknown.
    fn price_of(&self, token: &Address) -> Option<U256>;
}

impl<P: PriceOracle + ?Sized> PriceOracle for Arc<P> {
    fn price_of(&self, token: &Address) -> Option<U256> {
        (**self).price_of(token)
    }
}

// =============================================================================
// SIGNATURE RECOVERY (ks-01 Dependency)
// =============================================================================

/// Recovers signer identities from request signatures.
pub trait SignatureVerifier: Send + Sync {
    /// Recover the signer of a prehashed digest.
    fn ecrecover(&self, digest: &Hash, signature: &EcdsaSignature) -> Result<Address, SignatureError>;

    /// Recover every signer, in order. The first failure is reported with
    /// its index.
    fn recover_all(
        &self,
        digest: &Hash,
        signatures: &[EcdsaSignature],
    ) -> Result<Vec<Address>, RelayError> {
        signatures
            .iter()
            .enumerate()
            .map(|(index, sig)| {
                self.ecrecover(digest, sig)
                    .map_err(|source| RelayError::InvalidSignature { index, source })
            })
            .collect()
    }
}

// =============================================================================
// EVENT PUBLICATION
// =============================================================================

/// Receives committed events.
pub trait EventSink: Send + Sync {
    /// Publish one event.
    fn publish(&self, event: RelayEvent);
}

impl<E: EventSink + ?Sized> EventSink for Arc<E> {
    fn publish(&self, event: RelayEvent) {
        (**self).publish(event);
    }
}

/// Sink that drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn publish(&self, _event: RelayEvent) {}
}
