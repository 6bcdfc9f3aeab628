//! # Guardian Manager
//!
//! Adds and revokes wallet guardians. Both operations need the owner: signed
//! when relayed, or as the direct caller.

use crate::base::{add_module, selector_of, AddModuleAccess, ADD_MODULE};
use ks_02_relay_engine::prelude::{
    AuthorizationDescriptor, Bytes, CallData, ModuleContext, ModuleError, Selector, WalletModule,
    WalletRecord,
};
use lazy_static::lazy_static;
use shared_types::Address;

lazy_static! {
    /// `addGuardian(wallet, guardian)`.
    pub static ref ADD_GUARDIAN: Selector = Selector::from_signature("addGuardian(address,address)");
    /// `revokeGuardian(wallet, guardian)`.
    pub static ref REVOKE_GUARDIAN: Selector =
        Selector::from_signature("revokeGuardian(address,address)");
}

/// Guardian administration.
#[derive(Clone, Debug)]
pub struct GuardianManager {
    address: Address,
}

impl GuardianManager {
    /// Module deployed at `address`.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self { address }
    }
}

impl WalletModule for GuardianManager {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        "GuardianManager"
    }

    fn authorization_descriptor(
        &self,
        selector: &Selector,
        _wallet: &WalletRecord,
    ) -> Option<AuthorizationDescriptor> {
        let known = *selector == *ADD_GUARDIAN
            || *selector == *REVOKE_GUARDIAN
            || *selector == *ADD_MODULE;
        known.then(AuthorizationDescriptor::owner_only)
    }

    fn execute(&self, ctx: &mut ModuleContext<'_, '_>, call: &CallData) -> Result<Bytes, ModuleError> {
        let selector = selector_of(call)?;
        if selector == *ADD_GUARDIAN {
            ctx.require_owner_or_relayed()?;
            ctx.add_guardian(call.address_arg(1)?)?;
        } else if selector == *REVOKE_GUARDIAN {
            ctx.require_owner_or_relayed()?;
            ctx.revoke_guardian(call.address_arg(1)?)?;
        } else if selector == *ADD_MODULE {
            return add_module(ctx, call, AddModuleAccess::DirectOwner);
        } else {
            return Err(ModuleError::UnknownOperation(selector));
        }
        Ok(Bytes::new())
    }
}
