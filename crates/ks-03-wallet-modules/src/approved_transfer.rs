//! # Approved Transfer
//!
//! Transfers and limit changes approved by the owner together with a
//! majority of guardians. Approved transfers bypass the daily limit and
//! reset the amount spent in the current window.

use crate::base::{add_module, guardian_majority, selector_of, AddModuleAccess, ADD_MODULE};
use ks_02_relay_engine::prelude::{
    Asset, AuthorizationDescriptor, Bytes, CallData, ModuleContext, ModuleError,
    OwnerSignatureRequirement, Selector, WalletModule, WalletRecord,
};
use lazy_static::lazy_static;
use shared_types::Address;
use tracing::debug;

lazy_static! {
    /// `transferToken(wallet, token, to, amount)`, guardian-approved.
    pub static ref APPROVED_TRANSFER: Selector =
        Selector::from_signature("transferToken(address,address,address,uint256)");
    /// `changeLimit(wallet, newLimit)` effective immediately.
    pub static ref APPROVED_CHANGE_LIMIT: Selector =
        Selector::from_signature("changeLimit(address,uint256)");
}

/// Owner-plus-guardians operations.
#[derive(Clone, Debug)]
pub struct ApprovedTransfer {
    address: Address,
}

impl ApprovedTransfer {
    /// Module deployed at `address`.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self { address }
    }
}

impl WalletModule for ApprovedTransfer {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        "ApprovedTransfer"
    }

    fn authorization_descriptor(
        &self,
        selector: &Selector,
        wallet: &WalletRecord,
    ) -> Option<AuthorizationDescriptor> {
        if *selector == *APPROVED_TRANSFER || *selector == *APPROVED_CHANGE_LIMIT {
            Some(AuthorizationDescriptor::new(
                1 + guardian_majority(wallet.guardian_count()),
                OwnerSignatureRequirement::RequiredOwnerFirst,
            ))
        } else if *selector == *ADD_MODULE {
            Some(AuthorizationDescriptor::owner_only())
        } else {
            None
        }
    }

    fn execute(&self, ctx: &mut ModuleContext<'_, '_>, call: &CallData) -> Result<Bytes, ModuleError> {
        let selector = selector_of(call)?;
        if selector == *ADD_MODULE {
            return add_module(ctx, call, AddModuleAccess::DirectOwner);
        }
        if selector != *APPROVED_TRANSFER && selector != *APPROVED_CHANGE_LIMIT {
            return Err(ModuleError::UnknownOperation(selector));
        }

        ctx.require_owner_or_relayed()?;
        if ctx.wallet()?.guardian_count() == 0 {
            return Err(ModuleError::revert("no guardians"));
        }

        if selector == *APPROVED_TRANSFER {
            let asset = Asset::from_address(call.address_arg(1)?);
            let to = call.address_arg(2)?;
            let amount = call.uint_arg(3)?;
            ctx.transfer(asset, to, amount)?;
            ctx.reset_daily_spent()?;
            debug!(?asset, %to, %amount, "Approved transfer executed");
        } else {
            let new_limit = call.uint_arg(1)?;
            if new_limit.is_zero() {
                return Err(ModuleError::revert("limit must be positive"));
            }
            let mut limit = ctx.daily_limit();
            limit.limit = new_limit;
            limit.pending_limit = None;
            limit.change_after = 0;
            ctx.put_daily_limit(limit)?;
            debug!(%new_limit, "Approved limit change applied");
        }
        Ok(Bytes::new())
    }
}
