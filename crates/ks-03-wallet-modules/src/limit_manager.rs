//! # Limit Manager
//!
//! Owner-scheduled daily-limit changes. A change only takes effect after the
//! configured security period; disabling is a change to `U256::MAX`.

use crate::base::{add_module, selector_of, AddModuleAccess, ADD_MODULE};
use ks_02_relay_engine::prelude::{
    AuthorizationDescriptor, Bytes, CallData, ModuleContext, ModuleError, Selector, WalletModule,
    WalletRecord, U256,
};
use lazy_static::lazy_static;
use shared_types::Address;

lazy_static! {
    /// `changeLimit(wallet, newLimit)`.
    pub static ref CHANGE_LIMIT: Selector = Selector::from_signature("changeLimit(address,uint256)");
    /// `disableLimit(wallet)`.
    pub static ref DISABLE_LIMIT: Selector = Selector::from_signature("disableLimit(address)");
}

/// Daily-limit administration.
#[derive(Clone, Debug)]
pub struct LimitManager {
    address: Address,
}

impl LimitManager {
    /// Module deployed at `address`.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self { address }
    }
}

impl WalletModule for LimitManager {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        "LimitManager"
    }

    fn authorization_descriptor(
        &self,
        selector: &Selector,
        _wallet: &WalletRecord,
    ) -> Option<AuthorizationDescriptor> {
        let known =
            *selector == *CHANGE_LIMIT || *selector == *DISABLE_LIMIT || *selector == *ADD_MODULE;
        known.then(AuthorizationDescriptor::owner_only)
    }

    fn execute(&self, ctx: &mut ModuleContext<'_, '_>, call: &CallData) -> Result<Bytes, ModuleError> {
        let selector = selector_of(call)?;
        let new_limit = if selector == *CHANGE_LIMIT {
            call.uint_arg(1)?
        } else if selector == *DISABLE_LIMIT {
            U256::MAX
        } else if selector == *ADD_MODULE {
            return add_module(ctx, call, AddModuleAccess::DirectOwner);
        } else {
            return Err(ModuleError::UnknownOperation(selector));
        };

        ctx.require_owner_or_relayed()?;
        if new_limit.is_zero() {
            return Err(ModuleError::revert("limit must be positive"));
        }
        ctx.schedule_limit_change(new_limit)?;
        Ok(Bytes::new())
    }
}
