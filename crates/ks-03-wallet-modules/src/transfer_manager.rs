//! # Transfer Manager
//!
//! Owner-authorized transfers out of the wallet, bounded by the daily
//! limit. Token amounts are valued in the base asset through the price
//! storage before being accounted.

use crate::base::{add_module, selector_of, AddModuleAccess, ADD_MODULE};
use ks_02_relay_engine::prelude::{
    Asset, AuthorizationDescriptor, Bytes, CallData, ModuleContext, ModuleError, Selector,
    WalletModule, WalletRecord, PRICE_SCALE, U256,
};
use lazy_static::lazy_static;
use shared_types::Address;
use tracing::debug;

lazy_static! {
    /// `transferToken(wallet, token, to, amount)`.
    pub static ref TRANSFER_TOKEN: Selector =
        Selector::from_signature("transferToken(address,address,address,uint256)");
}

/// Base-asset value of `amount` of `asset`.
pub(crate) fn base_value(
    ctx: &ModuleContext<'_, '_>,
    asset: Asset,
    amount: U256,
) -> Result<U256, ModuleError> {
    match asset {
        Asset::Base => Ok(amount),
        Asset::Token(token) => {
            let price = ctx
                .price_of(&token)
                .ok_or_else(|| ModuleError::revert("token has no price"))?;
            amount
                .checked_mul(price)
                .map(|value| value / U256::from(PRICE_SCALE))
                .ok_or_else(|| ModuleError::revert("transfer value overflow"))
        }
    }
}

/// Daily-limited transfers.
#[derive(Clone, Debug)]
pub struct TransferManager {
    address: Address,
}

impl TransferManager {
    /// Module deployed at `address`.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self { address }
    }
}

impl WalletModule for TransferManager {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        "TransferManager"
    }

    fn authorization_descriptor(
        &self,
        selector: &Selector,
        _wallet: &WalletRecord,
    ) -> Option<AuthorizationDescriptor> {
        (*selector == *TRANSFER_TOKEN || *selector == *ADD_MODULE)
            .then(AuthorizationDescriptor::owner_only)
    }

    fn execute(&self, ctx: &mut ModuleContext<'_, '_>, call: &CallData) -> Result<Bytes, ModuleError> {
        let selector = selector_of(call)?;
        if selector == *ADD_MODULE {
            return add_module(ctx, call, AddModuleAccess::DirectOwner);
        }
        if selector != *TRANSFER_TOKEN {
            return Err(ModuleError::UnknownOperation(selector));
        }

        ctx.require_owner_or_relayed()?;
        let asset = Asset::from_address(call.address_arg(1)?);
        let to = call.address_arg(2)?;
        let amount = call.uint_arg(3)?;

        let value = base_value(ctx, asset, amount)?;
        ctx.spend_daily_limit(value)?;
        ctx.transfer(asset, to, amount)?;
        debug!(?asset, %to, %amount, "Transfer executed");
        Ok(Bytes::new())
    }
}
