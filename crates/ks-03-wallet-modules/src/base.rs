//! # Module Base
//!
//! Pieces every reference module shares: the `addModule` operation, the
//! guardian-quorum size and call-data helpers.

use ks_02_relay_engine::prelude::{Bytes, CallData, ModuleContext, ModuleError, Selector};
use lazy_static::lazy_static;
use shared_types::Address;

lazy_static! {
    /// `addModule(wallet, module)`, exposed by every module.
    pub static ref ADD_MODULE: Selector = Selector::from_signature("addModule(address,address)");
}

/// Who may call `addModule` on a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddModuleAccess {
    /// Only the owner calling directly. Relayed calls fail.
    DirectOwner,
    /// The owner, an attached module, or a relay through an attached engine.
    OwnerOrModule,
}

/// Attach the module named by argument 1 to the wallet.
pub fn add_module(
    ctx: &mut ModuleContext<'_, '_>,
    call: &CallData,
    access: AddModuleAccess,
) -> Result<Bytes, ModuleError> {
    match access {
        AddModuleAccess::DirectOwner => ctx.require_direct_owner()?,
        AddModuleAccess::OwnerOrModule => ctx.require_owner_or_module()?,
    }
    let module = call.address_arg(1)?;
    ctx.authorize_module(module, true)?;
    Ok(Bytes::new())
}

/// Majority of `guardians`, rounded up.
#[must_use]
pub const fn guardian_majority(guardians: usize) -> usize {
    guardians.div_ceil(2)
}

/// Selector of `call`; modules only see calls the engine already bound.
pub fn selector_of(call: &CallData) -> Result<Selector, ModuleError> {
    Ok(call.selector()?)
}

/// Address argument that must not be zero.
pub fn non_zero_address(call: &CallData, index: usize, what: &str) -> Result<Address, ModuleError> {
    let address = call.address_arg(index)?;
    if address.is_zero() {
        return Err(ModuleError::revert(format!("{what} cannot be the zero address")));
    }
    Ok(address)
}
