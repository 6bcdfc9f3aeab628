//! # Module Manager
//!
//! Attaches new modules to a wallet. Unlike the other modules, its
//! `addModule` can be relayed with the owner's signature.

use crate::base::{add_module, selector_of, AddModuleAccess, ADD_MODULE};
use ks_02_relay_engine::prelude::{
    AuthorizationDescriptor, Bytes, CallData, ModuleContext, ModuleError, Selector, WalletModule,
    WalletRecord,
};
use shared_types::Address;
use tracing::debug;

/// Relayable module administration.
#[derive(Clone, Debug)]
pub struct ModuleManager {
    address: Address,
}

impl ModuleManager {
    /// Module deployed at `address`.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self { address }
    }
}

impl WalletModule for ModuleManager {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        "ModuleManager"
    }

    fn authorization_descriptor(
        &self,
        selector: &Selector,
        _wallet: &WalletRecord,
    ) -> Option<AuthorizationDescriptor> {
        (*selector == *ADD_MODULE).then(AuthorizationDescriptor::owner_only)
    }

    fn execute(&self, ctx: &mut ModuleContext<'_, '_>, call: &CallData) -> Result<Bytes, ModuleError> {
        let selector = selector_of(call)?;
        if selector != *ADD_MODULE {
            return Err(ModuleError::UnknownOperation(selector));
        }
        debug!(wallet = %ctx.wallet_address(), relayed = ctx.is_relayed(), "addModule");
        add_module(ctx, call, AddModuleAccess::OwnerOrModule)
    }
}
