//! # Module Registry
//!
//! Authoritative set of modules that may be attached to any wallet.
//! The registry is an immutable value; updates produce a new registry.

use super::access::Owned;
use crate::errors::AccessError;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::BTreeMap;

/// A registry change, authorized by the registry owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryUpdate {
    /// Approve a module under a display name.
    RegisterModule {
        /// Module address.
        module: Address,
        /// Display name.
        name: String,
    },
    /// Withdraw approval. Wallets keep modules they already attached.
    DeregisterModule {
        /// Module address.
        module: Address,
    },
    /// Hand the registry to a new owner.
    ChangeOwner {
        /// New owner.
        new_owner: Address,
    },
}

/// Registered modules and the registry owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRegistry {
    access: Owned,
    modules: BTreeMap<Address, String>,
}

impl ModuleRegistry {
    /// Empty registry owned by `owner`.
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self {
            access: Owned::new(owner),
            modules: BTreeMap::new(),
        }
    }

    /// Builder used at construction time.
    #[must_use]
    pub fn with_module(mut self, module: Address, name: impl Into<String>) -> Self {
        self.modules.insert(module, name.into());
        self
    }

    /// Registry owner.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.access.owner()
    }

    /// True if `module` is registered.
    #[must_use]
    pub fn is_registered(&self, module: &Address) -> bool {
        self.modules.contains_key(module)
    }

    /// Display name of a registered module.
    #[must_use]
    pub fn module_name(&self, module: &Address) -> Option<&str> {
        self.modules.get(module).map(String::as_str)
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if no module is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Applies `update` on behalf of `caller`, returning the new registry.
    pub fn apply(&self, caller: &Address, update: RegistryUpdate) -> Result<Self, AccessError> {
        self.access.require_owner(caller)?;
        let mut next = self.clone();
        match update {
            RegistryUpdate::RegisterModule { module, name } => {
                if module.is_zero() {
                    return Err(AccessError::ZeroAddress);
                }
                if next.modules.insert(module, name).is_some() {
                    return Err(AccessError::AlreadyRegistered);
                }
            }
            RegistryUpdate::DeregisterModule { module } => {
                if next.modules.remove(&module).is_none() {
                    return Err(AccessError::NotRegistered);
                }
            }
            RegistryUpdate::ChangeOwner { new_owner } => {
                next.access.change_owner(caller, new_owner)?;
            }
        }
        Ok(next)
    }
}
