//! # Access Control
//!
//! `Owned` and `Managed` roles for infrastructure objects (module registry,
//! token price storage).

use crate::errors::AccessError;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::BTreeSet;
use tracing::info;

/// Single-owner access control.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owned {
    owner: Address,
}

impl Owned {
    /// Creates an object owned by `owner`.
    #[must_use]
    pub const fn new(owner: Address) -> Self {
        Self { owner }
    }

    /// Current owner.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Fails unless `caller` is the owner.
    pub fn require_owner(&self, caller: &Address) -> Result<(), AccessError> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(AccessError::NotOwner)
        }
    }

    /// Transfers ownership.
    pub fn change_owner(&mut self, caller: &Address, new_owner: Address) -> Result<(), AccessError> {
        self.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(AccessError::ZeroAddress);
        }
        info!(previous = %self.owner, new = %new_owner, "Owner changed");
        self.owner = new_owner;
        Ok(())
    }
}

/// Owner plus a set of managers allowed to operate the object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Managed {
    owned: Owned,
    managers: BTreeSet<Address>,
}

impl Managed {
    /// Creates an object owned by `owner` with no managers.
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self {
            owned: Owned::new(owner),
            managers: BTreeSet::new(),
        }
    }

    /// Owner role.
    #[must_use]
    pub const fn owned(&self) -> &Owned {
        &self.owned
    }

    /// Transfers ownership.
    pub fn change_owner(&mut self, caller: &Address, new_owner: Address) -> Result<(), AccessError> {
        self.owned.change_owner(caller, new_owner)
    }

    /// True if `address` is a manager.
    #[must_use]
    pub fn is_manager(&self, address: &Address) -> bool {
        self.managers.contains(address)
    }

    /// Fails unless `caller` is a manager.
    pub fn require_manager(&self, caller: &Address) -> Result<(), AccessError> {
        if self.is_manager(caller) {
            Ok(())
        } else {
            Err(AccessError::NotManager)
        }
    }

    /// Adds a manager. Adding an existing manager is a no-op.
    pub fn add_manager(&mut self, caller: &Address, manager: Address) -> Result<(), AccessError> {
        self.owned.require_owner(caller)?;
        if manager.is_zero() {
            return Err(AccessError::ZeroAddress);
        }
        if self.managers.insert(manager) {
            info!(%manager, "Manager added");
        }
        Ok(())
    }

    /// Revokes a manager.
    pub fn revoke_manager(&mut self, caller: &Address, manager: &Address) -> Result<(), AccessError> {
        self.owned.require_owner(caller)?;
        if !self.managers.remove(manager) {
            return Err(AccessError::ManagerNotFound);
        }
        info!(%manager, "Manager revoked");
        Ok(())
    }
}
