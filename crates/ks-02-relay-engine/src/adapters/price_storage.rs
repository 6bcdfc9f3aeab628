//! # Token Price Storage
//!
//! Managed price table used to convert base-asset refunds into tokens.
//! Only managers may write prices; the owner manages the managers.

use crate::domain::access::Managed;
use crate::domain::value_objects::U256;
use crate::errors::AccessError;
use crate::ports::outbound::PriceOracle;
use parking_lot::RwLock;
use shared_types::Address;
use std::collections::HashMap;
use tracing::debug;

/// Price table: base-asset value of one token, scaled by 10^18.
#[derive(Debug)]
pub struct TokenPriceStorage {
    access: RwLock<Managed>,
    prices: RwLock<HashMap<Address, U256>>,
}

impl TokenPriceStorage {
    /// Create a table owned by `owner`.
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self {
            access: RwLock::new(Managed::new(owner)),
            prices: RwLock::new(HashMap::new()),
        }
    }

    /// Set the price of `token`. Managers only.
    pub fn set_price(&self, caller: &Address, token: Address, price: U256) -> Result<(), AccessError> {
        self.access.read().require_manager(caller)?;
        debug!(%token, %price, "Token price set");
        self.prices.write().insert(token, price);
        Ok(())
    }

    /// Owner adds a manager.
    pub fn add_manager(&self, caller: &Address, manager: Address) -> Result<(), AccessError> {
        self.access.write().add_manager(caller, manager)
    }

    /// Owner revokes a manager.
    pub fn revoke_manager(&self, caller: &Address, manager: &Address) -> Result<(), AccessError> {
        self.access.write().revoke_manager(caller, manager)
    }

    /// Owner hands over ownership.
    pub fn change_owner(&self, caller: &Address, new_owner: Address) -> Result<(), AccessError> {
        self.access.write().change_owner(caller, new_owner)
    }

    /// Whether `address` may set prices.
    #[must_use]
    pub fn is_manager(&self, address: &Address) -> bool {
        self.access.read().is_manager(address)
    }
}

impl PriceOracle for TokenPriceStorage {
    fn price_of(&self, token: &Address) -> Option<U256> {
        self.prices.read().get(token).copied()
    }
}
