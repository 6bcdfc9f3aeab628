//! # Module Context
//!
//! The only door through which a module touches wallet state. Every write
//! goes to the relay's journaled ledger transaction and is charged against a
//! gas meter; events are buffered until the engine commits.

use crate::adapters::ledger::{LedgerTransaction, StorageSlot};
use crate::config::EngineConfig;
use crate::domain::daily_limit::DailyLimit;
use crate::domain::entities::{BlockInfo, WalletRecord};
use crate::domain::registry::ModuleRegistry;
use crate::domain::value_objects::{Asset, GasMeter, Hash, U256};
use crate::errors::{LedgerError, ModuleError, WalletError};
use crate::events::RelayEvent;
use crate::ports::outbound::PriceOracle;
use shared_types::Address;
use tracing::debug;

/// Who is calling the module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallOrigin {
    /// Called directly by `caller`.
    Direct {
        /// Identity making the call.
        caller: Address,
    },
    /// Relayed: the module is called as the engine.
    Relayed {
        /// Engine identity.
        engine: Address,
    },
}

impl CallOrigin {
    /// Identity the module sees as its immediate caller.
    #[must_use]
    pub const fn sender(&self) -> Address {
        match self {
            Self::Direct { caller } => *caller,
            Self::Relayed { engine } => *engine,
        }
    }
}

/// Execution context handed to [`crate::ports::WalletModule::execute`].
pub struct ModuleContext<'c, 'l> {
    tx: &'c mut LedgerTransaction<'l>,
    registry: &'c ModuleRegistry,
    prices: &'c dyn PriceOracle,
    config: &'c EngineConfig,
    wallet: Address,
    module: Address,
    origin: CallOrigin,
    block: BlockInfo,
    gas: GasMeter,
    events: Vec<RelayEvent>,
}

impl<'c, 'l> ModuleContext<'c, 'l> {
    /// Build a context for one module call.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        tx: &'c mut LedgerTransaction<'l>,
        registry: &'c ModuleRegistry,
        prices: &'c dyn PriceOracle,
        config: &'c EngineConfig,
        wallet: Address,
        module: Address,
        origin: CallOrigin,
        block: BlockInfo,
        gas: GasMeter,
    ) -> Self {
        Self {
            tx,
            registry,
            prices,
            config,
            wallet,
            module,
            origin,
            block,
            gas,
            events: Vec::new(),
        }
    }

    /// Gas used and events buffered by the call.
    pub(crate) fn finish(self) -> (u64, Vec<RelayEvent>) {
        (self.gas.used(), self.events)
    }

    // =========================================================================
    // CALL INFORMATION
    // =========================================================================

    /// Wallet the call acts on.
    #[must_use]
    pub const fn wallet_address(&self) -> Address {
        self.wallet
    }

    /// Module being executed.
    #[must_use]
    pub const fn module_address(&self) -> Address {
        self.module
    }

    /// Call origin.
    #[must_use]
    pub const fn origin(&self) -> CallOrigin {
        self.origin
    }

    /// Whether the call came through the relay path.
    #[must_use]
    pub const fn is_relayed(&self) -> bool {
        matches!(self.origin, CallOrigin::Relayed { .. })
    }

    /// Block the call executes in.
    #[must_use]
    pub const fn block(&self) -> BlockInfo {
        self.block
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        self.config
    }

    /// Gas used so far.
    #[must_use]
    pub const fn gas_used(&self) -> u64 {
        self.gas.used()
    }

    /// Gas left in the meter.
    #[must_use]
    pub const fn gas_remaining(&self) -> u64 {
        self.gas.remaining()
    }

    /// Charge `amount` gas. Exhaustion fails the module call.
    pub fn charge(&mut self, amount: u64) -> Result<(), ModuleError> {
        if self.gas.consume(amount) {
            Ok(())
        } else {
            debug!(amount, remaining = self.gas.remaining(), "Module ran out of gas");
            Err(ModuleError::OutOfGas)
        }
    }

    // =========================================================================
    // ACCESS CHECKS
    // =========================================================================

    /// Current wallet record.
    pub fn wallet(&self) -> Result<&WalletRecord, ModuleError> {
        self.tx
            .wallet(&self.wallet)
            .ok_or(ModuleError::Ledger(LedgerError::UnknownWallet(self.wallet)))
    }

    /// Caller must be the owner or an attached module. A relayed call passes
    /// only if the engine itself is attached.
    pub fn require_owner_or_module(&self) -> Result<(), ModuleError> {
        let wallet = self.wallet()?;
        let allowed = match self.origin {
            CallOrigin::Direct { caller } => caller == wallet.owner || wallet.is_module(&caller),
            CallOrigin::Relayed { engine } => wallet.is_module(&engine),
        };
        if allowed {
            Ok(())
        } else {
            Err(ModuleError::NotOwnerOrModule)
        }
    }

    /// Caller must be the owner, calling directly.
    pub fn require_direct_owner(&self) -> Result<(), ModuleError> {
        let owner = self.wallet()?.owner;
        match self.origin {
            CallOrigin::Direct { caller } if caller == owner => Ok(()),
            _ => Err(ModuleError::NotWalletOwner),
        }
    }

    /// Caller must be the owner directly, or the call must be relayed (the
    /// engine has already checked the signatures).
    pub fn require_owner_or_relayed(&self) -> Result<(), ModuleError> {
        if self.is_relayed() {
            return Ok(());
        }
        self.require_direct_owner()
    }

    // =========================================================================
    // WALLET ADMINISTRATION
    // =========================================================================

    fn update_wallet(
        &mut self,
        update: impl FnOnce(&mut WalletRecord) -> Result<(), WalletError>,
    ) -> Result<(), ModuleError> {
        self.charge(self.config.gas_schedule.storage_write)?;
        let mut record = self.wallet()?.clone();
        if !record.is_module(&self.module) {
            return Err(WalletError::NotAttached.into());
        }
        update(&mut record)?;
        self.tx.put_wallet(self.wallet, record);
        Ok(())
    }

    /// Attach (`value = true`) or detach a module. Attaching requires the
    /// module to be registered; redundant calls are no-ops.
    pub fn authorize_module(&mut self, module: Address, value: bool) -> Result<(), ModuleError> {
        if value && !self.registry.is_registered(&module) {
            return Err(WalletError::ModuleNotRegistered(module).into());
        }
        let attached = self.wallet()?.is_module(&module);
        if attached == value {
            return Ok(());
        }
        self.update_wallet(|record| {
            if value {
                record.modules.insert(module);
            } else {
                record.modules.remove(&module);
            }
            Ok(())
        })?;
        self.emit(RelayEvent::ModuleAuthorised {
            wallet: self.wallet,
            module,
            value,
        });
        Ok(())
    }

    /// Replace the wallet owner.
    pub fn set_owner(&mut self, new_owner: Address) -> Result<(), ModuleError> {
        self.update_wallet(|record| record.set_owner(new_owner))?;
        self.emit(RelayEvent::OwnerChanged {
            wallet: self.wallet,
            new_owner,
        });
        Ok(())
    }

    /// Add a guardian.
    pub fn add_guardian(&mut self, guardian: Address) -> Result<(), ModuleError> {
        self.update_wallet(|record| record.add_guardian(guardian))?;
        self.emit(RelayEvent::GuardianAdded {
            wallet: self.wallet,
            guardian,
        });
        Ok(())
    }

    /// Revoke a guardian.
    pub fn revoke_guardian(&mut self, guardian: Address) -> Result<(), ModuleError> {
        self.update_wallet(|record| record.revoke_guardian(&guardian))?;
        self.emit(RelayEvent::GuardianRevoked {
            wallet: self.wallet,
            guardian,
        });
        Ok(())
    }

    // =========================================================================
    // ASSETS
    // =========================================================================

    /// Wallet balance of `asset`.
    #[must_use]
    pub fn balance_of(&self, asset: Asset) -> U256 {
        self.tx.balance_of(&self.wallet, asset)
    }

    /// Transfer `amount` of `asset` from the wallet to `to`.
    pub fn transfer(&mut self, asset: Asset, to: Address, amount: U256) -> Result<(), ModuleError> {
        self.charge(self.config.gas_schedule.transfer)?;
        self.tx.transfer(&self.wallet, &to, asset, amount)?;
        self.emit(RelayEvent::Transfer {
            wallet: self.wallet,
            token: asset.to_address(),
            to,
            amount,
        });
        Ok(())
    }

    /// Base-asset price of `token`.
    #[must_use]
    pub fn price_of(&self, token: &Address) -> Option<U256> {
        self.prices.price_of(token)
    }

    // =========================================================================
    // DAILY LIMIT
    // =========================================================================

    /// Wallet daily limit (the configured default if never set).
    #[must_use]
    pub fn daily_limit(&self) -> DailyLimit {
        self.tx
            .daily_limit(&self.wallet)
            .unwrap_or_else(|| DailyLimit::new(self.config.default_daily_limit))
    }

    /// Replace the wallet's limit state.
    pub fn put_daily_limit(&mut self, limit: DailyLimit) -> Result<(), ModuleError> {
        self.charge(self.config.gas_schedule.storage_write)?;
        self.tx.put_daily_limit(self.wallet, limit);
        Ok(())
    }

    /// Account `amount` against the limit; fails with a revert when above.
    pub fn spend_daily_limit(&mut self, amount: U256) -> Result<(), ModuleError> {
        let next = self
            .daily_limit()
            .spend(amount, self.block.timestamp, self.config.limit_period_secs)
            .map_err(|_| ModuleError::revert("above daily limit"))?;
        self.put_daily_limit(next)
    }

    /// Reset the spent amount of the current window.
    pub fn reset_daily_spent(&mut self) -> Result<(), ModuleError> {
        let next = self.daily_limit().reset_spent(self.block.timestamp);
        self.put_daily_limit(next)
    }

    /// Schedule a limit change after the security period.
    pub fn schedule_limit_change(&mut self, new_limit: U256) -> Result<(), ModuleError> {
        let next = self.daily_limit().schedule_change(
            new_limit,
            self.block.timestamp,
            self.config.limit_security_period_secs,
        );
        self.put_daily_limit(next)?;
        self.emit(RelayEvent::LimitChangeScheduled {
            wallet: self.wallet,
            new_limit,
            change_after: next.change_after,
        });
        Ok(())
    }

    // =========================================================================
    // MODULE STORAGE
    // =========================================================================

    fn slot(&self, key: Hash) -> StorageSlot {
        StorageSlot {
            module: self.module,
            wallet: self.wallet,
            key,
        }
    }

    /// Read a module storage slot of this wallet.
    pub fn storage_get(&mut self, key: Hash) -> Result<U256, ModuleError> {
        self.charge(self.config.gas_schedule.storage_read)?;
        Ok(self.tx.storage(&self.slot(key)))
    }

    /// Write a module storage slot of this wallet.
    pub fn storage_set(&mut self, key: Hash, value: U256) -> Result<(), ModuleError> {
        self.charge(self.config.gas_schedule.storage_write)?;
        let slot = self.slot(key);
        self.tx.set_storage(slot, value);
        Ok(())
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Buffer an event; published only if the relay commits.
    pub fn emit(&mut self, event: RelayEvent) {
        self.events.push(event);
    }

    /// Buffer a module-specific event.
    pub fn emit_module_event(&mut self, name: &str, fields: Vec<(String, String)>) {
        self.events.push(RelayEvent::Module {
            module: self.module,
            wallet: self.wallet,
            name: name.to_string(),
            fields,
        });
    }
}
