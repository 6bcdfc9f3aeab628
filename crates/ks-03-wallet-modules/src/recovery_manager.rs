//! # Recovery Manager
//!
//! Guardian-driven ownership recovery in three steps:
//!
//! 1. `executeRecovery`: a majority of guardians (owner excluded) starts
//!    recovery to a new owner.
//! 2. `finalizeRecovery`: anyone completes it once the recovery period has
//!    elapsed, making the recovery address the owner.
//! 3. `cancelRecovery`: a majority of guardians plus owner, owner optional,
//!    aborts a pending recovery.

use crate::base::{
    add_module, guardian_majority, non_zero_address, selector_of, AddModuleAccess, ADD_MODULE,
};
use ks_02_relay_engine::prelude::{
    AuthorizationDescriptor, Bytes, CallData, Hash, ModuleContext, ModuleError,
    OwnerSignatureRequirement, Selector, WalletModule, WalletRecord, U256,
};
use lazy_static::lazy_static;
use shared_types::{keccak256, Address};
use tracing::info;

lazy_static! {
    /// `executeRecovery(wallet, recovery)`.
    pub static ref EXECUTE_RECOVERY: Selector =
        Selector::from_signature("executeRecovery(address,address)");
    /// `finalizeRecovery(wallet)`.
    pub static ref FINALIZE_RECOVERY: Selector = Selector::from_signature("finalizeRecovery(address)");
    /// `cancelRecovery(wallet)`.
    pub static ref CANCEL_RECOVERY: Selector = Selector::from_signature("cancelRecovery(address)");

    static ref RECOVERY_ADDRESS_KEY: Hash = keccak256(b"recovery.address");
    static ref RECOVERY_EXECUTE_AFTER_KEY: Hash = keccak256(b"recovery.execute_after");
}

/// Default delay between `executeRecovery` and `finalizeRecovery`.
pub const DEFAULT_RECOVERY_PERIOD_SECS: u64 = 36 * 60 * 60;

/// Pending recovery of a wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingRecovery {
    /// Future owner.
    pub recovery: Address,
    /// Earliest finalization timestamp.
    pub execute_after: u64,
}

/// Guardian-driven recovery.
#[derive(Clone, Debug)]
pub struct RecoveryManager {
    address: Address,
    recovery_period_secs: u64,
}

impl RecoveryManager {
    /// Module deployed at `address` with the default recovery period.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self::with_period(address, DEFAULT_RECOVERY_PERIOD_SECS)
    }

    /// Module with a custom recovery period.
    #[must_use]
    pub const fn with_period(address: Address, recovery_period_secs: u64) -> Self {
        Self {
            address,
            recovery_period_secs,
        }
    }

    fn pending(ctx: &mut ModuleContext<'_, '_>) -> Result<Option<PendingRecovery>, ModuleError> {
        let word = ctx.storage_get(*RECOVERY_ADDRESS_KEY)?;
        if word.is_zero() {
            return Ok(None);
        }
        let mut bytes = [0u8; 32];
        word.to_big_endian(&mut bytes);
        let recovery = Address::from_slice(&bytes[12..])
            .ok_or_else(|| ModuleError::revert("corrupt recovery address"))?;
        let execute_after = ctx.storage_get(*RECOVERY_EXECUTE_AFTER_KEY)?.low_u64();
        Ok(Some(PendingRecovery {
            recovery,
            execute_after,
        }))
    }

    fn store(ctx: &mut ModuleContext<'_, '_>, pending: Option<PendingRecovery>) -> Result<(), ModuleError> {
        let (address, after) = pending.map_or((U256::zero(), U256::zero()), |p| {
            (U256::from_big_endian(&p.recovery.to_word()), U256::from(p.execute_after))
        });
        ctx.storage_set(*RECOVERY_ADDRESS_KEY, address)?;
        ctx.storage_set(*RECOVERY_EXECUTE_AFTER_KEY, after)
    }

    fn execute_recovery(
        &self,
        ctx: &mut ModuleContext<'_, '_>,
        call: &CallData,
    ) -> Result<(), ModuleError> {
        let recovery = non_zero_address(call, 1, "recovery")?;
        let wallet = ctx.wallet()?;
        if recovery == wallet.owner {
            return Err(ModuleError::revert("recovery address is the owner"));
        }
        if wallet.is_guardian(&recovery) {
            return Err(ModuleError::revert("recovery address cannot be a guardian"));
        }
        if Self::pending(ctx)?.is_some() {
            return Err(ModuleError::revert("ongoing recovery"));
        }
        let execute_after = ctx.block().timestamp.saturating_add(self.recovery_period_secs);
        Self::store(
            ctx,
            Some(PendingRecovery {
                recovery,
                execute_after,
            }),
        )?;
        info!(wallet = %ctx.wallet_address(), %recovery, execute_after, "Recovery started");
        ctx.emit_module_event(
            "RecoveryExecuted",
            vec![
                ("recovery".into(), recovery.to_hex()),
                ("execute_after".into(), execute_after.to_string()),
            ],
        );
        Ok(())
    }

    fn finalize_recovery(ctx: &mut ModuleContext<'_, '_>) -> Result<(), ModuleError> {
        let pending = Self::pending(ctx)?.ok_or_else(|| ModuleError::revert("no ongoing recovery"))?;
        if ctx.block().timestamp < pending.execute_after {
            return Err(ModuleError::revert("recovery period not elapsed"));
        }
        Self::store(ctx, None)?;
        ctx.set_owner(pending.recovery)?;
        info!(wallet = %ctx.wallet_address(), new_owner = %pending.recovery, "Recovery finalized");
        ctx.emit_module_event(
            "RecoveryFinalized",
            vec![("recovery".into(), pending.recovery.to_hex())],
        );
        Ok(())
    }

    fn cancel_recovery(ctx: &mut ModuleContext<'_, '_>) -> Result<(), ModuleError> {
        let pending = Self::pending(ctx)?.ok_or_else(|| ModuleError::revert("no ongoing recovery"))?;
        Self::store(ctx, None)?;
        info!(wallet = %ctx.wallet_address(), recovery = %pending.recovery, "Recovery canceled");
        ctx.emit_module_event(
            "RecoveryCanceled",
            vec![("recovery".into(), pending.recovery.to_hex())],
        );
        Ok(())
    }
}

impl WalletModule for RecoveryManager {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        "RecoveryManager"
    }

    fn authorization_descriptor(
        &self,
        selector: &Selector,
        wallet: &WalletRecord,
    ) -> Option<AuthorizationDescriptor> {
        let guardians = wallet.guardian_count();
        if *selector == *EXECUTE_RECOVERY {
            // Without guardians nobody but the owner could ever sign.
            (guardians > 0).then(|| {
                AuthorizationDescriptor::new(
                    guardian_majority(guardians),
                    OwnerSignatureRequirement::AnyoneButOwner,
                )
            })
        } else if *selector == *FINALIZE_RECOVERY {
            Some(AuthorizationDescriptor::new(0, OwnerSignatureRequirement::AnyoneButOwner))
        } else if *selector == *CANCEL_RECOVERY {
            Some(AuthorizationDescriptor::new(
                guardian_majority(guardians + 1),
                OwnerSignatureRequirement::OptionalOwner,
            ))
        } else if *selector == *ADD_MODULE {
            Some(AuthorizationDescriptor::owner_only())
        } else {
            None
        }
    }

    fn execute(&self, ctx: &mut ModuleContext<'_, '_>, call: &CallData) -> Result<Bytes, ModuleError> {
        let selector = selector_of(call)?;
        if selector == *EXECUTE_RECOVERY {
            if !ctx.is_relayed() {
                return Err(ModuleError::NotRelayed);
            }
            self.execute_recovery(ctx, call)?;
        } else if selector == *FINALIZE_RECOVERY {
            Self::finalize_recovery(ctx)?;
        } else if selector == *CANCEL_RECOVERY {
            Self::cancel_recovery(ctx)?;
        } else if selector == *ADD_MODULE {
            return add_module(ctx, call, AddModuleAccess::DirectOwner);
        } else {
            return Err(ModuleError::UnknownOperation(selector));
        }
        Ok(Bytes::new())
    }
}
