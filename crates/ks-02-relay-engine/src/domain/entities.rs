//! # Domain Entities
//!
//! Wallet state and the request/outcome types of the relay pipeline.

use super::value_objects::{Asset, Bytes, CallData, Hash, Nonce, U256};
use crate::errors::WalletError;
use ks_01_signature_verification::EcdsaSignature;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::BTreeSet;
use uuid::Uuid;

// =============================================================================
// WALLET
// =============================================================================

/// Persistent record of one wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    /// Current owner. Never zero.
    pub owner: Address,
    /// Attached modules.
    pub modules: BTreeSet<Address>,
    /// Guardians, ascending. Never contains the owner.
    pub guardians: BTreeSet<Address>,
}

impl WalletRecord {
    /// Builds the record of a freshly initialized wallet.
    pub fn new(owner: Address, modules: impl IntoIterator<Item = Address>) -> Result<Self, WalletError> {
        if owner.is_zero() {
            return Err(WalletError::ZeroOwner);
        }
        let modules: BTreeSet<Address> = modules.into_iter().collect();
        if modules.is_empty() {
            return Err(WalletError::NoModules);
        }
        Ok(Self {
            owner,
            modules,
            guardians: BTreeSet::new(),
        })
    }

    /// True if `module` is attached.
    #[must_use]
    pub fn is_module(&self, module: &Address) -> bool {
        self.modules.contains(module)
    }

    /// True if `address` is a guardian.
    #[must_use]
    pub fn is_guardian(&self, address: &Address) -> bool {
        self.guardians.contains(address)
    }

    /// Number of guardians.
    #[must_use]
    pub fn guardian_count(&self) -> usize {
        self.guardians.len()
    }

    /// Adds a guardian.
    pub fn add_guardian(&mut self, guardian: Address) -> Result<(), WalletError> {
        if guardian.is_zero() {
            return Err(WalletError::ZeroGuardian);
        }
        if guardian == self.owner {
            return Err(WalletError::GuardianIsOwner);
        }
        if !self.guardians.insert(guardian) {
            return Err(WalletError::DuplicateGuardian);
        }
        Ok(())
    }

    /// Removes a guardian.
    pub fn revoke_guardian(&mut self, guardian: &Address) -> Result<(), WalletError> {
        if !self.guardians.remove(guardian) {
            return Err(WalletError::NotAGuardian);
        }
        Ok(())
    }

    /// Replaces the owner.
    pub fn set_owner(&mut self, new_owner: Address) -> Result<(), WalletError> {
        if new_owner.is_zero() {
            return Err(WalletError::ZeroOwner);
        }
        if self.guardians.contains(&new_owner) {
            return Err(WalletError::OwnerIsGuardian);
        }
        self.owner = new_owner;
        Ok(())
    }
}

// =============================================================================
// RELAY REQUEST
// =============================================================================

/// A transaction submitted on behalf of a wallet by a third party.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    /// Wallet the call acts on.
    pub wallet: Address,
    /// Module to invoke.
    pub target_module: Address,
    /// Module call. First argument word must be `wallet`.
    pub payload: CallData,
    /// Replay-protection nonce.
    pub nonce: Nonce,
    /// Gas price the owner agrees to refund at. Zero disables the refund.
    pub gas_price: U256,
    /// Gas the owner agrees to pay for.
    pub gas_limit: u64,
    /// Refund asset (`BASE_ASSET_ADDRESS` for the base asset).
    pub refund_token: Address,
    /// Refund recipient. Zero means the submitter.
    pub refund_address: Address,
    /// Signatures over the canonical request hash.
    pub signatures: Vec<EcdsaSignature>,
}

impl RelayRequest {
    /// Refund asset as a typed value.
    #[must_use]
    pub fn refund_asset(&self) -> Asset {
        Asset::from_address(self.refund_token)
    }
}

// =============================================================================
// SUBMISSION CONTEXT
// =============================================================================

/// Ledger block the relay executes in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block number.
    pub number: u64,
    /// Block timestamp (seconds).
    pub timestamp: u64,
}

impl BlockInfo {
    /// Block `number` produced at `timestamp`.
    #[must_use]
    pub const fn at(number: u64, timestamp: u64) -> Self {
        Self { number, timestamp }
    }
}

/// Facts about the submitting transaction, supplied by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaySubmission {
    /// Relayer identity paying for the transaction.
    pub submitter: Address,
    /// Gas attached by the submitter.
    pub gas_available: u64,
    /// Gas price the submitter actually pays.
    pub tx_gas_price: U256,
    /// Current block.
    pub block: BlockInfo,
}

/// A call made directly by a caller, without signatures or refund.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectCall {
    /// Identity making the call.
    pub caller: Address,
    /// Wallet the call acts on.
    pub wallet: Address,
    /// Module to invoke.
    pub target_module: Address,
    /// Module call data; its first argument must be `wallet`.
    pub payload: CallData,
    /// Block the call executes in.
    pub block: BlockInfo,
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Refund paid to a relayer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundReceipt {
    /// Asset paid.
    pub token: Address,
    /// Who received it.
    pub recipient: Address,
    /// Amount in `token` units.
    pub amount: U256,
    /// Amount in base-asset units (what counts against the daily limit).
    pub base_amount: U256,
    /// Gas charged.
    pub gas_consumed: u64,
}

/// Result of an accepted relay.
///
/// Accepted does not mean the module succeeded: a module failure yields
/// `success = false` with the nonce still consumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayOutcome {
    /// Whether the module call succeeded.
    pub success: bool,
    /// Module error message when `success` is false.
    pub error_detail: Option<String>,
    /// Module return data.
    pub return_data: Bytes,
    /// Canonical request hash (before EIP-191 wrapping).
    pub sign_hash: Hash,
    /// Gas metered for the relay, verification included.
    pub gas_used: u64,
    /// Refund, if one was paid.
    pub refund: Option<RefundReceipt>,
    /// Correlation id shared with the relay's log span and events.
    pub correlation_id: Uuid,
}
