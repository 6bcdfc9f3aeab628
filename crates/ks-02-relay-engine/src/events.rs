//! # Event Schema
//!
//! Events emitted by the engine and the modules it runs. Events produced
//! inside a relay are buffered and published only after the relay's ledger
//! transaction commits, so a rejected relay never emits anything.

use crate::domain::value_objects::{Bytes, Hash, U256};
use serde::{Deserialize, Serialize};
use shared_types::Address;
use uuid::Uuid;

/// Everything observable that the engine or a module can emit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayEvent {
    /// A wallet was initialised.
    WalletInitialised {
        /// Wallet identity.
        wallet: Address,
        /// First owner.
        owner: Address,
    },

    /// A relayed request was accepted (module may still have failed).
    TransactionExecuted {
        /// Wallet identity.
        wallet: Address,
        /// Whether the module call succeeded.
        success: bool,
        /// Module return data (empty on failure).
        return_data: Bytes,
        /// Canonical hash the signers signed.
        sign_hash: Hash,
        /// Correlation ID of the relay.
        correlation_id: Uuid,
    },

    /// The submitter of a relay was refunded from the wallet.
    Refund {
        /// Wallet identity.
        wallet: Address,
        /// Recipient of the refund.
        refund_address: Address,
        /// Asset identity (`BASE_ASSET_ADDRESS` for the base asset).
        refund_token: Address,
        /// Amount in units of `refund_token`.
        amount: U256,
    },

    /// A module was attached to or detached from a wallet.
    ModuleAuthorised {
        /// Wallet identity.
        wallet: Address,
        /// Module identity.
        module: Address,
        /// true = attached.
        value: bool,
    },

    /// Ownership of a wallet moved.
    OwnerChanged {
        /// Wallet identity.
        wallet: Address,
        /// New owner.
        new_owner: Address,
    },

    /// Guardian added.
    GuardianAdded {
        /// Wallet identity.
        wallet: Address,
        /// Guardian identity.
        guardian: Address,
    },

    /// Guardian revoked.
    GuardianRevoked {
        /// Wallet identity.
        wallet: Address,
        /// Guardian identity.
        guardian: Address,
    },

    /// Asset transferred out of a wallet by a module.
    Transfer {
        /// Wallet identity.
        wallet: Address,
        /// Asset identity.
        token: Address,
        /// Recipient.
        to: Address,
        /// Amount.
        amount: U256,
    },

    /// A daily-limit change was scheduled.
    LimitChangeScheduled {
        /// Wallet identity.
        wallet: Address,
        /// Limit after the security period.
        new_limit: U256,
        /// Timestamp from which `new_limit` applies.
        change_after: u64,
    },

    /// Module-specific event that has no dedicated variant.
    Module {
        /// Emitting module.
        module: Address,
        /// Wallet identity.
        wallet: Address,
        /// Event name, e.g. `RecoveryExecuted`.
        name: String,
        /// Event fields.
        fields: Vec<(String, String)>,
    },

    /// The module registry changed.
    RegistryUpdated {
        /// Modules registered after the update.
        module_count: usize,
        /// Registry owner after the update.
        owner: Address,
    },
}

impl RelayEvent {
    /// The wallet an event concerns, if any.
    #[must_use]
    pub fn wallet(&self) -> Option<Address> {
        match self {
            Self::WalletInitialised { wallet, .. }
            | Self::TransactionExecuted { wallet, .. }
            | Self::Refund { wallet, .. }
            | Self::ModuleAuthorised { wallet, .. }
            | Self::OwnerChanged { wallet, .. }
            | Self::GuardianAdded { wallet, .. }
            | Self::GuardianRevoked { wallet, .. }
            | Self::Transfer { wallet, .. }
            | Self::LimitChangeScheduled { wallet, .. }
            | Self::Module { wallet, .. } => Some(*wallet),
            Self::RegistryUpdated { .. } => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::WalletInitialised { .. } => "WalletInitialised",
            Self::TransactionExecuted { .. } => "TransactionExecuted",
            Self::Refund { .. } => "Refund",
            Self::ModuleAuthorised { .. } => "ModuleAuthorised",
            Self::OwnerChanged { .. } => "OwnerChanged",
            Self::GuardianAdded { .. } => "GuardianAdded",
            Self::GuardianRevoked { .. } => "GuardianRevoked",
            Self::Transfer { .. } => "Transfer",
            Self::LimitChangeScheduled { .. } => "LimitChangeScheduled",
            Self::Module { name, .. } => name,
            Self::RegistryUpdated { .. } => "RegistryUpdated",
        }
    }
}
