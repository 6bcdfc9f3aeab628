//! # Error Types
//!
//! All error types for relay validation, module execution and the ledger.

use crate::domain::value_objects::{Asset, OwnerSignatureRequirement};
use ks_01_signature_verification::SignatureError;
use shared_types::{Address, CallDataError, Selector, U256};
use thiserror::Error;

// =============================================================================
// RELAY ERRORS
// =============================================================================

/// Reasons a relay or direct invocation is rejected.
///
/// Every variant is a hard gate: a rejected call leaves no trace in the
/// ledger (no nonce consumed, no daily-limit change, no module effect).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Nonce already consumed, stale, zero or too far ahead.
    #[error("duplicate request")]
    DuplicateOrStaleNonce,

    /// Target module is not attached to the wallet.
    #[error("module not authorised: {module:?}")]
    ModuleNotAuthorized {
        /// The target module.
        module: Address,
    },

    /// Payload does not start with a word holding the wallet address.
    #[error("target of call data does not match wallet")]
    WalletMismatch,

    /// Zero required signatures with a requirement other than `AnyoneButOwner`.
    #[error("wrong signature requirement: {required} with {requirement:?}")]
    MalformedDescriptor {
        /// Published signer count.
        required: usize,
        /// Published owner requirement.
        requirement: OwnerSignatureRequirement,
    },

    /// Number of signatures differs from the descriptor.
    #[error("wrong number of signatures: expected {expected}, got {actual}")]
    WrongSignatureCount {
        /// Required count.
        expected: usize,
        /// Supplied count.
        actual: usize,
    },

    /// A signature could not be recovered.
    #[error("invalid signature at index {index}: {source}")]
    InvalidSignature {
        /// Position in the supplied list.
        index: usize,
        /// Recovery failure.
        source: SignatureError,
    },

    /// A non-owner signer is not a guardian of the wallet.
    #[error("unauthorized signer: {signer:?}")]
    UnauthorizedSigner {
        /// The recovered signer.
        signer: Address,
    },

    /// The same signer appears twice in a row.
    #[error("duplicate signer: {signer:?}")]
    DuplicateSigner {
        /// The repeated signer.
        signer: Address,
    },

    /// Signers are not in strictly ascending order.
    #[error("signers not in ascending order at index {index}")]
    SignerOrderViolated {
        /// Index of the first out-of-order signer.
        index: usize,
    },

    /// Owner signature missing from position 0, or repeated.
    #[error("owner signature must come first")]
    OwnerSignaturePositionViolated,

    /// Owner signed an operation the owner may not approve.
    #[error("owner signature not allowed")]
    OwnerSignaturePresentWhenForbidden,

    /// Submitter attached less gas than the request's limit.
    #[error("not enough gas provided: limit {required}, available {available}")]
    InsufficientGas {
        /// Gas required by the policy.
        required: u64,
        /// Gas attached.
        available: u64,
    },

    /// Refund would exceed the wallet's daily limit.
    #[error("refund is above daily limit")]
    AboveDailyLimit,

    /// Module rejected the call on the direct path.
    #[error("module execution failed: {0}")]
    ModuleExecutionFailed(String),

    /// Operation forbidden by the deny-list.
    #[error("disabled method {selector} on {module:?}")]
    DisabledMethod {
        /// Target module.
        module: Address,
        /// Forbidden selector.
        selector: Selector,
    },

    /// Module publishes no descriptor for the selector, or is not deployed.
    #[error("unsupported operation {selector} on {module:?}")]
    UnsupportedOperation {
        /// Target module.
        module: Address,
        /// Unknown selector.
        selector: Selector,
    },

    /// Wallet was never initialized.
    #[error("unknown wallet: {0:?}")]
    UnknownWallet(Address),

    /// Direct caller may not invoke this operation.
    #[error("caller not authorised: {caller:?}")]
    UnauthorizedCaller {
        /// The direct caller.
        caller: Address,
    },

    /// No usable price for the refund token.
    #[error("no price for refund token {token:?}")]
    PriceUnavailable {
        /// Refund token.
        token: Address,
    },

    /// Wallet could not pay the refund.
    #[error("refund transfer failed: {0}")]
    RefundTransferFailed(String),
}

impl RelayError {
    /// Stable label for metrics and logs.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::DuplicateOrStaleNonce => "duplicate_or_stale_nonce",
            Self::ModuleNotAuthorized { .. } => "module_not_authorized",
            Self::WalletMismatch => "wallet_mismatch",
            Self::MalformedDescriptor { .. } => "malformed_descriptor",
            Self::WrongSignatureCount { .. } => "wrong_signature_count",
            Self::InvalidSignature { .. } => "invalid_signature",
            Self::UnauthorizedSigner { .. } => "unauthorized_signer",
            Self::DuplicateSigner { .. } => "duplicate_signer",
            Self::SignerOrderViolated { .. } => "signer_order_violated",
            Self::OwnerSignaturePositionViolated => "owner_signature_position_violated",
            Self::OwnerSignaturePresentWhenForbidden => "owner_signature_present_when_forbidden",
            Self::InsufficientGas { .. } => "insufficient_gas",
            Self::AboveDailyLimit => "above_daily_limit",
            Self::ModuleExecutionFailed(_) => "module_execution_failed",
            Self::DisabledMethod { .. } => "disabled_method",
            Self::UnsupportedOperation { .. } => "unsupported_operation",
            Self::UnknownWallet(_) => "unknown_wallet",
            Self::UnauthorizedCaller { .. } => "unauthorized_caller",
            Self::PriceUnavailable { .. } => "price_unavailable",
            Self::RefundTransferFailed(_) => "refund_transfer_failed",
        }
    }
}

// =============================================================================
// MODULE ERRORS
// =============================================================================

/// Errors raised by module code. Never interpreted by the engine: on the
/// relayed path they become `success = false` with the message as detail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// Caller is neither the owner nor an attached module.
    #[error("must be owner or module")]
    NotOwnerOrModule,

    /// Operation requires a direct call from the wallet owner.
    #[error("must be wallet owner")]
    NotWalletOwner,

    /// Operation may only run through the relay engine.
    #[error("must be called through the relayer")]
    NotRelayed,

    /// Module gas meter exhausted.
    #[error("out of gas")]
    OutOfGas,

    /// Selector not implemented by `execute`.
    #[error("unknown operation {0}")]
    UnknownOperation(Selector),

    /// Payload could not be decoded.
    #[error("invalid call data: {0}")]
    InvalidCall(#[from] CallDataError),

    /// Wallet state update rejected.
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// Ledger update rejected.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Module-specific rejection.
    #[error("{0}")]
    Revert(String),
}

impl ModuleError {
    /// Module-specific rejection with a message.
    pub fn revert(message: impl Into<String>) -> Self {
        Self::Revert(message.into())
    }
}

// =============================================================================
// WALLET ERRORS
// =============================================================================

/// Errors from wallet lifecycle and membership updates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// `init` called twice.
    #[error("wallet already initialised")]
    AlreadyInitialized,

    /// Owner would be the zero identity.
    #[error("owner cannot be the zero address")]
    ZeroOwner,

    /// `init` with no modules.
    #[error("empty modules")]
    NoModules,

    /// Module is not in the registry.
    #[error("module is not registered")]
    ModuleNotRegistered(Address),

    /// Owner cannot also be a guardian.
    #[error("owner cannot be a guardian")]
    GuardianIsOwner,

    /// New owner is currently a guardian.
    #[error("new owner cannot be a guardian")]
    OwnerIsGuardian,

    /// Guardian would be the zero identity.
    #[error("guardian cannot be the zero address")]
    ZeroGuardian,

    /// Guardian already present.
    #[error("duplicate guardian")]
    DuplicateGuardian,

    /// Guardian not present.
    #[error("not a guardian")]
    NotAGuardian,

    /// Wallet administration attempted by a module that is not attached.
    #[error("caller is not an attached module")]
    NotAttached,
}

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors from balance movements.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Holder cannot cover a transfer.
    #[error("insufficient balance of {asset:?}: required {required}, available {available}")]
    InsufficientBalance {
        /// Asset moved.
        asset: Asset,
        /// Amount requested.
        required: U256,
        /// Holder balance.
        available: U256,
    },

    /// Wallet record missing.
    #[error("unknown wallet: {0:?}")]
    UnknownWallet(Address),
}

// =============================================================================
// ACCESS ERRORS
// =============================================================================

/// Errors from `Owned` / `Managed` infrastructure objects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Caller is not the owner.
    #[error("must be owner")]
    NotOwner,

    /// Caller is not a manager.
    #[error("must be manager")]
    NotManager,

    /// Address argument is zero.
    #[error("address must not be zero")]
    ZeroAddress,

    /// Manager to revoke does not exist.
    #[error("target is not a manager")]
    ManagerNotFound,

    /// Module already registered.
    #[error("module already registered")]
    AlreadyRegistered,

    /// Module to deregister is not registered.
    #[error("module not registered")]
    NotRegistered,
}
