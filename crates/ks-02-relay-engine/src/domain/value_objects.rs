//! # Value Objects
//!
//! Immutable primitives of the relay domain. These types are defined by
//! their value, not identity.

use crate::errors::RelayError;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::fmt;

// Re-export shared primitives for convenience
pub use shared_types::{Bytes, CallData, Hash, Nonce, Selector, U256};

// =============================================================================
// OWNER SIGNATURE REQUIREMENT
// =============================================================================

/// Where, if anywhere, the wallet owner's signature must appear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerSignatureRequirement {
    /// Owner must sign, at index 0, exactly once.
    RequiredOwnerFirst,
    /// Owner may sign; only a leading owner signature is special.
    OptionalOwner,
    /// Owner must not sign at all.
    AnyoneButOwner,
}

// =============================================================================
// AUTHORIZATION DESCRIPTOR
// =============================================================================

/// Quorum a module publishes for one of its operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationDescriptor {
    /// Exact number of signatures the relay must carry.
    pub required_signatures: usize,
    /// Owner signature placement rule.
    pub owner_requirement: OwnerSignatureRequirement,
}

impl AuthorizationDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub const fn new(required_signatures: usize, owner_requirement: OwnerSignatureRequirement) -> Self {
        Self {
            required_signatures,
            owner_requirement,
        }
    }

    /// One owner signature.
    #[must_use]
    pub const fn owner_only() -> Self {
        Self::new(1, OwnerSignatureRequirement::RequiredOwnerFirst)
    }

    /// Zero required signatures is only meaningful when the owner is
    /// excluded (anyone may trigger the operation).
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.required_signatures == 0
            && self.owner_requirement != OwnerSignatureRequirement::AnyoneButOwner
        {
            return Err(RelayError::MalformedDescriptor {
                required: self.required_signatures,
                requirement: self.owner_requirement,
            });
        }
        Ok(())
    }

    /// True when guardians take part in the quorum.
    #[must_use]
    pub const fn involves_guardians(&self) -> bool {
        self.required_signatures > 1
    }

    /// True when the wallet's shared nonce guards the operation. Operations
    /// that exclude the owner are guarded by their sign hash instead.
    #[must_use]
    pub fn uses_wallet_nonce(&self) -> bool {
        self.owner_requirement != OwnerSignatureRequirement::AnyoneButOwner
    }
}

// =============================================================================
// ASSET
// =============================================================================

/// Sentinel address that denotes the base asset in call data and requests.
pub const BASE_ASSET_ADDRESS: Address = Address([0xee; 20]);

/// Something a wallet can hold: the base asset or a token.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Asset {
    /// The ledger's native asset.
    Base,
    /// A token identified by its contract address.
    Token(Address),
}

impl Asset {
    /// Interprets an address argument. `BASE_ASSET_ADDRESS` is the base asset.
    #[must_use]
    pub fn from_address(address: Address) -> Self {
        if address == BASE_ASSET_ADDRESS {
            Self::Base
        } else {
            Self::Token(address)
        }
    }

    /// Address form of the asset.
    #[must_use]
    pub const fn to_address(&self) -> Address {
        match self {
            Self::Base => BASE_ASSET_ADDRESS,
            Self::Token(address) => *address,
        }
    }

    /// Returns true for the base asset.
    #[must_use]
    pub const fn is_base(&self) -> bool {
        matches!(self, Self::Base)
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "Base"),
            Self::Token(address) => write!(f, "Token({address:?})"),
        }
    }
}

// =============================================================================
// GAS METER
// =============================================================================

/// Gas budget for module execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GasMeter {
    /// Gas limit for this execution context.
    limit: u64,
    /// Gas consumed so far.
    used: u64,
}

impl GasMeter {
    /// Creates a new gas meter with the given limit.
    #[must_use]
    pub const fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    /// Meter with no practical limit (direct calls).
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(u64::MAX)
    }

    /// Returns the gas limit.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns gas used so far.
    #[must_use]
    pub const fn used(&self) -> u64 {
        self.used
    }

    /// Returns remaining gas.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }

    /// Consumes gas. Returns false, leaving usage unchanged, if insufficient.
    pub fn consume(&mut self, amount: u64) -> bool {
        if self.used.saturating_add(amount) > self.limit {
            false
        } else {
            self.used = self.used.saturating_add(amount);
            true
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
