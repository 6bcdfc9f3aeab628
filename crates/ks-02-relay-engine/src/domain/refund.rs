//! # Refund Planning
//!
//! Decides whether a relayed call is refunded and for how much. Pure: the
//! engine applies the plan (daily limit, transfer) inside the relay's
//! ledger transaction.

use super::value_objects::{Asset, OwnerSignatureRequirement, U256};
use crate::config::GasSchedule;
use crate::errors::RelayError;
use shared_types::Address;

/// Token prices are base-asset units per 10^18 token units.
pub const PRICE_SCALE: u64 = 1_000_000_000_000_000_000;

/// Facts needed to plan a refund.
#[derive(Clone, Copy, Debug)]
pub struct RefundInput {
    /// Gas price the owner signed.
    pub gas_price: U256,
    /// Gas price the submitter pays.
    pub tx_gas_price: U256,
    /// Gas metered for the relay so far.
    pub metered_gas: u64,
    /// Gas limit the owner signed.
    pub gas_limit: u64,
    /// Asset to refund in.
    pub asset: Asset,
    /// Signed refund recipient (zero = submitter).
    pub refund_address: Address,
    /// Relayer identity.
    pub submitter: Address,
    /// Owner requirement of the executed operation.
    pub owner_requirement: OwnerSignatureRequirement,
    /// Whether the module call succeeded.
    pub module_succeeded: bool,
}

/// Why no refund is paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Signed gas price is zero.
    ZeroGasPrice,
    /// Owner did not sign, so never consented to pay.
    OwnerExcluded,
    /// Module call failed.
    ModuleFailed,
}

/// A refund to pay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefundPlan {
    /// Asset paid.
    pub asset: Asset,
    /// Recipient.
    pub recipient: Address,
    /// Gas charged, capped at the signed limit.
    pub gas_consumed: u64,
    /// Value in base units (checked against the daily limit).
    pub base_amount: U256,
    /// Value in `asset` units.
    pub amount: U256,
}

/// Outcome of planning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefundDecision {
    /// Nothing to pay.
    Skipped(SkipReason),
    /// Pay according to the plan.
    Pay(RefundPlan),
}

/// Plans the refund for a relay.
///
/// `price_of` is consulted only for token refunds.
pub fn plan_refund(
    input: &RefundInput,
    schedule: &GasSchedule,
    price_of: impl FnOnce(Address) -> Option<U256>,
) -> Result<RefundDecision, RelayError> {
    if input.gas_price.is_zero() {
        return Ok(RefundDecision::Skipped(SkipReason::ZeroGasPrice));
    }
    if input.owner_requirement == OwnerSignatureRequirement::AnyoneButOwner {
        return Ok(RefundDecision::Skipped(SkipReason::OwnerExcluded));
    }
    if !input.module_succeeded {
        return Ok(RefundDecision::Skipped(SkipReason::ModuleFailed));
    }

    let overhead = if input.asset.is_base() {
        schedule.refund_overhead_base
    } else {
        schedule.refund_overhead_token
    };
    let gas_consumed = input
        .metered_gas
        .saturating_add(overhead)
        .min(input.gas_limit);
    let price = input.gas_price.min(input.tx_gas_price);
    let base_amount = U256::from(gas_consumed)
        .checked_mul(price)
        .ok_or_else(|| RelayError::RefundTransferFailed("refund amount overflow".into()))?;

    let amount = match input.asset {
        Asset::Base => base_amount,
        Asset::Token(token) => {
            let rate = price_of(token)
                .filter(|rate| !rate.is_zero())
                .ok_or(RelayError::PriceUnavailable { token })?;
            base_amount
                .checked_mul(U256::from(PRICE_SCALE))
                .ok_or_else(|| RelayError::RefundTransferFailed("refund amount overflow".into()))?
                / rate
        }
    };

    let recipient = if input.refund_address.is_zero() {
        input.submitter
    } else {
        input.refund_address
    };

    Ok(RefundDecision::Pay(RefundPlan {
        asset: input.asset,
        recipient,
        gas_consumed,
        base_amount,
        amount,
    }))
}
