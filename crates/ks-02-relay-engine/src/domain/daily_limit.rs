//! # Daily Limit
//!
//! Rolling spending window of a wallet. A limit of `U256::MAX` is the
//! disabled state: nothing is accounted.

use super::value_objects::U256;
use crate::errors::RelayError;
use serde::{Deserialize, Serialize};

/// Limit state of one wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLimit {
    /// Active limit.
    pub limit: U256,
    /// Spent in the window that started at `period_start`.
    pub daily_spent: U256,
    /// Start of the current window (seconds). Zero before the first spend.
    pub period_start: u64,
    /// Limit that replaces `limit` once `change_after` has passed.
    pub pending_limit: Option<U256>,
    /// Activation time of `pending_limit`.
    pub change_after: u64,
}

impl DailyLimit {
    /// Limit with nothing spent.
    #[must_use]
    pub const fn new(limit: U256) -> Self {
        Self {
            limit,
            daily_spent: U256([0u64; 4]),
            period_start: 0,
            pending_limit: None,
            change_after: 0,
        }
    }

    /// The disabled limit.
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(U256::MAX)
    }

    /// Limit in force at `now`, honouring a matured pending change.
    #[must_use]
    pub fn current_limit(&self, now: u64) -> U256 {
        match self.pending_limit {
            Some(pending) if now >= self.change_after => pending,
            _ => self.limit,
        }
    }

    /// True if the limit in force at `now` is disabled.
    #[must_use]
    pub fn is_disabled(&self, now: u64) -> bool {
        self.current_limit(now) == U256::MAX
    }

    /// Spent so far in the window containing `now`.
    #[must_use]
    pub fn spent_at(&self, now: u64, period_secs: u64) -> U256 {
        if self.window_expired(now, period_secs) {
            U256::zero()
        } else {
            self.daily_spent
        }
    }

    /// Amount still spendable at `now`.
    #[must_use]
    pub fn available(&self, now: u64, period_secs: u64) -> U256 {
        self.current_limit(now)
            .saturating_sub(self.spent_at(now, period_secs))
    }

    /// Returns the state after spending `amount`, or `AboveDailyLimit`.
    ///
    /// Matured pending limits are folded in. A disabled limit accepts any
    /// amount and records nothing.
    pub fn spend(&self, amount: U256, now: u64, period_secs: u64) -> Result<Self, RelayError> {
        let mut next = self.settled(now);
        if next.limit == U256::MAX {
            return Ok(next);
        }

        // Nothing spent yet means no open window: this spend opens one.
        let opens_window = next.window_expired(now, period_secs) || next.daily_spent.is_zero();
        let spent = if opens_window { U256::zero() } else { next.daily_spent };
        let total = spent
            .checked_add(amount)
            .ok_or(RelayError::AboveDailyLimit)?;
        if total > next.limit {
            return Err(RelayError::AboveDailyLimit);
        }

        if opens_window {
            next.period_start = now;
        }
        next.daily_spent = total;
        Ok(next)
    }

    /// Returns the state with the current window's spend cleared.
    #[must_use]
    pub fn reset_spent(&self, now: u64) -> Self {
        let mut next = self.settled(now);
        next.daily_spent = U256::zero();
        next
    }

    /// Schedules `new_limit` to take effect after `security_period_secs`.
    #[must_use]
    pub fn schedule_change(&self, new_limit: U256, now: u64, security_period_secs: u64) -> Self {
        let mut next = self.settled(now);
        next.pending_limit = Some(new_limit);
        next.change_after = now.saturating_add(security_period_secs);
        next
    }

    fn settled(&self, now: u64) -> Self {
        let mut next = *self;
        if let Some(pending) = self.pending_limit {
            if now >= self.change_after {
                next.limit = pending;
                next.pending_limit = None;
                next.change_after = 0;
            }
        }
        next
    }

    fn window_expired(&self, now: u64, period_secs: u64) -> bool {
        now >= self.period_start.saturating_add(period_secs)
    }
}

impl Default for DailyLimit {
    fn default() -> Self {
        Self::disabled()
    }
}
