//! Accrual engine: elapsed whole days to owed tokens.
//!
//! The per-day payout is `allocation * coefficient(period) / scale` with
//! `period = cumulative_mined_days / 10`. The coefficient table is opaque,
//! so the engine re-reads it at every period boundary crossed by a
//! settlement and holds the per-day amount fixed in between.
//!
//! A settlement is planned against an immutable [`UnitState`], checked
//! (both shares strictly positive), and only then applied to a draft.

use serde::{Deserialize, Serialize};
use tracing::debug;

use lode_core::constants::{period_index, referral_share, PERIOD_LENGTH_DAYS};
use lode_core::error::UnitError;
use lode_core::traits::{FeeSchedule, Transfer};

use crate::state::UnitState;

/// Amounts paid by one settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    /// Whole days covered.
    pub days: u64,
    pub owner_amount: u64,
    /// `owner_amount * 10 / 100`, paid on top of the owner amount.
    pub referral_amount: u64,
}

impl Payout {
    /// Total leaving the unit's pool.
    pub fn total(&self) -> u64 {
        self.owner_amount.saturating_add(self.referral_amount)
    }
}

/// A checked, not yet applied settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub payout: Payout,
    /// Epoch day the settlement pays through.
    pub settle_day: u64,
    pub cumulative_after: u64,
}

impl Settlement {
    /// Advance the draft's bookkeeping: cumulative days and the settlement
    /// day move together, and the mining clock restarts at the settle day.
    pub fn apply(&self, state: &mut UnitState) {
        state.cumulative_mined_days = self.cumulative_after;
        state.last_settlement_day = self.settle_day;
        state.mining_since_day = self.settle_day;
    }

    /// Ledger legs paying the owner and the referral beneficiary.
    pub fn legs(&self, state: &UnitState) -> [Transfer; 2] {
        [
            Transfer {
                to: state.owner,
                amount: self.payout.owner_amount,
            },
            Transfer {
                to: state.referral,
                amount: self.payout.referral_amount,
            },
        ]
    }
}

/// Settlement calculator over a [`FeeSchedule`].
#[derive(Clone, Copy)]
pub struct AccrualEngine<'a> {
    schedule: &'a dyn FeeSchedule,
}

impl<'a> AccrualEngine<'a> {
    pub fn new(schedule: &'a dyn FeeSchedule) -> Self {
        Self { schedule }
    }

    /// Per-day payout for a period: `allocation * coefficient / scale`, truncating.
    pub fn daily_amount(&self, allocation: u64, period: u64) -> Result<u64, UnitError> {
        let scale = self.schedule.scale_factor();
        if scale == 0 {
            return Err(UnitError::ArithmeticOverflow);
        }
        let coefficient = self.schedule.fee_coefficient(period);
        let amount = (allocation as u128)
            .checked_mul(coefficient as u128)
            .ok_or(UnitError::ArithmeticOverflow)?
            / scale as u128;
        u64::try_from(amount).map_err(|_| UnitError::ArithmeticOverflow)
    }

    /// Sum of per-day payouts for `days` days starting at `cumulative_mined_days`.
    ///
    /// Walks one period boundary at a time. The per-day amount is recomputed
    /// exactly on the days where `(cumulative + offset) % 10 == 0` and held
    /// fixed until the next boundary, so a run of `n` days inside one period
    /// contributes `n * per_day`, the same as adding `per_day` n times.
    pub fn accrue(
        &self,
        allocation: u64,
        cumulative_mined_days: u64,
        days: u64,
    ) -> Result<u64, UnitError> {
        let mut total: u64 = 0;
        let mut mined = cumulative_mined_days;
        let mut remaining = days;

        while remaining > 0 {
            let per_day = self.daily_amount(allocation, period_index(mined))?;
            let to_boundary = PERIOD_LENGTH_DAYS - mined % PERIOD_LENGTH_DAYS;
            let run = to_boundary.min(remaining);

            let run_amount = per_day
                .checked_mul(run)
                .ok_or(UnitError::ArithmeticOverflow)?;
            total = total
                .checked_add(run_amount)
                .ok_or(UnitError::ArithmeticOverflow)?;

            mined = mined.checked_add(run).ok_or(UnitError::ArithmeticOverflow)?;
            remaining -= run;
        }

        Ok(total)
    }

    /// Plan the settlement owed at epoch day `today`.
    ///
    /// Returns `Ok(None)` when the unit is not accruing (not pool-based, not
    /// activated, or mining off) or no whole day has elapsed.
    ///
    /// # Errors
    ///
    /// - [`UnitError::ZeroPayout`] if the owner or referral share would be zero
    /// - [`UnitError::ArithmeticOverflow`] on overflow or a zero scale factor
    pub fn plan(&self, state: &UnitState, today: u64) -> Result<Option<Settlement>, UnitError> {
        if !state.accrual_eligible() {
            debug!(unit = %state.address, "settlement skipped: unit not accruing");
            return Ok(None);
        }
        let days = today.saturating_sub(state.last_settlement_day);
        if days == 0 {
            debug!(unit = %state.address, today, "settlement skipped: no elapsed day");
            return Ok(None);
        }

        let owner_amount =
            self.accrue(state.first_year_allocation, state.cumulative_mined_days, days)?;
        let referral_amount = referral_share(owner_amount);
        if owner_amount == 0 || referral_amount == 0 {
            return Err(UnitError::ZeroPayout {
                owner: owner_amount,
                referral: referral_amount,
            });
        }

        let cumulative_after = state
            .cumulative_mined_days
            .checked_add(days)
            .ok_or(UnitError::ArithmeticOverflow)?;

        Ok(Some(Settlement {
            payout: Payout {
                days,
                owner_amount,
                referral_amount,
            },
            settle_day: today,
            cumulative_after,
        }))
    }
}
