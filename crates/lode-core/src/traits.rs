//! Trait interfaces for the collaborators a mining unit consumes.
//!
//! These traits define the seams between a unit and the outside world:
//! - [`RoleGate`] — membership in the three administrative roles
//! - [`FeeSchedule`] — category capacities and per-period fee coefficients
//! - [`RewardLedger`] — the fungible token ledger holding the unit's funds
//! - [`Clock`] — wall-clock time in Unix seconds

use crate::clock::epoch_day;
use crate::error::LedgerError;
use crate::types::{Address, Category};

/// Three independent yes/no role registries.
///
/// Each predicate is queried with the caller's address. Implementations
/// must be side-effect free.
pub trait RoleGate: Send + Sync {
    /// Whether `who` may run routine operations such as collecting on the
    /// owner's behalf.
    fn is_system_operator(&self, who: &Address) -> bool;

    /// Whether `who` may activate, deactivate, migrate and terminate units.
    fn is_core_team_admin(&self, who: &Address) -> bool;

    /// Whether `who` may suspend, resume, stop and reset units.
    fn is_supervisor(&self, who: &Address) -> bool;
}

/// Fixed lookup table of capacities and decay coefficients.
///
/// The per-day payout of a unit is
/// `first_year_allocation * fee_coefficient(period) / scale_factor()`.
pub trait FeeSchedule: Send + Sync {
    /// Total reward capacity of a category, in base units.
    fn capacity_for_category(&self, category: Category) -> u64;

    /// Fee coefficient for a period index, scaled by [`scale_factor`](Self::scale_factor).
    ///
    /// The table is treated as opaque: callers must not assume it is
    /// monotonic or follows any closed form.
    fn fee_coefficient(&self, period_index: u64) -> u64;

    /// Fixed-point denominator for [`fee_coefficient`](Self::fee_coefficient).
    fn scale_factor(&self) -> u64;
}

/// One leg of a ledger batch transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub to: Address,
    pub amount: u64,
}

/// Fungible token ledger with safe-transfer semantics.
///
/// Each unit holds its reward pool on the ledger under its own address.
pub trait RewardLedger: Send + Sync {
    /// Current balance of `holder`.
    fn balance_of(&self, holder: &Address) -> u64;

    /// Move `amount` from `from` to `to`.
    ///
    /// All-or-nothing: on error no balance changes.
    fn transfer(&self, from: &Address, to: &Address, amount: u64) -> Result<(), LedgerError>;

    /// Move several amounts out of `from` as one atomic batch.
    ///
    /// Either every leg is applied or none is. Implementations must not
    /// leave a partially applied batch behind.
    fn transfer_batch(&self, from: &Address, legs: &[Transfer]) -> Result<(), LedgerError>;
}

/// Wall-clock source in Unix seconds.
///
/// Any `Fn() -> u64` closure is a clock, which keeps ad-hoc test clocks
/// one line long.
pub trait Clock: Send + Sync {
    /// Current Unix time in seconds.
    fn now(&self) -> u64;

    /// Current epoch day (`now() / 86_400`, truncating).
    fn today(&self) -> u64 {
        epoch_day(self.now())
    }
}

impl<F> Clock for F
where
    F: Fn() -> u64 + Send + Sync,
{
    fn now(&self) -> u64 {
        self()
    }
}
