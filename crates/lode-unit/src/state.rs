//! Persistent unit record and the collaborators a unit runs against.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use lode_core::error::UnitError;
use lode_core::traits::{Clock, FeeSchedule, RewardLedger, RoleGate};
use lode_core::types::{Address, Category, LifecycleState, UnitKind};

/// Construction parameters for a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitParams {
    /// Address under which the unit holds its pool on the ledger.
    pub address: Address,
    pub kind: UnitKind,
    /// Raw category, validated against `0..=5`.
    pub category: u8,
    pub owner: Address,
    /// Required non-zero for pool-based units.
    pub referral: Address,
    /// Identity of the reward token the ledger tracks.
    pub reward_token: Address,
}

/// Complete mutable record of one unit.
///
/// Everything needed to rebuild a unit lives here; [`MiningUnit::snapshot`]
/// and [`MiningUnit::restore`] round-trip through it.
///
/// [`MiningUnit::snapshot`]: crate::MiningUnit::snapshot
/// [`MiningUnit::restore`]: crate::MiningUnit::restore
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct UnitState {
    pub address: Address,
    pub reward_token: Address,
    pub kind: UnitKind,
    pub category: Category,
    /// Zeroed while stopped.
    pub owner: Address,
    /// Zeroed while stopped.
    pub referral: Address,
    pub lifecycle: LifecycleState,
    /// Owner has started the accrual clock. Independent of `lifecycle`.
    pub mining: bool,
    /// Set by the first activation of a pool-based unit, after the
    /// exact-funding check passed. Never cleared.
    #[serde(default)]
    pub funded: bool,
    /// Half the category capacity, fixed at first funded activation.
    pub first_year_allocation: u64,
    /// Epoch day through which rewards have been paid.
    pub last_settlement_day: u64,
    /// Days already paid for. Indexes the decay schedule.
    pub cumulative_mined_days: u64,
    /// Epoch day the mining clock last (re)started.
    pub mining_since_day: u64,
    /// Absorbing kill switch.
    pub terminated: bool,
}

impl UnitState {
    /// Validate construction parameters and build the initial record.
    pub fn new(params: UnitParams, today: u64) -> Result<Self, UnitError> {
        let category = Category::new(params.category)?;
        if params.address.is_zero() {
            return Err(UnitError::InvalidConstruction("unit address is zero".into()));
        }
        if params.owner.is_zero() {
            return Err(UnitError::InvalidConstruction("owner is zero".into()));
        }
        if params.kind.is_pool_based() && params.referral.is_zero() {
            return Err(UnitError::InvalidConstruction(
                "referral is zero for a pool-based unit".into(),
            ));
        }
        Ok(Self {
            address: params.address,
            reward_token: params.reward_token,
            kind: params.kind,
            category,
            owner: params.owner,
            referral: params.referral,
            lifecycle: LifecycleState::Deactivated,
            mining: false,
            funded: false,
            first_year_allocation: 0,
            last_settlement_day: today,
            cumulative_mined_days: 0,
            mining_since_day: today,
            terminated: false,
        })
    }

    /// Whether a settlement would do anything other than no-op.
    pub fn accrual_eligible(&self) -> bool {
        self.kind.is_pool_based() && self.lifecycle == LifecycleState::Activated && self.mining
    }

    /// Whether the owner-visible mining indicator is on.
    pub fn is_mining(&self) -> bool {
        self.lifecycle == LifecycleState::Activated && self.mining
    }

    /// Restart the mining clock at `today`. Never moves either marker back.
    pub fn restart_clock(&mut self, today: u64) {
        self.last_settlement_day = self.last_settlement_day.max(today);
        self.mining_since_day = self.mining_since_day.max(today);
    }
}

/// The external collaborators a unit consults.
#[derive(Clone)]
pub struct UnitContext {
    pub roles: Arc<dyn RoleGate>,
    pub schedule: Arc<dyn FeeSchedule>,
    pub ledger: Arc<dyn RewardLedger>,
    pub clock: Arc<dyn Clock>,
}

impl UnitContext {
    pub fn new(
        roles: Arc<dyn RoleGate>,
        schedule: Arc<dyn FeeSchedule>,
        ledger: Arc<dyn RewardLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            roles,
            schedule,
            ledger,
            clock,
        }
    }
}

impl fmt::Debug for UnitContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitContext").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> UnitParams {
        UnitParams {
            address: Address::derive("unit"),
            kind: UnitKind::PoolBased,
            category: 2,
            owner: Address::derive("owner"),
            referral: Address::derive("referral"),
            reward_token: Address::derive("token"),
        }
    }

    #[test]
    fn initial_state() {
        let st = UnitState::new(params(), 500).unwrap();
        assert_eq!(st.lifecycle, LifecycleState::Deactivated);
        assert!(!st.mining);
        assert!(!st.terminated);
        assert!(!st.funded);
        assert_eq!(st.first_year_allocation, 0);
        assert_eq!(st.last_settlement_day, 500);
        assert_eq!(st.cumulative_mined_days, 0);
        assert_eq!(st.category.get(), 2);
    }

    #[test]
    fn rejects_bad_category() {
        let p = UnitParams { category: 6, ..params() };
        assert!(matches!(UnitState::new(p, 0), Err(UnitError::InvalidConstruction(_))));
    }

    #[test]
    fn rejects_zero_owner() {
        let p = UnitParams { owner: Address::ZERO, ..params() };
        assert!(matches!(UnitState::new(p, 0), Err(UnitError::InvalidConstruction(_))));
    }

    #[test]
    fn rejects_zero_unit_address() {
        let p = UnitParams { address: Address::ZERO, ..params() };
        assert!(matches!(UnitState::new(p, 0), Err(UnitError::InvalidConstruction(_))));
    }

    #[test]
    fn referral_required_only_for_pool_based() {
        let pool = UnitParams { referral: Address::ZERO, ..params() };
        assert!(UnitState::new(pool, 0).is_err());

        let inert = UnitParams {
            kind: UnitKind::NonPoolBased,
            referral: Address::ZERO,
            ..params()
        };
        assert!(UnitState::new(inert, 0).is_ok());
    }

    #[test]
    fn eligibility_needs_all_three_conditions() {
        let mut st = UnitState::new(params(), 0).unwrap();
        assert!(!st.accrual_eligible());
        st.lifecycle = LifecycleState::Activated;
        assert!(!st.accrual_eligible());
        st.mining = true;
        assert!(st.accrual_eligible());
        assert!(st.is_mining());
        st.kind = UnitKind::NonPoolBased;
        assert!(!st.accrual_eligible());
        assert!(st.is_mining());
        st.lifecycle = LifecycleState::Suspended;
        assert!(!st.is_mining());
    }

    #[test]
    fn restart_clock_never_moves_back() {
        let mut st = UnitState::new(params(), 100).unwrap();
        st.restart_clock(90);
        assert_eq!(st.last_settlement_day, 100);
        st.restart_clock(120);
        assert_eq!(st.last_settlement_day, 120);
        assert_eq!(st.mining_since_day, 120);
    }

    #[test]
    fn bincode_roundtrip() {
        let st = UnitState::new(params(), 42).unwrap();
        let encoded = bincode::encode_to_vec(&st, bincode::config::standard()).unwrap();
        let (decoded, _): (UnitState, usize) =
            bincode::decode_from_slice(&encoded, bincode::config::standard()).unwrap();
        assert_eq!(st, decoded);
    }
}
