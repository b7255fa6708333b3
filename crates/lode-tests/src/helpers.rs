//! Shared fixtures for the integration tests.

use std::sync::Arc;

use lode_core::clock::ManualClock;
use lode_core::constants::required_funding;
use lode_core::error::UnitError;
use lode_core::ledger::MemoryLedger;
use lode_core::roles::StaticRoleGate;
use lode_core::schedule::{StandardFeeSchedule, TableFeeSchedule};
use lode_core::traits::{FeeSchedule, RewardLedger};
use lode_core::types::{Address, UnitKind};
use lode_unit::{MiningUnit, UnitConfig, UnitContext, UnitParams};

/// Epoch day every harness clock starts on.
pub const START_DAY: u64 = 20_000;

pub fn addr(label: &str) -> Address {
    Address::derive(label)
}

pub fn admin() -> Address {
    addr("core-team")
}

pub fn supervisor() -> Address {
    addr("supervisor")
}

pub fn operator() -> Address {
    addr("operator")
}

pub fn owner() -> Address {
    addr("owner")
}

pub fn referral() -> Address {
    addr("referral")
}

pub fn unit_address() -> Address {
    addr("unit")
}

/// Small schedule with round numbers: category 2 has capacity 1000 and
/// period 0 pays `allocation * 100 / 1000` per day. Later periods decay
/// 100, 90, 80, ... 10, then zero.
pub fn small_schedule() -> TableFeeSchedule {
    let coefficients = (1..=10).rev().map(|i| i * 10).collect();
    TableFeeSchedule::new([100, 500, 1_000, 5_000, 10_000, 50_000], coefficients, 1_000)
        .expect("non-zero scale")
}

/// A unit wired to in-memory collaborators.
pub struct Harness {
    pub unit: MiningUnit,
    pub ledger: Arc<MemoryLedger>,
    pub clock: Arc<ManualClock>,
    pub roles: Arc<StaticRoleGate>,
    pub schedule: Arc<dyn FeeSchedule>,
}

pub struct HarnessBuilder {
    kind: UnitKind,
    category: u8,
    schedule: Arc<dyn FeeSchedule>,
    config: UnitConfig,
}

impl HarnessBuilder {
    pub fn kind(mut self, kind: UnitKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn category(mut self, category: u8) -> Self {
        self.category = category;
        self
    }

    pub fn schedule(mut self, schedule: impl FeeSchedule + 'static) -> Self {
        self.schedule = Arc::new(schedule);
        self
    }

    pub fn standard_schedule(mut self) -> Self {
        self.schedule = Arc::new(StandardFeeSchedule::new());
        self
    }

    pub fn config(mut self, config: UnitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Harness {
        self.try_build().expect("valid unit params")
    }

    pub fn try_build(self) -> Result<Harness, UnitError> {
        let ledger = Arc::new(MemoryLedger::new());
        let clock = Arc::new(ManualClock::at_day(START_DAY));
        let roles = Arc::new(
            StaticRoleGate::new()
                .with_operator(operator())
                .with_core_team(admin())
                .with_supervisor(supervisor()),
        );
        let ctx = UnitContext::new(
            roles.clone(),
            self.schedule.clone(),
            ledger.clone(),
            clock.clone(),
        );
        let params = UnitParams {
            address: unit_address(),
            kind: self.kind,
            category: self.category,
            owner: owner(),
            referral: referral(),
            reward_token: addr("lode-token"),
        };
        let unit = MiningUnit::new(params, ctx, self.config)?;
        Ok(Harness {
            unit,
            ledger,
            clock,
            roles,
            schedule: self.schedule,
        })
    }
}

impl Harness {
    /// Pool-based category 2 unit on [`small_schedule`].
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            kind: UnitKind::PoolBased,
            category: 2,
            schedule: Arc::new(small_schedule()),
            config: UnitConfig::default(),
        }
    }

    /// Capacity plus the 10% referral surplus for this unit's category.
    pub fn required_funding(&self) -> u64 {
        let capacity = self.schedule.capacity_for_category(self.unit.category());
        required_funding(capacity).expect("no overflow")
    }

    pub fn fund(&self, amount: u64) {
        self.ledger.mint(&unit_address(), amount).expect("mint");
    }

    /// Fund exactly and activate.
    pub fn activate(&mut self) {
        self.fund(self.required_funding());
        self.unit.activate(&admin()).expect("activate");
    }

    /// Fund, activate and start mining.
    pub fn start_mining(&mut self) {
        self.activate();
        self.unit.start_mining(&owner()).expect("start mining");
    }

    pub fn balance(&self, who: &Address) -> u64 {
        self.ledger.balance_of(who)
    }
}
