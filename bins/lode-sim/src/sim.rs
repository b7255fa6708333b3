//! Scripted single-unit simulation on a manual clock.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use lode_core::clock::ManualClock;
use lode_core::constants::required_funding;
use lode_core::error::UnitError;
use lode_core::ledger::MemoryLedger;
use lode_core::roles::StaticRoleGate;
use lode_core::schedule::StandardFeeSchedule;
use lode_core::traits::{FeeSchedule, RewardLedger};
use lode_core::types::{Address, UnitKind};
use lode_unit::{MiningUnit, UnitConfig, UnitContext, UnitEvent, UnitParams};

use crate::config::SimConfig;

/// End-of-run totals, in base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub category: u8,
    pub funded: u64,
    pub first_year_allocation: u64,
    pub owner_total: u64,
    pub referral_total: u64,
    pub remaining: u64,
    pub cumulative_mined_days: u64,
    pub settlements: u64,
    /// Collections refused because the payout would have been zero.
    pub zero_payouts: u64,
}

struct Cast {
    admin: Address,
    owner: Address,
    referral: Address,
}

impl Cast {
    fn new() -> Self {
        Self {
            admin: Address::derive("sim/core-team"),
            owner: Address::derive("sim/owner"),
            referral: Address::derive("sim/referral"),
        }
    }
}

/// Run the scenario, handing every committed event to `on_event` in order.
pub fn run(cfg: &SimConfig, mut on_event: impl FnMut(&UnitEvent) -> Result<()>) -> Result<Report> {
    cfg.validate()?;
    let cast = Cast::new();

    let ledger = Arc::new(MemoryLedger::new());
    let clock = Arc::new(ManualClock::at_day(cfg.start_day));
    let schedule = Arc::new(StandardFeeSchedule::new());
    let roles = StaticRoleGate::new().with_core_team(cast.admin);
    let ctx = UnitContext::new(Arc::new(roles), schedule.clone(), ledger.clone(), clock.clone());

    let params = UnitParams {
        address: Address::derive("sim/unit"),
        kind: UnitKind::PoolBased,
        category: cfg.category,
        owner: cast.owner,
        referral: cast.referral,
        reward_token: Address::derive("sim/lode"),
    };
    let config = UnitConfig::default().with_collect_policy(cfg.collect_policy);
    let mut unit = MiningUnit::new(params, ctx, config).context("failed to create unit")?;

    let capacity = schedule.capacity_for_category(unit.category());
    let funded = required_funding(capacity).context("funding overflows")?;
    ledger
        .mint(&unit.address(), funded)
        .context("failed to fund unit")?;
    unit.activate(&cast.admin).context("activation failed")?;
    unit.start_mining(&cast.owner).context("start mining failed")?;
    info!(category = cfg.category, funded, days = cfg.days, "simulation started");

    let mut settlements = 0;
    let mut zero_payouts = 0;
    for event in unit.drain_events() {
        on_event(&event)?;
    }

    for day in 1..=cfg.days {
        clock.advance_days(1);
        if day % cfg.collect_every != 0 && day != cfg.days {
            continue;
        }
        match unit.collect(&cast.owner) {
            Ok(_) => {}
            Err(UnitError::ZeroPayout { owner, referral }) => {
                warn!(day, owner, referral, "collection refused: zero payout");
                zero_payouts += 1;
            }
            Err(e) => return Err(e).with_context(|| format!("collect failed on day {day}")),
        }
        for event in unit.drain_events() {
            if matches!(event, UnitEvent::Settled { .. }) {
                settlements += 1;
            }
            on_event(&event)?;
        }
    }

    let report = Report {
        category: cfg.category,
        funded,
        first_year_allocation: unit.first_year_allocation(),
        owner_total: ledger.balance_of(&cast.owner),
        referral_total: ledger.balance_of(&cast.referral),
        remaining: unit.held_balance(),
        cumulative_mined_days: unit.cumulative_mined_days(),
        settlements,
        zero_payouts,
    };
    info!(
        owner_total = report.owner_total,
        referral_total = report.referral_total,
        remaining = report.remaining,
        "simulation finished"
    );
    Ok(report)
}
