//! Accrual and settlement tests against whole units.

use proptest::prelude::*;

use lode_core::constants::{first_year_allocation, CATEGORY_CAPACITY, COIN, PERIOD_LENGTH_DAYS};
use lode_core::error::UnitError;
use lode_core::traits::FeeSchedule;
use lode_tests::helpers::*;
use lode_unit::{AccrualEngine, UnitEvent};

#[test]
fn ten_days_in_category_two() {
    let mut h = Harness::builder().build();
    h.fund(1_100);
    h.unit.activate(&admin()).unwrap();
    assert_eq!(h.unit.first_year_allocation(), 500);

    h.unit.start_mining(&owner()).unwrap();
    h.clock.advance_days(10);

    let c0 = h.schedule.fee_coefficient(0);
    let scale = h.schedule.scale_factor();
    let payout = h.unit.collect(&owner()).unwrap().unwrap();
    assert_eq!(payout.owner_amount, 10 * (500 * c0 / scale));
    assert_eq!(payout.referral_amount, payout.owner_amount * 10 / 100);
    assert_eq!(h.unit.cumulative_mined_days(), 10);
    assert_eq!(h.unit.last_settlement_day(), START_DAY + 10);
    assert_eq!(h.balance(&owner()), payout.owner_amount);
    assert_eq!(h.balance(&referral()), payout.referral_amount);
}

#[test]
fn zero_elapsed_days_is_silent() {
    let mut h = Harness::builder().build();
    h.start_mining();
    h.clock.advance_secs(86_399);
    let before = h.unit.snapshot();
    let events = h.unit.events().len();

    assert_eq!(h.unit.collect(&owner()).unwrap(), None);
    assert_eq!(h.unit.snapshot(), before);
    assert_eq!(h.unit.events().len(), events);
    assert_eq!(h.balance(&owner()), 0);
}

#[test]
fn boundary_day_switches_coefficient() {
    let mut h = Harness::builder().build();
    h.start_mining();
    h.fund(10_000);

    // Settle through cumulative day 9, leaving day index 9 in period 0.
    h.clock.advance_days(9);
    assert_eq!(h.unit.collect(&owner()).unwrap().unwrap().owner_amount, 9 * 50);

    // Day 9 pays period 0, days 10 and 11 pay period 1.
    h.clock.advance_days(3);
    let payout = h.unit.collect(&owner()).unwrap().unwrap();
    assert_eq!(payout.owner_amount, 50 + 2 * 45);
    assert_eq!(h.unit.cumulative_mined_days(), 12);
}

#[test]
fn one_settlement_may_span_several_periods() {
    let mut h = Harness::builder().build();
    h.start_mining();
    h.fund(10_000);
    h.clock.advance_days(35);

    let payout = h.unit.collect(&owner()).unwrap().unwrap();
    assert_eq!(payout.owner_amount, 10 * 50 + 10 * 45 + 10 * 40 + 5 * 35);
    assert_eq!(payout.days, 35);
}

#[test]
fn tiny_payout_fails_until_referral_is_positive() {
    // Category 0: allocation 50, so 50 * 100 / 1000 = 5 per day.
    let mut h = Harness::builder().category(0).build();
    h.start_mining();
    h.clock.advance_days(1);
    assert_eq!(
        h.unit.collect(&owner()),
        Err(UnitError::ZeroPayout { owner: 5, referral: 0 })
    );
    assert_eq!(h.unit.cumulative_mined_days(), 0);

    h.clock.advance_days(1);
    let payout = h.unit.collect(&owner()).unwrap().unwrap();
    assert_eq!((payout.owner_amount, payout.referral_amount), (10, 1));
    assert_eq!(payout.days, 2);
}

#[test]
fn suspended_and_idle_days_are_never_paid() {
    let mut h = Harness::builder().build();
    h.start_mining();
    h.fund(10_000);

    h.clock.advance_days(4);
    h.unit.suspend(&supervisor()).unwrap();
    h.clock.advance_days(20);
    h.unit.resume(&supervisor()).unwrap();
    h.clock.advance_days(2);
    h.unit.stop_mining(&owner()).unwrap();
    h.clock.advance_days(50);
    h.unit.start_mining(&owner()).unwrap();
    h.clock.advance_days(1);
    h.unit.collect(&owner()).unwrap();

    assert_eq!(h.unit.cumulative_mined_days(), 7);
    assert_eq!(h.balance(&owner()), 7 * 50);
}

#[test]
fn settled_events_match_balances() {
    let mut h = Harness::builder().build();
    h.start_mining();
    h.fund(10_000);
    for step in [3, 9, 1, 14] {
        h.clock.advance_days(step);
        h.unit.collect(&operator()).unwrap();
    }

    let (owner_total, referral_total) = h
        .unit
        .events()
        .iter()
        .filter_map(|e| match e {
            UnitEvent::Settled { payout, .. } => {
                Some((payout.owner_amount, payout.referral_amount))
            }
            _ => None,
        })
        .fold((0, 0), |(o, r), (po, pr)| (o + po, r + pr));
    assert_eq!(owner_total, h.balance(&owner()));
    assert_eq!(referral_total, h.balance(&referral()));
}

#[test]
fn standard_schedule_full_horizon_fits_funding() {
    let mut h = Harness::builder().standard_schedule().category(5).build();
    h.start_mining();
    let funded = h.required_funding();
    assert_eq!(h.unit.first_year_allocation(), first_year_allocation(CATEGORY_CAPACITY[5]));

    h.clock.advance_days(1_200);
    let payout = h.unit.collect(&owner()).unwrap().unwrap();
    assert!(payout.total() <= funded);
    assert_eq!(h.balance(&unit_address()), funded - payout.total());

    // Past the end of the table nothing more can be settled.
    h.clock.advance_days(1);
    assert!(matches!(
        h.unit.collect(&owner()),
        Err(UnitError::ZeroPayout { owner: 0, .. })
    ));
}

#[test]
fn pending_reward_previews_exactly() {
    let mut h = Harness::builder().standard_schedule().category(3).build();
    h.start_mining();
    h.clock.advance_days(47);
    let preview = h.unit.pending_reward().unwrap().unwrap();
    assert_eq!(preview.days, 47);
    assert!(preview.owner_amount > 40 * COIN);
    assert_eq!(h.unit.collect(&owner()).unwrap(), Some(preview));
    assert_eq!(h.unit.pending_reward().unwrap(), None);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Collecting on any cadence pays the owner exactly what one settlement
    /// over the same days would.
    #[test]
    fn owner_total_is_cadence_independent(
        category in 0u8..=5,
        cadence in proptest::collection::vec(1u64..40, 1..30),
    ) {
        let mut h = Harness::builder().standard_schedule().category(category).build();
        h.start_mining();
        let allocation = h.unit.first_year_allocation();

        let mut days = 0;
        for step in cadence {
            if days + step > 1_200 {
                break;
            }
            days += step;
            h.clock.advance_days(step);
            h.unit.collect(&owner()).unwrap();
        }

        let engine = AccrualEngine::new(h.schedule.as_ref());
        prop_assert_eq!(h.balance(&owner()), engine.accrue(allocation, 0, days).unwrap());
        prop_assert_eq!(h.unit.cumulative_mined_days(), days);
        prop_assert_eq!(h.unit.last_settlement_day(), START_DAY + days);
        prop_assert!(h.balance(&referral()) <= h.balance(&owner()) / 10);
    }

    /// Period index advances exactly at multiples of ten.
    #[test]
    fn per_day_amount_changes_only_at_boundaries(warmup in 0u64..200) {
        let mut h = Harness::builder().standard_schedule().category(4).build();
        h.start_mining();
        if warmup > 0 {
            h.clock.advance_days(warmup);
            h.unit.collect(&owner()).unwrap();
        }

        let allocation = h.unit.first_year_allocation();
        let engine = AccrualEngine::new(h.schedule.as_ref());
        h.clock.advance_days(1);
        let one_day = h.unit.collect(&owner()).unwrap().unwrap().owner_amount;
        let period = warmup / PERIOD_LENGTH_DAYS;
        prop_assert_eq!(one_day, engine.daily_amount(allocation, period).unwrap());
    }
}
