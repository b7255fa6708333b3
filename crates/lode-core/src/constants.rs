//! Protocol constants. All token amounts in base units (1 LODE = 10^8 base units).

pub const COIN: u64 = 100_000_000;

/// Length of one epoch day in seconds.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Number of cumulative mined days covered by one fee coefficient.
///
/// The period index of a unit is `cumulative_mined_days / PERIOD_LENGTH_DAYS`.
pub const PERIOD_LENGTH_DAYS: u64 = 10;

/// Referral skim taken on top of every owner payout, in percent.
pub const REFERRAL_PERCENT: u64 = 10;

/// Funding surplus a pool-based unit must hold over its capacity before
/// first activation, in percent. Covers the referral skim.
pub const FUNDING_SURPLUS_PERCENT: u64 = 10;

/// Denominator for all percentage arithmetic.
pub const PERCENT_DENOMINATOR: u64 = 100;

/// Highest valid unit category.
pub const MAX_CATEGORY: u8 = 5;

/// Fixed-point denominator for fee coefficients.
pub const SCALE_FACTOR: u64 = 1_000_000;

/// Reward capacity per category, in base units.
///
/// | Category | Capacity      |
/// |----------|---------------|
/// | 0        | 1,000 LODE    |
/// | 1        | 5,000 LODE    |
/// | 2        | 10,000 LODE   |
/// | 3        | 50,000 LODE   |
/// | 4        | 100,000 LODE  |
/// | 5        | 500,000 LODE  |
pub const CATEGORY_CAPACITY: [u64; MAX_CATEGORY as usize + 1] = [
    1_000 * COIN,
    5_000 * COIN,
    10_000 * COIN,
    50_000 * COIN,
    100_000 * COIN,
    500_000 * COIN,
];

/// Per-day payout coefficient for each 10-day period, scaled by [`SCALE_FACTOR`].
///
/// Decays by roughly 1.9% per period so that the first ~36 periods (one
/// year) pay out about the first-year allocation. Periods past the end of
/// the table pay nothing.
pub const FEE_COEFFICIENTS: [u64; 120] = [
    3_762, 3_691, 3_622, 3_554, 3_487, 3_421, 3_357, 3_294, 3_232, 3_171,
    3_112, 3_053, 2_996, 2_939, 2_884, 2_830, 2_776, 2_724, 2_673, 2_623,
    2_573, 2_525, 2_477, 2_431, 2_385, 2_340, 2_296, 2_253, 2_211, 2_169,
    2_128, 2_088, 2_049, 2_010, 1_973, 1_935, 1_899, 1_863, 1_828, 1_794,
    1_760, 1_727, 1_695, 1_663, 1_631, 1_601, 1_571, 1_541, 1_512, 1_484,
    1_456, 1_428, 1_401, 1_375, 1_349, 1_324, 1_299, 1_275, 1_251, 1_227,
    1_204, 1_181, 1_159, 1_137, 1_116, 1_095, 1_074, 1_054, 1_034, 1_015,
    996, 977, 959, 941, 923, 906, 888, 872, 855, 839,
    823, 808, 793, 778, 763, 749, 735, 721, 707, 694,
    681, 668, 656, 643, 631, 619, 608, 596, 585, 574,
    563, 553, 542, 532, 522, 512, 503, 493, 484, 475,
    466, 457, 448, 440, 432, 424, 416, 408, 400, 393,
];

/// Which fee period a cumulative mined-day count falls in.
///
/// # Examples
///
/// ```
/// use lode_core::constants::period_index;
/// assert_eq!(period_index(0), 0);
/// assert_eq!(period_index(9), 0);
/// assert_eq!(period_index(10), 1);
/// ```
pub fn period_index(cumulative_mined_days: u64) -> u64 {
    cumulative_mined_days / PERIOD_LENGTH_DAYS
}

/// Referral skim for an owner payout: `amount * 10 / 100`, truncating.
///
/// # Examples
///
/// ```
/// use lode_core::constants::referral_share;
/// assert_eq!(referral_share(1_000), 100);
/// assert_eq!(referral_share(19), 1);
/// assert_eq!(referral_share(9), 0);
/// ```
pub fn referral_share(amount: u64) -> u64 {
    ((amount as u128 * REFERRAL_PERCENT as u128) / PERCENT_DENOMINATOR as u128) as u64
}

/// Exact balance a pool-based unit must hold before its first activation:
/// `capacity + capacity * 10 / 100`.
///
/// Returns `None` on overflow.
pub fn required_funding(capacity: u64) -> Option<u64> {
    let surplus = (capacity as u128 * FUNDING_SURPLUS_PERCENT as u128)
        / PERCENT_DENOMINATOR as u128;
    capacity.checked_add(surplus as u64)
}

/// First-year allocation fixed at first activation: half the capacity.
pub fn first_year_allocation(capacity: u64) -> u64 {
    capacity / 2
}
