//! Reference fee schedule backed by the protocol constant tables.

use crate::constants::{CATEGORY_CAPACITY, FEE_COEFFICIENTS, SCALE_FACTOR};
use crate::traits::FeeSchedule;
use crate::types::Category;

/// The production capacity and coefficient tables.
///
/// Capacities come from [`CATEGORY_CAPACITY`], coefficients from
/// [`FEE_COEFFICIENTS`]. Periods past the end of the coefficient table
/// yield 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFeeSchedule;

impl StandardFeeSchedule {
    pub fn new() -> Self {
        Self
    }
}

impl FeeSchedule for StandardFeeSchedule {
    fn capacity_for_category(&self, category: Category) -> u64 {
        CATEGORY_CAPACITY.get(category.index()).copied().unwrap_or(0)
    }

    fn fee_coefficient(&self, period_index: u64) -> u64 {
        usize::try_from(period_index)
            .ok()
            .and_then(|i| FEE_COEFFICIENTS.get(i))
            .copied()
            .unwrap_or(0)
    }

    fn scale_factor(&self) -> u64 {
        SCALE_FACTOR
    }
}

/// Fee schedule with caller-supplied tables.
///
/// Used where a deployment needs a different curve, and by tests that want
/// round numbers or deliberately irregular coefficients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFeeSchedule {
    capacities: [u64; CATEGORY_CAPACITY.len()],
    coefficients: Vec<u64>,
    scale: u64,
}

impl TableFeeSchedule {
    /// Build a schedule. `scale` must be non-zero.
    pub fn new(capacities: [u64; CATEGORY_CAPACITY.len()], coefficients: Vec<u64>, scale: u64) -> Option<Self> {
        if scale == 0 {
            return None;
        }
        Some(Self {
            capacities,
            coefficients,
            scale,
        })
    }
}

impl FeeSchedule for TableFeeSchedule {
    fn capacity_for_category(&self, category: Category) -> u64 {
        self.capacities.get(category.index()).copied().unwrap_or(0)
    }

    fn fee_coefficient(&self, period_index: u64) -> u64 {
        usize::try_from(period_index)
            .ok()
            .and_then(|i| self.coefficients.get(i))
            .copied()
            .unwrap_or(0)
    }

    fn scale_factor(&self) -> u64 {
        self.scale
    }
}
