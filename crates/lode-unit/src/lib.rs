//! # lode-unit — accrual engine and lifecycle state machine.
//!
//! All calculations use integer arithmetic only, with truncating division
//! everywhere a fraction appears.
//!
//! - [`engine`]: converts elapsed whole days into owed tokens under the
//!   ten-day-period decay schedule and plans settlements.
//! - [`unit`]: the [`MiningUnit`] state machine. Every mutating operation is
//!   staged on a draft of [`UnitState`] and committed only once every guard,
//!   settlement check and ledger transfer has succeeded.
//! - [`shared`]: [`SharedUnit`], a cloneable handle that totally orders calls
//!   and rejects re-entrant ones.

pub mod config;
pub mod engine;
pub mod events;
pub mod shared;
pub mod state;
pub mod unit;

pub use config::{CollectPolicy, UnitConfig};
pub use engine::{AccrualEngine, Payout, Settlement};
pub use events::UnitEvent;
pub use shared::SharedUnit;
pub use state::{UnitContext, UnitParams, UnitState};
pub use unit::MiningUnit;
