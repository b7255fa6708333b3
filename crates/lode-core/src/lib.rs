//! # lode-core
//! Foundation types and collaborator traits for a Lode mining unit.
//!
//! A mining unit accrues a reward token over time and pays it out to an
//! owner and a referral beneficiary. This crate holds everything the unit
//! consumes from the outside world:
//! - [`traits`] — the four collaborator seams (roles, fee schedule, ledger, clock)
//! - [`roles`], [`schedule`], [`ledger`], [`clock`] — reference implementations
//! - [`types`] and [`constants`] — addresses, categories, day arithmetic
//! - [`error`] — the error taxonomy shared by every operation

pub mod clock;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod roles;
pub mod schedule;
pub mod traits;
pub mod types;
