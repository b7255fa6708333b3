//! Scenario and adversarial test suite for Lode mining units.
//!
//! The integration tests under `tests/` drive whole units through their
//! lifecycle against the in-memory ledger, role registry and manual clock,
//! and try to break the accrual and atomicity guarantees.

pub mod helpers;
