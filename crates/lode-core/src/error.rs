//! Error types for the Lode mining unit.
use thiserror::Error;

use crate::types::{LifecycleState, Role};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid hex")] InvalidHex,
    #[error("invalid length: {0} bytes, expected 20")] InvalidLength(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: u64, need: u64 },
    #[error("transfer to the zero address")] ZeroRecipient,
    #[error("balance overflow")] BalanceOverflow,
    #[error("transfer rejected: {0}")] Rejected(String),
}

/// Every way a unit operation can fail.
///
/// A failed operation leaves the unit exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("permission denied: caller is not {role}")] PermissionDenied { role: Role },
    #[error("invalid state for {operation}: unit is {state}")] InvalidState { operation: &'static str, state: LifecycleState },
    #[error("unit is terminated")] Terminated,
    #[error("invalid construction: {0}")] InvalidConstruction(String),
    #[error("funding mismatch: held {held}, required exactly {required}")] FundingMismatch { held: u64, required: u64 },
    #[error("zero payout: owner {owner}, referral {referral}")] ZeroPayout { owner: u64, referral: u64 },
    #[error("transfer failed: {0}")] TransferFailure(#[from] LedgerError),
    #[error("zero address argument")] ZeroAddress,
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error("operation re-entered while another is in flight")] Reentrancy,
}

impl UnitError {
    /// Whether this error is a failed state guard, as opposed to a
    /// permission, termination or settlement failure.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}
