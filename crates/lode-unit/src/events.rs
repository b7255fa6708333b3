//! Journal of committed unit operations.
//!
//! Each successful mutating operation appends events in the order its
//! effects happened. A failed operation appends nothing.

use serde::{Deserialize, Serialize};

use lode_core::types::Address;

use crate::engine::Payout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UnitEvent {
    Activated {
        day: u64,
        /// Set when this activation fixed the first-year allocation.
        funded_allocation: Option<u64>,
    },
    Deactivated { day: u64 },
    Migrated { day: u64, to: Address, amount: u64 },
    Suspended { day: u64 },
    Resumed { day: u64 },
    Stopped { day: u64 },
    Reset { day: u64, owner: Address, referral: Address },
    MiningStarted { day: u64 },
    MiningStopped { day: u64 },
    Settled {
        day: u64,
        owner: Address,
        referral: Address,
        payout: Payout,
        cumulative_mined_days: u64,
    },
    Terminated { day: u64 },
}

impl UnitEvent {
    /// Epoch day the event was committed on.
    pub fn day(&self) -> u64 {
        match self {
            Self::Activated { day, .. }
            | Self::Deactivated { day }
            | Self::Migrated { day, .. }
            | Self::Suspended { day }
            | Self::Resumed { day }
            | Self::Stopped { day }
            | Self::Reset { day, .. }
            | Self::MiningStarted { day }
            | Self::MiningStopped { day }
            | Self::Settled { day, .. }
            | Self::Terminated { day } => *day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_tagged() {
        let ev = UnitEvent::Suspended { day: 7 };
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"{"event":"suspended","day":7}"#);
        let back: UnitEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn settled_carries_payout() {
        let ev = UnitEvent::Settled {
            day: 20,
            owner: Address::derive("o"),
            referral: Address::derive("r"),
            payout: Payout { days: 10, owner_amount: 500, referral_amount: 50 },
            cumulative_mined_days: 10,
        };
        assert_eq!(ev.day(), 20);
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(value["payout"]["owner_amount"], 500);
    }
}
