//! In-memory reward ledger.
//!
//! Balances live in a `HashMap` behind a `parking_lot::Mutex`. Suitable for
//! tests and the simulator; a deployment plugs its real token ledger in
//! through [`RewardLedger`].

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::LedgerError;
use crate::traits::{RewardLedger, Transfer};
use crate::types::Address;

#[derive(Debug, Default)]
struct Books {
    balances: HashMap<Address, u64>,
    /// Recipients whose incoming transfers are refused.
    blocked: HashSet<Address>,
}

impl Books {
    fn balance(&self, who: &Address) -> u64 {
        self.balances.get(who).copied().unwrap_or(0)
    }

    /// Check a batch against current balances without applying it.
    fn check(&self, from: &Address, legs: &[Transfer]) -> Result<(), LedgerError> {
        let mut need: u64 = 0;
        for leg in legs {
            if leg.to.is_zero() {
                return Err(LedgerError::ZeroRecipient);
            }
            if self.blocked.contains(&leg.to) {
                return Err(LedgerError::Rejected(format!("recipient {} refuses transfers", leg.to)));
            }
            need = need.checked_add(leg.amount).ok_or(LedgerError::BalanceOverflow)?;
        }
        let have = self.balance(from);
        if have < need {
            return Err(LedgerError::InsufficientBalance { have, need });
        }
        // Credits must not overflow either. Self-transfers net out.
        let mut incoming: HashMap<Address, u64> = HashMap::new();
        for leg in legs.iter().filter(|l| l.to != *from) {
            let slot = incoming.entry(leg.to).or_default();
            *slot = slot.checked_add(leg.amount).ok_or(LedgerError::BalanceOverflow)?;
        }
        for (to, amount) in incoming {
            self.balance(&to)
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow)?;
        }
        Ok(())
    }

    fn apply(&mut self, from: &Address, legs: &[Transfer]) {
        for leg in legs {
            *self.balances.entry(*from).or_default() -= leg.amount;
            *self.balances.entry(leg.to).or_default() += leg.amount;
        }
    }
}

/// Thread-safe in-memory ledger with atomic batches.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    books: Mutex<Books>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `who` out of thin air. Test and simulator funding.
    pub fn mint(&self, who: &Address, amount: u64) -> Result<(), LedgerError> {
        let mut books = self.books.lock();
        let balance = books.balance(who);
        let updated = balance.checked_add(amount).ok_or(LedgerError::BalanceOverflow)?;
        books.balances.insert(*who, updated);
        Ok(())
    }

    /// Refuse every future transfer to `who`.
    pub fn block_recipient(&self, who: Address) {
        self.books.lock().blocked.insert(who);
    }

    /// Accept transfers to `who` again.
    pub fn unblock_recipient(&self, who: &Address) {
        self.books.lock().blocked.remove(who);
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> u128 {
        self.books.lock().balances.values().map(|v| *v as u128).sum()
    }
}

impl RewardLedger for MemoryLedger {
    fn balance_of(&self, holder: &Address) -> u64 {
        self.books.lock().balance(holder)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: u64) -> Result<(), LedgerError> {
        self.transfer_batch(from, &[Transfer { to: *to, amount }])
    }

    fn transfer_batch(&self, from: &Address, legs: &[Transfer]) -> Result<(), LedgerError> {
        let mut books = self.books.lock();
        books.check(from, legs)?;
        books.apply(from, legs);
        debug!(%from, legs = legs.len(), "ledger batch applied");
        Ok(())
    }
}
