//! Wager settlement and balance arithmetic

use serde::{Deserialize, Serialize};

use crate::core::types::HorseId;
use crate::race::constants::PAYOUT_MULTIPLIER;

/// A stake on a single horse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wager {
    pub horse: HorseId,
    pub amount: u64,
}

/// Result of settling a wager against a finished race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub winner: HorseId,
    /// Total credited back; `None` when the wager lost
    pub winnings: Option<u64>,
}

impl Settlement {
    pub fn is_win(&self) -> bool {
        self.winnings.is_some()
    }
}

/// Total return on a winning stake
pub fn payout(amount: u64) -> u64 {
    amount.saturating_mul(PAYOUT_MULTIPLIER)
}

/// Settle `wager` given the race `winner`. The stake was already taken at
/// the start, so a loss credits nothing.
pub fn settle(wager: &Wager, winner: HorseId) -> Settlement {
    let winnings = (wager.horse == winner).then(|| payout(wager.amount));
    Settlement { winner, winnings }
}

/// Player balance. Never negative: debits that would overdraw are refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    balance: u64,
}

impl Wallet {
    pub fn new(balance: u64) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        amount <= self.balance
    }

    /// Take `amount` out; returns false and leaves the balance alone if it
    /// would overdraw
    pub fn debit(&mut self, amount: u64) -> bool {
        match self.balance.checked_sub(amount) {
            Some(rest) => {
                self.balance = rest;
                true
            }
            None => false,
        }
    }

    pub fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    pub fn set(&mut self, balance: u64) {
        self.balance = balance;
    }
}
