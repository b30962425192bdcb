//! Read-only projection of a session for the presentation layer

use serde::Serialize;

use crate::core::types::{HorseId, Mode, Tick};
use crate::race::constants::{BET_OPTIONS, HORSE_COUNT};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub selected_horse: Option<HorseId>,
    pub positions: [f64; HORSE_COUNT],
    pub winner: Option<HorseId>,
    pub balance: u64,
    pub bet_amount: u64,
    pub winnings: Option<u64>,
    /// Ticks run in the current race
    pub tick: Tick,
    /// Races started this session
    pub races_run: u64,
}

impl Snapshot {
    /// Whether the start affordance should be enabled
    pub fn can_start(&self) -> bool {
        self.mode == Mode::Menu && self.selected_horse.is_some() && self.bet_amount <= self.balance
    }

    /// Bet menu entries with whether each is currently selectable
    pub fn bet_menu(&self) -> impl Iterator<Item = (u64, bool)> + '_ {
        BET_OPTIONS
            .iter()
            .map(move |&amount| (amount, self.mode == Mode::Menu && amount <= self.balance))
    }

    /// Whether the player backed the winner; `None` until the race finishes
    pub fn player_won(&self) -> Option<bool> {
        match (self.winner, self.selected_horse) {
            (Some(winner), Some(selected)) => Some(winner == selected),
            _ => None,
        }
    }
}
