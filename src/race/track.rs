//! Track state and the per-tick movement procedure

use serde::{Deserialize, Serialize};

use crate::core::types::{HorseId, Tick};
use crate::race::constants::{FINISH_LINE, HORSE_COUNT, START_LINE};
use crate::race::speed::SpeedSource;

/// Positions of every horse along the track, in percent of its length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    positions: [f64; HORSE_COUNT],
    tick: Tick,
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

impl Track {
    pub fn new() -> Self {
        Self {
            positions: [START_LINE; HORSE_COUNT],
            tick: 0,
        }
    }

    /// Put every horse back on the start line
    pub fn reset(&mut self) {
        self.positions = [START_LINE; HORSE_COUNT];
        self.tick = 0;
    }

    pub fn positions(&self) -> &[f64; HORSE_COUNT] {
        &self.positions
    }

    pub fn position(&self, horse: HorseId) -> f64 {
        self.positions[horse.index()]
    }

    /// Ticks run since the last reset
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Run one tick: move every horse, then look for a finisher.
    ///
    /// All horses move before the finish scan, so a horse further down the
    /// lane order never steals a win from one that crossed on the same tick.
    pub fn advance<S: SpeedSource + ?Sized>(&mut self, speeds: &mut S) -> Option<HorseId> {
        for position in self.positions.iter_mut() {
            *position += speeds.next_speed();
        }
        self.tick += 1;
        self.finisher()
    }

    /// First horse in lane order at or past the finish line
    pub fn finisher(&self) -> Option<HorseId> {
        self.positions
            .iter()
            .position(|&p| p >= FINISH_LINE)
            .and_then(HorseId::new)
    }

    /// Horse furthest along; lowest lane on ties
    pub fn leader(&self) -> HorseId {
        HorseId::all().fold(HorseId::FIRST, |best, horse| {
            if self.position(horse) > self.position(best) {
                horse
            } else {
                best
            }
        })
    }

    /// Advance until some horse finishes, returning the winner
    pub fn run_to_finish<S: SpeedSource + ?Sized>(&mut self, speeds: &mut S) -> HorseId {
        loop {
            if let Some(winner) = self.advance(speeds) {
                return winner;
            }
        }
    }
}
