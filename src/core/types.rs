//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

use crate::race::constants::{HORSE_COLORS, HORSE_COUNT};

/// Race tick counter (simulation time unit)
pub type Tick = u64;

/// Identifies one of the fixed field of horses by its lane index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HorseId(u8);

impl HorseId {
    /// Lane 0
    pub const FIRST: HorseId = HorseId(0);

    /// Returns `None` when the index is outside the field
    pub fn new(index: usize) -> Option<Self> {
        (index < HORSE_COUNT).then_some(Self(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// All horses in lane order
    pub fn all() -> impl Iterator<Item = HorseId> {
        (0..HORSE_COUNT).map(|i| HorseId(i as u8))
    }

    /// Display colour as a hex string
    pub fn color(self) -> &'static str {
        HORSE_COLORS[self.index()]
    }

    /// Human-facing label, numbered from 1
    pub fn label(self) -> String {
        format!("Horse {}", self.index() + 1)
    }
}

impl std::fmt::Display for HorseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Horse {}", self.0 + 1)
    }
}

/// Screen mode of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Menu,
    Racing,
    Paused,
    Finished,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Menu => "menu",
            Mode::Racing => "racing",
            Mode::Paused => "paused",
            Mode::Finished => "finished",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
