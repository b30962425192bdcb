//! Race simulation and wager settlement
//!
//! Each tick: every horse strides -> finish scan (lowest lane wins ties) -> settle

pub mod constants;
pub mod settlement;
pub mod speed;
pub mod track;

pub use constants::*;
pub use settlement::{payout, settle, Settlement, Wager, Wallet};
pub use speed::{speed_from_unit, RngSpeeds, ScriptedSpeeds, SpeedSource, UnitSpeeds};
pub use track::Track;
