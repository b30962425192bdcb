//! Race rules - all fixed values in one place
//!
//! None of these are configurable. The field size and odds are part of the game.

// Field
pub const HORSE_COUNT: usize = 6;
pub const HORSE_COLORS: [&str; HORSE_COUNT] = [
    "#FF5733", // Red
    "#33FF57", // Green
    "#3357FF", // Blue
    "#F3FF33", // Yellow
    "#FF33F3", // Pink
    "#33FFF3", // Cyan
];

// Track (percent of track length)
pub const START_LINE: f64 = 0.0;
pub const FINISH_LINE: f64 = 100.0;

// Movement per tick, drawn uniformly from [MIN_SPEED, MAX_SPEED)
pub const MIN_SPEED: f64 = 0.5;
pub const MAX_SPEED: f64 = 2.0;

// Time
pub const TICK_MS: u64 = 50;

// Wagering
pub const BET_OPTIONS: [u64; 3] = [10, 50, 100];
pub const DEFAULT_BET: u64 = 10;
pub const DEFAULT_BALANCE: u64 = 100;
/// Total return on a winning stake (5-to-1 odds plus the stake)
pub const PAYOUT_MULTIPLIER: u64 = 6;

/// Upper bound on ticks before some horse must have finished
pub const MAX_RACE_TICKS: u64 = (FINISH_LINE / MIN_SPEED) as u64;

/// Whether `amount` is one of the offered wagers
pub fn is_bet_option(amount: u64) -> bool {
    BET_OPTIONS.contains(&amount)
}
