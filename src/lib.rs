//! Horse Derby - single-player horse race wagering game

pub mod core;
pub mod driver;
pub mod race;
pub mod session;
pub mod store;
