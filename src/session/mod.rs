//! Session state machine, intents and snapshots

pub mod clock;
pub mod intent;
pub mod snapshot;
pub mod state;

pub use clock::{ClockHandle, RaceClock};
pub use intent::{Intent, Outcome, ParseIntentError};
pub use snapshot::Snapshot;
pub use state::Session;
