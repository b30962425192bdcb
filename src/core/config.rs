//! Game configuration with documented defaults
//!
//! Only pacing and storage bookkeeping live here. The race rules
//! themselves (field size, speed range, odds, bet menu, starting balance)
//! are fixed in `race::constants`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::core::error::{DerbyError, Result};
use crate::race::constants::TICK_MS;

/// Storage key the balance is persisted under
pub const BALANCE_KEY: &str = "horseRaceBalance";

/// Configuration for a game session
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Wall-clock period between race ticks (milliseconds)
    ///
    /// At the default 50 ms a race with average speed 1.25 per tick
    /// takes roughly four seconds.
    pub tick_ms: u64,

    /// Key the balance is stored under in the key-value store
    pub balance_key: String,

    /// File backing the key-value store for the interactive binary
    pub store_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            balance_key: BALANCE_KEY.to_string(),
            store_path: PathBuf::from("horse_derby_store.json"),
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a config from a TOML file
    ///
    /// Missing fields fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(DerbyError::InvalidConfig("tick_ms must be positive".into()));
        }

        if self.balance_key.is_empty() {
            return Err(DerbyError::InvalidConfig("balance_key must not be empty".into()));
        }

        Ok(())
    }
}
