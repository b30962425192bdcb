//! Balance persistence
//!
//! The balance is the only persisted state. It lives under a single key in a
//! string key-value store, written through on every change.

pub mod balance;
pub mod file;
pub mod memory;

pub use balance::{persist_balance, restore_balance};
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::core::error::Result;

/// Get/set by string key
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}
