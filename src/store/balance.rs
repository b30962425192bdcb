use crate::core::error::Result;
use crate::race::constants::DEFAULT_BALANCE;
use crate::store::KeyValueStore;

/// Read the persisted balance, falling back to the default when the entry is
/// missing, non-numeric or the store cannot be read
pub fn restore_balance<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> u64 {
    match store.get(key) {
        Ok(Some(raw)) => match raw.trim().parse::<u64>() {
            Ok(balance) => balance,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Persisted balance is not a whole number, using default");
                DEFAULT_BALANCE
            }
        },
        Ok(None) => DEFAULT_BALANCE,
        Err(e) => {
            tracing::warn!(key, error = %e, "Could not read persisted balance, using default");
            DEFAULT_BALANCE
        }
    }
}

pub fn persist_balance<S: KeyValueStore + ?Sized>(store: &mut S, key: &str, balance: u64) -> Result<()> {
    store.set(key, &balance.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const KEY: &str = "horseRaceBalance";

    #[test]
    fn test_missing_balance_defaults() {
        assert_eq!(restore_balance(&MemoryStore::new(), KEY), 100);
    }

    #[test]
    fn test_stored_balance_restored() {
        let store = MemoryStore::with_entry(KEY, "250");
        assert_eq!(restore_balance(&store, KEY), 250);
    }

    #[test]
    fn test_corrupt_balance_defaults() {
        for raw in ["abc", "-20", "12.5", ""] {
            let store = MemoryStore::with_entry(KEY, raw);
            assert_eq!(restore_balance(&store, KEY), 100, "raw value {raw:?}");
        }
    }

    #[test]
    fn test_persist_round_trips_through_store() {
        let mut store = MemoryStore::new();
        persist_balance(&mut store, KEY, 0).unwrap();
        assert_eq!(restore_balance(&store, KEY), 0);
    }
}
