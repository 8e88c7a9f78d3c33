//! Storage trait definitions

use anyhow::Result;

/// A device-local key-value substrate
///
/// Holds whole serialized values under string keys. Implementations must
/// make each `save` visible to subsequent `load` calls on the same store.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
