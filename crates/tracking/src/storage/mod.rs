//! Storage traits and implementations
//!
//! Persistence is split in two layers:
//! - [`KeyValueStore`]: the raw substrate (string keys to string values),
//!   swappable between in-memory and SQLite backends
//! - [`DateStore`]: the date-keyed tracking data with merge-on-write
//!   semantics, built on top of any substrate

mod date_store;
mod memory;
mod sqlite;
mod traits;

pub use date_store::{DateStore, LAST_SYNC_DATE_KEY, TRACKING_DATA_KEY};
pub use memory::InMemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;
pub use traits::KeyValueStore;
