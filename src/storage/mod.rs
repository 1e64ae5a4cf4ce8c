//! Durable key-value storage for UI state.
//!
//! Everything the client remembers between launches (open tabs, the active
//! tab, folder expansion, editor preferences) lives in one flat string map.
//! Writers are serialized by the single UI thread, so the store has no
//! transaction semantics: the last write wins.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;

/// A persistent string-keyed map that survives restarts.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Serialized form of a boolean, matching what the store has always held.
pub fn bool_value(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
