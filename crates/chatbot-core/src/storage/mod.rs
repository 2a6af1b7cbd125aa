//! Durable key/value storage behind the conversation store.
//!
//! Values are opaque strings (the store writes JSON). A backend never
//! interprets them.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::ChatError;

pub trait KeyValueStore: Send + Sync {
    /// Read a key. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>, ChatError>;

    fn set(&self, key: &str, value: &str) -> Result<(), ChatError>;

    /// Remove a key. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), ChatError>;
}

/// Keys double as file names, so only a conservative charset is accepted.
pub fn validate_key(key: &str) -> Result<(), ChatError> {
    let valid = !key.is_empty()
        && key.len() <= 128
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(ChatError::storage(format!("Invalid storage key: {key:?}")))
    }
}
