use super::error::StorageError;

/// Durable string key/value storage with browser local-storage semantics:
/// a missing key reads as `None` and a write replaces the whole entry.
pub trait KeyValueStorage: Send {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Returns whether an entry was present.
    fn remove_item(&mut self, key: &str) -> Result<bool, StorageError>;
}
