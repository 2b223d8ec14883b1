//! Codec for the durable storage record: one entry holding the JSON array of tasks.

use crate::domain::{error::RecordError, storage::KeyValueStorage, task::Task};

pub const DEFAULT_KEY: &str = "tasks";

pub fn encode(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string(tasks)
}

/// A literal `null` entry reads as an empty collection.
pub fn decode(raw: &str) -> Result<Vec<Task>, serde_json::Error> {
    let tasks: Option<Vec<Task>> = serde_json::from_str(raw)?;
    Ok(tasks.unwrap_or_default())
}

/// Reads the record under `key`; a missing entry is an empty collection.
pub fn read<S: KeyValueStorage + ?Sized>(storage: &S, key: &str) -> Result<Vec<Task>, RecordError> {
    match storage.get_item(key)? {
        Some(raw) => Ok(decode(&raw)?),
        None => Ok(Vec::new()),
    }
}

/// Replaces the record under `key` with the whole collection in a single write.
pub fn write<S: KeyValueStorage + ?Sized>(storage: &mut S, key: &str, tasks: &[Task]) -> Result<(), RecordError> {
    let raw = encode(tasks)?;
    storage.set_item(key, &raw)?;
    Ok(())
}
