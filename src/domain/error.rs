use thiserror::Error;

/// Rejected `add` input. Nothing is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("task text must not be empty")]
    Empty,
    #[error("task text is {len} characters long; the limit is {max}")]
    TooLong { len: usize, max: usize },
    #[error("`{0}` is not a calendar date (expected YYYY-MM-DD)")]
    InvalidDueDate(String),
}

/// Failure reported by a [`KeyValueStorage`](super::storage::KeyValueStorage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage quota exceeded: record needs {needed} bytes, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("malformed task record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence failure of the task store. Both variants are recoverable: a failed
/// read falls back to an empty collection, a failed write keeps memory authoritative.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read `{key}` from storage: {source}")]
    Read {
        key: String,
        #[source]
        source: RecordError,
    },
    #[error("could not write `{key}` to storage: {source}")]
    Write {
        key: String,
        #[source]
        source: RecordError,
    },
}

impl StoreError {
    pub fn is_quota_exceeded(&self) -> bool {
        let (Self::Read { source, .. } | Self::Write { source, .. }) = self;
        matches!(source, RecordError::Storage(StorageError::QuotaExceeded { .. }))
    }
}
