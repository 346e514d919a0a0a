use docshelf_shared::types::UserId;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// A partition held text that is not the expected JSON shape.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend rejected a write or delete of `key`.  The previous value
    /// is kept.
    #[error("Failed to write {key}: {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A write would exceed the storage quota.  The previous value is kept.
    #[error("Storage quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    /// A record belongs to another user's partition.
    #[error("Record owned by user {found} cannot be stored in partition of user {expected}")]
    PartitionMismatch { expected: UserId, found: UserId },

    /// A transient handle was revoked or never issued.
    #[error("Blob handle is no longer valid: {0}")]
    HandleRevoked(String),

    /// A mutex guarding shared state was poisoned by a panicking thread.
    #[error("Lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Whether a write to the backing store was rejected, in which case the
    /// caller may retry the same operation.  Read failures are not.
    pub fn is_write_failure(&self) -> bool {
        matches!(
            self,
            StoreError::QuotaExceeded { .. } | StoreError::WriteFailed { .. }
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_errors_are_not_write_failures() {
        assert!(!StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows).is_write_failure());
        assert!(!StoreError::Io(std::io::Error::other("disk")).is_write_failure());
        assert!(!StoreError::LockPoisoned.is_write_failure());
    }

    #[test]
    fn test_rejected_writes_are_write_failures() {
        assert!(StoreError::QuotaExceeded { needed: 2, quota: 1 }.is_write_failure());
        let err = StoreError::WriteFailed {
            key: "app_categories".into(),
            source: rusqlite::Error::QueryReturnedNoRows,
        };
        assert!(err.is_write_failure());
        assert!(err.to_string().starts_with("Failed to write app_categories"));
    }
}
