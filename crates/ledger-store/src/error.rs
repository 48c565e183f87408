//! Error types for ledger storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Conditional commit lost a race: the stored version no longer matches
    /// the one observed at read time.
    #[error("version conflict: expected={expected}, actual={actual}")]
    VersionConflict {
        /// The version the caller observed.
        expected: u64,
        /// The version currently stored.
        actual: u64,
    },

    /// The idempotency key was already applied.
    #[error("duplicate idempotency key: {key}")]
    DuplicateKey {
        /// The key that was replayed.
        key: String,
    },
}
