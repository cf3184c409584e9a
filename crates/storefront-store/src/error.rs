//! # Storage Error Types
//!
//! Error types for durable storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / serde_json::Error                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Persistence synchronizer ← Logs it and degrades to memory-only        │
//! │                                                                         │
//! │  StoreError NEVER reaches cart consumers.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage could not be opened.
    ///
    /// ## When This Occurs
    /// - Database file can't be created (permissions, read-only volume)
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A read or write against an open store failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The backend refuses service for the rest of the session.
    ///
    /// ## When This Occurs
    /// - Memory backend switched off in tests
    /// - Pool closed during shutdown
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A stored record is not a cart record.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// A stored record was written by a newer release.
    #[error("Record version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Record could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl StoreError {
    /// True for errors about the stored bytes rather than the store itself.
    ///
    /// Hydration treats these as "no prior cart"; everything else means the
    /// store is unusable.
    pub fn is_malformed_record(&self) -> bool {
        matches!(
            self,
            StoreError::CorruptRecord(_) | StoreError::UnsupportedVersion { .. }
        )
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::PoolTimedOut   → StoreError::Unavailable
/// sqlx::Error::PoolClosed     → StoreError::Unavailable
/// sqlx::Error::Io             → StoreError::ConnectionFailed
/// Other                       → StoreError::QueryFailed
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::Unavailable("pool timed out".to_string()),
            sqlx::Error::PoolClosed => StoreError::Unavailable("pool is closed".to_string()),
            sqlx::Error::Io(io) => StoreError::ConnectionFailed(io.to_string()),
            other => StoreError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
