//! # Session Error Types
//!
//! Errors surfaced while setting a session up.
//!
//! ## Where Errors Stop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Error Boundary                             │
//! │                                                                         │
//! │  Config file / env ──► SessionError ──► caller (CLI, embedding app)    │
//! │                                                                         │
//! │  Storage at runtime ─► StoreError ──► synchronizer logs, goes          │
//! │                                       memory-only. Never reaches       │
//! │                                       CartHandle.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use storefront_store::StoreError;

/// Result type alias for session setup.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session setup error.
#[derive(Debug, Error)]
pub enum SessionError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A configuration value is out of range or malformed.
    #[error("Invalid storefront configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// The configured backend could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::ConfigLoadFailed(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for SessionError {
    fn from(err: toml::ser::Error) -> Self {
        SessionError::ConfigSaveFailed(format!("TOML serialize error: {}", err))
    }
}
