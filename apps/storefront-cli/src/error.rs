//! # CLI Error Type
//!
//! Everything a command can fail with, mapped to a process exit code.
//!
//! ```text
//! CoreError (bad catalog input)   ──► CliError::InvalidInput   exit 2
//! SessionError (config, storage)  ──► CliError::Config         exit 3
//! serde_json::Error (--json)      ──► CliError::Output         exit 1
//! ```
//!
//! Cart mutations themselves never fail; removing a missing id or setting
//! a quantity on one is a silent no-op.

use storefront_core::CoreError;
use storefront_session::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Product data from the command line was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] SessionError),

    /// The cart could not be rendered.
    #[error("Output failed: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidInput(_) => 2,
            CliError::Config(_) => 3,
            CliError::Output(_) => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
