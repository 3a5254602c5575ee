//! Error types for the reset pipeline
//!
//! Every failure is fatal. The variant tells the caller which stage failed.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving, opening or writing to the board
#[derive(Debug, Error)]
pub enum ResetError {
    #[error("Invalid device pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Device not found: no path matches {pattern}")]
    DeviceNotFound { pattern: String },

    #[error("Failed to open serial port {}: {source}", .path.display())]
    PortOpenFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write to serial port {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ResetError {
    /// Name of the pipeline stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            ResetError::InvalidPattern { .. } | ResetError::DeviceNotFound { .. } => "resolve",
            ResetError::PortOpenFailure { .. } => "open",
            ResetError::WriteFailure { .. } => "write",
            ResetError::Config(_) => "config",
        }
    }

    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            ResetError::Config(_) => 2,
            ResetError::InvalidPattern { .. } | ResetError::DeviceNotFound { .. } => 3,
            ResetError::PortOpenFailure { .. } => 4,
            ResetError::WriteFailure { .. } => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResetError>;
