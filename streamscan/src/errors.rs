/// This module defines the error types for streamscan.
///
/// Every failure aborts the run. Nothing is retried, and there is no partial-success
/// mode: matches reported before the failure stay valid, but nothing is reported after it.
///
/// ```rust,ignore
/// match search(&config, &mut offsets) {
///     Ok(summary) => // Process summary,
///     Err(ScanError::InvalidConfig(msg)) => // Bad keyword or settings,
///     Err(ScanError::StreamOpenFailure { path, .. }) => // Source could not be opened,
///     Err(e) => // Allocation, accelerator or I/O failure
/// }
/// ```
///
/// # Exit Codes
///
/// Each error kind maps to a distinct process status through [`ScanError::exit_code`]
/// so scripts can tell an unreadable file from a bad keyword:
///
/// | Kind                 | Status |
/// |----------------------|--------|
/// | `InvalidConfig`      | 2      |
/// | `ConfigError`        | 2      |
/// | `StreamOpenFailure`  | 3      |
/// | `AllocationFailure`  | 4      |
/// | `AcceleratorFailure` | 5      |
/// | `Io`                 | 6      |
use std::path::PathBuf;
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur during a scan
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Cannot open {path}: {source}")]
    StreamOpenFailure {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to allocate {bytes} bytes of working memory")]
    AllocationFailure { bytes: usize },
    #[error("Parallel execution failed: {0}")]
    AcceleratorFailure(String),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn stream_open_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StreamOpenFailure {
            path: path.into(),
            source,
        }
    }

    pub fn allocation_failure(bytes: usize) -> Self {
        Self::AllocationFailure { bytes }
    }

    pub fn accelerator_failure(msg: impl Into<String>) -> Self {
        Self::AcceleratorFailure(msg.into())
    }

    /// Process exit status for this error kind
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidConfig(_) | Self::ConfigError(_) => 2,
            Self::StreamOpenFailure { .. } => 3,
            Self::AllocationFailure { .. } => 4,
            Self::AcceleratorFailure(_) => 5,
            Self::Io(_) => 6,
        }
    }
}
