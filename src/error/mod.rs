/// Error taxonomy for shredding
///
/// Every failure inside the overwrite engine is a [`ShredError`]. At the
/// engine boundary it collapses into an [`OverwriteResult`], the terminal
/// per-file outcome that callers pattern-match on.
///
/// ```text
///   io::Error ──classify──▶ ShredError ──From──▶ OverwriteResult
///                              │
///                              └── ErrorContext (operation, path, offset)
/// ```
pub mod classification;

pub use classification::{ErrorClass, ErrorClassifier, ErrorContext};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShredError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Verification failed at byte {offset}: {}", .path.display())]
    VerificationFailed { path: PathBuf, offset: u64 },

    #[error("I/O error during {context}: {source}")]
    Io {
        context: ErrorContext,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl ShredError {
    /// Classify an I/O failure that happened while performing `context`
    pub fn from_io(source: std::io::Error, context: ErrorContext) -> Self {
        match ErrorClassifier::classify(&source) {
            ErrorClass::NotFound => ShredError::NotFound(context.path),
            ErrorClass::PermissionDenied => ShredError::PermissionDenied(context.path),
            ErrorClass::Other => ShredError::Io { context, source },
        }
    }
}

pub type ShredResult<T> = Result<T, ShredError>;

/// Terminal outcome of shredding one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum OverwriteResult {
    Deleted,
    NotFound,
    PermissionDenied,
    VerificationFailed,
    #[serde(rename = "other_io_error")]
    OtherIOError(String),
    Interrupted,
}

impl OverwriteResult {
    pub fn is_deleted(&self) -> bool {
        matches!(self, OverwriteResult::Deleted)
    }

    /// Process exit code when this is the only target
    pub fn exit_code(&self) -> i32 {
        match self {
            OverwriteResult::Deleted => 0,
            OverwriteResult::NotFound => 2,
            OverwriteResult::PermissionDenied => 3,
            OverwriteResult::VerificationFailed => 4,
            OverwriteResult::OtherIOError(_) => 5,
            OverwriteResult::Interrupted => 130,
        }
    }

    /// Human-readable reason, used in the per-file failure line
    pub fn reason(&self) -> String {
        match self {
            OverwriteResult::Deleted => "Deleted".to_string(),
            OverwriteResult::NotFound => "File not found".to_string(),
            OverwriteResult::PermissionDenied => "Permission denied".to_string(),
            OverwriteResult::VerificationFailed => "Verification failed".to_string(),
            OverwriteResult::OtherIOError(detail) => detail.clone(),
            OverwriteResult::Interrupted => "Interrupted".to_string(),
        }
    }
}

impl fmt::Display for OverwriteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason())
    }
}

impl From<&ShredError> for OverwriteResult {
    fn from(err: &ShredError) -> Self {
        match err {
            ShredError::NotFound(_) => OverwriteResult::NotFound,
            ShredError::PermissionDenied(_) => OverwriteResult::PermissionDenied,
            ShredError::VerificationFailed { .. } => OverwriteResult::VerificationFailed,
            ShredError::Interrupted => OverwriteResult::Interrupted,
            other => OverwriteResult::OtherIOError(other.to_string()),
        }
    }
}

impl From<ShredError> for OverwriteResult {
    fn from(err: ShredError) -> Self {
        OverwriteResult::from(&err)
    }
}
