/// Error classification for per-file outcome selection
///
/// Maps raw `std::io::Error`s onto the small set of outcome classes the
/// engine reports, and carries the context (operation, path, offset) used in
/// failure messages.
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Classification of an I/O failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Target path does not exist
    NotFound,

    /// Insufficient rights to open, write or unlink
    PermissionDenied,

    /// Anything else (disk full, device error, EISDIR, ...)
    Other,
}

impl ErrorClass {
    /// Get human-readable description of error class
    pub fn description(&self) -> &'static str {
        match self {
            ErrorClass::NotFound => "Target does not exist",
            ErrorClass::PermissionDenied => "Insufficient permissions",
            ErrorClass::Other => "I/O failure",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::NotFound => write!(f, "NotFound"),
            ErrorClass::PermissionDenied => write!(f, "PermissionDenied"),
            ErrorClass::Other => write!(f, "Other"),
        }
    }
}

/// Where an I/O error occurred
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Operation name (e.g. "open", "write pass 2/3", "verify", "unlink")
    pub operation: String,

    /// Target path
    pub path: PathBuf,

    /// Byte offset where the error occurred (if applicable)
    pub offset: Option<u64>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            operation: operation.into(),
            path: path.as_ref().to_path_buf(),
            offset: None,
        }
    }

    /// Create context for a write during a specific pass (1-based for display)
    pub fn for_pass(path: impl AsRef<Path>, pass: usize, total: usize) -> Self {
        Self::new(format!("write pass {}/{}", pass, total), path)
    }

    /// Create context for a verification read
    pub fn for_verification(path: impl AsRef<Path>, offset: u64) -> Self {
        Self::new("verify", path).with_offset(offset)
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.operation, self.path.display())?;
        if let Some(offset) = self.offset {
            write!(f, " at offset {}", offset)?;
        }
        Ok(())
    }
}

/// Error classifier
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn classify(err: &io::Error) -> ErrorClass {
        match err.kind() {
            io::ErrorKind::NotFound => ErrorClass::NotFound,
            io::ErrorKind::PermissionDenied => ErrorClass::PermissionDenied,
            _ => Self::classify_raw(err),
        }
    }

    // EROFS and EACCES-like codes that std does not map to PermissionDenied
    #[cfg(unix)]
    fn classify_raw(err: &io::Error) -> ErrorClass {
        match err.raw_os_error() {
            Some(code) if code == libc::EPERM || code == libc::EROFS => {
                ErrorClass::PermissionDenied
            }
            Some(code) if code == libc::ENOENT || code == libc::ENOTDIR => ErrorClass::NotFound,
            _ => ErrorClass::Other,
        }
    }

    #[cfg(not(unix))]
    fn classify_raw(_err: &io::Error) -> ErrorClass {
        ErrorClass::Other
    }
}
