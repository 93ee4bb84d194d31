pub mod metrics;
pub mod platform_specific;

#[cfg(test)]
mod tests;

// Re-exports
pub use metrics::{IOMetrics, PerformanceStats};
pub use platform_specific::{get_platform_io, LocalIO, PlatformIO, TargetFile};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How writes are pushed through to the storage device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IOMode {
    /// Write-through open flag (O_SYNC / FILE_FLAG_WRITE_THROUGH) plus a
    /// data sync after every pass
    #[default]
    Synchronous,
    /// Ordinary open, data sync after every pass
    FlushPerPass,
}

impl fmt::Display for IOMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IOMode::Synchronous => write!(f, "synchronous"),
            IOMode::FlushPerPass => write!(f, "flush-per-pass"),
        }
    }
}

impl FromStr for IOMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "synchronous" | "sync" => Ok(IOMode::Synchronous),
            "flush-per-pass" | "flush" => Ok(IOMode::FlushPerPass),
            other => Err(format!(
                "unknown io mode '{}' (expected synchronous or flush-per-pass)",
                other
            )),
        }
    }
}
