// Allow complex types where needed for progress callbacks and worker plumbing
#![allow(clippy::type_complexity)]

pub mod algorithms;
pub mod error;
pub mod io;
pub mod overwrite_engine;
pub mod session;
pub mod settings;
pub mod traversal;
pub mod ui;

// Re-export the main entry points for convenience
pub use algorithms::{Pass, PassPlan};
pub use error::{OverwriteResult, ShredError, ShredResult};
pub use io::IOMode;
pub use overwrite_engine::{OverwriteEngine, ShredOutcome};
pub use traversal::{Traversal, TraversalReport};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

// Global flag for handling Ctrl+C interrupts
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Set the interrupt flag (called by signal handler)
pub fn set_interrupted() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Check if an interrupt has been received
pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Reset the interrupt flag (primarily for testing)
pub fn reset_interrupted() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

/// Named overwrite strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Single pass of 0x00
    #[default]
    ZeroFill,
    /// 0x00, 0xFF, random, with read-back verification of the random pass
    #[serde(rename = "dod-3-pass")]
    Dod3Pass,
    /// Single pass of pseudo-random bytes
    RandomFill,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::ZeroFill, Method::Dod3Pass, Method::RandomFill];

    /// The name used on the command line and in config files
    pub fn name(&self) -> &'static str {
        match self {
            Method::ZeroFill => "zero-fill",
            Method::Dod3Pass => "dod-3-pass",
            Method::RandomFill => "random-fill",
        }
    }

    /// The unmodified pass plan for this method
    pub fn plan(&self) -> PassPlan {
        match self {
            Method::ZeroFill => algorithms::ZeroFill::plan(),
            Method::Dod3Pass => algorithms::DoDWipe::plan(),
            Method::RandomFill => algorithms::RandomFill::plan(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = ShredError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zero-fill" | "zero" => Ok(Method::ZeroFill),
            "dod-3-pass" | "dod" => Ok(Method::Dod3Pass),
            "random-fill" | "random" => Ok(Method::RandomFill),
            other => Err(ShredError::Config(format!(
                "unknown method '{}' (expected zero-fill, dod-3-pass or random-fill)",
                other
            ))),
        }
    }
}

/// Default write chunk size (4MB)
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Fully resolved shredding configuration.
///
/// Built once by the caller (CLI, config file, tests) and handed to
/// [`OverwriteEngine`] and [`Traversal`]; nothing reads configuration from
/// global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShredConfig {
    pub method: Method,
    /// Pass-count override; the method's passes are cycled to this length
    pub passes: Option<u32>,
    /// Verification override; `None` keeps the method's default
    pub verify: Option<bool>,
    /// How many times the whole pass sequence runs before unlink
    pub repetitions: u32,
    pub io_mode: IOMode,
    pub chunk_size: usize,
    /// Traversal worker count (0 = one per CPU)
    pub jobs: usize,
}

impl Default for ShredConfig {
    fn default() -> Self {
        Self {
            method: Method::ZeroFill,
            passes: None,
            verify: None,
            repetitions: 1,
            io_mode: IOMode::Synchronous,
            chunk_size: DEFAULT_CHUNK_SIZE,
            jobs: 1,
        }
    }
}

impl ShredConfig {
    pub fn for_method(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    /// Reject values that would make the engine do nothing or loop forever
    pub fn validate(&self) -> ShredResult<()> {
        if self.passes == Some(0) {
            return Err(ShredError::Config("passes must be at least 1".into()));
        }
        if self.repetitions == 0 {
            return Err(ShredError::Config("repetitions must be at least 1".into()));
        }
        if self.chunk_size == 0 {
            return Err(ShredError::Config("chunk_size must be non-zero".into()));
        }
        Ok(())
    }

    /// The method's plan with overrides applied
    pub fn pass_plan(&self) -> PassPlan {
        let mut plan = self.method.plan();
        if let Some(count) = self.passes {
            plan = plan.with_pass_count(count as usize);
        }
        if let Some(verify) = self.verify {
            plan.verify_final = verify;
        }
        plan.with_repetitions(self.repetitions)
    }

    /// Effective worker count for traversal
    pub fn worker_count(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get().max(1)
        } else {
            self.jobs
        }
    }
}
