pub mod dod;
pub mod random;
pub mod zero;


// Re-export the per-method plans
pub use dod::DoDWipe;
pub use random::RandomFill;
pub use zero::ZeroFill;

use serde::{Deserialize, Serialize};
use std::fmt;

/// One overwrite pass: what gets written across the whole file length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pattern", content = "value", rename_all = "kebab-case")]
pub enum Pass {
    /// Every byte set to the same value
    Constant(u8),
    /// Independently drawn pseudo-random bytes
    Random,
}

impl Pass {
    /// Produce the full buffer this pass writes over `len` bytes.
    pub fn generate(&self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        self.source().fill(&mut buf);
        buf
    }

    /// Start a fresh pattern stream for one execution of this pass.
    ///
    /// Random passes draw a new seed every time this is called.
    pub fn source(&self) -> PatternSource {
        match *self {
            Pass::Constant(byte) => PatternSource::constant(byte),
            Pass::Random => PatternSource::random(rand::random()),
        }
    }

    pub fn is_random(&self) -> bool {
        matches!(self, Pass::Random)
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::Constant(byte) => write!(f, "0x{:02X}", byte),
            Pass::Random => write!(f, "random"),
        }
    }
}

/// Stateful byte stream for one pass, filled chunk by chunk.
///
/// A random stream remembers its seed, so [`PatternSource::replay`] yields a
/// source that reproduces exactly the bytes already emitted. The engine uses
/// that to verify a pass without keeping a file-sized copy in memory.
#[derive(Debug, Clone)]
pub struct PatternSource {
    kind: SourceKind,
}

#[derive(Debug, Clone)]
enum SourceKind {
    Constant(u8),
    Random(random::SeededStream),
}

impl PatternSource {
    pub fn constant(byte: u8) -> Self {
        Self {
            kind: SourceKind::Constant(byte),
        }
    }

    pub fn random(seed: u64) -> Self {
        Self {
            kind: SourceKind::Random(random::SeededStream::new(seed)),
        }
    }

    /// Fill `buf` with the next `buf.len()` bytes of the stream
    pub fn fill(&mut self, buf: &mut [u8]) {
        match &mut self.kind {
            SourceKind::Constant(byte) => buf.fill(*byte),
            SourceKind::Random(stream) => stream.fill(buf),
        }
    }

    /// A new source positioned at the start of this one's stream
    pub fn replay(&self) -> Self {
        match &self.kind {
            SourceKind::Constant(byte) => Self::constant(*byte),
            SourceKind::Random(stream) => Self::random(stream.seed()),
        }
    }
}

/// Ordered passes plus verification and repetition policy for one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassPlan {
    pub passes: Vec<Pass>,
    /// Read back and compare the last pass before unlinking
    pub verify_final: bool,
    /// Number of times the whole sequence is executed before unlink
    pub repetitions: u32,
}

impl PassPlan {
    pub fn new(passes: Vec<Pass>, verify_final: bool) -> Self {
        Self {
            passes,
            verify_final,
            repetitions: 1,
        }
    }

    /// Cycle the pass sequence until it holds exactly `count` passes.
    ///
    /// A count of zero is clamped to one; `ShredConfig::validate` rejects it
    /// before it gets here.
    pub fn with_pass_count(mut self, count: usize) -> Self {
        let count = count.max(1);
        if self.passes.is_empty() {
            return self;
        }
        self.passes = self.passes.iter().copied().cycle().take(count).collect();
        self
    }

    pub fn with_repetitions(mut self, repetitions: u32) -> Self {
        self.repetitions = repetitions.max(1);
        self
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Total passes written per file, counting repetitions
    pub fn total_passes(&self) -> usize {
        self.passes.len() * self.repetitions as usize
    }

    /// Total bytes written for a file of `length` bytes
    pub fn total_bytes(&self, length: u64) -> u64 {
        length.saturating_mul(self.total_passes() as u64)
    }
}

impl fmt::Display for PassPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passes: Vec<String> = self.passes.iter().map(|p| p.to_string()).collect();
        write!(f, "[{}]", passes.join(", "))?;
        if self.verify_final {
            write!(f, " +verify")?;
        }
        if self.repetitions > 1 {
            write!(f, " x{}", self.repetitions)?;
        }
        Ok(())
    }
}
