use super::{Pass, PassPlan};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// Single pass of pseudo-random data, no verification.
///
/// The bytes only need to obscure the previous contents, so a fast
/// non-cryptographic generator is used.
pub struct RandomFill;

impl RandomFill {
    pub const PASS_COUNT: usize = 1;

    pub fn plan() -> PassPlan {
        PassPlan::new(vec![Pass::Random], false)
    }
}

/// Seeded PRNG stream backing a random pass.
///
/// The output depends only on the seed and the byte position, never on how
/// the caller slices its fills, so a replay with a different chunk size
/// still reproduces the same bytes.
#[derive(Debug, Clone)]
pub struct SeededStream {
    seed: u64,
    rng: SmallRng,
    // Unconsumed tail of the last generated word
    pending: [u8; 8],
    pending_len: usize,
}

impl SeededStream {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
            pending: [0u8; 8],
            pending_len: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn fill(&mut self, buf: &mut [u8]) {
        let from_pending = self.pending_len.min(buf.len());
        let start = 8 - self.pending_len;
        buf[..from_pending].copy_from_slice(&self.pending[start..start + from_pending]);
        self.pending_len -= from_pending;

        let rest = &mut buf[from_pending..];
        let mut words = rest.chunks_exact_mut(8);
        for word in &mut words {
            word.copy_from_slice(&self.rng.next_u64().to_le_bytes());
        }

        let tail = words.into_remainder();
        if !tail.is_empty() {
            self.pending = self.rng.next_u64().to_le_bytes();
            tail.copy_from_slice(&self.pending[..tail.len()]);
            self.pending_len = 8 - tail.len();
        }
    }
}
