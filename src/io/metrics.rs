// Throughput and outcome counters shared by every engine invocation in a run

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Real-time I/O metrics, safe to share across traversal workers
#[derive(Debug)]
pub struct IOMetrics {
    start_time: Instant,
    bytes_written: AtomicU64,
    bytes_verified: AtomicU64,
    write_calls: AtomicU64,
    files_deleted: AtomicU64,
    files_failed: AtomicU64,
    slowest_pass: Mutex<Duration>,
}

impl IOMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            bytes_written: AtomicU64::new(0),
            bytes_verified: AtomicU64::new(0),
            write_calls: AtomicU64::new(0),
            files_deleted: AtomicU64::new(0),
            files_failed: AtomicU64::new(0),
            slowest_pass: Mutex::new(Duration::ZERO),
        }
    }

    /// Record one write call
    pub fn record_write(&self, bytes: u64) {
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
        self.write_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_verified(&self, bytes: u64) {
        self.bytes_verified.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record how long a full pass (writes plus sync) took
    pub fn record_pass(&self, elapsed: Duration) {
        if let Ok(mut slowest) = self.slowest_pass.lock() {
            if elapsed > *slowest {
                *slowest = elapsed;
            }
        }
    }

    pub fn record_file(&self, deleted: bool) {
        if deleted {
            self.files_deleted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.files_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current write throughput in bytes/sec
    pub fn throughput(&self) -> u64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0;
        }

        (self.bytes_written.load(Ordering::Relaxed) as f64 / elapsed) as u64
    }

    pub fn stats(&self) -> PerformanceStats {
        PerformanceStats {
            elapsed: self.start_time.elapsed(),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_verified: self.bytes_verified.load(Ordering::Relaxed),
            write_calls: self.write_calls.load(Ordering::Relaxed),
            files_deleted: self.files_deleted.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            throughput_bps: self.throughput(),
            slowest_pass: self
                .slowest_pass
                .lock()
                .map(|d| *d)
                .unwrap_or(Duration::ZERO),
        }
    }
}

impl Default for IOMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`IOMetrics`]
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceStats {
    pub elapsed: Duration,
    pub bytes_written: u64,
    pub bytes_verified: u64,
    pub write_calls: u64,
    pub files_deleted: u64,
    pub files_failed: u64,
    pub throughput_bps: u64,
    pub slowest_pass: Duration,
}

impl PerformanceStats {
    /// One-line human summary
    pub fn summary(&self) -> String {
        // Millisecond resolution keeps humantime output short
        let elapsed = Duration::from_millis(self.elapsed.as_millis() as u64);
        format!(
            "{} deleted, {} failed, {:.2} MB written in {} ({:.2} MB/s)",
            self.files_deleted,
            self.files_failed,
            self.bytes_written as f64 / (1024.0 * 1024.0),
            humantime::format_duration(elapsed),
            self.throughput_bps as f64 / (1024.0 * 1024.0)
        )
    }
}
