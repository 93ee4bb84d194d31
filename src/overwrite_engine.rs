// Overwrite Engine - destroys one file's contents, then unlinks it
//
// Every pass rewrites the file from offset 0 over the length captured at open
// time. Passes are strictly sequential and each is synced before the next
// starts. Any failure leaves the file on disk and is returned as a value.

use crate::algorithms::{PassPlan, PatternSource};
use crate::error::{ErrorContext, OverwriteResult, ShredError, ShredResult};
use crate::io::{get_platform_io, IOMetrics, IOMode, PlatformIO, TargetFile};
use crate::{is_interrupted, ShredConfig};
use std::io::{ErrorKind, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Progress of the pass currently being written
#[derive(Debug, Clone, Copy)]
pub struct PassProgress<'a> {
    pub path: &'a Path,
    /// 1-based, counting repetitions
    pub pass: usize,
    pub total_passes: usize,
    pub bytes_done: u64,
    pub length: u64,
}

pub type ProgressCallback = Arc<dyn Fn(&PassProgress<'_>) + Send + Sync>;

/// Details of a successful shred
#[derive(Debug, Clone, PartialEq)]
pub struct ShredOutcome {
    pub path: PathBuf,
    /// File length captured at open time
    pub length: u64,
    pub passes_written: usize,
    pub bytes_written: u64,
    pub verified: bool,
    pub elapsed: Duration,
}

/// Applies a [`PassPlan`] to files and deletes them.
pub struct OverwriteEngine {
    plan: PassPlan,
    io_mode: IOMode,
    chunk_size: usize,
    platform: Box<dyn PlatformIO>,
    metrics: Arc<IOMetrics>,
    progress: Option<ProgressCallback>,
}

impl OverwriteEngine {
    /// Create an engine on the local filesystem
    pub fn new(config: &ShredConfig) -> ShredResult<Self> {
        config.validate()?;
        Ok(Self::with_platform(config, get_platform_io()))
    }

    /// Create an engine on top of a custom storage implementation
    pub fn with_platform(config: &ShredConfig, platform: Box<dyn PlatformIO>) -> Self {
        Self {
            plan: config.pass_plan(),
            io_mode: config.io_mode,
            chunk_size: config.chunk_size.max(1),
            platform,
            metrics: Arc::new(IOMetrics::new()),
            progress: None,
        }
    }

    /// Share a metrics collector with other engines
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<IOMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set a callback invoked after every chunk written
    #[must_use]
    pub fn with_progress<F>(self, callback: F) -> Self
    where
        F: Fn(&PassProgress<'_>) + Send + Sync + 'static,
    {
        self.with_progress_callback(Arc::new(callback))
    }

    #[must_use]
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn plan(&self) -> &PassPlan {
        &self.plan
    }

    pub fn metrics(&self) -> &Arc<IOMetrics> {
        &self.metrics
    }

    pub fn platform_name(&self) -> &str {
        self.platform.platform_name()
    }

    /// Overwrite and delete `path`, reporting the outcome as a value.
    ///
    /// Never panics on I/O failure and never returns an error: every failure
    /// becomes a non-`Deleted` [`OverwriteResult`] with the file left in place.
    pub fn securely_delete(&self, path: &Path) -> OverwriteResult {
        self.securely_delete_detailed(path).0
    }

    /// Like [`securely_delete`](Self::securely_delete), also returning the
    /// shred details when the file was deleted
    pub fn securely_delete_detailed(&self, path: &Path) -> (OverwriteResult, Option<ShredOutcome>) {
        let (result, outcome) = match self.shred(path) {
            Ok(outcome) => {
                tracing::info!(
                    path = %path.display(),
                    bytes = outcome.length,
                    passes = outcome.passes_written,
                    verified = outcome.verified,
                    "File shredded and deleted"
                );
                (OverwriteResult::Deleted, Some(outcome))
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Shred failed, file left in place");
                (OverwriteResult::from(&err), None)
            }
        };

        self.metrics.record_file(result.is_deleted());
        (result, outcome)
    }

    /// Overwrite and delete `path`, returning details or the first error.
    pub fn shred(&self, path: &Path) -> ShredResult<ShredOutcome> {
        let start = Instant::now();

        if is_interrupted() {
            return Err(ShredError::Interrupted);
        }

        let mut file = self
            .platform
            .open_target(path, self.io_mode)
            .map_err(|e| ShredError::from_io(e, ErrorContext::new("open", path)))?;

        // Fixed for every pass and every repetition of this target
        let length = file
            .seek(SeekFrom::End(0))
            .map_err(|e| ShredError::from_io(e, ErrorContext::new("seek", path)))?;

        tracing::debug!(path = %path.display(), length, plan = %self.plan, "Opened target");

        let mut buffer = vec![0u8; chunk_len(self.chunk_size, length)];
        let total_passes = self.plan.total_passes();
        let mut passes_written = 0usize;
        let mut bytes_written = 0u64;
        let mut verified = false;

        for repetition in 0..self.plan.repetitions as usize {
            let mut last_source: Option<PatternSource> = None;

            for (index, pass) in self.plan.passes.iter().enumerate() {
                if is_interrupted() {
                    return Err(ShredError::Interrupted);
                }

                let pass_number = repetition * self.plan.pass_count() + index + 1;
                tracing::debug!(
                    path = %path.display(),
                    pass = pass_number,
                    total = total_passes,
                    pattern = %pass,
                    "Writing pass"
                );

                let mut source = pass.source();
                bytes_written += self.write_pass(
                    &mut *file,
                    path,
                    &mut source,
                    length,
                    &mut buffer,
                    pass_number,
                    total_passes,
                )?;
                passes_written += 1;
                last_source = Some(source);
            }

            if self.plan.verify_final {
                if let Some(source) = last_source {
                    self.verify_pass(&mut *file, path, source.replay(), length, &mut buffer)?;
                    verified = true;
                }
            }
        }

        drop(file);

        // Point of no return: the interrupt flag is not consulted after this
        self.platform
            .unlink(path)
            .map_err(|e| ShredError::from_io(e, ErrorContext::new("unlink", path)))?;

        Ok(ShredOutcome {
            path: path.to_path_buf(),
            length,
            passes_written,
            bytes_written,
            verified,
            elapsed: start.elapsed(),
        })
    }

    /// Write one full pass from offset 0 and sync it
    #[allow(clippy::too_many_arguments)]
    fn write_pass(
        &self,
        file: &mut dyn TargetFile,
        path: &Path,
        source: &mut PatternSource,
        length: u64,
        buffer: &mut [u8],
        pass: usize,
        total: usize,
    ) -> ShredResult<u64> {
        let started = Instant::now();
        let context = || ErrorContext::for_pass(path, pass, total);

        file.seek(SeekFrom::Start(0))
            .map_err(|e| ShredError::from_io(e, context()))?;

        // At least one write call per pass, even for an empty file
        let mut offset = 0u64;
        loop {
            let n = (length - offset).min(buffer.len() as u64) as usize;
            let chunk = &mut buffer[..n];
            source.fill(chunk);

            write_chunk(file, chunk)
                .map_err(|e| ShredError::from_io(e, context().with_offset(offset)))?;
            self.metrics.record_write(n as u64);
            offset += n as u64;
            self.report_progress(path, pass, total, offset, length);

            if offset >= length {
                break;
            }
            if is_interrupted() {
                return Err(ShredError::Interrupted);
            }
        }

        file.flush()
            .and_then(|_| file.sync_data())
            .map_err(|e| ShredError::from_io(e, ErrorContext::new("sync", path)))?;

        self.metrics.record_pass(started.elapsed());
        Ok(offset)
    }

    /// Read the file back and compare it with the replayed final pass
    fn verify_pass(
        &self,
        file: &mut dyn TargetFile,
        path: &Path,
        mut expected_source: PatternSource,
        length: u64,
        buffer: &mut [u8],
    ) -> ShredResult<()> {
        file.seek(SeekFrom::Start(0))
            .map_err(|e| ShredError::from_io(e, ErrorContext::for_verification(path, 0)))?;

        let mut expected = vec![0u8; buffer.len()];
        let mut offset = 0u64;

        while offset < length {
            let n = (length - offset).min(buffer.len() as u64) as usize;
            let actual = &mut buffer[..n];

            match file.read_exact(actual) {
                Ok(()) => {}
                // The file shrank underneath us; what was written is gone
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Err(ShredError::VerificationFailed {
                        path: path.to_path_buf(),
                        offset,
                    });
                }
                Err(e) => {
                    return Err(ShredError::from_io(
                        e,
                        ErrorContext::for_verification(path, offset),
                    ))
                }
            }

            let expected = &mut expected[..n];
            expected_source.fill(expected);

            if let Some(pos) = actual.iter().zip(expected.iter()).position(|(a, b)| a != b) {
                return Err(ShredError::VerificationFailed {
                    path: path.to_path_buf(),
                    offset: offset + pos as u64,
                });
            }

            self.metrics.record_verified(n as u64);
            offset += n as u64;
        }

        tracing::debug!(path = %path.display(), bytes = length, "Verification passed");
        Ok(())
    }

    fn report_progress(&self, path: &Path, pass: usize, total: usize, done: u64, length: u64) {
        if let Some(callback) = &self.progress {
            callback(&PassProgress {
                path,
                pass,
                total_passes: total,
                bytes_done: done,
                length,
            });
        }
    }
}

/// Like `write_all`, but always issues at least one write call, so an empty
/// chunk still reaches the storage layer
fn write_chunk(file: &mut dyn TargetFile, chunk: &[u8]) -> std::io::Result<()> {
    let mut written = 0usize;
    loop {
        match file.write(&chunk[written..]) {
            Ok(0) if written < chunk.len() => {
                return Err(std::io::Error::new(
                    ErrorKind::WriteZero,
                    "storage accepted no bytes",
                ))
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
        if written >= chunk.len() {
            return Ok(());
        }
    }
}

/// Buffer size for a file of `length` bytes: never larger than the file
fn chunk_len(chunk_size: usize, length: u64) -> usize {
    length.min(chunk_size as u64) as usize
}
