/// Instrumented storage for observing what the engine writes
///
/// `RecordingStorage` wraps the real local filesystem and keeps a copy of
/// every pass written to each file, so tests can inspect the overwrite
/// patterns even though the file itself is gone afterwards.
use sayonara_shred::io::{IOMode, LocalIO, PlatformIO, TargetFile};
use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Everything observed for one file
#[derive(Debug, Default, Clone)]
pub struct FileLog {
    /// One entry per pass, in write order
    pub passes: Vec<Vec<u8>>,
    pub write_calls: usize,
    pub read_calls: usize,
    pub syncs: usize,
    pub unlinked: bool,
}

#[derive(Debug, Default)]
struct Shared {
    files: HashMap<PathBuf, FileLog>,
}

/// Fault injected into read-back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None,
    /// Flip every bit of the first byte returned by each read
    CorruptReads,
    /// Refuse to unlink
    FailUnlink,
}

#[derive(Clone)]
pub struct RecordingStorage {
    inner: Arc<LocalIO>,
    shared: Arc<Mutex<Shared>>,
    fault: Fault,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::with_fault(Fault::None)
    }

    pub fn faulty() -> Self {
        Self::with_fault(Fault::CorruptReads)
    }

    pub fn with_fault(fault: Fault) -> Self {
        Self {
            inner: Arc::new(LocalIO::new()),
            shared: Arc::new(Mutex::new(Shared::default())),
            fault,
        }
    }

    /// Boxed clone for `OverwriteEngine::with_platform`; logs stay shared
    pub fn boxed(&self) -> Box<dyn PlatformIO> {
        Box::new(self.clone())
    }

    pub fn log(&self, path: &Path) -> FileLog {
        self.shared
            .lock()
            .unwrap()
            .files
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    pub fn files_touched(&self) -> usize {
        self.shared.lock().unwrap().files.len()
    }

    pub fn total_write_calls(&self) -> usize {
        self.shared
            .lock()
            .unwrap()
            .files
            .values()
            .map(|log| log.write_calls)
            .sum()
    }
}

impl PlatformIO for RecordingStorage {
    fn open_target(&self, path: &Path, mode: IOMode) -> io::Result<Box<dyn TargetFile>> {
        let inner = self.inner.open_target(path, mode)?;
        self.shared
            .lock()
            .unwrap()
            .files
            .entry(path.to_path_buf())
            .or_default();

        Ok(Box::new(RecordingFile {
            inner,
            path: path.to_path_buf(),
            shared: Arc::clone(&self.shared),
            corrupt_reads: self.fault == Fault::CorruptReads,
            at_start: false,
        }))
    }

    fn unlink(&self, path: &Path) -> io::Result<()> {
        if self.fault == Fault::FailUnlink {
            return Err(io::Error::new(io::ErrorKind::Other, "unlink refused"));
        }
        self.inner.unlink(path)?;
        if let Some(log) = self.shared.lock().unwrap().files.get_mut(path) {
            log.unlinked = true;
        }
        Ok(())
    }

    fn platform_name(&self) -> &str {
        "recording"
    }
}

struct RecordingFile {
    inner: Box<dyn TargetFile>,
    path: PathBuf,
    shared: Arc<Mutex<Shared>>,
    corrupt_reads: bool,
    /// Next write begins a new pass
    at_start: bool,
}

impl RecordingFile {
    fn with_log<R>(&self, f: impl FnOnce(&mut FileLog) -> R) -> R {
        let mut shared = self.shared.lock().unwrap();
        f(shared.files.entry(self.path.clone()).or_default())
    }
}

impl Write for RecordingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        let new_pass = std::mem::take(&mut self.at_start);
        self.with_log(|log| {
            log.write_calls += 1;
            if new_pass || log.passes.is_empty() {
                log.passes.push(Vec::new());
            }
            if let Some(pass) = log.passes.last_mut() {
                pass.extend_from_slice(&buf[..n]);
            }
        });
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Read for RecordingFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if self.corrupt_reads && n > 0 {
            buf[0] = !buf[0];
        }
        self.with_log(|log| log.read_calls += 1);
        Ok(n)
    }
}

impl Seek for RecordingFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let offset = self.inner.seek(pos)?;
        if pos == SeekFrom::Start(0) {
            self.at_start = true;
        }
        Ok(offset)
    }
}

impl TargetFile for RecordingFile {
    fn sync_data(&mut self) -> io::Result<()> {
        self.inner.sync_data()?;
        self.with_log(|log| log.syncs += 1);
        Ok(())
    }
}
