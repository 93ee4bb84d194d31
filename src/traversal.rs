//! Recursive directory traversal feeding the overwrite engine.
//!
//! Every regular file under the root is shredded independently: one file's
//! failure is recorded and the walk continues. Symlinks below the root are
//! never followed and never shredded, special files are skipped, and
//! directories are left in place.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel as channel;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, OverwriteResult, ShredError};
use crate::io::platform_specific::non_regular_kind;
use crate::is_interrupted;
use crate::overwrite_engine::OverwriteEngine;

/// Outcome for one path visited by the traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: OverwriteResult,
    /// Bytes written across all passes; 0 unless deleted
    #[serde(default)]
    pub bytes_written: u64,
}

impl FileOutcome {
    /// Run `engine` on one file and capture the outcome
    pub fn shred(engine: &OverwriteEngine, path: PathBuf) -> Self {
        let (result, outcome) = engine.securely_delete_detailed(&path);
        Self {
            path,
            result,
            bytes_written: outcome.map_or(0, |o| o.bytes_written),
        }
    }

    fn failed(path: PathBuf, result: OverwriteResult) -> Self {
        Self {
            path,
            result,
            bytes_written: 0,
        }
    }
}

/// Everything a traversal did, in completion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalReport {
    pub outcomes: Vec<FileOutcome>,
    /// Non-regular entries left untouched (symlinks, fifos, sockets, devices)
    pub skipped: Vec<PathBuf>,
    pub interrupted: bool,
}

impl TraversalReport {
    pub fn deleted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_deleted()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.result.is_deleted())
    }

    pub fn all_deleted(&self) -> bool {
        !self.interrupted && self.failures().next().is_none()
    }
}

/// Walks a tree and hands each regular file to an [`OverwriteEngine`].
pub struct Traversal<'e> {
    engine: &'e OverwriteEngine,
    workers: usize,
}

impl<'e> Traversal<'e> {
    /// `workers` of 1 processes files inline in directory order
    pub fn new(engine: &'e OverwriteEngine, workers: usize) -> Self {
        Self {
            engine,
            workers: workers.max(1),
        }
    }

    /// Shred every regular file reachable under `root`.
    ///
    /// The root alone is resolved through symlinks, so a link to a directory
    /// is walked. Anything else at the root goes to the engine as a single
    /// target and is shredded or refused there, never silently skipped.
    pub fn run(&self, root: &Path) -> TraversalReport {
        let mut report = TraversalReport::default();

        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                report.outcomes.push(FileOutcome::shred(self.engine, root.to_path_buf()));
                report.interrupted = is_interrupted();
                return report;
            }
            Err(e) => {
                let err = ShredError::from_io(e, ErrorContext::new("stat", root));
                report
                    .outcomes
                    .push(FileOutcome::failed(root.to_path_buf(), OverwriteResult::from(&err)));
                return report;
            }
        }

        if self.workers == 1 {
            self.walk(root, &mut report, &mut |path, report| {
                report.outcomes.push(FileOutcome::shred(self.engine, path));
            });
        } else {
            self.run_parallel(root, &mut report);
        }

        report.interrupted = is_interrupted();
        report
    }

    /// Bounded worker pool: discovery on this thread, shredding on workers
    fn run_parallel(&self, root: &Path, report: &mut TraversalReport) {
        let (work_tx, work_rx) = channel::bounded::<PathBuf>(self.workers * 4);
        let (done_tx, done_rx) = channel::unbounded::<FileOutcome>();

        thread::scope(|scope| {
            for _ in 0..self.workers {
                let work_rx = work_rx.clone();
                let done_tx = done_tx.clone();
                let engine = self.engine;
                scope.spawn(move || {
                    for path in work_rx {
                        if done_tx.send(FileOutcome::shred(engine, path)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(work_rx);
            drop(done_tx);

            self.walk(root, report, &mut |path, report| {
                // Drain finished work so results keep flowing while we discover
                report.outcomes.extend(done_rx.try_iter());
                if work_tx.send(path).is_err() {
                    tracing::error!("Worker pool shut down unexpectedly");
                }
            });
            drop(work_tx);

            report.outcomes.extend(done_rx.iter());
        });
    }

    /// Depth-first walk in directory-entry order, calling `visit` per file
    fn walk(
        &self,
        dir: &Path,
        report: &mut TraversalReport,
        visit: &mut dyn FnMut(PathBuf, &mut TraversalReport),
    ) {
        if is_interrupted() {
            return;
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.record_dir_error(dir, "read_dir", e, report);
                return;
            }
        };

        for entry in entries {
            if is_interrupted() {
                return;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.record_dir_error(dir, "read_dir", e, report);
                    continue;
                }
            };
            let path = entry.path();

            // DirEntry::file_type does not follow symlinks
            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    self.record_dir_error(&path, "stat", e, report);
                    continue;
                }
            };

            if file_type.is_dir() {
                self.walk(&path, report, visit);
            } else if file_type.is_file() {
                visit(path, report);
            } else {
                tracing::debug!(
                    path = %path.display(),
                    kind = non_regular_kind(&file_type).unwrap_or("unknown"),
                    "Skipping non-regular entry"
                );
                report.skipped.push(path);
            }
        }
    }

    fn record_dir_error(
        &self,
        path: &Path,
        operation: &str,
        e: std::io::Error,
        report: &mut TraversalReport,
    ) {
        let err = ShredError::from_io(e, ErrorContext::new(operation, path));
        tracing::warn!(path = %path.display(), error = %err, "Cannot read directory entry");
        report
            .outcomes
            .push(FileOutcome::failed(path.to_path_buf(), OverwriteResult::from(&err)));
    }
}
