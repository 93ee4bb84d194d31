// Shred session - machine-readable record of one invocation

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OverwriteResult, ShredError, ShredResult};
use crate::traversal::{FileOutcome, TraversalReport};
use crate::{Method, ShredConfig};

/// Every target processed by one run of the tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShredSession {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub method: Method,
    pub config: ShredConfig,
    pub records: Vec<ShredRecord>,
    pub interrupted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShredRecord {
    pub path: PathBuf,
    pub result: OverwriteResult,
    pub reason: String,
    pub bytes_written: u64,
}

impl From<&FileOutcome> for ShredRecord {
    fn from(outcome: &FileOutcome) -> Self {
        Self {
            path: outcome.path.clone(),
            reason: outcome.result.reason(),
            result: outcome.result.clone(),
            bytes_written: outcome.bytes_written,
        }
    }
}

/// Aggregate counts over a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTotals {
    pub files_seen: usize,
    pub deleted: usize,
    pub failed: usize,
    pub bytes_written: u64,
}

impl ShredSession {
    pub fn new(config: &ShredConfig) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            start_time: Utc::now(),
            end_time: None,
            method: config.method,
            config: config.clone(),
            records: Vec::new(),
            interrupted: false,
        }
    }

    pub fn record(&mut self, outcome: &FileOutcome) {
        self.records.push(ShredRecord::from(outcome));
    }

    /// Fold a whole traversal into the session
    pub fn record_report(&mut self, report: &TraversalReport) {
        self.records.extend(report.outcomes.iter().map(ShredRecord::from));
        self.interrupted |= report.interrupted;
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Utc::now());
    }

    pub fn totals(&self) -> SessionTotals {
        self.records.iter().fold(SessionTotals::default(), |mut t, r| {
            t.files_seen += 1;
            if r.result.is_deleted() {
                t.deleted += 1;
            } else {
                t.failed += 1;
            }
            t.bytes_written += r.bytes_written;
            t
        })
    }

    pub fn to_json(&self) -> ShredResult<String> {
        #[derive(Serialize)]
        struct Document<'a> {
            #[serde(flatten)]
            session: &'a ShredSession,
            totals: SessionTotals,
        }

        serde_json::to_string_pretty(&Document {
            session: self,
            totals: self.totals(),
        })
        .map_err(|e| ShredError::Config(format!("cannot serialize session report: {}", e)))
    }

    /// Process exit status for this session.
    ///
    /// A lone file target exits with its own result code. Anything involving
    /// a directory exits 0 only if every file was deleted, 1 otherwise.
    pub fn exit_code(&self, has_directory: bool) -> i32 {
        if self.interrupted {
            return OverwriteResult::Interrupted.exit_code();
        }

        if !has_directory {
            return self
                .records
                .first()
                .map(|record| record.result.exit_code())
                .unwrap_or(0);
        }

        if self.totals().failed == 0 {
            0
        } else {
            1
        }
    }

    /// Write the pretty-printed JSON report to `path`
    pub fn write_json(&self, path: &Path) -> ShredResult<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| {
            ShredError::from_io(e, crate::error::ErrorContext::new("write report", path))
        })?;
        tracing::info!(path = %path.display(), session = %self.session_id, "Session report written");
        Ok(())
    }
}
