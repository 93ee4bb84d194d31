use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::overwrite_engine::{PassProgress, ProgressCallback};

const BAR_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:30.green/240}] {bytes}/{total_bytes} ({bytes_per_sec}, ETA {eta})";

/// One progress bar per file currently being shredded.
///
/// Bars are keyed by path so concurrent traversal workers each get their own
/// line. A bar is removed once the final pass of its file has been written.
pub struct ShredProgress {
    multi: MultiProgress,
    style: ProgressStyle,
    bars: Mutex<HashMap<PathBuf, ProgressBar>>,
}

impl ShredProgress {
    /// Draw to stderr
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Track progress without drawing anything
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");

        Self {
            multi: MultiProgress::with_draw_target(target),
            style,
            bars: Mutex::new(HashMap::new()),
        }
    }

    /// Feed one engine progress event
    pub fn update(&self, progress: &PassProgress<'_>) {
        let Ok(mut bars) = self.bars.lock() else {
            return;
        };

        let bar = bars.entry(progress.path.to_path_buf()).or_insert_with(|| {
            let bar = self.multi.add(ProgressBar::new(progress.length));
            bar.set_style(self.style.clone());
            bar
        });

        if progress.bytes_done == 0 || bar.position() > progress.bytes_done {
            bar.reset();
        }
        bar.set_length(progress.length);
        bar.set_message(format!(
            "{} pass {}/{}",
            short_name(progress.path),
            progress.pass,
            progress.total_passes
        ));
        bar.set_position(progress.bytes_done);

        if progress.pass == progress.total_passes && progress.bytes_done >= progress.length {
            bar.finish_and_clear();
            self.multi.remove(bar);
            bars.remove(progress.path);
        }
    }

    /// Remove bars left behind by files that failed mid-pass
    pub fn clear(&self) {
        if let Ok(mut bars) = self.bars.lock() {
            for (_, bar) in bars.drain() {
                bar.finish_and_clear();
                self.multi.remove(&bar);
            }
        }
    }

    /// Number of files with a bar on screen
    pub fn active(&self) -> usize {
        self.bars.lock().map(|bars| bars.len()).unwrap_or(0)
    }

    /// Adapter for [`OverwriteEngine::with_progress_callback`](crate::OverwriteEngine::with_progress_callback)
    pub fn callback(self: &Arc<Self>) -> ProgressCallback {
        let this = Arc::clone(self);
        into_callback(move |progress| this.update(progress))
    }
}

impl Default for ShredProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn into_callback<F>(f: F) -> ProgressCallback
where
    F: Fn(&PassProgress<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}

fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Convert a byte count to a readable string
pub fn human_bytes(bytes: u64) -> String {
    let units = ["B", "KB", "MB", "GB", "TB"];
    let mut val = bytes as f64;
    let mut i = 0usize;
    while val >= 1024.0 && i + 1 < units.len() {
        val /= 1024.0;
        i += 1;
    }
    if i == 0 {
        format!("{}B", bytes)
    } else {
        format!("{:.2}{}", val, units[i])
    }
}
