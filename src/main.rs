use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use colored::Colorize;
use sayonara_shred::session::ShredSession;
use sayonara_shred::settings::{self, Overrides};
use sayonara_shred::traversal::FileOutcome;
use sayonara_shred::ui::{human_bytes, ShredProgress};
use sayonara_shred::*;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sayonara-shred")]
#[command(about = "Securely overwrite files before deleting them")]
#[command(version)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .multiple(true)
        .args(["file", "directory"])
))]
struct Cli {
    /// File to shred
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Directory whose files are shredded recursively (directories are kept)
    #[arg(short, long, value_name = "PATH")]
    directory: Option<PathBuf>,

    /// Overwrite method (zero-fill, dod-3-pass, random-fill)
    #[arg(short, long)]
    method: Option<Method>,

    /// Number of passes; the method's pattern sequence is repeated to fill it
    #[arg(short = 'n', long, value_name = "N")]
    passes: Option<u32>,

    /// Read back and check the final pass
    #[arg(long, conflicts_with = "no_verify")]
    verify: bool,

    /// Skip read-back verification
    #[arg(long)]
    no_verify: bool,

    /// Run the whole pass sequence this many times before deleting
    #[arg(long, value_name = "N")]
    repetitions: Option<u32>,

    /// Write-through mode (synchronous, flush-per-pass)
    #[arg(long, value_name = "MODE")]
    io_mode: Option<IOMode>,

    /// Write chunk size in bytes
    #[arg(long, value_name = "BYTES")]
    chunk_size: Option<usize>,

    /// Parallel workers for directory targets (0 = one per CPU)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a JSON session report
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let verify = if self.verify {
            Some(true)
        } else if self.no_verify {
            Some(false)
        } else {
            None
        };

        Overrides {
            method: self.method,
            passes: self.passes,
            verify,
            repetitions: self.repetitions,
            io_mode: self.io_mode,
            chunk_size: self.chunk_size,
            jobs: self.jobs,
        }
    }

    fn show_progress(&self) -> bool {
        cfg!(feature = "progress-bars") && !self.no_progress && std::io::stderr().is_terminal()
    }
}

fn main() {
    let cli = Cli::parse();

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            1
        }
    };

    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<i32> {
    if !cfg!(feature = "color-output") {
        colored::control::set_override(false);
    }

    // Held until run() returns so buffered log lines reach the file
    let _log_guard = init_logging(cli)?;

    setup_signal_handlers()?;

    let config = settings::load(cli.config.as_deref()).context("failed to load configuration")?;
    let config = cli
        .overrides()
        .apply(config)
        .context("invalid command-line options")?;

    tracing::debug!(?config, plan = %config.pass_plan(), "Resolved configuration");

    let mut engine = OverwriteEngine::new(&config)?;
    let progress = cli.show_progress().then(|| Arc::new(ShredProgress::new()));
    if let Some(progress) = &progress {
        engine = engine.with_progress_callback(progress.callback());
    }

    let mut session = ShredSession::new(&config);

    if let Some(file) = &cli.file {
        let outcome = FileOutcome::shred(&engine, file.clone());
        report_failure(&outcome);
        session.record(&outcome);
        session.interrupted |= outcome.result == OverwriteResult::Interrupted;
    }

    if let Some(directory) = &cli.directory {
        if !is_interrupted() {
            let traversal = Traversal::new(&engine, config.worker_count());
            let report = traversal.run(directory);
            report.outcomes.iter().for_each(report_failure);
            for skipped in &report.skipped {
                tracing::info!(path = %skipped.display(), "Skipped non-regular file");
            }
            session.record_report(&report);
        }
    }

    if let Some(progress) = &progress {
        progress.clear();
    }
    session.finish();

    let totals = session.totals();
    tracing::debug!("{}", engine.metrics().stats().summary());

    if cli.directory.is_some() {
        let line = format!(
            "Shredded {} of {} files ({} written)",
            totals.deleted,
            totals.files_seen,
            human_bytes(totals.bytes_written)
        );
        if totals.failed == 0 {
            println!("{}", line.green());
        } else {
            println!("{}", line.yellow());
        }
    }

    session.interrupted |= is_interrupted();
    let mut code = session.exit_code(cli.directory.is_some());

    if let Some(path) = &cli.report {
        if let Err(e) = session.write_json(path) {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if code == 0 {
                code = 1;
            }
        }
    }

    Ok(code)
}

fn report_failure(outcome: &FileOutcome) {
    if !outcome.result.is_deleted() {
        eprintln!(
            "{} {} - {}",
            "Error:".red().bold(),
            outcome.result.reason(),
            outcome.path.display()
        );
    }
}

fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let (writer, guard, ansi) = match &cli.log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            (BoxMakeWriter::new(non_blocking), Some(guard), false)
        }
        None => (
            BoxMakeWriter::new(std::io::stderr),
            None,
            cfg!(feature = "color-output") && std::io::stderr().is_terminal(),
        ),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false);

    let installed = match cli.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_ansi(ansi).try_init(),
    };
    installed.map_err(|e| anyhow!("failed to initialise logging: {}", e))?;

    Ok(guard)
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))
}

// Signal handler for graceful shutdown
fn setup_signal_handlers() -> Result<()> {
    use signal_hook::{
        consts::{SIGINT, SIGTERM},
        iterator::Signals,
    };

    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    std::thread::spawn(move || {
        for sig in signals.forever() {
            if sig == SIGINT || sig == SIGTERM {
                eprintln!("\nInterrupt received, stopping after the current chunk...");
                eprintln!("Files not yet deleted are left in place.");
                sayonara_shred::set_interrupted();
            }
        }
    });

    Ok(())
}
