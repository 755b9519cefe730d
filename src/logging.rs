//! Per-stage log sink setup
//!
//! Each job (ingestion, summary) appends to its own log file, e.g.
//! `Logs/ingestion.log`. Without a log directory everything goes to stderr.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Pipeline stage, used to pick the log file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingestion,
    Summary,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ingestion => "ingestion",
            Stage::Summary => "summary",
        }
    }
}

/// Path of the append-only log file for a stage
pub fn stage_log_path(log_dir: &Path, stage: Stage) -> PathBuf {
    log_dir.join(format!("{}.log", stage.as_str()))
}

/// Initialize env_logger for this process
///
/// Filter comes from `RUST_LOG` (default: info). Records are written as
/// `<timestamp> - <LEVEL> - <message>`.
pub fn init_logger(stage: Stage, log_dir: Option<&Path>) -> std::io::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} - {} - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.args()
        )
    });

    match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(stage_log_path(dir, stage))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.target(env_logger::Target::Stderr);
        }
    }

    // A second init (tests, embedding) keeps the first logger
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized, keeping existing sink");
    }

    Ok(())
}
