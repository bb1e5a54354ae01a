use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "snake_arena=info";
const LOG_FILE_NAME: &str = "snake-arena.log";

/// Where log lines go.
#[derive(Debug, Clone)]
pub enum LogTarget {
    /// Headless commands.
    Stderr,
    /// Full-screen commands, which own the terminal.
    File(PathBuf),
}

impl LogTarget {
    /// Log file inside the per-user data directory.
    #[must_use]
    pub fn default_file() -> Self {
        Self::File(crate::config::data_dir().join(LOG_FILE_NAME))
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init(target: &LogTarget) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    match target {
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
    }

    Ok(())
}

fn open_log_file(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    OpenOptions::new().create(true).append(true).open(path)
}
