//! tracing subscriber setup. The terminal UI owns stdout, so interactive runs log to a file.

use color_eyre::Result;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::cache::CacheManager;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Append to a file, creating its directory when needed.
    File(PathBuf),
}

impl LogTarget {
    /// The log file in the cache directory.
    pub fn cache_file(cache: &CacheManager) -> Self {
        Self::File(cache.log_file())
    }
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "warn,csvscope=debug"
    } else {
        "warn,csvscope=info"
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `debug`.
/// Installing twice is not an error; the first subscriber stays.
pub fn init_logging(target: &LogTarget, debug: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .try_init();
        }
        LogTarget::File(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
    }
    Ok(())
}
