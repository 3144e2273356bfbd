//! Log output setup
//!
//! The terminal belongs to the UI, so events go to a file. `RUST_LOG` takes
//! precedence over the configured level.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Builds the level filter from `RUST_LOG`, falling back to `level`
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber writing to `path`
///
/// Without a path, logging stays disabled.
pub fn init(level: &str, path: Option<&Path>) -> std::io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = open_log_file(path)?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_filter(env_filter(level)),
        )
        .init();
    tracing::info!(path = %path.display(), "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_log_file_creates_parent_dirs() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nested").join("logs").join("cheroterm.log");

        open_log_file(&path).expect("log file should open");
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_level_falls_back() {
        // Either RUST_LOG or the fallback must produce a usable filter
        let filter = env_filter("not a level ((");
        assert!(!filter.to_string().is_empty());
    }
}
