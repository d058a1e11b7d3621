//! Diagnostic logging setup
//!
//! The state machine itself only emits `tracing` events; this module maps
//! the configured verbosity onto a subscriber. Levels 1..=3 write to
//! stderr, level 4 additionally captures trace output into a log file.
//! Entirely optional: embedders with their own subscriber can skip it.

use std::fs;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;

/// Install a global subscriber matching the configured verbosity.
///
/// Returns `false` when verbosity is 0 or a global subscriber was already
/// installed.
pub fn init(config: &Config) -> bool {
    let level = match config.verbosity {
        0 => return false,
        1 => Level::ERROR,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };

    if config.verbosity >= 4 {
        let Some(path) = config.log_path() else {
            return false;
        };
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let Ok(file) = fs::OpenOptions::new().create(true).append(true).open(&path) else {
            return false;
        };
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        return tracing::subscriber::set_global_default(subscriber).is_ok();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
