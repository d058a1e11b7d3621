//! Error types
//!
//! Grid allocation and configuration loading are the only fallible
//! operations; everything else in the state machine is fail-soft.

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Errors surfaced to the caller
#[derive(Error, Debug)]
pub enum Error {
    /// Grid (or tab-stop) storage could not be allocated during
    /// initialization or resize
    #[error("failed to allocate {width}x{height} cell grid")]
    GridAlloc {
        width: usize,
        height: usize,
        #[source]
        source: TryReserveError,
    },

    /// Configuration file could not be read
    #[error("failed to read configuration file")]
    ConfigIo(#[source] io::Error),

    /// Configuration file could not be parsed
    #[error("failed to parse configuration file")]
    ConfigParse(#[source] toml::de::Error),
}

/// Result type for vtgrid operations
pub type Result<T> = std::result::Result<T, Error>;
