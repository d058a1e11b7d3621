//! Configuration loading
//!
//! Optional TOML configuration read from `~/.vtgrid/config.toml`:
//!
//! ```toml
//! # Diagnostic verbosity: 0 silent .. 4 trace + file log
//! verbosity = 2
//!
//! # Log file used at verbosity 4 (default: ~/.vtgrid/vtgrid.log)
//! log_file = "C:/tmp/vtgrid.log"
//!
//! [palette]
//! # Substitute individual entries of the 16-color palette
//! substitutions = [{ index = 2, color = "#00cd00" }]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::{Palette, Rgb};
use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagnostic verbosity: 0 silent, 1 errors, 2 info, 3 debug,
    /// 4 trace with file log
    pub verbosity: u8,
    /// Log file path used at verbosity 4
    pub log_file: Option<PathBuf>,
    /// Palette substitutions
    pub palette: PaletteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbosity: 0,
            log_file: None,
            palette: PaletteConfig::default(),
        }
    }
}

/// Palette substitution entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub substitutions: Vec<PaletteEntry>,
}

/// A single palette substitution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Palette slot 0..16
    pub index: usize,
    /// Color as `#rrggbb`
    pub color: String,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when the file is missing or unreadable
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_path(&path).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Load configuration from an explicit path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(Error::ConfigIo)?;
        toml::from_str(&content).map_err(Error::ConfigParse)
    }

    /// Build the palette with this configuration's substitutions applied
    pub fn palette(&self) -> Palette {
        let mut palette = Palette::default();
        for entry in &self.palette.substitutions {
            if let Some(color) = parse_hex(&entry.color) {
                palette.substitute(entry.index, color);
            }
        }
        palette
    }

    /// Log file path, defaulting to `~/.vtgrid/vtgrid.log`
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| home_dir().map(|h| h.join(".vtgrid").join("vtgrid.log")))
    }

    fn config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".vtgrid").join("config.toml"))
    }
}

/// Parse a `#rrggbb` hex color
fn parse_hex(s: &str) -> Option<Rgb> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb::new(r, g, b))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}
