//! Terminal emulation core
//!
//! This module contains the escape-sequence state machine and the screen
//! state it drives:
//!
//! - **parser**: byte-at-a-time ANSI/VT100 sequence dispatcher
//! - **state**: cell grid, cursor, scroll region, tab stops, modes
//! - **grid**: cell storage and the scroll/erase mutators
//! - **charset**: G0/G1 selection and DEC Special Graphics
//!
//! # Architecture
//!
//! ```text
//! Term
//! ├── Parser (sequence classification + dispatch tables)
//! └── TermState
//!     ├── Grid (cells + attributes)
//!     ├── Cursor (position + last-column flag)
//!     └── modes / tabs / charsets / saved cursor
//! ```

pub mod charset;
pub mod grid;
mod parser;
pub mod state;

use std::fmt;

use parser::Parser;
use state::TermState;

use crate::color::Palette;
use crate::config::Config;
use crate::error::Result;

/// A status report queued for the output callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// `DSR 5` answer: terminal OK
    DeviceOk,
    /// `DSR 6` answer: 1-based cursor position
    CursorPosition { row: usize, col: usize },
    /// Primary device attributes (`CSI c` / `ESC Z`)
    DeviceAttributes,
    /// Focus gained (mode 1004)
    FocusIn,
    /// Focus lost (mode 1004)
    FocusOut,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::DeviceOk => write!(f, "\x1b[0n"),
            Report::CursorPosition { row, col } => write!(f, "\x1b[{};{}R", row, col),
            Report::DeviceAttributes => write!(f, "\x1b[0;0c"),
            Report::FocusIn => write!(f, "\x1b[I"),
            Report::FocusOut => write!(f, "\x1b[O"),
        }
    }
}

type ReportCallback = Box<dyn FnMut(&str) + Send>;

/// A virtual terminal: the escape-sequence dispatcher plus the character
/// grid it maintains.
///
/// Feed raw pty output through [`Term::process`]; read the resulting
/// screen through [`Term::grid`]. Status reports requested by escape
/// sequences are queued during processing and handed to the report
/// callback only after the entry point has returned, so the callback can
/// never re-enter the instance it was called from.
pub struct Term {
    state: TermState,
    parser: Parser,
    on_report: Option<ReportCallback>,
}

impl Term {
    /// Create a `width`×`height` terminal with the default palette
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::with_palette(width, height, Palette::default())
    }

    /// Create a terminal with palette substitutions from `config`
    pub fn with_config(width: usize, height: usize, config: &Config) -> Result<Self> {
        Self::with_palette(width, height, config.palette())
    }

    fn with_palette(width: usize, height: usize, palette: Palette) -> Result<Self> {
        Ok(Self {
            state: TermState::new(width, height, palette)?,
            parser: Parser::new(),
            on_report: None,
        })
    }

    /// Register the callback that receives queued status reports
    pub fn set_report_callback(&mut self, callback: impl FnMut(&str) + Send + 'static) {
        self.on_report = Some(Box::new(callback));
    }

    /// Feed one byte to the dispatcher
    pub fn process_byte(&mut self, byte: u8) {
        self.parser.feed(byte, &mut self.state);
        self.flush_reports();
    }

    /// Feed a run of bytes
    pub fn process(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.parser.feed(byte, &mut self.state);
        }
        self.flush_reports();
    }

    /// Resize the grid, preserving the overlapping top-left rectangle
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        self.state.resize(width, height)
    }

    /// Full reset: screen state back to initialization defaults and any
    /// partial escape sequence abandoned
    pub fn reset(&mut self) {
        self.state.reset();
        self.parser.reset();
    }

    /// Notify the terminal of a focus change; queues a report when focus
    /// reporting (mode 1004) is enabled
    pub fn set_focus(&mut self, focused: bool) {
        if self.state.modes().focus_report {
            self.state.push_report(if focused {
                Report::FocusIn
            } else {
                Report::FocusOut
            });
        }
        self.flush_reports();
    }

    pub fn width(&self) -> usize {
        self.state.width()
    }

    pub fn height(&self) -> usize {
        self.state.height()
    }

    /// Read access for renderers
    pub fn grid(&self) -> &grid::Grid {
        self.state.grid()
    }

    /// Cursor position and last-column flag
    pub fn cursor(&self) -> state::Cursor {
        self.state.cursor()
    }

    /// Global reverse-video flag (DECSCNM), applied by renderers
    pub fn reverse_video(&self) -> bool {
        self.state.modes().reverse_video
    }

    fn flush_reports(&mut self) {
        if self.state.reports.is_empty() {
            return;
        }
        let reports = std::mem::take(&mut self.state.reports);
        if let Some(callback) = &mut self.on_report {
            for report in &reports {
                callback(&report.to_string());
            }
        }
    }
}
