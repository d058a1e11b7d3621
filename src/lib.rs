//! vtgrid - a VT100/ANSI escape-sequence state machine
//!
//! vtgrid interprets a byte stream of text and ANSI/VT100 escape
//! sequences and maintains an in-memory character grid representing a
//! virtual terminal screen. It is a pure state machine: pty plumbing,
//! font rendering and window-system glue belong to the embedder.
//!
//! # Features
//!
//! - **Byte-at-a-time dispatch**: feed pty output as it arrives, UTF-8
//!   sequences may be split across calls
//! - **Cell grid**: codepoint, style flags and resolved RGB colors per
//!   cell, read directly by renderers
//! - **Scroll regions, tab stops, origin mode, auto-wrap** with VT100
//!   last-column semantics
//! - **DEC Special Graphics**: box-drawing glyphs resolved on read
//! - **Status reports**: device/cursor reports queued and delivered
//!   through a callback after each call returns
//! - **Fail-soft**: unrecognized sequences are logged and ignored, never
//!   an error
//!
//! # Quick Start
//!
//! ```
//! use vtgrid::Term;
//!
//! let mut term = Term::new(80, 24).unwrap();
//! term.process(b"\x1b[1mHi\r\nThere");
//! assert_eq!(term.grid().cell(0, 0).ch, 'H');
//! assert_eq!(term.grid().cell(2, 1).ch, 'e');
//! let cursor = term.cursor();
//! assert_eq!((cursor.x, cursor.y), (5, 1));
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod logging;
pub mod term;

pub use color::{Palette, Rgb};
pub use config::Config;
pub use error::{Error, Result};
pub use term::grid::{Cell, Grid, StyleFlags};
pub use term::{Report, Term};
