//! Cell grid
//!
//! A flat width×height array of cells, exclusively owned by the TTY
//! instance. Allocation goes through `try_reserve_exact` so resource
//! exhaustion surfaces as an error instead of aborting the process.

use bitflags::bitflags;

use super::charset::dec_graphics;
use crate::color::Rgb;
use crate::error::{Error, Result};

bitflags! {
    /// Per-cell style flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct StyleFlags: u8 {
        const BOLD        = 0b0000_0001;
        const DIM         = 0b0000_0010;
        const ITALIC      = 0b0000_0100;
        const UNDERLINE   = 0b0000_1000;
        const BLINK       = 0b0001_0000;
        const INVERSE     = 0b0010_0000;
        /// Codepoint written under DEC Special Graphics; resolved by
        /// [`Cell::glyph`] on read
        const ALT_CHARSET = 0b0100_0000;
    }
}

impl StyleFlags {
    /// Convert to crossterm attributes. `ALT_CHARSET` has no crossterm
    /// equivalent; [`Cell::glyph`] already resolves it.
    pub fn to_crossterm(self) -> crossterm::style::Attributes {
        use crossterm::style::Attribute;
        let mut attrs = crossterm::style::Attributes::default();
        if self.contains(Self::BOLD) {
            attrs.set(Attribute::Bold);
        }
        if self.contains(Self::DIM) {
            attrs.set(Attribute::Dim);
        }
        if self.contains(Self::ITALIC) {
            attrs.set(Attribute::Italic);
        }
        if self.contains(Self::UNDERLINE) {
            attrs.set(Attribute::Underlined);
        }
        if self.contains(Self::BLINK) {
            attrs.set(Attribute::SlowBlink);
        }
        if self.contains(Self::INVERSE) {
            attrs.set(Attribute::Reverse);
        }
        attrs
    }
}

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Stored codepoint (raw, before charset translation)
    pub ch: char,
    pub flags: StyleFlags,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Cell {
    /// A blank cell with the given colors and no style
    pub fn blank(fg: Rgb, bg: Rgb) -> Self {
        Self {
            ch: ' ',
            flags: StyleFlags::empty(),
            fg,
            bg,
        }
    }

    /// The displayable codepoint, with DEC Special Graphics applied when
    /// the cell was written under the alternate charset
    pub fn glyph(&self) -> char {
        if self.flags.contains(StyleFlags::ALT_CHARSET) {
            dec_graphics(self.ch)
        } else {
            self.ch
        }
    }
}

/// Width×height cell array
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Allocate a grid filled with `blank`
    pub fn new(width: usize, height: usize, blank: Cell) -> Result<Self> {
        let cells = alloc_cells(width, height, blank)?;
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[y * self.width + x]
    }

    pub fn cell_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        &mut self.cells[y * self.width + x]
    }

    /// Reallocate to `width`×`height`, preserving the overlapping
    /// top-left rectangle
    pub fn resize(&mut self, width: usize, height: usize, blank: Cell) -> Result<()> {
        let mut cells = alloc_cells(width, height, blank)?;
        let copy_w = self.width.min(width);
        let copy_h = self.height.min(height);
        for y in 0..copy_h {
            let src = y * self.width;
            let dst = y * width;
            cells[dst..dst + copy_w].copy_from_slice(&self.cells[src..src + copy_w]);
        }
        self.width = width;
        self.height = height;
        self.cells = cells;
        Ok(())
    }

    /// Refill every cell with `blank`
    pub fn fill(&mut self, blank: Cell) {
        self.cells.fill(blank);
    }

    /// Shift rows of `[top, bot)` by `lines`: positive scrolls up (rows
    /// move toward `top`), negative scrolls down. Vacated rows become
    /// `blank`. A shift of at least the region height clears the region.
    pub fn scroll(&mut self, top: usize, bot: usize, lines: isize, blank: Cell) {
        if top >= bot || bot > self.height || lines == 0 {
            return;
        }
        let region = bot - top;
        let n = lines.unsigned_abs();
        if n >= region {
            for y in top..bot {
                self.clear_row_span(y, 0, self.width - 1, blank);
            }
            return;
        }
        if lines > 0 {
            for y in top..bot - n {
                let (src, dst) = ((y + n) * self.width, y * self.width);
                self.cells.copy_within(src..src + self.width, dst);
            }
            for y in bot - n..bot {
                self.clear_row_span(y, 0, self.width - 1, blank);
            }
        } else {
            for y in (top + n..bot).rev() {
                let (src, dst) = ((y - n) * self.width, y * self.width);
                self.cells.copy_within(src..src + self.width, dst);
            }
            for y in top..top + n {
                self.clear_row_span(y, 0, self.width - 1, blank);
            }
        }
    }

    /// Clear the inclusive span from (x1,y1) to (x2,y2) in reading order;
    /// intermediate rows are cleared whole. The range is produced from
    /// pre-clamped cursor coordinates, so an inverted range is an internal
    /// bug: asserted in debug builds, clamped in release.
    pub fn erase(&mut self, x1: usize, y1: usize, x2: usize, y2: usize, blank: Cell) {
        debug_assert!(
            y1 < y2 || (y1 == y2 && x1 <= x2),
            "inverted erase span ({x1},{y1})..({x2},{y2})"
        );
        if y1 > y2 || (y1 == y2 && x1 > x2) {
            return;
        }
        let x2 = x2.min(self.width - 1);
        let y2 = y2.min(self.height - 1);
        if y1 == y2 {
            self.clear_row_span(y1, x1, x2, blank);
            return;
        }
        self.clear_row_span(y1, x1, self.width - 1, blank);
        for y in y1 + 1..y2 {
            self.clear_row_span(y, 0, self.width - 1, blank);
        }
        self.clear_row_span(y2, 0, x2, blank);
    }

    fn clear_row_span(&mut self, y: usize, x1: usize, x2: usize, blank: Cell) {
        let base = y * self.width;
        self.cells[base + x1..=base + x2].fill(blank);
    }
}

fn alloc_cells(width: usize, height: usize, blank: Cell) -> Result<Vec<Cell>> {
    let len = width * height;
    let mut cells = Vec::new();
    cells
        .try_reserve_exact(len)
        .map_err(|source| Error::GridAlloc {
            width,
            height,
            source,
        })?;
    cells.resize(len, blank);
    Ok(cells)
}
