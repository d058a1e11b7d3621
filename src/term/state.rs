//! Terminal state
//!
//! Screen contents, cursor, scroll region, tab stops, charset slots and
//! the active style. All grid mutation funnels through the methods here;
//! the parser decides *when* to call them.

use tracing::debug;
use unicode_width::UnicodeWidthChar;

use super::charset::{Charset, CharsetSlot};
use super::grid::{Cell, Grid, StyleFlags};
use super::Report;
use crate::color::{Palette, Rgb};
use crate::error::{Error, Result};

/// Active style applied to every newly inserted cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub flags: StyleFlags,
    pub fg: Rgb,
    pub bg: Rgb,
}

/// Cursor position and the last-column flag.
///
/// `lcf` distinguishes "just printed in the rightmost column" (cursor
/// still sits atop that cell) from "logically past it, pending wrap".
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
    pub lcf: bool,
}

/// Snapshot taken by DECSC / `CSI s`
#[derive(Debug, Clone, Copy)]
struct SavedCursor {
    x: usize,
    y: usize,
    lcf: bool,
    style: Style,
}

/// Boolean terminal modes
#[derive(Debug, Clone, Copy)]
pub struct Modes {
    /// DECAWM auto-wrap
    pub auto_wrap: bool,
    /// DECOM origin mode
    pub origin: bool,
    /// DECSCNM reverse video (global, read by renderers)
    pub reverse_video: bool,
    /// LNM: line feed also returns the column
    pub linefeed_newline: bool,
    /// DECCOLM marker; recorded but does not resize the grid
    pub column_132: bool,
    /// Mode 1004 focus reporting
    pub focus_report: bool,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            auto_wrap: true,
            origin: false,
            reverse_video: false,
            linefeed_newline: false,
            column_132: false,
            focus_report: false,
        }
    }
}

/// Terminal state holding all screen data
pub struct TermState {
    grid: Grid,
    cursor: Cursor,
    saved: SavedCursor,
    /// Scroll region rows `[top, bot)`
    scroll_top: usize,
    scroll_bot: usize,
    /// Per-column tab stops, len == grid width
    tabs: Vec<bool>,
    pub(crate) style: Style,
    palette: Palette,
    g0: Charset,
    g1: Charset,
    active_slot: CharsetSlot,
    pub(crate) modes: Modes,
    /// Status reports queued during dispatch, drained by the owner after
    /// the entry point returns
    pub(crate) reports: Vec<Report>,
}

impl TermState {
    pub fn new(width: usize, height: usize, palette: Palette) -> Result<Self> {
        // Degenerate sizes are clamped rather than rejected
        let width = width.max(1);
        let height = height.max(1);
        let default_style = Style {
            flags: StyleFlags::empty(),
            fg: palette.default_fg(),
            bg: palette.default_bg(),
        };
        let blank = Cell::blank(default_style.fg, default_style.bg);
        let grid = Grid::new(width, height, blank)?;
        let tabs = alloc_tabs(width)?;
        Ok(Self {
            grid,
            cursor: Cursor::default(),
            saved: SavedCursor {
                x: 0,
                y: 0,
                lcf: false,
                style: default_style,
            },
            scroll_top: 0,
            scroll_bot: height,
            tabs,
            style: default_style,
            palette,
            g0: Charset::Ascii,
            g1: Charset::Ascii,
            active_slot: CharsetSlot::G0,
            modes: Modes::default(),
            reports: Vec::new(),
        })
    }

    /// Restore initialization-time defaults. The tab array is refilled in
    /// place; log configuration lives outside this type and is untouched.
    pub fn reset(&mut self) {
        self.style = Style {
            flags: StyleFlags::empty(),
            fg: self.palette.default_fg(),
            bg: self.palette.default_bg(),
        };
        self.grid.fill(self.blank());
        self.cursor = Cursor::default();
        self.saved = SavedCursor {
            x: 0,
            y: 0,
            lcf: false,
            style: self.style,
        };
        self.scroll_top = 0;
        self.scroll_bot = self.grid.height();
        self.default_tabs();
        self.g0 = Charset::Ascii;
        self.g1 = Charset::Ascii;
        self.active_slot = CharsetSlot::G0;
        self.modes = Modes::default();
        self.reports.clear();
    }

    /// Reallocate to `width`×`height`, preserving the overlapping
    /// top-left rectangle and clamping cursor and scroll region.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        let width = width.max(1);
        let height = height.max(1);
        self.grid.resize(width, height, self.blank())?;
        // Newly exposed columns carry no tab stop
        self.tabs.resize(width, false);
        self.cursor.x = self.cursor.x.min(width - 1);
        self.cursor.y = self.cursor.y.min(height - 1);
        self.cursor.lcf = false;
        self.saved.x = self.saved.x.min(width - 1);
        self.saved.y = self.saved.y.min(height - 1);
        self.scroll_bot = self.scroll_bot.min(height);
        if self.scroll_top >= self.scroll_bot {
            self.scroll_top = 0;
            self.scroll_bot = height;
        }
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn scroll_region(&self) -> (usize, usize) {
        (self.scroll_top, self.scroll_bot)
    }

    /// Blank cell in the FIXED default colors. Erase operations use this
    /// regardless of the currently active SGR colors.
    fn blank(&self) -> Cell {
        Cell::blank(self.palette.default_fg(), self.palette.default_bg())
    }

    pub fn resolve_color(&self, index: u32) -> Rgb {
        self.palette.resolve(index)
    }

    pub fn default_fg(&self) -> Rgb {
        self.palette.default_fg()
    }

    pub fn default_bg(&self) -> Rgb {
        self.palette.default_bg()
    }

    pub(crate) fn push_report(&mut self, report: Report) {
        self.reports.push(report);
    }

    // --- self-insert ---------------------------------------------------

    /// Place a glyph at the cursor and advance per the auto-wrap rules.
    pub fn put_char(&mut self, ch: char) {
        // Zero-width scalars produce no visible cell
        if ch.width() == Some(0) {
            return;
        }
        if self.cursor.lcf && self.modes.auto_wrap {
            // Deferred wrap from the previous print in the last column
            self.cursor.lcf = false;
            self.cursor.x = 0;
            self.index();
        }
        let mut flags = self.style.flags;
        if self.active_charset() == Charset::DecSpecial {
            flags |= StyleFlags::ALT_CHARSET;
        }
        let (x, y) = (self.cursor.x, self.cursor.y);
        *self.grid.cell_mut(x, y) = Cell {
            ch,
            flags,
            fg: self.style.fg,
            bg: self.style.bg,
        };
        if x + 1 < self.grid.width() {
            self.cursor.x = x + 1;
        } else if self.modes.auto_wrap {
            // Cursor stays atop the cell; the wrap happens on the next
            // print. With auto-wrap off it simply pins here.
            self.cursor.lcf = true;
        }
    }

    // --- line motion ----------------------------------------------------

    /// IND: move down one row, scrolling the region when leaving it
    pub fn index(&mut self) {
        if self.cursor.y + 1 == self.scroll_bot {
            self.scroll_up(1);
        } else if self.cursor.y + 1 < self.grid.height() {
            self.cursor.y += 1;
        }
    }

    /// RI: move up one row, scrolling the region down at its top
    pub fn reverse_index(&mut self) {
        if self.cursor.y == self.scroll_top {
            self.scroll_down(1);
        } else if self.cursor.y > 0 {
            self.cursor.y -= 1;
        }
    }

    /// LF/VT/FF: line feed, returning the column when LNM is set
    pub fn linefeed(&mut self) {
        self.index();
        self.cursor.lcf = false;
        if self.modes.linefeed_newline {
            self.cursor.x = 0;
        }
    }

    /// NEL: line feed with unconditional column return
    pub fn next_line(&mut self) {
        self.index();
        self.cursor.x = 0;
        self.cursor.lcf = false;
    }

    pub fn carriage_return(&mut self) {
        self.cursor.x = 0;
        self.cursor.lcf = false;
    }

    pub fn backspace(&mut self) {
        if self.cursor.x > 0 {
            self.cursor.x -= 1;
        }
        self.cursor.lcf = false;
    }

    // --- tab stops ------------------------------------------------------

    /// TAB: advance to the next tab stop (or the rightmost column)
    pub fn horizontal_tab(&mut self) {
        let width = self.grid.width();
        let mut x = self.cursor.x + 1;
        while x < width && !self.tabs[x] {
            x += 1;
        }
        self.cursor.x = x.min(width - 1);
        self.cursor.lcf = false;
    }

    /// CHT: step forward over `n` tab stops
    pub fn tab_forward(&mut self, n: usize) {
        for _ in 0..n {
            self.horizontal_tab();
        }
    }

    /// CBT: step backward over `n` tab stops (stopping at column 0)
    pub fn tab_backward(&mut self, n: usize) {
        for _ in 0..n {
            let mut x = self.cursor.x;
            while x > 0 {
                x -= 1;
                if self.tabs[x] {
                    break;
                }
            }
            self.cursor.x = x;
        }
        self.cursor.lcf = false;
    }

    /// HTS: set a tab stop at the cursor column
    pub fn set_tab_stop(&mut self) {
        let x = self.cursor.x;
        self.tabs[x] = true;
    }

    /// TBC: clear the stop at the cursor (0) or every stop (3)
    pub fn clear_tab_stops(&mut self, mode: u16) {
        match mode {
            0 => {
                let x = self.cursor.x;
                self.tabs[x] = false;
            }
            3 => self.tabs.fill(false),
            _ => debug!("Unimplemented tab clear mode {}", mode),
        }
    }

    /// Reset tab stops to every 8th column
    pub fn default_tabs(&mut self) {
        for (i, stop) in self.tabs.iter_mut().enumerate() {
            *stop = i != 0 && i % 8 == 0;
        }
    }

    // --- scrolling ------------------------------------------------------

    pub fn scroll_up(&mut self, n: usize) {
        let blank = self.blank();
        self.grid
            .scroll(self.scroll_top, self.scroll_bot, n as isize, blank);
    }

    pub fn scroll_down(&mut self, n: usize) {
        let blank = self.blank();
        self.grid
            .scroll(self.scroll_top, self.scroll_bot, -(n as isize), blank);
    }

    /// DECSTBM: 1-based inclusive parameters; 0 selects the default edge.
    /// Invalid regions are ignored. The cursor homes afterwards.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let height = self.grid.height();
        let new_top = top.saturating_sub(1);
        let new_bot = if bottom == 0 { height } else { bottom.min(height) };
        if new_top < new_bot {
            self.scroll_top = new_top;
            self.scroll_bot = new_bot;
            self.cursor_to(0, 0);
        }
    }

    // --- erase ----------------------------------------------------------

    /// ED: 0 = cursor to end, 1 = start to cursor, 2 = whole screen.
    /// Cleared cells take the fixed default colors.
    pub fn erase_in_display(&mut self, mode: u16) {
        let blank = self.blank();
        let (x, y) = (self.cursor.x, self.cursor.y);
        let (w, h) = (self.grid.width(), self.grid.height());
        match mode {
            0 => self.grid.erase(x, y, w - 1, h - 1, blank),
            1 => self.grid.erase(0, 0, x, y, blank),
            2 => self.grid.fill(blank),
            _ => debug!("Unimplemented erase-in-display mode {}", mode),
        }
    }

    /// EL: 0 = cursor to end of line, 1 = start to cursor, 2 = whole line
    pub fn erase_in_line(&mut self, mode: u16) {
        let blank = self.blank();
        let (x, y) = (self.cursor.x, self.cursor.y);
        let w = self.grid.width();
        match mode {
            0 => self.grid.erase(x, y, w - 1, y, blank),
            1 => self.grid.erase(0, y, x, y, blank),
            2 => self.grid.erase(0, y, w - 1, y, blank),
            _ => debug!("Unimplemented erase-in-line mode {}", mode),
        }
    }

    /// DECALN: fill the screen with 'E', reset margins, home the cursor
    pub fn screen_alignment(&mut self) {
        let mut cell = self.blank();
        cell.ch = 'E';
        self.grid.fill(cell);
        self.scroll_top = 0;
        self.scroll_bot = self.grid.height();
        self.cursor = Cursor::default();
    }

    // --- cursor motion --------------------------------------------------

    /// Relative motion up: clamped to the scroll region when the cursor
    /// starts inside it
    pub fn cursor_up(&mut self, n: usize) {
        let floor = if self.cursor.y >= self.scroll_top {
            self.scroll_top
        } else {
            0
        };
        self.cursor.y = self.cursor.y.saturating_sub(n).max(floor);
        self.cursor.lcf = false;
    }

    /// Relative motion down: clamped to the scroll region when the cursor
    /// starts inside it
    pub fn cursor_down(&mut self, n: usize) {
        let ceil = if self.cursor.y < self.scroll_bot {
            self.scroll_bot - 1
        } else {
            self.grid.height() - 1
        };
        self.cursor.y = (self.cursor.y + n).min(ceil);
        self.cursor.lcf = false;
    }

    pub fn cursor_forward(&mut self, n: usize) {
        self.cursor.x = (self.cursor.x + n).min(self.grid.width() - 1);
        self.cursor.lcf = false;
    }

    pub fn cursor_backward(&mut self, n: usize) {
        self.cursor.x = self.cursor.x.saturating_sub(n);
        self.cursor.lcf = false;
    }

    /// Absolute positioning (0-based): clamped to full grid bounds, or to
    /// the scroll region under origin mode
    pub fn cursor_to(&mut self, x: usize, y: usize) {
        self.cursor.y = if self.modes.origin {
            (self.scroll_top + y).min(self.scroll_bot - 1)
        } else {
            y.min(self.grid.height() - 1)
        };
        self.cursor.x = x.min(self.grid.width() - 1);
        self.cursor.lcf = false;
    }

    /// CHA/HPA: absolute column, row unchanged
    pub fn cursor_to_col(&mut self, x: usize) {
        self.cursor.x = x.min(self.grid.width() - 1);
        self.cursor.lcf = false;
    }

    /// VPA: absolute row, column unchanged
    pub fn cursor_to_row(&mut self, y: usize) {
        self.cursor.y = if self.modes.origin {
            (self.scroll_top + y).min(self.scroll_bot - 1)
        } else {
            y.min(self.grid.height() - 1)
        };
        self.cursor.lcf = false;
    }

    // --- save/restore ---------------------------------------------------

    pub fn save_cursor(&mut self) {
        self.saved = SavedCursor {
            x: self.cursor.x,
            y: self.cursor.y,
            lcf: self.cursor.lcf,
            style: self.style,
        };
    }

    pub fn restore_cursor(&mut self) {
        self.cursor.x = self.saved.x.min(self.grid.width() - 1);
        self.cursor.y = self.saved.y.min(self.grid.height() - 1);
        self.cursor.lcf = self.saved.lcf;
        self.style = self.saved.style;
    }

    // --- modes ----------------------------------------------------------

    /// Apply one of the implemented boolean modes. The parser's mode
    /// table decides which numbers reach this method.
    pub fn apply_mode(&mut self, private: bool, number: u16, value: bool) {
        match (private, number) {
            (true, 3) => self.modes.column_132 = value,
            (true, 5) => self.modes.reverse_video = value,
            (true, 6) => {
                self.modes.origin = value;
                self.cursor_to(0, 0);
            }
            (true, 7) => self.modes.auto_wrap = value,
            (true, 1004) => self.modes.focus_report = value,
            (false, 20) => self.modes.linefeed_newline = value,
            _ => debug!(
                "Unimplemented mode application {}{}",
                if private { "?" } else { "" },
                number
            ),
        }
    }

    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    // --- charsets -------------------------------------------------------

    pub fn designate_charset(&mut self, slot: CharsetSlot, charset: Charset) {
        match slot {
            CharsetSlot::G0 => self.g0 = charset,
            CharsetSlot::G1 => self.g1 = charset,
        }
    }

    /// SO selects G1, SI selects G0
    pub fn select_charset_slot(&mut self, slot: CharsetSlot) {
        self.active_slot = slot;
    }

    pub fn active_charset(&self) -> Charset {
        match self.active_slot {
            CharsetSlot::G0 => self.g0,
            CharsetSlot::G1 => self.g1,
        }
    }
}

fn alloc_tabs(width: usize) -> Result<Vec<bool>> {
    let mut tabs = Vec::new();
    tabs.try_reserve_exact(width)
        .map_err(|source| Error::GridAlloc {
            width,
            height: 1,
            source,
        })?;
    tabs.resize(width, false);
    for (i, stop) in tabs.iter_mut().enumerate() {
        *stop = i != 0 && i % 8 == 0;
    }
    Ok(tabs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(w: usize, h: usize) -> TermState {
        TermState::new(w, h, Palette::default()).unwrap()
    }

    fn print(state: &mut TermState, text: &str) {
        for ch in text.chars() {
            state.put_char(ch);
        }
    }

    #[test]
    fn printing_advances_cursor() {
        let mut st = state(80, 24);
        print(&mut st, "Hello");
        assert_eq!(st.cursor().x, 5);
        assert_eq!(st.cursor().y, 0);
        assert_eq!(st.grid().cell(0, 0).ch, 'H');
        assert_eq!(st.grid().cell(4, 0).ch, 'o');
    }

    #[test]
    fn rightmost_column_sets_lcf_before_wrapping() {
        let mut st = state(4, 3);
        print(&mut st, "abcd");
        // Fourth glyph lands in the last column; cursor sits atop it
        assert_eq!(st.cursor().x, 3);
        assert_eq!(st.cursor().y, 0);
        assert!(st.cursor().lcf);
        st.put_char('e');
        assert_eq!(st.grid().cell(3, 0).ch, 'd');
        assert_eq!(st.grid().cell(0, 1).ch, 'e');
        assert_eq!(st.cursor().x, 1);
        assert_eq!(st.cursor().y, 1);
        assert!(!st.cursor().lcf);
    }

    #[test]
    fn wrap_at_region_bottom_scrolls() {
        let mut st = state(2, 2);
        print(&mut st, "abcde");
        // "ab" fills row 0, wrap; "cd" fills row 1, wrap scrolls; "e" in row 1
        assert_eq!(st.grid().cell(0, 0).ch, 'c');
        assert_eq!(st.grid().cell(1, 0).ch, 'd');
        assert_eq!(st.grid().cell(0, 1).ch, 'e');
        assert_eq!(st.cursor().x, 1);
        assert_eq!(st.cursor().y, 1);
    }

    #[test]
    fn auto_wrap_off_pins_at_rightmost_column() {
        let mut st = state(4, 2);
        st.modes.auto_wrap = false;
        print(&mut st, "abcdef");
        assert_eq!(st.cursor().x, 3);
        assert_eq!(st.cursor().y, 0);
        assert_eq!(st.grid().cell(3, 0).ch, 'f');
    }

    #[test]
    fn absolute_positioning_clears_lcf() {
        let mut st = state(4, 2);
        print(&mut st, "abcd");
        assert!(st.cursor().lcf);
        st.cursor_to(2, 0);
        assert!(!st.cursor().lcf);
        st.put_char('x');
        assert_eq!(st.grid().cell(2, 0).ch, 'x');
        assert_eq!(st.cursor().y, 0);
    }

    #[test]
    fn zero_width_scalar_inserts_nothing() {
        let mut st = state(4, 2);
        st.put_char('\u{0301}'); // combining acute accent
        assert_eq!(st.cursor().x, 0);
        assert_eq!(st.grid().cell(0, 0).ch, ' ');
    }

    #[test]
    fn tab_advances_to_next_stop() {
        let mut st = state(20, 2);
        st.horizontal_tab();
        assert_eq!(st.cursor().x, 8);
        st.horizontal_tab();
        assert_eq!(st.cursor().x, 16);
        st.horizontal_tab();
        // No stop beyond 16: rightmost column
        assert_eq!(st.cursor().x, 19);
    }

    #[test]
    fn tab_stop_management() {
        let mut st = state(20, 2);
        st.cursor_to(3, 0);
        st.set_tab_stop();
        st.cursor_to(0, 0);
        st.horizontal_tab();
        assert_eq!(st.cursor().x, 3);
        st.clear_tab_stops(0);
        st.cursor_to(0, 0);
        st.horizontal_tab();
        assert_eq!(st.cursor().x, 8);
        st.clear_tab_stops(3);
        st.cursor_to(0, 0);
        st.horizontal_tab();
        assert_eq!(st.cursor().x, 19);
        st.default_tabs();
        st.cursor_to(0, 0);
        st.horizontal_tab();
        assert_eq!(st.cursor().x, 8);
    }

    #[test]
    fn tab_backward_steps_stops() {
        let mut st = state(40, 2);
        st.cursor_to(20, 0);
        st.tab_backward(1);
        assert_eq!(st.cursor().x, 16);
        st.tab_backward(2);
        assert_eq!(st.cursor().x, 0);
    }

    #[test]
    fn erase_uses_fixed_default_colors() {
        let mut st = state(4, 2);
        st.style.fg = Rgb::new(9, 9, 9);
        st.style.bg = Rgb::new(1, 1, 1);
        print(&mut st, "ab");
        st.erase_in_display(2);
        let cell = st.grid().cell(0, 0);
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.fg, st.default_fg());
        assert_eq!(cell.bg, st.default_bg());
    }

    #[test]
    fn save_restore_roundtrips_position_and_style() {
        let mut st = state(10, 5);
        st.cursor_to(3, 2);
        st.style.flags |= StyleFlags::BOLD;
        st.style.fg = Rgb::new(7, 7, 7);
        st.save_cursor();
        st.cursor_to(9, 4);
        st.style = Style {
            flags: StyleFlags::empty(),
            fg: st.default_fg(),
            bg: st.default_bg(),
        };
        st.restore_cursor();
        assert_eq!(st.cursor().x, 3);
        assert_eq!(st.cursor().y, 2);
        assert!(st.style.flags.contains(StyleFlags::BOLD));
        assert_eq!(st.style.fg, Rgb::new(7, 7, 7));
    }

    #[test]
    fn scroll_region_bounds_linefeed() {
        let mut st = state(4, 6);
        st.set_scroll_region(3, 4); // rows [2, 4)
        assert_eq!(st.scroll_region(), (2, 4));
        // Cursor homed by DECSTBM
        assert_eq!(st.cursor().y, 0);
        st.cursor_to(0, 3);
        print(&mut st, "x");
        st.linefeed();
        // Bottom of region: content scrolled, cursor stays on row 3
        assert_eq!(st.cursor().y, 3);
        assert_eq!(st.grid().cell(0, 2).ch, 'x');
    }

    #[test]
    fn origin_mode_homes_into_region() {
        let mut st = state(10, 10);
        st.set_scroll_region(3, 8);
        st.apply_mode(true, 6, true);
        assert_eq!(st.cursor().y, 2);
        st.cursor_to(0, 0);
        assert_eq!(st.cursor().y, 2);
        st.cursor_to(0, 99);
        assert_eq!(st.cursor().y, 7); // clamped to region bottom
        st.apply_mode(true, 6, false);
        st.cursor_to(0, 0);
        assert_eq!(st.cursor().y, 0);
    }

    #[test]
    fn resize_clamps_cursor_and_region() {
        let mut st = state(10, 10);
        st.set_scroll_region(5, 10);
        st.cursor_to(9, 9);
        st.resize(4, 4).unwrap();
        assert_eq!(st.cursor().x, 3);
        assert_eq!(st.cursor().y, 3);
        // Region collapsed out of range: reset to full screen
        assert_eq!(st.scroll_region(), (0, 4));
    }

    #[test]
    fn reset_restores_defaults_but_keeps_tab_array_length() {
        let mut st = state(20, 5);
        st.style.flags |= StyleFlags::INVERSE;
        st.set_scroll_region(2, 4);
        st.apply_mode(true, 5, true);
        print(&mut st, "junk");
        st.reset();
        assert_eq!(st.cursor().x, 0);
        assert_eq!(st.cursor().y, 0);
        assert_eq!(st.scroll_region(), (0, 5));
        assert!(!st.modes().reverse_video);
        assert_eq!(st.grid().cell(0, 0).ch, ' ');
        assert_eq!(st.tabs.len(), 20);
        st.horizontal_tab();
        assert_eq!(st.cursor().x, 8);
    }

    #[test]
    fn charset_slots_switch_and_flag_cells() {
        let mut st = state(10, 2);
        st.designate_charset(CharsetSlot::G1, Charset::DecSpecial);
        st.put_char('q');
        assert!(!st.grid().cell(0, 0).flags.contains(StyleFlags::ALT_CHARSET));
        st.select_charset_slot(CharsetSlot::G1);
        st.put_char('q');
        let cell = *st.grid().cell(1, 0);
        assert!(cell.flags.contains(StyleFlags::ALT_CHARSET));
        assert_eq!(cell.ch, 'q');
        assert_eq!(cell.glyph(), '─');
        st.select_charset_slot(CharsetSlot::G0);
        st.put_char('q');
        assert_eq!(st.grid().cell(2, 0).glyph(), 'q');
    }

    #[test]
    fn screen_alignment_fills_with_e() {
        let mut st = state(3, 2);
        st.set_scroll_region(1, 1);
        st.screen_alignment();
        assert_eq!(st.grid().cell(2, 1).ch, 'E');
        assert_eq!(st.cursor().x, 0);
        assert_eq!(st.cursor().y, 0);
        assert_eq!(st.scroll_region(), (0, 2));
    }
}
