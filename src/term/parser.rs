//! VT sequence dispatcher
//!
//! The single entry point consumes one byte at a time and either inserts
//! a glyph or invokes a state mutator. The machine is an explicit tagged
//! enum; CSI commands and boolean modes dispatch through static tables so
//! "recognized but unimplemented" is a declared property of each entry
//! rather than a scattered special case. Unrecognized input is logged and
//! ignored, never an error.

use tracing::debug;

use super::charset::{Charset, CharsetSlot};
use super::grid::StyleFlags;
use super::state::TermState;
use super::Report;
use crate::color::Rgb;

/// Upper bound on accumulated CSI parameters. Exceeding it is the defined
/// overflow event: logged, sequence aborted, no corruption.
const MAX_PARAMS: usize = 16;
/// Upper bound on intermediate bytes per sequence
const MAX_INTERMEDIATES: usize = 4;

/// Dispatcher state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum State {
    /// No sequence in progress
    #[default]
    Ground,
    /// ESC seen, family not yet determined
    Escape,
    /// nF sequence: intermediates 0x20..=0x2F accumulating
    Intermediate { bytes: Vec<u8> },
    /// DCS/OSC/SOS/PM/APC body: every byte swallowed until ST (`ESC \`)
    StringBody { esc: bool },
    /// CSI parameters accumulating
    Csi(CsiSeq),
    /// UTF-8 continuation bytes outstanding
    Utf8 { remaining: u8, scalar: u32 },
}

/// Accumulated CSI parse state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CsiSeq {
    params: Vec<u16>,
    current: Option<u16>,
    /// First `<=>?` marker seen; accepted without altering parsing
    private: Option<u8>,
    intermediates: Vec<u8>,
}

/// Resolved CSI arguments handed to command handlers
struct Args<'a> {
    params: &'a [u16],
    defaults: &'static [u16],
    private: Option<u8>,
}

impl Args<'_> {
    /// Parameter `i` with the command's declared default applied to an
    /// absent value. A default of 1 also lifts an explicit 0.
    fn get(&self, i: usize) -> u16 {
        let default = self.defaults.get(i).copied().unwrap_or(0);
        let value = self.params.get(i).copied().unwrap_or(default);
        if default >= 1 && value == 0 {
            default
        } else {
            value
        }
    }

    fn params(&self) -> &[u16] {
        self.params
    }

    fn is_private(&self) -> bool {
        self.private == Some(b'?')
    }
}

type Handler = fn(&mut TermState, &Args<'_>);

/// One CSI dispatch-table entry. `handler: None` declares the command
/// recognized but deliberately unimplemented.
struct CsiEntry {
    final_byte: u8,
    /// Required intermediate byte, if any (e.g. `!` for DECSTR)
    intermediate: Option<u8>,
    name: &'static str,
    /// Per-position defaults for absent parameters; these differ per
    /// command and carry no unifying rule
    defaults: &'static [u16],
    handler: Option<Handler>,
}

const fn entry(
    final_byte: u8,
    name: &'static str,
    defaults: &'static [u16],
    handler: Handler,
) -> CsiEntry {
    CsiEntry {
        final_byte,
        intermediate: None,
        name,
        defaults,
        handler: Some(handler),
    }
}

const fn noop(final_byte: u8, name: &'static str) -> CsiEntry {
    CsiEntry {
        final_byte,
        intermediate: None,
        name,
        defaults: &[],
        handler: None,
    }
}

const CSI_TABLE: &[CsiEntry] = &[
    entry(b'A', "CUU cursor up", &[1], csi_cursor_up),
    entry(b'B', "CUD cursor down", &[1], csi_cursor_down),
    entry(b'C', "CUF cursor forward", &[1], csi_cursor_forward),
    entry(b'D', "CUB cursor backward", &[1], csi_cursor_backward),
    entry(b'E', "CNL cursor next line", &[1], csi_next_line),
    entry(b'F', "CPL cursor previous line", &[1], csi_prev_line),
    entry(b'G', "CHA cursor column", &[1], csi_cursor_column),
    entry(b'H', "CUP cursor position", &[1, 1], csi_cursor_position),
    entry(b'I', "CHT forward tab", &[1], csi_tab_forward),
    entry(b'J', "ED erase in display", &[0], csi_erase_display),
    entry(b'K', "EL erase in line", &[0], csi_erase_line),
    entry(b'S', "SU scroll up", &[1], csi_scroll_up),
    entry(b'T', "SD scroll down", &[1], csi_scroll_down),
    entry(b'Z', "CBT backward tab", &[1], csi_tab_backward),
    entry(b'c', "DA device attributes", &[0], csi_device_attributes),
    entry(b'd', "VPA line position", &[1], csi_cursor_row),
    entry(b'f', "HVP cursor position", &[1, 1], csi_cursor_position),
    entry(b'g', "TBC tab clear", &[0], csi_tab_clear),
    entry(b'h', "SM set mode", &[], csi_set_mode),
    entry(b'l', "RM reset mode", &[], csi_reset_mode),
    entry(b'm', "SGR select graphic rendition", &[0], csi_sgr),
    entry(b'n', "DSR device status report", &[0], csi_status_report),
    entry(b'r', "DECSTBM scroll region", &[1, 0], csi_scroll_region),
    entry(b's', "SCOSC save cursor", &[], csi_save_cursor),
    entry(b'u', "SCORC restore cursor", &[], csi_restore_cursor),
    // DECSTR shares the full-reset routine with ESC c
    CsiEntry {
        final_byte: b'p',
        intermediate: Some(b'!'),
        name: "DECSTR soft reset",
        defaults: &[],
        handler: Some(csi_soft_reset),
    },
    // Recognized, deliberately unimplemented
    noop(b'@', "ICH insert characters"),
    noop(b'L', "IL insert lines"),
    noop(b'M', "DL delete lines"),
    noop(b'P', "DCH delete characters"),
    noop(b'X', "ECH erase characters"),
    noop(b'`', "HPA character position"),
    noop(b'a', "HPR character position relative"),
    noop(b'b', "REP repeat"),
    noop(b'e', "VPR line position relative"),
    noop(b'i', "MC media copy"),
    noop(b'q', "DECLL load LEDs"),
    noop(b't', "XTWINOPS window manipulation"),
    noop(b'x', "DECREQTPARM request parameters"),
    CsiEntry {
        final_byte: b'q',
        intermediate: Some(b' '),
        name: "DECSCUSR cursor style",
        defaults: &[],
        handler: None,
    },
];

/// A named boolean mode. Only a handful are implemented; the rest are
/// recognized and logged.
struct ModeEntry {
    number: u16,
    private: bool,
    name: &'static str,
    implemented: bool,
}

const fn mode(number: u16, private: bool, name: &'static str, implemented: bool) -> ModeEntry {
    ModeEntry {
        number,
        private,
        name,
        implemented,
    }
}

const MODE_TABLE: &[ModeEntry] = &[
    // ANSI modes
    mode(2, false, "KAM keyboard action", false),
    mode(4, false, "IRM insert/replace", false),
    mode(12, false, "SRM send/receive", false),
    mode(20, false, "LNM linefeed/new-line", true),
    // DEC private modes
    mode(1, true, "DECCKM application cursor keys", false),
    mode(2, true, "DECANM ANSI/VT52", false),
    mode(3, true, "DECCOLM 132-column", true),
    mode(4, true, "DECSCLM smooth scroll", false),
    mode(5, true, "DECSCNM reverse video", true),
    mode(6, true, "DECOM origin", true),
    mode(7, true, "DECAWM auto-wrap", true),
    mode(8, true, "DECARM auto-repeat", false),
    mode(9, true, "X10 mouse reporting", false),
    mode(12, true, "cursor blink", false),
    mode(18, true, "DECPFF print form feed", false),
    mode(19, true, "DECPEX print extent", false),
    mode(25, true, "DECTCEM cursor visible", false),
    mode(38, true, "DECTEK Tektronix", false),
    mode(40, true, "80/132 column switching", false),
    mode(42, true, "DECNRCM national charsets", false),
    mode(44, true, "margin bell", false),
    mode(45, true, "reverse wraparound", false),
    mode(46, true, "logging", false),
    mode(47, true, "alternate screen", false),
    mode(66, true, "DECNKM application keypad", false),
    mode(67, true, "DECBKM backarrow key", false),
    mode(69, true, "DECLRMM left/right margins", false),
    mode(80, true, "DECSDM sixel display", false),
    mode(95, true, "DECNCSM no-clear column change", false),
    mode(1000, true, "mouse button reporting", false),
    mode(1001, true, "mouse highlight tracking", false),
    mode(1002, true, "mouse button-motion reporting", false),
    mode(1003, true, "mouse any-motion reporting", false),
    mode(1004, true, "focus reporting", true),
    mode(1005, true, "UTF-8 mouse encoding", false),
    mode(1006, true, "SGR mouse encoding", false),
    mode(1007, true, "alternate scroll", false),
    mode(1010, true, "scroll to bottom on output", false),
    mode(1011, true, "scroll to bottom on key press", false),
    mode(1015, true, "urxvt mouse encoding", false),
    mode(1034, true, "meta sends escape", false),
    mode(1035, true, "num-lock modifiers", false),
    mode(1036, true, "alt sends escape", false),
    mode(1042, true, "bell urgency", false),
    mode(1047, true, "alternate screen buffer", false),
    mode(1048, true, "save/restore cursor", false),
    mode(1049, true, "alternate screen with save", false),
    mode(2004, true, "bracketed paste", false),
];

/// Parser state machine
pub(crate) struct Parser {
    state: State,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
        }
    }

    /// Abort any sequence in progress
    pub fn reset(&mut self) {
        self.state = State::Ground;
    }

    /// Feed a single byte to the dispatcher
    pub fn feed(&mut self, byte: u8, term: &mut TermState) {
        // UTF-8 assembly claims every byte until the scalar completes
        if matches!(self.state, State::Utf8 { .. }) {
            self.utf8_continuation(byte, term);
            return;
        }
        // String bodies swallow everything except their terminator
        if matches!(self.state, State::StringBody { .. }) {
            self.string_body(byte);
            return;
        }
        // C0 controls act immediately in any remaining state; ESC aborts
        // a partial sequence and starts a new one
        if byte < 0x20 {
            self.control(byte, term);
            return;
        }
        match self.state {
            State::Ground => self.ground(byte, term),
            State::Escape => self.escape(byte, term),
            State::Intermediate { .. } => self.intermediate(byte, term),
            State::Csi(_) => self.csi(byte, term),
            State::Utf8 { .. } | State::StringBody { .. } => unreachable!(),
        }
    }

    fn control(&mut self, byte: u8, term: &mut TermState) {
        match byte {
            0x1B => self.state = State::Escape,
            0x07 => debug!("BEL"),
            0x08 => term.backspace(),
            0x09 => term.horizontal_tab(),
            0x0A | 0x0B | 0x0C => term.linefeed(),
            0x0D => term.carriage_return(),
            0x0E => term.select_charset_slot(CharsetSlot::G1),
            0x0F => term.select_charset_slot(CharsetSlot::G0),
            _ => {}
        }
    }

    fn ground(&mut self, byte: u8, term: &mut TermState) {
        match byte {
            0x20..=0x7E => term.put_char(byte as char),
            0x7F => {} // DEL
            // UTF-8 lead bytes select the continuation count
            0xC0..=0xDF => self.utf8_start(1, (byte & 0x1F) as u32),
            0xE0..=0xEF => self.utf8_start(2, (byte & 0x0F) as u32),
            0xF0..=0xF7 => self.utf8_start(3, (byte & 0x07) as u32),
            0xF8..=0xFB => self.utf8_start(4, (byte & 0x03) as u32),
            0xFC..=0xFD => self.utf8_start(5, (byte & 0x01) as u32),
            // Stray continuation bytes and 0xFE/0xFF
            _ => debug!("Ignored byte {:#04x}", byte),
        }
    }

    fn utf8_start(&mut self, remaining: u8, scalar: u32) {
        self.state = State::Utf8 { remaining, scalar };
    }

    fn utf8_continuation(&mut self, byte: u8, term: &mut TermState) {
        let State::Utf8 { remaining, scalar } = &mut self.state else {
            unreachable!()
        };
        // The count derived from the lead byte is trusted; continuation
        // bytes are not validated
        *scalar = (*scalar << 6) | (byte & 0x3F) as u32;
        *remaining -= 1;
        if *remaining == 0 {
            let ch = char::from_u32(*scalar).unwrap_or(char::REPLACEMENT_CHARACTER);
            self.state = State::Ground;
            term.put_char(ch);
        }
    }

    fn string_body(&mut self, byte: u8) {
        let State::StringBody { esc } = &mut self.state else {
            unreachable!()
        };
        if *esc && byte == b'\\' {
            self.state = State::Ground;
        } else {
            *esc = byte == 0x1B;
        }
    }

    fn escape(&mut self, byte: u8, term: &mut TermState) {
        match byte {
            0x20..=0x2F => {
                self.state = State::Intermediate { bytes: vec![byte] };
                return;
            }
            // Fp family
            b'7' => term.save_cursor(),
            b'8' => term.restore_cursor(),
            b'=' | b'>' => debug!("Unimplemented keypad escape ESC {}", byte as char),
            0x30..=0x3F => debug!("Unimplemented escape ESC {}", byte as char),
            // Fe family
            b'D' => term.index(),
            b'E' => term.next_line(),
            b'H' => term.set_tab_stop(),
            b'M' => term.reverse_index(),
            b'Z' => term.push_report(Report::DeviceAttributes),
            b'[' => {
                self.state = State::Csi(CsiSeq::default());
                return;
            }
            b'P' | b']' | b'X' | b'^' | b'_' => {
                self.state = State::StringBody { esc: false };
                return;
            }
            b'\\' => {} // lone ST
            0x40..=0x5F => debug!("Unimplemented escape ESC {}", byte as char),
            // Fs family
            b'c' => term.reset(),
            _ => debug!("Unimplemented escape ESC {}", byte as char),
        }
        self.state = State::Ground;
    }

    fn intermediate(&mut self, byte: u8, term: &mut TermState) {
        let State::Intermediate { bytes } = &mut self.state else {
            unreachable!()
        };
        match byte {
            0x20..=0x2F => {
                if bytes.len() >= MAX_INTERMEDIATES {
                    debug!("OVERFLOW in escape intermediates");
                    self.state = State::Ground;
                    return;
                }
                bytes.push(byte);
            }
            0x30..=0x7E => {
                let bytes = std::mem::take(bytes);
                self.state = State::Ground;
                dispatch_nf(&bytes, byte, term);
            }
            _ => self.state = State::Ground,
        }
    }

    fn csi(&mut self, byte: u8, term: &mut TermState) {
        let State::Csi(seq) = &mut self.state else {
            unreachable!()
        };
        match byte {
            b'0'..=b'9' => {
                let digit = (byte - b'0') as u16;
                seq.current = Some(
                    seq.current
                        .unwrap_or(0)
                        .saturating_mul(10)
                        .saturating_add(digit),
                );
            }
            b';' | b':' => {
                if seq.params.len() >= MAX_PARAMS {
                    debug!("OVERFLOW in CSI parameters");
                    self.state = State::Ground;
                    return;
                }
                seq.params.push(seq.current.take().unwrap_or(0));
            }
            // `<=>?` private markers: accepted, parsing unchanged
            0x3C..=0x3F => {
                seq.private.get_or_insert(byte);
            }
            0x20..=0x2F => {
                if seq.intermediates.len() >= MAX_INTERMEDIATES {
                    debug!("OVERFLOW in CSI intermediates");
                    self.state = State::Ground;
                    return;
                }
                seq.intermediates.push(byte);
            }
            0x40..=0x7E => {
                let State::Csi(mut seq) = std::mem::take(&mut self.state) else {
                    unreachable!()
                };
                if let Some(param) = seq.current.take() {
                    if seq.params.len() >= MAX_PARAMS {
                        debug!("OVERFLOW in CSI parameters");
                        return;
                    }
                    seq.params.push(param);
                }
                execute_csi(&seq, byte, term);
            }
            _ => self.state = State::Ground,
        }
    }
}

fn dispatch_nf(intermediates: &[u8], final_byte: u8, term: &mut TermState) {
    match (intermediates, final_byte) {
        ([b'('], byte) => designate(term, CharsetSlot::G0, byte),
        ([b')'], byte) => designate(term, CharsetSlot::G1, byte),
        ([b'#'], b'8') => term.screen_alignment(),
        _ => debug!(
            "Unimplemented escape ESC {} {}",
            String::from_utf8_lossy(intermediates),
            final_byte as char
        ),
    }
}

fn designate(term: &mut TermState, slot: CharsetSlot, byte: u8) {
    match Charset::from_designator(byte) {
        Some(charset) => term.designate_charset(slot, charset),
        None => debug!("Unimplemented charset designator {}", byte as char),
    }
}

fn execute_csi(seq: &CsiSeq, final_byte: u8, term: &mut TermState) {
    let intermediate = seq.intermediates.first().copied();
    let entry = CSI_TABLE
        .iter()
        .find(|e| e.final_byte == final_byte && e.intermediate == intermediate);
    match entry {
        Some(entry) => match entry.handler {
            Some(handler) => {
                let args = Args {
                    params: &seq.params,
                    defaults: entry.defaults,
                    private: seq.private,
                };
                handler(term, &args);
            }
            None => debug!(
                "Unimplemented CSI command {} params={:?}",
                entry.name, seq.params
            ),
        },
        None => debug!(
            "Unrecognized CSI final={:?} intermediates={:?} params={:?}",
            final_byte as char, seq.intermediates, seq.params
        ),
    }
}

// --- CSI handlers -------------------------------------------------------

fn csi_cursor_up(term: &mut TermState, args: &Args<'_>) {
    term.cursor_up(args.get(0) as usize);
}

fn csi_cursor_down(term: &mut TermState, args: &Args<'_>) {
    term.cursor_down(args.get(0) as usize);
}

fn csi_cursor_forward(term: &mut TermState, args: &Args<'_>) {
    term.cursor_forward(args.get(0) as usize);
}

fn csi_cursor_backward(term: &mut TermState, args: &Args<'_>) {
    term.cursor_backward(args.get(0) as usize);
}

fn csi_next_line(term: &mut TermState, args: &Args<'_>) {
    term.cursor_down(args.get(0) as usize);
    term.carriage_return();
}

fn csi_prev_line(term: &mut TermState, args: &Args<'_>) {
    term.cursor_up(args.get(0) as usize);
    term.carriage_return();
}

fn csi_cursor_column(term: &mut TermState, args: &Args<'_>) {
    term.cursor_to_col(args.get(0) as usize - 1);
}

fn csi_cursor_row(term: &mut TermState, args: &Args<'_>) {
    term.cursor_to_row(args.get(0) as usize - 1);
}

fn csi_cursor_position(term: &mut TermState, args: &Args<'_>) {
    let row = args.get(0) as usize - 1;
    let col = args.get(1) as usize - 1;
    term.cursor_to(col, row);
}

fn csi_tab_forward(term: &mut TermState, args: &Args<'_>) {
    term.tab_forward(args.get(0) as usize);
}

fn csi_tab_backward(term: &mut TermState, args: &Args<'_>) {
    term.tab_backward(args.get(0) as usize);
}

fn csi_tab_clear(term: &mut TermState, args: &Args<'_>) {
    term.clear_tab_stops(args.get(0));
}

fn csi_erase_display(term: &mut TermState, args: &Args<'_>) {
    term.erase_in_display(args.get(0));
}

fn csi_erase_line(term: &mut TermState, args: &Args<'_>) {
    term.erase_in_line(args.get(0));
}

fn csi_scroll_up(term: &mut TermState, args: &Args<'_>) {
    term.scroll_up(args.get(0) as usize);
}

fn csi_scroll_down(term: &mut TermState, args: &Args<'_>) {
    term.scroll_down(args.get(0) as usize);
}

fn csi_scroll_region(term: &mut TermState, args: &Args<'_>) {
    term.set_scroll_region(args.get(0) as usize, args.get(1) as usize);
}

fn csi_save_cursor(term: &mut TermState, _args: &Args<'_>) {
    term.save_cursor();
}

fn csi_restore_cursor(term: &mut TermState, _args: &Args<'_>) {
    term.restore_cursor();
}

fn csi_soft_reset(term: &mut TermState, _args: &Args<'_>) {
    term.reset();
}

fn csi_device_attributes(term: &mut TermState, _args: &Args<'_>) {
    term.push_report(Report::DeviceAttributes);
}

fn csi_status_report(term: &mut TermState, args: &Args<'_>) {
    match args.get(0) {
        5 => term.push_report(Report::DeviceOk),
        6 => {
            let cursor = term.cursor();
            term.push_report(Report::CursorPosition {
                row: cursor.y + 1,
                col: cursor.x + 1,
            });
        }
        n => debug!("Unimplemented device status report {}", n),
    }
}

fn csi_set_mode(term: &mut TermState, args: &Args<'_>) {
    apply_modes(term, args, true);
}

fn csi_reset_mode(term: &mut TermState, args: &Args<'_>) {
    apply_modes(term, args, false);
}

fn apply_modes(term: &mut TermState, args: &Args<'_>, value: bool) {
    let private = args.is_private();
    for &number in args.params() {
        let entry = MODE_TABLE
            .iter()
            .find(|m| m.number == number && m.private == private);
        match entry {
            Some(entry) if entry.implemented => term.apply_mode(private, number, value),
            Some(entry) => debug!("Unimplemented mode {} ({})", number, entry.name),
            None => debug!(
                "Unrecognized mode {}{}",
                if private { "?" } else { "" },
                number
            ),
        }
    }
}

fn csi_sgr(term: &mut TermState, args: &Args<'_>) {
    let params = args.params();
    if params.is_empty() {
        reset_style(term);
        return;
    }
    let mut iter = params.iter().copied();
    while let Some(param) = iter.next() {
        match param {
            0 => reset_style(term),
            1 => term.style.flags |= StyleFlags::BOLD,
            2 => term.style.flags |= StyleFlags::DIM,
            3 => term.style.flags |= StyleFlags::ITALIC,
            4 => term.style.flags |= StyleFlags::UNDERLINE,
            5 => term.style.flags |= StyleFlags::BLINK,
            7 => term.style.flags |= StyleFlags::INVERSE,
            22 => term.style.flags -= StyleFlags::BOLD | StyleFlags::DIM,
            23 => term.style.flags -= StyleFlags::ITALIC,
            24 => term.style.flags -= StyleFlags::UNDERLINE,
            25 => term.style.flags -= StyleFlags::BLINK,
            27 => term.style.flags -= StyleFlags::INVERSE,
            30..=37 => term.style.fg = term.resolve_color((param - 30) as u32),
            38 => {
                if let Some(color) = sgr_extended_color(term, &mut iter) {
                    term.style.fg = color;
                }
            }
            39 => term.style.fg = term.default_fg(),
            40..=47 => term.style.bg = term.resolve_color((param - 40) as u32),
            48 => {
                if let Some(color) = sgr_extended_color(term, &mut iter) {
                    term.style.bg = color;
                }
            }
            49 => term.style.bg = term.default_bg(),
            90..=97 => term.style.fg = term.resolve_color((param - 90 + 8) as u32),
            100..=107 => term.style.bg = term.resolve_color((param - 100 + 8) as u32),
            _ => debug!("Unimplemented SGR attribute {}", param),
        }
    }
}

fn reset_style(term: &mut TermState) {
    term.style.flags = StyleFlags::empty();
    term.style.fg = term.default_fg();
    term.style.bg = term.default_bg();
}

/// Extended color: `5;N` indexed or `2;R;G;B` direct
fn sgr_extended_color(term: &TermState, iter: &mut impl Iterator<Item = u16>) -> Option<Rgb> {
    match iter.next() {
        Some(5) => Some(term.resolve_color(iter.next().unwrap_or(0) as u32)),
        Some(2) => {
            let r = iter.next().unwrap_or(0) as u8;
            let g = iter.next().unwrap_or(0) as u8;
            let b = iter.next().unwrap_or(0) as u8;
            Some(Rgb::new(r, g, b))
        }
        mode => {
            debug!("Unimplemented extended color mode {:?}", mode);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Palette, Rgb};

    fn setup(w: usize, h: usize) -> (Parser, TermState) {
        (
            Parser::new(),
            TermState::new(w, h, Palette::default()).unwrap(),
        )
    }

    fn feed(parser: &mut Parser, state: &mut TermState, bytes: &[u8]) {
        for &byte in bytes {
            parser.feed(byte, state);
        }
    }

    fn row_text(state: &TermState, y: usize) -> String {
        (0..state.width())
            .map(|x| state.grid().cell(x, y).glyph())
            .collect()
    }

    #[test]
    fn cursor_position_is_one_based() {
        let (mut parser, mut state) = setup(80, 24);
        feed(&mut parser, &mut state, b"\x1b[5;10H");
        assert_eq!(state.cursor().y, 4);
        assert_eq!(state.cursor().x, 9);
        // Absent parameters home the cursor
        feed(&mut parser, &mut state, b"\x1b[H");
        assert_eq!((state.cursor().x, state.cursor().y), (0, 0));
    }

    #[test]
    fn zero_parameters_act_like_one_for_motion() {
        let (mut parser, mut state) = setup(80, 24);
        feed(&mut parser, &mut state, b"\x1b[5;10H\x1b[0A\x1b[0D");
        assert_eq!(state.cursor().y, 3);
        assert_eq!(state.cursor().x, 8);
    }

    #[test]
    fn erase_defaults_to_mode_zero() {
        let (mut parser, mut state) = setup(10, 2);
        feed(&mut parser, &mut state, b"abcdef\x1b[3G\x1b[K");
        assert_eq!(row_text(&state, 0), "ab        ");
    }

    #[test]
    fn printable_run_advances_cursor_by_count() {
        let (mut parser, mut state) = setup(80, 24);
        feed(&mut parser, &mut state, b"hello world");
        assert_eq!(state.cursor().x, 11);
        assert_eq!(state.cursor().y, 0);
    }

    #[test]
    fn width_plus_one_chars_wrap_once() {
        let (mut parser, mut state) = setup(10, 5);
        feed(&mut parser, &mut state, b"0123456789X");
        assert_eq!(state.cursor().x, 1);
        assert_eq!(state.cursor().y, 1);
        assert_eq!(state.grid().cell(9, 0).ch, '9');
        assert_eq!(state.grid().cell(0, 1).ch, 'X');
    }

    #[test]
    fn erase_display_ignores_active_sgr_color() {
        let (mut parser, mut state) = setup(10, 3);
        feed(&mut parser, &mut state, b"\x1b[31;44mstuff\x1b[2J");
        for y in 0..3 {
            for x in 0..10 {
                let cell = state.grid().cell(x, y);
                assert_eq!(cell.ch, ' ');
                assert_eq!(cell.fg, state.default_fg());
                assert_eq!(cell.bg, state.default_bg());
            }
        }
        // The active style itself is untouched by the erase
        assert_eq!(state.style.fg, Rgb::new(205, 0, 0));
    }

    #[test]
    fn save_restore_roundtrip() {
        let (mut parser, mut state) = setup(80, 24);
        feed(&mut parser, &mut state, b"\x1b[1m\x1b[7;12H\x1b[s");
        feed(&mut parser, &mut state, b"\x1b[0m\x1b[20;1H\x1b[u");
        assert_eq!(state.cursor().y, 6);
        assert_eq!(state.cursor().x, 11);
        assert!(state.style.flags.contains(StyleFlags::BOLD));
    }

    #[test]
    fn scroll_region_set_and_oversized_scroll_clears() {
        let (mut parser, mut state) = setup(10, 6);
        feed(&mut parser, &mut state, b"outside");
        feed(&mut parser, &mut state, b"\x1b[3;4r");
        assert_eq!(state.scroll_region(), (2, 4));
        feed(&mut parser, &mut state, b"\x1b[3;1Hstale");
        feed(&mut parser, &mut state, b"\x1b[99S");
        // Scrolling by more than the region height clears the region
        assert_eq!(row_text(&state, 2), "          ");
        assert_eq!(row_text(&state, 3), "          ");
        // Rows outside the region are untouched
        assert_eq!(&row_text(&state, 0)[..7], "outside");
    }

    #[test]
    fn cursor_report_matches_position() {
        let (mut parser, mut state) = setup(80, 24);
        feed(&mut parser, &mut state, b"\x1b[10;20H\x1b[6n");
        assert_eq!(
            state.reports,
            vec![Report::CursorPosition { row: 10, col: 20 }]
        );
        state.reports.clear();
        feed(&mut parser, &mut state, b"\x1b[5n");
        assert_eq!(state.reports, vec![Report::DeviceOk]);
    }

    #[test]
    fn device_attributes_both_entry_points() {
        let (mut parser, mut state) = setup(80, 24);
        feed(&mut parser, &mut state, b"\x1b[c");
        feed(&mut parser, &mut state, b"\x1bZ");
        assert_eq!(
            state.reports,
            vec![Report::DeviceAttributes, Report::DeviceAttributes]
        );
    }

    #[test]
    fn utf8_three_byte_sequence_across_calls() {
        let (mut parser, mut state) = setup(10, 2);
        parser.feed(0xE2, &mut state);
        assert_eq!(state.cursor().x, 0);
        assert_eq!(state.grid().cell(0, 0).ch, ' ');
        parser.feed(0x82, &mut state);
        assert_eq!(state.grid().cell(0, 0).ch, ' ');
        parser.feed(0xAC, &mut state);
        assert_eq!(state.grid().cell(0, 0).ch, '€');
        assert_eq!(state.cursor().x, 1);
    }

    #[test]
    fn two_byte_utf8() {
        let (mut parser, mut state) = setup(10, 2);
        feed(&mut parser, &mut state, "é".as_bytes());
        assert_eq!(state.grid().cell(0, 0).ch, 'é');
    }

    #[test]
    fn hi_there_scenario() {
        let (mut parser, mut state) = setup(80, 24);
        feed(&mut parser, &mut state, b"Hi\r\nThere");
        assert_eq!(state.grid().cell(0, 0).ch, 'H');
        assert_eq!(state.grid().cell(1, 0).ch, 'i');
        assert_eq!(state.cursor().x, 5);
        assert_eq!(state.cursor().y, 1);
        assert_eq!(&row_text(&state, 1)[..6], "There ");
    }

    #[test]
    fn sgr_sets_flags_and_indexed_colors() {
        let (mut parser, mut state) = setup(10, 2);
        feed(&mut parser, &mut state, b"\x1b[1;4;32;45m");
        assert!(state.style.flags.contains(StyleFlags::BOLD));
        assert!(state.style.flags.contains(StyleFlags::UNDERLINE));
        assert_eq!(state.style.fg, Rgb::new(0, 205, 0));
        assert_eq!(state.style.bg, Rgb::new(205, 0, 205));
        feed(&mut parser, &mut state, b"\x1b[m");
        assert!(state.style.flags.is_empty());
        assert_eq!(state.style.fg, state.default_fg());
    }

    #[test]
    fn sgr_extended_colors() {
        let (mut parser, mut state) = setup(10, 2);
        feed(&mut parser, &mut state, b"\x1b[38;2;10;20;30m");
        assert_eq!(state.style.fg, Rgb::new(10, 20, 30));
        feed(&mut parser, &mut state, b"\x1b[48;5;9m");
        assert_eq!(state.style.bg, Rgb::new(255, 0, 0));
        // Indexed values beyond the palette decompose as packed RGB
        feed(&mut parser, &mut state, b"\x1b[38;5;255m");
        assert_eq!(state.style.fg, Rgb::new(0, 0, 255));
    }

    #[test]
    fn bright_sgr_colors() {
        let (mut parser, mut state) = setup(10, 2);
        feed(&mut parser, &mut state, b"\x1b[97;101m");
        assert_eq!(state.style.fg, Rgb::new(255, 255, 255));
        assert_eq!(state.style.bg, Rgb::new(255, 0, 0));
    }

    #[test]
    fn modes_toggle_through_dispatch() {
        let (mut parser, mut state) = setup(10, 4);
        feed(&mut parser, &mut state, b"\x1b[?5h\x1b[?7l\x1b[20h");
        assert!(state.modes().reverse_video);
        assert!(!state.modes().auto_wrap);
        assert!(state.modes().linefeed_newline);
        feed(&mut parser, &mut state, b"\x1b[?5l\x1b[?7h\x1b[20l");
        assert!(!state.modes().reverse_video);
        assert!(state.modes().auto_wrap);
        assert!(!state.modes().linefeed_newline);
    }

    #[test]
    fn unimplemented_modes_leave_state_untouched() {
        let (mut parser, mut state) = setup(10, 4);
        feed(&mut parser, &mut state, b"\x1b[?1049h\x1b[?25l\x1b[4h");
        assert_eq!(state.cursor().x, 0);
        assert!(state.modes().auto_wrap);
        assert_eq!(row_text(&state, 0), "          ");
    }

    #[test]
    fn linefeed_newline_mode_returns_column() {
        let (mut parser, mut state) = setup(10, 4);
        feed(&mut parser, &mut state, b"abc\n");
        assert_eq!(state.cursor().x, 3);
        assert_eq!(state.cursor().y, 1);
        feed(&mut parser, &mut state, b"\x1b[20h");
        feed(&mut parser, &mut state, b"de\n");
        assert_eq!(state.cursor().x, 0);
        assert_eq!(state.cursor().y, 2);
    }

    #[test]
    fn full_reset_via_esc_c() {
        let (mut parser, mut state) = setup(10, 4);
        feed(&mut parser, &mut state, b"\x1b[7mjunk\x1b[2;3r\x1b[?6h");
        feed(&mut parser, &mut state, b"\x1bc");
        assert_eq!(state.cursor().x, 0);
        assert_eq!(state.cursor().y, 0);
        assert_eq!(state.scroll_region(), (0, 4));
        assert!(state.style.flags.is_empty());
        assert!(!state.modes().origin);
        assert_eq!(row_text(&state, 0), "          ");
    }

    #[test]
    fn full_reset_via_decstr() {
        let (mut parser, mut state) = setup(10, 4);
        feed(&mut parser, &mut state, b"\x1b[7mjunk\x1b[2;3r\x1b[?6h");
        feed(&mut parser, &mut state, b"\x1b[!p");
        assert_eq!(state.cursor().x, 0);
        assert_eq!(state.scroll_region(), (0, 4));
        assert!(state.style.flags.is_empty());
        assert!(!state.modes().origin);
        assert_eq!(row_text(&state, 0), "          ");
    }

    #[test]
    fn osc_body_swallowed_until_st() {
        let (mut parser, mut state) = setup(20, 4);
        feed(&mut parser, &mut state, b"\x1b]0;window title\x1b\\after");
        assert_eq!(&row_text(&state, 0)[..6], "after ");
    }

    #[test]
    fn dcs_body_swallowed_until_st() {
        let (mut parser, mut state) = setup(20, 4);
        feed(&mut parser, &mut state, b"\x1bPq#0;2;0;0;0\x1b\\ok");
        assert_eq!(&row_text(&state, 0)[..3], "ok ");
    }

    #[test]
    fn esc_inside_string_body_does_not_abort() {
        let (mut parser, mut state) = setup(20, 4);
        // ESC followed by a non-backslash stays inside the string body
        feed(&mut parser, &mut state, b"\x1b]2;a\x1bbc\x1b\\X");
        assert_eq!(state.grid().cell(0, 0).ch, 'X');
        assert_eq!(state.cursor().x, 1);
    }

    #[test]
    fn parameter_overflow_aborts_without_corruption() {
        let (mut parser, mut state) = setup(10, 4);
        feed(&mut parser, &mut state, b"ab");
        let mut seq = b"\x1b[".to_vec();
        for _ in 0..MAX_PARAMS + 1 {
            seq.extend_from_slice(b"1;");
        }
        feed(&mut parser, &mut state, &seq);
        assert_eq!(state.grid().cell(0, 0).ch, 'a');
        assert_eq!(state.grid().cell(1, 0).ch, 'b');
        assert_eq!(state.cursor().x, 2);
        // Dispatch works again after the abort
        feed(&mut parser, &mut state, b"\x1b[1;1Hz");
        assert_eq!(state.grid().cell(0, 0).ch, 'z');
    }

    #[test]
    fn unrecognized_csi_is_ignored() {
        let (mut parser, mut state) = setup(10, 4);
        feed(&mut parser, &mut state, b"ab\x1b[5}cd");
        assert_eq!(&row_text(&state, 0)[..4], "abcd");
    }

    #[test]
    fn unimplemented_csi_is_ignored() {
        let (mut parser, mut state) = setup(10, 4);
        feed(&mut parser, &mut state, b"ab\x1b[2@\x1b[3L\x1b[5Xcd");
        assert_eq!(&row_text(&state, 0)[..4], "abcd");
    }

    #[test]
    fn charset_designation_and_shift() {
        let (mut parser, mut state) = setup(10, 4);
        feed(&mut parser, &mut state, b"\x1b)0q\x0eq\x0fq");
        assert_eq!(state.grid().cell(0, 0).glyph(), 'q');
        assert_eq!(state.grid().cell(1, 0).glyph(), '─');
        assert_eq!(state.grid().cell(2, 0).glyph(), 'q');
    }

    #[test]
    fn dec_alignment_test_fills_screen() {
        let (mut parser, mut state) = setup(4, 2);
        feed(&mut parser, &mut state, b"\x1b#8");
        assert_eq!(row_text(&state, 0), "EEEE");
        assert_eq!(row_text(&state, 1), "EEEE");
    }

    #[test]
    fn control_bytes_inside_csi_execute_immediately() {
        let (mut parser, mut state) = setup(10, 4);
        // The backspace acts mid-sequence, then the CSI completes: EL 1
        // erases from the start of the line through the moved cursor
        feed(&mut parser, &mut state, b"abc\x1b[\x081K");
        assert_eq!(state.cursor().x, 2);
        assert_eq!(row_text(&state, 0), "          ");
    }

    #[test]
    fn esc_aborts_partial_csi() {
        let (mut parser, mut state) = setup(10, 4);
        feed(&mut parser, &mut state, b"\x1b[12\x1b[3GX");
        assert_eq!(state.grid().cell(2, 0).ch, 'X');
    }

    #[test]
    fn tab_motion_commands() {
        let (mut parser, mut state) = setup(40, 4);
        feed(&mut parser, &mut state, b"\x1b[2I");
        assert_eq!(state.cursor().x, 16);
        feed(&mut parser, &mut state, b"\x1b[Z");
        assert_eq!(state.cursor().x, 8);
        // HTS at column 13, then tab through it
        feed(&mut parser, &mut state, b"\x1b[14G\x1bH\x1b[1;1H");
        feed(&mut parser, &mut state, b"\x1b[I");
        assert_eq!(state.cursor().x, 8);
        feed(&mut parser, &mut state, b"\x1b[I");
        assert_eq!(state.cursor().x, 13);
        feed(&mut parser, &mut state, b"\x1b[0g\x1b[1;1H\x1b[2I");
        assert_eq!(state.cursor().x, 16);
    }
}
