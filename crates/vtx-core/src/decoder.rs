#![forbid(unsafe_code)]

//! Incremental decoder for terminal input.
//!
//! Decodes bytes into [`Event`] values. Input may arrive split across reads
//! at any byte boundary: an incomplete sequence is kept in a [`Residual`]
//! that the caller threads through successive calls.
//!
//! # Design
//!
//! Every multi-byte sequence has a fixed length known from its first one or
//! two bytes:
//!
//! | Lead | Length | Meaning |
//! |------|--------|---------|
//! | `SEP` | 2 | function key |
//! | `US` | 3 | cursor address / position reply |
//! | `REP` | 2 | repetition |
//! | `SS2` | 2 or 3 | G2 symbol, or diacritic + letter |
//! | `SOH` | 5 | ROM identification reply |
//! | `ESC` | 2 | attribute, position request |
//! | `ESC PRO1/2/3` | 3 / 4 / 5 | protocol module |
//! | `ESC [` | up to 8 | CSI: partial clears, anything else unknown |
//!
//! ## Invariants
//! 1. The residual never holds more than [`MAX_SEQUENCE_LEN`] bytes.
//! 2. Splitting the input at any point yields the same events as decoding it
//!    in one call.
//! 3. Argument bytes are never control codes. A control byte arriving inside
//!    a sequence discards the partial bytes and is decoded as a new lead byte,
//!    so a key pressed during line noise is never lost.
//! 4. The character-set shift follows the terminal: `FF`, `US` and `RS`
//!    return to the text set. Addressing the status row (row 0) saves the
//!    shift and the `LF` that leaves it restores it.
//!
//! ## Failure Modes
//! - Unknown lead bytes and malformed sequences yield [`Event::Unknown`];
//!   decoding continues with the next byte.
//! - `NUL` is link padding and is dropped.

use crate::attr::DisplayMode;
use crate::charset::{self, SS2};
use crate::command::{
    AttributeChange, BEL, BS, CAN, CR, CSI, CURSOR_OFF, CURSOR_ON, Command, ERASE_IN_LINE,
    ERASE_IN_SCREEN, ESC, FF, HT, LF, Part, REP, REQUEST_POSITION, RS, SEP, SI, SO, US, VT,
};
use crate::event::{Event, KeyEvent, MAX_SEQUENCE_LEN, UnknownSequence};
use crate::geometry::Position;
use crate::identification::{DeviceSpecs, EOT, ROM_REPLY_LEN, SOH};
use crate::keymap::KeyMap;
use crate::protocol::{self, ProtocolCommand};

const NUL: u8 = 0x00;

/// Bytes of an incomplete sequence, kept between decode calls.
///
/// Also carries the character-set shift (`SO` / `SI`) seen so far, which
/// decides whether printable bytes are letters or mosaic cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Residual {
    buf: [u8; MAX_SEQUENCE_LEN],
    len: usize,
    graphic: bool,
    /// Shift in effect before the status row was addressed.
    saved_graphic: Option<bool>,
}

impl Residual {
    /// An empty residual in text shift.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_SEQUENCE_LEN],
            len: 0,
            graphic: false,
            saved_graphic: None,
        }
    }

    /// Bytes of the pending partial sequence.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Check whether no partial sequence is pending.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether printable bytes currently decode as mosaic cells.
    #[must_use]
    pub const fn is_graphic(&self) -> bool {
        self.graphic
    }

    /// Drop the pending bytes and return to text shift.
    pub fn reset(&mut self) {
        self.len = 0;
        self.graphic = false;
        self.saved_graphic = None;
    }

    fn push(&mut self, byte: u8) {
        if self.len < MAX_SEQUENCE_LEN {
            self.buf[self.len] = byte;
            self.len += 1;
        }
    }

    fn clear(&mut self) {
        self.len = 0;
    }

    /// Control bytes that are part of a sequence rather than a new lead.
    fn accepts_control(&self, byte: u8) -> bool {
        byte == EOT && self.len == ROM_REPLY_LEN - 1 && self.buf[0] == SOH
    }

    fn track(&mut self, event: &Event) {
        let Event::Command(command) = event else {
            return;
        };
        match command {
            Command::SetMode(DisplayMode::Graphic) => self.graphic = true,
            Command::SetMode(DisplayMode::Text | DisplayMode::Mixed) | Command::ExitMixed => {
                self.graphic = false;
            }
            Command::MoveTo(pos) if pos.row == 0 => {
                if self.saved_graphic.is_none() {
                    self.saved_graphic = Some(self.graphic);
                }
                self.graphic = false;
            }
            Command::MoveTo(_) | Command::CursorHome | Command::ClearScreen => {
                self.saved_graphic = None;
                self.graphic = false;
            }
            Command::CursorDown => {
                if let Some(graphic) = self.saved_graphic.take() {
                    self.graphic = graphic;
                }
            }
            _ => {}
        }
    }
}

/// Outcome of adding a byte to a pending sequence.
enum Progress {
    Pending,
    Done(Event),
}

/// Decode `input`, continuing any sequence left in `residual`.
///
/// Returns the events completed by these bytes, in input order.
pub fn decode(input: &[u8], residual: &mut Residual, keymap: &KeyMap) -> Vec<Event> {
    let mut events = Vec::new();
    for &byte in input {
        if let Some(event) = decode_byte(byte, residual, keymap) {
            residual.track(&event);
            events.push(event);
        }
    }
    events
}

fn decode_byte(byte: u8, residual: &mut Residual, keymap: &KeyMap) -> Option<Event> {
    if !residual.is_empty() {
        if byte < 0x20 && !residual.accepts_control(byte) {
            crate::trace!(
                discarded = residual.pending().len(),
                lead = byte,
                "partial sequence dropped"
            );
            residual.clear();
        } else {
            residual.push(byte);
            return match continue_sequence(residual.pending(), keymap) {
                Progress::Pending => None,
                Progress::Done(event) => {
                    residual.clear();
                    Some(event)
                }
            };
        }
    }
    decode_lead(byte, residual, keymap)
}

fn decode_lead(byte: u8, residual: &mut Residual, keymap: &KeyMap) -> Option<Event> {
    if let Some(key) = keymap.lookup_single(byte) {
        return Some(Event::Key(KeyEvent::Function(key)));
    }
    let command = match byte {
        NUL => return None,
        SEP | US | REP | SS2 | SOH | ESC => {
            residual.push(byte);
            return None;
        }
        BEL => Command::Bell,
        BS => Command::CursorLeft,
        HT => Command::CursorRight,
        LF => Command::CursorDown,
        VT => Command::CursorUp,
        FF => Command::ClearScreen,
        CR => Command::CarriageReturn,
        SO => Command::SetMode(DisplayMode::Graphic),
        SI => Command::SetMode(DisplayMode::Text),
        CURSOR_ON => Command::CursorVisible(true),
        CURSOR_OFF => Command::CursorVisible(false),
        CAN => Command::ClearToEndOfLine,
        RS => Command::CursorHome,
        0x20..=0x7F if residual.graphic && byte & 0x20 != 0 => Command::Cell(byte),
        0x20..=0x7E => return Some(Event::Key(KeyEvent::Char(byte as char))),
        _ => return Some(unknown(&[byte])),
    };
    Some(Event::Command(command))
}

fn continue_sequence(seq: &[u8], keymap: &KeyMap) -> Progress {
    match seq[0] {
        SEP => Progress::Done(match keymap.lookup_sep(seq[1]) {
            Some(key) => Event::Key(KeyEvent::Function(key)),
            None => unknown(seq),
        }),
        REP => Progress::Done(match address(seq[1]) {
            Some(n) => Event::Command(Command::Repeat(n)),
            None => unknown(seq),
        }),
        US if seq.len() < 3 => Progress::Pending,
        US => Progress::Done(match (address(seq[1]), address(seq[2])) {
            (Some(row), Some(col)) => Event::Command(Command::MoveTo(Position::new(row, col))),
            _ => unknown(seq),
        }),
        SS2 => continue_g2(seq),
        SOH if seq.len() < ROM_REPLY_LEN => Progress::Pending,
        SOH => Progress::Done(match DeviceSpecs::parse(seq) {
            Some(specs) => Event::Identification(specs),
            None => unknown(seq),
        }),
        ESC => continue_escape(seq),
        _ => Progress::Done(unknown(seq)),
    }
}

fn continue_g2(seq: &[u8]) -> Progress {
    let code = seq[1];
    let decoded = match seq.len() {
        2 if charset::is_diacritic(code) => return Progress::Pending,
        2 => charset::decode_symbol(code),
        _ => charset::decode_accented(code, seq[2]),
    };
    Progress::Done(match decoded {
        Some(c) => Event::Key(KeyEvent::Char(c)),
        None => unknown(seq),
    })
}

fn continue_escape(seq: &[u8]) -> Progress {
    let kind = seq[1];
    let full_len = match kind {
        protocol::PRO1 => 3,
        protocol::PRO2 => 4,
        protocol::PRO3 => 5,
        CSI => return continue_csi(seq),
        REQUEST_POSITION => return Progress::Done(Event::Command(Command::RequestPosition)),
        _ => {
            return Progress::Done(match AttributeChange::from_code(kind) {
                Some(change) => Event::Command(Command::Attribute(change)),
                None => unknown(seq),
            });
        }
    };
    if seq.len() < full_len {
        return Progress::Pending;
    }
    let command = match *seq {
        [_, protocol::PRO1, a] => Command::Protocol(ProtocolCommand::Pro1(a)),
        [_, protocol::PRO2, protocol::MIXED, protocol::MIXED_ENTER] => {
            Command::SetMode(DisplayMode::Mixed)
        }
        [_, protocol::PRO2, protocol::MIXED, protocol::MIXED_LEAVE] => Command::ExitMixed,
        [_, protocol::PRO2, a, b] => Command::Protocol(ProtocolCommand::Pro2(a, b)),
        [_, protocol::PRO3, a, b, c] => Command::Protocol(ProtocolCommand::Pro3(a, b, c)),
        _ => return Progress::Done(unknown(seq)),
    };
    Progress::Done(Event::Command(command))
}

/// `ESC [` parameters and intermediates, up to a final byte or the buffer limit.
fn continue_csi(seq: &[u8]) -> Progress {
    let last = seq[seq.len() - 1];
    let complete = seq.len() > 2 && (0x40..=0x7E).contains(&last);
    if !complete && seq.len() < MAX_SEQUENCE_LEN {
        return Progress::Pending;
    }
    let part = match seq[2..seq.len() - 1] {
        [] => Some(Part::End),
        [d @ b'0'..=b'9'] => Part::from_code(d - b'0'),
        _ => None,
    };
    Progress::Done(match (complete, part, last) {
        (true, Some(part), ERASE_IN_SCREEN) => Event::Command(Command::ClearScreenPart(part)),
        (true, Some(part), ERASE_IN_LINE) => Event::Command(Command::ClearLinePart(part)),
        _ => unknown(seq),
    })
}

/// Decode a `0x40 + n` argument byte.
fn address(byte: u8) -> Option<u8> {
    (0x40..=0x7F).contains(&byte).then(|| byte - 0x40)
}

fn unknown(bytes: &[u8]) -> Event {
    Event::Unknown(UnknownSequence::new(bytes))
}

/// Stateful wrapper around [`decode`] that owns its residual and key map.
///
/// ```
/// use vtx_core::decoder::Decoder;
/// use vtx_core::event::{Event, FunctionKey, KeyEvent};
///
/// let mut decoder = Decoder::default();
/// assert!(decoder.decode(&[0x13]).is_empty());
/// assert_eq!(
///     decoder.decode(&[0x41]),
///     vec![Event::Key(KeyEvent::Function(FunctionKey::Submit))]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    residual: Residual,
    keymap: KeyMap,
}

impl Decoder {
    /// Create a decoder using the given key map.
    #[must_use]
    pub fn new(keymap: KeyMap) -> Self {
        Self {
            residual: Residual::new(),
            keymap,
        }
    }

    /// Decode input bytes and return any completed events.
    pub fn decode(&mut self, input: &[u8]) -> Vec<Event> {
        decode(input, &mut self.residual, &self.keymap)
    }

    #[must_use]
    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    #[must_use]
    pub fn residual(&self) -> &Residual {
        &self.residual
    }

    /// Forget any partial sequence and the shift state.
    pub fn reset(&mut self) {
        self.residual.reset();
    }
}
