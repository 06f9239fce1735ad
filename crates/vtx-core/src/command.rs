#![forbid(unsafe_code)]

//! Screen-control commands and their byte encoding.
//!
//! Encoding is a pure, total function: every [`Command`] value maps to a
//! fixed byte sequence without consulting the terminal. Values that the
//! protocol cannot carry are folded into range (addresses and repeat counts
//! are taken modulo 64, unsupported characters become `?`).
//!
//! # Sequence Reference
//!
//! | Category | Sequence | Description |
//! |----------|----------|-------------|
//! | C0 | `SI` / `SO` | Text (G0) / semi-graphic (G1) set |
//! | PRO2 | `ESC 3A 32 7D` / `ESC 3A 32 7E` | Enter / leave mixed mode |
//! | C0 | `US row col` | Absolute cursor address (`0x40 + n`) |
//! | C0 | `BS HT LF VT CR RS` | Relative moves, home |
//! | ESC | `ESC 40+c` / `ESC 50+c` | Foreground / background color |
//! | ESC | `ESC 48/49 4C-4F 59/5A 5C/5D` | Blink, size, underline, inverse |
//! | C0 | `REP 40+n` | Repeat the previous character |
//! | C0 | `FF CAN BEL` | Clear screen, clear to end of line, bell |
//! | CSI | `ESC [ n J` / `ESC [ n K` | Clear part of the screen / row |
//! | C0 | `DC1` / `DC4` | Cursor visible / hidden |

use crate::attr::{CharSize, Color, DisplayMode};
use crate::charset;
use crate::geometry::Position;
use crate::protocol::{self, ProtocolCommand};

// =============================================================================
// Byte codes
// =============================================================================

pub const BEL: u8 = 0x07;
pub const BS: u8 = 0x08;
pub const HT: u8 = 0x09;
pub const LF: u8 = 0x0A;
pub const VT: u8 = 0x0B;
pub const FF: u8 = 0x0C;
pub const CR: u8 = 0x0D;
pub const SO: u8 = 0x0E;
pub const SI: u8 = 0x0F;
pub const CURSOR_ON: u8 = 0x11;
pub const REP: u8 = 0x12;
/// Prefix of function-key codes.
pub const SEP: u8 = 0x13;
pub const CURSOR_OFF: u8 = 0x14;
pub const CAN: u8 = 0x18;
pub const ESC: u8 = 0x1B;
pub const RS: u8 = 0x1E;
pub const US: u8 = 0x1F;

/// `ESC a`: ask the terminal for the cursor position.
pub const REQUEST_POSITION: u8 = 0x61;

/// Second byte of a control sequence introducer (`ESC [`).
pub const CSI: u8 = b'[';
/// `CSI n J` final byte.
pub const ERASE_IN_SCREEN: u8 = b'J';
/// `CSI n K` final byte.
pub const ERASE_IN_LINE: u8 = b'K';

/// Enable/disable codes for a boolean attribute.
#[derive(Debug, Clone, Copy)]
pub struct AttrCodes {
    pub on: u8,
    pub off: u8,
}

pub const ATTR_BLINK: AttrCodes = AttrCodes { on: 0x48, off: 0x49 };
pub const ATTR_UNDERLINE: AttrCodes = AttrCodes { on: 0x5A, off: 0x59 };
pub const ATTR_INVERSE: AttrCodes = AttrCodes { on: 0x5D, off: 0x5C };

const FG_BASE: u8 = 0x40;
const BG_BASE: u8 = 0x50;
const SIZE_BASE: u8 = 0x4C;

/// Offset of `US` addresses and `REP` counts.
const ARG_BASE: u8 = 0x40;

/// Largest count a single `REP` can carry.
pub const MAX_REPEAT: u8 = 63;

// =============================================================================
// Commands
// =============================================================================

/// A single attribute change, as carried by one `ESC x` sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeChange {
    Foreground(Color),
    Background(Color),
    Blink(bool),
    Inverse(bool),
    Underline(bool),
    Size(CharSize),
}

impl AttributeChange {
    /// The byte following `ESC`.
    #[must_use]
    pub const fn code(self) -> u8 {
        const fn pick(codes: AttrCodes, on: bool) -> u8 {
            if on { codes.on } else { codes.off }
        }
        match self {
            Self::Foreground(c) => FG_BASE + c.index(),
            Self::Background(c) => BG_BASE + c.index(),
            Self::Blink(on) => pick(ATTR_BLINK, on),
            Self::Inverse(on) => pick(ATTR_INVERSE, on),
            Self::Underline(on) => pick(ATTR_UNDERLINE, on),
            Self::Size(size) => {
                SIZE_BASE
                    + match size {
                        CharSize::Normal => 0,
                        CharSize::DoubleHeight => 1,
                        CharSize::DoubleWidth => 2,
                        CharSize::DoubleSize => 3,
                    }
            }
        }
    }

    /// Inverse of [`AttributeChange::code`].
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x40..=0x47 => Self::Foreground(Color::from_index(code - FG_BASE)),
            0x50..=0x57 => Self::Background(Color::from_index(code - BG_BASE)),
            0x48 => Self::Blink(true),
            0x49 => Self::Blink(false),
            0x4C => Self::Size(CharSize::Normal),
            0x4D => Self::Size(CharSize::DoubleHeight),
            0x4E => Self::Size(CharSize::DoubleWidth),
            0x4F => Self::Size(CharSize::DoubleSize),
            0x59 => Self::Underline(false),
            0x5A => Self::Underline(true),
            0x5C => Self::Inverse(false),
            0x5D => Self::Inverse(true),
            _ => return None,
        })
    }
}

/// Which part of the screen or row a partial clear erases, relative to the
/// cursor. The cursor itself does not move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Part {
    /// From the cursor to the end.
    #[default]
    End,
    /// From the start up to the cursor.
    Begin,
    All,
}

impl Part {
    /// The `n` parameter of `CSI n J` / `CSI n K`.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::End => 0,
            Self::Begin => 1,
            Self::All => 2,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::End),
            1 => Some(Self::Begin),
            2 => Some(Self::All),
            _ => None,
        }
    }
}

/// A screen-control command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Switch display mode.
    SetMode(DisplayMode),
    /// Leave mixed mode, back to videotex text.
    ExitMixed,
    /// Absolute cursor address. Row 0 is the status line.
    MoveTo(Position),
    CursorLeft,
    CursorRight,
    CursorDown,
    CursorUp,
    CarriageReturn,
    /// Cursor to (1, 1).
    CursorHome,
    Attribute(AttributeChange),
    ClearScreen,
    ClearToEndOfLine,
    /// `CSI n J`: erase part of the main screen.
    ClearScreenPart(Part),
    /// `CSI n K`: erase part of the cursor's row.
    ClearLinePart(Part),
    Bell,
    CursorVisible(bool),
    /// Repeat the previous character `n` times.
    Repeat(u8),
    /// Text in the current character set.
    Text(String),
    /// One semi-graphic mosaic byte.
    Cell(u8),
    /// Ask the terminal for the cursor position.
    RequestPosition,
    Protocol(ProtocolCommand),
}

impl Command {
    /// Convenience constructor for [`Command::Text`].
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Append the encoded bytes to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Self::SetMode(DisplayMode::Text) => out.push(SI),
            Self::SetMode(DisplayMode::Graphic) => out.push(SO),
            Self::SetMode(DisplayMode::Mixed) => {
                ProtocolCommand::Pro2(protocol::MIXED, protocol::MIXED_ENTER).encode(out);
            }
            Self::ExitMixed => {
                ProtocolCommand::Pro2(protocol::MIXED, protocol::MIXED_LEAVE).encode(out);
            }
            Self::MoveTo(pos) => out.extend_from_slice(&[US, arg(pos.row), arg(pos.col)]),
            Self::CursorLeft => out.push(BS),
            Self::CursorRight => out.push(HT),
            Self::CursorDown => out.push(LF),
            Self::CursorUp => out.push(VT),
            Self::CarriageReturn => out.push(CR),
            Self::CursorHome => out.push(RS),
            Self::Attribute(change) => out.extend_from_slice(&[ESC, change.code()]),
            Self::ClearScreen => out.push(FF),
            Self::ClearToEndOfLine => out.push(CAN),
            Self::ClearScreenPart(part) => {
                out.extend_from_slice(&[ESC, CSI, b'0' + part.code(), ERASE_IN_SCREEN]);
            }
            Self::ClearLinePart(part) => {
                out.extend_from_slice(&[ESC, CSI, b'0' + part.code(), ERASE_IN_LINE]);
            }
            Self::Bell => out.push(BEL),
            Self::CursorVisible(true) => out.push(CURSOR_ON),
            Self::CursorVisible(false) => out.push(CURSOR_OFF),
            Self::Repeat(n) => out.extend_from_slice(&[REP, arg(*n)]),
            Self::Text(s) => {
                for c in s.chars() {
                    charset::encode_char(c, out);
                }
            }
            Self::Cell(byte) => out.push((byte & 0x7F) | 0x20),
            Self::RequestPosition => out.extend_from_slice(&[ESC, REQUEST_POSITION]),
            Self::Protocol(cmd) => cmd.encode(out),
        }
    }

    /// Encode into a fresh buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }
}

/// Encode a sequence of commands, in order.
#[must_use]
pub fn encode_all<'a, I>(commands: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a Command>,
{
    let mut out = Vec::new();
    for command in commands {
        command.encode(&mut out);
    }
    out
}

#[inline]
const fn arg(n: u8) -> u8 {
    ARG_BASE + (n & 0x3F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_switches() {
        assert_eq!(Command::SetMode(DisplayMode::Text).to_bytes(), vec![SI]);
        assert_eq!(Command::SetMode(DisplayMode::Graphic).to_bytes(), vec![SO]);
        assert_eq!(
            Command::SetMode(DisplayMode::Mixed).to_bytes(),
            vec![ESC, 0x3A, 0x32, 0x7D]
        );
        assert_eq!(Command::ExitMixed.to_bytes(), vec![ESC, 0x3A, 0x32, 0x7E]);
    }

    #[test]
    fn absolute_address() {
        assert_eq!(
            Command::MoveTo(Position::new(5, 12)).to_bytes(),
            vec![US, 0x45, 0x4C]
        );
        assert_eq!(
            Command::MoveTo(Position::new(0, 1)).to_bytes(),
            vec![US, 0x40, 0x41]
        );
    }

    #[test]
    fn attribute_codes_roundtrip() {
        for code in 0u8..=0x7F {
            if let Some(change) = AttributeChange::from_code(code) {
                assert_eq!(change.code(), code);
            }
        }
        assert_eq!(
            Command::Attribute(AttributeChange::Foreground(Color::Red)).to_bytes(),
            vec![ESC, 0x41]
        );
        assert_eq!(
            Command::Attribute(AttributeChange::Background(Color::Blue)).to_bytes(),
            vec![ESC, 0x54]
        );
        assert_eq!(
            Command::Attribute(AttributeChange::Size(CharSize::DoubleWidth)).to_bytes(),
            vec![ESC, 0x4E]
        );
    }

    #[test]
    fn text_uses_g2_for_accents() {
        assert_eq!(Command::text("été").to_bytes(), vec![
            0x19, 0x42, b'e', b't', 0x19, 0x42, b'e'
        ]);
    }

    #[test]
    fn out_of_range_values_fold() {
        assert_eq!(Command::Repeat(70).to_bytes(), vec![REP, 0x40 + 6]);
        assert_eq!(Command::Cell(0x00).to_bytes(), vec![0x20]);
        assert_eq!(Command::Cell(0xFF).to_bytes(), vec![0x7F]);
    }

    #[test]
    fn partial_clears() {
        assert_eq!(
            Command::ClearScreenPart(Part::All).to_bytes(),
            vec![ESC, b'[', b'2', b'J']
        );
        assert_eq!(
            Command::ClearLinePart(Part::Begin).to_bytes(),
            vec![ESC, b'[', b'1', b'K']
        );
        for part in [Part::End, Part::Begin, Part::All] {
            assert_eq!(Part::from_code(part.code()), Some(part));
        }
        assert_eq!(Part::from_code(3), None);
    }

    #[test]
    fn encode_all_preserves_order() {
        let bytes = encode_all(&[
            Command::ClearScreen,
            Command::Bell,
            Command::CursorVisible(true),
        ]);
        assert_eq!(bytes, vec![FF, BEL, CURSOR_ON]);
    }
}
