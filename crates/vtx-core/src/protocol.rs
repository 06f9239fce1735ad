#![forbid(unsafe_code)]

//! Protocol-module sequences (`PRO1`, `PRO2`, `PRO3`).
//!
//! These address the terminal's internal modules rather than the screen:
//! ROM enquiry, reset, link speed programming, local echo, status requests.
//! Status replies come back as `PRO2` sequences whose last byte carries the
//! payload.

use std::fmt;

/// `ESC 0x39`: one argument byte follows.
pub const PRO1: u8 = 0x39;
/// `ESC 0x3A`: two argument bytes follow.
pub const PRO2: u8 = 0x3A;
/// `ESC 0x3B`: three argument bytes follow.
pub const PRO3: u8 = 0x3B;

const ENQROM: u8 = 0x7B;
const RESET: u8 = 0x7F;
const STATUS_TERMINAL: u8 = 0x70;
const STATUS_FUNCTIONAL: u8 = 0x72;
const STATUS_SPEED: u8 = 0x74;
const STATUS_PROTOCOL: u8 = 0x76;
const PROG: u8 = 0x6B;
const START: u8 = 0x69;
const STOP: u8 = 0x6A;
const OFF: u8 = 0x60;
const ON: u8 = 0x61;
const MODULE_SCREEN: u8 = 0x58;
const MODULE_MODEM: u8 = 0x5A;
const ROLL: u8 = 0x43;

/// `PRO2` arguments selecting the mixed mode.
pub const MIXED: u8 = 0x32;
/// Videotex to mixed.
pub const MIXED_ENTER: u8 = 0x7D;
/// Mixed back to videotex.
pub const MIXED_LEAVE: u8 = 0x7E;

/// A protocol-module command with its argument bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolCommand {
    Pro1(u8),
    Pro2(u8, u8),
    Pro3(u8, u8, u8),
}

impl ProtocolCommand {
    /// Ask the terminal for its ROM identification.
    pub const ENQ_ROM: Self = Self::Pro1(ENQROM);
    /// Soft reset.
    pub const RESET: Self = Self::Pro1(RESET);
    /// Terminal status request.
    pub const STATUS_TERMINAL: Self = Self::Pro1(STATUS_TERMINAL);
    /// Functional status request (caps lock, roll, width).
    pub const STATUS_FUNCTIONAL: Self = Self::Pro1(STATUS_FUNCTIONAL);
    /// Link speed status request.
    pub const STATUS_SPEED: Self = Self::Pro1(STATUS_SPEED);
    /// Protocol status request.
    pub const STATUS_PROTOCOL: Self = Self::Pro1(STATUS_PROTOCOL);

    /// Program both link directions to `speed`.
    #[must_use]
    pub const fn set_speed(speed: LinkSpeed) -> Self {
        let code = speed.code();
        Self::Pro2(PROG, 0x40 | (code << 3) | code)
    }

    /// Toggle the local echo of keyboard input to the screen.
    #[must_use]
    pub const fn echo(on: bool) -> Self {
        Self::Pro3(if on { ON } else { OFF }, MODULE_SCREEN, 0x52)
    }

    /// Toggle roll (scroll) mode on the screen module.
    #[must_use]
    pub const fn roll(on: bool) -> Self {
        Self::Pro2(if on { START } else { STOP }, ROLL)
    }

    /// Connect or disconnect the modem.
    #[must_use]
    pub const fn modem(connect: bool) -> Self {
        Self::Pro1(if connect { 0x68 } else { 0x67 })
    }

    /// Route the modem output to the screen (used by echo setups).
    #[must_use]
    pub const fn modem_to_screen(on: bool) -> Self {
        Self::Pro3(if on { ON } else { OFF }, MODULE_SCREEN, MODULE_MODEM)
    }

    /// Total encoded length, `ESC` included.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Pro1(_) => 3,
            Self::Pro2(..) => 4,
            Self::Pro3(..) => 5,
        }
    }

    /// Always false: every protocol command carries at least one argument.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Append the encoded bytes to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        const ESC: u8 = 0x1B;
        match *self {
            Self::Pro1(a) => out.extend_from_slice(&[ESC, PRO1, a]),
            Self::Pro2(a, b) => out.extend_from_slice(&[ESC, PRO2, a, b]),
            Self::Pro3(a, b, c) => out.extend_from_slice(&[ESC, PRO3, a, b, c]),
        }
    }
}

/// Supported serial link speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LinkSpeed {
    B75,
    B300,
    B1200,
    B4800,
    B9600,
}

impl LinkSpeed {
    pub const ALL: [LinkSpeed; 5] = [
        LinkSpeed::B75,
        LinkSpeed::B300,
        LinkSpeed::B1200,
        LinkSpeed::B4800,
        LinkSpeed::B9600,
    ];

    /// Protocol speed code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::B75 => 1,
            Self::B300 => 2,
            Self::B1200 => 4,
            Self::B4800 => 6,
            Self::B9600 => 7,
        }
    }

    #[must_use]
    pub const fn baud(self) -> u32 {
        match self {
            Self::B75 => 75,
            Self::B300 => 300,
            Self::B1200 => 1200,
            Self::B4800 => 4800,
            Self::B9600 => 9600,
        }
    }

    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    #[must_use]
    pub fn from_baud(baud: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.baud() == baud)
    }

    /// Decode the payload of a speed status reply into (send, receive).
    #[must_use]
    pub fn from_status(byte: u8) -> (Option<Self>, Option<Self>) {
        (Self::from_code((byte >> 3) & 7), Self::from_code(byte & 7))
    }
}

impl fmt::Display for LinkSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bd", self.baud())
    }
}

/// Payload of a functional status reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionalStatus {
    pub caps_lock: bool,
    pub roll: bool,
    /// Screen width in columns.
    pub width: u8,
}

impl FunctionalStatus {
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            caps_lock: byte & 0x08 == 0,
            roll: byte & 0x02 != 0,
            width: if byte & 0x01 != 0 { 80 } else { 40 },
        }
    }
}
