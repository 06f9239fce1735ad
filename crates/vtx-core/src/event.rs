#![forbid(unsafe_code)]

//! Decoded input events.
//!
//! Everything the decoder recognises becomes an [`Event`]. Keyboard input is
//! reported as [`KeyEvent`]; screen-control sequences (echoed by the terminal,
//! or read back from a captured host stream) are reported as the
//! [`Command`] that would produce them, so that decoding mirrors encoding.
//!
//! # Design Notes
//!
//! - Unrecognised input is never an error: it surfaces as [`Event::Unknown`]
//!   and decoding continues with the next byte.
//! - [`UnknownSequence`] is a fixed-size copy of the offending bytes.

use std::fmt;

use crate::command::Command;
use crate::identification::DeviceSpecs;

/// Longest sequence the decoder ever buffers.
pub const MAX_SEQUENCE_LEN: usize = 8;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A screen-control sequence.
    Command(Command),

    /// The reply to a ROM identification request.
    Identification(DeviceSpecs),

    /// Bytes that do not form a known sequence.
    Unknown(UnknownSequence),
}

impl Event {
    /// The key event, if this is one.
    #[must_use]
    pub fn as_key(&self) -> Option<KeyEvent> {
        match self {
            Self::Key(key) => Some(*key),
            _ => None,
        }
    }
}

impl From<KeyEvent> for Event {
    fn from(key: KeyEvent) -> Self {
        Self::Key(key)
    }
}

impl From<Command> for Event {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

/// A keyboard event: either a printable character or a function key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    Char(char),
    Function(FunctionKey),
}

impl KeyEvent {
    /// Check if this is a specific character.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self, Self::Char(ch) if *ch == c)
    }
}

/// Dedicated function keys of the videotex keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FunctionKey {
    /// SUITE
    Next,
    /// RETOUR
    Previous,
    /// ANNULATION
    Cancel,
    /// ENVOI
    Submit,
    /// REPETITION
    Repeat,
    /// GUIDE
    Help,
    Correction,
    /// SOMMAIRE
    Home,
}

impl FunctionKey {
    pub const ALL: [FunctionKey; 8] = [
        FunctionKey::Next,
        FunctionKey::Previous,
        FunctionKey::Cancel,
        FunctionKey::Submit,
        FunctionKey::Repeat,
        FunctionKey::Help,
        FunctionKey::Correction,
        FunctionKey::Home,
    ];
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Cancel => "cancel",
            Self::Submit => "submit",
            Self::Repeat => "repeat",
            Self::Help => "help",
            Self::Correction => "correction",
            Self::Home => "home",
        };
        f.write_str(name)
    }
}

/// Bytes that the decoder could not interpret.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownSequence {
    bytes: [u8; MAX_SEQUENCE_LEN],
    len: u8,
}

impl UnknownSequence {
    /// Copy up to [`MAX_SEQUENCE_LEN`] bytes.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        let len = bytes.len().min(MAX_SEQUENCE_LEN);
        let mut buf = [0; MAX_SEQUENCE_LEN];
        buf[..len].copy_from_slice(&bytes[..len]);
        Self {
            bytes: buf,
            len: len as u8,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl fmt::Debug for UnknownSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnknownSequence({:02x?})", self.as_bytes())
    }
}

impl fmt::Display for UnknownSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}
