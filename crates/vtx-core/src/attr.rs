#![forbid(unsafe_code)]

//! Display modes and character attributes.
//!
//! Attributes on a videotex terminal are cumulative: each escape sequence
//! changes one aspect and leaves the others untouched until the next change
//! or a screen clear. [`Attributes`] models the full set so that callers can
//! diff a target against the tracked state.

use bitflags::bitflags;
use std::fmt;

/// Active character set / interpretation of printable bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayMode {
    /// Alphanumeric G0 set.
    #[default]
    Text,
    /// Mixed videotex/teleinformatics mode.
    Mixed,
    /// Semi-graphic G1 (mosaic) set.
    Graphic,
}

impl DisplayMode {
    /// Short lowercase name, for logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Mixed => "mixed",
            Self::Graphic => "graphic",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The eight hardware colors, in protocol index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl Color {
    /// All colors, in index order.
    pub const ALL: [Color; 8] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
    ];

    /// Color for a protocol index. Only the low three bits are significant.
    #[inline]
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        Self::ALL[(index & 0x07) as usize]
    }

    /// Protocol index (0-7).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }
}

bitflags! {
    /// Boolean character attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttrFlags: u8 {
        const BLINK         = 1 << 0;
        const INVERSE       = 1 << 1;
        const UNDERLINE     = 1 << 2;
        const DOUBLE_HEIGHT = 1 << 3;
        const DOUBLE_WIDTH  = 1 << 4;
    }
}

impl AttrFlags {
    /// Flags that only make sense for alphanumeric characters.
    pub const TEXT_ONLY: Self = Self::UNDERLINE
        .union(Self::DOUBLE_HEIGHT)
        .union(Self::DOUBLE_WIDTH);

    /// The size-related flags, set together by a single sequence.
    pub const SIZE: Self = Self::DOUBLE_HEIGHT.union(Self::DOUBLE_WIDTH);
}

/// Character size, derived from the size flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CharSize {
    #[default]
    Normal,
    DoubleHeight,
    DoubleWidth,
    DoubleSize,
}

impl CharSize {
    /// Size encoded by the given flags (other flags are ignored).
    #[must_use]
    pub const fn from_flags(flags: AttrFlags) -> Self {
        let h = flags.contains(AttrFlags::DOUBLE_HEIGHT);
        let w = flags.contains(AttrFlags::DOUBLE_WIDTH);
        match (h, w) {
            (false, false) => Self::Normal,
            (true, false) => Self::DoubleHeight,
            (false, true) => Self::DoubleWidth,
            (true, true) => Self::DoubleSize,
        }
    }

    /// Flags corresponding to this size.
    #[must_use]
    pub const fn flags(self) -> AttrFlags {
        match self {
            Self::Normal => AttrFlags::empty(),
            Self::DoubleHeight => AttrFlags::DOUBLE_HEIGHT,
            Self::DoubleWidth => AttrFlags::DOUBLE_WIDTH,
            Self::DoubleSize => AttrFlags::SIZE,
        }
    }

    /// Number of columns a character occupies.
    #[must_use]
    pub const fn columns(self) -> u8 {
        match self {
            Self::Normal | Self::DoubleHeight => 1,
            Self::DoubleWidth | Self::DoubleSize => 2,
        }
    }
}

/// A complete attribute set: colors plus flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attributes {
    pub fg: Color,
    pub bg: Color,
    pub flags: AttrFlags,
}

impl Default for Attributes {
    /// The state the terminal is in after power-up or a screen clear.
    fn default() -> Self {
        Self {
            fg: Color::White,
            bg: Color::Black,
            flags: AttrFlags::empty(),
        }
    }
}

impl Attributes {
    /// Default attributes with the given foreground.
    #[must_use]
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Self::default()
        }
    }

    /// Builder: set the foreground color.
    #[must_use]
    pub const fn with_fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    /// Builder: set the background color.
    #[must_use]
    pub const fn with_bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Builder: add flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: AttrFlags) -> Self {
        self.flags = self.flags.union(flags);
        self
    }

    /// Builder: remove flags.
    #[must_use]
    pub const fn without_flags(mut self, flags: AttrFlags) -> Self {
        self.flags = self.flags.difference(flags);
        self
    }

    /// Character size encoded by the flags.
    #[must_use]
    pub const fn size(&self) -> CharSize {
        CharSize::from_flags(self.flags)
    }

    /// Flags that the given mode cannot express.
    #[must_use]
    pub fn illegal_flags(&self, mode: DisplayMode) -> AttrFlags {
        match mode {
            DisplayMode::Graphic => self.flags & AttrFlags::TEXT_ONLY,
            DisplayMode::Text | DisplayMode::Mixed => AttrFlags::empty(),
        }
    }
}
