#![forbid(unsafe_code)]

//! Semi-graphic (mosaic) cells.
//!
//! A character cell in graphic mode shows a 2 x 3 grid of sub-pixels. Each
//! sub-pixel is either the foreground or the background color of the cell.
//!
//! ```text
//!  +----+----+
//!  | b0 | b1 |
//!  +----+----+
//!  | b2 | b3 |
//!  +----+----+
//!  | b4 | b5 |
//!  +----+----+
//! ```
//!
//! The protocol byte is `0x20 | b0 | b1<<1 | b2<<2 | b3<<3 | b4<<4 | b5<<6`:
//! bit 5 is always set, and the last sub-pixel skips over it.

use bitflags::bitflags;

use vtx_core::attr::{Attributes, Color, DisplayMode};

use crate::screen::{Screen, ScreenError};

bitflags! {
    /// Lit (foreground) sub-pixels of a mosaic cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SubPixels: u8 {
        const TOP_LEFT      = 1 << 0;
        const TOP_RIGHT     = 1 << 1;
        const MIDDLE_LEFT   = 1 << 2;
        const MIDDLE_RIGHT  = 1 << 3;
        const BOTTOM_LEFT   = 1 << 4;
        const BOTTOM_RIGHT  = 1 << 5;
    }
}

impl SubPixels {
    /// Sub-pixel at column `x` (0-1) and row `y` (0-2).
    #[must_use]
    pub const fn at(x: usize, y: usize) -> Self {
        Self::from_bits_truncate(1 << (y * 2 + x))
    }

    /// Encoded protocol byte.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        let bits = self.bits();
        0x20 | (bits & 0x1F) | ((bits & 0x20) << 1)
    }

    /// Inverse of [`SubPixels::to_byte`]. Returns `None` for bytes that are
    /// not mosaic codes.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        if byte & 0x20 == 0 || byte & 0x80 != 0 {
            return None;
        }
        Some(Self::from_bits_truncate((byte & 0x1F) | ((byte & 0x40) >> 1)))
    }
}

/// One semi-graphic character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemiGraphicCell {
    pub fg: Color,
    pub bg: Color,
    /// Sub-pixels drawn in `fg`; the others show `bg`.
    pub pattern: SubPixels,
}

impl SemiGraphicCell {
    #[must_use]
    pub const fn new(fg: Color, bg: Color, pattern: SubPixels) -> Self {
        Self { fg, bg, pattern }
    }

    /// A cell filled with a single color.
    #[must_use]
    pub const fn solid(color: Color) -> Self {
        Self {
            fg: color,
            bg: color,
            pattern: SubPixels::all(),
        }
    }

    /// Color shown by the sub-pixel at (`x`, `y`).
    #[must_use]
    pub fn color_at(&self, x: usize, y: usize) -> Color {
        if self.pattern.contains(SubPixels::at(x, y)) {
            self.fg
        } else {
            self.bg
        }
    }

    #[must_use]
    pub const fn to_byte(&self) -> u8 {
        self.pattern.to_byte()
    }

    /// Attributes needed to draw this cell on top of `current`.
    ///
    /// A full cell never shows its background and an empty one never shows
    /// its foreground, so those colors are left as they are.
    #[must_use]
    pub fn attributes(&self, current: Attributes) -> Attributes {
        let pattern = self.pattern;
        Attributes {
            fg: if pattern.is_empty() { current.fg } else { self.fg },
            bg: if pattern.is_all() { current.bg } else { self.bg },
            flags: Default::default(),
        }
    }
}

impl Screen {
    /// Draw one semi-graphic cell at the cursor.
    ///
    /// Switches to graphic mode and emits only the color changes the cell
    /// actually shows.
    pub fn draw_cell(&mut self, cell: &SemiGraphicCell) -> Result<(), ScreenError> {
        self.set_mode(DisplayMode::Graphic);
        let base = self.attributes().unwrap_or_default();
        let target = if self.attributes().is_some() {
            cell.attributes(base)
        } else {
            Attributes::default().with_fg(cell.fg).with_bg(cell.bg)
        };
        self.set_attributes(target)?;
        self.write_cell(cell.to_byte());
        Ok(())
    }
}
