#![forbid(unsafe_code)]

//! Render: state-tracked output to a videotex terminal.
//!
//! [`screen::Screen`] owns the terminal's mode, attribute, and cursor state
//! and turns high-level operations into the minimal byte sequences.
//! [`mosaic`] adds semi-graphic cells on top of it.

pub mod mosaic;
pub mod screen;

pub use mosaic::{SemiGraphicCell, SubPixels};
pub use screen::{Screen, ScreenError};
