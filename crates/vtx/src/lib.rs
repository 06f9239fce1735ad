#![forbid(unsafe_code)]

//! Videotex terminal toolkit: public facade.
//!
//! This crate re-exports the protocol vocabulary, the state-tracked screen,
//! and the optional extras, and adds [`Terminal`], a thin adapter that owns
//! the duplex byte channel and drives a [`Screen`] and a [`Decoder`] over it.
//!
//! ```no_run
//! use vtx::prelude::*;
//! # fn open_serial() -> std::net::TcpStream { unimplemented!() }
//!
//! let mut term = Terminal::new(open_serial());
//! term.screen_mut().clear_screen();
//! term.screen_mut().write_text("Hello");
//! term.flush()?;
//! # Ok::<(), vtx::Error>(())
//! ```

use std::fmt;

pub mod config;
pub mod terminal;

pub use config::TerminalConfig;
pub use terminal::Terminal;

// --- Core re-exports -------------------------------------------------------

pub use vtx_core::attr::{AttrFlags, Attributes, CharSize, Color, DisplayMode};
pub use vtx_core::command::{AttributeChange, Command, Part};
pub use vtx_core::decoder::{Decoder, Residual};
pub use vtx_core::event::{Event, FunctionKey, KeyEvent, UnknownSequence};
pub use vtx_core::geometry::{Geometry, GeometryError, Position, Size};
pub use vtx_core::identification::DeviceSpecs;
pub use vtx_core::keymap::{KeyCode, KeyMap};
pub use vtx_core::protocol::{LinkSpeed, ProtocolCommand};

// --- Render re-exports -----------------------------------------------------

pub use vtx_render::{Screen, ScreenError, SemiGraphicCell, SubPixels};

// --- Extras re-exports -----------------------------------------------------

#[cfg(feature = "forms")]
pub use vtx_extras::forms::{
    Effect, FieldDef, FieldKind, FormData, FormDefinition, FormError, FormOutcome, FormPolicy,
    FormSession, FormState, FormStyle, Menu, MenuError, ValidationFailure,
};
#[cfg(feature = "image")]
pub use vtx_extras::image::{CellGrid, ImageConverter, ImageError, Palette};

// --- Errors ---------------------------------------------------------------

/// Top-level error type.
#[derive(Debug)]
pub enum Error {
    /// The byte channel failed. Tracked screen state has been invalidated.
    Channel(std::io::Error),
    Screen(ScreenError),
    #[cfg(feature = "image")]
    Image(ImageError),
    #[cfg(feature = "forms")]
    Form(FormError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(err) => write!(f, "channel error: {err}"),
            Self::Screen(err) => write!(f, "{err}"),
            #[cfg(feature = "image")]
            Self::Image(err) => write!(f, "{err}"),
            #[cfg(feature = "forms")]
            Self::Form(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Channel(err) => Some(err),
            Self::Screen(err) => Some(err),
            #[cfg(feature = "image")]
            Self::Image(err) => Some(err),
            #[cfg(feature = "forms")]
            Self::Form(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Channel(err)
    }
}

impl From<ScreenError> for Error {
    fn from(err: ScreenError) -> Self {
        Self::Screen(err)
    }
}

#[cfg(feature = "image")]
impl From<ImageError> for Error {
    fn from(err: ImageError) -> Self {
        Self::Image(err)
    }
}

#[cfg(feature = "forms")]
impl From<FormError> for Error {
    fn from(err: FormError) -> Self {
        Self::Form(err)
    }
}

/// Standard result type for vtx APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Attributes, Color, DisplayMode, Error, Event, FunctionKey, Geometry, KeyEvent, Position,
        Result, Screen, Size, Terminal, TerminalConfig,
    };

    #[cfg(feature = "forms")]
    pub use crate::{FieldDef, FormDefinition, FormOutcome, FormSession, Menu};

    pub use crate::{core, extras, render};
}

pub use vtx_core as core;
pub use vtx_extras as extras;
pub use vtx_render as render;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_error_display_and_source() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"));
        assert_eq!(err.to_string(), "channel error: gone");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn screen_error_converts() {
        let geometry = Geometry::default();
        let err: Error = ScreenError::from(
            geometry
                .check(Position::new(30, 1))
                .unwrap_err(),
        )
        .into();
        assert!(matches!(err, Error::Screen(_)));
    }
}
