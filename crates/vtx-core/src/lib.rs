#![forbid(unsafe_code)]

//! Core: videotex protocol vocabulary, codec, and input decoding.

pub mod attr;
pub mod charset;
pub mod command;
pub mod decoder;
pub mod event;
pub mod geometry;
pub mod identification;
pub mod keymap;
pub mod logging;
pub mod protocol;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, trace_span, warn};

pub use attr::{AttrFlags, Attributes, CharSize, Color, DisplayMode};
pub use command::{AttributeChange, Command, Part};
pub use decoder::{Decoder, Residual, decode};
pub use event::{Event, FunctionKey, KeyEvent, UnknownSequence};
pub use geometry::{Geometry, GeometryError, Position, Size};
pub use identification::DeviceSpecs;
pub use keymap::{KeyCode, KeyMap};
pub use protocol::{LinkSpeed, ProtocolCommand};
