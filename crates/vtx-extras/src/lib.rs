//! Optional feature-gated extensions for videotex terminals.
//!
//! Each module is behind a Cargo feature flag and can be enabled
//! independently. Both build on the state-tracked [`vtx_render::Screen`].
//!
//! # Available Features
//!
//! | Feature | Module | Description |
//! |---------|--------|-------------|
//! | `image` | [`image`] | Raster images to semi-graphic cells |
//! | `forms` | [`forms`] | Key-driven forms engine and menus |
//! | `tracing` | - | Structured logging in this crate and below |

#![forbid(unsafe_code)]

#[cfg(feature = "forms")]
pub mod forms;

#[cfg(feature = "image")]
pub mod image;
