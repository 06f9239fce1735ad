#![forbid(unsafe_code)]

//! Session configuration.

use vtx_core::geometry::Geometry;
use vtx_core::keymap::KeyMap;
#[cfg(feature = "forms")]
use vtx_extras::forms::{FormPolicy, FormStyle};
#[cfg(feature = "image")]
use vtx_extras::image::Palette;

/// Default size of the channel read buffer.
const DEFAULT_READ_CHUNK: usize = 64;

/// Default number of reads waiting for an identification reply.
const DEFAULT_IDENTIFY_READS: usize = 8;

/// Everything a [`crate::Terminal`] needs to know about the device and the
/// application's policies.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Screen geometry.
    pub geometry: Geometry,
    /// Function-key byte codes.
    pub keymap: KeyMap,
    /// Colors shown by the device, for image conversion.
    #[cfg(feature = "image")]
    pub palette: Palette,
    #[cfg(feature = "forms")]
    pub form_policy: FormPolicy,
    #[cfg(feature = "forms")]
    pub form_style: FormStyle,
    /// Bytes requested per channel read.
    pub read_chunk: usize,
    /// Reads to wait for the identification reply before giving up.
    pub identify_reads: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            keymap: KeyMap::default(),
            #[cfg(feature = "image")]
            palette: Palette::default(),
            #[cfg(feature = "forms")]
            form_policy: FormPolicy::default(),
            #[cfg(feature = "forms")]
            form_style: FormStyle::default(),
            read_chunk: DEFAULT_READ_CHUNK,
            identify_reads: DEFAULT_IDENTIFY_READS,
        }
    }
}

impl TerminalConfig {
    /// Defaults with the geometry taken from `VTX_ROWS` / `VTX_COLUMNS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Same as [`TerminalConfig::from_env`] with a custom lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            geometry: Geometry::from_env_with(get_env),
            ..Self::default()
        }
    }

    /// Configuration for a monochrome device.
    #[cfg(feature = "image")]
    #[must_use]
    pub fn monochrome() -> Self {
        Self {
            palette: Palette::grayscale(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    #[must_use]
    pub fn with_keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    #[cfg(feature = "image")]
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    #[cfg(feature = "forms")]
    #[must_use]
    pub fn with_form_policy(mut self, policy: FormPolicy) -> Self {
        self.form_policy = policy;
        self
    }

    #[cfg(feature = "forms")]
    #[must_use]
    pub fn with_form_style(mut self, style: FormStyle) -> Self {
        self.form_style = style;
        self
    }

    /// Bytes requested per read. Zero is raised to one.
    #[must_use]
    pub fn with_read_chunk(mut self, bytes: usize) -> Self {
        self.read_chunk = bytes.max(1);
        self
    }

    #[must_use]
    pub fn with_identify_reads(mut self, reads: usize) -> Self {
        self.identify_reads = reads;
        self
    }
}
