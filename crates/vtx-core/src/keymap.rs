#![forbid(unsafe_code)]

//! Function-key byte codes.
//!
//! Function keys are data, not constants: a [`KeyMap`] binds each
//! [`FunctionKey`] to the bytes the terminal sends for it. The default map
//! holds the standard `SEP x` codes. Single control bytes may also be bound,
//! for terminals or emulators that report keys that way; such bindings take
//! precedence over the byte's usual meaning when decoding.
//!
//! # Example
//!
//! ```
//! use vtx_core::event::FunctionKey;
//! use vtx_core::keymap::{KeyCode, KeyMap};
//!
//! let mut map = KeyMap::default();
//! map.bind(FunctionKey::Submit, KeyCode::Single(0x0D));
//! assert_eq!(map.lookup_single(0x0D), Some(FunctionKey::Submit));
//! assert_eq!(map.encode(FunctionKey::Submit), vec![0x0D]);
//! ```

use crate::command::SEP;
use crate::event::FunctionKey;

/// The byte code of one function key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// `SEP` followed by this byte.
    Sep(u8),
    /// A single control byte.
    Single(u8),
}

impl KeyCode {
    /// Append the bytes of this code to `out`.
    pub fn encode(self, out: &mut Vec<u8>) {
        match self {
            Self::Sep(b) => out.extend_from_slice(&[SEP, b]),
            Self::Single(b) => out.push(b),
        }
    }
}

/// Bindings from function keys to byte codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    bindings: Vec<(FunctionKey, KeyCode)>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::standard()
    }
}

impl KeyMap {
    /// The standard `SEP`-prefixed codes.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bindings: vec![
                (FunctionKey::Submit, KeyCode::Sep(0x41)),
                (FunctionKey::Previous, KeyCode::Sep(0x42)),
                (FunctionKey::Repeat, KeyCode::Sep(0x43)),
                (FunctionKey::Help, KeyCode::Sep(0x44)),
                (FunctionKey::Cancel, KeyCode::Sep(0x45)),
                (FunctionKey::Home, KeyCode::Sep(0x46)),
                (FunctionKey::Correction, KeyCode::Sep(0x47)),
                (FunctionKey::Next, KeyCode::Sep(0x48)),
            ],
        }
    }

    /// A map with no bindings.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Bind `key` to `code`, replacing any previous code for `key` and any
    /// other key previously bound to `code`.
    pub fn bind(&mut self, key: FunctionKey, code: KeyCode) {
        self.bindings.retain(|(k, c)| *k != key && *c != code);
        self.bindings.push((key, code));
    }

    /// Builder form of [`KeyMap::bind`].
    #[must_use]
    pub fn with(mut self, key: FunctionKey, code: KeyCode) -> Self {
        self.bind(key, code);
        self
    }

    /// Remove the binding of `key`.
    pub fn unbind(&mut self, key: FunctionKey) {
        self.bindings.retain(|(k, _)| *k != key);
    }

    /// Code bound to `key`.
    #[must_use]
    pub fn code(&self, key: FunctionKey) -> Option<KeyCode> {
        self.bindings
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, c)| *c)
    }

    /// Key sent as `SEP byte`.
    #[must_use]
    pub fn lookup_sep(&self, byte: u8) -> Option<FunctionKey> {
        self.lookup(KeyCode::Sep(byte))
    }

    /// Key sent as a single byte.
    #[must_use]
    pub fn lookup_single(&self, byte: u8) -> Option<FunctionKey> {
        self.lookup(KeyCode::Single(byte))
    }

    fn lookup(&self, code: KeyCode) -> Option<FunctionKey> {
        self.bindings
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(k, _)| *k)
    }

    /// Bytes the terminal sends for `key`; empty when unbound.
    #[must_use]
    pub fn encode(&self, key: FunctionKey) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some(code) = self.code(key) {
            code.encode(&mut out);
        }
        out
    }
}
