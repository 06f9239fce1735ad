#![forbid(unsafe_code)]

//! Terminal identification from the ROM enquiry reply.
//!
//! The reply to `PRO1 ENQROM` is five bytes: `SOH maker model version EOT`.

use std::fmt;

/// Start of the identification reply.
pub const SOH: u8 = 0x01;
/// End of the identification reply.
pub const EOT: u8 = 0x04;
/// Length of the identification reply, delimiters included.
pub const ROM_REPLY_LEN: usize = 5;

/// Keyboard layout fitted to a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyboardKind {
    Abcd,
    Azerty,
    None,
}

/// Technical specifications of a terminal model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelSpecs {
    pub name: &'static str,
    /// Whether the screen and keyboard can be swapped to peripheral mode.
    pub can_swap: bool,
    pub keyboard: KeyboardKind,
    /// Highest supported link speed, in baud.
    pub max_baud: u32,
    /// Whether an 80-column mode is available.
    pub w80: bool,
    /// Whether the G'0 redefinable character set is available.
    pub drcs: bool,
}

const fn specs(
    name: &'static str,
    can_swap: bool,
    keyboard: KeyboardKind,
    max_baud: u32,
    w80: bool,
    drcs: bool,
) -> ModelSpecs {
    ModelSpecs {
        name,
        can_swap,
        keyboard,
        max_baud,
        w80,
        drcs,
    }
}

const UNKNOWN_MODEL: ModelSpecs = specs("Unknown model", false, KeyboardKind::Abcd, 1200, false, false);

fn model_specs(code: u8) -> ModelSpecs {
    use KeyboardKind::{Abcd, Azerty, None};
    match code {
        b'b' => specs("Minitel 1", false, Abcd, 1200, false, false),
        b'c' => specs("Minitel 1", false, Azerty, 1200, false, false),
        b'd' => specs("Minitel 10", false, Azerty, 1200, false, false),
        b'e' => specs("Minitel 1 Color", false, Azerty, 1200, false, false),
        b'f' => specs("Minitel 10", true, Azerty, 1200, false, false),
        b'g' => specs("Emul", true, Azerty, 9600, true, true),
        b'j' => specs("Printer", false, None, 1200, false, false),
        b'r' => specs("Minitel 1", true, Azerty, 1200, false, false),
        b's' => specs("Minitel 1 Color", true, Azerty, 1200, false, false),
        b't' => specs("Terminatel 252", false, None, 1200, false, false),
        b'u' => specs("Minitel 1B", true, Azerty, 4800, true, false),
        b'v' => specs("Minitel 2", true, Azerty, 9600, true, true),
        b'w' => specs("Minitel 10B", true, Azerty, 4800, true, false),
        b'y' => specs("Minitel 5", true, Azerty, 9600, true, true),
        b'z' => specs("Minitel 12", true, Azerty, 9600, true, true),
        _ => UNKNOWN_MODEL,
    }
}

fn maker_name(code: u8, model: u8, version: u8) -> &'static str {
    // Known ROM quirks: Philips units report RTIC, late Telic units report Telic-Alcatel.
    match code {
        b'B' if model == b'v' => "Philips",
        b'C' if matches!(version, b'4' | b'5' | b';' | b'<') => "Telic-Matra",
        b'A' => "Matra",
        b'B' => "RTIC",
        b'C' => "Telic-Alcatel",
        b'D' => "Thomson",
        b'E' => "CCS",
        b'F' => "Fiet",
        b'G' => "Fime",
        b'H' => "Unitel",
        b'I' => "Option",
        b'J' => "Bull",
        b'K' => "Télématique",
        b'L' => "Desmet",
        b'p' => "Philips",
        _ => "Unknown maker",
    }
}

/// Decoded identification of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceSpecs {
    pub maker: &'static str,
    pub model: ModelSpecs,
    /// Raw version byte.
    pub version: u8,
    /// Raw codes, as stored in ROM.
    pub raw: [u8; 3],
}

impl DeviceSpecs {
    /// Decode the three payload bytes of the ROM reply.
    #[must_use]
    pub fn from_rom(maker: u8, model: u8, version: u8) -> Self {
        Self {
            maker: maker_name(maker, model, version),
            model: model_specs(model),
            version,
            raw: [maker, model, version],
        }
    }

    /// Decode a full reply including delimiters.
    #[must_use]
    pub fn parse(reply: &[u8]) -> Option<Self> {
        match reply {
            [SOH, maker, model, version, EOT] => Some(Self::from_rom(*maker, *model, *version)),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceSpecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (version {})",
            self.maker,
            self.model.name,
            self.version as char
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minitel_2() {
        let specs = DeviceSpecs::parse(&[SOH, b'C', b'v', b'2', EOT]).unwrap();
        assert_eq!(specs.maker, "Telic-Alcatel");
        assert_eq!(specs.model.name, "Minitel 2");
        assert_eq!(specs.model.max_baud, 9600);
        assert!(specs.model.w80);
    }

    #[test]
    fn maker_quirks() {
        assert_eq!(DeviceSpecs::from_rom(b'B', b'v', b'1').maker, "Philips");
        assert_eq!(DeviceSpecs::from_rom(b'B', b'u', b'1').maker, "RTIC");
        assert_eq!(DeviceSpecs::from_rom(b'C', b'v', b';').maker, "Telic-Matra");
    }

    #[test]
    fn unknown_codes_fall_back() {
        let specs = DeviceSpecs::from_rom(b'#', b'#', b'0');
        assert_eq!(specs.maker, "Unknown maker");
        assert_eq!(specs.model, UNKNOWN_MODEL);
    }

    #[test]
    fn rejects_malformed_reply() {
        assert!(DeviceSpecs::parse(&[SOH, b'C', b'v', b'2']).is_none());
        assert!(DeviceSpecs::parse(&[0x02, b'C', b'v', b'2', EOT]).is_none());
    }
}
