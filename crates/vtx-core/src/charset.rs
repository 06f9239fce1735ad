#![forbid(unsafe_code)]

//! G2 supplementary set: accented letters and a handful of symbols.
//!
//! The G2 set is reached through `SS2` (0x19). Diacritics are non-spacing:
//! `SS2 <diacritic> <letter>` produces one accented character. Symbols are
//! spacing: `SS2 <code>` produces the symbol directly.

/// Single shift to the G2 set.
pub const SS2: u8 = 0x19;

/// Replacement written for characters the terminal cannot display.
pub const SUBSTITUTE: u8 = b'?';

const GRAVE: u8 = 0x41;
const ACUTE: u8 = 0x42;
const CIRCUMFLEX: u8 = 0x43;
const DIAERESIS: u8 = 0x48;
const CEDILLA: u8 = 0x4B;

/// (accented char, diacritic code, base letter)
const ACCENTED: &[(char, u8, u8)] = &[
    ('à', GRAVE, b'a'),
    ('è', GRAVE, b'e'),
    ('ù', GRAVE, b'u'),
    ('á', ACUTE, b'a'),
    ('é', ACUTE, b'e'),
    ('í', ACUTE, b'i'),
    ('ó', ACUTE, b'o'),
    ('ú', ACUTE, b'u'),
    ('â', CIRCUMFLEX, b'a'),
    ('ê', CIRCUMFLEX, b'e'),
    ('î', CIRCUMFLEX, b'i'),
    ('ô', CIRCUMFLEX, b'o'),
    ('û', CIRCUMFLEX, b'u'),
    ('ä', DIAERESIS, b'a'),
    ('ë', DIAERESIS, b'e'),
    ('ï', DIAERESIS, b'i'),
    ('ö', DIAERESIS, b'o'),
    ('ü', DIAERESIS, b'u'),
    ('ç', CEDILLA, b'c'),
];

/// (symbol, G2 code)
const SYMBOLS: &[(char, u8)] = &[
    ('£', 0x23),
    ('§', 0x27),
    ('←', 0x2C),
    ('↑', 0x2D),
    ('→', 0x2E),
    ('↓', 0x2F),
    ('°', 0x30),
    ('±', 0x31),
    ('÷', 0x38),
    ('¼', 0x3C),
    ('½', 0x3D),
    ('¾', 0x3E),
    ('Œ', 0x6A),
    ('œ', 0x7A),
    ('ß', 0x7B),
];

/// Is `code` a non-spacing diacritic that expects a base letter?
#[inline]
#[must_use]
pub fn is_diacritic(code: u8) -> bool {
    matches!(code, GRAVE | ACUTE | CIRCUMFLEX | DIAERESIS | CEDILLA)
}

/// Append the byte encoding of `c` to `out`.
///
/// Printable ASCII is written as is, G2 characters through `SS2`, and
/// anything else as [`SUBSTITUTE`].
pub fn encode_char(c: char, out: &mut Vec<u8>) {
    if (' '..='~').contains(&c) {
        out.push(c as u8);
        return;
    }
    if let Some(&(_, diacritic, base)) = ACCENTED.iter().find(|(ch, _, _)| *ch == c) {
        out.extend_from_slice(&[SS2, diacritic, base]);
        return;
    }
    if let Some(&(_, code)) = SYMBOLS.iter().find(|(ch, _)| *ch == c) {
        out.extend_from_slice(&[SS2, code]);
        return;
    }
    out.push(SUBSTITUTE);
}

/// Decode a spacing G2 code.
#[must_use]
pub fn decode_symbol(code: u8) -> Option<char> {
    SYMBOLS.iter().find(|(_, c)| *c == code).map(|(ch, _)| *ch)
}

/// Decode a diacritic applied to a base letter.
///
/// Unknown combinations fall back to the bare letter, which is what the
/// terminal displays.
#[must_use]
pub fn decode_accented(diacritic: u8, base: u8) -> Option<char> {
    if !(0x20..0x7F).contains(&base) {
        return None;
    }
    let accented = ACCENTED
        .iter()
        .find(|(_, d, b)| *d == diacritic && *b == base)
        .map(|(ch, _, _)| *ch);
    Some(accented.unwrap_or(base as char))
}
