//! Property-based invariant tests for the sequence codec.
//!
//! These tests verify properties that must hold for any command value or
//! byte stream:
//!
//! 1. Round-trip: decoding an encoded command yields that command.
//! 2. Text round-trips as one key event per character.
//! 3. Mosaic cells round-trip after a switch to graphic mode.
//! 4. Split invariance: chunking the input never changes the events.
//! 5. The residual stays within its fixed size.
//! 6. A function key always survives a truncated sequence before it.
//! 7. No panics on arbitrary input.

use proptest::prelude::*;
use vtx_core::attr::{CharSize, Color, DisplayMode};
use vtx_core::command::{AttributeChange, Command, Part, encode_all};
use vtx_core::decoder::{Decoder, Residual, decode};
use vtx_core::event::{Event, FunctionKey, KeyEvent, MAX_SEQUENCE_LEN};
use vtx_core::geometry::Position;
use vtx_core::keymap::KeyMap;
use vtx_core::protocol::ProtocolCommand;

// ── Helpers ─────────────────────────────────────────────────────────────

fn color() -> impl Strategy<Value = Color> {
    (0u8..8).prop_map(Color::from_index)
}

fn size() -> impl Strategy<Value = CharSize> {
    prop_oneof![
        Just(CharSize::Normal),
        Just(CharSize::DoubleHeight),
        Just(CharSize::DoubleWidth),
        Just(CharSize::DoubleSize),
    ]
}

fn attribute() -> impl Strategy<Value = AttributeChange> {
    prop_oneof![
        color().prop_map(AttributeChange::Foreground),
        color().prop_map(AttributeChange::Background),
        any::<bool>().prop_map(AttributeChange::Blink),
        any::<bool>().prop_map(AttributeChange::Inverse),
        any::<bool>().prop_map(AttributeChange::Underline),
        size().prop_map(AttributeChange::Size),
    ]
}

fn part() -> impl Strategy<Value = Part> {
    prop_oneof![Just(Part::End), Just(Part::Begin), Just(Part::All)]
}

fn arg() -> impl Strategy<Value = u8> {
    0x20u8..=0x7F
}

fn protocol() -> impl Strategy<Value = ProtocolCommand> {
    prop_oneof![
        arg().prop_map(ProtocolCommand::Pro1),
        (arg(), arg())
            .prop_filter("mixed-mode switches decode as mode commands", |(a, b)| {
                !(*a == 0x32 && (*b == 0x7D || *b == 0x7E))
            })
            .prop_map(|(a, b)| ProtocolCommand::Pro2(a, b)),
        (arg(), arg(), arg()).prop_map(|(a, b, c)| ProtocolCommand::Pro3(a, b, c)),
    ]
}

fn cursor_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        (0u8..64, 0u8..64).prop_map(|(r, c)| Command::MoveTo(Position::new(r, c))),
        Just(Command::CursorLeft),
        Just(Command::CursorRight),
        Just(Command::CursorDown),
        Just(Command::CursorUp),
        Just(Command::CarriageReturn),
        Just(Command::CursorHome),
        any::<bool>().prop_map(Command::CursorVisible),
        Just(Command::RequestPosition),
    ]
}

/// Every command except text and cells, with arguments in protocol range.
fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        prop_oneof![
            Just(DisplayMode::Text),
            Just(DisplayMode::Mixed),
            Just(DisplayMode::Graphic)
        ]
        .prop_map(Command::SetMode),
        Just(Command::ExitMixed),
        cursor_command(),
        attribute().prop_map(Command::Attribute),
        Just(Command::ClearScreen),
        Just(Command::ClearToEndOfLine),
        part().prop_map(Command::ClearScreenPart),
        part().prop_map(Command::ClearLinePart),
        Just(Command::Bell),
        (0u8..64).prop_map(Command::Repeat),
        protocol().prop_map(Command::Protocol),
    ]
}

fn encodable_char() -> impl Strategy<Value = char> {
    prop_oneof![
        (0x20u8..=0x7E).prop_map(char::from),
        prop::sample::select(vec!['é', 'è', 'à', 'ç', 'ô', 'ü', '£', '°', '½', 'ß']),
    ]
}

fn decode_once(bytes: &[u8]) -> Vec<Event> {
    Decoder::default().decode(bytes)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Command round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn command_roundtrip(cmd in command()) {
        let events = decode_once(&cmd.to_bytes());
        prop_assert_eq!(events, vec![Event::Command(cmd)]);
    }

    #[test]
    fn command_sequence_roundtrip(cmds in prop::collection::vec(command(), 0..32)) {
        let events = decode_once(&encode_all(&cmds));
        let expected: Vec<Event> = cmds.into_iter().map(Event::Command).collect();
        prop_assert_eq!(events, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Text round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn text_roundtrip(chars in prop::collection::vec(encodable_char(), 0..40)) {
        let text: String = chars.iter().collect();
        let events = decode_once(&Command::Text(text).to_bytes());
        let expected: Vec<Event> = chars.into_iter().map(|c| Event::Key(KeyEvent::Char(c))).collect();
        prop_assert_eq!(events, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Mosaic cells
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn cell_roundtrip(pattern in 0u8..64) {
        let byte = 0x20 | (pattern & 0x1F) | ((pattern & 0x20) << 1);
        let cmds = [Command::SetMode(DisplayMode::Graphic), Command::Cell(byte)];
        let events = decode_once(&encode_all(&cmds));
        prop_assert_eq!(events, vec![Event::Command(cmds[0].clone()), Event::Command(cmds[1].clone())]);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4-5. Split invariance and bounded residual
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn split_invariance(bytes in prop::collection::vec(any::<u8>(), 0..128), split in any::<prop::sample::Index>()) {
        let at = split.index(bytes.len() + 1);
        let whole = decode_once(&bytes);

        let keymap = KeyMap::default();
        let mut residual = Residual::new();
        let mut parts = decode(&bytes[..at], &mut residual, &keymap);
        parts.extend(decode(&bytes[at..], &mut residual, &keymap));

        prop_assert_eq!(whole, parts);
    }

    #[test]
    fn byte_at_a_time_matches(cmds in prop::collection::vec(command(), 0..16)) {
        let bytes = encode_all(&cmds);
        let mut decoder = Decoder::default();
        let mut events = Vec::new();
        for b in &bytes {
            events.extend(decoder.decode(std::slice::from_ref(b)));
            prop_assert!(decoder.residual().pending().len() <= MAX_SEQUENCE_LEN);
        }
        prop_assert_eq!(events, decode_once(&bytes));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Resynchronisation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn key_survives_truncation(cmd in command(), cut in 1usize..5, key in prop::sample::select(FunctionKey::ALL.to_vec())) {
        let bytes = cmd.to_bytes();
        prop_assume!(bytes.len() > 1);
        let cut = cut.min(bytes.len() - 1);

        let keymap = KeyMap::default();
        let mut input = bytes[..cut].to_vec();
        input.extend(keymap.encode(key));

        let events = decode_once(&input);
        prop_assert_eq!(events.last(), Some(&Event::Key(KeyEvent::Function(key))));
        prop_assert!(events.iter().all(|e| !matches!(e, Event::Unknown(_))));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. No panics
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn arbitrary_input_never_panics(chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..32), 0..16)) {
        let mut decoder = Decoder::default();
        for chunk in &chunks {
            let _ = decoder.decode(chunk);
        }
        prop_assert!(decoder.residual().pending().len() <= MAX_SEQUENCE_LEN);
    }
}
