//! Decoder behaviour on realistic terminal streams.

use vtx_core::command::Command;
use vtx_core::decoder::Decoder;
use vtx_core::event::{Event, FunctionKey, KeyEvent};
use vtx_core::geometry::Position;
use vtx_core::protocol::{FunctionalStatus, LinkSpeed, ProtocolCommand};

fn chars(s: &str) -> Vec<Event> {
    s.chars().map(|c| Event::Key(KeyEvent::Char(c))).collect()
}

fn key(k: FunctionKey) -> Event {
    Event::Key(KeyEvent::Function(k))
}

#[test]
fn typing_with_function_keys_in_fragments() {
    let stream = b"Jean\x13\x48Dupont\x13\x41";
    let mut decoder = Decoder::default();
    let mut events = Vec::new();
    for chunk in stream.chunks(3) {
        events.extend(decoder.decode(chunk));
    }

    let mut expected = chars("Jean");
    expected.push(key(FunctionKey::Next));
    expected.extend(chars("Dupont"));
    expected.push(key(FunctionKey::Submit));
    assert_eq!(events, expected);
}

#[test]
fn truncated_address_then_function_key_yields_only_the_key() {
    let mut decoder = Decoder::default();
    assert!(decoder.decode(&[0x1F, 0x43]).is_empty());
    assert_eq!(decoder.decode(&[0x13, 0x45]), vec![key(FunctionKey::Cancel)]);
    assert!(decoder.residual().is_empty());
}

#[test]
fn echo_noise_inside_protocol_reply() {
    // A speed status reply interrupted by a key press, then replayed.
    let mut decoder = Decoder::default();
    let events = decoder.decode(&[0x1B, 0x3A, 0x75, 0x13, 0x46, 0x1B, 0x3A, 0x75, 0x64]);
    assert_eq!(
        events,
        vec![
            key(FunctionKey::Home),
            Event::Command(Command::Protocol(ProtocolCommand::Pro2(0x75, 0x64))),
        ]
    );
    assert_eq!(
        LinkSpeed::from_status(0x64),
        (Some(LinkSpeed::B1200), Some(LinkSpeed::B1200))
    );
}

#[test]
fn position_reply() {
    let mut decoder = Decoder::default();
    decoder.decode(&[0x1B, 0x61]);
    assert_eq!(
        decoder.decode(&[0x1F, 0x4C, 0x55]),
        vec![Event::Command(Command::MoveTo(Position::new(12, 21)))]
    );
}

#[test]
fn functional_status_payload() {
    let status = FunctionalStatus::from_byte(0x40);
    assert_eq!(status.width, 40);
    assert!(status.caps_lock);
    assert!(!status.roll);
}

#[test]
fn identification_split_over_reads() {
    let mut decoder = Decoder::default();
    assert!(decoder.decode(&[0x01, b'B']).is_empty());
    assert!(decoder.decode(&[b'v', b'3']).is_empty());
    match decoder.decode(&[0x04]).as_slice() {
        [Event::Identification(specs)] => {
            assert_eq!(specs.maker, "Philips");
            assert_eq!(specs.model.name, "Minitel 2");
        }
        other => panic!("expected identification, got {other:?}"),
    }
}
