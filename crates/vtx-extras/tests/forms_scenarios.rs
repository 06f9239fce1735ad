//! Forms engine scenarios, driven key by key.

use vtx_core::decoder::Decoder;
use vtx_core::event::{Event, FunctionKey, KeyEvent};
use vtx_core::geometry::{Geometry, Position};
use vtx_extras::forms::{
    Effect, FieldDef, FieldKind, FormDefinition, FormOutcome, FormPolicy, FormSession, FormState,
    FormStyle, ValidationFailure, apply_effects,
};
use vtx_render::Screen;

fn start(def: FormDefinition) -> FormSession {
    FormSession::new(
        def,
        Geometry::default(),
        FormPolicy::default(),
        FormStyle::default(),
    )
    .unwrap()
}

fn key(k: FunctionKey) -> KeyEvent {
    KeyEvent::Function(k)
}

fn three_fields() -> FormDefinition {
    FormDefinition::new()
        .field(FieldDef::new("a", Position::new(2, 10), 5))
        .field(FieldDef::new("b", Position::new(4, 10), 5))
        .field(FieldDef::new("c", Position::new(6, 10), 5))
}

fn type_text(form: &mut FormSession, text: &str) {
    for c in text.chars() {
        form.handle(KeyEvent::Char(c));
    }
}

#[test]
fn next_wraps_from_last_field_to_first() {
    let mut form = start(three_fields());
    form.handle(key(FunctionKey::Next));
    form.handle(key(FunctionKey::Next));
    assert_eq!(form.state(), FormState::Editing(2));

    let effects = form.handle(key(FunctionKey::Next));
    assert_eq!(form.state(), FormState::Editing(0));
    assert_eq!(effects, vec![Effect::Goto(Position::new(2, 10))]);
}

#[test]
fn previous_wraps_from_first_field_to_last() {
    let mut form = start(three_fields());
    form.handle(key(FunctionKey::Previous));
    assert_eq!(form.state(), FormState::Editing(2));
}

#[test]
fn navigation_skips_read_only_fields() {
    let def = FormDefinition::new()
        .field(FieldDef::new("a", Position::new(2, 10), 5))
        .field(FieldDef::new("id", Position::new(3, 10), 5).initial("42").read_only())
        .field(FieldDef::new("c", Position::new(4, 10), 5));
    let mut form = start(def);
    form.handle(key(FunctionKey::Next));
    assert_eq!(form.state(), FormState::Editing(2));
    form.handle(key(FunctionKey::Previous));
    assert_eq!(form.state(), FormState::Editing(0));
}

#[test]
fn submit_blocked_by_required_field() {
    let def = FormDefinition::new()
        .field(FieldDef::new("name", Position::new(2, 10), 10).required())
        .field(FieldDef::new("city", Position::new(4, 10), 10));
    let mut form = start(def);

    // Fill the optional field, leave the required one empty.
    form.handle(key(FunctionKey::Previous));
    type_text(&mut form, "Lyon");
    let effects = form.handle(key(FunctionKey::Submit));
    assert_eq!(form.state(), FormState::Editing(0));
    assert!(effects.contains(&Effect::Invalid {
        field: 0,
        failure: ValidationFailure::Missing,
    }));
    assert!(effects.contains(&Effect::Beep));

    type_text(&mut form, "Ada");
    let effects = form.handle(key(FunctionKey::Submit));
    assert_eq!(form.state(), FormState::Submitted);
    let Some(Effect::Finished(FormOutcome::Submitted(data))) = effects.last() else {
        panic!("expected submission, got {effects:?}");
    };
    assert_eq!(data.get("name"), Some("Ada"));
    assert_eq!(data.get("city"), Some("Lyon"));
}

#[test]
fn submit_stops_on_lowest_failing_field() {
    let def = FormDefinition::new()
        .field(FieldDef::new("a", Position::new(2, 10), 5))
        .field(FieldDef::new("b", Position::new(4, 10), 5).required())
        .field(FieldDef::new("c", Position::new(6, 10), 5).required());
    let mut form = start(def);
    form.handle(key(FunctionKey::Submit));
    assert_eq!(form.state(), FormState::Editing(1));
}

#[test]
fn cancel_skips_validation() {
    let def = FormDefinition::new()
        .field(FieldDef::new("name", Position::new(2, 10), 10).required());
    let mut form = start(def);
    let effects = form.handle(key(FunctionKey::Cancel));
    assert_eq!(form.state(), FormState::Cancelled);
    assert_eq!(effects.last(), Some(&Effect::Finished(FormOutcome::Cancelled)));
    assert!(!effects.iter().any(|e| matches!(e, Effect::Invalid { .. })));
}

#[test]
fn home_focuses_first_field_without_validation() {
    let def = FormDefinition::new()
        .field(FieldDef::new("a", Position::new(2, 10), 5))
        .field(FieldDef::new("b", Position::new(4, 10), 5).required());
    let mut form = start(def);
    form.handle(key(FunctionKey::Next));
    assert_eq!(form.state(), FormState::Editing(1));
    form.handle(key(FunctionKey::Home));
    assert_eq!(form.state(), FormState::Editing(0));
}

#[test]
fn correction_deletes_before_cursor() {
    let mut form = start(three_fields());
    type_text(&mut form, "abcd");
    form.handle(key(FunctionKey::Correction));
    form.handle(key(FunctionKey::Correction));
    type_text(&mut form, "z");
    assert_eq!(form.value("a").as_deref(), Some("abz"));
}

#[test]
fn focus_returns_to_end_of_content() {
    let mut form = start(three_fields());
    type_text(&mut form, "xy");
    form.handle(key(FunctionKey::Next));
    let effects = form.handle(key(FunctionKey::Previous));
    assert_eq!(effects, vec![Effect::Goto(Position::new(2, 12))]);
}

#[test]
fn numeric_initial_value_is_kept() {
    let def = FormDefinition::new().field(
        FieldDef::new("qty", Position::new(2, 10), 3)
            .kind(FieldKind::Numeric)
            .initial("12"),
    );
    let mut form = start(def);
    type_text(&mut form, "3");
    assert_eq!(form.value("qty").as_deref(), Some("123"));
}

#[test]
fn session_bytes_decode_cleanly() {
    let mut form = start(three_fields());
    let mut screen = Screen::default();
    apply_effects(&form.render(), &mut screen).unwrap();
    for c in "hello".chars() {
        apply_effects(&form.handle(KeyEvent::Char(c)), &mut screen).unwrap();
    }
    apply_effects(&form.handle(key(FunctionKey::Submit)), &mut screen).unwrap();

    let events = Decoder::default().decode(&screen.take_output());
    assert!(events.iter().all(|e| !matches!(e, Event::Unknown(_))));
    assert_eq!(form.state(), FormState::Submitted);
}

#[test]
fn typing_is_incremental_on_the_wire() {
    let mut form = start(three_fields());
    let mut screen = Screen::default();
    apply_effects(&form.render(), &mut screen).unwrap();
    screen.take_output();

    apply_effects(&form.handle(KeyEvent::Char('Q')), &mut screen).unwrap();
    assert_eq!(screen.take_output(), b"Q".to_vec());
}
