#![forbid(unsafe_code)]

//! Key-driven forms engine.
//!
//! A [`FormSession`] is a state machine over an ordered list of fields. It
//! consumes decoded [`KeyEvent`]s and returns what should happen on screen as
//! a list of [`Effect`]s. Nothing here touches a channel: the caller applies
//! the effects to a [`Screen`] (see [`apply_effects`]) and writes the bytes.
//!
//! | Key | Effect on `Editing(i)` |
//! |-----|------------------------|
//! | printable | insert at the cursor if the field has room and accepts it |
//! | `Next` | validate field `i`, then focus the next enterable field (wraps) |
//! | `Previous` | focus the previous enterable field (wraps), no validation by default |
//! | `Home` | focus the first enterable field |
//! | `Correction` | delete the character before the cursor |
//! | `Cancel` | `Cancelled`, unconditionally |
//! | `Submit` | validate all fields; `Submitted`, or stay on the first failing one |
//! | `Help`, `Repeat` | forwarded to the caller |
//!
//! `Submitted` and `Cancelled` are final: further events are ignored.

pub mod menu;

use std::fmt;

use vtx_core::attr::{AttrFlags, Attributes};
use vtx_core::event::{FunctionKey, KeyEvent};
use vtx_core::geometry::{Geometry, GeometryError, Position, Size};
use vtx_render::{Screen, ScreenError};

pub use menu::{Menu, MenuError};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// What a field accepts and how it is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldKind {
    #[default]
    Text,
    /// Digits only.
    Numeric,
    /// Any printable character, displayed as `*`.
    Masked,
}

impl FieldKind {
    /// Whether `c` may be typed into a field of this kind.
    #[must_use]
    pub fn accepts(self, c: char) -> bool {
        match self {
            Self::Numeric => c.is_ascii_digit(),
            Self::Text | Self::Masked => !c.is_control(),
        }
    }

    fn display(self, c: char) -> char {
        match self {
            Self::Masked => '*',
            Self::Text | Self::Numeric => c,
        }
    }
}

/// One entry field, as supplied by the form definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    /// Screen position of the first character.
    pub pos: Position,
    /// Maximum number of characters.
    pub length: u8,
    pub kind: FieldKind,
    pub initial: String,
    pub required: bool,
    /// Displayed but never focused.
    pub read_only: bool,
}

impl FieldDef {
    #[must_use]
    pub fn new(name: impl Into<String>, pos: Position, length: u8) -> Self {
        Self {
            name: name.into(),
            pos,
            length,
            kind: FieldKind::Text,
            initial: String::new(),
            required: false,
            read_only: false,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn initial(mut self, value: impl Into<String>) -> Self {
        self.initial = value.into();
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Static text drawn with the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub pos: Position,
    pub text: String,
}

/// An already-parsed form: prompts plus fields in navigation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDefinition {
    pub prompts: Vec<Prompt>,
    pub fields: Vec<FieldDef>,
}

impl FormDefinition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prompt(mut self, pos: Position, text: impl Into<String>) -> Self {
        self.prompts.push(Prompt {
            pos,
            text: text.into(),
        });
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// Behaviour switches left to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormPolicy {
    /// Validate the focused field before moving back with `Previous`.
    pub validate_on_previous: bool,
    /// Character filling the unused part of a field.
    pub marker: char,
}

impl Default for FormPolicy {
    fn default() -> Self {
        Self {
            validate_on_previous: false,
            marker: '.',
        }
    }
}

/// Attributes used to draw fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormStyle {
    pub field: Attributes,
    /// Field that failed validation, until it is edited.
    pub invalid: Attributes,
}

impl Default for FormStyle {
    fn default() -> Self {
        Self {
            field: Attributes::default(),
            invalid: Attributes::default().with_flags(AttrFlags::INVERSE),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

/// Reasons a definition cannot start a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    NoFields,
    /// Every field is read-only.
    NoEnterableField,
    DuplicateName(String),
    FieldOutOfBounds { name: String, source: GeometryError },
    /// A field with no room for any character.
    InvalidLength { name: String },
    /// Initial value too long, or rejected by the field kind.
    InvalidInitial { name: String },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFields => f.write_str("form has no fields"),
            Self::NoEnterableField => f.write_str("form has no enterable field"),
            Self::DuplicateName(name) => write!(f, "duplicate field name {name:?}"),
            Self::FieldOutOfBounds { name, source } => {
                write!(f, "field {name:?} does not fit: {source}")
            }
            Self::InvalidLength { name } => write!(f, "field {name:?} has zero length"),
            Self::InvalidInitial { name } => write!(f, "invalid initial value for field {name:?}"),
        }
    }
}

impl std::error::Error for FormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FieldOutOfBounds { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Why a field did not validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationFailure {
    /// Required but empty.
    Missing,
    /// Content the field kind does not allow.
    Malformed,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("required field is empty"),
            Self::Malformed => f.write_str("malformed field content"),
        }
    }
}

/// Field values by name, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub values: Vec<(String, String)>,
}

impl FormData {
    /// Value of a field by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Submitted(FormData),
    Cancelled,
}

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormState {
    /// Focus on the field at this index.
    Editing(usize),
    Submitted,
    Cancelled,
}

impl FormState {
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::Editing(_))
    }
}

/// One observable consequence of a key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ClearScreen,
    Goto(Position),
    SetAttributes(Attributes),
    Write(String),
    CursorVisible(bool),
    Beep,
    /// A key the engine does not handle, for the caller.
    Forward(FunctionKey),
    /// The field at `field` failed validation and keeps the focus.
    Invalid {
        field: usize,
        failure: ValidationFailure,
    },
    Finished(FormOutcome),
}

/// Play `effects` on `screen`, in order. Non-display effects are skipped.
///
/// # Errors
///
/// Propagates [`ScreenError`] from attribute changes the current mode
/// cannot express.
pub fn apply_effects(effects: &[Effect], screen: &mut Screen) -> Result<(), ScreenError> {
    for effect in effects {
        match effect {
            Effect::ClearScreen => screen.clear_screen(),
            Effect::Goto(pos) => screen.move_cursor(pos.row, pos.col),
            Effect::SetAttributes(attrs) => screen.set_attributes(*attrs)?,
            Effect::Write(text) => screen.write_text(text),
            Effect::CursorVisible(visible) => screen.set_cursor_visible(*visible),
            Effect::Beep => screen.bell(),
            Effect::Forward(_) | Effect::Invalid { .. } | Effect::Finished(_) => {}
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Field {
    def: FieldDef,
    buffer: Vec<char>,
    cursor: usize,
    invalid: bool,
}

impl Field {
    fn new(def: FieldDef) -> Self {
        let buffer: Vec<char> = def.initial.chars().collect();
        let cursor = buffer.len();
        Self {
            def,
            buffer,
            cursor,
            invalid: false,
        }
    }

    fn enterable(&self) -> bool {
        !self.def.read_only
    }

    fn value(&self) -> String {
        self.buffer.iter().collect()
    }

    fn pos_at(&self, offset: usize) -> Position {
        self.def.pos.offset_col(offset as u8)
    }

    fn cursor_pos(&self) -> Position {
        self.pos_at(self.cursor)
    }

    /// Displayed content from `from` to the end of the field.
    fn display(&self, from: usize, marker: char) -> String {
        let fill = (self.def.length as usize).saturating_sub(self.buffer.len());
        self.buffer[from.min(self.buffer.len())..]
            .iter()
            .map(|&c| self.def.kind.display(c))
            .chain(std::iter::repeat_n(marker, fill))
            .collect()
    }

    fn validate(&self) -> Result<(), ValidationFailure> {
        if self.def.required && self.buffer.is_empty() {
            return Err(ValidationFailure::Missing);
        }
        if !self.buffer.iter().all(|&c| self.def.kind.accepts(c)) {
            return Err(ValidationFailure::Malformed);
        }
        Ok(())
    }
}

/// A running form.
#[derive(Debug, Clone)]
pub struct FormSession {
    prompts: Vec<Prompt>,
    fields: Vec<Field>,
    state: FormState,
    policy: FormPolicy,
    style: FormStyle,
}

impl FormSession {
    /// Start a session, focused on the first enterable field.
    ///
    /// # Errors
    ///
    /// [`FormError`] when the definition is empty, has no enterable field,
    /// repeats a name, has a zero-length field, places a field off screen,
    /// or carries an initial value its field cannot hold.
    pub fn new(
        definition: FormDefinition,
        geometry: Geometry,
        policy: FormPolicy,
        style: FormStyle,
    ) -> Result<Self, FormError> {
        let FormDefinition { prompts, fields } = definition;
        if fields.is_empty() {
            return Err(FormError::NoFields);
        }
        for (i, def) in fields.iter().enumerate() {
            if fields[..i].iter().any(|other| other.name == def.name) {
                return Err(FormError::DuplicateName(def.name.clone()));
            }
            if def.length == 0 {
                return Err(FormError::InvalidLength {
                    name: def.name.clone(),
                });
            }
            geometry
                .check_area(def.pos, Size::new(1, def.length))
                .map_err(|source| FormError::FieldOutOfBounds {
                    name: def.name.clone(),
                    source,
                })?;
            if def.initial.chars().count() > def.length as usize
                || !def.initial.chars().all(|c| def.kind.accepts(c))
            {
                return Err(FormError::InvalidInitial {
                    name: def.name.clone(),
                });
            }
        }
        let first = fields
            .iter()
            .position(|f| !f.read_only)
            .ok_or(FormError::NoEnterableField)?;

        Ok(Self {
            prompts,
            fields: fields.into_iter().map(Field::new).collect(),
            state: FormState::Editing(first),
            policy,
            style,
        })
    }

    #[must_use]
    pub fn state(&self) -> FormState {
        self.state
    }

    /// Index of the focused field while editing.
    #[must_use]
    pub fn focused(&self) -> Option<usize> {
        match self.state {
            FormState::Editing(i) => Some(i),
            _ => None,
        }
    }

    /// Current content of a field.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<String> {
        self.fields
            .iter()
            .find(|f| f.def.name == name)
            .map(Field::value)
    }

    /// All field values, in field order.
    #[must_use]
    pub fn data(&self) -> FormData {
        FormData {
            values: self
                .fields
                .iter()
                .map(|f| (f.def.name.clone(), f.value()))
                .collect(),
        }
    }

    /// Effects drawing the whole form: clear, prompts, fields, then the
    /// cursor on the focused field.
    #[must_use]
    pub fn render(&self) -> Vec<Effect> {
        let mut effects = vec![Effect::CursorVisible(false), Effect::ClearScreen];
        for prompt in &self.prompts {
            effects.push(Effect::Goto(prompt.pos));
            effects.push(Effect::SetAttributes(Attributes::default()));
            effects.push(Effect::Write(prompt.text.clone()));
        }
        for index in 0..self.fields.len() {
            self.draw_field(index, &mut effects);
        }
        if let FormState::Editing(i) = self.state {
            effects.push(Effect::Goto(self.fields[i].cursor_pos()));
            effects.push(Effect::CursorVisible(true));
        }
        effects
    }

    /// Feed one key event.
    pub fn handle(&mut self, key: KeyEvent) -> Vec<Effect> {
        let FormState::Editing(index) = self.state else {
            return Vec::new();
        };
        match key {
            KeyEvent::Char(c) => self.insert(index, c),
            KeyEvent::Function(FunctionKey::Next) => match self.fields[index].validate() {
                Ok(()) => self.focus(self.step(index, true)),
                Err(failure) => self.reject(index, failure),
            },
            KeyEvent::Function(FunctionKey::Previous) => {
                if self.policy.validate_on_previous
                    && let Err(failure) = self.fields[index].validate()
                {
                    return self.reject(index, failure);
                }
                self.focus(self.step(index, false))
            }
            KeyEvent::Function(FunctionKey::Home) => self.focus(self.first_enterable()),
            KeyEvent::Function(FunctionKey::Correction) => self.backspace(index),
            KeyEvent::Function(FunctionKey::Cancel) => {
                self.finish(FormState::Cancelled, FormOutcome::Cancelled)
            }
            KeyEvent::Function(FunctionKey::Submit) => self.submit(),
            KeyEvent::Function(key @ (FunctionKey::Help | FunctionKey::Repeat)) => {
                vec![Effect::Forward(key)]
            }
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    fn first_enterable(&self) -> usize {
        self.fields.iter().position(Field::enterable).unwrap_or(0)
    }

    /// Next (or previous) enterable field after `from`, wrapping around.
    fn step(&self, from: usize, forward: bool) -> usize {
        let n = self.fields.len();
        (1..=n)
            .map(|k| if forward { (from + k) % n } else { (from + n - k) % n })
            .find(|&i| self.fields[i].enterable())
            .unwrap_or(from)
    }

    fn focus(&mut self, index: usize) -> Vec<Effect> {
        self.state = FormState::Editing(index);
        vec![Effect::Goto(self.fields[index].cursor_pos())]
    }

    fn reject(&mut self, index: usize, failure: ValidationFailure) -> Vec<Effect> {
        #[cfg(feature = "tracing")]
        tracing::trace!(field = %self.fields[index].def.name, %failure, "validation failed");

        self.state = FormState::Editing(index);
        self.fields[index].invalid = true;
        let mut effects = vec![Effect::Beep, Effect::Invalid { field: index, failure }];
        self.draw_field(index, &mut effects);
        effects.push(Effect::Goto(self.fields[index].cursor_pos()));
        effects
    }

    fn submit(&mut self) -> Vec<Effect> {
        let failed = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.enterable())
            .find_map(|(i, f)| f.validate().err().map(|failure| (i, failure)));
        match failed {
            Some((index, failure)) => self.reject(index, failure),
            None => {
                let data = self.data();
                self.finish(FormState::Submitted, FormOutcome::Submitted(data))
            }
        }
    }

    fn finish(&mut self, state: FormState, outcome: FormOutcome) -> Vec<Effect> {
        self.state = state;
        vec![Effect::CursorVisible(false), Effect::Finished(outcome)]
    }

    fn insert(&mut self, index: usize, c: char) -> Vec<Effect> {
        let field = &mut self.fields[index];
        if !field.def.kind.accepts(c) || field.buffer.len() >= field.def.length as usize {
            return vec![Effect::Beep];
        }
        let at = field.cursor;
        field.buffer.insert(at, c);
        field.cursor += 1;

        if field.invalid {
            field.invalid = false;
            return self.redraw(index);
        }
        let field = &self.fields[index];
        let mut effects = vec![
            Effect::Goto(field.pos_at(at)),
            Effect::SetAttributes(self.style.field),
        ];
        if at + 1 == field.buffer.len() {
            effects.push(Effect::Write(field.def.kind.display(c).to_string()));
        } else {
            effects.push(Effect::Write(field.display(at, self.policy.marker)));
            effects.push(Effect::Goto(field.cursor_pos()));
        }
        effects
    }

    fn backspace(&mut self, index: usize) -> Vec<Effect> {
        let field = &mut self.fields[index];
        if field.cursor == 0 {
            return vec![Effect::Beep];
        }
        field.cursor -= 1;
        field.buffer.remove(field.cursor);

        if field.invalid {
            field.invalid = false;
            return self.redraw(index);
        }
        let field = &self.fields[index];
        vec![
            Effect::Goto(field.cursor_pos()),
            Effect::SetAttributes(self.style.field),
            Effect::Write(field.display(field.cursor, self.policy.marker)),
            Effect::Goto(field.cursor_pos()),
        ]
    }

    fn redraw(&self, index: usize) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(4);
        self.draw_field(index, &mut effects);
        effects.push(Effect::Goto(self.fields[index].cursor_pos()));
        effects
    }

    fn draw_field(&self, index: usize, effects: &mut Vec<Effect>) {
        let field = &self.fields[index];
        let attrs = if field.invalid {
            self.style.invalid
        } else {
            self.style.field
        };
        effects.push(Effect::Goto(field.def.pos));
        effects.push(Effect::SetAttributes(attrs));
        effects.push(Effect::Write(field.display(0, self.policy.marker)));
    }
}
