#![forbid(unsafe_code)]

//! Numbered-choice menus built on the forms engine.
//!
//! ```text
//!              Main menu
//!
//!           1 - Weather
//!           2 - News
//!
//!     Your choice [1..2] : . + ENVOI
//! ```

use std::fmt;

use vtx_core::geometry::{Geometry, Position};

use super::{
    FieldDef, FieldKind, FormData, FormDefinition, FormError, FormPolicy, FormSession, FormStyle,
};

/// Name of the single entry field.
pub const CHOICE_FIELD: &str = "choice";

const MAX_CHOICES: usize = 99;

/// Errors raised when building a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuError {
    /// A menu needs at least two choices.
    TooFewChoices(usize),
    /// Choices are typed as at most two digits.
    TooManyChoices(usize),
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewChoices(n) => write!(f, "menu needs at least 2 choices, got {n}"),
            Self::TooManyChoices(n) => {
                write!(f, "menu holds at most {MAX_CHOICES} choices, got {n}")
            }
        }
    }
}

impl std::error::Error for MenuError {}

/// A centered title, numbered choices, and a numeric entry field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    title: Vec<String>,
    choices: Vec<String>,
    prompt: String,
    line_skip: u8,
    margin_top: u8,
    prompt_row: Option<u8>,
}

impl Menu {
    /// # Errors
    ///
    /// [`MenuError`] unless there are between 2 and 99 choices.
    pub fn new<I, S>(title: impl Into<String>, choices: I) -> Result<Self, MenuError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        if choices.len() < 2 {
            return Err(MenuError::TooFewChoices(choices.len()));
        }
        if choices.len() > MAX_CHOICES {
            return Err(MenuError::TooManyChoices(choices.len()));
        }
        Ok(Self {
            title: vec![title.into()],
            choices,
            prompt: "Your choice".to_string(),
            line_skip: 0,
            margin_top: 0,
            prompt_row: None,
        })
    }

    /// Add a title line below the existing ones.
    #[must_use]
    pub fn title_line(mut self, line: impl Into<String>) -> Self {
        self.title.push(line.into());
        self
    }

    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Blank rows between two choices.
    #[must_use]
    pub fn line_skip(mut self, rows: u8) -> Self {
        self.line_skip = rows;
        self
    }

    /// Blank rows above the title.
    #[must_use]
    pub fn margin_top(mut self, rows: u8) -> Self {
        self.margin_top = rows;
        self
    }

    /// Put the entry prompt on a fixed row instead of below the choices.
    #[must_use]
    pub fn prompt_row(mut self, row: u8) -> Self {
        self.prompt_row = Some(row);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Lay the menu out for `geometry`.
    #[must_use]
    pub fn definition(&self, geometry: Geometry) -> FormDefinition {
        let width = geometry.columns();
        let centered = |len: usize| {
            let len = len.min(width as usize) as u8;
            (width - len) / 2 + 1
        };

        let mut def = FormDefinition::new();
        let mut row = self.margin_top.saturating_add(1);
        for line in &self.title {
            def = def.prompt(Position::new(row, centered(line.chars().count())), line.clone());
            row = row.saturating_add(1);
        }

        let lines: Vec<String> = self
            .choices
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:>2} - {c}", i + 1))
            .collect();
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let col = centered(widest);
        row = row.saturating_add(1);
        for line in lines {
            def = def.prompt(Position::new(row, col), line);
            row = row.saturating_add(self.line_skip.saturating_add(1));
        }

        let digits: u8 = if self.choices.len() < 10 { 1 } else { 2 };
        let label = format!("{} [1..{}] : ", self.prompt, self.choices.len());
        let hint = " + ENVOI";
        let label_len = label.chars().count();
        let row = self.prompt_row.unwrap_or_else(|| row.saturating_add(1));
        let col = centered(label_len + digits as usize + hint.len());
        let field_col = col.saturating_add(label_len as u8);

        def.prompt(Position::new(row, col), label)
            .prompt(Position::new(row, field_col.saturating_add(digits)), hint)
            .field(
                FieldDef::new(CHOICE_FIELD, Position::new(row, field_col), digits)
                    .kind(FieldKind::Numeric)
                    .required(),
            )
    }

    /// Start a form session for this menu.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldOutOfBounds`] when the menu does not fit `geometry`.
    pub fn session(
        &self,
        geometry: Geometry,
        policy: FormPolicy,
        style: FormStyle,
    ) -> Result<FormSession, FormError> {
        FormSession::new(self.definition(geometry), geometry, policy, style)
    }

    /// The selected choice (1-based), if the submitted value is in range.
    #[must_use]
    pub fn choice(&self, data: &FormData) -> Option<usize> {
        data.get(CHOICE_FIELD)?
            .parse::<usize>()
            .ok()
            .filter(|c| (1..=self.choices.len()).contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{Effect, FormOutcome};
    use vtx_core::event::{FunctionKey, KeyEvent};

    fn menu() -> Menu {
        Menu::new("Main menu", ["Weather", "News", "Games"]).unwrap()
    }

    #[test]
    fn needs_two_choices() {
        assert_eq!(
            Menu::new("t", ["only"]).unwrap_err(),
            MenuError::TooFewChoices(1)
        );
        let many: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        assert_eq!(
            Menu::new("t", many).unwrap_err(),
            MenuError::TooManyChoices(100)
        );
    }

    #[test]
    fn layout() {
        let def = menu().definition(Geometry::default());
        assert_eq!(def.prompts[0].text, "Main menu");
        assert_eq!(def.prompts[0].pos, Position::new(1, 16));
        assert_eq!(def.prompts[1].text, " 1 - Weather");
        assert_eq!(def.prompts[1].pos.row, 3);
        assert_eq!(def.prompts[3].pos.row, 5);

        let field = &def.fields[0];
        assert_eq!(field.name, CHOICE_FIELD);
        assert_eq!(field.length, 1);
        assert_eq!(field.pos.row, 7);
    }

    #[test]
    fn extra_title_lines_push_choices_down() {
        let def = menu()
            .title_line("Pick one")
            .margin_top(1)
            .definition(Geometry::default());
        assert_eq!(def.prompts[0].pos, Position::new(2, 16));
        assert_eq!(def.prompts[1].text, "Pick one");
        assert_eq!(def.prompts[1].pos, Position::new(3, 17));
        assert_eq!(def.prompts[2].text, " 1 - Weather");
        assert_eq!(def.prompts[2].pos.row, 5);
    }

    #[test]
    fn two_digit_field_for_ten_choices() {
        let m = Menu::new("t", (1..=10).map(|i| format!("c{i}"))).unwrap();
        assert_eq!(m.definition(Geometry::default()).fields[0].length, 2);
    }

    #[test]
    fn choice_range() {
        let m = menu();
        let data = |v: &str| FormData {
            values: vec![(CHOICE_FIELD.to_string(), v.to_string())],
        };
        assert_eq!(m.choice(&data("2")), Some(2));
        assert_eq!(m.choice(&data("0")), None);
        assert_eq!(m.choice(&data("4")), None);
        assert_eq!(m.choice(&data("")), None);
    }

    #[test]
    fn select_through_session() {
        let m = menu();
        let mut form = m
            .session(Geometry::default(), FormPolicy::default(), FormStyle::default())
            .unwrap();
        form.handle(KeyEvent::Char('3'));
        let effects = form.handle(KeyEvent::Function(FunctionKey::Submit));
        let Some(Effect::Finished(FormOutcome::Submitted(data))) = effects.last() else {
            panic!("expected submission, got {effects:?}");
        };
        assert_eq!(m.choice(data), Some(3));
    }
}
