#![forbid(unsafe_code)]

//! Screen: state-tracked videotex emission.
//!
//! [`Screen`] mirrors what the terminal currently believes about its display
//! mode, character attributes, and cursor, and only emits the sequences
//! needed to move from that state to the one a caller asks for. Output is
//! accumulated in an internal buffer and handed out by
//! [`Screen::take_output`]; the owner writes it to the channel.
//!
//! # Design Principles
//!
//! - **State tracking**: `None` means unknown. Unknown state is never diffed
//!   against; the full sequence is emitted instead.
//! - **Mirror hardware side effects**: `FF` resets mode, attributes, and
//!   cursor. Absolute addressing (`US`) and `RS` return the terminal to the
//!   text set with default attributes. The tracked state follows exactly.
//! - **Byte minimisation**: cursor moves use relative codes when strictly
//!   shorter than an absolute address; runs of four or more identical
//!   characters are folded with `REP`.
//! - **Status row**: row 0 is written through `US 0 col` and left with `LF`;
//!   the terminal saves and restores the main-screen state around it.
//! - **All-or-nothing**: fallible operations validate before emitting.

use std::fmt;

use vtx_core::attr::{AttrFlags, Attributes, CharSize, DisplayMode};
use vtx_core::command::{AttributeChange, Command, MAX_REPEAT, Part};
use vtx_core::geometry::{Geometry, GeometryError, Position};
use vtx_core::protocol::ProtocolCommand;

/// Length of an absolute cursor address (`US row col`).
const ABSOLUTE_MOVE_LEN: usize = 3;

/// Shortest run worth folding into `char REP n`.
const MIN_REPEAT_RUN: usize = 4;

/// Errors raised by screen operations. Nothing is emitted when one occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenError {
    /// Target position or area outside the screen.
    Geometry(GeometryError),
    /// Attribute flags the current display mode cannot express.
    IllegalAttribute {
        mode: DisplayMode,
        attribute: AttrFlags,
    },
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry(e) => write!(f, "{e}"),
            Self::IllegalAttribute { mode, attribute } => {
                write!(f, "attribute {attribute:?} not available in {mode} mode")
            }
        }
    }
}

impl std::error::Error for ScreenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geometry(e) => Some(e),
            Self::IllegalAttribute { .. } => None,
        }
    }
}

impl From<GeometryError> for ScreenError {
    fn from(err: GeometryError) -> Self {
        Self::Geometry(err)
    }
}

/// State-tracked videotex screen.
#[derive(Debug, Clone)]
pub struct Screen {
    geometry: Geometry,
    /// Current display mode (None = unknown).
    mode: Option<DisplayMode>,
    /// Current attributes (None = unknown).
    attrs: Option<Attributes>,
    /// Current cursor position (None = unknown).
    cursor: Option<Position>,
    /// Cursor visibility (None = unknown).
    cursor_visible: Option<bool>,
    /// Bytes not yet handed to the channel.
    out: Vec<u8>,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(Geometry::default())
    }
}

impl Screen {
    /// Create a screen whose terminal state is unknown.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            mode: None,
            attrs: None,
            cursor: None,
            cursor_visible: None,
            out: Vec::with_capacity(256),
        }
    }

    #[inline]
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Tracked display mode, if known.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> Option<DisplayMode> {
        self.mode
    }

    /// Tracked attributes, if known.
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> Option<Attributes> {
        self.attrs
    }

    /// Tracked cursor position, if known.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> Option<Position> {
        self.cursor
    }

    /// Bytes emitted since the last [`Screen::take_output`].
    #[inline]
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.out
    }

    /// Hand out the pending bytes, leaving the buffer empty.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.out)
    }

    /// Forget everything about the terminal state.
    ///
    /// Call after a channel failure: bytes may or may not have reached the
    /// terminal, so nothing tracked can be trusted. Pending output is dropped.
    pub fn invalidate(&mut self) {
        self.mode = None;
        self.attrs = None;
        self.cursor = None;
        self.cursor_visible = None;
        self.out.clear();
    }

    fn emit(&mut self, command: &Command) {
        command.encode(&mut self.out);
    }

    // =========================================================================
    // Display mode
    // =========================================================================

    /// Switch display mode. Emits nothing when already in `target`.
    ///
    /// Entering graphic mode first drops underline and size, which the
    /// semi-graphic set cannot carry.
    pub fn set_mode(&mut self, target: DisplayMode) {
        if self.mode == Some(target) {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(from = ?self.mode, to = %target, "mode switch");

        let from = self.mode;
        if from == Some(DisplayMode::Mixed) {
            // Leaving mixed lands in the videotex text set.
            self.emit(&Command::ExitMixed);
            self.after_mixed_switch(DisplayMode::Text);
            if target == DisplayMode::Text {
                return;
            }
        }

        match target {
            DisplayMode::Mixed => {
                self.emit(&Command::SetMode(DisplayMode::Mixed));
                self.after_mixed_switch(DisplayMode::Mixed);
            }
            DisplayMode::Graphic => {
                self.drop_text_only_attributes();
                self.emit(&Command::SetMode(DisplayMode::Graphic));
                self.mode = Some(DisplayMode::Graphic);
            }
            DisplayMode::Text => {
                self.emit(&Command::SetMode(DisplayMode::Text));
                self.mode = Some(DisplayMode::Text);
            }
        }
    }

    /// The terminal reinitialises its display on videotex/mixed switches.
    fn after_mixed_switch(&mut self, mode: DisplayMode) {
        self.mode = Some(mode);
        self.attrs = None;
        self.cursor = None;
    }

    fn drop_text_only_attributes(&mut self) {
        let Some(current) = self.attrs else {
            return;
        };
        if current.flags.contains(AttrFlags::UNDERLINE) {
            self.emit(&Command::Attribute(AttributeChange::Underline(false)));
        }
        if current.size() != CharSize::Normal {
            self.emit(&Command::Attribute(AttributeChange::Size(CharSize::Normal)));
        }
        self.attrs = Some(current.without_flags(AttrFlags::TEXT_ONLY));
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Reach `target` attributes with the fewest sequences.
    ///
    /// Only the aspects that differ from the tracked attributes are emitted;
    /// when the tracked attributes are unknown the full set is emitted.
    ///
    /// # Errors
    ///
    /// [`ScreenError::IllegalAttribute`] when `target` carries flags the
    /// current mode cannot express (underline or size in graphic mode).
    pub fn set_attributes(&mut self, target: Attributes) -> Result<(), ScreenError> {
        let mode = self.mode.unwrap_or_default();
        let illegal = target.illegal_flags(mode);
        if !illegal.is_empty() {
            return Err(ScreenError::IllegalAttribute {
                mode,
                attribute: illegal,
            });
        }

        let changes = attribute_diff(self.attrs, target);
        for change in &changes {
            self.emit(&Command::Attribute(*change));
        }
        self.attrs = Some(target);
        Ok(())
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    /// Move the cursor, clamping the target onto the screen.
    ///
    /// Relative moves are used when strictly shorter than an absolute
    /// address.
    pub fn move_cursor(&mut self, row: u8, col: u8) {
        let target = self.geometry.clamp(Position::new(row, col));
        self.move_to(target);
    }

    /// Move the cursor, rejecting targets outside the screen.
    ///
    /// # Errors
    ///
    /// [`ScreenError::Geometry`] when the target is off screen.
    pub fn try_move_cursor(&mut self, row: u8, col: u8) -> Result<(), ScreenError> {
        let target = self.geometry.check(Position::new(row, col))?;
        self.move_to(target);
        Ok(())
    }

    fn move_to(&mut self, target: Position) {
        if self.cursor == Some(target) {
            return;
        }
        match self.relative_plan(target) {
            Some(plan) => {
                let homed = plan.first() == Some(&Command::CursorHome);
                for command in &plan {
                    self.emit(command);
                }
                if homed {
                    self.after_addressing();
                }
            }
            None => {
                self.emit(&Command::MoveTo(target));
                self.after_addressing();
            }
        }
        self.cursor = Some(target);
    }

    /// Cheapest relative route to `target`, if shorter than an absolute address.
    fn relative_plan(&self, target: Position) -> Option<Vec<Command>> {
        let mut starts: Vec<(Option<Command>, Position)> = Vec::with_capacity(3);
        if let Some(cur) = self.cursor {
            starts.push((None, cur));
            starts.push((Some(Command::CarriageReturn), Position::new(cur.row, 1)));
        }
        starts.push((Some(Command::CursorHome), Position::HOME));

        let cost = |(prefix, start): &(Option<Command>, Position)| {
            usize::from(prefix.is_some())
                + target.row.abs_diff(start.row) as usize
                + target.col.abs_diff(start.col) as usize
        };
        let best = starts.iter().min_by_key(|s| cost(*s))?;
        if cost(best) >= ABSOLUTE_MOVE_LEN {
            return None;
        }

        let (prefix, start) = best;
        let mut plan: Vec<Command> = prefix.iter().cloned().collect();
        let (down, up) = (
            target.row.saturating_sub(start.row),
            start.row.saturating_sub(target.row),
        );
        let (right, left) = (
            target.col.saturating_sub(start.col),
            start.col.saturating_sub(target.col),
        );
        plan.extend(std::iter::repeat_n(Command::CursorDown, down as usize));
        plan.extend(std::iter::repeat_n(Command::CursorUp, up as usize));
        plan.extend(std::iter::repeat_n(Command::CursorRight, right as usize));
        plan.extend(std::iter::repeat_n(Command::CursorLeft, left as usize));
        Some(plan)
    }

    /// `US` and `RS` put a videotex terminal back in the text set with
    /// default attributes.
    fn after_addressing(&mut self) {
        if self.mode == Some(DisplayMode::Mixed) {
            self.attrs = None;
        } else {
            self.mode = Some(DisplayMode::Text);
            self.attrs = Some(Attributes::default());
        }
    }

    /// Show or hide the cursor.
    pub fn set_cursor_visible(&mut self, visible: bool) {
        if self.cursor_visible == Some(visible) {
            return;
        }
        self.emit(&Command::CursorVisible(visible));
        self.cursor_visible = Some(visible);
    }

    // =========================================================================
    // Clearing, sound
    // =========================================================================

    /// Clear the screen. The terminal also resets mode, attributes, and
    /// cursor, and so does the tracked state.
    pub fn clear_screen(&mut self) {
        self.emit(&Command::ClearScreen);
        self.mode = Some(DisplayMode::Text);
        self.attrs = Some(Attributes::default());
        self.cursor = Some(Position::HOME);
    }

    /// Clear from the cursor to the end of its row. The cursor does not move.
    pub fn clear_to_end_of_line(&mut self) {
        self.emit(&Command::ClearToEndOfLine);
    }

    /// Erase part of the main screen around the cursor.
    ///
    /// Unlike [`Screen::clear_screen`] this keeps the cursor, mode, and
    /// attributes, so nothing tracked changes.
    pub fn clear_screen_part(&mut self, part: Part) {
        self.emit(&Command::ClearScreenPart(part));
    }

    pub fn clear_end_of_screen(&mut self) {
        self.clear_screen_part(Part::End);
    }

    pub fn clear_begin_of_screen(&mut self) {
        self.clear_screen_part(Part::Begin);
    }

    /// Erase part of the cursor's row. The cursor does not move.
    pub fn clear_line_part(&mut self, part: Part) {
        self.emit(&Command::ClearLinePart(part));
    }

    /// Erase the whole cursor row.
    pub fn clear_line(&mut self) {
        self.clear_line_part(Part::All);
    }

    pub fn clear_begin_of_line(&mut self) {
        self.clear_line_part(Part::Begin);
    }

    /// Blank the status line (row 0). Tracked state is unchanged, as with
    /// [`Screen::write_status`].
    pub fn clear_status(&mut self) {
        self.emit(&Command::MoveTo(Position::new(0, 1)));
        self.emit(&Command::ClearToEndOfLine);
        self.emit(&Command::CursorDown);
    }

    pub fn bell(&mut self) {
        self.emit(&Command::Bell);
    }

    /// Send a protocol-module command. Display state is unaffected.
    pub fn send_protocol(&mut self, command: ProtocolCommand) {
        self.emit(&Command::Protocol(command));
    }

    /// Ask the terminal for its cursor position; it replies with `US row col`.
    pub fn request_position(&mut self) {
        self.emit(&Command::RequestPosition);
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Write text at the cursor in the alphanumeric set.
    ///
    /// Switches out of graphic mode first. Runs of four or more identical
    /// ASCII characters are folded with `REP`.
    pub fn write_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !matches!(self.mode, Some(DisplayMode::Text | DisplayMode::Mixed)) {
            self.set_mode(DisplayMode::Text);
        }

        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let run = chars[i..].iter().take_while(|&&x| x == c).count();
            if run >= MIN_REPEAT_RUN && (c.is_ascii_graphic() || c == ' ') {
                self.emit_repeated(c, run);
            } else {
                for _ in 0..run {
                    vtx_core::charset::encode_char(c, &mut self.out);
                }
            }
            self.advance_cursor(run);
            i += run;
        }
    }

    fn emit_repeated(&mut self, c: char, run: usize) {
        vtx_core::charset::encode_char(c, &mut self.out);
        let mut remaining = run - 1;
        while remaining > 0 {
            let n = remaining.min(MAX_REPEAT as usize);
            self.emit(&Command::Repeat(n as u8));
            remaining -= n;
        }
    }

    /// Write one semi-graphic byte at the cursor, switching to graphic mode
    /// if needed.
    pub fn write_cell(&mut self, byte: u8) {
        self.set_mode(DisplayMode::Graphic);
        self.emit(&Command::Cell(byte));
        self.advance_cursor(1);
    }

    fn advance_cursor(&mut self, cells: usize) {
        let width = self.attrs.map_or(1, |a| a.size().columns());
        if let Some(mut pos) = self.cursor {
            for _ in 0..cells {
                pos = self.geometry.advance(pos, width);
            }
            self.cursor = Some(pos);
        }
    }

    /// Write `text` on the status line (row 0), starting at column `col`.
    ///
    /// The terminal restores the cursor, character set, and attributes when
    /// leaving row 0 with `LF`, so the tracked state is unchanged afterwards.
    /// Text beyond the screen width is cut.
    ///
    /// # Errors
    ///
    /// [`ScreenError::Geometry`] when `col` is not a column of the screen.
    pub fn write_status(&mut self, col: u8, text: &str) -> Result<(), ScreenError> {
        let columns = self.geometry.columns();
        if !(1..=columns).contains(&col) {
            return Err(GeometryError::OutOfBounds {
                pos: Position::new(0, col),
                geometry: self.geometry,
            }
            .into());
        }
        let width = (columns - col + 1) as usize;
        let clipped: String = text.chars().take(width).collect();
        self.emit(&Command::MoveTo(Position::new(0, col)));
        self.emit(&Command::Text(clipped));
        if text.chars().count() < width {
            self.emit(&Command::ClearToEndOfLine);
        }
        self.emit(&Command::CursorDown);
        Ok(())
    }
}

/// Sequences needed to go from `current` to `target`.
fn attribute_diff(current: Option<Attributes>, target: Attributes) -> Vec<AttributeChange> {
    let flag = |attrs: Attributes, f: AttrFlags| attrs.flags.contains(f);
    let mut changes = Vec::new();
    let full = current.is_none();
    let cur = current.unwrap_or_default();

    if full || cur.fg != target.fg {
        changes.push(AttributeChange::Foreground(target.fg));
    }
    if full || cur.bg != target.bg {
        changes.push(AttributeChange::Background(target.bg));
    }
    if full || cur.size() != target.size() {
        changes.push(AttributeChange::Size(target.size()));
    }
    for (f, change) in [
        (AttrFlags::BLINK, AttributeChange::Blink as fn(bool) -> AttributeChange),
        (AttrFlags::UNDERLINE, AttributeChange::Underline),
        (AttrFlags::INVERSE, AttributeChange::Inverse),
    ] {
        if full || flag(cur, f) != flag(target, f) {
            changes.push(change(flag(target, f)));
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtx_core::attr::Color;
    use vtx_core::command::{BS, CR, ESC, FF, HT, LF, REP, RS, SI, SO, US, VT};

    fn cleared() -> Screen {
        let mut screen = Screen::default();
        screen.clear_screen();
        screen.take_output();
        screen
    }

    #[test]
    fn set_mode_is_idempotent() {
        let mut screen = Screen::default();
        screen.set_mode(DisplayMode::Graphic);
        assert_eq!(screen.take_output(), vec![SO]);
        screen.set_mode(DisplayMode::Graphic);
        assert!(screen.output().is_empty());
    }

    #[test]
    fn leaving_mixed_for_graphic() {
        let mut screen = cleared();
        screen.set_mode(DisplayMode::Mixed);
        assert_eq!(screen.take_output(), vec![ESC, 0x3A, 0x32, 0x7D]);
        screen.set_mode(DisplayMode::Graphic);
        assert_eq!(screen.take_output(), vec![ESC, 0x3A, 0x32, 0x7E, SO]);
        assert_eq!(screen.mode(), Some(DisplayMode::Graphic));
    }

    #[test]
    fn leaving_mixed_for_text_needs_no_si() {
        let mut screen = cleared();
        screen.set_mode(DisplayMode::Mixed);
        screen.take_output();
        screen.set_mode(DisplayMode::Text);
        assert_eq!(screen.take_output(), vec![ESC, 0x3A, 0x32, 0x7E]);
    }

    #[test]
    fn minimal_attribute_diff() {
        let mut screen = cleared();
        let red_blink = Attributes::fg(Color::Red).with_flags(AttrFlags::BLINK);
        screen.set_attributes(red_blink).unwrap();
        screen.take_output();

        let red_inverse = Attributes::fg(Color::Red).with_flags(AttrFlags::INVERSE);
        screen.set_attributes(red_inverse).unwrap();
        assert_eq!(screen.take_output(), vec![ESC, 0x49, ESC, 0x5D]);
    }

    #[test]
    fn unknown_attributes_emit_full_set() {
        let mut screen = Screen::default();
        screen.set_attributes(Attributes::default()).unwrap();
        assert_eq!(
            screen.take_output(),
            vec![ESC, 0x47, ESC, 0x50, ESC, 0x4C, ESC, 0x49, ESC, 0x59, ESC, 0x5C]
        );
        screen.set_attributes(Attributes::default()).unwrap();
        assert!(screen.output().is_empty());
    }

    #[test]
    fn graphic_mode_rejects_underline_without_output() {
        let mut screen = cleared();
        screen.set_mode(DisplayMode::Graphic);
        screen.take_output();
        let err = screen
            .set_attributes(Attributes::default().with_flags(AttrFlags::UNDERLINE))
            .unwrap_err();
        assert_eq!(
            err,
            ScreenError::IllegalAttribute {
                mode: DisplayMode::Graphic,
                attribute: AttrFlags::UNDERLINE
            }
        );
        assert!(screen.output().is_empty());
    }

    #[test]
    fn entering_graphic_drops_text_only_flags() {
        let mut screen = cleared();
        screen
            .set_attributes(Attributes::default().with_flags(AttrFlags::UNDERLINE | AttrFlags::DOUBLE_HEIGHT))
            .unwrap();
        screen.take_output();
        screen.set_mode(DisplayMode::Graphic);
        assert_eq!(screen.take_output(), vec![ESC, 0x59, ESC, 0x4C, SO]);
        assert!(screen.attributes().unwrap().flags.is_empty());
    }

    #[test]
    fn clear_screen_resets_tracking() {
        let mut screen = cleared();
        screen.set_mode(DisplayMode::Graphic);
        screen.set_attributes(Attributes::fg(Color::Green)).unwrap();
        screen.move_cursor(10, 10);
        screen.take_output();

        screen.clear_screen();
        assert_eq!(screen.take_output(), vec![FF]);
        assert_eq!(screen.mode(), Some(DisplayMode::Text));
        assert_eq!(screen.attributes(), Some(Attributes::default()));
        assert_eq!(screen.cursor(), Some(Position::HOME));

        // Nothing to re-emit for defaults after a clear.
        screen.set_mode(DisplayMode::Text);
        screen.set_attributes(Attributes::default()).unwrap();
        assert!(screen.output().is_empty());
    }

    #[test]
    fn short_moves_are_relative() {
        let mut screen = cleared();
        screen.move_cursor(1, 3);
        assert_eq!(screen.take_output(), vec![HT, HT]);
        screen.move_cursor(2, 2);
        assert_eq!(screen.take_output(), vec![LF, BS]);
        screen.move_cursor(1, 2);
        assert_eq!(screen.take_output(), vec![VT]);
    }

    #[test]
    fn carriage_return_and_home_routes() {
        let mut screen = cleared();
        screen.move_cursor(5, 30);
        screen.take_output();
        screen.move_cursor(6, 1);
        assert_eq!(screen.take_output(), vec![CR, LF]);

        screen.move_cursor(1, 2);
        assert_eq!(screen.take_output(), vec![RS, HT]);
    }

    #[test]
    fn long_moves_are_absolute() {
        let mut screen = cleared();
        screen.move_cursor(12, 20);
        assert_eq!(screen.take_output(), vec![US, 0x4C, 0x54]);
        assert_eq!(screen.cursor(), Some(Position::new(12, 20)));
    }

    #[test]
    fn unknown_cursor_uses_home_or_absolute() {
        let mut screen = Screen::default();
        screen.move_cursor(1, 1);
        assert_eq!(screen.take_output(), vec![RS]);
        let mut screen = Screen::default();
        screen.move_cursor(3, 3);
        assert_eq!(screen.take_output(), vec![US, 0x43, 0x43]);
    }

    #[test]
    fn addressing_resets_mode_and_attributes() {
        let mut screen = cleared();
        screen.set_mode(DisplayMode::Graphic);
        screen.set_attributes(Attributes::fg(Color::Red)).unwrap();
        screen.move_cursor(10, 10);
        assert_eq!(screen.mode(), Some(DisplayMode::Text));
        assert_eq!(screen.attributes(), Some(Attributes::default()));
    }

    #[test]
    fn move_cursor_clamps_and_try_rejects() {
        let mut screen = cleared();
        screen.move_cursor(99, 0);
        assert_eq!(screen.cursor(), Some(Position::new(24, 1)));
        screen.take_output();

        let err = screen.try_move_cursor(25, 1).unwrap_err();
        assert!(matches!(err, ScreenError::Geometry(GeometryError::OutOfBounds { .. })));
        assert!(screen.output().is_empty());
        assert_eq!(screen.cursor(), Some(Position::new(24, 1)));
    }

    #[test]
    fn write_text_tracks_cursor_and_compresses() {
        let mut screen = cleared();
        screen.write_text("ab-----");
        assert_eq!(screen.take_output(), vec![b'a', b'b', b'-', REP, 0x44]);
        assert_eq!(screen.cursor(), Some(Position::new(1, 8)));
    }

    #[test]
    fn write_text_leaves_graphic_mode() {
        let mut screen = cleared();
        screen.set_mode(DisplayMode::Graphic);
        screen.take_output();
        screen.write_text("ok");
        assert_eq!(screen.take_output(), vec![SI, b'o', b'k']);
    }

    #[test]
    fn double_width_advances_two_columns() {
        let mut screen = cleared();
        screen
            .set_attributes(Attributes::default().with_flags(AttrFlags::DOUBLE_WIDTH))
            .unwrap();
        screen.write_text("AB");
        assert_eq!(screen.cursor(), Some(Position::new(1, 5)));
    }

    #[test]
    fn long_runs_split_repeat_counts() {
        let mut screen = cleared();
        screen.write_text(&"=".repeat(100));
        let out = screen.take_output();
        assert_eq!(out, vec![b'=', REP, 0x40 + 63, REP, 0x40 + 36]);
        assert_eq!(screen.cursor(), Some(Position::new(3, 21)));
    }

    #[test]
    fn status_line_preserves_tracking() {
        let mut screen = cleared();
        screen.move_cursor(5, 5);
        screen.take_output();
        screen.write_status(1, "Hello").unwrap();
        let out = screen.take_output();
        assert_eq!(&out[..3], &[US, 0x40, 0x41]);
        assert_eq!(&out[3..8], b"Hello");
        assert_eq!(&out[8..], &[0x18, LF]);
        assert_eq!(screen.cursor(), Some(Position::new(5, 5)));
    }

    #[test]
    fn status_column_is_checked_and_text_clipped() {
        let mut screen = cleared();
        screen.write_status(38, "abcdef").unwrap();
        assert_eq!(screen.take_output(), vec![US, 0x40, 0x40 + 38, b'a', b'b', b'c', LF]);

        for col in [0, 41] {
            let err = screen.write_status(col, "x").unwrap_err();
            assert!(matches!(err, ScreenError::Geometry(GeometryError::OutOfBounds { .. })));
        }
        assert!(screen.output().is_empty());
    }

    #[test]
    fn clear_status_blanks_row_zero() {
        let mut screen = cleared();
        screen.set_mode(DisplayMode::Graphic);
        screen.take_output();
        screen.clear_status();
        assert_eq!(screen.take_output(), vec![US, 0x40, 0x41, 0x18, LF]);
        assert_eq!(screen.mode(), Some(DisplayMode::Graphic));
        assert_eq!(screen.cursor(), Some(Position::HOME));
    }

    #[test]
    fn partial_clears_keep_tracking() {
        let mut screen = cleared();
        screen.move_cursor(3, 4);
        screen.take_output();
        screen.clear_end_of_screen();
        screen.clear_begin_of_screen();
        screen.clear_line();
        screen.clear_begin_of_line();
        assert_eq!(
            screen.take_output(),
            b"\x1b[0J\x1b[1J\x1b[2K\x1b[1K".to_vec()
        );
        assert_eq!(screen.cursor(), Some(Position::new(3, 4)));
        assert_eq!(screen.mode(), Some(DisplayMode::Text));
    }

    #[test]
    fn cursor_visibility_is_tracked() {
        let mut screen = cleared();
        screen.set_cursor_visible(true);
        screen.set_cursor_visible(true);
        assert_eq!(screen.take_output(), vec![0x11]);
        screen.set_cursor_visible(false);
        assert_eq!(screen.take_output(), vec![0x14]);
    }

    #[test]
    fn invalidate_forgets_everything() {
        let mut screen = cleared();
        screen.bell();
        screen.invalidate();
        assert!(screen.output().is_empty());
        assert_eq!(screen.mode(), None);
        assert_eq!(screen.cursor(), None);
        screen.set_mode(DisplayMode::Text);
        assert_eq!(screen.take_output(), vec![SI]);
    }

    #[test]
    fn position_request_keeps_state() {
        let mut screen = cleared();
        screen.request_position();
        assert_eq!(screen.take_output(), vec![ESC, 0x61]);
        assert_eq!(screen.cursor(), Some(Position::HOME));
    }
}
