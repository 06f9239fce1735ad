#![forbid(unsafe_code)]

//! Channel adapter.
//!
//! [`Terminal`] owns the duplex byte channel together with the [`Screen`]
//! and the [`Decoder`] that track it. Display operations go through
//! [`Terminal::screen_mut`] and reach the device on [`Terminal::flush`];
//! input is read and decoded by [`Terminal::poll_events`].
//!
//! A failed write leaves the device in an unknown state, so the screen's
//! tracked state is invalidated before the error is returned: the next
//! operation re-establishes mode and attributes from scratch.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

use tracing::{debug, trace, warn};

use vtx_core::decoder::Decoder;
use vtx_core::event::{Event, KeyEvent};
#[cfg(feature = "image")]
use vtx_core::geometry::{Position, Size};
use vtx_core::identification::DeviceSpecs;
use vtx_core::protocol::ProtocolCommand;
use vtx_render::Screen;

#[cfg(feature = "forms")]
use vtx_extras::forms::{Effect, FormDefinition, FormOutcome, FormSession, Menu, apply_effects};
#[cfg(feature = "image")]
use vtx_extras::image::{CellGrid, ImageConverter};

use crate::config::TerminalConfig;
use crate::{Error, Result};

/// One videotex terminal on one duplex channel.
#[derive(Debug)]
pub struct Terminal<T> {
    channel: T,
    screen: Screen,
    decoder: Decoder,
    config: TerminalConfig,
    /// Decoded events not handed out yet.
    pending: VecDeque<Event>,
    read_buf: Vec<u8>,
    /// The last read returned end of stream.
    eof: bool,
    /// The last read would have blocked.
    would_block: bool,
}

impl<T: Read + Write> Terminal<T> {
    /// Wrap a channel with the default configuration.
    pub fn new(channel: T) -> Self {
        Self::with_config(channel, TerminalConfig::default())
    }

    pub fn with_config(channel: T, config: TerminalConfig) -> Self {
        Self {
            channel,
            screen: Screen::new(config.geometry),
            decoder: Decoder::new(config.keymap.clone()),
            read_buf: vec![0; config.read_chunk.max(1)],
            config,
            pending: VecDeque::new(),
            eof: false,
            would_block: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Queue display operations; they are sent on the next flush.
    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn channel(&self) -> &T {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut T {
        &mut self.channel
    }

    /// Give back the channel. Unflushed output is dropped.
    pub fn into_inner(self) -> T {
        self.channel
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Send everything the screen has queued, in order.
    ///
    /// # Errors
    ///
    /// [`Error::Channel`] when the write fails. The screen state is then
    /// unknown and tracked as such.
    pub fn flush(&mut self) -> Result<()> {
        let bytes = self.screen.take_output();
        if bytes.is_empty() {
            return Ok(());
        }
        match self
            .channel
            .write_all(&bytes)
            .and_then(|()| self.channel.flush())
        {
            Ok(()) => {
                trace!(bytes = bytes.len(), "channel write");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, bytes = bytes.len(), "channel write failed");
                self.screen.invalidate();
                Err(Error::Channel(err))
            }
        }
    }

    /// Send a protocol-module command right away.
    pub fn send_protocol(&mut self, command: ProtocolCommand) -> Result<()> {
        self.screen.send_protocol(command);
        self.flush()
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Read once from the channel and return every event decoded so far.
    ///
    /// An empty result means the channel had nothing to offer (end of
    /// stream, timeout, or would-block); partial sequences stay buffered
    /// until a later call completes them.
    ///
    /// # Errors
    ///
    /// [`Error::Channel`] on any other read failure.
    pub fn poll_events(&mut self) -> Result<Vec<Event>> {
        self.fill()?;
        Ok(self.pending.drain(..).collect())
    }

    /// Next decoded event, reading from the channel when none is queued.
    ///
    /// Returns `None` when the channel had nothing to offer.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        if self.pending.is_empty() {
            self.fill()?;
        }
        Ok(self.pending.pop_front())
    }

    /// Next key event, skipping everything else.
    pub fn next_key(&mut self) -> Result<Option<KeyEvent>> {
        loop {
            if self.pending.is_empty() && self.fill()? == 0 {
                return Ok(None);
            }
            while let Some(event) = self.pending.pop_front() {
                if let Event::Key(key) = event {
                    return Ok(Some(key));
                }
            }
        }
    }

    /// One read; decoded events are queued. Returns the number of bytes read.
    fn fill(&mut self) -> Result<usize> {
        self.would_block = false;
        let n = match self.channel.read(&mut self.read_buf) {
            Ok(0) => {
                self.eof = true;
                0
            }
            Ok(n) => {
                self.eof = false;
                n
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                self.would_block = true;
                0
            }
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                0
            }
            Err(err) => {
                warn!(error = %err, "channel read failed");
                return Err(Error::Channel(err));
            }
        };
        for event in self.decoder.decode(&self.read_buf[..n]) {
            if let Event::Unknown(seq) = &event {
                trace!(sequence = %seq, "unknown sequence");
            }
            self.pending.push_back(event);
        }
        Ok(n)
    }

    /// Ask the device for its identification.
    ///
    /// Events arriving meanwhile stay queued for [`Terminal::next_event`].
    /// Returns `None` when no reply came within the configured number of
    /// reads.
    pub fn identify(&mut self) -> Result<Option<DeviceSpecs>> {
        self.send_protocol(ProtocolCommand::ENQ_ROM)?;
        for _ in 0..self.config.identify_reads {
            self.fill()?;
            if self.eof {
                break;
            }
            let found = self
                .pending
                .iter()
                .position(|e| matches!(e, Event::Identification(_)));
            if let Some(Event::Identification(specs)) = found.and_then(|i| self.pending.remove(i))
            {
                debug!(%specs, "device identified");
                return Ok(Some(specs));
            }
        }
        debug!(reads = self.config.identify_reads, "no identification reply");
        Ok(None)
    }

    /// Ask the device where its cursor is. The reply is a
    /// [`vtx_core::command::Command::MoveTo`] event.
    pub fn request_position(&mut self) -> Result<()> {
        self.screen.request_position();
        self.flush()
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// Draw a converted grid with its top-left cell at `origin`.
    ///
    /// Nothing is sent when the grid does not fit.
    #[cfg(feature = "image")]
    pub fn render_grid(&mut self, grid: &CellGrid, origin: Position) -> Result<()> {
        grid.render(origin, &mut self.screen)?;
        self.flush()
    }

    /// Convert `image` to `size` cells with the configured palette and draw it.
    #[cfg(feature = "image")]
    pub fn render_image(
        &mut self,
        image: &image::DynamicImage,
        size: Size,
        origin: Position,
    ) -> Result<()> {
        let grid = ImageConverter::new(self.config.palette).convert(image, size)?;
        self.render_grid(&grid, origin)
    }

    // =========================================================================
    // Forms
    // =========================================================================

    /// Start a session on `definition` with the configured policy and style.
    #[cfg(feature = "forms")]
    pub fn open_form(&self, definition: FormDefinition) -> Result<FormSession> {
        Ok(FormSession::new(
            definition,
            self.config.geometry,
            self.config.form_policy,
            self.config.form_style,
        )?)
    }

    /// Draw the whole form.
    #[cfg(feature = "forms")]
    pub fn render_form(&mut self, session: &FormSession) -> Result<()> {
        apply_effects(&session.render(), &mut self.screen)?;
        self.flush()
    }

    /// Feed one key to `session` and send the resulting display changes.
    ///
    /// The effects are returned so the caller sees forwarded keys,
    /// validation failures, and the outcome.
    #[cfg(feature = "forms")]
    pub fn run_form_event(
        &mut self,
        session: &mut FormSession,
        key: KeyEvent,
    ) -> Result<Vec<Effect>> {
        let effects = session.handle(key);
        apply_effects(&effects, &mut self.screen)?;
        self.flush()?;
        if let Some(Effect::Finished(outcome)) = effects.last() {
            match outcome {
                FormOutcome::Submitted(data) => {
                    debug!(fields = data.values.len(), "form submitted");
                }
                FormOutcome::Cancelled => debug!("form cancelled"),
            }
        }
        Ok(effects)
    }

    /// Draw `session` and feed it keys until it ends.
    ///
    /// Meant for blocking channels or channels with a read timeout; timed-out
    /// reads are simply retried. A non-blocking channel gets control back on
    /// the first read that would block, with the session left as it was: keep
    /// feeding it with [`Terminal::run_form_event`] once input is ready.
    ///
    /// # Errors
    ///
    /// [`Error::Channel`] with [`io::ErrorKind::UnexpectedEof`] when the
    /// channel reaches end of stream first, or with
    /// [`io::ErrorKind::WouldBlock`] as described above.
    #[cfg(feature = "forms")]
    pub fn run_form(&mut self, session: &mut FormSession) -> Result<FormOutcome> {
        self.render_form(session)?;
        loop {
            let Some(key) = self.next_key()? else {
                if self.eof {
                    warn!("channel closed during form");
                    return Err(Error::Channel(io::ErrorKind::UnexpectedEof.into()));
                }
                if self.would_block {
                    return Err(Error::Channel(io::ErrorKind::WouldBlock.into()));
                }
                continue;
            };
            let effects = self.run_form_event(session, key)?;
            if let Some(Effect::Finished(outcome)) = effects.into_iter().last() {
                return Ok(outcome);
            }
        }
    }

    /// Show `menu` until a valid choice is submitted (`Some`, 1-based) or
    /// the menu is cancelled (`None`). Out-of-range entries beep and the menu
    /// is shown again.
    #[cfg(feature = "forms")]
    pub fn run_menu(&mut self, menu: &Menu) -> Result<Option<usize>> {
        loop {
            let mut session = menu.session(
                self.config.geometry,
                self.config.form_policy,
                self.config.form_style,
            )?;
            match self.run_form(&mut session)? {
                FormOutcome::Cancelled => return Ok(None),
                FormOutcome::Submitted(data) => {
                    if let Some(choice) = menu.choice(&data) {
                        return Ok(Some(choice));
                    }
                    self.screen.bell();
                }
            }
        }
    }
}
