//! Keyboard front end for the scrub session

use super::render::{CURSOR_GLYPH, END_GLYPH, START_GLYPH, render};
use super::session::{ScrubCommand, ScrubError, ScrubEvent, ScrubSession, SelectionMode};
use super::ScrubDriver;
use crate::tools::timecode;
use anyhow::Result;
use console::{Key, Term, style};
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use log::warn;
use rust_i18n::t;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const MIN_TRACK_WIDTH: usize = 20;
const COARSE_STEP: i64 = 10;

type PeakLoader<'a> = Box<dyn Fn(&Path, usize) -> Result<Vec<f32>> + 'a>;
type PreviewWriter<'a> = Box<dyn Fn(&Path, f64) -> Result<PathBuf> + 'a>;

pub struct TerminalScrubber<'a> {
    term: Term,
    shutdown_signal: Arc<AtomicBool>,
    peak_loader: Option<PeakLoader<'a>>,
    preview_writer: Option<PreviewWriter<'a>>,
    peaks: Option<Vec<f32>>,
    media: PathBuf,
    message: Option<String>,
}

impl<'a> TerminalScrubber<'a> {
    pub fn new(term: Term, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            term,
            shutdown_signal,
            peak_loader: None,
            preview_writer: None,
            peaks: None,
            media: PathBuf::new(),
            message: None,
        }
    }

    #[must_use]
    pub fn with_waveform(mut self, loader: impl Fn(&Path, usize) -> Result<Vec<f32>> + 'a) -> Self {
        self.peak_loader = Some(Box::new(loader));
        self
    }

    #[must_use]
    pub fn with_preview(mut self, writer: impl Fn(&Path, f64) -> Result<PathBuf> + 'a) -> Self {
        self.preview_writer = Some(Box::new(writer));
        self
    }

    fn track_width(&self) -> usize {
        let (_, cols) = self.term.size();
        usize::from(cols).saturating_sub(2).max(MIN_TRACK_WIDTH)
    }

    fn draw(&self, session: &ScrubSession) -> Result<()> {
        self.term.clear_screen()?;

        let (title, help) = match session.mode() {
            SelectionMode::Range => (t!("scrub.title_trim"), t!("scrub.help_trim")),
            SelectionMode::Point => (t!("scrub.title_frame"), t!("scrub.help_frame")),
        };
        println!("{}", style(title).cyan().bold());
        println!("{}", style(help).dim());
        println!();

        let frame = render(session, self.peaks.as_deref(), self.track_width());
        let markers: String = frame
            .markers
            .chars()
            .map(|c| match c {
                CURSOR_GLYPH => style(c).red().bold().to_string(),
                START_GLYPH => style(c).green().bold().to_string(),
                END_GLYPH => style(c).blue().bold().to_string(),
                _ => c.to_string(),
            })
            .collect();

        println!("{markers}");
        println!("{}", style(&frame.track).dim());
        println!("{}", frame.status);

        if let Some(message) = &self.message {
            println!();
            println!("{message}");
        }
        Ok(())
    }

    fn prompt_goto(&mut self, session: &ScrubSession) -> Result<Option<ScrubCommand>> {
        let raw: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("scrub.goto_prompt"))
            .allow_empty(true)
            .interact_text_on(&self.term)?;

        if raw.trim().is_empty() {
            return Ok(None);
        }

        match timecode::parse(&raw) {
            Ok(seconds) => {
                let ratio = (seconds / session.timeline().length()).clamp(0.0, 1.0);
                Ok(Some(ScrubCommand::SeekAbsolute(ratio)))
            }
            Err(e) => {
                self.message = Some(style(t!("scrub.invalid_time", error = e)).red().to_string());
                Ok(None)
            }
        }
    }

    fn write_preview(&mut self, session: &ScrubSession) {
        let Some(writer) = &self.preview_writer else {
            return;
        };
        self.message = Some(match writer(&self.media, session.cursor()) {
            Ok(path) => style(t!("scrub.preview_saved", path = path.display()))
                .green()
                .to_string(),
            Err(e) => {
                warn!("Preview frame failed: {e:#}");
                style(t!("scrub.preview_failed", error = e)).red().to_string()
            }
        });
    }

    fn map_key(key: &Key) -> Option<ScrubCommand> {
        match key {
            Key::ArrowLeft => Some(ScrubCommand::SeekRelative(-1)),
            Key::ArrowRight => Some(ScrubCommand::SeekRelative(1)),
            Key::ArrowDown => Some(ScrubCommand::SeekRelative(-COARSE_STEP)),
            Key::ArrowUp => Some(ScrubCommand::SeekRelative(COARSE_STEP)),
            Key::Home => Some(ScrubCommand::SeekAbsolute(0.0)),
            Key::End => Some(ScrubCommand::SeekAbsolute(1.0)),
            Key::Char(' ') => Some(ScrubCommand::Mark),
            Key::Char('r' | 'R') => Some(ScrubCommand::Reset),
            Key::Char('q' | 'Q') | Key::Escape | Key::Enter => Some(ScrubCommand::Quit),
            Key::Char(c) => c
                .to_digit(10)
                .map(|d| ScrubCommand::SeekAbsolute(f64::from(d) / 10.0)),
            _ => None,
        }
    }
}

impl ScrubDriver for TerminalScrubber<'_> {
    fn prepare(&mut self, media: &Path, _session: &ScrubSession) -> Result<()> {
        self.media = media.to_path_buf();
        if let Some(loader) = &self.peak_loader {
            println!("{}", style(t!("scrub.loading_waveform")).dim());
            match loader(media, self.track_width()) {
                Ok(peaks) => self.peaks = Some(peaks),
                // the track falls back to a plain rule
                Err(e) => warn!("Waveform unavailable for {}: {e:#}", media.display()),
            }
        }
        Ok(())
    }

    fn next_command(&mut self, session: &ScrubSession) -> Result<ScrubCommand> {
        loop {
            if self.shutdown_signal.swap(false, Ordering::SeqCst) {
                return Ok(ScrubCommand::Quit);
            }

            self.draw(session)?;

            let key = match self.term.read_key() {
                Ok(key) => key,
                Err(e) if e.kind() == ErrorKind::Interrupted => return Ok(ScrubCommand::Quit),
                Err(e) => return Err(e.into()),
            };
            self.message = None;

            match key {
                Key::Char('t' | 'T') => {
                    if let Some(command) = self.prompt_goto(session)? {
                        return Ok(command);
                    }
                }
                Key::Char('p' | 'P') if session.mode() == SelectionMode::Point => {
                    self.write_preview(session);
                }
                other => {
                    if let Some(command) = Self::map_key(&other) {
                        return Ok(command);
                    }
                }
            }
        }
    }

    fn report(&mut self, _session: &ScrubSession, result: &Result<ScrubEvent, ScrubError>) {
        self.message = match result {
            Ok(ScrubEvent::StartMarked(at)) => Some(
                style(t!("scrub.start_set", time = timecode::format(*at)))
                    .green()
                    .to_string(),
            ),
            Ok(ScrubEvent::EndMarked(at)) => Some(
                style(t!("scrub.end_set", time = timecode::format(*at)))
                    .green()
                    .to_string(),
            ),
            Ok(ScrubEvent::PointMarked(at)) => Some(
                style(t!("scrub.frame_set", time = format!("{at:.2}")))
                    .green()
                    .to_string(),
            ),
            Ok(ScrubEvent::Reset) => Some(style(t!("scrub.reset")).yellow().to_string()),
            Ok(_) => None,
            Err(e) => Some(style(e.to_string()).red().to_string()),
        };
    }

    fn finish(&mut self) {
        if let Err(e) = self.term.clear_screen() {
            warn!("Could not clear the terminal: {e}");
        }
    }
}
