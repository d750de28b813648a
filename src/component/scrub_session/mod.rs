//! Interactive scrubbing
//!
//! The state machine lives in `session`, the text projection in `render`
//! and the keyboard front end in `terminal`.

mod render;
mod session;
mod terminal;

pub use render::{CURSOR_GLYPH, END_GLYPH, Frame, START_GLYPH, column_for, render};
pub use session::{
    MarkerPair, ScrubCommand, ScrubError, ScrubEvent, ScrubOutcome, ScrubSession, ScrubState,
    SelectionMode, Timeline,
};
pub use terminal::TerminalScrubber;

use anyhow::Result;
use std::path::Path;

/// Source of scrub commands.
pub trait ScrubDriver {
    /// Called once before the first command, with the media being scrubbed.
    fn prepare(&mut self, _media: &Path, _session: &ScrubSession) -> Result<()> {
        Ok(())
    }

    fn next_command(&mut self, session: &ScrubSession) -> Result<ScrubCommand>;

    /// Feedback for the command just applied.
    fn report(&mut self, _session: &ScrubSession, _result: &Result<ScrubEvent, ScrubError>) {}

    fn finish(&mut self) {}
}

/// Drive `session` with commands from `driver` until it finishes.
pub fn run_session(
    media: &Path,
    mut session: ScrubSession,
    driver: &mut dyn ScrubDriver,
) -> Result<ScrubOutcome> {
    session.begin();
    driver.prepare(media, &session)?;

    while !session.is_finished() {
        let command = match driver.next_command(&session) {
            Ok(command) => command,
            Err(e) => {
                driver.finish();
                return Err(e);
            }
        };
        let result = session.apply(command);
        if let Err(e) = &result {
            log::debug!("scrub command {command:?} rejected: {e}");
        }
        driver.report(&session, &result);
    }

    driver.finish();
    Ok(session.into_outcome())
}

/// Replays a fixed list of commands, then quits.
#[derive(Debug, Default)]
pub struct ScriptedScrubber {
    commands: std::collections::VecDeque<ScrubCommand>,
    pub rejected: Vec<ScrubError>,
}

impl ScriptedScrubber {
    #[must_use]
    pub fn new(commands: impl IntoIterator<Item = ScrubCommand>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
            rejected: Vec::new(),
        }
    }
}

impl ScrubDriver for ScriptedScrubber {
    fn next_command(&mut self, _session: &ScrubSession) -> Result<ScrubCommand> {
        Ok(self.commands.pop_front().unwrap_or(ScrubCommand::Quit))
    }

    fn report(&mut self, _session: &ScrubSession, result: &Result<ScrubEvent, ScrubError>) {
        if let Err(e) = result {
            self.rejected.push(e.clone());
        }
    }
}
