//! Cursor and marker state machine for interactive scrubbing
//!
//! Idle -> AwaitingStart -> AwaitingEnd -> Committed, with Reset back to
//! AwaitingStart from any non-terminal state and Quit ending the session.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScrubError {
    #[error("end ({end:.2}s) must be after start ({start:.2}s)")]
    OrderingViolation { start: f64, end: f64 },
    #[error("seek ratio {0} is outside 0..=1")]
    InvalidSeek(f64),
    #[error("media length {length}s / resolution {resolution} cannot form a timeline")]
    InvalidTimeline { length: f64, resolution: f64 },
}

/// Immutable view over a media asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeline {
    length: f64,
    resolution: f64,
}

impl Timeline {
    /// `resolution` is positions per second: sample rate for audio, frame
    /// rate for video.
    pub fn new(length: f64, resolution: f64) -> Result<Self, ScrubError> {
        let valid = length.is_finite() && length > 0.0 && resolution.is_finite() && resolution > 0.0;
        if !valid {
            return Err(ScrubError::InvalidTimeline { length, resolution });
        }
        Ok(Self { length, resolution })
    }

    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub const fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Last addressable position, one step before the end.
    #[must_use]
    pub fn last_position(&self) -> f64 {
        (self.length - 1.0 / self.resolution).max(0.0)
    }

    #[must_use]
    pub fn clamp(&self, position: f64) -> f64 {
        position.clamp(0.0, self.last_position())
    }

    fn snap(&self, position: f64) -> f64 {
        (position * self.resolution).floor() / self.resolution
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarkerPair {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl MarkerPair {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Start and end markers, used for trimming.
    Range,
    /// A single marker, used for picking a cover frame.
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrubState {
    Idle,
    AwaitingStart,
    AwaitingEnd,
    Committed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrubCommand {
    SeekRelative(i64),
    SeekAbsolute(f64),
    Mark,
    Reset,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrubEvent {
    Moved(f64),
    StartMarked(f64),
    EndMarked(f64),
    PointMarked(f64),
    Reset,
    Closed,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrubOutcome {
    Selected(MarkerPair),
    NoSelection,
}

impl ScrubOutcome {
    #[must_use]
    pub const fn markers(&self) -> Option<MarkerPair> {
        match self {
            Self::Selected(pair) => Some(*pair),
            Self::NoSelection => None,
        }
    }

    /// The single marker of a point selection.
    #[must_use]
    pub const fn point(&self) -> Option<f64> {
        match self {
            Self::Selected(pair) => pair.start,
            Self::NoSelection => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrubSession {
    timeline: Timeline,
    mode: SelectionMode,
    cursor: f64,
    markers: MarkerPair,
    state: ScrubState,
    closed: bool,
}

impl ScrubSession {
    #[must_use]
    pub const fn new(timeline: Timeline, mode: SelectionMode) -> Self {
        Self {
            timeline,
            mode,
            cursor: 0.0,
            markers: MarkerPair {
                start: None,
                end: None,
            },
            state: ScrubState::Idle,
            closed: false,
        }
    }

    #[must_use]
    pub fn with_cursor(mut self, position: f64) -> Self {
        self.cursor = self.timeline.clamp(position);
        self
    }

    pub fn begin(&mut self) {
        if self.state == ScrubState::Idle {
            self.state = ScrubState::AwaitingStart;
        }
    }

    #[must_use]
    pub const fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    #[must_use]
    pub const fn cursor(&self) -> f64 {
        self.cursor
    }

    #[must_use]
    pub const fn markers(&self) -> &MarkerPair {
        &self.markers
    }

    #[must_use]
    pub const fn state(&self) -> ScrubState {
        self.state
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.closed || self.state == ScrubState::Cancelled
    }

    /// Apply one command. Errors leave the session untouched.
    pub fn apply(&mut self, command: ScrubCommand) -> Result<ScrubEvent, ScrubError> {
        if self.is_finished() {
            return Ok(ScrubEvent::Ignored);
        }

        match command {
            ScrubCommand::SeekRelative(delta) => {
                self.cursor = self.timeline.clamp(self.cursor + delta as f64);
                Ok(ScrubEvent::Moved(self.cursor))
            }
            ScrubCommand::SeekAbsolute(ratio) => {
                if !(0.0..=1.0).contains(&ratio) {
                    return Err(ScrubError::InvalidSeek(ratio));
                }
                let target = self.timeline.snap(ratio * self.timeline.length);
                self.cursor = self.timeline.clamp(target);
                Ok(ScrubEvent::Moved(self.cursor))
            }
            ScrubCommand::Mark => self.mark(),
            ScrubCommand::Reset => {
                self.markers = MarkerPair::default();
                self.state = ScrubState::AwaitingStart;
                Ok(ScrubEvent::Reset)
            }
            ScrubCommand::Quit => {
                if self.state == ScrubState::Committed {
                    self.closed = true;
                } else {
                    self.state = ScrubState::Cancelled;
                }
                Ok(ScrubEvent::Closed)
            }
        }
    }

    fn mark(&mut self) -> Result<ScrubEvent, ScrubError> {
        let position = self.cursor;
        match (self.state, self.mode) {
            (ScrubState::AwaitingStart, SelectionMode::Range) => {
                self.markers.start = Some(position);
                self.state = ScrubState::AwaitingEnd;
                Ok(ScrubEvent::StartMarked(position))
            }
            (ScrubState::AwaitingStart, SelectionMode::Point) => {
                self.markers.start = Some(position);
                self.state = ScrubState::Committed;
                Ok(ScrubEvent::PointMarked(position))
            }
            (ScrubState::AwaitingEnd, _) => {
                let start = self.markers.start.unwrap_or(0.0);
                if position <= start {
                    return Err(ScrubError::OrderingViolation {
                        start,
                        end: position,
                    });
                }
                self.markers.end = Some(position);
                self.state = ScrubState::Committed;
                Ok(ScrubEvent::EndMarked(position))
            }
            _ => Ok(ScrubEvent::Ignored),
        }
    }

    /// Consume the session, yielding the markers only if it closed committed.
    #[must_use]
    pub fn into_outcome(self) -> ScrubOutcome {
        if self.closed && self.state == ScrubState::Committed {
            ScrubOutcome::Selected(self.markers)
        } else {
            ScrubOutcome::NoSelection
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(cursor: f64) -> ScrubSession {
        let timeline = Timeline::new(100.0, 44_100.0).unwrap();
        let mut session = ScrubSession::new(timeline, SelectionMode::Range).with_cursor(cursor);
        session.begin();
        session
    }

    #[test]
    fn test_timeline_rejects_empty_media() {
        assert!(Timeline::new(0.0, 44_100.0).is_err());
        assert!(Timeline::new(10.0, 0.0).is_err());
        assert!(Timeline::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_new_session_is_idle_until_begin() {
        let timeline = Timeline::new(10.0, 30.0).unwrap();
        let mut session = ScrubSession::new(timeline, SelectionMode::Range);
        assert_eq!(session.state(), ScrubState::Idle);
        assert_eq!(session.apply(ScrubCommand::Mark), Ok(ScrubEvent::Ignored));
        assert!(session.markers().is_empty());
        session.begin();
        assert_eq!(session.state(), ScrubState::AwaitingStart);
    }

    #[test]
    fn test_mark_seek_mark_commits() {
        let mut session = session_at(2.0);
        session.apply(ScrubCommand::Mark).unwrap();
        session.apply(ScrubCommand::SeekRelative(5)).unwrap();
        session.apply(ScrubCommand::Mark).unwrap();

        assert_eq!(session.state(), ScrubState::Committed);
        assert_eq!(session.markers().start, Some(2.0));
        assert_eq!(session.markers().end, Some(7.0));

        session.apply(ScrubCommand::Quit).unwrap();
        assert!(session.is_finished());
        assert_eq!(
            session.into_outcome(),
            ScrubOutcome::Selected(MarkerPair {
                start: Some(2.0),
                end: Some(7.0)
            })
        );
    }

    #[test]
    fn test_mark_twice_is_ordering_violation() {
        let mut session = session_at(2.0);
        session.apply(ScrubCommand::Mark).unwrap();
        let err = session.apply(ScrubCommand::Mark).unwrap_err();

        assert_eq!(
            err,
            ScrubError::OrderingViolation {
                start: 2.0,
                end: 2.0
            }
        );
        assert_eq!(session.state(), ScrubState::AwaitingEnd);
        assert_eq!(session.markers().end, None);
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut session = session_at(50.0);
        session.apply(ScrubCommand::Mark).unwrap();
        session.apply(ScrubCommand::SeekRelative(-10)).unwrap();
        assert!(session.apply(ScrubCommand::Mark).is_err());
        assert_eq!(session.state(), ScrubState::AwaitingEnd);
    }

    #[test]
    fn test_reset_from_committed_then_quit_is_no_selection() {
        let mut session = session_at(2.0);
        session.apply(ScrubCommand::Mark).unwrap();
        session.apply(ScrubCommand::SeekRelative(5)).unwrap();
        session.apply(ScrubCommand::Mark).unwrap();

        assert_eq!(session.apply(ScrubCommand::Reset), Ok(ScrubEvent::Reset));
        assert_eq!(session.state(), ScrubState::AwaitingStart);
        assert!(session.markers().is_empty());

        session.apply(ScrubCommand::Quit).unwrap();
        assert_eq!(session.state(), ScrubState::Cancelled);
        assert_eq!(session.into_outcome(), ScrubOutcome::NoSelection);
    }

    #[test]
    fn test_quit_while_awaiting_end_discards_start() {
        let mut session = session_at(2.0);
        session.apply(ScrubCommand::Mark).unwrap();
        session.apply(ScrubCommand::Quit).unwrap();
        assert_eq!(session.into_outcome(), ScrubOutcome::NoSelection);
    }

    #[test]
    fn test_mark_in_committed_is_noop() {
        let mut session = session_at(2.0);
        session.apply(ScrubCommand::Mark).unwrap();
        session.apply(ScrubCommand::SeekRelative(1)).unwrap();
        session.apply(ScrubCommand::Mark).unwrap();
        session.apply(ScrubCommand::SeekRelative(10)).unwrap();
        assert_eq!(session.apply(ScrubCommand::Mark), Ok(ScrubEvent::Ignored));
        assert_eq!(session.markers().end, Some(3.0));
    }

    #[test]
    fn test_commands_after_finish_are_ignored() {
        let mut session = session_at(2.0);
        session.apply(ScrubCommand::Quit).unwrap();
        assert_eq!(
            session.apply(ScrubCommand::SeekRelative(5)),
            Ok(ScrubEvent::Ignored)
        );
        assert_eq!(session.apply(ScrubCommand::Reset), Ok(ScrubEvent::Ignored));
        assert!((session.cursor() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_seek_is_clamped() {
        let mut session = session_at(2.0);
        session.apply(ScrubCommand::SeekRelative(-10)).unwrap();
        assert!(session.cursor().abs() < f64::EPSILON);

        session.apply(ScrubCommand::SeekRelative(1_000)).unwrap();
        let last = session.timeline().last_position();
        assert!((session.cursor() - last).abs() < f64::EPSILON);
        assert!(session.cursor() < 100.0);
    }

    #[test]
    fn test_seek_absolute() {
        let mut session = session_at(0.0);
        session.apply(ScrubCommand::SeekAbsolute(0.25)).unwrap();
        assert!((session.cursor() - 25.0).abs() < 1e-9);

        session.apply(ScrubCommand::SeekAbsolute(1.0)).unwrap();
        assert!(session.cursor() < 100.0);
    }

    #[test]
    fn test_invalid_seek_leaves_state() {
        let mut session = session_at(12.0);
        assert_eq!(
            session.apply(ScrubCommand::SeekAbsolute(1.5)),
            Err(ScrubError::InvalidSeek(1.5))
        );
        assert!(session.apply(ScrubCommand::SeekAbsolute(f64::NAN)).is_err());
        assert!((session.cursor() - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_point_mode_commits_on_first_mark() {
        let timeline = Timeline::new(30.0, 25.0).unwrap();
        let mut session = ScrubSession::new(timeline, SelectionMode::Point).with_cursor(4.0);
        session.begin();
        assert_eq!(
            session.apply(ScrubCommand::Mark),
            Ok(ScrubEvent::PointMarked(4.0))
        );
        assert_eq!(session.state(), ScrubState::Committed);
        session.apply(ScrubCommand::Quit).unwrap();
        assert_eq!(session.into_outcome().point(), Some(4.0));
    }

    #[test]
    fn test_reset_is_reentrant() {
        let mut session = session_at(5.0);
        session.apply(ScrubCommand::Reset).unwrap();
        session.apply(ScrubCommand::Mark).unwrap();
        session.apply(ScrubCommand::Reset).unwrap();
        assert_eq!(session.state(), ScrubState::AwaitingStart);
        assert!(session.markers().is_empty());
    }
}
