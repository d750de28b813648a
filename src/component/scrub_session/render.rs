//! Text projection of a scrub session
//!
//! Produces plain rows; colouring is left to the terminal driver.

use super::session::{ScrubSession, ScrubState, SelectionMode};
use crate::tools::timecode;
use rust_i18n::t;

pub const CURSOR_GLYPH: char = '▼';
pub const START_GLYPH: char = 'S';
pub const END_GLYPH: char = 'E';
const RULE_GLYPH: char = '─';
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub markers: String,
    pub track: String,
    pub status: String,
}

/// Column for `position` on a track `width` cells wide.
#[must_use]
pub fn column_for(position: f64, length: f64, width: usize) -> usize {
    if width == 0 || length <= 0.0 {
        return 0;
    }
    let ratio = (position / length).clamp(0.0, 1.0);
    ((ratio * width as f64) as usize).min(width - 1)
}

/// Render the session. `peaks` are normalised amplitudes in `0..=1`, one
/// per column; when absent a flat rule is drawn.
#[must_use]
pub fn render(session: &ScrubSession, peaks: Option<&[f32]>, width: usize) -> Frame {
    let width = width.max(1);
    let length = session.timeline().length();
    let markers = session.markers();

    let mut marker_row = vec![' '; width];
    if let Some(start) = markers.start {
        marker_row[column_for(start, length, width)] = START_GLYPH;
    }
    if let Some(end) = markers.end {
        marker_row[column_for(end, length, width)] = END_GLYPH;
    }
    // cursor drawn last so it stays visible over a marker
    marker_row[column_for(session.cursor(), length, width)] = CURSOR_GLYPH;

    let track: String = match peaks {
        Some(peaks) if !peaks.is_empty() => (0..width)
            .map(|col| {
                let index = col * peaks.len() / width;
                block_for(peaks[index.min(peaks.len() - 1)])
            })
            .collect(),
        _ => std::iter::repeat_n(RULE_GLYPH, width).collect(),
    };

    Frame {
        markers: marker_row.into_iter().collect(),
        track,
        status: status_line(session),
    }
}

fn block_for(peak: f32) -> char {
    let level = (peak.clamp(0.0, 1.0) * (BLOCKS.len() - 1) as f32).round() as usize;
    BLOCKS[level.min(BLOCKS.len() - 1)]
}

fn status_line(session: &ScrubSession) -> String {
    let markers = session.markers();
    let show = |value: Option<f64>| value.map_or_else(|| "--".to_string(), timecode::format);

    let hint = match (session.state(), session.mode()) {
        (ScrubState::Idle | ScrubState::AwaitingStart, SelectionMode::Range) => {
            t!("scrub.hint_start")
        }
        (ScrubState::Idle | ScrubState::AwaitingStart, SelectionMode::Point) => {
            t!("scrub.hint_frame")
        }
        (ScrubState::AwaitingEnd, _) => t!("scrub.hint_end"),
        (ScrubState::Committed, _) => t!("scrub.hint_done"),
        (ScrubState::Cancelled, _) => t!("scrub.hint_cancelled"),
    };
    let total = timecode::format(session.timeline().length());

    match session.mode() {
        SelectionMode::Range => t!(
            "scrub.status_range",
            time = timecode::format(session.cursor()),
            total = total,
            start = show(markers.start),
            end = show(markers.end),
            hint = hint
        )
        .to_string(),
        SelectionMode::Point => t!(
            "scrub.status_point",
            time = format!("{:.2}", session.cursor()),
            total = total,
            frame = markers
                .start
                .map_or_else(|| "--".to_string(), |t| format!("{t:.2}s")),
            hint = hint
        )
        .to_string(),
    }
}
