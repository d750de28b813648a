use crate::component::scrub_session::MarkerPair;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrimError {
    #[error("end ({end:.2}s) must be greater than start ({start:.2}s)")]
    Range { start: f64, end: f64 },
    #[error("selection is incomplete: both start and end markers are required")]
    IncompleteSelection,
}

/// A validated segment with `0 <= start < end <= length`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimRange {
    start: f64,
    end: f64,
}

impl TrimRange {
    /// Build a range from optional bounds, clamped into `[0, total_length]`.
    pub fn from_bounds(
        total_length: f64,
        start: Option<f64>,
        end: Option<f64>,
    ) -> Result<Self, TrimError> {
        let total = total_length.max(0.0);
        let start = start.unwrap_or(0.0).clamp(0.0, total);
        let end = end.unwrap_or(total).clamp(0.0, total);

        if end <= start {
            return Err(TrimError::Range { start, end });
        }

        Ok(Self { start, end })
    }

    pub fn from_markers(markers: &MarkerPair, total_length: f64) -> Result<Self, TrimError> {
        match (markers.start, markers.end) {
            (Some(start), Some(end)) => Self::from_bounds(total_length, Some(start), Some(end)),
            _ => Err(TrimError::IncompleteSelection),
        }
    }

    #[must_use]
    pub const fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> f64 {
        self.end
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when nothing would be cut from a file of `total_length` seconds.
    #[must_use]
    pub fn covers_whole(&self, total_length: f64) -> bool {
        self.start <= 0.0 && self.end >= total_length
    }
}
