//! Time code parsing and formatting
//!
//! Accepted input shapes: empty (0), `SS[.frac]`, `MM:SS[.frac]`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time format: {input:?}")]
pub struct FormatError {
    pub input: String,
}

impl FormatError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

/// Parse `SS` or `MM:SS` into seconds.
///
/// Negative values are passed through unchanged; callers clamp them
/// against the media bounds.
pub fn parse(text: &str) -> Result<f64, FormatError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0.0);
    }

    let seconds = if text.contains(':') {
        let parts: Vec<&str> = text.split(':').collect();
        let [minutes, secs] = parts.as_slice() else {
            return Err(FormatError::new(text));
        };
        let minutes: i64 = minutes
            .trim()
            .parse()
            .map_err(|_| FormatError::new(text))?;
        let secs: f64 = secs.trim().parse().map_err(|_| FormatError::new(text))?;
        minutes as f64 * 60.0 + secs
    } else {
        text.parse::<f64>().map_err(|_| FormatError::new(text))?
    };

    if !seconds.is_finite() {
        return Err(FormatError::new(text));
    }

    Ok(seconds)
}

/// Format seconds as `M:SS`, truncating the sub-second part.
#[must_use]
pub fn format(seconds: f64) -> String {
    // NaN and negatives saturate to 0 in the cast
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_seconds() {
        assert!((parse("90").unwrap() - 90.0).abs() < f64::EPSILON);
        assert!((parse("12.5").unwrap() - 12.5).abs() < f64::EPSILON);
        assert!((parse("  7 ").unwrap() - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_minutes_seconds() {
        assert!((parse("1:30").unwrap() - 90.0).abs() < f64::EPSILON);
        assert!((parse("0:05.25").unwrap() - 5.25).abs() < f64::EPSILON);
        assert!((parse("10:00").unwrap() - 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_empty_is_zero() {
        assert!(parse("").unwrap().abs() < f64::EPSILON);
        assert!(parse("   ").unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert_eq!(parse("1:2:3"), Err(FormatError::new("1:2:3")));
        assert!(parse(":30").is_err());
        assert!(parse("1:").is_err());
        assert!(parse("1.5:30").is_err());
        assert!(parse("abc").is_err());
        assert!(parse("nan").is_err());
        assert!(parse("inf").is_err());
    }

    #[test]
    fn test_parse_accepts_negative() {
        assert!((parse("-5").unwrap() + 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_format() {
        assert_eq!(format(0.0), "0:00");
        assert_eq!(format(59.99), "0:59");
        assert_eq!(format(90.0), "1:30");
        assert_eq!(format(3600.0), "60:00");
        assert_eq!(format(-3.0), "0:00");
        assert_eq!(format(f64::NAN), "0:00");
    }

    #[test]
    fn test_round_trip_whole_seconds() {
        for x in [0.0, 1.0, 59.0, 60.0, 61.0, 90.0, 599.0, 3725.0] {
            assert!((parse(&format(x)).unwrap() - x).abs() < f64::EPSILON);
        }
    }
}
