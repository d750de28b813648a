use anyhow::{Context, Result, bail};
use log::debug;
use std::path::Path;
use std::process::Command;

/// Decode rate for the envelope; plenty for a terminal-wide track.
const ENVELOPE_SAMPLE_RATE: u32 = 8_000;

/// Decode `path` to mono PCM and reduce it to `columns` peak values in `0..=1`.
pub fn load_peaks(path: &Path, columns: usize) -> Result<Vec<f32>> {
    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-nostdin", "-loglevel", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-ac",
            "1",
            "-ar",
            &ENVELOPE_SAMPLE_RATE.to_string(),
            "-f",
            "s16le",
            "-",
        ])
        .output()
        .with_context(|| format!("Failed to decode {} for waveform", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffmpeg decode failed: {}", stderr.trim());
    }

    let samples: Vec<i16> = output
        .stdout
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();
    debug!("Decoded {} samples for waveform", samples.len());

    Ok(peaks_from_samples(&samples, columns))
}

/// Peak amplitude per column, normalised against the loudest column.
#[must_use]
pub fn peaks_from_samples(samples: &[i16], columns: usize) -> Vec<f32> {
    if samples.is_empty() || columns == 0 {
        return Vec::new();
    }

    let raw: Vec<u16> = (0..columns)
        .map(|col| {
            let begin = col * samples.len() / columns;
            let end = ((col + 1) * samples.len() / columns).max(begin + 1).min(samples.len());
            samples[begin.min(samples.len() - 1)..end]
                .iter()
                .map(|s| s.unsigned_abs())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let loudest = raw.iter().copied().max().unwrap_or(0);
    if loudest == 0 {
        return vec![0.0; columns];
    }

    raw.into_iter()
        .map(|peak| f32::from(peak) / f32::from(loudest))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peaks_normalised() {
        let samples = [0, 100, -200, 50, 1000, -1000, 10, 0];
        let peaks = peaks_from_samples(&samples, 4);
        assert_eq!(peaks.len(), 4);
        assert!((peaks[0] - 0.1).abs() < 1e-6);
        assert!((peaks[1] - 0.2).abs() < 1e-6);
        assert!((peaks[2] - 1.0).abs() < 1e-6);
        assert!((peaks[3] - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_more_columns_than_samples() {
        let peaks = peaks_from_samples(&[500, -1000], 5);
        assert_eq!(peaks.len(), 5);
        assert!(peaks.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_silence_and_empty() {
        assert_eq!(peaks_from_samples(&[0, 0, 0], 2), vec![0.0, 0.0]);
        assert!(peaks_from_samples(&[], 10).is_empty());
        assert!(peaks_from_samples(&[1, 2], 0).is_empty());
    }

    #[test]
    fn test_i16_min_does_not_overflow() {
        let peaks = peaks_from_samples(&[i16::MIN, 0], 1);
        assert!((peaks[0] - 1.0).abs() < 1e-6);
    }
}
