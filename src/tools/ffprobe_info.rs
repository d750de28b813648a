use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub duration_seconds: f64,
    /// Sample rate of the first audio stream.
    pub sample_rate: Option<u32>,
    /// Frame rate of the first video stream.
    pub frame_rate: Option<f64>,
}

impl MediaInfo {
    #[must_use]
    pub const fn has_video(&self) -> bool {
        self.frame_rate.is_some()
    }
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    sample_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    disposition: Option<Disposition>,
}

#[derive(Deserialize)]
struct Disposition {
    #[serde(default)]
    attached_pic: u8,
}

/// Probe duration and stream rates with ffprobe.
pub fn get_media_info(path: &Path) -> Result<MediaInfo> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .with_context(|| format!("Failed to run ffprobe on {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe failed: {}", stderr.trim());
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
        .with_context(|| format!("Unusable ffprobe output for {}", path.display()))
}

fn parse_probe_output(json: &str) -> Result<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_str(json).context("Invalid ffprobe JSON")?;
    let streams = probe.streams.unwrap_or_default();

    let audio = streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));
    // embedded cover art shows up as a video stream; skip it
    let video = streams.iter().find(|s| {
        s.codec_type.as_deref() == Some("video")
            && s.disposition.as_ref().is_none_or(|d| d.attached_pic == 0)
    });

    let duration_seconds = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or_else(|| audio.and_then(|s| s.duration.as_ref()))
        .or_else(|| video.and_then(|s| s.duration.as_ref()))
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| anyhow!("No duration reported"))?;

    let sample_rate = audio
        .and_then(|s| s.sample_rate.as_ref())
        .and_then(|r| r.parse().ok());

    let frame_rate = video
        .and_then(|s| s.r_frame_rate.as_ref())
        .and_then(|r| parse_frame_rate(r));

    Ok(MediaInfo {
        duration_seconds,
        sample_rate,
        frame_rate,
    })
}

/// Parse a frame rate such as "30/1" or "30000/1001".
fn parse_frame_rate(rate: &str) -> Option<f64> {
    if let Some((num_str, den_str)) = rate.split_once('/') {
        let num: f64 = num_str.parse().ok()?;
        let den: f64 = den_str.parse().ok()?;
        if den > 0.0 && num > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate.parse().ok().filter(|r: &f64| *r > 0.0)
}
