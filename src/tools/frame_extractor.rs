use anyhow::{Context, Result, bail};
use log::debug;
use std::path::Path;
use std::process::Command;

/// Pre-roll for the two-stage seek, in seconds.
const SEEK_MARGIN: f64 = 2.0;

/// Build ffmpeg arguments that write the frame at `timestamp` as a JPEG.
///
/// Two-stage seek: `-ss` before `-i` jumps to a nearby keyframe, `-ss`
/// after `-i` decodes forward to the exact time.
fn build_args(video_path: &Path, timestamp: f64, output_path: &Path) -> Vec<String> {
    let timestamp = timestamp.max(0.0);
    let t0 = (timestamp - SEEK_MARGIN).max(0.0);
    let delta = timestamp - t0;

    let mut args = vec![
        "-hide_banner".to_string(),
        "-nostdin".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
    ];

    if t0 > 0.0 {
        args.push("-ss".to_string());
        args.push(format!("{t0:.3}"));
    }

    args.push("-i".to_string());
    args.push(video_path.to_string_lossy().to_string());

    if delta > 0.0 {
        args.push("-ss".to_string());
        args.push(format!("{delta:.3}"));
    }

    args.extend([
        "-frames:v".to_string(),
        "1".to_string(),
        "-an".to_string(),
        "-sn".to_string(),
        "-dn".to_string(),
        "-q:v".to_string(),
        "2".to_string(),
        "-y".to_string(),
        output_path.to_string_lossy().to_string(),
    ]);

    args
}

/// Extract one frame from a local video file.
pub fn extract_frame(video_path: &Path, timestamp: f64, output_path: &Path) -> Result<()> {
    let args = build_args(video_path, timestamp, output_path);
    debug!("Extracting frame at {timestamp:.2}s: ffmpeg {}", args.join(" "));

    let output = Command::new("ffmpeg")
        .args(&args)
        .output()
        .with_context(|| format!("Failed to run ffmpeg on {}", video_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffmpeg frame extraction failed: {}", stderr.trim());
    }

    // seeking past the last frame exits 0 without writing anything
    if !output_path.exists() {
        bail!(
            "No frame at {timestamp:.2}s in {}",
            video_path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_two_stage_seek() {
        let args = build_args(Path::new("/v.mp4"), 10.0, Path::new("/c.jpg"));
        let first = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(first < input);
        assert_eq!(args[first + 1], "8.000");
        let second = args.iter().rposition(|a| a == "-ss").unwrap();
        assert!(second > input);
        assert_eq!(args[second + 1], "2.000");
        assert_eq!(args.last().map(String::as_str), Some("/c.jpg"));
    }

    #[test]
    fn test_build_args_near_start() {
        let args = build_args(Path::new("/v.mp4"), 1.0, Path::new("/c.jpg"));
        assert_eq!(args.iter().filter(|a| *a == "-ss").count(), 1);
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert!(ss > args.iter().position(|a| a == "-i").unwrap());
    }

    #[test]
    fn test_build_args_negative_clamps() {
        let args = build_args(Path::new("/v.mp4"), -4.0, Path::new("/c.jpg"));
        assert!(!args.iter().any(|a| a == "-ss"));
    }
}
