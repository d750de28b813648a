use crate::tools::TrimRange;
use anyhow::{Context, Result, bail};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_BITRATE: &str = "320k";
const TRIM_SUFFIX: &str = "trim";

/// Re-encode a segment of an audio file to fixed-bitrate MP3.
pub struct FfmpegCommand {
    source_path: PathBuf,
    destination_path: PathBuf,
    range: TrimRange,
    bitrate: String,
}

impl FfmpegCommand {
    #[must_use]
    pub fn new(source_path: &Path, range: TrimRange, bitrate: &str) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            destination_path: append_suffix(source_path, TRIM_SUFFIX),
            range,
            bitrate: bitrate.to_string(),
        }
    }

    #[must_use]
    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new("ffmpeg");

        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]);
        cmd.args(["-ss", &format!("{:.3}", self.range.start())]);
        cmd.arg("-i").arg(&self.source_path);
        cmd.args([
            "-t",
            &format!("{:.3}", self.range.duration()),
            "-map",
            "0:a:0",
            "-vn",
            "-map_metadata",
            "-1",
            "-c:a",
            "libmp3lame",
            "-b:a",
            &self.bitrate,
            "-f",
            "mp3",
        ]);
        cmd.arg(&self.destination_path);

        cmd
    }

    pub fn run(&self) -> Result<PathBuf> {
        let mut cmd = self.build_command();
        debug!("Running {cmd:?}");

        let output = cmd
            .output()
            .with_context(|| format!("Failed to run ffmpeg on {}", self.source_path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("ffmpeg re-encode failed: {}", stderr.trim());
        }
        if !self.destination_path.exists() {
            bail!("ffmpeg produced no output at {}", self.destination_path.display());
        }

        Ok(self.destination_path.clone())
    }
}

/// `dir/name.mp3` -> `dir/name__suffix.mp3`
#[must_use]
pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let file_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}__{suffix}.{ext}"),
        None => format!("{stem}__{suffix}"),
    };
    path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_destination_path() {
        let range = TrimRange::from_bounds(60.0, Some(10.0), Some(40.0)).unwrap();
        let cmd = FfmpegCommand::new(Path::new("/tmp/work/Song Title.mp3"), range, "320k");
        assert_eq!(
            cmd.destination_path(),
            Path::new("/tmp/work/Song Title__trim.mp3")
        );
    }

    #[test]
    fn test_append_suffix_with_dots() {
        assert_eq!(
            append_suffix(Path::new("/a/b.c.mp3"), "trim"),
            PathBuf::from("/a/b.c__trim.mp3")
        );
        assert_eq!(
            append_suffix(Path::new("/a/noext"), "trim"),
            PathBuf::from("/a/noext__trim")
        );
    }

    #[test]
    fn test_build_command_segment() {
        let range = TrimRange::from_bounds(60.0, Some(10.0), Some(40.0)).unwrap();
        let cmd = FfmpegCommand::new(Path::new("/w/in.mp3"), range, "192k");
        let args = args_of(&cmd.build_command());

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], "10.000");
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "30.000");
        let b = args.iter().position(|a| a == "-b:a").unwrap();
        assert_eq!(args[b + 1], "192k");
        assert_eq!(args.last().map(String::as_str), Some("/w/in__trim.mp3"));
        // input seek must come before -i
        assert!(ss < args.iter().position(|a| a == "-i").unwrap());
    }
}
