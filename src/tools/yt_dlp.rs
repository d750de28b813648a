//! yt-dlp wrapper: search, audio download, video download

use crate::tools::timecode;
use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const VIDEO_BASENAME: &str = "cover_source";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub channel: Option<String>,
    pub duration_text: Option<String>,
    pub link: String,
    pub view_count_text: Option<String>,
    pub published_time: Option<String>,
}

impl SearchResult {
    /// One-line summary for the selection list.
    #[must_use]
    pub fn summary(&self) -> String {
        let unknown = "?";
        format!(
            "{}  | {}  | {}  | {}",
            self.title,
            self.channel.as_deref().unwrap_or(unknown),
            self.duration_text.as_deref().unwrap_or(unknown),
            self.view_count_text.as_deref().unwrap_or(unknown),
        )
    }
}

#[derive(Deserialize)]
struct FlatEntry {
    id: Option<String>,
    title: Option<String>,
    url: Option<String>,
    webpage_url: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
    view_count: Option<u64>,
    upload_date: Option<String>,
}

impl FlatEntry {
    fn into_result(self) -> Option<SearchResult> {
        let link = self
            .webpage_url
            .or(self.url)
            .or_else(|| {
                self.id
                    .as_ref()
                    .map(|id| format!("https://www.youtube.com/watch?v={id}"))
            })?;

        Some(SearchResult {
            title: self.title.unwrap_or_else(|| link.clone()),
            channel: self.channel.or(self.uploader),
            duration_text: self.duration.map(timecode::format),
            link,
            view_count_text: self.view_count.map(format_views),
            published_time: self.upload_date.as_deref().and_then(format_upload_date),
        })
    }
}

#[must_use]
pub fn is_url(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

/// `1234567` -> `1,234,567 views`
fn format_views(count: u64) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{grouped} views")
}

/// `20090707` -> `2009-07-07`
fn format_upload_date(raw: &str) -> Option<String> {
    if raw.len() != 8 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}-{}-{}", &raw[..4], &raw[4..6], &raw[6..]))
}

/// Parse `--dump-json` output (one JSON object per line).
pub fn parse_search_output(stdout: &str) -> Vec<SearchResult> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<FlatEntry>(line) {
            Ok(entry) => entry.into_result(),
            Err(e) => {
                warn!("Skipping unreadable search entry: {e}");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct YtDlp {
    audio_quality: String,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("320K")
    }
}

impl YtDlp {
    #[must_use]
    pub fn new(audio_quality: &str) -> Self {
        Self {
            audio_quality: audio_quality.to_string(),
        }
    }

    /// Build from an ffmpeg-style bitrate such as `320k`.
    #[must_use]
    pub fn from_bitrate(bitrate: &str) -> Self {
        Self::new(&bitrate.to_uppercase())
    }

    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let output = Command::new("yt-dlp")
            .args(["--flat-playlist", "--dump-json", "--no-warnings"])
            .arg(format!("ytsearch{limit}:{query}"))
            .output()
            .context("Failed to run yt-dlp search")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("yt-dlp search failed: {}", stderr.trim());
        }

        let mut results = parse_search_output(&String::from_utf8_lossy(&output.stdout));
        results.truncate(limit);
        info!("Search {query:?} returned {} results", results.len());
        Ok(results)
    }

    /// Download the best audio of `url` as MP3 into `out_dir`.
    /// Returns the MP3 path and the video title.
    pub fn fetch_audio(&self, url: &str, out_dir: &Path) -> Result<(PathBuf, String)> {
        fs::create_dir_all(out_dir)?;
        let template = out_dir.join("%(title)s.%(ext)s");

        let mut cmd = Command::new("yt-dlp");
        cmd.args([
            "-f",
            "bestaudio/best",
            "-x",
            "--audio-format",
            "mp3",
            "--audio-quality",
            &self.audio_quality,
            "--no-playlist",
            "--no-simulate",
            "--no-warnings",
            "--print",
            "after_move:title",
            "--print",
            "after_move:filepath",
            "-o",
        ])
        .arg(&template)
        .arg(url);
        debug!("Running {cmd:?}");

        let output = cmd.output().context("Failed to run yt-dlp")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("yt-dlp download failed: {}", stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
        let title = lines.next().unwrap_or("audio").to_string();
        let reported = lines.next().map(PathBuf::from);

        let path = match reported.filter(|p| p.exists()) {
            Some(path) => path,
            None => find_first_mp3(out_dir)?,
        };

        Ok((path, title))
    }

    /// Download the video of `url` as MP4 for frame extraction.
    pub fn fetch_video(&self, url: &str, out_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(out_dir)?;
        let template = out_dir.join(format!("{VIDEO_BASENAME}.%(ext)s"));

        let output = Command::new("yt-dlp")
            .args([
                "-f",
                "bestvideo+bestaudio/best",
                "--merge-output-format",
                "mp4",
                "--no-playlist",
                "--no-simulate",
                "--no-warnings",
                "--print",
                "after_move:filepath",
                "-o",
            ])
            .arg(&template)
            .arg(url)
            .output()
            .context("Failed to run yt-dlp")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("yt-dlp video download failed: {}", stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(PathBuf::from)
            .find(|p| p.exists())
            .with_context(|| format!("Video file not found after downloading {url}"))
    }
}

/// yt-dlp may sanitise the title differently than reported.
fn find_first_mp3(dir: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| crate::tools::is_mp3(p))
        .collect();
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .with_context(|| format!("MP3 not found after download in {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://youtu.be/abc"));
        assert!(is_url("http://example.com"));
        assert!(!is_url("john mayer human nature"));
        assert!(!is_url("ftp://example.com"));
    }

    #[test]
    fn test_format_views() {
        assert_eq!(format_views(0), "0 views");
        assert_eq!(format_views(999), "999 views");
        assert_eq!(format_views(1_000), "1,000 views");
        assert_eq!(format_views(1_234_567), "1,234,567 views");
    }

    #[test]
    fn test_format_upload_date() {
        assert_eq!(format_upload_date("20090707"), Some("2009-07-07".to_string()));
        assert_eq!(format_upload_date("2009"), None);
        assert_eq!(format_upload_date("2009070x"), None);
    }

    #[test]
    fn test_parse_search_output() {
        let stdout = concat!(
            r#"{"id": "abc123", "title": "Human Nature (Live)", "url": "https://www.youtube.com/watch?v=abc123", "channel": "John Mayer", "duration": 245.0, "view_count": 1234567}"#,
            "\n",
            "not json\n",
            r#"{"id": "def456", "title": "Other", "uploader": "Someone", "upload_date": "20090707"}"#,
            "\n"
        );
        let results = parse_search_output(stdout);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Human Nature (Live)");
        assert_eq!(results[0].link, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(results[0].channel.as_deref(), Some("John Mayer"));
        assert_eq!(results[0].duration_text.as_deref(), Some("4:05"));
        assert_eq!(
            results[0].view_count_text.as_deref(),
            Some("1,234,567 views")
        );

        assert_eq!(results[1].link, "https://www.youtube.com/watch?v=def456");
        assert_eq!(results[1].channel.as_deref(), Some("Someone"));
        assert_eq!(results[1].duration_text, None);
        assert_eq!(results[1].published_time.as_deref(), Some("2009-07-07"));
    }

    #[test]
    fn test_summary_marks_unknown_fields() {
        let result = SearchResult {
            title: "T".to_string(),
            channel: None,
            duration_text: Some("1:00".to_string()),
            link: "https://x".to_string(),
            view_count_text: None,
            published_time: None,
        };
        assert_eq!(result.summary(), "T  | ?  | 1:00  | ?");
    }

    #[test]
    fn test_find_first_mp3() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.mp3"), b"").unwrap();
        fs::write(dir.path().join("a.webm"), b"").unwrap();
        fs::write(dir.path().join("c.MP3"), b"").unwrap();
        assert_eq!(find_first_mp3(dir.path()).unwrap(), dir.path().join("b.mp3"));

        let empty = tempfile::tempdir().unwrap();
        assert!(find_first_mp3(empty.path()).is_err());
    }
}
