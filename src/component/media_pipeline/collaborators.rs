//! External tools the pipeline delegates to

use crate::tools::{
    self, FfmpegCommand, MediaInfo, SearchResult, TagFields, TrimRange, YtDlp, id3_tagger,
};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Search and download.
pub trait MediaSource {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;

    /// Download audio as MP3 into `out_dir`; returns the file and its title.
    fn fetch_audio(&self, url: &str, out_dir: &Path) -> Result<(PathBuf, String)>;

    /// Download the video for frame extraction.
    fn fetch_video(&self, url: &str, out_dir: &Path) -> Result<PathBuf>;
}

/// Probing, clipping and frame grabs.
pub trait Transcoder {
    fn probe(&self, media: &Path) -> Result<MediaInfo>;

    /// Re-encode `range` of `input` to MP3, returning the new file.
    fn reencode(&self, input: &Path, range: &TrimRange) -> Result<PathBuf>;

    fn extract_frame(&self, video: &Path, timestamp: f64, output: &Path) -> Result<()>;

    /// Normalised peak envelope, one value per column.
    fn waveform(&self, media: &Path, columns: usize) -> Result<Vec<f32>>;
}

/// Tag and cover writing.
pub trait TagWriter {
    fn write_tags(&self, file: &Path, fields: &TagFields) -> Result<()>;
    fn write_cover(&self, file: &Path, jpeg: &[u8]) -> Result<()>;
    fn clear_all(&self, file: &Path) -> Result<()>;
}

impl MediaSource for YtDlp {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        Self::search(self, query, limit)
    }

    fn fetch_audio(&self, url: &str, out_dir: &Path) -> Result<(PathBuf, String)> {
        Self::fetch_audio(self, url, out_dir)
    }

    fn fetch_video(&self, url: &str, out_dir: &Path) -> Result<PathBuf> {
        Self::fetch_video(self, url, out_dir)
    }
}

/// ffmpeg/ffprobe on the PATH.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    bitrate: String,
}

impl Ffmpeg {
    #[must_use]
    pub fn new(bitrate: &str) -> Self {
        Self {
            bitrate: bitrate.to_string(),
        }
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new(tools::DEFAULT_BITRATE)
    }
}

impl Transcoder for Ffmpeg {
    fn probe(&self, media: &Path) -> Result<MediaInfo> {
        tools::get_media_info(media)
    }

    fn reencode(&self, input: &Path, range: &TrimRange) -> Result<PathBuf> {
        FfmpegCommand::new(input, *range, &self.bitrate).run()
    }

    fn extract_frame(&self, video: &Path, timestamp: f64, output: &Path) -> Result<()> {
        tools::extract_frame(video, timestamp, output)
    }

    fn waveform(&self, media: &Path, columns: usize) -> Result<Vec<f32>> {
        tools::load_peaks(media, columns)
    }
}

/// ID3v2.3 through lofty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagger;

impl TagWriter for LoftyTagger {
    fn write_tags(&self, file: &Path, fields: &TagFields) -> Result<()> {
        id3_tagger::write_tags(file, fields)
    }

    fn write_cover(&self, file: &Path, jpeg: &[u8]) -> Result<()> {
        id3_tagger::write_cover(file, jpeg)
    }

    fn clear_all(&self, file: &Path) -> Result<()> {
        id3_tagger::clear_all_tags(file)
    }
}
