use super::collaborators::{MediaSource, TagWriter, Transcoder};
use crate::component::scrub_session::{
    ScrubDriver, ScrubOutcome, ScrubSession, SelectionMode, Timeline, run_session,
};
use crate::error::{AppError, AppResult};
use crate::tools::{
    SearchResult, TagFields, TrimRange, ensure_directory_exists, image_to_jpeg, is_url,
    mp3_file_name, validate_file_exists,
};
use anyhow::{Context, anyhow};
use log::{info, warn};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Scrub resolution when ffprobe reports no sample rate.
pub const DEFAULT_AUDIO_RESOLUTION: f64 = 1_000.0;
/// Scrub resolution when ffprobe reports no frame rate.
pub const DEFAULT_FRAME_RATE: f64 = 25.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Acquired {
    pub file: PathBuf,
    pub title: String,
    pub source_url: String,
}

pub enum TrimMode<'d> {
    Manual {
        start: Option<f64>,
        end: Option<f64>,
    },
    Interactive(&'d mut dyn ScrubDriver),
}

#[derive(Debug)]
pub enum TrimOutcome {
    Trimmed { file: PathBuf, range: TrimRange },
    /// The input is kept; `reason` is `None` when the range covered the whole file.
    Unchanged {
        file: PathBuf,
        reason: Option<AppError>,
    },
}

impl TrimOutcome {
    #[must_use]
    pub fn file(&self) -> &Path {
        match self {
            Self::Trimmed { file, .. } | Self::Unchanged { file, .. } => file,
        }
    }

    #[must_use]
    pub fn into_file(self) -> PathBuf {
        match self {
            Self::Trimmed { file, .. } | Self::Unchanged { file, .. } => file,
        }
    }
}

pub enum CoverSource<'d> {
    FrameAt {
        video_url: String,
        timestamp: f64,
    },
    LocalImage(PathBuf),
    InteractiveFrame {
        video_url: String,
        driver: &'d mut dyn ScrubDriver,
    },
}

pub struct TagEdit {
    pub fields: TagFields,
    /// Remove every existing tag before writing.
    pub replace_existing: bool,
}

/// Per-step results of `tag_and_cover`; `None` means the step was not requested.
#[derive(Debug, Default)]
pub struct TagReport {
    pub tags: Option<AppResult<()>>,
    pub cover: Option<AppResult<()>>,
}

impl TagReport {
    pub fn errors(&self) -> impl Iterator<Item = &AppError> {
        [self.tags.as_ref(), self.cover.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(|r| r.as_ref().err())
    }
}

pub struct MediaPipeline<'a> {
    source: &'a dyn MediaSource,
    transcoder: &'a dyn Transcoder,
    tagger: &'a dyn TagWriter,
    work_dir: PathBuf,
    save_dir: PathBuf,
    search_limit: usize,
    video_cache: RefCell<Option<(String, PathBuf)>>,
}

impl<'a> MediaPipeline<'a> {
    pub fn new(
        source: &'a dyn MediaSource,
        transcoder: &'a dyn Transcoder,
        tagger: &'a dyn TagWriter,
        work_dir: &Path,
        save_dir: &Path,
    ) -> Self {
        Self {
            source,
            transcoder,
            tagger,
            work_dir: work_dir.to_path_buf(),
            save_dir: save_dir.to_path_buf(),
            search_limit: crate::config::DEFAULT_SEARCH_LIMIT,
            video_cache: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    #[must_use]
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    #[must_use]
    pub fn transcoder(&self) -> &'a dyn Transcoder {
        self.transcoder
    }

    /// Resolve `input` to a downloaded MP3.
    ///
    /// A URL is fetched directly. Anything else is searched and `choose`
    /// picks one of the results; `Ok(None)` from it cancels the run.
    pub fn acquire(
        &self,
        input: &str,
        choose: impl FnOnce(&[SearchResult]) -> AppResult<Option<usize>>,
    ) -> AppResult<Acquired> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::Acquisition("no URL or keywords given".to_string()));
        }

        let url = if is_url(input) {
            input.to_string()
        } else {
            let results = self
                .source
                .search(input, self.search_limit)
                .map_err(|e| AppError::Acquisition(format!("search failed: {e:#}")))?;
            if results.is_empty() {
                return Err(AppError::Acquisition(format!("no results for {input:?}")));
            }

            let index = choose(&results)?
                .ok_or_else(|| AppError::Acquisition("no result selected".to_string()))?;
            results
                .get(index)
                .map(|r| r.link.clone())
                .ok_or_else(|| AppError::Acquisition(format!("no result at index {index}")))?
        };

        let (file, title) = self
            .source
            .fetch_audio(&url, &self.work_dir)
            .map_err(|e| AppError::Acquisition(format!("download failed: {e:#}")))?;

        info!("Downloaded {} as {}", url, file.display());
        Ok(Acquired {
            file,
            title,
            source_url: url,
        })
    }

    /// Cut `file` down to a range. Never fails: on any problem the input
    /// is handed back together with the reason.
    pub fn trim(&self, file: &Path, mode: TrimMode<'_>) -> TrimOutcome {
        let unchanged = |reason: AppError| {
            warn!("Trim skipped for {}: {reason}", file.display());
            TrimOutcome::Unchanged {
                file: file.to_path_buf(),
                reason: Some(reason),
            }
        };

        let info = match self.transcoder.probe(file) {
            Ok(info) => info,
            Err(e) => return unchanged(AppError::External(e)),
        };
        let total = info.duration_seconds;

        let range = match mode {
            TrimMode::Manual { start, end } => TrimRange::from_bounds(total, start, end),
            TrimMode::Interactive(driver) => {
                let resolution = info
                    .sample_rate
                    .map_or(DEFAULT_AUDIO_RESOLUTION, f64::from);
                let timeline = match Timeline::new(total, resolution) {
                    Ok(timeline) => timeline,
                    Err(e) => return unchanged(AppError::External(anyhow!(e))),
                };
                let session = ScrubSession::new(timeline, SelectionMode::Range);
                match run_session(file, session, driver) {
                    Ok(ScrubOutcome::Selected(markers)) => TrimRange::from_markers(&markers, total),
                    Ok(ScrubOutcome::NoSelection) => return unchanged(AppError::IncompleteSelection),
                    Err(e) => return unchanged(AppError::External(e)),
                }
            }
        };

        let range = match range {
            Ok(range) => range,
            Err(e) => return unchanged(e.into()),
        };

        if range.covers_whole(total) {
            info!("Range covers the whole file, keeping {}", file.display());
            return TrimOutcome::Unchanged {
                file: file.to_path_buf(),
                reason: None,
            };
        }

        match self.transcoder.reencode(file, &range) {
            Ok(trimmed) => {
                info!(
                    "Trimmed {} to {:.2}-{:.2}s",
                    file.display(),
                    range.start(),
                    range.end()
                );
                TrimOutcome::Trimmed {
                    file: trimmed,
                    range,
                }
            }
            Err(e) => unchanged(AppError::External(e)),
        }
    }

    /// Write tags and a front cover. Each step fails on its own and is
    /// reported in the returned `TagReport`.
    pub fn tag_and_cover(
        &self,
        file: &Path,
        tags: Option<&TagEdit>,
        cover: Option<CoverSource<'_>>,
    ) -> TagReport {
        let tags = tags.map(|edit| apply_tag_edit(self.tagger, file, edit));
        let cover = cover.map(|source| write_cover(self.tagger, file, self.resolve_cover(source)));
        TagReport { tags, cover }
    }

    /// Produce JPEG bytes for a cover.
    fn resolve_cover(&self, source: CoverSource<'_>) -> AppResult<Vec<u8>> {
        let cover_err = |e: anyhow::Error| AppError::CoverWrite(format!("{e:#}"));

        match source {
            CoverSource::LocalImage(path) => local_cover(&path),
            CoverSource::FrameAt {
                video_url,
                timestamp,
            } => {
                let video = self.video_for(&video_url).map_err(cover_err)?;
                self.grab_frame(&video, timestamp).map_err(cover_err)
            }
            CoverSource::InteractiveFrame { video_url, driver } => {
                let video = self.video_for(&video_url).map_err(cover_err)?;
                let info = self.transcoder.probe(&video).map_err(cover_err)?;
                let timeline = Timeline::new(
                    info.duration_seconds,
                    info.frame_rate.unwrap_or(DEFAULT_FRAME_RATE),
                )
                .map_err(|e| AppError::CoverWrite(e.to_string()))?;
                let session = ScrubSession::new(timeline, SelectionMode::Point);

                let outcome = run_session(&video, session, driver).map_err(cover_err)?;
                let timestamp = outcome.point().ok_or(AppError::IncompleteSelection)?;
                self.grab_frame(&video, timestamp).map_err(cover_err)
            }
        }
    }

    fn grab_frame(&self, video: &Path, timestamp: f64) -> anyhow::Result<Vec<u8>> {
        let frame = self.work_dir.join(format!(
            "cover-{}.jpg",
            uuid::Uuid::new_v4().simple()
        ));
        self.transcoder.extract_frame(video, timestamp, &frame)?;
        image_to_jpeg(&frame)
    }

    /// Download the video for `url` once per pipeline.
    pub fn video_for(&self, url: &str) -> anyhow::Result<PathBuf> {
        if let Some((cached_url, path)) = self.video_cache.borrow().as_ref() {
            if cached_url == url && path.exists() {
                return Ok(path.clone());
            }
        }

        let path = self
            .source
            .fetch_video(url, &self.work_dir)
            .with_context(|| format!("Failed to download video for {url}"))?;
        *self.video_cache.borrow_mut() = Some((url.to_string(), path.clone()));
        Ok(path)
    }

    /// Where `finalize` would write `file` for a given desired name.
    #[must_use]
    pub fn target_path(&self, file: &Path, desired_name: Option<&str>) -> PathBuf {
        let name = desired_name
            .and_then(mp3_file_name)
            .or_else(|| file.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "audio.mp3".to_string());
        self.save_dir.join(name)
    }

    /// Copy `file` into the save directory under its final name.
    pub fn finalize(&self, file: &Path, desired_name: Option<&str>) -> AppResult<PathBuf> {
        let target = self.target_path(file, desired_name);

        if same_file(file, &target) {
            info!("{} is already in place", target.display());
            return Ok(target);
        }

        ensure_directory_exists(&self.save_dir)?;
        fs::copy(file, &target)?;
        info!("Saved {} to {}", file.display(), target.display());
        Ok(target)
    }
}

/// Tag edits and a cover from a local image, for a file already on disk.
/// Needs no download, work directory or ffmpeg.
pub fn tag_local_file(
    tagger: &dyn TagWriter,
    file: &Path,
    tags: Option<&TagEdit>,
    image: Option<&Path>,
) -> TagReport {
    TagReport {
        tags: tags.map(|edit| apply_tag_edit(tagger, file, edit)),
        cover: image.map(|path| write_cover(tagger, file, local_cover(path))),
    }
}

fn apply_tag_edit(tagger: &dyn TagWriter, file: &Path, edit: &TagEdit) -> AppResult<()> {
    let tag_err = |e: anyhow::Error| {
        let err = AppError::TagWrite(format!("{e:#}"));
        warn!("{err}");
        err
    };
    if edit.replace_existing {
        tagger.clear_all(file).map_err(tag_err)?;
    }
    if !edit.fields.is_empty() {
        tagger.write_tags(file, &edit.fields).map_err(tag_err)?;
    }
    info!("Tags updated for {}", file.display());
    Ok(())
}

fn local_cover(path: &Path) -> AppResult<Vec<u8>> {
    let cover_err = |e: anyhow::Error| AppError::CoverWrite(format!("{e:#}"));
    validate_file_exists(path).map_err(cover_err)?;
    image_to_jpeg(path).map_err(cover_err)
}

fn write_cover(tagger: &dyn TagWriter, file: &Path, jpeg: AppResult<Vec<u8>>) -> AppResult<()> {
    jpeg.and_then(|jpeg| {
        tagger
            .write_cover(file, &jpeg)
            .map_err(|e| AppError::CoverWrite(format!("{e:#}")))
    })
    .inspect(|_| info!("Cover written to {}", file.display()))
    .inspect_err(|e| warn!("{e}"))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::path::absolute(a), std::path::absolute(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
