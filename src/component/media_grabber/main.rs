use crate::component::media_pipeline::{
    Acquired, CoverSource, Ffmpeg, LoftyTagger, MediaPipeline, TagEdit, TagReport, TrimMode,
    TrimOutcome,
};
use crate::component::scrub_session::TerminalScrubber;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::tools::{
    Prompter, RetryPolicy, TagFields, WorkDir, YtDlp, spinner, timecode, with_spinner,
};
use console::{Term, style};
use log::{info, warn};
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Attempts allowed for typed time codes before the step is skipped.
const TIME_ATTEMPTS: u32 = 3;

pub(crate) fn optional_time(raw: &str) -> Result<Option<f64>, timecode::FormatError> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        timecode::parse(raw).map(Some)
    }
}

pub struct MediaGrabber {
    config: Config,
    prompter: Prompter,
}

impl MediaGrabber {
    pub fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            prompter: Prompter::new(Term::stdout(), shutdown_signal),
        }
    }

    /// One full download run. Returns the saved file.
    pub fn run(&self) -> AppResult<PathBuf> {
        println!("{}", style(t!("grab.title")).cyan().bold());

        let work_dir = WorkDir::create(&self.config.work_root)
            .map_err(|e| AppError::Configuration(format!("{e:#}")))?;
        let bitrate = &self.config.settings.audio_bitrate;
        let source = YtDlp::from_bitrate(bitrate);
        let transcoder = Ffmpeg::new(bitrate);
        let tagger = LoftyTagger;
        let pipeline = MediaPipeline::new(
            &source,
            &transcoder,
            &tagger,
            work_dir.path(),
            &self.config.save_dir,
        )
        .with_search_limit(self.config.settings.search_limit);

        let acquired = self.acquire(&pipeline)?;
        println!(
            "{}",
            style(t!("grab.downloaded", title = acquired.title)).green()
        );

        let file = self.trim_step(&pipeline, &acquired.file)?;
        self.tag_step(&pipeline, &work_dir, &file, &acquired)?;
        let saved = self.save_step(&pipeline, &file)?;

        println!(
            "{}",
            style(t!("grab.saved", path = saved.display())).green().bold()
        );
        Ok(saved)
    }

    fn acquire(&self, pipeline: &MediaPipeline<'_>) -> AppResult<Acquired> {
        let input = self.prompter.text(t!("grab.query_prompt"))?;

        let bar = spinner(t!("grab.searching"));
        let result = pipeline.acquire(&input, |results| {
            let items: Vec<String> = results
                .iter()
                .enumerate()
                .map(|(i, r)| format!("{:>2}. {}", i + 1, r.summary()))
                .collect();
            let choice = bar.suspend(|| self.prompter.select(t!("grab.pick_result"), &items));
            bar.set_message(t!("grab.downloading").to_string());
            choice
        });
        bar.finish_and_clear();
        result
    }

    fn trim_step(&self, pipeline: &MediaPipeline<'_>, file: &Path) -> AppResult<PathBuf> {
        if !self.prompter.confirm(t!("grab.trim_confirm"))? {
            return Ok(file.to_path_buf());
        }

        let modes = [t!("grab.trim_manual"), t!("grab.trim_interactive")];
        let Some(mode) = self.prompter.select(t!("grab.trim_mode"), &modes)? else {
            return Ok(file.to_path_buf());
        };

        let outcome = if mode == 0 {
            match pipeline.transcoder().probe(file) {
                Ok(info) => println!(
                    "{}",
                    style(t!(
                        "grab.length",
                        length = timecode::format(info.duration_seconds)
                    ))
                    .dim()
                ),
                Err(e) => warn!("Could not probe {}: {e:#}", file.display()),
            }

            let Some((start, end)) = self.read_manual_range()? else {
                return Ok(file.to_path_buf());
            };
            with_spinner(t!("grab.encoding"), || {
                pipeline.trim(file, TrimMode::Manual { start, end })
            })
        } else {
            let transcoder = pipeline.transcoder();
            let mut scrubber =
                TerminalScrubber::new(self.prompter.term().clone(), self.prompter.shutdown_signal())
                    .with_waveform(|media, columns| transcoder.waveform(media, columns));
            pipeline.trim(file, TrimMode::Interactive(&mut scrubber))
        };

        report_trim(&outcome);
        Ok(outcome.into_file())
    }

    /// `Ok(None)` when a time stayed unparsable after all attempts.
    fn read_manual_range(&self) -> AppResult<Option<(Option<f64>, Option<f64>)>> {
        let policy = RetryPolicy::Bounded(TIME_ATTEMPTS);
        let read = |prompt: String| match self
            .prompter
            .parse_with_retry(prompt, policy, optional_time)
        {
            Ok(value) => Ok(Some(value)),
            Err(AppError::Format(e)) => {
                warn!("Giving up on time input: {e}");
                println!("{}", style(t!("grab.trim_skipped", reason = e)).yellow());
                Ok(None)
            }
            Err(e) => Err(e),
        };

        let Some(start) = read(t!("grab.trim_start").to_string())? else {
            return Ok(None);
        };
        let Some(end) = read(t!("grab.trim_end").to_string())? else {
            return Ok(None);
        };
        Ok(Some((start, end)))
    }

    fn tag_step(
        &self,
        pipeline: &MediaPipeline<'_>,
        work_dir: &WorkDir,
        file: &Path,
        acquired: &Acquired,
    ) -> AppResult<()> {
        let tags = if self.prompter.confirm(t!("grab.metadata_confirm"))? {
            Some(TagEdit {
                fields: read_tag_fields(&self.prompter, Some(&acquired.title))?,
                replace_existing: true,
            })
        } else {
            None
        };

        if !self.prompter.confirm(t!("grab.cover_confirm"))? {
            let report = pipeline.tag_and_cover(file, tags.as_ref(), None);
            print_report(&report);
            return Ok(());
        }

        let sources = [
            t!("grab.cover_frame_at"),
            t!("grab.cover_local"),
            t!("grab.cover_interactive"),
        ];
        let choice = self.prompter.select(t!("grab.cover_source"), &sources)?;
        let url = acquired.source_url.clone();

        let report = match choice {
            Some(0) => {
                let timestamp = match self.prompter.parse_with_retry(
                    t!("grab.cover_timestamp"),
                    RetryPolicy::Bounded(TIME_ATTEMPTS),
                    timecode::parse,
                ) {
                    Ok(seconds) => Some(seconds),
                    Err(AppError::Format(e)) => {
                        println!("{}", style(t!("grab.cover_skipped", reason = e)).yellow());
                        None
                    }
                    Err(e) => return Err(e),
                };
                let cover = timestamp
                    .filter(|_| self.prefetch_video(pipeline, &url))
                    .map(|timestamp| CoverSource::FrameAt {
                        video_url: url.clone(),
                        timestamp,
                    });
                pipeline.tag_and_cover(file, tags.as_ref(), cover)
            }
            Some(1) => {
                let cover = read_image_path(&self.prompter)?.map(CoverSource::LocalImage);
                pipeline.tag_and_cover(file, tags.as_ref(), cover)
            }
            Some(_) if self.prefetch_video(pipeline, &url) => {
                let transcoder = pipeline.transcoder();
                let mut scrubber = TerminalScrubber::new(
                    self.prompter.term().clone(),
                    self.prompter.shutdown_signal(),
                )
                .with_preview(|video, at| {
                    let out = work_dir.unique_file("preview", "jpg");
                    transcoder.extract_frame(video, at, &out)?;
                    Ok(out)
                });
                pipeline.tag_and_cover(
                    file,
                    tags.as_ref(),
                    Some(CoverSource::InteractiveFrame {
                        video_url: url,
                        driver: &mut scrubber,
                    }),
                )
            }
            _ => pipeline.tag_and_cover(file, tags.as_ref(), None),
        };

        print_report(&report);
        Ok(())
    }

    /// Download the source video up front so the spinner covers it.
    fn prefetch_video(&self, pipeline: &MediaPipeline<'_>, url: &str) -> bool {
        match with_spinner(t!("grab.downloading_video"), || pipeline.video_for(url)) {
            Ok(_) => true,
            Err(e) => {
                let err = AppError::CoverWrite(format!("{e:#}"));
                warn!("{err}");
                println!("{}", style(err).yellow());
                false
            }
        }
    }

    fn save_step(&self, pipeline: &MediaPipeline<'_>, file: &Path) -> AppResult<PathBuf> {
        println!(
            "{}",
            style(t!(
                "grab.rename_example",
                example = "John Mayer - Human Nature (Michael Jackson Memorial 2009).mp3"
            ))
            .dim()
        );

        loop {
            let name = self.prompter.text(t!("grab.rename_prompt"))?;
            let desired = Some(name.as_str()).filter(|n| !n.is_empty());
            let target = pipeline.target_path(file, desired);

            let overwrites = target.exists()
                && std::path::absolute(&target).ok() != std::path::absolute(file).ok();
            if overwrites
                && !self
                    .prompter
                    .confirm(t!("grab.overwrite_confirm", path = target.display()))?
            {
                continue;
            }

            let saved = pipeline.finalize(file, desired)?;
            info!("Run finished: {}", saved.display());
            return Ok(saved);
        }
    }
}

pub(crate) fn read_tag_fields(prompter: &Prompter, title_hint: Option<&str>) -> AppResult<TagFields> {
    let title_prompt = match title_hint {
        Some(hint) => t!("tags.title_with_hint", hint = hint),
        None => t!("tags.title"),
    };
    let title = prompter.text(title_prompt)?;
    let artist = prompter.text(t!("tags.artist"))?;
    let album = prompter.text(t!("tags.album"))?;
    Ok(TagFields::from_input(&title, &artist, &album))
}

/// Blank input skips the cover.
pub(crate) fn read_image_path(prompter: &Prompter) -> AppResult<Option<PathBuf>> {
    let raw = prompter.text(t!("tags.image_path"))?;
    let raw = raw.trim_matches(|c| c == '"' || c == '\'');
    Ok((!raw.is_empty()).then(|| PathBuf::from(raw)))
}

pub(crate) fn print_report(report: &TagReport) {
    if matches!(report.tags, Some(Ok(()))) {
        println!("{}", style(t!("tags.tags_written")).green());
    }
    if matches!(report.cover, Some(Ok(()))) {
        println!("{}", style(t!("tags.cover_written")).green());
    }
    for err in report.errors() {
        println!("{}", style(err).yellow());
    }
}

fn report_trim(outcome: &TrimOutcome) {
    match outcome {
        TrimOutcome::Trimmed { range, .. } => println!(
            "{}",
            style(t!(
                "grab.trimmed",
                start = timecode::format(range.start()),
                end = timecode::format(range.end())
            ))
            .green()
        ),
        TrimOutcome::Unchanged { reason: None, .. } => {
            println!("{}", style(t!("grab.trim_whole")).dim());
        }
        TrimOutcome::Unchanged {
            reason: Some(reason),
            ..
        } => println!(
            "{}",
            style(t!("grab.trim_skipped", reason = reason)).yellow()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_time() {
        assert_eq!(optional_time("").unwrap(), None);
        assert_eq!(optional_time("   ").unwrap(), None);
        assert_eq!(optional_time("1:05").unwrap(), Some(65.0));
        assert!(optional_time("a:b").is_err());
    }
}
