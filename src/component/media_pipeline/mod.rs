//! Download → trim → tag/cover → save
//!
//! The pipeline itself never prompts. Choices come in as arguments and
//! external programs sit behind the traits in `collaborators`.

mod collaborators;
mod pipeline;

pub use collaborators::{Ffmpeg, LoftyTagger, MediaSource, TagWriter, Transcoder};
pub use pipeline::{
    Acquired, CoverSource, DEFAULT_AUDIO_RESOLUTION, DEFAULT_FRAME_RATE, MediaPipeline, TagEdit,
    TagReport, TrimMode, TrimOutcome, tag_local_file,
};
