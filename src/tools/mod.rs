mod ffmpeg_command;
mod ffprobe_info;
mod filename;
mod frame_extractor;
pub mod id3_tagger;
mod path_validator;
mod prompt;
mod spinner;
pub mod timecode;
mod trim_range;
mod waveform;
mod work_dir;
mod yt_dlp;

pub use ffmpeg_command::{DEFAULT_BITRATE, FfmpegCommand, append_suffix};
pub use ffprobe_info::{MediaInfo, get_media_info};
pub use filename::{MAX_NAME_LEN, is_mp3, mp3_file_name, safe_filename};
pub use frame_extractor::extract_frame;
pub use id3_tagger::{TagFields, image_to_jpeg};
pub use path_validator::{ensure_directory_exists, validate_file_exists};
pub use prompt::{Prompter, RetryPolicy, ask_interruptible, retry_parse};
pub use spinner::{spinner, with_spinner};
pub use timecode::FormatError;
pub use trim_range::{TrimError, TrimRange};
pub use waveform::{load_peaks, peaks_from_samples};
pub use work_dir::WorkDir;
pub use yt_dlp::{SearchResult, YtDlp, is_url, parse_search_output};
