pub mod load;
pub mod save;
pub mod types;

pub use types::{
    Config, DEFAULT_AUDIO_BITRATE, DEFAULT_SEARCH_LIMIT, Language, SAVE_DIR_ENV, SETTINGS_FILE,
    UserSettings,
};
