use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const SETTINGS_FILE: &str = "settings.json";
pub const SAVE_DIR_ENV: &str = "SAVE_DIR";
pub const DEFAULT_SEARCH_LIMIT: usize = 8;
pub const DEFAULT_AUDIO_BITRATE: &str = "320k";
pub const DEFAULT_WORK_ROOT: &str = "tmp";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => write!(f, "English"),
            Self::ZhTw => write!(f, "繁體中文"),
        }
    }
}

/// Contents of `settings.json`. Every field has a default so partial files load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Where finished MP3s are copied. `$VAR`, `${VAR}` and `~` are expanded.
    pub save_dir: String,
    pub language: Language,
    pub search_limit: usize,
    /// ffmpeg bitrate used for downloads and re-encodes.
    pub audio_bitrate: String,
    /// Parent of the per-run work directory.
    pub work_root: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            save_dir: String::new(),
            language: Language::default(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            work_root: DEFAULT_WORK_ROOT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: UserSettings,
    /// Resolved, existing save directory.
    pub save_dir: PathBuf,
    pub work_root: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: UserSettings = serde_json::from_str(r#"{"save_dir": "~/Music"}"#).unwrap();
        assert_eq!(settings.save_dir, "~/Music");
        assert_eq!(settings.search_limit, DEFAULT_SEARCH_LIMIT);
        assert_eq!(settings.audio_bitrate, DEFAULT_AUDIO_BITRATE);
        assert_eq!(settings.language, Language::EnUs);
    }

    #[test]
    fn test_language_serde_names() {
        let json = serde_json::to_string(&Language::ZhTw).unwrap();
        assert_eq!(json, "\"zh-TW\"");
        let back: Language = serde_json::from_str("\"en-US\"").unwrap();
        assert_eq!(back, Language::EnUs);
        assert_eq!(Language::ZhTw.as_str(), "zh-TW");
    }
}
