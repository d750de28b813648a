use crate::config::types::{Config, SAVE_DIR_ENV, SETTINGS_FILE, UserSettings};
use crate::error::AppError;
use crate::tools::ensure_directory_exists;
use anyhow::{Context, Result};
use log::{info, warn};
use regex::{Captures, Regex};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static REGEX_ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex")
});

impl Config {
    /// Load `settings.json`, apply the `SAVE_DIR` override and resolve paths.
    ///
    /// A missing or empty save directory is a configuration error; a
    /// template settings file is written so the user has something to edit.
    pub fn new() -> Result<Self, AppError> {
        let path = Path::new(SETTINGS_FILE);
        let settings = load_settings(path).map_err(|e| AppError::Configuration(format!("{e:#}")))?;
        let override_dir = env::var(SAVE_DIR_ENV).ok();

        match Self::resolve(settings.clone(), override_dir.as_deref(), |name| {
            env::var(name).ok()
        }) {
            Ok(config) => Ok(config),
            Err(e) => {
                if !path.exists() {
                    match crate::config::save::save_settings(&settings) {
                        Ok(()) => info!("Wrote settings template to {}", path.display()),
                        Err(write_err) => warn!("Could not write settings template: {write_err:#}"),
                    }
                }
                Err(e)
            }
        }
    }

    /// Resolve a config from settings, an optional save dir override and an
    /// environment lookup.
    pub fn resolve(
        settings: UserSettings,
        override_dir: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let raw = override_dir
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&settings.save_dir);
        let save_dir = expand_path(raw, &lookup);

        if save_dir.as_os_str().is_empty() {
            return Err(AppError::Configuration(format!(
                "save directory is not set; set `save_dir` in {SETTINGS_FILE} or the {SAVE_DIR_ENV} environment variable"
            )));
        }

        ensure_directory_exists(&save_dir).map_err(|e| {
            AppError::Configuration(format!(
                "cannot create save directory {}: {e:#}",
                save_dir.display()
            ))
        })?;

        let work_root = expand_path(&settings.work_root, &lookup);
        let work_root = if work_root.as_os_str().is_empty() {
            PathBuf::from(crate::config::types::DEFAULT_WORK_ROOT)
        } else {
            work_root
        };

        Ok(Self {
            settings,
            save_dir,
            work_root,
        })
    }
}

pub fn load_settings(path: &Path) -> Result<UserSettings> {
    if !path.exists() {
        return Ok(UserSettings::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings from {}", path.display()))
}

/// Expand `$VAR`, `${VAR}` and a leading `~`. Unknown variables are kept verbatim.
pub fn expand_path(raw: &str, lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    let raw = raw.trim();
    let expanded = REGEX_ENV_VAR.replace_all(raw, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        lookup(name).unwrap_or_else(|| caps[0].to_string())
    });

    if expanded == "~" {
        if let Some(home) = lookup("HOME") {
            return PathBuf::from(home);
        }
    }
    if let Some(rest) = expanded.strip_prefix("~/") {
        if let Some(home) = lookup("HOME") {
            return Path::new(&home).join(rest);
        }
    }

    PathBuf::from(expanded.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_env(name: &str) -> Option<String> {
        match name {
            "HOME" => Some("/home/tester".to_string()),
            "MUSIC" => Some("/data/music".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(
            expand_path("~/Music", &fake_env),
            PathBuf::from("/home/tester/Music")
        );
        assert_eq!(expand_path("~", &fake_env), PathBuf::from("/home/tester"));
    }

    #[test]
    fn test_expand_vars() {
        assert_eq!(
            expand_path("$MUSIC/yt", &fake_env),
            PathBuf::from("/data/music/yt")
        );
        assert_eq!(
            expand_path("${HOME}/x", &fake_env),
            PathBuf::from("/home/tester/x")
        );
        assert_eq!(
            expand_path("$UNSET/x", &fake_env),
            PathBuf::from("$UNSET/x")
        );
    }

    #[test]
    fn test_resolve_requires_save_dir() {
        let err = Config::resolve(UserSettings::default(), None, fake_env).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));

        let err = Config::resolve(UserSettings::default(), Some("   "), fake_env).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_resolve_creates_save_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("saved").join("tracks");
        let settings = UserSettings {
            save_dir: target.to_string_lossy().to_string(),
            ..UserSettings::default()
        };

        let config = Config::resolve(settings, None, fake_env).unwrap();
        assert_eq!(config.save_dir, target);
        assert!(target.is_dir());
    }

    #[test]
    fn test_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let settings = UserSettings {
            save_dir: "/should/not/be/used".to_string(),
            ..UserSettings::default()
        };
        let override_dir = dir.path().to_string_lossy().to_string();
        let config = Config::resolve(settings, Some(&override_dir), fake_env).unwrap();
        assert_eq!(config.save_dir, dir.path());
    }

    #[test]
    fn test_load_settings_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, UserSettings::default());
    }

    #[test]
    fn test_load_settings_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_settings(&path).is_err());
    }
}
