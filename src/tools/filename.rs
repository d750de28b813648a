//! File name sanitising for saved tracks

use regex::Regex;
use std::sync::LazyLock;

pub const MAX_NAME_LEN: usize = 200;
pub const MP3_EXTENSION: &str = "mp3";

static REGEX_FORBIDDEN_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]+"#).expect("Invalid regex"));

/// Replace runs of characters forbidden on common filesystems with `_`,
/// trim, and cap the length (in characters).
#[must_use]
pub fn safe_filename(name: &str) -> String {
    let replaced = REGEX_FORBIDDEN_CHARS.replace_all(name, "_");
    replaced.trim().chars().take(MAX_NAME_LEN).collect()
}

/// Turn user input into an `.mp3` file name, or `None` when blank.
#[must_use]
pub fn mp3_file_name(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let base = strip_mp3_suffix(input);
    let cleaned = safe_filename(base);
    if cleaned.is_empty() {
        return None;
    }
    Some(format!("{cleaned}.{MP3_EXTENSION}"))
}

fn strip_mp3_suffix(input: &str) -> &str {
    let suffix = format!(".{MP3_EXTENSION}");
    let split = input.len().saturating_sub(suffix.len());
    match input.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(&suffix) => &input[..split],
        _ => input,
    }
}

#[must_use]
pub fn is_mp3(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(MP3_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_safe_filename_replaces_runs() {
        assert_eq!(safe_filename("AC/DC: Back?"), "AC_DC_ Back_");
        assert_eq!(safe_filename(r#"a\\//b"#), "a_b");
        assert_eq!(safe_filename("  spaced  "), "spaced");
    }

    #[test]
    fn test_safe_filename_keeps_unicode() {
        assert_eq!(safe_filename("周杰倫 - 晴天"), "周杰倫 - 晴天");
    }

    #[test]
    fn test_safe_filename_truncates() {
        let long = "x".repeat(500);
        assert_eq!(safe_filename(&long).chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_mp3_file_name() {
        assert_eq!(
            mp3_file_name("John Mayer - Human Nature"),
            Some("John Mayer - Human Nature.mp3".to_string())
        );
        assert_eq!(mp3_file_name("track.mp3"), Some("track.mp3".to_string()));
        assert_eq!(mp3_file_name("   "), None);
    }

    #[test]
    fn test_mp3_file_name_any_case_suffix() {
        assert_eq!(mp3_file_name("song.Mp3"), Some("song.mp3".to_string()));
        assert_eq!(mp3_file_name("song.MP3"), Some("song.mp3".to_string()));
        assert_eq!(mp3_file_name("mp3"), Some("mp3.mp3".to_string()));
        assert_eq!(mp3_file_name("晴天.mP3"), Some("晴天.mp3".to_string()));
    }

    #[test]
    fn test_is_mp3() {
        assert!(is_mp3(Path::new("/a/b.MP3")));
        assert!(is_mp3(Path::new("b.mp3")));
        assert!(!is_mp3(Path::new("b.m4a")));
        assert!(!is_mp3(Path::new("mp3")));
    }
}
