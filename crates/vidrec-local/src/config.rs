//! Environment-driven settings.
//!
//! Everything has a default except the API key. Values are read once; nothing here touches the
//! network or the filesystem.

use crate::summarize::{DEFAULT_MAX_SENTENCES, MAX_SUMMARY_SENTENCES};
use vidrec_core::MAX_VIDEO_RESULTS;

pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 20_000;
pub const DEFAULT_MAX_BYTES: u64 = 5_000_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub youtube_api_key: Option<String>,
    pub youtube_endpoint: String,
    pub max_results: usize,
    pub summary_sentences: usize,
    pub segment_first: bool,
    pub fetch_timeout_ms: u64,
    pub search_timeout_ms: u64,
    pub max_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            youtube_endpoint: crate::youtube::endpoint_for("youtube", "v3"),
            max_results: MAX_VIDEO_RESULTS,
            summary_sentences: DEFAULT_MAX_SENTENCES,
            segment_first: false,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            search_timeout_ms: DEFAULT_SEARCH_TIMEOUT_MS,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map instead of mutating the process env).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |k: &str| {
            get(k)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let d = Self::default();

        // `api_key` is the legacy name; some env files end the value with a stray `;`.
        let youtube_api_key = get("VIDREC_YOUTUBE_API_KEY")
            .or_else(|| get("YOUTUBE_API_KEY"))
            .or_else(|| get("api_key"))
            .map(|s| s.replace(';', ""))
            .filter(|s| !s.is_empty());

        let youtube_endpoint = get("VIDREC_YOUTUBE_ENDPOINT").unwrap_or_else(|| {
            let service = get("YOUTUBE_API_SERVICE_NAME").unwrap_or_else(|| "youtube".to_string());
            let version = get("YOUTUBE_API_VERSION").unwrap_or_else(|| "v3".to_string());
            crate::youtube::endpoint_for(&service, &version)
        });

        let parse_usize = |k: &str, default: usize| {
            get(k)
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(default)
        };
        let parse_u64 = |k: &str, default: u64| {
            get(k)
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(default)
        };

        Self {
            youtube_api_key,
            youtube_endpoint,
            max_results: parse_usize("VIDREC_MAX_RESULTS", d.max_results).clamp(1, MAX_VIDEO_RESULTS),
            summary_sentences: parse_usize("VIDREC_SUMMARY_SENTENCES", d.summary_sentences)
                .clamp(1, MAX_SUMMARY_SENTENCES),
            segment_first: get("VIDREC_SEGMENT_FIRST")
                .map(|s| parse_bool(&s))
                .unwrap_or(d.segment_first),
            fetch_timeout_ms: parse_u64("VIDREC_FETCH_TIMEOUT_MS", d.fetch_timeout_ms),
            search_timeout_ms: parse_u64("VIDREC_SEARCH_TIMEOUT_MS", d.search_timeout_ms),
            max_bytes: parse_u64("VIDREC_MAX_BYTES", d.max_bytes),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.youtube_api_key.is_some()
    }
}

pub fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn cfg(pairs: &[(&str, &str)]) -> Config {
        let m: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| m.get(k).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let c = cfg(&[]);
        assert!(c.youtube_api_key.is_none());
        assert!(!c.has_api_key());
        assert_eq!(
            c.youtube_endpoint,
            "https://www.googleapis.com/youtube/v3/search"
        );
        assert_eq!(c.max_results, 6);
        assert_eq!(c.summary_sentences, 5);
        assert!(!c.segment_first);
        assert_eq!(c.fetch_timeout_ms, 30_000);
        assert_eq!(c.search_timeout_ms, 20_000);
    }

    #[test]
    fn legacy_api_key_has_semicolons_stripped() {
        let c = cfg(&[("api_key", "abc123;")]);
        assert_eq!(c.youtube_api_key.as_deref(), Some("abc123"));

        let c = cfg(&[("api_key", ";")]);
        assert!(c.youtube_api_key.is_none());
    }

    #[test]
    fn prefixed_api_key_wins() {
        let c = cfg(&[("api_key", "legacy"), ("VIDREC_YOUTUBE_API_KEY", "new")]);
        assert_eq!(c.youtube_api_key.as_deref(), Some("new"));
    }

    #[test]
    fn endpoint_from_service_name_and_version() {
        let c = cfg(&[
            ("YOUTUBE_API_SERVICE_NAME", "youtube"),
            ("YOUTUBE_API_VERSION", "v4"),
        ]);
        assert_eq!(
            c.youtube_endpoint,
            "https://www.googleapis.com/youtube/v4/search"
        );

        let c = cfg(&[("VIDREC_YOUTUBE_ENDPOINT", "http://127.0.0.1:9/search")]);
        assert_eq!(c.youtube_endpoint, "http://127.0.0.1:9/search");
    }

    #[test]
    fn numeric_knobs_are_bounded() {
        let c = cfg(&[
            ("VIDREC_MAX_RESULTS", "50"),
            ("VIDREC_SUMMARY_SENTENCES", "0"),
            ("VIDREC_SEGMENT_FIRST", "yes"),
            ("VIDREC_FETCH_TIMEOUT_MS", "not a number"),
        ]);
        assert_eq!(c.max_results, 6);
        assert_eq!(c.summary_sentences, 1);
        assert!(c.segment_first);
        assert_eq!(c.fetch_timeout_ms, DEFAULT_FETCH_TIMEOUT_MS);

        let c = cfg(&[("VIDREC_SUMMARY_SENTENCES", "50")]);
        assert_eq!(c.summary_sentences, 5);
        let c = cfg(&[("VIDREC_SUMMARY_SENTENCES", "3")]);
        assert_eq!(c.summary_sentences, 3);
    }
}
