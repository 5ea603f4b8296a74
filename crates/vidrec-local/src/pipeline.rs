//! fetch → extract → summarize → search.
//!
//! Stages return `Result`; this module is the only place that decides what a failure means for
//! the run. No stage failure escapes [`Pipeline::run`]: each becomes an [`Outcome`] plus a
//! human-readable notice.

use crate::config::Config;
use crate::extract::Extractor;
use crate::summarize::{RuleSegmenter, Summarizer, SummarizerConfig, Summary};
use crate::textprep::truncate_at_word;
use crate::youtube::YouTubeSearch;
use crate::LocalFetcher;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use vidrec_core::{Result, SentenceSegmenter, Source, VideoQuery, VideoResult, VideoSearch};

/// Longest query sent to the search provider, in characters. Longer summaries (in practice only
/// the unsegmented fallback text) are cut at a word boundary.
pub const MAX_QUERY_CHARS: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The search ran. `videos` may still be empty.
    Recommended,
    /// Extraction failed (`error` set) or produced only whitespace.
    NoContent { error: Option<String> },
    /// The summary was empty, so no search was sent.
    NothingToSearch,
    SearchFailed { error: String },
}

impl Outcome {
    /// True when a stage failed (as opposed to the input simply having nothing to offer).
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::NoContent { error: Some(_) } | Self::SearchFailed { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub source_kind: &'static str,
    pub content: String,
    pub summary: Option<Summary>,
    pub videos: Vec<VideoResult>,
    pub outcome: Outcome,
    pub notices: Vec<String>,
    pub timings_ms: BTreeMap<String, u128>,
}

impl Recommendation {
    fn new(source: &Source) -> Self {
        Self {
            source_kind: source.kind(),
            content: String::new(),
            summary: None,
            videos: Vec::new(),
            outcome: Outcome::NoContent { error: None },
            notices: Vec::new(),
            timings_ms: BTreeMap::new(),
        }
    }
}

pub struct Pipeline {
    extractor: Extractor,
    summarizer: Summarizer,
    /// `None` when no provider is configured; only an error once a search is actually needed.
    search: Option<Arc<dyn VideoSearch>>,
    max_results: usize,
    search_timeout_ms: u64,
}

impl Pipeline {
    pub fn new(extractor: Extractor, summarizer: Summarizer, search: Arc<dyn VideoSearch>) -> Self {
        Self {
            extractor,
            summarizer,
            search: Some(search),
            max_results: vidrec_core::MAX_VIDEO_RESULTS,
            search_timeout_ms: crate::config::DEFAULT_SEARCH_TIMEOUT_MS,
        }
    }

    pub fn with_max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }

    pub fn with_search_timeout_ms(mut self, ms: u64) -> Self {
        self.search_timeout_ms = ms;
        self
    }

    /// The default wiring: reqwest fetcher, rule segmenter, YouTube search.
    ///
    /// A missing API key is not an error here. Runs that reach the search step report
    /// `SearchFailed`; runs that stop earlier (no content, nothing to search) are unaffected.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let fetcher = LocalFetcher::new()?;
        let search: Option<Arc<dyn VideoSearch>> =
            match YouTubeSearch::from_config(fetcher.client().clone(), cfg) {
                Ok(s) => Some(Arc::new(s) as Arc<dyn VideoSearch>),
                Err(e) => {
                    tracing::debug!(error = %e, "video search not configured");
                    None
                }
            };
        let extractor = Extractor::new(Arc::new(fetcher))
            .with_timeout_ms(cfg.fetch_timeout_ms)
            .with_max_bytes(cfg.max_bytes);
        let segmenter: Box<dyn SentenceSegmenter> = Box::new(RuleSegmenter::default());
        let summarizer = Summarizer::new(
            segmenter,
            SummarizerConfig {
                max_sentences: cfg.summary_sentences,
                segment_first: cfg.segment_first,
            },
        );
        Ok(Self {
            extractor,
            summarizer,
            search,
            max_results: cfg.max_results,
            search_timeout_ms: cfg.search_timeout_ms,
        })
    }

    pub async fn run(&self, source: &Source) -> Recommendation {
        let mut rec = Recommendation::new(source);

        let t0 = Instant::now();
        let extracted = self.extractor.extract(source).await;
        rec.timings_ms
            .insert("extract".to_string(), t0.elapsed().as_millis());
        let content = match extracted {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(source = source.kind(), error = %e, "extraction failed");
                rec.notices.push(format!("Error extracting content: {e}"));
                rec.outcome = Outcome::NoContent {
                    error: Some(e.to_string()),
                };
                return rec;
            }
        };
        if content.trim().is_empty() {
            rec.notices.push("No content extracted.".to_string());
            return rec;
        }
        rec.content = content;

        let t0 = Instant::now();
        let summary = self.summarizer.summarize(&rec.content);
        rec.timings_ms
            .insert("summarize".to_string(), t0.elapsed().as_millis());
        if let Some(why) = &summary.fallback {
            rec.notices
                .push(format!("Error summarizing text: {why}; searching with the full text."));
        }
        let (query, cut) = truncate_at_word(&summary.text, MAX_QUERY_CHARS);
        if cut {
            tracing::debug!(max_chars = MAX_QUERY_CHARS, "search query truncated");
        }
        let empty = summary.is_empty();
        rec.summary = Some(summary);
        if empty {
            rec.notices
                .push("No content to summarize; skipped the video search.".to_string());
            rec.outcome = Outcome::NothingToSearch;
            return rec;
        }

        let q = VideoQuery {
            query,
            max_results: Some(self.max_results),
            timeout_ms: Some(self.search_timeout_ms),
        };
        let Some(search) = &self.search else {
            let e = crate::youtube::missing_api_key();
            tracing::warn!(error = %e, "video search skipped");
            rec.notices.push(format!("Error searching videos: {e}"));
            rec.outcome = Outcome::SearchFailed {
                error: e.to_string(),
            };
            return rec;
        };
        let t0 = Instant::now();
        let searched = search.search(&q).await;
        rec.timings_ms
            .insert("search".to_string(), t0.elapsed().as_millis());
        match searched {
            Ok(resp) => {
                rec.videos = resp.videos;
                rec.videos.truncate(vidrec_core::MAX_VIDEO_RESULTS);
                rec.outcome = Outcome::Recommended;
            }
            Err(e) => {
                tracing::warn!(provider = search.name(), error = %e, "video search failed");
                rec.notices.push(format!("Error searching videos: {e}"));
                rec.outcome = Outcome::SearchFailed {
                    error: e.to_string(),
                };
            }
        }
        rec
    }
}
