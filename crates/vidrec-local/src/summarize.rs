//! Length-ranked extractive summary.
//!
//! The summary is the `max_sentences` longest sentences, longest first, joined with single
//! spaces. Document order is not preserved. This is a heuristic, not a relevance model: its only
//! job is to turn a page into a short search query.

use crate::textprep;
use serde::Serialize;
use vidrec_core::{Error, Result, SentenceSegmenter};

/// Upper bound on summary sentences; larger configured values are clamped.
pub const MAX_SUMMARY_SENTENCES: usize = 5;
pub const DEFAULT_MAX_SENTENCES: usize = MAX_SUMMARY_SENTENCES;

/// Inputs longer than this are refused by [`RuleSegmenter`] (characters).
pub const DEFAULT_SEGMENTER_MAX_CHARS: usize = 1_000_000;

/// Spans longer than this many words are cut into consecutive pieces of at most this size.
pub const DEFAULT_MAX_SPAN_WORDS: usize = 30;

/// Rule-based sentence boundaries: line breaks, and `.`/`!`/`?` followed by whitespace.
///
/// After [`textprep::normalize`] the terminators are gone and extracted HTML rarely has line
/// breaks, so a whole page can arrive as one span. Spans over `max_span_words` words are cut
/// into word windows, which keeps every "sentence" (and therefore the summary) bounded.
#[derive(Debug, Clone)]
pub struct RuleSegmenter {
    max_chars: usize,
    max_span_words: usize,
}

impl Default for RuleSegmenter {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_SEGMENTER_MAX_CHARS,
            max_span_words: DEFAULT_MAX_SPAN_WORDS,
        }
    }
}

impl RuleSegmenter {
    pub fn with_max_chars(max_chars: usize) -> Self {
        Self {
            max_chars,
            ..Self::default()
        }
    }

    pub fn with_max_span_words(mut self, n: usize) -> Self {
        self.max_span_words = n.max(1);
        self
    }

    fn push_span(&self, out: &mut Vec<String>, cur: &mut String) {
        let s = cur.trim();
        if !s.is_empty() {
            let words: Vec<&str> = s.split_whitespace().collect();
            if words.len() > self.max_span_words {
                out.extend(words.chunks(self.max_span_words).map(|w| w.join(" ")));
            } else {
                out.push(s.to_string());
            }
        }
        cur.clear();
    }
}

impl SentenceSegmenter for RuleSegmenter {
    fn name(&self) -> &'static str {
        "rules"
    }

    fn segment(&self, text: &str) -> Result<Vec<String>> {
        let n = text.chars().count();
        if n > self.max_chars {
            return Err(Error::Segmentation(format!(
                "text of length {n} exceeds maximum of {}",
                self.max_chars
            )));
        }

        let mut out = Vec::new();
        let mut cur = String::new();
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '\n' || ch == '\r' {
                self.push_span(&mut out, &mut cur);
                continue;
            }
            cur.push(ch);
            if matches!(ch, '.' | '!' | '?') && chars.peek().map_or(true, |c| c.is_whitespace()) {
                self.push_span(&mut out, &mut cur);
            }
        }
        self.push_span(&mut out, &mut cur);
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub max_sentences: usize,
    /// Segment the raw text first and normalize each sentence afterwards.
    ///
    /// Off by default: the default pipeline normalizes first, which removes the punctuation the
    /// segmenter would split on and leaves only line breaks as boundaries.
    pub segment_first: bool,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_sentences: DEFAULT_MAX_SENTENCES,
            segment_first: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    /// Selected sentences, longest first. Empty when `fallback` is set.
    pub sentences: Vec<String>,
    /// Why the summary is the unnormalized input instead of ranked sentences.
    pub fallback: Option<String>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

pub struct Summarizer {
    segmenter: Box<dyn SentenceSegmenter>,
    cfg: SummarizerConfig,
}

impl Summarizer {
    pub fn new(segmenter: Box<dyn SentenceSegmenter>, cfg: SummarizerConfig) -> Self {
        Self { segmenter, cfg }
    }

    /// Ranked sentences, or the segmenter's error.
    pub fn try_summarize(&self, text: &str) -> Result<Summary> {
        let mut sentences = if self.cfg.segment_first {
            self.segmenter
                .segment(text)?
                .iter()
                .map(|s| textprep::normalize(s).trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        } else {
            self.segmenter.segment(&textprep::normalize(text))?
        };
        let total = sentences.len();

        // Stable: equal lengths keep segmentation order.
        sentences.sort_by_key(|s| std::cmp::Reverse(s.chars().count()));
        sentences.truncate(self.cfg.max_sentences.clamp(1, MAX_SUMMARY_SENTENCES));
        tracing::debug!(
            segmenter = self.segmenter.name(),
            total,
            kept = sentences.len(),
            "summarized"
        );

        Ok(Summary {
            text: sentences.join(" "),
            sentences,
            fallback: None,
        })
    }

    /// Like [`Summarizer::try_summarize`], but a segmentation failure degrades to the original
    /// input text with `fallback` set.
    pub fn summarize(&self, text: &str) -> Summary {
        match self.try_summarize(text) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "summarization failed; using unsummarized text");
                Summary {
                    text: text.to_string(),
                    sentences: Vec::new(),
                    fallback: Some(e.to_string()),
                }
            }
        }
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(Box::new(RuleSegmenter::default()), SummarizerConfig::default())
    }
}
