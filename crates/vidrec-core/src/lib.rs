use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("document parse failed: {0}")]
    DocumentParse(String),
    #[error("segmentation failed: {0}")]
    Segmentation(String),
    #[error("search failed: {0}")]
    Search(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Largest number of videos a single search may return.
pub const MAX_VIDEO_RESULTS: usize = 6;

/// A web page to fetch and read as HTML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlSource {
    pub url: String,
}

/// An uploaded document payload (PDF bytes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSource {
    /// Display name (usually the file name); never parsed.
    pub name: Option<String>,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Where content comes from. Closed set: each variant has exactly one extraction path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
    Url(UrlSource),
    Document(DocumentSource),
}

impl Source {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(UrlSource { url: url.into() })
    }

    pub fn document(name: Option<String>, bytes: Vec<u8>) -> Self {
        Self::Document(DocumentSource { name, bytes })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Url(_) => "url",
            Self::Document(_) => "document",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
    /// Timeout for the operation (network + body read).
    pub timeout_ms: Option<u64>,
    /// Hard cap on bytes read from the response body.
    pub max_bytes: Option<u64>,
}

impl FetchRequest {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub truncated: bool,
    pub timings_ms: BTreeMap<String, u128>,
}

impl FetchResponse {
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).to_string()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait]
pub trait FetchBackend: Send + Sync {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse>;
}

/// Splits text into sentence spans.
///
/// Implementations are constructed explicitly and handed to the summarizer; there is no
/// process-wide model instance.
pub trait SentenceSegmenter: Send + Sync {
    fn name(&self) -> &'static str;
    fn segment(&self, text: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoQuery {
    pub query: String,
    /// Requested result count; providers cap this at [`MAX_VIDEO_RESULTS`].
    pub max_results: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl VideoQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: None,
            timeout_ms: None,
        }
    }

    pub fn effective_max_results(&self) -> usize {
        self.max_results
            .unwrap_or(MAX_VIDEO_RESULTS)
            .clamp(1, MAX_VIDEO_RESULTS)
    }
}

/// One recommended video, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoResult {
    pub title: String,
    /// Canonical watch URL (`https://www.youtube.com/watch?v=<id>`).
    pub url: String,
    /// Embeddable player URL (`https://www.youtube.com/embed/<id>`).
    pub embed_url: String,
    pub thumbnail: String,
}

impl VideoResult {
    pub fn from_video_id(id: &str, title: String, thumbnail: String) -> Self {
        Self {
            title,
            url: format!("https://www.youtube.com/watch?v={id}"),
            embed_url: format!("https://www.youtube.com/embed/{id}"),
            thumbnail,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSearchResponse {
    pub videos: Vec<VideoResult>,
    pub provider: String,
    /// Items in the raw response that were not videos (channels, playlists).
    pub skipped: usize,
    pub timings_ms: BTreeMap<String, u128>,
}

#[async_trait::async_trait]
pub trait VideoSearch: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, q: &VideoQuery) -> Result<VideoSearchResponse>;
}
