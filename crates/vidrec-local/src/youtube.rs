//! YouTube Data API search.

use crate::config::Config;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Instant;
use vidrec_core::{
    Error, Result, VideoQuery, VideoResult, VideoSearch, VideoSearchResponse, MAX_VIDEO_RESULTS,
};

const VIDEO_KIND: &str = "youtube#video";

pub fn endpoint_for(service: &str, version: &str) -> String {
    format!("https://www.googleapis.com/{service}/{version}/search")
}

fn timeout_ms_from_query(q: &VideoQuery) -> u64 {
    // Keep a conservative cap even if callers pass something huge.
    q.timeout_ms.unwrap_or(20_000).clamp(1_000, 60_000)
}

pub(crate) fn missing_api_key() -> Error {
    Error::NotConfigured("missing VIDREC_YOUTUBE_API_KEY (or YOUTUBE_API_KEY)".to_string())
}

#[derive(Debug, Deserialize)]
pub struct YouTubeSearchResponse {
    #[serde(default)]
    pub items: Vec<YouTubeSearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct YouTubeSearchItem {
    pub id: YouTubeItemId,
    pub snippet: Option<YouTubeSnippet>,
}

#[derive(Debug, Deserialize)]
pub struct YouTubeItemId {
    pub kind: String,
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct YouTubeSnippet {
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnails: BTreeMap<String, YouTubeThumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct YouTubeThumbnail {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct YouTubeErrorEnvelope {
    error: YouTubeError,
}

#[derive(Debug, Deserialize)]
struct YouTubeError {
    message: Option<String>,
}

/// Map a raw search response into display records.
///
/// Returns the videos (at most `max_results`) and how many items were dropped because they are
/// not videos.
pub fn videos_from_response(
    parsed: YouTubeSearchResponse,
    max_results: usize,
) -> (Vec<VideoResult>, usize) {
    let mut videos = Vec::new();
    let mut skipped = 0usize;
    for item in parsed.items {
        if item.id.kind != VIDEO_KIND {
            skipped += 1;
            continue;
        }
        let Some(id) = item.id.video_id.filter(|s| !s.trim().is_empty()) else {
            tracing::debug!("video item without videoId; skipping");
            continue;
        };
        let Some(mut snippet) = item.snippet else {
            tracing::debug!(video_id = %id, "video item without snippet; skipping");
            continue;
        };
        let (Some(title), Some(thumb)) = (snippet.title.take(), snippet.thumbnails.remove("high"))
        else {
            tracing::debug!(video_id = %id, "video item without title or high thumbnail; skipping");
            continue;
        };
        videos.push(VideoResult::from_video_id(&id, title, thumb.url));
    }
    videos.truncate(max_results.min(MAX_VIDEO_RESULTS));
    (videos, skipped)
}

#[derive(Debug, Clone)]
pub struct YouTubeSearch {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl YouTubeSearch {
    pub fn new(client: reqwest::Client, api_key: String, endpoint: String) -> Self {
        Self {
            client,
            api_key,
            endpoint,
        }
    }

    pub fn from_config(client: reqwest::Client, cfg: &Config) -> Result<Self> {
        let api_key = cfg.youtube_api_key.clone().ok_or_else(missing_api_key)?;
        Ok(Self::new(client, api_key, cfg.youtube_endpoint.clone()))
    }

}

#[async_trait::async_trait]
impl VideoSearch for YouTubeSearch {
    fn name(&self) -> &'static str {
        "youtube"
    }

    async fn search(&self, q: &VideoQuery) -> Result<VideoSearchResponse> {
        let t0 = Instant::now();
        let max_results = q.effective_max_results();
        let timeout_ms = timeout_ms_from_query(q);

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", q.query.as_str()),
                ("part", "id,snippet"),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ])
            .query(&[("maxResults", max_results.to_string())])
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| Error::Search(e.without_url().to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<YouTubeErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .map(|m| format!(": {m}"))
                .unwrap_or_default();
            return Err(Error::Search(format!("youtube search HTTP {status}{detail}")));
        }

        let parsed: YouTubeSearchResponse = resp
            .json()
            .await
            .map_err(|e| Error::Search(e.without_url().to_string()))?;
        let (videos, skipped) = videos_from_response(parsed, max_results);

        let mut timings_ms = BTreeMap::new();
        timings_ms.insert("search".to_string(), t0.elapsed().as_millis());
        tracing::debug!(videos = videos.len(), skipped, "youtube search done");

        Ok(VideoSearchResponse {
            videos,
            provider: "youtube".to_string(),
            skipped,
            timings_ms,
        })
    }
}
