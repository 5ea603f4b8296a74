#![allow(dead_code)]

use axum::{extract::Query, http::header, http::StatusCode, routing::get, Json, Router};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub use vidrec_local::testutil::{item, pdf_with_pages};

/// Fixture pages plus a YouTube-shaped search endpoint, served on one ephemeral port.
///
/// Keep the returned runtime alive for as long as the server is needed.
pub struct Fixture {
    pub rt: tokio::runtime::Runtime,
    pub base: String,
    pub search_hits: Arc<AtomicUsize>,
}

impl Fixture {
    pub fn start() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits2 = hits.clone();
        let app = Router::new()
            .route(
                "/cats",
                get(|| async {
                    (
                        [(header::CONTENT_TYPE, "text/html")],
                        "<html><body><h1>Cats</h1><p>Cats are great pets.</p></body></html>",
                    )
                }),
            )
            .route(
                "/punctuation",
                get(|| async {
                    (
                        [(header::CONTENT_TYPE, "text/html")],
                        "<html><body><h1>!!!</h1><p>... ???</p></body></html>",
                    )
                }),
            )
            .route(
                "/birds",
                get(|| async {
                    let body: String = (0..40)
                        .map(|i| {
                            format!(
                                "<p>Paragraph {i} explains one detail about migratory birds and their routes.</p>"
                            )
                        })
                        .collect();
                    (
                        [(header::CONTENT_TYPE, "text/html")],
                        format!("<html><body><h1>Migratory birds</h1>{body}</body></html>"),
                    )
                }),
            )
            .route(
                "/youtube/v3/search",
                get(move |Query(params): Query<HashMap<String, String>>| {
                    let hits = hits2.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        if params.get("key").map(String::as_str) != Some("test-key") {
                            return (
                                StatusCode::FORBIDDEN,
                                Json(serde_json::json!({
                                    "error": { "code": 403, "message": "API key not valid." }
                                })),
                            );
                        }
                        (
                            StatusCode::OK,
                            Json(serde_json::json!({
                                "kind": "youtube#searchListResponse",
                                "items": [
                                    item("youtube#video", "vid1", "Cats &amp; Kittens"),
                                    item("youtube#channel", "chan1", "Cat Channel"),
                                    item("youtube#video", "vid2", "Caring for cats"),
                                    item("youtube#playlist", "list1", "Cat playlist"),
                                    item("youtube#video", "vid3", "Cat facts")
                                ]
                            })),
                        )
                    }
                }),
            );

        let rt = tokio::runtime::Runtime::new().expect("rt");
        let addr: SocketAddr = rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.expect("axum serve");
            });
            addr
        });
        Self {
            rt,
            base: format!("http://{addr}"),
            search_hits: hits,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/youtube/v3/search", self.base)
    }

    pub fn hits(&self) -> usize {
        self.search_hits.load(Ordering::SeqCst)
    }

    /// The `vidrec` binary, isolated from the developer's environment and pointed at this fixture.
    pub fn command(&self, api_key: &str) -> Command {
        let mut cmd = self.command_without_key();
        cmd.env("VIDREC_YOUTUBE_API_KEY", api_key);
        cmd
    }

    pub fn command_without_key(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_vidrec"));
        hermetic(&mut cmd);
        cmd.env("VIDREC_YOUTUBE_ENDPOINT", self.endpoint());
        cmd
    }
}

pub fn hermetic(cmd: &mut Command) {
    // Disable `.env` autoload so tests never pick up real keys.
    cmd.env("VIDREC_DOTENV", "0");
    for k in [
        "VIDREC_ENV_FILE",
        "VIDREC_YOUTUBE_API_KEY",
        "YOUTUBE_API_KEY",
        "api_key",
        "VIDREC_YOUTUBE_ENDPOINT",
        "VIDREC_MAX_RESULTS",
        "VIDREC_SUMMARY_SENTENCES",
        "VIDREC_SEGMENT_FIRST",
        "VIDREC_LOG_FORMAT",
    ] {
        cmd.env_remove(k);
    }
}
