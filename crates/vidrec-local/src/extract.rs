//! Source → raw text.
//!
//! Two paths, one per [`Source`] variant:
//! - URL: fetch, then collect heading and paragraph text from the HTML.
//! - Document: decode a PDF and concatenate its page texts.
//!
//! Both return `Err` rather than partial text when parsing fails.

use std::sync::Arc;
use vidrec_core::{
    DocumentSource, Error, FetchBackend, FetchRequest, FetchResponse, Result, Source, UrlSource,
};

/// How many times the heading block is repeated ahead of the paragraphs.
pub const HEADING_REPEAT: usize = 3;

/// Best-effort sniff for PDF bytes (magic header).
pub fn bytes_look_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

fn content_type_is_pdf(ct: Option<&str>) -> bool {
    ct.map(|s| {
        s.split(';')
            .next()
            .unwrap_or("")
            .trim()
            .eq_ignore_ascii_case("application/pdf")
    })
    .unwrap_or(false)
}

fn element_text(el: &html_scraper::ElementRef) -> String {
    el.text().collect::<String>()
}

fn joined_text(doc: &html_scraper::Html, selector: &str) -> String {
    let Ok(sel) = html_scraper::Selector::parse(selector) else {
        return String::new();
    };
    doc.select(&sel)
        .map(|el| element_text(&el))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Heading-weighted text of an HTML document.
///
/// `h1`/`h2`/`h3` text (document order, space-joined) is emitted [`HEADING_REPEAT`] times,
/// each copy followed by a space, then one more space and the space-joined `p` text:
///
/// `<h1>Cats</h1><p>Cats are great pets.</p>` → `"Cats Cats Cats  Cats are great pets."`
pub fn html_to_weighted_text(html: &str) -> String {
    let doc = html_scraper::Html::parse_document(html);
    let headings = joined_text(&doc, "h1, h2, h3");
    let paragraphs = joined_text(&doc, "p");

    let mut out = String::with_capacity((headings.len() + 1) * HEADING_REPEAT + 1 + paragraphs.len());
    for _ in 0..HEADING_REPEAT {
        out.push_str(&headings);
        out.push(' ');
    }
    out.push(' ');
    out.push_str(&paragraphs);
    out
}

/// Extract text from a PDF body (in-memory bytes), pages concatenated in order.
///
/// `pdf-extract` can panic on some malformed inputs; the panic is caught and reported as a
/// parse error like any other decoding failure.
pub fn pdf_to_text(bytes: &[u8]) -> Result<String> {
    let r = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes));
    match r {
        Ok(Ok(pages)) => {
            tracing::debug!(pages = pages.len(), "pdf decoded");
            Ok(pages.concat())
        }
        Ok(Err(e)) => Err(Error::DocumentParse(e.to_string())),
        Err(_) => Err(Error::DocumentParse("pdf decoder panicked".to_string())),
    }
}

/// Turns a [`Source`] into raw text.
#[derive(Clone)]
pub struct Extractor {
    fetcher: Arc<dyn FetchBackend>,
    timeout_ms: Option<u64>,
    max_bytes: Option<u64>,
}

impl Extractor {
    pub fn new(fetcher: Arc<dyn FetchBackend>) -> Self {
        Self {
            fetcher,
            timeout_ms: None,
            max_bytes: None,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    pub async fn extract(&self, source: &Source) -> Result<String> {
        match source {
            Source::Url(u) => self.extract_url(u).await,
            Source::Document(d) => extract_document(d).await,
        }
    }

    async fn extract_url(&self, src: &UrlSource) -> Result<String> {
        let req = FetchRequest {
            url: src.url.clone(),
            timeout_ms: self.timeout_ms,
            max_bytes: self.max_bytes,
        };
        let resp = self.fetcher.fetch(&req).await?;
        if !resp.is_success() {
            // The body is still parsed; error pages are content too.
            tracing::warn!(url = %src.url, status = resp.status, "non-success HTTP status");
        }
        if resp.truncated {
            tracing::warn!(url = %src.url, bytes = resp.bytes.len(), "response body truncated");
        }
        response_to_text(resp).await
    }
}

async fn response_to_text(resp: FetchResponse) -> Result<String> {
    if content_type_is_pdf(resp.content_type.as_deref()) || bytes_look_like_pdf(&resp.bytes) {
        tracing::debug!(url = %resp.final_url, "url body is a pdf");
        return pdf_bytes_to_text(resp.bytes).await;
    }
    Ok(html_to_weighted_text(&resp.text_lossy()))
}

async fn extract_document(d: &DocumentSource) -> Result<String> {
    pdf_bytes_to_text(d.bytes.clone()).await
}

async fn pdf_bytes_to_text(bytes: Vec<u8>) -> Result<String> {
    tokio::task::spawn_blocking(move || pdf_to_text(&bytes))
        .await
        .map_err(|e| Error::DocumentParse(format!("pdf join failed: {e}")))?
}
