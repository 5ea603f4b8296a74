use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use vidrec_core::Source;
use vidrec_local::config::Config;
use vidrec_local::pipeline::{Pipeline, Recommendation};

/// Uploaded documents larger than this are refused before extraction.
const MAX_DOCUMENT_BYTES: u64 = 25 * 1024 * 1024;
const CONTENT_PREVIEW_CHARS: usize = 500;
const SUMMARY_PREVIEW_CHARS: usize = 200;

#[derive(Parser, Debug)]
#[command(name = "vidrec")]
#[command(about = "Recommend YouTube videos for a web page or PDF", long_about = None)]
struct Cli {
    /// Log encoding on stderr: text|json
    #[arg(long, global = true, env = "VIDREC_LOG_FORMAT", default_value = "text")]
    log_format: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract a web page's headings and paragraphs and recommend videos for it.
    Url(UrlCmd),
    /// Extract a local PDF's text and recommend videos for it.
    Pdf(PdfCmd),
    /// Diagnose configuration (json; never prints secret values).
    Doctor(DoctorCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct RunOpts {
    /// Output format: text|json
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
    /// Number of videos to request (1-6). Defaults to VIDREC_MAX_RESULTS or 6.
    #[arg(long)]
    max_results: Option<usize>,
    /// Number of sentences kept in the summary (1-5). Defaults to VIDREC_SUMMARY_SENTENCES or 5.
    #[arg(long)]
    sentences: Option<usize>,
    /// Split sentences before stripping punctuation instead of after.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    segment_first: bool,
}

#[derive(clap::Args, Debug)]
struct UrlCmd {
    /// Page to read.
    url: String,
    #[command(flatten)]
    opts: RunOpts,
}

#[derive(clap::Args, Debug)]
struct PdfCmd {
    /// PDF file to read (at most 25 MiB).
    path: PathBuf,
    #[command(flatten)]
    opts: RunOpts,
}

#[derive(clap::Args, Debug)]
struct DoctorCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

/// Load env files before anything reads configuration.
///
/// Variables already present in the process environment always win.
fn load_env_files() {
    if let Ok(p) = std::env::var("VIDREC_ENV_FILE") {
        let p = p.trim();
        if !p.is_empty() {
            if let Err(e) = dotenvy::from_path(p) {
                eprintln!("warning: could not load VIDREC_ENV_FILE: {e}");
            }
        }
    }
    let autoload = std::env::var("VIDREC_DOTENV")
        .map(|v| vidrec_local::config::parse_bool(&v))
        .unwrap_or(true);
    if autoload {
        let _ = dotenvy::dotenv();
    }
}

fn init_tracing(format: &str) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter = EnvFilter::try_from_env("VIDREC_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match format.to_ascii_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    }
    .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))
}

fn config_with(opts: &RunOpts) -> Config {
    let mut cfg = Config::from_env();
    if let Some(n) = opts.max_results {
        cfg.max_results = n.clamp(1, vidrec_core::MAX_VIDEO_RESULTS);
    }
    if let Some(n) = opts.sentences {
        cfg.summary_sentences = n.clamp(1, vidrec_local::summarize::MAX_SUMMARY_SENTENCES);
    }
    if opts.segment_first {
        cfg.segment_first = true;
    }
    cfg
}

fn read_document(path: &std::path::Path) -> Result<Source> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    if meta.len() > MAX_DOCUMENT_BYTES {
        anyhow::bail!(
            "{} is {} bytes; documents are limited to 25 MiB",
            path.display(),
            meta.len()
        );
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string());
    Ok(Source::document(name, bytes))
}

fn preview(s: &str, max_chars: usize) -> (String, bool) {
    let mut it = s.chars();
    let head: String = it.by_ref().take(max_chars).collect();
    (head, it.next().is_some())
}

fn render_json(rec: &Recommendation) -> serde_json::Value {
    let (content_preview, content_truncated) = preview(&rec.content, CONTENT_PREVIEW_CHARS);
    serde_json::json!({
        "schema_version": 1,
        "kind": "recommendation",
        "ok": !rec.outcome.is_failure(),
        "source": rec.source_kind,
        "content_chars": rec.content.chars().count(),
        "content_preview": content_preview,
        "content_truncated": content_truncated,
        "summary": rec.summary,
        "videos": rec.videos,
        "outcome": rec.outcome,
        "notices": rec.notices,
        "timings_ms": rec.timings_ms,
    })
}

fn render_text(rec: &Recommendation) -> String {
    let mut out = String::new();
    if !rec.content.is_empty() {
        let (head, _) = preview(&rec.content, CONTENT_PREVIEW_CHARS);
        out.push_str(&format!("Extracted content: {head}...\n"));
    }
    if let Some(s) = &rec.summary {
        let (head, _) = preview(&s.text, SUMMARY_PREVIEW_CHARS);
        out.push_str(&format!("Summarized content: {head}\n"));
    }
    if !rec.videos.is_empty() {
        out.push_str("\nRecommended YouTube videos:\n");
        for (i, v) in rec.videos.iter().enumerate() {
            let title = html_escape::decode_html_entities(&v.title);
            out.push_str(&format!("{}. {title}\n", i + 1));
            out.push_str(&format!("   watch:     {}\n", v.url));
            out.push_str(&format!("   embed:     {}\n", v.embed_url));
            out.push_str(&format!("   thumbnail: {}\n", v.thumbnail));
        }
    }
    out
}

async fn run_source(source: Source, opts: &RunOpts) -> Result<ExitCode> {
    let cfg = config_with(opts);
    if !cfg.has_api_key() {
        tracing::warn!("no YouTube API key configured; the video search step will fail");
    }
    let pipeline = Pipeline::from_config(&cfg)?;
    tracing::info!(source = source.kind(), "pipeline start");
    let rec = pipeline.run(&source).await;

    for n in &rec.notices {
        if rec.outcome.is_failure() {
            eprintln!("error: {n}");
        } else {
            eprintln!("note: {n}");
        }
    }
    match opts.output.to_ascii_lowercase().as_str() {
        "json" => println!("{}", render_json(&rec)),
        _ => print!("{}", render_text(&rec)),
    }
    Ok(if rec.outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    load_env_files();
    let cli = Cli::parse();
    init_tracing(&cli.log_format)?;

    match cli.command {
        Commands::Url(args) => run_source(Source::url(args.url), &args.opts).await,
        Commands::Pdf(args) => {
            let source = read_document(&args.path)?;
            run_source(source, &args.opts).await
        }
        Commands::Doctor(args) => {
            let cfg = Config::from_env();
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "doctor",
                "ok": cfg.has_api_key(),
                "youtube_api_key_configured": cfg.has_api_key(),
                "youtube_endpoint": cfg.youtube_endpoint,
                "max_results": cfg.max_results,
                "summary_sentences": cfg.summary_sentences,
                "segment_first": cfg.segment_first,
                "fetch_timeout_ms": cfg.fetch_timeout_ms,
                "search_timeout_ms": cfg.search_timeout_ms,
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => {
                    println!(
                        "youtube api key: {}",
                        if cfg.has_api_key() { "configured" } else { "missing" }
                    );
                    println!("youtube endpoint: {}", cfg.youtube_endpoint);
                }
                _ => println!("{v}"),
            }
            Ok(if cfg.has_api_key() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Version(args) => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "vidrec",
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => println!("vidrec {}", env!("CARGO_PKG_VERSION")),
                _ => println!("{v}"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
