//! CLI binary for memorial-pdf.
//!
//! Without `--render` it runs the HTTP service. With `--render` it reads a
//! request body from a file (or stdin) and writes the memorial PDF locally.

use anyhow::{Context, Result};
use chrono::FixedOffset;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use memorial_pdf::config::DEFAULT_BODY_LIMIT;
use memorial_pdf::{
    generate_to_file, run_server, DocumentRequest, ProgressCallback, RenderConfig,
    RenderProgressCallback, ServerConfig,
};
use std::io::{self, Read};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a page counter bar plus one log line per
/// photo that fell back to the placeholder.
struct CliProgressCallback {
    bar: ProgressBar,
    fallbacks: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Rendering");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            fallbacks: AtomicUsize::new(0),
        })
    }
}

impl RenderProgressCallback for CliProgressCallback {
    fn on_render_start(&self, total_pages: usize) {
        self.bar.set_length(total_pages as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering memorial of {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, _page_num: usize, _total_pages: usize) {
        self.bar.inc(1);
    }

    fn on_asset_fallback(&self, page_num: usize, error: &str) {
        self.fallbacks.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Page {:>3}  {}",
            yellow("⚠"),
            page_num,
            dim(&format!("placeholder: {error}")),
        ));
    }

    fn on_render_complete(&self, total_pages: usize, bytes: usize) {
        self.bar.finish_and_clear();
        let fallbacks = self.fallbacks.load(Ordering::SeqCst);
        eprintln!(
            "{} {} pages rendered  {}{}",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&format!("{bytes} bytes")),
            if fallbacks > 0 {
                format!("  ({} placeholders)", yellow(&fallbacks.to_string()))
            } else {
                String::new()
            },
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service on $PORT (default 5000), photos under ./public
  memorial-pdf

  # Serve a different public directory on port 8080
  memorial-pdf --public-dir /srv/memorial/public --port 8080

  # Render a request body locally
  memorial-pdf --render request.json -o memorial.pdf

  # Read the body from stdin, dates in UTC-03:00
  cat request.json | memorial-pdf --render - --utc-offset=-03:00 -o memorial.pdf

REQUEST BODY:
  {
    "title": "Familia García",
    "data": [
      { "file": "/uploads/playa.jpg", "title": "Verano",
        "message": "Siempre con nosotros.", "createdAt": "2024-01-15T10:30:00Z" }
    ]
  }

ENVIRONMENT VARIABLES:
  PORT              Listening port for the HTTP service
  RUST_LOG          tracing filter, overrides --verbose / --quiet
"#;

/// Generate decorative memorial PDF books from photo entries.
#[derive(Parser, Debug)]
#[command(
    name = "memorial-pdf",
    version,
    about = "Generate decorative memorial PDF books from photo entries",
    long_about = "Serve the memorial PDF endpoint over HTTP, or render a single request body \
to a local file. Each document has a cover page, one page per entry with its photo and \
message, and a closing page.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Render this request JSON file ("-" for stdin) instead of serving.
    #[arg(long, value_name = "JSON")]
    render: Option<PathBuf>,

    /// Output path for --render.
    #[arg(short, long, env = "MEMORIAL_OUTPUT", default_value = "memorial.pdf")]
    output: PathBuf,

    /// Interface to bind.
    #[arg(long, env = "MEMORIAL_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Listening port.
    #[arg(short, long, env = "PORT", default_value_t = memorial_pdf::config::DEFAULT_PORT)]
    port: u16,

    /// Static root; photos resolve against it and `<dir>/uploads` is served.
    #[arg(long, env = "MEMORIAL_PUBLIC_DIR", default_value = "public")]
    public_dir: PathBuf,

    /// Maximum request body size in bytes.
    #[arg(long, env = "MEMORIAL_BODY_LIMIT", default_value_t = DEFAULT_BODY_LIMIT)]
    body_limit: usize,

    /// Page margin in points (10–120).
    #[arg(long, env = "MEMORIAL_MARGIN", default_value_t = 40.0)]
    margin: f32,

    /// Longest edge photos are downscaled to before embedding.
    #[arg(long, env = "MEMORIAL_MAX_IMAGE_PIXELS", default_value_t = 2000)]
    max_image_pixels: u32,

    /// Write uncompressed page streams.
    #[arg(long, env = "MEMORIAL_NO_COMPRESS")]
    no_compress: bool,

    /// Offset used for printed dates, e.g. +02:00 (default: local time).
    #[arg(long, env = "MEMORIAL_UTC_OFFSET", allow_hyphen_values = true)]
    utc_offset: Option<String>,

    /// Disable progress bar.
    #[arg(long, env = "MEMORIAL_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MEMORIAL_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MEMORIAL_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs in render mode.
    let show_progress = cli.render.is_some() && !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn RenderProgressCallback>)
    } else {
        None
    };
    let render = build_render_config(&cli, progress_cb)?;

    // ── Render mode ──────────────────────────────────────────────────────
    if let Some(ref input) = cli.render {
        let body = read_body(input)?;
        let request = DocumentRequest::from_slice(&body).context("Invalid request body")?;
        let stats = generate_to_file(request, &cli.output, &render)
            .await
            .context("Render failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {} pages  {} photos  {} placeholders  {}ms  →  {}",
                green("✔"),
                stats.total_pages,
                stats.images_embedded,
                stats.placeholders,
                stats.duration_ms,
                bold(&cli.output.display().to_string()),
            );
            if stats.truncated_messages > 0 {
                eprintln!(
                    "   {} messages shortened to fit their panel",
                    yellow(&stats.truncated_messages.to_string())
                );
            }
        }
        return Ok(());
    }

    // ── Serve mode ───────────────────────────────────────────────────────
    let mut server = ServerConfig {
        host: cli.host,
        port: cli.port,
        body_limit: cli.body_limit,
        render,
        ..ServerConfig::default()
    }
    .with_public_dir(&cli.public_dir);
    server.render.progress_callback = None;

    run_server(server).await.context("Server failed")?;
    Ok(())
}

/// Map CLI args to `RenderConfig`.
fn build_render_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<RenderConfig> {
    let mut builder = RenderConfig::builder()
        .assets_root(&cli.public_dir)
        .page_margin(cli.margin)
        .max_image_pixels(cli.max_image_pixels)
        .compress(!cli.no_compress);

    if let Some(ref raw) = cli.utc_offset {
        builder = builder.utc_offset(parse_offset(raw)?);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--utc-offset` values such as `+02:00` or `Z`.
fn parse_offset(s: &str) -> Result<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).context("UTC offset out of range");
    }
    s.parse::<FixedOffset>()
        .with_context(|| format!("Invalid UTC offset '{s}' (expected e.g. +02:00)"))
}

fn read_body(input: &PathBuf) -> Result<Vec<u8>> {
    if input.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read request from stdin")?;
        return Ok(buf);
    }
    std::fs::read(input).with_context(|| format!("Failed to read request from {:?}", input))
}
