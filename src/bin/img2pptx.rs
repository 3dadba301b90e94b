//! CLI binary for img2pptx.
//!
//! A thin shim over the library crate: `serve` runs the upload service,
//! `convert` builds a deck from local files.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use img2pptx::{
    build_deck_from_paths, server, write_deck_to_file, DeckConfig, DeckProgressCallback,
    DeckStats, FileError, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the input files plus a log line
/// per file.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Building");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl DeckProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
    }

    fn on_file_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_file_complete(&self, _index: usize, _total: usize, name: &str, rasters: usize) {
        let slides = if rasters == 1 {
            "1 slide".to_string()
        } else {
            format!("{rasters} slides")
        };
        self.bar
            .println(format!("  {} {:<40} {}", green("✓"), name, dim(&slides)));
        self.bar.inc(1);
    }

    fn on_file_skipped(&self, _index: usize, _total: usize, name: &str, reason: &str) {
        self.bar
            .println(format!("  {} {:<40} {}", red("✗"), name, dim(reason)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _slide_count: usize) {
        self.bar.finish_and_clear();
    }
}

// ── CLI definition ───────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  img2pptx serve --port 8080
  img2pptx convert scans/*.jpg handout.pdf -o lecture.pptx

PDF SUPPORT:
  PDF pages are rendered with pdfium. Install it system-wide or point
  PDFIUM_LIB_PATH at libpdfium (or the directory holding it). Without it,
  images still work and PDFs are skipped.
"#;

/// Turn images and PDFs into a PowerPoint deck, one slide per image or page.
#[derive(Parser, Debug)]
#[command(
    name = "img2pptx",
    version,
    about = "Turn images and PDFs into a PowerPoint deck, one slide per image or page",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "IMG2PPTX_VERBOSE")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP upload service.
    Serve {
        /// Address to bind.
        #[arg(long, env = "IMG2PPTX_HOST", default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to listen on.
        #[arg(short, long, env = "IMG2PPTX_PORT", default_value_t = 5000)]
        port: u16,

        /// Request body ceiling in MiB.
        #[arg(long, env = "IMG2PPTX_MAX_UPLOAD_MB", default_value_t = 200,
              value_parser = clap::value_parser!(u64).range(1..=4096))]
        max_upload_mb: u64,

        #[command(flatten)]
        deck: DeckArgs,
    },

    /// Build a deck from local files.
    Convert {
        /// Images (png, jpg, jpeg, gif, bmp, tiff) and PDFs, in slide order.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output `.pptx` path.
        #[arg(short, long, default_value = "presentation.pptx")]
        output: PathBuf,

        /// Disable progress bar.
        #[arg(long, env = "IMG2PPTX_NO_PROGRESS")]
        no_progress: bool,

        /// Suppress all output except errors.
        #[arg(short, long, env = "IMG2PPTX_QUIET")]
        quiet: bool,

        /// Print batch statistics and skipped files as JSON on stdout.
        #[arg(long, env = "IMG2PPTX_JSON")]
        json: bool,

        #[command(flatten)]
        deck: DeckArgs,
    },
}

/// `--json` report.
#[derive(Serialize)]
struct Report<'a> {
    output: &'a Path,
    stats: &'a DeckStats,
    skipped: &'a [FileError],
}

/// Pipeline knobs shared by both subcommands.
#[derive(Args, Debug)]
struct DeckArgs {
    /// PDF rendering DPI (36–600).
    #[arg(long, env = "IMG2PPTX_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(36..=600))]
    dpi: u32,

    /// Largest embedded raster width in pixels.
    #[arg(long, env = "IMG2PPTX_MAX_WIDTH", default_value_t = 1920)]
    max_width: u32,

    /// Largest embedded raster height in pixels.
    #[arg(long, env = "IMG2PPTX_MAX_HEIGHT", default_value_t = 1080)]
    max_height: u32,
}

impl DeckArgs {
    fn to_config(
        &self,
        max_upload_bytes: Option<usize>,
        progress: Option<ProgressCallback>,
    ) -> Result<DeckConfig> {
        let mut builder = DeckConfig::builder()
            .pdf_dpi(self.dpi)
            .max_image_size(self.max_width, self.max_height);
        if let Some(limit) = max_upload_bytes {
            builder = builder.max_upload_bytes(limit);
        }
        if let Some(cb) = progress {
            builder = builder.progress_callback(cb);
        }
        builder.build().context("Invalid configuration")
    }
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            host,
            port,
            max_upload_mb,
            deck,
        } => {
            init_tracing(if cli.verbose {
                "debug"
            } else {
                "info,tower_http=debug"
            });

            let limit = usize::try_from(max_upload_mb * 1024 * 1024)
                .context("Upload limit does not fit in memory on this platform")?;
            let config = Arc::new(deck.to_config(Some(limit), None)?);
            tracing::info!("{:?}", config);

            let addr = SocketAddr::new(host, port);
            server::serve(addr, config)
                .await
                .with_context(|| format!("Server on {} failed", addr))?;
        }

        Command::Convert {
            files,
            output,
            no_progress,
            quiet,
            json,
            deck,
        } => {
            // Suppress INFO-level library logs when the progress bar is active;
            // the bar provides all the feedback that matters to the user.
            let show_progress = !quiet && !no_progress && !json;
            let filter = if cli.verbose {
                "debug"
            } else if quiet || show_progress {
                "error"
            } else {
                "info"
            };
            init_tracing(filter);

            let bar = show_progress.then(CliProgressCallback::new);
            let progress: Option<ProgressCallback> = bar
                .clone()
                .map(|cb| cb as Arc<dyn DeckProgressCallback>);
            let config = deck.to_config(None, progress)?;

            // Decoding and pdfium are CPU-bound; keep them off the runtime.
            let result = tokio::task::spawn_blocking(move || {
                build_deck_from_paths(&files, &config)
                    .and_then(|out| write_deck_to_file(&out, &output).map(|()| (out, output)))
            })
            .await
            .context("Deck task panicked")?;
            // A failed batch never reaches on_batch_complete.
            if let Some(cb) = bar {
                cb.bar.finish_and_clear();
            }
            let (out, output) = result.context("Conversion failed")?;

            if json {
                let report = Report {
                    output: &output,
                    stats: &out.stats,
                    skipped: &out.skipped,
                };
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialise report")?
                );
            } else if !quiet {
                for skipped in &out.skipped {
                    eprintln!("  {} {}", yellow("⚠"), skipped);
                }
                eprintln!(
                    "{}  {} slides from {}/{} files  {}ms  →  {}",
                    if out.is_complete() {
                        green("✔")
                    } else {
                        yellow("⚠")
                    },
                    out.stats.slide_count,
                    out.stats.files_used,
                    out.stats.files_received,
                    out.stats.total_duration_ms,
                    bold(&output.display().to_string()),
                );
            }
        }
    }

    Ok(())
}
