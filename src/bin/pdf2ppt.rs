//! CLI binary for pdf2ppt.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, renders progress events, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2ppt::{
    check_dependencies, convert_to, inspect, ConversionConfig, JobReport, ProgressEvent,
    ProgressSink, ProgressStatus, SharedSink,
};
use std::io;
use std::path::PathBuf;
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress sink using indicatif ────────────────────────────────────────

/// Terminal progress sink: a single percent bar driven by the pipeline's
/// event sequence. Percent is already monotonic, so the bar only moves
/// forward even while transcode workers complete out of order.
struct CliProgressSink {
    bar: ProgressBar,
}

impl CliProgressSink {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ProgressSink for CliProgressSink {
    fn emit(&self, event: ProgressEvent) {
        match event.status {
            ProgressStatus::Processing => {
                self.bar.set_position(event.percent as u64);
                self.bar.set_message(event.message);
            }
            ProgressStatus::Completed | ProgressStatus::Error => {
                // The summary line is printed by main after the call returns.
                self.bar.finish_and_clear();
            }
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (writes lecture.pptx next to the input)
  pdf2ppt lecture.pdf

  # Explicit output path, overwrite an existing file
  pdf2ppt lecture.pdf /tmp/deck.pptx --force

  # Convert a page subset with 8 parallel workers
  pdf2ppt --pages 1-5,7,9-11 --parallel 8 slides.pdf

  # Keep the intermediate SVG/EMF artifacts for debugging
  pdf2ppt --no-clean slides.pdf

  # Print PDF metadata only, no conversion
  pdf2ppt --inspect-only slides.pdf

  # Machine-readable result
  pdf2ppt --json slides.pdf > result.json

  # Verify pdf2svg and inkscape are installed
  pdf2ppt --check-deps

EXTERNAL TOOLS:
  pdf2svg    extracts each PDF page to SVG      brew install pdf2svg
  inkscape   transcodes SVG to EMF              brew install inkscape

  Debian/Ubuntu: sudo apt-get install pdf2svg inkscape

  A missing tool fails the job with an install hint; run --check-deps to
  verify the environment before converting.

ENVIRONMENT VARIABLES:
  PDF2PPT_PAGES      Default page selection expression
  PDF2PPT_PARALLEL   Default worker count (1-16)
  PDF2PPT_PDF2SVG    Path to the pdf2svg binary
  PDF2PPT_INKSCAPE   Path to the inkscape binary

NOTES:
  Pages using semi-transparent content are converted but flagged: the EMF
  intermediate format has no alpha channel, so those pages may render with
  reduced fidelity. The warning lists the affected page numbers.
"#;

/// Convert PDF slide decks to PowerPoint with lossless vector graphics.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2ppt",
    version,
    about = "Convert PDF slides to PowerPoint with lossless vector graphics",
    long_about = "Convert PDF slide decks (LaTeX Beamer, Typst Touying, exported Keynote) to \
PowerPoint while keeping every page as vector graphics. Pages travel through SVG and EMF and \
land in the .pptx as scalable pictures — no rasterisation at any step.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF file.
    #[arg(required_unless_present = "check_deps")]
    input: Option<PathBuf>,

    /// Output PPTX file. Defaults to the input path with a .pptx extension.
    output: Option<PathBuf>,

    /// Page selection: e.g. 5, 3-15, or 1-5,7,9-11. Omit for all pages.
    #[arg(long, env = "PDF2PPT_PAGES")]
    pages: Option<String>,

    /// Number of concurrent transcode workers.
    #[arg(short = 'j', long, env = "PDF2PPT_PARALLEL", default_value_t = 4,
          value_parser = clap::value_parser!(u8).range(1..=16))]
    parallel: u8,

    /// Overwrite the output file if it exists.
    #[arg(short, long)]
    force: bool,

    /// Keep the intermediate-artifact directory after conversion.
    #[arg(long)]
    no_clean: bool,

    /// Path to the pdf2svg binary.
    #[arg(long, env = "PDF2PPT_PDF2SVG", default_value = "pdf2svg")]
    pdf2svg: PathBuf,

    /// Path to the inkscape binary.
    #[arg(long, env = "PDF2PPT_INKSCAPE", default_value = "inkscape")]
    inkscape: PathBuf,

    /// Output a structured JSON report instead of human-readable text.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Check that pdf2svg and inkscape are installed, then exit.
    #[arg(long)]
    check_deps: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library logs are muted while the progress bar runs; the bar is the
    // feedback channel that matters.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Build config (also used by --check-deps for tool paths) ──────────
    let mut builder = ConversionConfig::builder()
        .parallel(cli.parallel as usize)
        .overwrite(cli.force)
        .keep_artifacts(cli.no_clean)
        .pdf2svg_path(&cli.pdf2svg)
        .inkscape_path(&cli.inkscape);
    if let Some(ref pages) = cli.pages {
        builder = builder.pages(pages.as_str());
    }

    let progress_sink: Option<SharedSink> = if show_progress && !cli.inspect_only {
        Some(CliProgressSink::new() as SharedSink)
    } else {
        None
    };
    if let Some(sink) = progress_sink {
        builder = builder.progress_sink(sink);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Dependency check mode ────────────────────────────────────────────
    if cli.check_deps {
        let report = check_dependencies(&config).await;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            let tick = |ok: bool| if ok { green("✓") } else { red("✗") };
            println!("{} pdf2svg   ({})", tick(report.pdf2svg), cli.pdf2svg.display());
            println!("{} inkscape  ({})", tick(report.inkscape), cli.inkscape.display());
            if let Some(ref hint) = report.install_hint {
                println!("\n{hint}");
            }
        }
        if !report.all_installed {
            std::process::exit(1);
        }
        return Ok(());
    }

    let input = cli.input.clone().context("INPUT is required")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!("{}", serde_json::to_string_pretty(&meta)?);
        } else {
            println!("File:      {}", input.display());
            if let Some(ref t) = meta.title {
                println!("Title:     {t}");
            }
            if let Some(ref a) = meta.author {
                println!("Author:    {a}");
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:   {s}");
            }
            println!("Pages:     {}", meta.page_count);
            if let Some(ref p) = meta.producer {
                println!("Producer:  {p}");
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:   {c}");
            }
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| input.with_extension("pptx"));

    match convert_to(&input, &output_path, &config).await {
        Ok(output) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&JobReport::success(&output))?);
            } else if !cli.quiet {
                eprintln!(
                    "{} {}/{} pages  {}ms  →  {}",
                    green("✔"),
                    output.pages_converted,
                    output.total_pages,
                    output.stats.total_duration_ms,
                    bold(&output.output_path.display().to_string()),
                );
                if !output.warning_pages.is_empty() {
                    eprintln!(
                        "{} Pages {:?} may have transparency issues",
                        cyan("⚠"),
                        output.warning_pages,
                    );
                }
                eprintln!(
                    "   {}",
                    dim(&format!(
                        "extract {}ms / transcode {}ms / assemble {}ms",
                        output.stats.extract_duration_ms,
                        output.stats.transcode_duration_ms,
                        output.stats.assemble_duration_ms,
                    )),
                );
            }
            Ok(())
        }
        Err(e) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&JobReport::error(&e))?);
                std::process::exit(1);
            }
            Err(e).context("Conversion failed")
        }
    }
}
