//! # pdf2ppt
//!
//! Convert PDF slide decks to PowerPoint while keeping everything vector.
//!
//! ## Why this crate?
//!
//! Rasterising slides (PDF → PNG → PPTX) throws away resolution: text gets
//! fuzzy the moment someone projects the deck on a 4K screen. This crate
//! keeps the original vector graphics end to end — each page travels
//! through SVG and EMF and lands in the presentation as a scalable picture,
//! so LaTeX Beamer and Typst Touying decks survive conversion pixel-perfect
//! at any zoom.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Probe      page count, metadata, page geometry (lopdf)
//!  ├─ 2. Select     resolve the page expression ("1-5,7,9-11")
//!  ├─ 3. Extract    whole-document pdf2svg call → page-N.svg
//!  ├─ 4. Transcode  concurrent inkscape calls → page-N.emf (+ transparency scan)
//!  ├─ 5. Assemble   .pptx container, slides in selection order, metadata cloned
//!  └─ 6. Clean up   workspace removed (kept on failure or --no-clean)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2ppt::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .pages("1-10")
//!         .parallel(8)
//!         .build()?;
//!     let output = convert("slides.pdf", &config).await?;
//!     println!("{} pages -> {}", output.pages_converted, output.output_path.display());
//!     if !output.warning_pages.is_empty() {
//!         eprintln!("transparency warnings on pages {:?}", output.warning_pages);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## External tools
//!
//! The extract and transcode stages shell out to `pdf2svg` and `inkscape`.
//! Use [`deps::check_dependencies`] (or the CLI's `--check-deps`) to verify
//! both are installed. Stage implementations are trait seams — embedders
//! can inject their own extractor/transcoder/assembler through the config
//! builder, which is also how the test suite runs without external tools.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2ppt` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2ppt = { version = "0.4", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod deps;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;
pub mod workspace;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, MAX_PARALLEL};
pub use convert::{convert, convert_sync, convert_to, inspect};
pub use deps::{check_dependencies, DependencyReport};
pub use error::Pdf2PptError;
pub use output::{
    ConversionOutput, ConversionStats, DocumentMetadata, JobReport, QualityWarning, ReportStatus,
    StageOutcome,
};
pub use pipeline::assemble::{PptxAssembler, SlideAssembler};
pub use pipeline::extract::{PageExtractor, Pdf2SvgExtractor};
pub use pipeline::pages::parse_page_range;
pub use pipeline::probe::DocumentInfo;
pub use pipeline::transcode::{InkscapeTranscoder, PageTranscoder};
pub use progress::{NoopSink, ProgressEvent, ProgressSink, ProgressStatus, SharedSink};
pub use stream::{convert_stream, convert_stream_to, EventStream};
pub use workspace::Workspace;
