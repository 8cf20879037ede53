//! Eager (full-job) conversion entry points.
//!
//! [`convert`] drives the whole pipeline and returns only when the job
//! reaches a terminal state:
//!
//! ```text
//! Validating ─▶ Extracting ─▶ Transcoding ─▶ Assembling ─▶ CleaningUp ─▶ Done
//!      │             │             │              │
//!      └─────────────┴─────────────┴──────────────┴──▶ Failed (workspace kept)
//! ```
//!
//! Stages run strictly sequentially — assembly needs every selected page's
//! transcoded artifact — while the transcode stage parallelizes per-page
//! work internally up to the configured ceiling. Use
//! [`crate::stream::convert_stream`] when the caller wants progress events
//! pushed incrementally instead of a single blocking call.

use crate::config::ConversionConfig;
use crate::error::Pdf2PptError;
use crate::output::{ConversionOutput, ConversionStats, DocumentMetadata};
use crate::pipeline::assemble::{default_output_path, PptxAssembler, SlideAssembler};
use crate::pipeline::extract::{PageExtractor, Pdf2SvgExtractor};
use crate::pipeline::transcode::{InkscapeTranscoder, PageTranscoder};
use crate::pipeline::{pages, pool, probe};
use crate::progress::{ProgressEvent, Reporter};
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a PDF to a PowerPoint file next to it (`deck.pdf` → `deck.pptx`).
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Returns `Err(Pdf2PptError)` on any fatal condition — bad input,
/// pre-existing output without `overwrite`, or a failed stage. On stage
/// failure the workspace is kept on disk for inspection and no output file
/// is written.
pub async fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2PptError> {
    let input = input.as_ref();
    let output = default_output_path(input);
    convert_to(input, output, config).await
}

/// Convert a PDF to a PowerPoint file at an explicit output path.
pub async fn convert_to(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2PptError> {
    let input = input.as_ref();
    let output = output.as_ref();
    let reporter = Arc::new(Reporter::new(config.progress_sink.clone()));

    match run_pipeline(input, output, config, &reporter).await {
        Ok(result) => {
            reporter.emit(ProgressEvent::completed(result.output_path.clone()));
            Ok(result)
        }
        Err(e) => {
            reporter.emit(ProgressEvent::failed(e.to_string()));
            Err(e)
        }
    }
}

/// Synchronous wrapper around [`convert_to`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2PptError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2PptError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert_to(input, output, config))
}

/// Read PDF metadata without converting anything.
///
/// Does not require the external tools to be installed.
pub async fn inspect(input: impl AsRef<Path>) -> Result<DocumentMetadata, Pdf2PptError> {
    let info = probe::probe_document(input.as_ref()).await?;
    Ok(info.metadata)
}

// ── Internal pipeline ────────────────────────────────────────────────────

async fn run_pipeline(
    input: &Path,
    output: &Path,
    config: &ConversionConfig,
    reporter: &Arc<Reporter>,
) -> Result<ConversionOutput, Pdf2PptError> {
    let total_start = Instant::now();
    info!("Starting conversion: {} -> {}", input.display(), output.display());

    // ── Validating ───────────────────────────────────────────────────────
    reporter.emit(ProgressEvent::processing(
        0,
        format!("Starting conversion of '{}'", input.display()),
    ));

    probe::validate_pdf_file(input)?;

    if output.exists() && !config.overwrite {
        return Err(Pdf2PptError::OutputExists {
            path: output.to_path_buf(),
        });
    }

    let doc = probe::probe_document(input).await?;
    let total_pages = doc.metadata.page_count;
    if total_pages == 0 {
        return Err(Pdf2PptError::CorruptPdf {
            path: input.to_path_buf(),
            detail: "document has no pages".to_string(),
        });
    }
    info!("PDF has {} pages", total_pages);

    let selection = pages::parse_page_range(config.pages.as_deref(), total_pages)?;
    debug!("Selected {} pages for conversion", selection.len());
    reporter.emit(ProgressEvent::processing(
        10,
        format!("Read PDF ({total_pages} pages, {} selected)", selection.len()),
    ));

    // Validation is done; only now touch the filesystem workspace.
    let workspace = Workspace::acquire(input).await?;

    let result = run_stages(input, output, &doc, &selection, config, reporter, &workspace).await;

    // ── CleaningUp ───────────────────────────────────────────────────────
    // Release is called on every exit path. On failure the artifacts are
    // kept regardless of the retention flag, for postmortem.
    match result {
        Ok(mut out) => {
            workspace.release(config.keep_artifacts).await;
            out.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
            info!(
                "Conversion complete: {}/{} pages, {}ms total",
                out.pages_converted, out.total_pages, out.stats.total_duration_ms
            );
            Ok(out)
        }
        Err(e) => {
            warn!("Conversion failed during {}: {e}", e.stage());
            workspace.release(true).await;
            Err(e)
        }
    }
}

async fn run_stages(
    input: &Path,
    output: &Path,
    doc: &probe::DocumentInfo,
    selection: &[u32],
    config: &ConversionConfig,
    reporter: &Arc<Reporter>,
    workspace: &Workspace,
) -> Result<ConversionOutput, Pdf2PptError> {
    // ── Extracting ───────────────────────────────────────────────────────
    reporter.emit(ProgressEvent::processing(20, "Extracting pages to SVG"));
    let extract_start = Instant::now();

    let extractor: Arc<dyn PageExtractor> = config
        .extractor
        .clone()
        .unwrap_or_else(|| Arc::new(Pdf2SvgExtractor::new(&config.pdf2svg_path)));
    extractor.extract(input, workspace).await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    // ── Transcoding ──────────────────────────────────────────────────────
    reporter.emit(ProgressEvent::processing(50, "Transcoding pages to EMF"));
    let transcode_start = Instant::now();

    let transcoder: Arc<dyn PageTranscoder> = config
        .transcoder
        .clone()
        .unwrap_or_else(|| Arc::new(InkscapeTranscoder::new(&config.inkscape_path)));

    let done = Arc::new(AtomicUsize::new(0));
    let total = selection.len();
    let pdf_path: PathBuf = input.to_path_buf();

    let outcomes = pool::run_all(selection, config.parallel, |page| {
        let transcoder = Arc::clone(&transcoder);
        let reporter = Arc::clone(reporter);
        let done = Arc::clone(&done);
        let pdf = pdf_path.clone();
        let ws = workspace.clone();
        async move {
            let outcome = transcoder.transcode(&pdf, page, &ws).await;
            let n = done.fetch_add(1, Ordering::SeqCst) + 1;
            // Interpolate the transcode stage across the 50–80 band.
            let percent = 50 + (n * 30 / total) as u8;
            reporter.emit(ProgressEvent::processing(
                percent,
                format!("Transcoded page {page} ({n}/{total})"),
            ));
            outcome
        }
    })
    .await;
    let transcode_duration_ms = transcode_start.elapsed().as_millis() as u64;

    // Any hard failure is stage-fatal; warnings accumulate in selection
    // order (outcomes are index-aligned with the selection).
    if let Some(failed) = outcomes.iter().find(|o| !o.ok) {
        return Err(Pdf2PptError::TranscodeFailed {
            page: failed.page,
            detail: failed
                .detail
                .clone()
                .unwrap_or_else(|| "unknown failure".to_string()),
        });
    }
    let warning_pages: Vec<u32> = outcomes
        .iter()
        .filter(|o| o.warning.is_some())
        .map(|o| o.page)
        .collect();
    if !warning_pages.is_empty() {
        warn!("Pages {warning_pages:?} may have transparency issues");
    }

    // ── Assembling ───────────────────────────────────────────────────────
    reporter.emit(ProgressEvent::processing(80, "Creating PowerPoint"));
    let assemble_start = Instant::now();

    let assembler: Arc<dyn SlideAssembler> = config
        .assembler
        .clone()
        .unwrap_or_else(|| Arc::new(PptxAssembler));
    assembler.assemble(doc, selection, workspace, output).await?;
    let assemble_duration_ms = assemble_start.elapsed().as_millis() as u64;

    Ok(ConversionOutput {
        output_path: output.to_path_buf(),
        pages_converted: selection.len(),
        total_pages: doc.metadata.page_count,
        warning_pages,
        metadata: doc.metadata.clone(),
        stats: ConversionStats {
            total_duration_ms: 0, // filled in by run_pipeline
            extract_duration_ms,
            transcode_duration_ms,
            assemble_duration_ms,
        },
    })
}
