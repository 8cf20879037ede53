//! Result types returned by a conversion job.
//!
//! [`ConversionOutput`] is the rich library-level result; [`JobReport`] is
//! the flat, transport-friendly summary (the shape CLI `--json` prints and
//! tool-invocation surfaces return). Both serialise with serde so every
//! caller renders the same data.

use crate::error::Pdf2PptError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-page result of one pipeline stage.
///
/// Produced by the transcode worker pool; index-aligned with the submitted
/// page sequence so "page N's outcome" is always reconstructible regardless
/// of completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutcome {
    /// 1-indexed page number this outcome belongs to.
    pub page: u32,
    /// Structural success. A page with a quality warning is still `ok`.
    pub ok: bool,
    /// Failure detail when `ok` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Quality diagnostic when `ok` is true but fidelity may degrade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<QualityWarning>,
}

impl StageOutcome {
    /// Clean success.
    pub fn ok(page: u32) -> Self {
        Self {
            page,
            ok: true,
            detail: None,
            warning: None,
        }
    }

    /// Structural success with a quality diagnostic.
    pub fn ok_with_warning(page: u32, warning: QualityWarning) -> Self {
        Self {
            page,
            ok: true,
            detail: None,
            warning: Some(warning),
        }
    }

    /// Hard failure.
    pub fn failed(page: u32, detail: impl Into<String>) -> Self {
        Self {
            page,
            ok: false,
            detail: Some(detail.into()),
            warning: None,
        }
    }
}

/// Non-fatal per-page quality diagnostic.
///
/// The page converted and will appear in the output, but its artifact may
/// render with reduced fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityWarning {
    /// The source page uses semi-transparent content that the EMF
    /// intermediate format is known to flatten or drop.
    TransparencyRisk,
}

/// Document metadata read from the source PDF.
///
/// Cloned into the output container's core properties during assembly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// Total page count of the source document.
    pub page_count: usize,
}

/// Wall-clock accounting for one conversion job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total_duration_ms: u64,
    pub extract_duration_ms: u64,
    pub transcode_duration_ms: u64,
    pub assemble_duration_ms: u64,
}

/// Terminal artifact of a successful conversion job.
///
/// Failures are reported as `Err(Pdf2PptError)` from the `convert*`
/// functions; this struct only ever describes a job whose output file
/// exists on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Resolved path of the written presentation.
    pub output_path: PathBuf,
    /// Number of pages carried into the output (= selection size).
    pub pages_converted: usize,
    /// Total page count of the source document.
    pub total_pages: usize,
    /// Pages flagged with a quality warning, in selection order.
    pub warning_pages: Vec<u32>,
    /// Source document metadata.
    pub metadata: DocumentMetadata,
    /// Timing breakdown.
    pub stats: ConversionStats,
}

/// Flat success/error summary for transport surfaces.
///
/// Mirrors the result dictionary tool callers expect:
/// `{"status":"success","output":"deck.pptx","pages_converted":4,...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_converted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
    /// Human-readable warning summary, present when any page was flagged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warning_pages: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Pipeline stage the error originated from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Error,
}

impl JobReport {
    pub fn success(output: &ConversionOutput) -> Self {
        Self {
            status: ReportStatus::Success,
            output: Some(output.output_path.clone()),
            pages_converted: Some(output.pages_converted),
            total_pages: Some(output.total_pages),
            warning: warning_summary(&output.warning_pages),
            warning_pages: output.warning_pages.clone(),
            error: None,
            stage: None,
        }
    }

    pub fn error(err: &Pdf2PptError) -> Self {
        Self {
            status: ReportStatus::Error,
            output: None,
            pages_converted: None,
            total_pages: None,
            warning: None,
            warning_pages: Vec::new(),
            error: Some(err.to_string()),
            stage: Some(err.stage().to_string()),
        }
    }
}

/// Render the per-page warning list the way the original tool surfaced it.
fn warning_summary(pages: &[u32]) -> Option<String> {
    if pages.is_empty() {
        None
    } else {
        Some(format!("Pages {pages:?} may have transparency issues"))
    }
}
