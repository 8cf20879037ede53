//! Error types for the pdf2ppt library.
//!
//! One enum covers the whole pipeline, but the variants fall into three
//! groups with different handling policies:
//!
//! * **Caller-input errors** ([`Pdf2PptError::MalformedExpression`],
//!   [`Pdf2PptError::PageOutOfRange`], [`Pdf2PptError::OutputExists`]) —
//!   surfaced before any work happens; the workspace is never touched.
//!
//! * **Tooling errors** ([`Pdf2PptError::ExtractionFailed`],
//!   [`Pdf2PptError::TranscodeFailed`], [`Pdf2PptError::AssemblyFailed`]) —
//!   fatal for the job; the workspace is kept on disk so the failing page
//!   artifacts can be inspected.
//!
//! * **Cleanup errors** — never constructed at all: a failed workspace
//!   removal is logged and swallowed, because the deliverable (the output
//!   file) already exists by the time cleanup runs.
//!
//! Per-page transcode problems are deliberately NOT a variant of their own:
//! a quality-degradation diagnostic becomes a warning in the final result,
//! and any other per-page failure escalates to [`Pdf2PptError::TranscodeFailed`]
//! for the whole stage. There is no partial-success state where pages are
//! silently dropped from the output.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2ppt library.
#[derive(Debug, Error)]
pub enum Pdf2PptError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf repaired.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    // ── Page-selection errors ─────────────────────────────────────────────
    /// A token in the page-range expression could not be parsed.
    #[error("Invalid page range token '{token}'\nExpected a page number or 'start-end' with start <= end, e.g. \"1-5,7,9-11\".")]
    MalformedExpression { token: String },

    /// A token resolved to a page number outside the document.
    #[error("Page range token '{token}' is out of range (document has {total} pages)")]
    PageOutOfRange { token: String, total: usize },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Output file exists and overwrite was not permitted.
    #[error("Output file exists: '{path}'\nPass --force (or set overwrite) to replace it.")]
    OutputExists { path: PathBuf },

    // ── Tooling errors ────────────────────────────────────────────────────
    /// The whole-document SVG extraction failed (missing binary, crash,
    /// corrupt document).
    #[error("Failed to extract PDF pages to SVG: {detail}\nIs pdf2svg installed? (brew install pdf2svg / apt install pdf2svg)")]
    ExtractionFailed { detail: String },

    /// A page's SVG-to-EMF transcode failed hard. Quality warnings do not
    /// produce this error.
    #[error("Failed to transcode page {page} to EMF: {detail}\nIs inkscape installed? (brew install inkscape / apt install inkscape)")]
    TranscodeFailed { page: u32, detail: String },

    /// Writing the final presentation container failed.
    #[error("Failed to assemble presentation: {detail}")]
    AssemblyFailed { detail: String },

    // ── Workspace errors ──────────────────────────────────────────────────
    /// Could not create the intermediate-artifact directory.
    #[error("Failed to create workspace directory '{path}': {source}")]
    WorkspaceFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2PptError {
    /// Name of the pipeline stage this error originated from, for progress
    /// events and structured reports.
    pub fn stage(&self) -> &'static str {
        match self {
            Pdf2PptError::InputNotFound { .. }
            | Pdf2PptError::PermissionDenied { .. }
            | Pdf2PptError::NotAPdf { .. }
            | Pdf2PptError::CorruptPdf { .. }
            | Pdf2PptError::MalformedExpression { .. }
            | Pdf2PptError::PageOutOfRange { .. }
            | Pdf2PptError::OutputExists { .. }
            | Pdf2PptError::InvalidConfig(_) => "validating",
            Pdf2PptError::ExtractionFailed { .. } => "extracting",
            Pdf2PptError::TranscodeFailed { .. } => "transcoding",
            Pdf2PptError::AssemblyFailed { .. } => "assembling",
            Pdf2PptError::WorkspaceFailed { .. } | Pdf2PptError::Internal(_) => "pipeline",
        }
    }
}
