//! Pipeline stages for PDF-to-PowerPoint conversion.
//!
//! Each submodule implements exactly one step. Keeping stages separate
//! makes each independently testable and lets embedders swap a stage
//! implementation (e.g. a different transcoder) without touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//! probe ──▶ pages ──▶ extract ──▶ transcode ──▶ assemble
//! (lopdf)  (selection) (pdf2svg)  (inkscape ×N)  (pptx writer)
//! ```
//!
//! 1. [`probe`]     — read page count, metadata, and page geometry; runs in
//!    `spawn_blocking` because lopdf parsing is CPU-bound
//! 2. [`pages`]     — resolve the page-selection expression to an ordered,
//!    deduplicated page list
//! 3. [`extract`]   — one whole-document external call producing an SVG
//!    artifact per page in the workspace
//! 4. [`transcode`] — per-page external SVG→EMF calls, run through
//!    [`pool`] at the job's configured parallelism
//! 5. [`assemble`]  — write the final `.pptx` container from the EMF
//!    artifacts, in selection order, cloning source metadata

pub mod assemble;
pub mod extract;
pub mod pages;
pub mod pool;
pub mod probe;
pub mod transcode;
