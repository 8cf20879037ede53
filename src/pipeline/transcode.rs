//! Stage 2: per-page SVG-to-EMF transcoding.
//!
//! One external invocation per selected page, run through the worker pool
//! at the job's configured parallelism. The transcoder never fails the job
//! itself — it reports a [`StageOutcome`] per page and leaves escalation to
//! the orchestrator: a hard failure on any page is stage-fatal, while a
//! transparency diagnostic is folded into the result as a warning.
//!
//! ## Transparency scan
//!
//! The EMF intermediate format has no alpha channel, so semi-transparent
//! source content flattens or drops during transcoding. Before invoking the
//! tool, the page's SVG is scanned for transparency constructs and flagged
//! with [`QualityWarning::TransparencyRisk`] when any are present. The page
//! still converts — the flag only tells the caller fidelity may degrade.

use crate::output::{QualityWarning, StageOutcome};
use crate::workspace::Workspace;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

/// Per-page transcode contract.
///
/// Inject a custom implementation through
/// [`crate::config::ConversionConfigBuilder::transcoder`].
#[async_trait]
pub trait PageTranscoder: Send + Sync {
    /// Convert one page's stage-1 artifact to the stage-2 format.
    ///
    /// Infallible by signature: failures are encoded in the returned
    /// [`StageOutcome`] so one page can never abort its siblings.
    async fn transcode(&self, pdf: &Path, page: u32, workspace: &Workspace) -> StageOutcome;
}

/// Default transcoder: shells out to
/// `inkscape <ws>/page-N.svg --export-filename <ws>/page-N.emf`.
pub struct InkscapeTranscoder {
    tool: PathBuf,
}

impl InkscapeTranscoder {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }
}

#[async_trait]
impl PageTranscoder for InkscapeTranscoder {
    async fn transcode(&self, _pdf: &Path, page: u32, workspace: &Workspace) -> StageOutcome {
        let svg = workspace.svg_path(page);
        let emf = workspace.emf_path(page);

        if !svg.exists() {
            return StageOutcome::failed(
                page,
                format!("missing extraction artifact '{}'", svg.display()),
            );
        }

        let transparency = match tokio::fs::read_to_string(&svg).await {
            Ok(content) => svg_has_transparency(&content),
            Err(e) => {
                // Unreadable SVG still goes to the tool; only the scan is skipped.
                warn!("Could not scan page {page} for transparency: {e}");
                false
            }
        };

        let output = match Command::new(&self.tool)
            .arg(&svg)
            .arg("--export-filename")
            .arg(&emf)
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                return StageOutcome::failed(
                    page,
                    format!("failed to run '{}': {e}", self.tool.display()),
                );
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return StageOutcome::failed(
                page,
                format!("'{}' {}: {}", self.tool.display(), output.status, stderr.trim()),
            );
        }

        if !emf.exists() {
            return StageOutcome::failed(
                page,
                format!("tool exited cleanly but produced no '{}'", emf.display()),
            );
        }

        debug!("Transcoded page {page}");
        if transparency {
            StageOutcome::ok_with_warning(page, QualityWarning::TransparencyRisk)
        } else {
            StageOutcome::ok(page)
        }
    }
}

/// Markers that only appear when a page carries non-opaque content.
/// Opaque values (`opacity="1"`) deliberately do not match.
const TRANSPARENCY_MARKERS: &[&str] = &[
    "<mask",
    "mask=\"url(",
    "<filter",
    "feGaussianBlur",
    "fill-opacity=\"0.",
    "stroke-opacity=\"0.",
    "opacity=\"0.",
    "fill-opacity:0.",
    "stroke-opacity:0.",
    "opacity:0.",
    "rgba(",
];

/// Whether the SVG uses constructs the EMF format degrades.
pub fn svg_has_transparency(svg: &str) -> bool {
    TRANSPARENCY_MARKERS.iter().any(|m| svg.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_svg_is_not_flagged() {
        let svg = r##"<svg><rect fill="#ff0000" opacity="1"/></svg>"##;
        assert!(!svg_has_transparency(svg));
    }

    #[test]
    fn partial_opacity_is_flagged() {
        assert!(svg_has_transparency(r#"<svg><rect fill-opacity="0.5"/></svg>"#));
        assert!(svg_has_transparency(r#"<svg><g opacity="0.85"></g></svg>"#));
        assert!(svg_has_transparency(r#"<svg><g style="opacity:0.3"></g></svg>"#));
    }

    #[test]
    fn masks_and_filters_are_flagged() {
        assert!(svg_has_transparency("<svg><mask id=\"m\"/></svg>"));
        assert!(svg_has_transparency("<svg><filter><feGaussianBlur/></filter></svg>"));
        assert!(svg_has_transparency("<svg><g mask=\"url(#m)\"/></svg>"));
    }

    #[test]
    fn rgba_colors_are_flagged() {
        assert!(svg_has_transparency(
            r#"<svg><rect style="fill:rgba(0,0,0,0.4)"/></svg>"#
        ));
    }

    #[tokio::test]
    async fn missing_svg_artifact_fails_the_page() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("deck.pdf");
        let ws = Workspace::acquire(&input).await.unwrap();

        let transcoder = InkscapeTranscoder::new("inkscape");
        let outcome = transcoder.transcode(&input, 1, &ws).await;
        assert!(!outcome.ok);
        assert!(outcome.detail.as_deref().unwrap().contains("page-1.svg"));
    }

    #[tokio::test]
    async fn missing_binary_fails_the_page() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("deck.pdf");
        let ws = Workspace::acquire(&input).await.unwrap();
        std::fs::write(ws.svg_path(1), "<svg/>").unwrap();

        let transcoder = InkscapeTranscoder::new("/definitely/not/inkscape");
        let outcome = transcoder.transcode(&input, 1, &ws).await;
        assert!(!outcome.ok);
        assert!(outcome.detail.as_deref().unwrap().contains("failed to run"));
    }
}
