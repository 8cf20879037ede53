//! Stage 1: whole-document page extraction to SVG.
//!
//! One external invocation per job, not per page: the extraction tool
//! walks the document once and writes `page-N.svg` for every page into the
//! workspace. Its failure is fatal for the job — there is no
//! partial-success concept at this stage.

use crate::error::Pdf2PptError;
use crate::workspace::Workspace;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Whole-document page-extraction contract.
///
/// Inject a custom implementation through
/// [`crate::config::ConversionConfigBuilder::extractor`] to replace the
/// external `pdf2svg` invocation (tests, embedded renderers).
#[async_trait]
pub trait PageExtractor: Send + Sync {
    /// Produce one SVG artifact per page of `pdf` in the workspace.
    async fn extract(&self, pdf: &Path, workspace: &Workspace) -> Result<(), Pdf2PptError>;
}

/// Default extractor: shells out to `pdf2svg <pdf> <ws>/page-%d.svg all`.
pub struct Pdf2SvgExtractor {
    tool: PathBuf,
}

impl Pdf2SvgExtractor {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }
}

#[async_trait]
impl PageExtractor for Pdf2SvgExtractor {
    async fn extract(&self, pdf: &Path, workspace: &Workspace) -> Result<(), Pdf2PptError> {
        info!("Extracting '{}' to SVG", pdf.display());

        let output = Command::new(&self.tool)
            .arg(pdf)
            .arg(workspace.svg_pattern())
            .arg("all")
            .output()
            .await
            .map_err(|e| Pdf2PptError::ExtractionFailed {
                detail: format!("failed to run '{}': {e}", self.tool.display()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Pdf2PptError::ExtractionFailed {
                detail: format!("'{}' {}: {}", self.tool.display(), output.status, stderr.trim()),
            });
        }

        debug!("Extraction finished: {}", workspace.path().display());
        Ok(())
    }
}
