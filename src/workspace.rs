//! Intermediate-artifact workspace lifecycle.
//!
//! Each job owns a directory derived deterministically from the input path
//! (a hidden sibling, `<parent>/.<stem>.pdf2ppt.tmp`), holding the per-page
//! SVG and EMF artifacts between stages. Acquisition is idempotent so a
//! re-run after a failed job reuses the directory without manual cleanup.
//!
//! The workspace is an explicit owned value passed into every stage call —
//! never a process-wide implicit temp path. Release is called on every
//! orchestrator exit path; the orchestrator passes `retain = true` on
//! failure so the artifacts survive for postmortem.

use crate::error::Pdf2PptError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Handle to one job's intermediate-artifact directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// The directory a given input maps to, without creating it.
    pub fn dir_for(input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let parent = input.parent().unwrap_or_else(|| Path::new("."));
        parent.join(format!(".{stem}.pdf2ppt.tmp"))
    }

    /// Create (or reuse) the workspace for `input`.
    ///
    /// Idempotent: re-acquiring for the same input returns the same
    /// directory, with any artifacts from a prior attempt intact.
    pub async fn acquire(input: &Path) -> Result<Self, Pdf2PptError> {
        let root = Self::dir_for(input);
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| Pdf2PptError::WorkspaceFailed {
                path: root.clone(),
                source,
            })?;
        debug!("Workspace ready: {}", root.display());
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// printf-style output pattern handed to the extraction tool.
    pub fn svg_pattern(&self) -> PathBuf {
        self.root.join("page-%d.svg")
    }

    /// Stage-1 artifact for a 1-indexed page.
    pub fn svg_path(&self, page: u32) -> PathBuf {
        self.root.join(format!("page-{page}.svg"))
    }

    /// Stage-2 artifact for a 1-indexed page.
    pub fn emf_path(&self, page: u32) -> PathBuf {
        self.root.join(format!("page-{page}.emf"))
    }

    /// Remove the workspace unless `retain` asks to keep it.
    ///
    /// Removal failure is logged and swallowed: by the time cleanup runs
    /// the output file already exists, and a stale temp directory must not
    /// flip a successful job into a failure.
    pub async fn release(self, retain: bool) {
        if retain {
            debug!("Workspace retained: {}", self.root.display());
            return;
        }
        if let Err(e) = tokio::fs::remove_dir_all(&self.root).await {
            warn!(
                "Failed to remove workspace '{}': {} (leaving it in place)",
                self.root.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_is_a_hidden_sibling_of_the_input() {
        let dir = Workspace::dir_for(Path::new("/data/decks/lecture.pdf"));
        assert_eq!(dir, PathBuf::from("/data/decks/.lecture.pdf2ppt.tmp"));
    }

    #[tokio::test]
    async fn acquire_is_idempotent_and_preserves_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("deck.pdf");

        let ws = Workspace::acquire(&input).await.unwrap();
        std::fs::write(ws.svg_path(1), "<svg/>").unwrap();

        let again = Workspace::acquire(&input).await.unwrap();
        assert_eq!(ws.path(), again.path());
        assert!(again.svg_path(1).exists(), "prior artifacts must survive");
    }

    #[tokio::test]
    async fn release_removes_unless_retained() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("deck.pdf");

        let ws = Workspace::acquire(&input).await.unwrap();
        let root = ws.path().to_path_buf();
        ws.release(false).await;
        assert!(!root.exists());

        let ws = Workspace::acquire(&input).await.unwrap();
        let root = ws.path().to_path_buf();
        ws.release(true).await;
        assert!(root.exists());
    }

    #[tokio::test]
    async fn release_of_missing_directory_is_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("deck.pdf");
        let ws = Workspace::acquire(&input).await.unwrap();
        std::fs::remove_dir_all(ws.path()).unwrap();
        // Must not panic or error.
        ws.release(false).await;
    }

    #[test]
    fn artifact_paths_are_page_keyed() {
        let ws = Workspace {
            root: PathBuf::from("/tmp/.x.pdf2ppt.tmp"),
        };
        assert!(ws.svg_path(7).ends_with("page-7.svg"));
        assert!(ws.emf_path(7).ends_with("page-7.emf"));
        assert!(ws.svg_pattern().to_string_lossy().contains("%d"));
    }
}
