//! External-tool presence check.
//!
//! The pipeline shells out to `pdf2svg` and `inkscape`; a missing binary
//! otherwise only surfaces mid-job as a stage failure. This probe lets
//! callers (CLI `--check-deps`, tool surfaces) verify the environment up
//! front and print install instructions.

use crate::config::ConversionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;

/// Result of probing the external toolchain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyReport {
    pub pdf2svg: bool,
    pub inkscape: bool,
    pub all_installed: bool,
    /// Install instructions, present only when something is missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_hint: Option<String>,
}

/// Probe the tools the given configuration would invoke.
///
/// A tool counts as present when it can be spawned at all — `pdf2svg`
/// exits non-zero for `--version`, so the exit status is ignored.
pub async fn check_dependencies(config: &ConversionConfig) -> DependencyReport {
    let pdf2svg = tool_is_runnable(&config.pdf2svg_path).await;
    let inkscape = tool_is_runnable(&config.inkscape_path).await;
    let all_installed = pdf2svg && inkscape;

    let install_hint = if all_installed {
        None
    } else {
        let mut missing = Vec::new();
        if !pdf2svg {
            missing.push("pdf2svg");
        }
        if !inkscape {
            missing.push("inkscape");
        }
        Some(format!(
            "Missing: {}. Install with: brew install {tools} (macOS) or apt-get install {tools} (Debian/Ubuntu)",
            missing.join(", "),
            tools = missing.join(" "),
        ))
    };

    DependencyReport {
        pdf2svg,
        inkscape,
        all_installed,
        install_hint,
    }
}

async fn tool_is_runnable(tool: &Path) -> bool {
    Command::new(tool)
        .arg("--version")
        .output()
        .await
        .is_ok()
}
