//! Configuration types for PDF-to-PowerPoint conversion.
//!
//! All job behaviour is controlled through [`ConversionConfig`], built via
//! its [`ConversionConfigBuilder`]. Every recognised option lives here with
//! its default and is validated once at job construction — stages never
//! re-interpret an options bag.

use crate::error::Pdf2PptError;
use crate::pipeline::assemble::SlideAssembler;
use crate::pipeline::extract::PageExtractor;
use crate::pipeline::transcode::PageTranscoder;
use crate::progress::SharedSink;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Highest permitted transcode parallelism.
pub const MAX_PARALLEL: usize = 16;

/// Configuration for one conversion job.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2ppt::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .pages("1-5,7")
///     .parallel(8)
///     .overwrite(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Page-selection expression, e.g. `"1-5,7,9-11"`. `None` converts
    /// every page.
    pub pages: Option<String>,

    /// Number of concurrent per-page transcode invocations. Range: 1–16.
    /// Default: 4.
    ///
    /// Each invocation is an external process, so parallelism is bounded by
    /// cores and process-spawn overhead rather than I/O. 4–8 suits most
    /// machines.
    pub parallel: usize,

    /// Replace an existing output file. Default: false.
    pub overwrite: bool,

    /// Keep the intermediate-artifact workspace after a successful job.
    /// Default: false.
    ///
    /// On a failed job the workspace is always kept, regardless of this
    /// flag, so the failing page artifacts can be inspected.
    pub keep_artifacts: bool,

    /// Path or command name of the page-extraction tool. Default: `pdf2svg`.
    pub pdf2svg_path: PathBuf,

    /// Path or command name of the transcoding tool. Default: `inkscape`.
    pub inkscape_path: PathBuf,

    /// Consumer of the job's ordered progress events. Default: none.
    pub progress_sink: Option<SharedSink>,

    /// Pre-constructed extraction stage. Replaces the external `pdf2svg`
    /// invocation; used by tests and embedders with their own renderer.
    pub extractor: Option<Arc<dyn PageExtractor>>,

    /// Pre-constructed transcode stage. Replaces the external `inkscape`
    /// invocation.
    pub transcoder: Option<Arc<dyn PageTranscoder>>,

    /// Pre-constructed assembly stage. Replaces the built-in PPTX writer.
    pub assembler: Option<Arc<dyn SlideAssembler>>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            pages: None,
            parallel: 4,
            overwrite: false,
            keep_artifacts: false,
            pdf2svg_path: PathBuf::from("pdf2svg"),
            inkscape_path: PathBuf::from("inkscape"),
            progress_sink: None,
            extractor: None,
            transcoder: None,
            assembler: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("pages", &self.pages)
            .field("parallel", &self.parallel)
            .field("overwrite", &self.overwrite)
            .field("keep_artifacts", &self.keep_artifacts)
            .field("pdf2svg_path", &self.pdf2svg_path)
            .field("inkscape_path", &self.inkscape_path)
            .field("progress_sink", &self.progress_sink.as_ref().map(|_| "<dyn ProgressSink>"))
            .field("extractor", &self.extractor.as_ref().map(|_| "<dyn PageExtractor>"))
            .field("transcoder", &self.transcoder.as_ref().map(|_| "<dyn PageTranscoder>"))
            .field("assembler", &self.assembler.as_ref().map(|_| "<dyn SlideAssembler>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn pages(mut self, expression: impl Into<String>) -> Self {
        self.config.pages = Some(expression.into());
        self
    }

    pub fn parallel(mut self, n: usize) -> Self {
        self.config.parallel = n.clamp(1, MAX_PARALLEL);
        self
    }

    pub fn overwrite(mut self, v: bool) -> Self {
        self.config.overwrite = v;
        self
    }

    pub fn keep_artifacts(mut self, v: bool) -> Self {
        self.config.keep_artifacts = v;
        self
    }

    pub fn pdf2svg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdf2svg_path = path.into();
        self
    }

    pub fn inkscape_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.inkscape_path = path.into();
        self
    }

    pub fn progress_sink(mut self, sink: SharedSink) -> Self {
        self.config.progress_sink = Some(sink);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn PageExtractor>) -> Self {
        self.config.extractor = Some(extractor);
        self
    }

    pub fn transcoder(mut self, transcoder: Arc<dyn PageTranscoder>) -> Self {
        self.config.transcoder = Some(transcoder);
        self
    }

    pub fn assembler(mut self, assembler: Arc<dyn SlideAssembler>) -> Self {
        self.config.assembler = Some(assembler);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2PptError> {
        let c = &self.config;
        if c.parallel == 0 || c.parallel > MAX_PARALLEL {
            return Err(Pdf2PptError::InvalidConfig(format!(
                "parallel must be 1–{MAX_PARALLEL}, got {}",
                c.parallel
            )));
        }
        if c.pdf2svg_path.as_os_str().is_empty() {
            return Err(Pdf2PptError::InvalidConfig(
                "pdf2svg_path must not be empty".into(),
            ));
        }
        if c.inkscape_path.as_os_str().is_empty() {
            return Err(Pdf2PptError::InvalidConfig(
                "inkscape_path must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ConversionConfig::default();
        assert_eq!(c.parallel, 4);
        assert!(!c.overwrite);
        assert!(!c.keep_artifacts);
        assert!(c.pages.is_none());
        assert_eq!(c.pdf2svg_path, PathBuf::from("pdf2svg"));
        assert_eq!(c.inkscape_path, PathBuf::from("inkscape"));
    }

    #[test]
    fn parallel_is_clamped_into_bounds() {
        let c = ConversionConfig::builder().parallel(0).build().unwrap();
        assert_eq!(c.parallel, 1);

        let c = ConversionConfig::builder().parallel(64).build().unwrap();
        assert_eq!(c.parallel, MAX_PARALLEL);
    }

    #[test]
    fn empty_tool_path_is_rejected() {
        let err = ConversionConfig::builder()
            .inkscape_path("")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("inkscape_path"));
    }

    #[test]
    fn debug_does_not_require_trait_objects_to_be_debug() {
        let c = ConversionConfig::builder().pages("1-3").build().unwrap();
        let s = format!("{c:?}");
        assert!(s.contains("1-3"));
    }
}
