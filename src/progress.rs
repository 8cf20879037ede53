//! Progress events and the sink trait that consumes them.
//!
//! The pipeline emits an ordered sequence of [`ProgressEvent`]s with a
//! monotonically non-decreasing `percent`. Every transport renders the same
//! sequence: the CLI feeds it to a progress bar, a web caller serialises
//! each event as-is onto an SSE stream, a test collects them in a `Vec`.
//!
//! # Why a sink trait instead of channels?
//!
//! A trait object is the least-invasive integration point: callers can
//! forward events to a Tokio channel, a WebSocket, or a terminal progress
//! bar without the library knowing how the host application communicates.
//! The trait is `Send + Sync` because transcode workers run concurrently.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle tag carried by every progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// The job is still running.
    Processing,
    /// Terminal: the job finished and `output_file` is set.
    Completed,
    /// Terminal: the job failed and `error` is set.
    Error,
}

/// One checkpoint in a conversion job.
///
/// Serialises to the wire shape streaming callers relay verbatim:
/// `{"percent":50,"message":"Transcoding pages to EMF","status":"processing"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Completion estimate in `[0, 100]`, non-decreasing across the job.
    pub percent: u8,
    /// Short human-readable description of what is happening.
    pub message: String,
    /// Lifecycle tag.
    pub status: ProgressStatus,
    /// Set only on the terminal `Completed` event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    /// Set only on the terminal `Error` event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressEvent {
    /// A non-terminal checkpoint.
    pub fn processing(percent: u8, message: impl Into<String>) -> Self {
        Self {
            percent,
            message: message.into(),
            status: ProgressStatus::Processing,
            output_file: None,
            error: None,
        }
    }

    /// The terminal success event.
    pub fn completed(output_file: PathBuf) -> Self {
        Self {
            percent: 100,
            message: "Conversion completed".to_string(),
            status: ProgressStatus::Completed,
            output_file: Some(output_file),
            error: None,
        }
    }

    /// The terminal failure event.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            percent: 100,
            message: "Conversion failed".to_string(),
            status: ProgressStatus::Error,
            output_file: None,
            error: Some(error.into()),
        }
    }
}

/// Consumes the ordered event sequence of one conversion job.
///
/// Implementations must be `Send + Sync`: during the transcode stage,
/// per-page events are emitted from concurrently running workers. Shared
/// mutable state needs its own synchronisation (`Mutex`, atomics).
pub trait ProgressSink: Send + Sync {
    /// Called once per checkpoint, in percent order.
    fn emit(&self, event: ProgressEvent);
}

/// A no-op sink for callers that don't need progress events.
///
/// This is the default when no sink is configured.
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Convenience alias matching the type stored in
/// [`crate::config::ConversionConfig`].
pub type SharedSink = Arc<dyn ProgressSink>;

/// Internal emitter wrapping the configured sink.
///
/// Guards the monotonicity invariant: concurrent per-page checkpoints race
/// to emit, so each event's percent is raised to the highest value seen so
/// far before it reaches the sink.
pub(crate) struct Reporter {
    sink: Option<SharedSink>,
    high_water: AtomicU8,
}

impl Reporter {
    pub(crate) fn new(sink: Option<SharedSink>) -> Self {
        Self {
            sink,
            high_water: AtomicU8::new(0),
        }
    }

    pub(crate) fn emit(&self, mut event: ProgressEvent) {
        let prev = self.high_water.fetch_max(event.percent, Ordering::SeqCst);
        event.percent = event.percent.max(prev);
        if let Some(ref sink) = self.sink {
            sink.emit(event);
        }
    }
}
