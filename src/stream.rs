//! Streaming conversion API: push progress events as they happen.
//!
//! ## Why stream?
//!
//! Conversions take seconds to minutes. An event stream lets a host push
//! checkpoints to a browser or message bus while the job runs, instead of
//! blocking on [`crate::convert::convert_to`] and reporting only the final
//! result. The terminal event carries the output file on success or the
//! error description on failure, so a consumer needs nothing but the
//! stream.
//!
//! Events arrive in emit order with non-decreasing percent — the same
//! sequence a [`crate::progress::ProgressSink`] would observe.

use crate::config::ConversionConfig;
use crate::convert::convert_to;
use crate::pipeline::assemble::default_output_path;
use crate::progress::{ProgressEvent, ProgressSink};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Stream of progress events for one conversion job.
pub type EventStream = UnboundedReceiverStream<ProgressEvent>;

/// Sink that forwards every event into an unbounded channel.
struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        // A dropped receiver just means the consumer went away; the job
        // still runs to its terminal state.
        let _ = self.tx.send(event);
    }
}

/// Start a conversion and return its event stream immediately.
///
/// The job runs on a spawned task; the stream ends after the terminal
/// `completed` or `error` event. Any sink already present in `config` is
/// replaced by the stream for this job.
pub fn convert_stream(input: impl Into<PathBuf>, config: &ConversionConfig) -> EventStream {
    let input = input.into();
    let output = default_output_path(&input);
    convert_stream_to(input, output, config)
}

/// [`convert_stream`] with an explicit output path.
pub fn convert_stream_to(
    input: impl Into<PathBuf>,
    output: impl Into<PathBuf>,
    config: &ConversionConfig,
) -> EventStream {
    let (tx, rx) = mpsc::unbounded_channel();

    let mut cfg = config.clone();
    cfg.progress_sink = Some(Arc::new(ChannelSink { tx }));

    let input: PathBuf = input.into();
    let output: PathBuf = output.into();
    tokio::spawn(async move {
        // The terminal event already reports the failure; the Result adds
        // nothing for a stream consumer.
        let _ = convert_to(&input, &output, &cfg).await;
    });

    UnboundedReceiverStream::new(rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressStatus;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn failed_job_streams_a_terminal_error_event() {
        let config = ConversionConfig::default();
        let mut stream = convert_stream("/definitely/not/here.pdf", &config);

        let mut last = None;
        while let Some(event) = stream.next().await {
            last = Some(event);
        }

        let last = last.expect("at least the terminal event");
        assert_eq!(last.status, ProgressStatus::Error);
        assert_eq!(last.percent, 100);
        assert!(last.error.as_deref().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn events_arrive_with_non_decreasing_percent() {
        let config = ConversionConfig::default();
        let mut stream = convert_stream("/definitely/not/here.pdf", &config);

        let mut prev = 0u8;
        while let Some(event) = stream.next().await {
            assert!(event.percent >= prev);
            prev = event.percent;
        }
    }
}
