use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::decode::Decoder;
use crate::protocols::frame::FramingStats;
use crate::sink::{RecordSink, SinkError};
use crate::source::{ByteSource, SourceError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Cooperative stop signal, checked between reads.
///
/// Clones share the same flag, so a timer thread or signal handler can stop
/// a loop it does not own. A read that is already blocking finishes first.
///
/// # Examples
/// ```
/// use framelog_core::StopToken;
///
/// let stop = StopToken::new();
/// let remote = stop.clone();
/// remote.cancel();
/// assert!(stop.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    cancelled: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Optional bounds on a run; `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub max_bytes: Option<u64>,
    pub max_records: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEnd {
    EndOfStream,
    Stopped,
    ByteLimit,
    RecordLimit,
}

impl fmt::Display for RunEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunEnd::EndOfStream => "end of stream",
            RunEnd::Stopped => "stopped",
            RunEnd::ByteLimit => "byte limit reached",
            RunEnd::RecordLimit => "record limit reached",
        };
        f.write_str(label)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub bytes_read: u64,
    pub records_written: u64,
    pub end: RunEnd,
    /// The stream stopped inside an unterminated frame.
    pub ended_mid_frame: bool,
    /// Framing counters, present for the decoded strategy only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framing: Option<FramingStats>,
}

/// Read one byte at a time, decode it, and dispatch any record to `sink`.
///
/// Framing problems never fail a run; source and sink errors do. The sink
/// is flushed before a successful return.
///
/// # Examples
/// ```
/// use std::io::Cursor;
///
/// use framelog_core::{
///     ConsoleSink, FrameDecoder, Limits, ReaderSource, RunEnd, StopToken, run,
/// };
///
/// let bytes = vec![0xFB, 0xFB, 0, 1, 0, 2, 0, 3, 0, 4, 0, 5, 0xCD, 0xAB];
/// let mut source = ReaderSource::new(Cursor::new(bytes));
/// let mut decoder = FrameDecoder::default();
/// let mut sink = ConsoleSink::new(Vec::new());
///
/// let summary = run(&mut source, &mut decoder, &mut sink, &StopToken::new(), Limits::default())?;
/// assert_eq!(summary.records_written, 5);
/// assert_eq!(summary.end, RunEnd::EndOfStream);
/// assert_eq!(String::from_utf8(sink.into_inner())?, "1\n2\n3\n4\n5\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn run<S, D, K>(
    source: &mut S,
    decoder: &mut D,
    sink: &mut K,
    stop: &StopToken,
    limits: Limits,
) -> Result<RunSummary, PipelineError>
where
    S: ByteSource + ?Sized,
    D: Decoder + ?Sized,
    K: RecordSink + ?Sized,
{
    info!(?limits, "pipeline started");
    let mut bytes_read = 0u64;
    let mut records_written = 0u64;

    let end = loop {
        if stop.is_cancelled() {
            break RunEnd::Stopped;
        }
        if limits.max_bytes.is_some_and(|max| bytes_read >= max) {
            break RunEnd::ByteLimit;
        }

        let Some(byte) = source.next_byte()? else {
            if let Some(record) = decoder.finish() {
                sink.write_record(&record)?;
                records_written += 1;
            }
            break RunEnd::EndOfStream;
        };
        bytes_read += 1;

        if let Some(record) = decoder.push(byte) {
            sink.write_record(&record)?;
            records_written += 1;
            if limits.max_records.is_some_and(|max| records_written >= max) {
                break RunEnd::RecordLimit;
            }
        }
    };
    sink.flush()?;

    let ended_mid_frame = decoder.mid_frame();
    if ended_mid_frame && end == RunEnd::EndOfStream {
        warn!(bytes_read, "stream ended inside an unterminated frame");
    }
    let framing = decoder.framing_stats();
    info!(bytes_read, records_written, %end, ?framing, "pipeline finished");

    Ok(RunSummary {
        bytes_read,
        records_written,
        end,
        ended_mid_frame,
        framing,
    })
}
