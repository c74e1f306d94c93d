//! framelog core library for serial telemetry logging.
//!
//! This crate implements the pipeline used by the CLI: a byte source feeds a
//! decode strategy, which drives the frame parser (layout/reader/parser) and
//! hands records to sinks (timestamped log, console). Parsing is
//! byte-oriented and side-effect free; all I/O is isolated in `source` and
//! `sink` modules.
//!
//! Invariants:
//! - One byte in, at most one word out; words are emitted as pairs complete.
//! - Framing errors never fail a run; they are absorbed by resync and counted.
//! - Default resync behavior is stable so old captures decode identically.
//!
//! Version française (résumé):
//! Cette crate fournit le cœur du journal de télémétrie : source d'octets ->
//! stratégie de décodage (trames ou lignes brutes) -> puits (journal horodaté,
//! console). Les erreurs de trame sont absorbées et comptées, jamais
//! remontées ; les erreurs d'E/S sont propagées.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use framelog_core::{
//!     FrameDecoder, Limits, LogSink, ReaderSource, StopToken, run,
//! };
//!
//! let mut source = ReaderSource::open(Path::new("/dev/ttyACM0"))?;
//! let mut decoder = FrameDecoder::default();
//! let mut sink = LogSink::append(Path::new("control.log"))?;
//! let summary = run(&mut source, &mut decoder, &mut sink, &StopToken::new(), Limits::default())?;
//! println!("records: {}", summary.records_written);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod decode;
mod pipeline;
mod protocols;
mod sink;
mod source;

pub use config::{Config, ConfigError, DEFAULT_DEVICE, DEFAULT_LOG_FILE, FrameConfig};
pub use decode::{
    DEFAULT_MAX_LINE_LEN, Decoder, FrameDecoder, LineDecoder, Mode, ParseModeError, Record,
};
pub use pipeline::{Limits, PipelineError, RunEnd, RunSummary, StopToken, run};
pub use protocols::frame::{
    DecodedWord, FrameLayout, FrameParser, FramingStats, LayoutError, ParseResyncModeError,
    ParserState, ResyncMode,
};
pub use sink::{
    ConsoleSink, FanoutSink, LOG_SEPARATOR, LogSink, RecordSink, SinkError, format_log_line,
    format_timestamp,
};
pub use source::{ByteSource, ReaderSource, SourceError};
