//! Serial telemetry frame decoding.
//!
//! A frame is a start marker, a fixed-size payload of big-endian 16-bit
//! words, and an end marker. The parser is a byte-at-a-time state machine:
//! it emits one word per completed payload pair and resynchronizes silently
//! on garbled markers, counting every anomaly in `FramingStats`.
//!
//! Marker bytes and frame length live in `layout`, the pair/word convention
//! in `reader`. Resync behavior is selected with `ResyncMode`; the default
//! keeps the historical behavior so existing logs stay reproducible.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::{LayoutError, ParseResyncModeError};
pub use layout::FrameLayout;
pub use parser::{DecodedWord, FrameParser, FramingStats, ParserState, ResyncMode};
