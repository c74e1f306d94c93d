//! Decode strategies.
//!
//! Both strategies share one read loop: `FrameDecoder` turns framed telemetry
//! into words, `LineDecoder` passes text lines through untouched. `Mode`
//! selects one from configuration.

mod frame;
mod line;

pub use frame::FrameDecoder;
pub use line::{DEFAULT_MAX_LINE_LEN, LineDecoder};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocols::frame::{DecodedWord, FrameLayout, FramingStats, ResyncMode};

/// One unit of output handed to sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Word(DecodedWord),
    Line(String),
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Word(word) => write!(f, "{word}"),
            Record::Line(line) => f.write_str(line),
        }
    }
}

pub trait Decoder {
    /// Consume one byte, possibly producing a record.
    fn push(&mut self, byte: u8) -> Option<Record>;

    /// Flush whatever is pending at end of stream.
    fn finish(&mut self) -> Option<Record> {
        None
    }

    fn framing_stats(&self) -> Option<FramingStats> {
        None
    }

    /// Whether the stream currently sits inside an unterminated frame.
    fn mid_frame(&self) -> bool {
        false
    }
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn push(&mut self, byte: u8) -> Option<Record> {
        (**self).push(byte)
    }

    fn finish(&mut self) -> Option<Record> {
        (**self).finish()
    }

    fn framing_stats(&self) -> Option<FramingStats> {
        (**self).framing_stats()
    }

    fn mid_frame(&self) -> bool {
        (**self).mid_frame()
    }
}

/// Output strategy selected from configuration.
///
/// # Examples
/// ```
/// use framelog_core::Mode;
///
/// assert_eq!("raw".parse::<Mode>()?, Mode::Raw);
/// assert_eq!(Mode::default(), Mode::Decoded);
/// # Ok::<(), framelog_core::ParseModeError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Decode framed payload words.
    #[default]
    Decoded,
    /// Pass text lines through as received.
    Raw,
}

impl Mode {
    pub fn decoder(self, layout: FrameLayout, resync: ResyncMode) -> Box<dyn Decoder> {
        match self {
            Mode::Decoded => Box::new(FrameDecoder::new(layout, resync)),
            Mode::Raw => Box::new(LineDecoder::default()),
        }
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "decoded" | "decode" => Ok(Mode::Decoded),
            "raw" => Ok(Mode::Raw),
            _ => Err(ParseModeError(value.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Decoded => f.write_str("decoded"),
            Mode::Raw => f.write_str("raw"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown mode '{0}' (expected 'decoded' or 'raw')")]
pub struct ParseModeError(pub String);

#[cfg(test)]
mod tests {
    use super::{Decoder, Mode, Record};
    use crate::protocols::frame::{DecodedWord, FrameLayout, ResyncMode};

    #[test]
    fn record_display_is_the_log_message() {
        assert_eq!(Record::Word(DecodedWord(0x0102)).to_string(), "258");
        assert_eq!(Record::Line("temp=21.5".to_string()).to_string(), "temp=21.5");
    }

    #[test]
    fn mode_selects_strategy() {
        let mut decoded = Mode::Decoded.decoder(FrameLayout::default(), ResyncMode::Compatible);
        assert!(decoded.framing_stats().is_some());
        assert!(decoded.push(b'\n').is_none());

        let mut raw = Mode::Raw.decoder(FrameLayout::default(), ResyncMode::Compatible);
        assert!(raw.framing_stats().is_none());
        assert!(raw.push(b'x').is_none());
        assert_eq!(raw.push(b'\n'), Some(Record::Line("x".to_string())));
    }

    #[test]
    fn mode_parse_rejects_unknown() {
        assert_eq!("Decoded".parse::<Mode>().unwrap(), Mode::Decoded);
        let err = "hex".parse::<Mode>().unwrap_err();
        assert!(err.to_string().contains("unknown mode 'hex'"));
    }
}
