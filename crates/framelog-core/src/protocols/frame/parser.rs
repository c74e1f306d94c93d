use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::error::ParseResyncModeError;
use super::layout::{self, FrameLayout};
use super::reader::{PayloadAccumulator, is_first_of_pair};

/// A 16-bit value rebuilt from two payload bytes, most-significant first.
///
/// # Examples
/// ```
/// use framelog_core::DecodedWord;
///
/// let word = DecodedWord::from_be_bytes([0x01, 0x02]);
/// assert_eq!(word.value(), 258);
/// assert_eq!(word.to_string(), "258");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecodedWord(pub u16);

impl DecodedWord {
    pub fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl From<DecodedWord> for u16 {
    fn from(word: DecodedWord) -> Self {
        word.0
    }
}

impl fmt::Display for DecodedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Hunting for the first start byte.
    Idle,
    SawFirstStart,
    InPayload,
    /// In payload with the first end byte seen; only the second end byte
    /// closes the frame.
    SawEndFirstByte,
}

/// How the parser reacts to a start byte in the middle of a frame.
///
/// `Compatible` treats it as payload data, which keeps old captures decoding
/// to the same words. `Strict` abandons the partial frame and restarts
/// detection from that byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResyncMode {
    #[default]
    Compatible,
    Strict,
}

impl FromStr for ResyncMode {
    type Err = ParseResyncModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "compatible" => Ok(Self::Compatible),
            "strict" => Ok(Self::Strict),
            _ => Err(ParseResyncModeError(value.to_string())),
        }
    }
}

impl fmt::Display for ResyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compatible => f.write_str("compatible"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

/// Framing anomaly counters. Resync stays silent; these make it observable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramingStats {
    /// Frames closed by a full end marker (short frames included).
    pub frames_completed: u64,
    pub words_emitted: u64,
    /// Bytes dropped while hunting for a start marker, including both bytes
    /// of a start marker whose second byte mismatched.
    pub discarded_bytes: u64,
    /// Start marker mismatches plus strict-mode restarts.
    pub resyncs: u64,
    /// Partial frames dropped by a strict-mode restart.
    pub abandoned_frames: u64,
    /// Frames closed before the payload was full.
    pub short_frames: u64,
    /// Bytes after a full payload that were not end marker bytes.
    pub overrun_bytes: u64,
}

/// Byte-at-a-time frame state machine.
///
/// # Examples
/// ```
/// use framelog_core::{DecodedWord, FrameParser};
///
/// let mut parser = FrameParser::default();
/// let words = parser.feed_all(&[
///     0xFB, 0xFB, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0xCD, 0xAB,
/// ]);
/// assert_eq!(words.first(), Some(&DecodedWord(0x0102)));
/// assert_eq!(words.len(), 5);
/// assert!(parser.is_idle());
/// ```
#[derive(Debug, Clone)]
pub struct FrameParser {
    layout: FrameLayout,
    mode: ResyncMode,
    state: ParserState,
    /// Bytes consumed since the first start byte.
    count: usize,
    pair: PayloadAccumulator,
    stats: FramingStats,
}

impl FrameParser {
    pub fn new(layout: FrameLayout, mode: ResyncMode) -> Self {
        Self {
            layout,
            mode,
            state: ParserState::Idle,
            count: 0,
            pair: PayloadAccumulator::new(),
            stats: FramingStats::default(),
        }
    }

    /// Process exactly one byte. Returns a word when a payload pair completes.
    pub fn feed(&mut self, byte: u8) -> Option<DecodedWord> {
        match self.state {
            ParserState::Idle => {
                self.on_idle(byte);
                None
            }
            ParserState::SawFirstStart => {
                self.on_first_start(byte);
                None
            }
            ParserState::InPayload | ParserState::SawEndFirstByte => self.on_payload(byte),
        }
    }

    pub fn feed_all(&mut self, bytes: &[u8]) -> Vec<DecodedWord> {
        bytes.iter().filter_map(|&byte| self.feed(byte)).collect()
    }

    /// Drop any partial frame and return to `Idle`. Stats are kept.
    pub fn reset(&mut self) {
        self.state = ParserState::Idle;
        self.count = 0;
        self.pair = PayloadAccumulator::new();
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ParserState::Idle
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    pub fn mode(&self) -> ResyncMode {
        self.mode
    }

    pub fn stats(&self) -> FramingStats {
        self.stats
    }

    fn on_idle(&mut self, byte: u8) {
        if byte == self.layout.start()[0] {
            self.state = ParserState::SawFirstStart;
            self.count = 1;
        } else {
            self.stats.discarded_bytes += 1;
        }
    }

    fn on_first_start(&mut self, byte: u8) {
        if byte == self.layout.start()[1] {
            self.state = ParserState::InPayload;
            self.count = layout::MARKER_LEN;
            self.pair = PayloadAccumulator::new();
            return;
        }
        // The mismatching byte is not re-checked as a new first start byte.
        trace!(byte, "start marker mismatch, back to idle");
        self.state = ParserState::Idle;
        self.count = 0;
        self.stats.resyncs += 1;
        self.stats.discarded_bytes += layout::MARKER_LEN as u64;
    }

    fn on_payload(&mut self, byte: u8) -> Option<DecodedWord> {
        if self.mode == ResyncMode::Strict && byte == self.layout.start()[0] {
            debug!(
                count = self.count,
                "start byte inside frame, abandoning partial frame"
            );
            self.stats.abandoned_frames += 1;
            self.stats.resyncs += 1;
            self.state = ParserState::SawFirstStart;
            self.count = 1;
            return None;
        }

        let accumulating = self.payload_offset() < self.layout.payload_len();
        let word = if accumulating {
            self.accumulate(byte)
        } else {
            None
        };

        let mut marker = false;
        if self.state == ParserState::InPayload && byte == self.layout.end()[0] {
            self.state = ParserState::SawEndFirstByte;
            marker = true;
        }
        if self.state == ParserState::SawEndFirstByte && byte == self.layout.end()[1] {
            self.close_frame();
            marker = true;
        }
        if !accumulating && !marker {
            self.stats.overrun_bytes += 1;
        }
        word
    }

    fn accumulate(&mut self, byte: u8) -> Option<DecodedWord> {
        let offset = self.payload_offset();
        self.count += 1;
        if is_first_of_pair(offset) {
            self.pair.store_first(byte);
            return None;
        }
        self.stats.words_emitted += 1;
        Some(DecodedWord(self.pair.store_second(byte)))
    }

    fn close_frame(&mut self) {
        let received = self.payload_offset();
        if received < self.layout.payload_len() {
            debug!(
                received,
                expected = self.layout.payload_len(),
                "frame closed before payload was full"
            );
            self.stats.short_frames += 1;
        }
        self.stats.frames_completed += 1;
        self.state = ParserState::Idle;
        self.count = 0;
    }

    fn payload_offset(&self) -> usize {
        self.count.saturating_sub(layout::MARKER_LEN)
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new(FrameLayout::default(), ResyncMode::default())
    }
}
