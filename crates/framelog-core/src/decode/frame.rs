use super::{Decoder, Record};
use crate::protocols::frame::{FrameLayout, FrameParser, FramingStats, ResyncMode};

/// Structured strategy: one `Record::Word` per decoded payload word.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder {
    parser: FrameParser,
}

impl FrameDecoder {
    pub fn new(layout: FrameLayout, resync: ResyncMode) -> Self {
        Self {
            parser: FrameParser::new(layout, resync),
        }
    }

    pub fn parser(&self) -> &FrameParser {
        &self.parser
    }
}

impl Decoder for FrameDecoder {
    fn push(&mut self, byte: u8) -> Option<Record> {
        self.parser.feed(byte).map(Record::Word)
    }

    fn framing_stats(&self) -> Option<FramingStats> {
        Some(self.parser.stats())
    }

    fn mid_frame(&self) -> bool {
        !self.parser.is_idle()
    }
}
