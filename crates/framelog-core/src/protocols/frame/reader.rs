/// Pair buffer for payload bytes, most-significant byte first.
///
/// The parser decides which slot a byte lands in from its payload offset;
/// the buffer is never cleared, a fresh one replaces it at each frame start.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PayloadAccumulator {
    byte1: u8,
    byte2: u8,
}

impl PayloadAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store_first(&mut self, byte: u8) {
        self.byte1 = byte;
    }

    /// Store the low byte and combine the pair as a big-endian word.
    pub fn store_second(&mut self, byte: u8) -> u16 {
        self.byte2 = byte;
        u16::from_be_bytes([self.byte1, self.byte2])
    }
}

/// Whether a payload offset holds the high byte of a word.
pub fn is_first_of_pair(offset: usize) -> bool {
    offset % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::{PayloadAccumulator, is_first_of_pair};

    #[test]
    fn combines_big_endian() {
        let mut pair = PayloadAccumulator::new();
        pair.store_first(0x01);
        assert_eq!(pair.store_second(0x02), 0x0102);
    }

    #[test]
    fn second_store_reuses_previous_high_byte() {
        let mut pair = PayloadAccumulator::new();
        pair.store_first(0xAB);
        pair.store_second(0x00);
        assert_eq!(pair.store_second(0xCD), 0xABCD);
    }

    #[test]
    fn even_offsets_open_a_pair() {
        assert!(is_first_of_pair(0));
        assert!(!is_first_of_pair(1));
        assert!(is_first_of_pair(8));
    }
}
