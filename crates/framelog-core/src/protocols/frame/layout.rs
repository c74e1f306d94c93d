use super::error::LayoutError;

pub const START_MARKER: [u8; 2] = [0xFB, 0xFB];
pub const END_MARKER: [u8; 2] = [0xCD, 0xAB];

pub const MARKER_LEN: usize = 2;
pub const WORD_LEN: usize = 2;
/// Start and end markers together.
pub const FRAMING_OVERHEAD: usize = 2 * MARKER_LEN;

/// Total frame length in words, markers included (7 words = 14 bytes).
pub const DEFAULT_FRAME_WORDS: usize = 7;
/// Smallest frame that still carries one payload word.
pub const MIN_FRAME_WORDS: usize = 3;

/// Marker bytes and length of the one frame shape the parser understands.
///
/// # Examples
/// ```
/// use framelog_core::FrameLayout;
///
/// let layout = FrameLayout::default();
/// assert_eq!(layout.frame_len(), 14);
/// assert_eq!(layout.payload_len(), 10);
/// assert_eq!(layout.payload_words(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    start: [u8; 2],
    end: [u8; 2],
    frame_len: usize,
}

impl FrameLayout {
    pub fn new(start: [u8; 2], end: [u8; 2], words: usize) -> Result<Self, LayoutError> {
        if words < MIN_FRAME_WORDS {
            return Err(LayoutError::TooShort {
                min: MIN_FRAME_WORDS,
                words,
            });
        }
        let frame_len = words
            .checked_mul(WORD_LEN)
            .ok_or(LayoutError::TooLong { words })?;
        Ok(Self {
            start,
            end,
            frame_len,
        })
    }

    pub fn start(&self) -> [u8; 2] {
        self.start
    }

    pub fn end(&self) -> [u8; 2] {
        self.end
    }

    /// Frame length in bytes, markers included.
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Payload length in bytes (frame length minus both markers).
    pub fn payload_len(&self) -> usize {
        self.frame_len - FRAMING_OVERHEAD
    }

    pub fn payload_words(&self) -> usize {
        self.payload_len() / WORD_LEN
    }
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self {
            start: START_MARKER,
            end: END_MARKER,
            frame_len: DEFAULT_FRAME_WORDS * WORD_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameLayout, MIN_FRAME_WORDS};
    use crate::protocols::frame::error::LayoutError;

    #[test]
    fn default_layout_matches_markers() {
        let layout = FrameLayout::default();
        assert_eq!(layout.start(), [0xFB, 0xFB]);
        assert_eq!(layout.end(), [0xCD, 0xAB]);
        assert_eq!(layout.frame_len(), 14);
    }

    #[test]
    fn smallest_layout_has_one_word() {
        let layout = FrameLayout::new([1, 2], [3, 4], MIN_FRAME_WORDS).unwrap();
        assert_eq!(layout.payload_len(), 2);
        assert_eq!(layout.payload_words(), 1);
    }

    #[test]
    fn rejects_layout_without_payload() {
        let err = FrameLayout::new([1, 2], [3, 4], 2).unwrap_err();
        assert!(matches!(err, LayoutError::TooShort { words: 2, .. }));
        assert!(err.to_string().contains("frame too short"));
    }

    #[test]
    fn rejects_layout_whose_length_overflows() {
        let err = FrameLayout::new([1, 2], [3, 4], usize::MAX).unwrap_err();
        assert_eq!(err, LayoutError::TooLong { words: usize::MAX });
        assert!(err.to_string().contains("frame too long"));
    }
}
