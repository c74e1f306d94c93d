use thiserror::Error;

/// Errors returned when building a frame layout.
///
/// # Examples
/// ```
/// use framelog_core::{FrameLayout, LayoutError};
///
/// let err = FrameLayout::new([0xFB, 0xFB], [0xCD, 0xAB], 2).unwrap_err();
/// assert_eq!(err, LayoutError::TooShort { min: 3, words: 2 });
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("frame too short: need at least {min} words, got {words}")]
    TooShort { min: usize, words: usize },
    #[error("frame too long: {words} words does not fit in memory")]
    TooLong { words: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown resync mode '{0}' (expected 'compatible' or 'strict')")]
pub struct ParseResyncModeError(pub String);
