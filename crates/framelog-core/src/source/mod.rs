//! Byte sources for the decode pipeline.
//!
//! A source hands out one byte per call and reports end of stream as
//! `Ok(None)`. Device nodes and capture files are both plain readers here;
//! line settings (baud rate, parity) belong to the transport.

mod stream;

pub use stream::ReaderSource;

use std::path::PathBuf;

use thiserror::Error;

pub trait ByteSource {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        (**self).next_byte()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        (**self).next_byte()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
