use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use super::{ByteSource, SourceError};

/// Internal buffer size; bytes are still delivered one at a time.
pub const READ_BUFFER_SIZE: usize = 4 * 1024;

/// `ByteSource` over any reader: a device node, a capture file, a cursor.
///
/// # Examples
/// ```
/// use std::io::Cursor;
///
/// use framelog_core::{ByteSource, ReaderSource};
///
/// let mut source = ReaderSource::new(Cursor::new(vec![0xFB, 0x01]));
/// assert_eq!(source.next_byte()?, Some(0xFB));
/// assert_eq!(source.next_byte()?, Some(0x01));
/// assert_eq!(source.next_byte()?, None);
/// # Ok::<(), framelog_core::SourceError>(())
/// ```
pub struct ReaderSource<R> {
    inner: BufReader<R>,
}

impl ReaderSource<File> {
    /// Open a device node or file for reading.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file))
    }
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::with_capacity(READ_BUFFER_SIZE, reader),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(SourceError::Io(err)),
            }
        }
    }
}
