use super::{Decoder, Record};

/// Longest line kept before it is flushed as a record anyway.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

/// Raw passthrough strategy: newline-delimited text, `\r\n` tolerated.
#[derive(Debug, Clone)]
pub struct LineDecoder {
    buf: Vec<u8>,
    max_len: usize,
}

impl LineDecoder {
    pub fn new(max_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_len: max_len.max(1),
        }
    }

    fn take_line(&mut self) -> Record {
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        Record::Line(line)
    }

    /// Flushes a full buffer without splitting a trailing UTF-8 sequence.
    fn take_full(&mut self) -> Record {
        let at = match std::str::from_utf8(&self.buf) {
            Err(err) if err.error_len().is_none() && err.valid_up_to() > 0 => err.valid_up_to(),
            _ => self.buf.len(),
        };
        let tail = self.buf.split_off(at);
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf = tail;
        Record::Line(line)
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}

impl Decoder for LineDecoder {
    fn push(&mut self, byte: u8) -> Option<Record> {
        if byte == b'\n' {
            return Some(self.take_line());
        }
        // A full line flushes only once a byte that does not end it arrives.
        // One `\r` past the limit is held back in case `\n` follows.
        let full = self.buf.len() >= self.max_len;
        let held_cr = byte == b'\r' && self.buf.len() == self.max_len;
        let flushed = (full && !held_cr).then(|| self.take_full());
        self.buf.push(byte);
        flushed
    }

    fn finish(&mut self) -> Option<Record> {
        if self.buf.is_empty() {
            return None;
        }
        Some(self.take_line())
    }
}
