use std::io::{self, Stdout, Write};

use super::{RecordSink, SinkError};
use crate::decode::Record;

/// Prints the bare message of each record, one per line.
pub struct ConsoleSink<W: Write> {
    writer: W,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for ConsoleSink<W> {
    fn write_record(&mut self, record: &Record) -> Result<(), SinkError> {
        writeln!(self.writer, "{record}")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
