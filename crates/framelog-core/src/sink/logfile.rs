use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::Path;

use time::OffsetDateTime;
use time::macros::format_description;

use super::{RecordSink, SinkError};
use crate::decode::Record;

/// Separator between timestamp and message in a log line.
pub const LOG_SEPARATOR: &str = " : ";

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS,mmm`.
///
/// # Examples
/// ```
/// use time::macros::datetime;
///
/// use framelog_core::format_timestamp;
///
/// let ts = format_timestamp(datetime!(2021-12-15 09:30:05.250 UTC))?;
/// assert_eq!(ts, "2021-12-15 09:30:05,250");
/// # Ok::<(), framelog_core::SinkError>(())
/// ```
pub fn format_timestamp(at: OffsetDateTime) -> Result<String, SinkError> {
    let format = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second],[subsecond digits:3]"
    );
    Ok(at.format(format)?)
}

/// Build one log line, without the trailing newline.
pub fn format_log_line(at: OffsetDateTime, message: &str) -> Result<String, SinkError> {
    Ok(format!("{}{LOG_SEPARATOR}{message}", format_timestamp(at)?))
}

/// Append-only text log, one `<timestamp> : <message>` line per record.
///
/// Timestamps are UTC.
pub struct LogSink<W: Write> {
    writer: W,
    clock: fn() -> OffsetDateTime,
}

impl LogSink<LineWriter<File>> {
    /// Open `path` for appending, creating it when missing.
    pub fn append(path: &Path) -> Result<Self, SinkError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| SinkError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(LineWriter::new(file)))
    }
}

impl<W: Write> LogSink<W> {
    pub fn new(writer: W) -> Self {
        Self::with_clock(writer, OffsetDateTime::now_utc)
    }

    pub fn with_clock(writer: W, clock: fn() -> OffsetDateTime) -> Self {
        Self { writer, clock }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for LogSink<W> {
    fn write_record(&mut self, record: &Record) -> Result<(), SinkError> {
        let line = format_log_line((self.clock)(), &record.to_string())?;
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use time::OffsetDateTime;
    use time::macros::datetime;

    use super::{LogSink, format_log_line};
    use crate::decode::Record;
    use crate::protocols::frame::DecodedWord;
    use crate::sink::RecordSink;

    fn fixed_clock() -> OffsetDateTime {
        datetime!(2021-12-15 10:00:00.007 UTC)
    }

    #[test]
    fn formats_timestamp_and_message() {
        let line = format_log_line(fixed_clock(), "258").unwrap();
        assert_eq!(line, "2021-12-15 10:00:00,007 : 258");
    }

    #[test]
    fn writes_one_line_per_record() {
        let mut sink = LogSink::with_clock(Vec::new(), fixed_clock);
        sink.write_record(&Record::Word(DecodedWord(258))).unwrap();
        sink.write_record(&Record::Line("Datalog start".to_string())).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "2021-12-15 10:00:00,007 : 258\n2021-12-15 10:00:00,007 : Datalog start\n"
        );
    }

    #[test]
    fn append_keeps_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("control.log");
        fs::write(&path, "earlier line\n").unwrap();

        let mut sink = LogSink::append(&path).unwrap();
        sink.write_record(&Record::Word(DecodedWord(772))).unwrap();
        sink.flush().unwrap();
        drop(sink);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "earlier line");
        assert!(lines[1].ends_with(" : 772"));
    }

    #[test]
    fn append_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("control.log");
        let err = match LogSink::append(&path) {
            Ok(_) => panic!("expected open failure"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("failed to open log"));
    }
}
