//! Record sinks.
//!
//! Sinks receive records in stream order. `LogSink` appends timestamped
//! lines to a text log, `ConsoleSink` echoes bare messages, `FanoutSink`
//! feeds several sinks from one pipeline.

mod console;
mod logfile;

pub use console::ConsoleSink;
pub use logfile::{LOG_SEPARATOR, LogSink, format_log_line, format_timestamp};

use std::path::PathBuf;

use thiserror::Error;

use crate::decode::Record;

pub trait RecordSink {
    fn write_record(&mut self, record: &Record) -> Result<(), SinkError>;

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write_record(&mut self, record: &Record) -> Result<(), SinkError> {
        (**self).write_record(record)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn write_record(&mut self, record: &Record) -> Result<(), SinkError> {
        (**self).write_record(record)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to open log {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Forwards every record to each inner sink, in insertion order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn RecordSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn RecordSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl RecordSink for FanoutSink {
    fn write_record(&mut self, record: &Record) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            sink.write_record(record)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{FanoutSink, RecordSink, SinkError};
    use crate::decode::Record;

    struct Shared(Rc<RefCell<Vec<String>>>);

    impl RecordSink for Shared {
        fn write_record(&mut self, record: &Record) -> Result<(), SinkError> {
            self.0.borrow_mut().push(record.to_string());
            Ok(())
        }
    }

    #[test]
    fn fanout_feeds_every_sink() {
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));
        let mut fanout = FanoutSink::new();
        assert!(fanout.is_empty());
        fanout.push(Box::new(Shared(first.clone())));
        fanout.push(Box::new(Shared(second.clone())));
        assert_eq!(fanout.len(), 2);

        fanout
            .write_record(&Record::Line("hello".to_string()))
            .unwrap();
        fanout.flush().unwrap();

        assert_eq!(*first.borrow(), ["hello"]);
        assert_eq!(*second.borrow(), ["hello"]);
    }
}
