use std::fs;
use std::io::Cursor;
use std::thread;
use std::time::Duration;

use framelog_core::{
    ByteSource, Config, ConsoleSink, FanoutSink, Limits, LogSink, Mode, ReaderSource, RunEnd,
    SourceError, StopToken, run,
};

const FRAME: [u8; 14] = [
    0xFB, 0xFB, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0xCD, 0xAB,
];

/// Endless source that repeats one frame; only a stop request ends it.
struct Repeating {
    pos: usize,
}

impl ByteSource for Repeating {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        let byte = FRAME[self.pos % FRAME.len()];
        self.pos += 1;
        Ok(Some(byte))
    }
}

#[test]
fn capture_file_decodes_into_log_lines() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("capture.bin");
    let log = dir.path().join("control.log");

    let mut bytes = vec![0x00, 0x42];
    bytes.extend_from_slice(&FRAME);
    bytes.extend_from_slice(&FRAME);
    fs::write(&capture, &bytes).unwrap();

    let config = Config::default();
    let mut source = ReaderSource::open(&capture).unwrap();
    let mut decoder = config
        .mode
        .decoder(config.layout().unwrap(), config.resync);
    let mut sink = LogSink::append(&log).unwrap();

    let summary = run(
        &mut source,
        &mut decoder,
        &mut sink,
        &StopToken::new(),
        Limits::default(),
    )
    .unwrap();
    drop(sink);

    assert_eq!(summary.bytes_read, bytes.len() as u64);
    assert_eq!(summary.records_written, 10);
    let framing = summary.framing.unwrap();
    assert_eq!(framing.frames_completed, 2);
    assert_eq!(framing.discarded_bytes, 2);

    let content = fs::read_to_string(&log).unwrap();
    let messages: Vec<&str> = content
        .lines()
        .map(|line| line.split_once(" : ").unwrap().1)
        .collect();
    assert_eq!(
        messages,
        ["258", "772", "1286", "1800", "2314", "258", "772", "1286", "1800", "2314"]
    );
}

#[test]
fn fanout_writes_console_and_log_in_raw_mode() {
    let mut source = ReaderSource::new(Cursor::new(b"Datalog start\r\nDatalog end\r\n".to_vec()));
    let mut decoder = Mode::Raw.decoder(Default::default(), Default::default());
    let mut sinks = FanoutSink::new();
    sinks.push(Box::new(ConsoleSink::new(Vec::new())));
    sinks.push(Box::new(LogSink::new(Vec::new())));

    let summary = run(
        &mut source,
        &mut decoder,
        &mut sinks,
        &StopToken::new(),
        Limits::default(),
    )
    .unwrap();
    assert_eq!(summary.records_written, 2);
    assert!(summary.framing.is_none());
    assert!(!summary.ended_mid_frame);
}

#[test]
fn stop_token_ends_an_endless_stream() {
    let stop = StopToken::new();
    let timer = stop.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        timer.cancel();
    });

    let mut source = Repeating { pos: 0 };
    let mut decoder = Mode::Decoded.decoder(Default::default(), Default::default());
    let mut sink = ConsoleSink::new(std::io::sink());
    let summary = run(&mut source, &mut decoder, &mut sink, &stop, Limits::default()).unwrap();
    handle.join().unwrap();

    assert_eq!(summary.end, RunEnd::Stopped);
    assert!(summary.bytes_read > 0);
}

#[test]
fn source_failure_propagates() {
    struct Unplugged;

    impl ByteSource for Unplugged {
        fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
            Err(SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "device unplugged",
            )))
        }
    }

    let mut decoder = Mode::Decoded.decoder(Default::default(), Default::default());
    let mut sink = ConsoleSink::new(Vec::new());
    let err = run(
        &mut Unplugged,
        &mut decoder,
        &mut sink,
        &StopToken::new(),
        Limits::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("device unplugged"));
}
