use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use framelog_core::{
    Config, ConsoleSink, FanoutSink, Limits, LogSink, Mode, ReaderSource, ResyncMode, RunSummary,
    StopToken,
};
use glob::glob;
use tracing::{debug, info};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("FRAMELOG_BUILD_COMMIT"),
    " ",
    env!("FRAMELOG_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "framelog")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decode framed serial telemetry and append it to a timestamped log.",
    long_about = None,
    after_help = "Examples:\n  framelog listen /dev/ttyACM0\n  framelog listen --mode raw --log raw.log\n  framelog replay capture.bin --summary summary.json"
)]
struct Cli {
    /// Diagnostic verbosity on stderr (-v info, -vv debug); RUST_LOG wins
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read telemetry from a serial device node until stopped.
    Listen {
        /// Device path (defaults to the config file value, then /dev/ttyACM0)
        device: Option<PathBuf>,

        #[command(flatten)]
        options: RunOptions,
    },
    /// Decode a captured byte stream from a file.
    #[command(alias = "decode")]
    #[command(
        after_help = "Examples:\n  framelog replay capture.bin\n  framelog decode 'captures/run-*.bin' --log control.log"
    )]
    Replay {
        /// Capture file (a glob pattern matching exactly one file is accepted)
        input: PathBuf,

        #[command(flatten)]
        options: RunOptions,
    },
}

#[derive(Args, Debug)]
struct RunOptions {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output strategy: decoded frame words or raw text lines
    #[arg(long)]
    mode: Option<Mode>,

    /// Restart frame detection on any start byte seen mid-frame
    #[arg(long)]
    strict_resync: bool,

    /// Append records to this log file
    #[arg(short, long, conflicts_with = "no_log")]
    log: Option<PathBuf>,

    /// Do not write a log file
    #[arg(long)]
    no_log: bool,

    /// Suppress console echo and status output
    #[arg(short, long)]
    quiet: bool,

    /// Stop after reading this many bytes
    #[arg(long)]
    max_bytes: Option<u64>,

    /// Stop after writing this many records
    #[arg(long)]
    max_records: Option<u64>,

    /// Stop after this many seconds (checked between reads)
    #[arg(long, value_name = "SECS")]
    duration: Option<u64>,

    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Pretty-print the JSON summary
    #[arg(long, requires = "summary")]
    pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Device,
    Capture,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Listen { device, options } => cmd_listen(device, options),
        Commands::Replay { input, options } => cmd_replay(input, options),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "framelog=warn,framelog_core=warn",
        1 => "framelog=info,framelog_core=info",
        _ => "framelog=debug,framelog_core=debug",
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default.to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_listen(device: Option<PathBuf>, options: RunOptions) -> Result<(), CliError> {
    let config = load_config(&options, InputKind::Device)?;
    let device = device.unwrap_or_else(|| config.device.clone());
    run_pipeline(&device, InputKind::Device, config, &options)
}

fn cmd_replay(input: PathBuf, options: RunOptions) -> Result<(), CliError> {
    let resolved = resolve_input_path(&input)?;
    validate_input_file(&resolved)?;
    let config = load_config(&options, InputKind::Capture)?;
    run_pipeline(&resolved, InputKind::Capture, config, &options)
}

/// Merge the optional config file with command-line overrides.
fn load_config(options: &RunOptions, kind: InputKind) -> Result<Config, CliError> {
    let mut config = match options.config.as_ref() {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            Config::load(path).map_err(|err| {
                CliError::new(
                    err.to_string(),
                    Some("check the JSON configuration file".to_string()),
                )
            })?
        }
        None => {
            let mut config = Config::default();
            // Replays do not touch the default log unless asked to.
            if kind == InputKind::Capture {
                config.log_file = None;
            }
            config
        }
    };

    if let Some(mode) = options.mode {
        config.mode = mode;
    }
    if options.strict_resync {
        config.resync = ResyncMode::Strict;
    }
    if let Some(log) = options.log.as_ref() {
        config.log_file = Some(log.clone());
    }
    if options.no_log {
        config.log_file = None;
    }
    if options.quiet {
        config.echo = false;
    }
    debug!(?config, "effective configuration");
    Ok(config)
}

fn run_pipeline(
    input: &Path,
    kind: InputKind,
    config: Config,
    options: &RunOptions,
) -> Result<(), CliError> {
    let layout = config
        .layout()
        .context("invalid frame layout in configuration")?;

    if let Some(log) = config.log_file.as_ref() {
        ensure_distinct(input, log, "log")?;
    }
    if let Some(summary) = options.summary.as_ref() {
        ensure_distinct(input, summary, "summary")?;
    }

    let mut source = ReaderSource::open(input).map_err(|err| {
        let hint = match kind {
            InputKind::Device => "check the device path and read permissions (e.g. dialout group)",
            InputKind::Capture => "check the capture file path",
        };
        CliError::new(err.to_string(), Some(hint.to_string()))
    })?;

    let mut sinks = FanoutSink::new();
    if config.echo {
        sinks.push(Box::new(ConsoleSink::stdout()));
    }
    if let Some(log) = config.log_file.as_ref() {
        create_parent_dir(log)?;
        let sink = LogSink::append(log).map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("choose a writable log path or pass --no-log".to_string()),
            )
        })?;
        sinks.push(Box::new(sink));
    }

    let stop = StopToken::new();
    if let Some(secs) = options.duration {
        let timer = stop.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            timer.cancel();
        });
    }
    let limits = Limits {
        max_bytes: options.max_bytes,
        max_records: options.max_records,
    };

    let mut decoder = config.mode.decoder(layout, config.resync);
    info!(input = %input.display(), mode = %config.mode, resync = %config.resync, "reading telemetry");
    let summary = framelog_core::run(&mut source, &mut decoder, &mut sinks, &stop, limits)
        .with_context(|| format!("telemetry pipeline failed on {}", input.display()))?;

    if let Some(path) = options.summary.as_ref() {
        write_summary(path, &summary, options.pretty)?;
    }
    if !options.quiet {
        print_status(&summary, config.log_file.as_deref());
    }
    Ok(())
}

fn write_summary(path: &Path, summary: &RunSummary, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(summary)
    } else {
        serde_json::to_string(summary)
    };
    let json = json.context("JSON serialization failed")?;
    create_parent_dir(path)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write summary: {}", path.display()))?;
    Ok(())
}

fn print_status(summary: &RunSummary, log: Option<&Path>) {
    let target = log
        .map(|path| format!(" -> {}", path.display()))
        .unwrap_or_default();
    eprintln!(
        "OK: {} records from {} bytes ({}){}",
        summary.records_written, summary.bytes_read, summary.end, target
    );
    if let Some(framing) = summary.framing {
        eprintln!(
            "  frames: {} completed, {} short, {} abandoned; {} resyncs, {} bytes discarded",
            framing.frames_completed,
            framing.short_frames,
            framing.abandoned_frames,
            framing.resyncs,
            framing.discarded_bytes
        );
    }
    if summary.ended_mid_frame {
        eprintln!("  warning: input ended inside an unterminated frame");
    }
}

fn create_parent_dir(path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    Ok(())
}

/// Refuse to write an output file over the input being read.
fn ensure_distinct(input: &Path, output: &Path, what: &str) -> Result<(), CliError> {
    let Ok(input_abs) = fs::canonicalize(input) else {
        return Ok(());
    };
    let Ok(output_abs) = fs::canonicalize(output) else {
        return Ok(());
    };
    if input_abs == output_abs {
        return Err(CliError::new(
            format!("{} path must differ from input: {}", what, output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a captured byte stream file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use `framelog listen` for device nodes".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single capture file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
