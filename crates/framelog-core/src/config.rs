use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::Mode;
use crate::protocols::frame::layout::{DEFAULT_FRAME_WORDS, END_MARKER, START_MARKER};
use crate::protocols::frame::{FrameLayout, LayoutError, ResyncMode};

pub const DEFAULT_DEVICE: &str = "/dev/ttyACM0";
pub const DEFAULT_LOG_FILE: &str = "control.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid frame layout: {0}")]
    Layout(#[from] LayoutError),
}

/// Logger configuration. Every field is optional in the JSON file.
///
/// # Examples
/// ```
/// use framelog_core::{Config, Mode, ResyncMode};
///
/// let config = Config::from_json(r#"{ "mode": "raw", "resync": "strict", "log_file": null }"#)?;
/// assert_eq!(config.mode, Mode::Raw);
/// assert_eq!(config.resync, ResyncMode::Strict);
/// assert!(config.log_file.is_none());
/// assert_eq!(config.frame.words, 7);
/// # Ok::<(), framelog_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Device node to read from.
    pub device: PathBuf,
    pub mode: Mode,
    pub resync: ResyncMode,
    /// Append-only log; `null` disables file logging.
    pub log_file: Option<PathBuf>,
    /// Echo each record to stdout.
    pub echo: bool,
    pub frame: FrameConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    pub start: [u8; 2],
    pub end: [u8; 2],
    /// Total frame length in 16-bit words, markers included.
    pub words: usize,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        config.layout()?;
        Ok(config)
    }

    pub fn layout(&self) -> Result<FrameLayout, LayoutError> {
        FrameLayout::new(self.frame.start, self.frame.end, self.frame.words)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            mode: Mode::default(),
            resync: ResyncMode::default(),
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
            echo: true,
            frame: FrameConfig::default(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            start: START_MARKER,
            end: END_MARKER,
            words: DEFAULT_FRAME_WORDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::{Config, ConfigError, DEFAULT_LOG_FILE};
    use crate::decode::Mode;
    use crate::protocols::frame::{FrameLayout, LayoutError, ResyncMode};

    #[test]
    fn empty_object_uses_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.log_file, Some(PathBuf::from(DEFAULT_LOG_FILE)));
        assert_eq!(config.layout().unwrap(), FrameLayout::default());
    }

    #[test]
    fn overrides_frame_shape() {
        let config = Config::from_json(
            r#"{ "device": "/dev/ttyUSB1", "frame": { "start": [170, 85], "words": 4 } }"#,
        )
        .unwrap();
        assert_eq!(config.device, PathBuf::from("/dev/ttyUSB1"));
        let layout = config.layout().unwrap();
        assert_eq!(layout.start(), [0xAA, 0x55]);
        assert_eq!(layout.end(), [0xCD, 0xAB]);
        assert_eq!(layout.payload_words(), 2);
        assert_eq!(config.mode, Mode::Decoded);
        assert_eq!(config.resync, ResyncMode::Compatible);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = Config::from_json(r#"{ "baud": 115200 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_frame_without_payload() {
        let err = Config::from_json(r#"{ "frame": { "words": 2 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Layout(_)));
        assert!(err.to_string().contains("invalid frame layout"));
    }

    #[test]
    fn rejects_frame_too_long_to_represent() {
        let err = Config::from_json(&format!(r#"{{ "frame": {{ "words": {} }} }}"#, usize::MAX))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Layout(LayoutError::TooLong { .. })));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("framelog.json");
        fs::write(&path, r#"{ "echo": false, "mode": "raw" }"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert!(!config.echo);
        assert_eq!(config.mode, Mode::Raw);

        let err = Config::load(Path::new("/nonexistent/framelog.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
