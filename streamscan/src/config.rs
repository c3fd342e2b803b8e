use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::ScanResult;
use crate::keyword::{Keyword, MAX_KEYWORD_LENGTH};
use crate::search::dispatcher::LaneConfig;

/// Bytes of new input loaded into each window (1 MiB)
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Offsets handed to a lane at a time
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Configuration for a scan.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.streamscan.yaml` in the current directory
/// 3. Global `$HOME/.config/streamscan/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Bytes to search for (exact match, case-sensitive)
/// keyword: "needle"
///
/// # File to scan
/// source: "haystack.bin"
///
/// # New bytes read per window (default: 1 MiB)
/// chunk_size: 1048576
///
/// # Parallel lanes (default: CPU cores)
/// lanes: 8
///
/// # Offsets per lane batch (default: 256)
/// batch_size: 256
///
/// # Longest accepted keyword (default: 255)
/// max_keyword_length: 255
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// When using the CLI, command-line arguments take precedence over config file values.
/// The merging behavior is defined in the `merge_with_cli` method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// The bytes to search for
    #[serde(default)]
    pub keyword: String,

    /// Stream to scan
    #[serde(default)]
    pub source: PathBuf,

    /// New bytes read into each window
    #[serde(default = "default_chunk_size")]
    pub chunk_size: NonZeroUsize,

    /// Number of parallel lanes
    /// Defaults to number of CPU cores if not specified
    #[serde(default = "default_lanes")]
    pub lanes: NonZeroUsize,

    /// Candidate offsets evaluated per lane batch
    #[serde(default = "default_batch_size")]
    pub batch_size: NonZeroUsize,

    /// Longest keyword accepted, in bytes
    #[serde(default = "default_max_keyword_length")]
    pub max_keyword_length: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_chunk_size() -> NonZeroUsize {
    NonZeroUsize::new(CHUNK_SIZE).unwrap_or(NonZeroUsize::MIN)
}

fn default_lanes() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_batch_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN)
}

fn default_max_keyword_length() -> usize {
    MAX_KEYWORD_LENGTH
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            source: PathBuf::new(),
            chunk_size: default_chunk_size(),
            lanes: default_lanes(),
            batch_size: default_batch_size(),
            max_keyword_length: default_max_keyword_length(),
            log_level: default_log_level(),
        }
    }
}

/// Values given explicitly on the command line.
///
/// `None` leaves the loaded value alone; `Some` always wins, even when it
/// equals the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOverrides {
    pub keyword: Option<String>,
    pub source: Option<PathBuf>,
    pub chunk_size: Option<NonZeroUsize>,
    pub lanes: Option<NonZeroUsize>,
    pub batch_size: Option<NonZeroUsize>,
    pub max_keyword_length: Option<usize>,
    pub log_level: Option<String>,
}

impl ScanConfig {
    /// Creates a configuration with default tuning for the given keyword and source
    pub fn new(keyword: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            keyword: keyword.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from the default locations plus a specific file.
    /// An explicitly named file must exist.
    pub fn load_from(config_path: Option<&Path>) -> ScanResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let default_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("streamscan/config.yaml")),
            // Local config
            Some(PathBuf::from(".streamscan.yaml")),
        ];

        for path in default_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli: ScanOverrides) -> Self {
        // CLI values take precedence over config file values
        if let Some(keyword) = cli.keyword {
            self.keyword = keyword;
        }
        if let Some(source) = cli.source {
            self.source = source;
        }
        if let Some(chunk_size) = cli.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(lanes) = cli.lanes {
            self.lanes = lanes;
        }
        if let Some(batch_size) = cli.batch_size {
            self.batch_size = batch_size;
        }
        if let Some(max_keyword_length) = cli.max_keyword_length {
            self.max_keyword_length = max_keyword_length;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        self
    }

    /// Validates and returns the keyword
    pub fn keyword(&self) -> ScanResult<Keyword> {
        Keyword::new(self.keyword.as_bytes(), self.max_keyword_length)
    }

    /// Lane geometry for the dispatcher
    pub fn lane_config(&self) -> LaneConfig {
        LaneConfig {
            lanes: self.lanes,
            batch_size: self.batch_size,
        }
    }
}
