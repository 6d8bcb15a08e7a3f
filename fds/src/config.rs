use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{FdsError, FdsResult};

/// Default number of context bytes shown around each match
pub const DEFAULT_CONTEXT_BYTES: usize = 50;

/// Default size of the worker pool used for non-interactive directory runs
pub const DEFAULT_WORKERS: usize = 4;

/// Configuration for a find/replace run.
///
/// # Configuration Locations
///
/// Values are loaded from the following files, later ones taking precedence:
/// 1. Global `$HOME/.config/fds/config.yaml`
/// 2. Local `.fds.yaml` in the current directory
/// 3. Custom config file specified via the `--config` flag
///
/// Command-line options take precedence over every file (see [`FdsConfig::merge_with_cli`]).
///
/// # Configuration Format
///
/// ```yaml
/// # Number of worker threads for non-interactive directory runs
/// workers: 8
///
/// # Bytes of context rendered around each match when confirming
/// context_bytes: 30
///
/// # Paths to skip when walking a directory (glob syntax)
/// ignore_globs:
///   - "vendor/**"
///   - "**/*.min.js"
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// The behavioural switches in [`ReplaceFlags`] only come from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FdsConfig {
    /// Switches selected on the command line
    #[serde(skip)]
    pub flags: ReplaceFlags,

    /// Number of worker threads for non-interactive directory runs
    pub workers: NonZeroUsize,

    /// Number of bytes of context shown before and after each match
    pub context_bytes: usize,

    /// Glob patterns of paths excluded from directory enumeration
    pub ignore_globs: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// The recognised command-line switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceFlags {
    /// Treat the search text as a plain string instead of a regular expression
    pub literal: bool,
    /// Ignore case when matching
    pub insensitive: bool,
    /// Ask before every substitution
    pub confirm: bool,
    /// Print debug information
    pub verbose: bool,
}

fn default_workers() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_WORKERS).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for FdsConfig {
    fn default() -> Self {
        Self {
            flags: ReplaceFlags::default(),
            workers: default_workers(),
            context_bytes: DEFAULT_CONTEXT_BYTES,
            ignore_globs: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl FdsConfig {
    /// Loads configuration from the default locations plus an explicit file
    pub fn load_from(config_path: Option<&Path>) -> FdsResult<Self> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(FdsError::config_error(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
        }

        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("fds/config.yaml")),
            Some(PathBuf::from(".fds.yaml")),
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        self.flags = cli.flags;
        if let Some(workers) = cli.workers {
            self.workers = workers;
        }
        if let Some(context_bytes) = cli.context_bytes {
            self.context_bytes = context_bytes;
        }
        // Globs accumulate: the file lists project-wide exclusions, the CLI adds to them
        self.ignore_globs.extend(cli.ignore_globs);
        if cli.flags.verbose {
            self.log_level = "debug".to_string();
        }
        self
    }
}

/// Values supplied on the command line that override the config files
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub flags: ReplaceFlags,
    pub workers: Option<NonZeroUsize>,
    pub context_bytes: Option<usize>,
    pub ignore_globs: Vec<String>,
}
