/// This module defines the error taxonomy for fds.
///
/// Every reportable failure maps to exactly one [`FdsError`] variant, and every
/// variant carries a stable numeric code that the CLI uses as its process exit
/// status. Scripts can therefore tell "the regex was malformed" apart from
/// "the user declined to overwrite a file that changed under us" without
/// parsing messages:
///
/// ```rust,ignore
/// match fds::replace_in_file(&path, &replacement, &config, &prompt, &mut answer) {
///     Ok(changed) => // done,
///     Err(e) if e.is_usage() => // print usage, exit(e.code()),
///     Err(e) => // exit(e.code()),
/// }
/// ```
///
/// # Error classes
///
/// 1. **Validation errors** (`InvalidPattern`, `InvalidArguments`, `FileNotFound`,
///    `LiteralInsensitiveConflict`, `ConfirmWithoutFile`) are raised before any
///    file is touched. They are usage-class errors: the CLI echoes its usage
///    line alongside the message.
/// 2. **Per-file errors** (`FileRead`, `FileWrite`, `TempFileWrite`, `Rename`,
///    `AbortedOperation`) are raised by the commit protocol for a single file.
/// 3. **Run errors** (`StdinRead`, `DirectoryRead`, `InvalidConfirmInput`,
///    `Config`) concern the invocation as a whole.
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for fds operations
pub type FdsResult<T> = Result<T, FdsError>;

/// Errors that can occur while finding and replacing
#[derive(Error, Debug)]
pub enum FdsError {
    #[error("search pattern is not a valid regular expression: {0}")]
    InvalidPattern(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("file '{0}' could not be found")]
    FileNotFound(PathBuf),
    #[error("[-l, --literal] cannot be used along with [-i, --insensitive]")]
    LiteralInsensitiveConflict,
    #[error("failed to read file {path:?}, do you have permission to read it? ({source})")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write file {path:?}, do you have permission to write in its directory? ({source})")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write temporary file, do you have permission to write in directory {dir:?}? ({source})")]
    TempFileWrite {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("[-c, --confirm] can only be used when a file or directory is supplied, not with STDIN")]
    ConfirmWithoutFile,
    #[error("failed to read from STDIN: {0}")]
    StdinRead(#[source] io::Error),
    #[error("failed to replace {path:?} with temporary file {temp:?}: {source}")]
    Rename {
        path: PathBuf,
        temp: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read directory {path:?}: {message}")]
    DirectoryRead { path: PathBuf, message: String },
    #[error("operation aborted, {0:?} was left untouched")]
    AbortedOperation(PathBuf),
    #[error("invalid input: {0}")]
    InvalidConfirmInput(char),
    #[error("configuration error: {0}")]
    Config(String),
}

impl FdsError {
    pub fn invalid_pattern(msg: impl Into<String>) -> Self {
        Self::InvalidPattern(msg.into())
    }

    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    pub fn temp_file_write(dir: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::TempFileWrite {
            dir: dir.into(),
            source,
        }
    }

    pub fn rename(path: impl Into<PathBuf>, temp: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Rename {
            path: path.into(),
            temp: temp.into(),
            source,
        }
    }

    pub fn directory_read(path: &Path, message: impl Into<String>) -> Self {
        Self::DirectoryRead {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn aborted(path: impl Into<PathBuf>) -> Self {
        Self::AbortedOperation(path.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable exit code for this kind of error
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidPattern(_) => 42,
            Self::InvalidArguments(_) => 43,
            Self::FileNotFound(_) => 44,
            Self::LiteralInsensitiveConflict => 45,
            Self::FileRead { .. } => 46,
            Self::FileWrite { .. } => 47,
            Self::TempFileWrite { .. } => 48,
            Self::ConfirmWithoutFile => 49,
            Self::StdinRead(_) => 50,
            Self::Rename { .. } => 51,
            Self::DirectoryRead { .. } => 52,
            Self::AbortedOperation(_) => 53,
            Self::InvalidConfirmInput(_) => 54,
            Self::Config(_) => 55,
        }
    }

    /// Whether the CLI should echo its usage text along with this error
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern(_)
                | Self::InvalidArguments(_)
                | Self::FileNotFound(_)
                | Self::LiteralInsensitiveConflict
                | Self::ConfirmWithoutFile
        )
    }
}

impl From<config::ConfigError> for FdsError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
