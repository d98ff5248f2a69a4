// src/error.rs

//! Error types for aptglue operations

use thiserror::Error;

/// Result type alias using the aptglue Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by aptglue operations
#[derive(Error, Debug)]
pub enum Error {
    /// The dpkg database was left in an interrupted state. This is never
    /// auto-resolved; an operator must run `dpkg --configure -a` manually.
    #[error("dpkg was interrupted; run 'dpkg --configure -a' to fix the package database")]
    LockInterrupted,

    /// A generated meta-package descriptor is missing a required field
    #[error("invalid meta-package descriptor: {0}")]
    InvalidDescriptor(String),

    /// The external builder tool failed to produce an installable unit
    #[error("meta-package build failed: {0}")]
    BuildFailed(String),

    /// Declared dependencies could not be resolved, even after the
    /// automatic repair attempt. Not retried.
    #[error("dependency resolution failed: {0}")]
    DependencyResolutionFailed(String),

    /// apt-get exited with a non-zero status
    #[error("apt-get {command} failed with exit code {code}")]
    AptFailed { command: String, code: i32 },

    /// A subprocess other than apt-get failed
    #[error("command failed: {0}")]
    CommandFailed(String),

    /// A required external tool is not installed
    #[error("required tool not found: {0}")]
    ToolNotFound(String),

    #[error("download failed: {0}")]
    DownloadError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}
