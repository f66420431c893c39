//! Error types for rtest-core
//!
//! Errors fall in two groups:
//!
//! - **Startup errors**: configuration and the initial directory walk. These
//!   stop the process before any watching begins.
//! - **Event loop errors**: anything raised while handling a filesystem event.
//!   These end the event loop; the manual trigger path only reports them.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Core error type for rtest operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// A directory could not be listed during the startup walk
    #[error("error occurred while walking {}: {reason}", path.display())]
    Traversal { path: PathBuf, reason: String },

    /// The watch mechanism refused a directory
    #[error("failed to add watch to {}: {reason}", path.display())]
    WatchRegistration { path: PathBuf, reason: String },

    /// A freshly created entry could not be inspected
    #[error("failed to stat newly created file {}: {reason}", path.display())]
    Stat { path: PathBuf, reason: String },

    /// The external test command could not be started
    #[error("failed to run {program} in {}: {reason}", dir.display())]
    ProcessLaunch {
        program: String,
        dir: PathBuf,
        reason: String,
    },

    /// The watch mechanism reported an error on its error stream
    #[error("watching error: {0}")]
    WatchMechanism(String),

    /// Configuration is malformed or fails validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO outside of the categories above
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    pub fn traversal(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Traversal {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn watch_registration(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::WatchRegistration {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn stat(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Stat {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn process_launch(
        program: impl Into<String>,
        dir: impl AsRef<Path>,
        reason: impl ToString,
    ) -> Self {
        Self::ProcessLaunch {
            program: program.into(),
            dir: dir.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Returns the process exit code for this error.
    ///
    /// Exit code scheme:
    /// - 1: configuration (bad flags, bad `rtest.toml`, bad env vars)
    /// - 2: startup watch setup (directory walk or watch registration)
    /// - 3: anything else
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) => 1,
            Self::Traversal { .. } | Self::WatchRegistration { .. } => 2,
            Self::Stat { .. }
            | Self::ProcessLaunch { .. }
            | Self::WatchMechanism(_)
            | Self::Io(_) => 3,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid_config(format!("Failed to parse rtest.toml: {err}"))
    }
}

/// Result type alias for rtest-core operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traversal_display_names_path() {
        let err = Error::traversal("/proj/locked", "permission denied");
        assert_eq!(
            err.to_string(),
            "error occurred while walking /proj/locked: permission denied"
        );
    }

    #[test]
    fn test_process_launch_display() {
        let err = Error::process_launch("go", "/proj/a", "No such file or directory");
        let display = err.to_string();
        assert!(display.contains("go"));
        assert!(display.contains("/proj/a"));
        assert!(display.contains("No such file or directory"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::invalid_config("x").exit_code(), 1);
        assert_eq!(Error::traversal("/p", "x").exit_code(), 2);
        assert_eq!(Error::watch_registration("/p", "x").exit_code(), 2);
        assert_eq!(Error::stat("/p", "x").exit_code(), 3);
        assert_eq!(Error::WatchMechanism("x".into()).exit_code(), 3);
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
