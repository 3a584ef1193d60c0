use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced by add/remove/status operations
#[derive(Debug, Error)]
pub enum AutostartError {
    /// No startup strategy exists for the running operating system
    #[error("Operating system is not supported: {0}")]
    UnsupportedPlatform(String),

    /// The home (or roaming application data) directory could not be resolved
    #[error("Could not determine the user's home directory")]
    HomeDirUnavailable,

    /// Identifier is empty or would escape the startup directory
    #[error("Invalid startup identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Filesystem operation failed
    #[error("Failed to {operation} {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
    },
}

impl AutostartError {
    pub(crate) fn io(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        AutostartError::Io {
            path: path.to_path_buf(),
            operation,
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AutostartError>;
