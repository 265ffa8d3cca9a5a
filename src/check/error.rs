use thiserror::Error;

use crate::loader::error::LoaderError;
use crate::parser::traits::ParseError;
use crate::version::error::VersionError;

/// Failure reported by a check; cancellation is reported separately
#[derive(Debug, Error)]
pub enum CheckError {
    /// The loader rejected its own configuration before any I/O
    #[error("Loader configuration error: {0}")]
    Configuration(String),

    /// The transport failed while loading
    #[error("Failed to load policy document: {0}")]
    Transport(#[source] LoaderError),

    #[error("Malformed policy document: {0}")]
    MalformedDocument(#[from] ParseError),

    #[error("Invalid version format: {0}")]
    InvalidVersion(#[from] VersionError),

    /// The loader or parser panicked; the panic message is kept when it is a string
    #[error("Update check panicked: {0}")]
    Panicked(String),
}

impl From<LoaderError> for CheckError {
    fn from(err: LoaderError) -> Self {
        match err {
            LoaderError::Configuration(reason) => CheckError::Configuration(reason),
            other => CheckError::Transport(other),
        }
    }
}
