use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    /// The loader is misconfigured; raised before any I/O
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Cancellation was observed while loading
    #[error("Loading was cancelled")]
    Cancelled,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::string::FromUtf8Error),
}

impl LoaderError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoaderError::Cancelled)
    }
}
