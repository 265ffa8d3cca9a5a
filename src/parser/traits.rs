//! Policy parser trait definition

#[cfg(test)]
use mockall::automock;

use crate::parser::types::UpdatePolicy;
use crate::version::error::VersionError;

/// Trait for decoding a raw policy document
///
/// Parsing is pure: implementations never perform I/O and never block.
#[cfg_attr(test, automock)]
pub trait PolicyParser: Send + Sync {
    /// Parse the content into an update policy
    fn parse(&self, content: &str) -> Result<UpdatePolicy, ParseError>;
}

/// The document could not be decoded into a well-formed policy
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The content is not valid for the document format
    #[error("Invalid document syntax: {0}")]
    Syntax(#[from] serde_json::Error),

    /// A required part of the document is missing or has the wrong shape
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// A version token could not be read
    #[error("Invalid {field}: {source}")]
    InvalidVersion {
        field: &'static str,
        #[source]
        source: VersionError,
    },

    /// The notification mode is neither ONCE nor ALWAYS
    #[error("Invalid notification type: {0}")]
    InvalidNotificationType(String),

    /// The mandatory floor lies above the latest available version
    #[error("Minimum version {minimum} is greater than latest version {latest}")]
    MinimumAboveLatest { minimum: String, latest: String },
}
