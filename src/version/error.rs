use thiserror::Error;

/// Failure to read a dotted-integer version identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Version string is empty")]
    Empty,

    #[error("Invalid version '{version}': component '{component}' is not a non-negative integer")]
    InvalidComponent { version: String, component: String },
}
