//! Version identifiers and their ordering
//!
//! - [`comparator`]: dotted-integer [`Version`] with a total order
//! - [`error`]: [`VersionError`] for tokens that cannot be ordered

pub mod comparator;
pub mod error;

pub use comparator::{Version, compare_versions};
pub use error::VersionError;
