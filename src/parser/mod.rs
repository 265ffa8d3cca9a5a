//! Parser layer
//! - traits.rs: PolicyParser trait and ParseError
//! - types.rs: UpdatePolicy and NotificationType
//! - json.rs: JSON policy document parser

pub mod json;
pub mod traits;
pub mod types;

pub use json::JsonPolicyParser;
pub use traits::{ParseError, PolicyParser};
pub use types::{NotificationType, UpdatePolicy};
