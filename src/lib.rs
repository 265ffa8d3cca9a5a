//! Update-policy checking for client applications
//!
//! Given the installed version and a remotely hosted policy document, decides
//! whether the application has no update, an optional update, or a mandatory one.
//!
//! # Layers
//!
//! - [`loader`]: cancellable transports that fetch the raw document
//! - [`parser`]: turns the raw document into an [`parser::UpdatePolicy`]
//! - [`version`]: dotted-integer version ordering
//! - [`check`]: decision engine and the cancellable check orchestrator
//! - [`config`]: configuration file and default paths

pub mod check;
pub mod config;
pub mod loader;
pub mod parser;
pub mod version;
