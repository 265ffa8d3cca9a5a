//! Transport layer for fetching raw policy documents
//!
//! - [`traits`]: the cancellable [`Loader`] contract
//! - [`network`]: HTTP(S) with optional basic auth
//! - [`file`]: bundled resource on disk
//! - [`memory`]: document embedded in the binary
//! - [`error`]: [`LoaderError`]

pub mod error;
pub mod file;
pub mod memory;
pub mod network;
mod stream;
pub mod traits;

pub use error::LoaderError;
pub use file::FileLoader;
pub use memory::StaticLoader;
pub use network::{Credentials, NetworkLoader};
pub use traits::Loader;
