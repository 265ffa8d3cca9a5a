//! Shared test utilities

pub mod collaborators;

pub use collaborators::{Delivery, PanickingParser, RecordingCallback, SpyParser};
