//! Update determination
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Loader    │────▶│   Parser    │────▶│  Decision   │
//! │  (fetch)    │     │  (policy)   │     │  (status)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        ▲                                       │
//!        │ cancel                                ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │ Orchestrator│◀────────────────────────│ CheckResult │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! - [`decision`]: pure mapping of current version and policy to a result
//! - [`orchestrator`]: cancellable pipeline with exactly-once delivery
//! - [`result`]: [`CheckResult`] and [`UpdateStatus`]
//! - [`state`]: [`CheckState`] lifecycle
//! - [`error`]: [`CheckError`]

pub mod decision;
pub mod error;
pub mod orchestrator;
pub mod result;
pub mod state;

pub use decision::decide;
pub use error::CheckError;
pub use orchestrator::{CheckHandle, CheckOutcome, UpdateCallback, run_check, start};
pub use result::{CheckResult, UpdateStatus};
pub use state::CheckState;
