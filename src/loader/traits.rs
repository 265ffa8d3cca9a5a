//! Loader trait for fetching raw policy documents

use tokio_util::sync::CancellationToken;

use crate::loader::error::LoaderError;

/// Trait for transports that fetch the raw policy document
///
/// Every transport owns a cancellation token. `cancel` may be called from any
/// thread at any time; `load` observes it before starting I/O, once the
/// resource is open, and between body chunks.
#[async_trait::async_trait]
pub trait Loader: Send + Sync {
    /// Checks the loader configuration without performing I/O
    fn validate(&self) -> Result<(), LoaderError>;

    /// Fetches the document content
    ///
    /// # Returns
    /// * `Ok(String)` - The complete document
    /// * `Err(LoaderError::Cancelled)` - If cancellation was observed
    /// * `Err(LoaderError)` - If the transport failed
    async fn load(&self) -> Result<String, LoaderError>;

    /// Token backing this loader's cancellation flag
    fn cancel_token(&self) -> &CancellationToken;

    /// Requests cancellation; idempotent and never blocks
    fn cancel(&self) {
        self.cancel_token().cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_token().is_cancelled()
    }
}
