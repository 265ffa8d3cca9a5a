//! In-memory transport for documents embedded in the application

use tokio_util::sync::CancellationToken;

use crate::loader::error::LoaderError;
use crate::loader::traits::Loader;

/// Loader that serves a document already held in memory, e.g. via `include_str!`
pub struct StaticLoader {
    content: String,
    cancel_token: CancellationToken,
}

impl StaticLoader {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            cancel_token: CancellationToken::new(),
        }
    }
}

#[async_trait::async_trait]
impl Loader for StaticLoader {
    fn validate(&self) -> Result<(), LoaderError> {
        Ok(())
    }

    async fn load(&self) -> Result<String, LoaderError> {
        if self.is_cancelled() {
            return Err(LoaderError::Cancelled);
        }
        Ok(self.content.clone())
    }

    fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_returns_content_until_cancelled() {
        let loader = StaticLoader::new("{}");
        assert_eq!(loader.load().await.unwrap(), "{}");

        loader.cancel();
        assert!(loader.is_cancelled());
        assert!(matches!(loader.load().await, Err(LoaderError::Cancelled)));
    }
}
