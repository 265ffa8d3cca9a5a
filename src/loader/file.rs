//! Bundled-resource transport reading the policy document from disk

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::loader::error::LoaderError;
use crate::loader::stream::read_to_string_cancellable;
use crate::loader::traits::Loader;

/// Loader that reads the policy document from a local file
pub struct FileLoader {
    path: PathBuf,
    cancel_token: CancellationToken,
}

impl FileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl Loader for FileLoader {
    fn validate(&self) -> Result<(), LoaderError> {
        if self.path.as_os_str().is_empty() {
            return Err(LoaderError::Configuration(
                "Resource path is not set".to_string(),
            ));
        }
        Ok(())
    }

    async fn load(&self) -> Result<String, LoaderError> {
        if self.is_cancelled() {
            return Err(LoaderError::Cancelled);
        }

        debug!("Reading policy document from {:?}", self.path);
        let file = tokio::fs::File::open(&self.path).await?;

        if self.is_cancelled() {
            debug!("Cancelled before reading {:?}", self.path);
            return Err(LoaderError::Cancelled);
        }

        read_to_string_cancellable(file, &self.cancel_token).await
    }

    fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }
}
