//! HTTP(S) transport for policy documents

use std::time::Duration;

use futures::TryStreamExt;
use reqwest::Url;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::DEFAULT_NETWORK_TIMEOUT_SECS;
use crate::loader::error::LoaderError;
use crate::loader::stream::read_to_string_cancellable;
use crate::loader::traits::Loader;

/// Basic authentication credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Loader that fetches the policy document with an HTTP GET
pub struct NetworkLoader {
    url: String,
    timeout: Duration,
    credentials: Option<Credentials>,
    cancel_token: CancellationToken,
}

impl NetworkLoader {
    /// Creates a loader for the given URL with the default timeout
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            timeout: Duration::from_secs(DEFAULT_NETWORK_TIMEOUT_SECS),
            credentials: None,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends an `Authorization: Basic` header with every request
    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_client(&self) -> Result<reqwest::Client, LoaderError> {
        Ok(reqwest::Client::builder()
            .user_agent("version-gate")
            .connect_timeout(self.timeout)
            .read_timeout(self.timeout)
            .build()?)
    }
}

#[async_trait::async_trait]
impl Loader for NetworkLoader {
    fn validate(&self) -> Result<(), LoaderError> {
        if self.url.trim().is_empty() {
            return Err(LoaderError::Configuration("URL is not set".to_string()));
        }

        let url = Url::parse(&self.url).map_err(|e| {
            LoaderError::Configuration(format!("Invalid URL '{}': {}", self.url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(LoaderError::Configuration(format!(
                "Unsupported URL scheme '{}'",
                url.scheme()
            )));
        }

        if self.timeout.is_zero() {
            return Err(LoaderError::Configuration(
                "Network timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    async fn load(&self) -> Result<String, LoaderError> {
        if self.is_cancelled() {
            return Err(LoaderError::Cancelled);
        }

        let client = self.build_client()?;
        let mut request = client.get(&self.url);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        debug!("Fetching policy document from {}", self.url);
        let response = tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => return Err(LoaderError::Cancelled),
            response = request.send() => response?,
        };

        // Headers are in; skip the body transfer entirely if cancelled by now
        if self.is_cancelled() {
            debug!("Cancelled before reading body from {}", self.url);
            return Err(LoaderError::Cancelled);
        }

        let status = response.status();
        if !status.is_success() {
            warn!("Policy endpoint returned status {}: {}", status, self.url);
            return Err(LoaderError::HttpStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = StreamReader::new(response.bytes_stream().map_err(std::io::Error::other));
        tokio::pin!(body);
        read_to_string_cancellable(body, &self.cancel_token).await
    }

    fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }
}
