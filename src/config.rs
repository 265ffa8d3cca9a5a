use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::loader::error::LoaderError;
use crate::loader::file::FileLoader;
use crate::loader::network::NetworkLoader;
use crate::loader::traits::Loader;
use crate::parser::json::JsonPolicyParser;

// =============================================================================
// Transport constants
// =============================================================================

/// Default network timeout in seconds (connect and read)
pub const DEFAULT_NETWORK_TIMEOUT_SECS: u64 = 60;

/// Size of each body read; cancellation is checked between reads (8 KiB)
pub const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Checker configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckerConfig {
    pub source: SourceConfig,
    pub document: DocumentConfig,
}

/// Where the policy document comes from; exactly one of `url` and `file`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceConfig {
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    /// Network timeout in seconds
    pub timeout_secs: u64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            file: None,
            timeout_secs: DEFAULT_NETWORK_TIMEOUT_SECS,
            username: None,
            password: None,
        }
    }
}

/// How the policy document is read
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DocumentConfig {
    /// Top-level section holding the version fields, e.g. "android"
    pub section: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CheckerConfig {
    /// Load configuration from a JSON file; missing fields use defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the transport described by the `source` section
    pub fn build_loader(&self) -> Result<Arc<dyn Loader>, LoaderError> {
        let source = &self.source;
        match (&source.url, &source.file) {
            (Some(_), Some(_)) => Err(LoaderError::Configuration(
                "Both url and file are set; choose one policy source".to_string(),
            )),
            (None, None) => Err(LoaderError::Configuration(
                "No policy source configured; set url or file".to_string(),
            )),
            (None, Some(file)) => Ok(Arc::new(FileLoader::new(file.clone()))),
            (Some(url), None) => {
                let loader =
                    NetworkLoader::new(url).with_timeout(Duration::from_secs(source.timeout_secs));
                let loader = match (&source.username, &source.password) {
                    (Some(username), Some(password)) => loader.with_basic_auth(username, password),
                    (None, None) => loader,
                    _ => {
                        return Err(LoaderError::Configuration(
                            "Basic auth needs both username and password".to_string(),
                        ));
                    }
                };
                Ok(Arc::new(loader))
            }
        }
    }

    /// Build the document parser described by the `document` section
    pub fn build_parser(&self) -> JsonPolicyParser {
        match &self.document.section {
            Some(section) => JsonPolicyParser::with_section(section),
            None => JsonPolicyParser::new(),
        }
    }
}

/// Returns the path to the data directory for version-gate.
/// Uses $XDG_DATA_HOME/version-gate if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/version-gate,
/// or ./version-gate if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("version-gate.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("version-gate")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn checker_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<CheckerConfig>(json!({
            "source": {
                "url": "https://example.com/policy.json"
            }
        }))
        .unwrap();

        assert_eq!(
            result.source.url.as_deref(),
            Some("https://example.com/policy.json")
        );
        assert_eq!(result.source.timeout_secs, DEFAULT_NETWORK_TIMEOUT_SECS);
        assert_eq!(result.document, DocumentConfig::default());
    }

    #[test]
    fn checker_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<CheckerConfig>(json!({
            "source": {
                "url": "https://example.com/policy.json",
                "timeoutSecs": 5,
                "username": "user",
                "password": "pass"
            },
            "document": {
                "section": "android"
            }
        }))
        .unwrap();

        assert_eq!(
            result,
            CheckerConfig {
                source: SourceConfig {
                    url: Some("https://example.com/policy.json".to_string()),
                    file: None,
                    timeout_secs: 5,
                    username: Some("user".to_string()),
                    password: Some("pass".to_string()),
                },
                document: DocumentConfig {
                    section: Some("android".to_string()),
                },
            }
        );
    }

    #[test]
    fn from_file_reads_json_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"source": {{"file": "policy.json"}}}}"#).unwrap();

        let config = CheckerConfig::from_file(file.path()).unwrap();

        assert_eq!(config.source.file, Some(PathBuf::from("policy.json")));
    }

    #[test]
    fn from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = CheckerConfig::from_file(file.path());

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[rstest]
    #[case::no_source(json!({}))]
    #[case::both_sources(json!({"source": {"url": "https://example.com", "file": "p.json"}}))]
    #[case::username_only(json!({"source": {"url": "https://example.com", "username": "u"}}))]
    #[case::password_only(json!({"source": {"url": "https://example.com", "password": "p"}}))]
    fn build_loader_rejects_ambiguous_sources(#[case] value: serde_json::Value) {
        let config = serde_json::from_value::<CheckerConfig>(value).unwrap();

        assert!(matches!(
            config.build_loader(),
            Err(LoaderError::Configuration(_))
        ));
    }

    #[rstest]
    #[case::url(json!({"source": {"url": "https://example.com/p.json"}}))]
    #[case::url_with_auth(json!({
        "source": {"url": "https://example.com/p.json", "username": "u", "password": "p"}
    }))]
    #[case::file(json!({"source": {"file": "p.json"}}))]
    fn build_loader_returns_valid_loader(#[case] value: serde_json::Value) {
        let config = serde_json::from_value::<CheckerConfig>(value).unwrap();

        let loader = config.build_loader().unwrap();

        assert!(loader.validate().is_ok());
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/version-gate"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.local/share/version-gate"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./version-gate"));
    }
}
