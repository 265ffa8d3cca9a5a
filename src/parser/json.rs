//! JSON policy document parser
//!
//! ```json
//! {
//!   "minimum_version": "1.1.0",
//!   "latest_version": { "version": "2.0.0", "notification_type": "ALWAYS" },
//!   "meta": { "key": "value" }
//! }
//! ```
//!
//! `latest_version` may also be a plain version string. Documents serving several
//! platforms nest the version fields under a named section and are read with
//! [`JsonPolicyParser::with_section`].

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::parser::traits::{ParseError, PolicyParser};
use crate::parser::types::{NotificationType, UpdatePolicy};
use crate::version::Version;

const META_KEY: &str = "meta";

#[derive(Debug, Deserialize)]
struct PolicyDocument {
    #[serde(default)]
    minimum_version: Option<String>,
    latest_version: LatestVersion,
    #[serde(default)]
    meta: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LatestVersion {
    Plain(String),
    Detailed {
        version: String,
        #[serde(default)]
        notification_type: Option<String>,
    },
}

/// Parser for JSON policy documents
#[derive(Debug, Clone, Default)]
pub struct JsonPolicyParser {
    section: Option<String>,
}

impl JsonPolicyParser {
    /// Reads the version fields from the document root
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the version fields from the named top-level section
    ///
    /// The root `meta` object still applies; keys in the section's own `meta`
    /// take precedence.
    pub fn with_section(section: &str) -> Self {
        Self {
            section: Some(section.to_string()),
        }
    }

    /// Split the root into the policy document and the metadata inherited from the root
    fn select_document(
        &self,
        mut root: Map<String, Value>,
    ) -> Result<(PolicyDocument, BTreeMap<String, String>), ParseError> {
        let Some(section) = &self.section else {
            return Ok((serde_json::from_value(Value::Object(root))?, BTreeMap::new()));
        };

        let inherited = match root.remove(META_KEY) {
            None => BTreeMap::new(),
            Some(Value::Object(meta)) => convert_metadata(meta)?,
            Some(_) => {
                return Err(ParseError::Malformed(format!(
                    "'{META_KEY}' must be an object"
                )));
            }
        };

        match root.remove(section) {
            Some(value @ Value::Object(_)) => Ok((serde_json::from_value(value)?, inherited)),
            Some(_) => Err(ParseError::Malformed(format!(
                "section '{section}' must be an object"
            ))),
            None => Err(ParseError::Malformed(format!(
                "section '{section}' not found"
            ))),
        }
    }
}

impl PolicyParser for JsonPolicyParser {
    fn parse(&self, content: &str) -> Result<UpdatePolicy, ParseError> {
        let Value::Object(root) = serde_json::from_str::<Value>(content)? else {
            return Err(ParseError::Malformed(
                "document root must be an object".to_string(),
            ));
        };

        let (document, mut metadata) = self.select_document(root)?;
        metadata.extend(convert_metadata(document.meta)?);

        let (latest, notification_type) = match document.latest_version {
            LatestVersion::Plain(version) => (version, None),
            LatestVersion::Detailed {
                version,
                notification_type,
            } => (version, notification_type),
        };

        let latest_available_version = parse_version_field("latest_version", &latest)?;
        let minimum_required_version = document
            .minimum_version
            .as_deref()
            .map(|minimum| parse_version_field("minimum_version", minimum))
            .transpose()?;
        let notification_type = notification_type
            .as_deref()
            .map(str::parse::<NotificationType>)
            .transpose()?
            .unwrap_or_default();

        let policy = UpdatePolicy {
            minimum_required_version,
            latest_available_version,
            notification_type,
            metadata,
        };
        policy.validate()?;

        debug!(
            "Parsed policy: minimum={:?}, latest={}, notification={}, {} metadata entries",
            policy.minimum_required_version.as_ref().map(ToString::to_string),
            policy.latest_available_version,
            policy.notification_type,
            policy.metadata.len()
        );

        Ok(policy)
    }
}

fn parse_version_field(field: &'static str, value: &str) -> Result<Version, ParseError> {
    value
        .parse()
        .map_err(|source| ParseError::InvalidVersion { field, source })
}

/// Flatten scalar metadata values to strings; `null` entries are dropped
fn convert_metadata(meta: Map<String, Value>) -> Result<BTreeMap<String, String>, ParseError> {
    let mut metadata = BTreeMap::new();
    for (key, value) in meta {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(ParseError::Malformed(format!(
                    "metadata value for '{key}' must be a string, number or boolean"
                )));
            }
        };
        metadata.insert(key, value);
    }
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn parse_reads_full_document() {
        let content = r#"{
            "minimum_version": "1.1.0",
            "latest_version": { "version": "2.0.0", "notification_type": "ALWAYS" },
            "meta": { "title": "New release", "build": 42, "beta": false }
        }"#;

        let policy = JsonPolicyParser::new().parse(content).unwrap();

        assert_eq!(
            policy,
            UpdatePolicy {
                minimum_required_version: Some(v("1.1.0")),
                latest_available_version: v("2.0.0"),
                notification_type: NotificationType::Always,
                metadata: BTreeMap::from([
                    ("beta".to_string(), "false".to_string()),
                    ("build".to_string(), "42".to_string()),
                    ("title".to_string(), "New release".to_string()),
                ]),
            }
        );
    }

    #[test]
    fn parse_accepts_plain_latest_version_with_defaults() {
        let policy = JsonPolicyParser::new()
            .parse(r#"{ "latest_version": "1.3.0" }"#)
            .unwrap();

        assert_eq!(policy.minimum_required_version, None);
        assert_eq!(policy.latest_available_version, v("1.3.0"));
        assert_eq!(policy.notification_type, NotificationType::Once);
        assert!(policy.metadata.is_empty());
    }

    #[test]
    fn parse_drops_null_metadata_and_null_minimum() {
        let document = r#"{
            "minimum_version": null,
            "latest_version": "1.0",
            "meta": { "a": null, "b": "x" }
        }"#;
        let policy = JsonPolicyParser::new().parse(document).unwrap();

        assert_eq!(policy.minimum_required_version, None);
        assert_eq!(
            policy.metadata,
            BTreeMap::from([("b".to_string(), "x".to_string())])
        );
    }

    #[test]
    fn parse_section_overlays_section_meta_on_root_meta() {
        let content = r#"{
            "ios": { "latest_version": "9.0.0" },
            "android": {
                "minimum_version": "1.0.0",
                "latest_version": { "version": "1.4.0", "notification_type": "once" },
                "meta": { "channel": "play", "shared": "android" }
            },
            "meta": { "shared": "root", "support": "help@example.com" }
        }"#;

        let policy = JsonPolicyParser::with_section("android")
            .parse(content)
            .unwrap();

        assert_eq!(policy.minimum_required_version, Some(v("1.0.0")));
        assert_eq!(policy.latest_available_version, v("1.4.0"));
        assert_eq!(
            policy.metadata,
            BTreeMap::from([
                ("channel".to_string(), "play".to_string()),
                ("shared".to_string(), "android".to_string()),
                ("support".to_string(), "help@example.com".to_string()),
            ])
        );
    }

    #[rstest]
    #[case::invalid_json("{ not json")]
    #[case::array_root(r#"["1.0.0"]"#)]
    #[case::missing_latest(r#"{ "minimum_version": "1.0.0" }"#)]
    #[case::unparsable_latest(r#"{ "latest_version": "1.x" }"#)]
    #[case::empty_minimum(r#"{ "minimum_version": "", "latest_version": "1.0" }"#)]
    #[case::unknown_notification(
        r#"{ "latest_version": { "version": "1.0", "notification_type": "DAILY" } }"#
    )]
    #[case::minimum_above_latest(r#"{ "minimum_version": "2.1", "latest_version": "2.0.9" }"#)]
    #[case::nested_metadata(r#"{ "latest_version": "1.0", "meta": { "k": { "nested": true } } }"#)]
    #[case::numeric_latest(r#"{ "latest_version": 2 }"#)]
    fn parse_rejects_malformed_documents(#[case] content: &str) {
        assert!(JsonPolicyParser::new().parse(content).is_err());
    }

    #[test]
    fn parse_reports_which_version_field_is_invalid() {
        let err = JsonPolicyParser::new()
            .parse(r#"{ "minimum_version": "one", "latest_version": "1.0" }"#)
            .unwrap_err();

        assert!(matches!(
            err,
            ParseError::InvalidVersion {
                field: "minimum_version",
                ..
            }
        ));
    }

    #[test]
    fn parse_rejects_missing_section() {
        let err = JsonPolicyParser::with_section("android")
            .parse(r#"{ "ios": { "latest_version": "1.0" } }"#)
            .unwrap_err();

        assert!(matches!(err, ParseError::Malformed(msg) if msg.contains("android")));
    }
}
