//! Policy document types

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::parser::traits::ParseError;
use crate::version::Version;

/// How often an optional update should be surfaced to the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// Notify once per update version
    #[default]
    Once,
    /// Notify on every check
    Always,
}

impl NotificationType {
    /// Returns the document token for this notification type
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Once => "ONCE",
            NotificationType::Always => "ALWAYS",
        }
    }
}

impl FromStr for NotificationType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("once") {
            Ok(NotificationType::Once)
        } else if s.eq_ignore_ascii_case("always") {
            Ok(NotificationType::Always)
        } else {
            Err(ParseError::InvalidNotificationType(s.to_string()))
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed update policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePolicy {
    /// Versions below this must update; `None` means there is no floor
    pub minimum_required_version: Option<Version>,
    /// Newest version the policy recommends
    pub latest_available_version: Version,
    /// Cadence for optional update notifications
    pub notification_type: NotificationType,
    /// Opaque key/value payload forwarded to the check result
    pub metadata: BTreeMap<String, String>,
}

impl UpdatePolicy {
    /// Creates a policy with only a latest version, no floor and no metadata
    pub fn new(latest_available_version: Version) -> Self {
        Self {
            minimum_required_version: None,
            latest_available_version,
            notification_type: NotificationType::default(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_minimum(mut self, minimum: Version) -> Self {
        self.minimum_required_version = Some(minimum);
        self
    }

    pub fn with_notification_type(mut self, notification_type: NotificationType) -> Self {
        self.notification_type = notification_type;
        self
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Checks that the minimum version, when present, does not exceed the latest
    pub fn validate(&self) -> Result<(), ParseError> {
        match &self.minimum_required_version {
            Some(minimum) if *minimum > self.latest_available_version => {
                Err(ParseError::MinimumAboveLatest {
                    minimum: minimum.to_string(),
                    latest: self.latest_available_version.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[rstest]
    #[case("ONCE", NotificationType::Once)]
    #[case("once", NotificationType::Once)]
    #[case("ALWAYS", NotificationType::Always)]
    #[case("Always", NotificationType::Always)]
    fn notification_type_from_str_is_case_insensitive(
        #[case] input: &str,
        #[case] expected: NotificationType,
    ) {
        assert_eq!(input.parse::<NotificationType>().unwrap(), expected);
    }

    #[test]
    fn notification_type_from_str_rejects_unknown_token() {
        let err = "SOMETIMES".parse::<NotificationType>().unwrap_err();
        assert!(matches!(err, ParseError::InvalidNotificationType(token) if token == "SOMETIMES"));
    }

    #[rstest]
    #[case(None, "2.0.0", true)]
    #[case(Some("1.0.0"), "2.0.0", true)]
    #[case(Some("2.0"), "2.0.0", true)]
    #[case(Some("2.0.1"), "2.0.0", false)]
    fn validate_checks_minimum_against_latest(
        #[case] minimum: Option<&str>,
        #[case] latest: &str,
        #[case] valid: bool,
    ) {
        let mut policy = UpdatePolicy::new(v(latest));
        if let Some(minimum) = minimum {
            policy = policy.with_minimum(v(minimum));
        }

        assert_eq!(policy.validate().is_ok(), valid);
    }
}
