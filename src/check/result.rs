//! Outcome of a completed update check

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::parser::types::NotificationType;
use crate::version::Version;

/// Update state of the installed version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateStatus {
    NoUpdate,
    Optional,
    Mandatory,
}

impl UpdateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateStatus::NoUpdate => "NO_UPDATE",
            UpdateStatus::Optional => "OPTIONAL",
            UpdateStatus::Mandatory => "MANDATORY",
        }
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable decision produced by a check
///
/// Only the named constructors build a result, so a notification type is
/// present exactly when the status is [`UpdateStatus::Optional`]. Equality and
/// hashing cover every field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CheckResult {
    status: UpdateStatus,
    update_version: Version,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_type: Option<NotificationType>,
    metadata: BTreeMap<String, String>,
}

impl CheckResult {
    pub fn mandatory_update(version: Version, metadata: BTreeMap<String, String>) -> Self {
        Self {
            status: UpdateStatus::Mandatory,
            update_version: version,
            notification_type: None,
            metadata,
        }
    }

    pub fn optional_update(
        version: Version,
        notification_type: NotificationType,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        Self {
            status: UpdateStatus::Optional,
            update_version: version,
            notification_type: Some(notification_type),
            metadata,
        }
    }

    pub fn no_update(version: Version, metadata: BTreeMap<String, String>) -> Self {
        Self {
            status: UpdateStatus::NoUpdate,
            update_version: version,
            notification_type: None,
            metadata,
        }
    }

    pub fn status(&self) -> UpdateStatus {
        self.status
    }

    /// The latest version the policy recommends
    pub fn update_version(&self) -> &Version {
        &self.update_version
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn has_update(&self) -> bool {
        matches!(self.status, UpdateStatus::Mandatory | UpdateStatus::Optional)
    }

    /// Whether an available update may be skipped
    ///
    /// # Panics
    /// Panics for [`UpdateStatus::NoUpdate`]: with no update there is nothing to
    /// be optional about. Check [`has_update`](Self::has_update) first.
    pub fn is_optional(&self) -> bool {
        match self.status {
            UpdateStatus::Optional => true,
            UpdateStatus::Mandatory => false,
            UpdateStatus::NoUpdate => {
                panic!("is_optional is only defined when an update is available")
            }
        }
    }

    /// Notification cadence of an optional update
    ///
    /// # Panics
    /// Panics when the status is not [`UpdateStatus::Optional`]; asking for a
    /// cadence of a mandatory update or of no update is a caller bug.
    pub fn notification_type(&self) -> NotificationType {
        match self.notification_type {
            Some(notification_type) => notification_type,
            None => panic!(
                "notification type is only defined for optional updates (status is {})",
                self.status
            ),
        }
    }

    /// Notification cadence, or `None` unless the update is optional
    pub fn try_notification_type(&self) -> Option<NotificationType> {
        self.notification_type
    }
}
