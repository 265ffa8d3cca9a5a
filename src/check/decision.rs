//! Decision engine: current version + policy -> check result

use crate::check::result::CheckResult;
use crate::parser::types::UpdatePolicy;
use crate::version::Version;

/// Decide the update state of `current` under `policy`
///
/// The mandatory floor is evaluated first, then the latest version. Metadata is
/// forwarded untouched whichever branch applies.
pub fn decide(current: &Version, policy: &UpdatePolicy) -> CheckResult {
    let latest = policy.latest_available_version.clone();
    let metadata = policy.metadata.clone();

    match &policy.minimum_required_version {
        Some(minimum) if current < minimum => CheckResult::mandatory_update(latest, metadata),
        _ if *current < latest => {
            CheckResult::optional_update(latest, policy.notification_type, metadata)
        }
        _ => CheckResult::no_update(latest, metadata),
    }
}
