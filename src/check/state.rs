//! Lifecycle of a single check

use std::fmt;

use tokio::sync::watch;
use tracing::debug;

/// Stage of a running check
///
/// `Completed`, `Cancelled` and `Failed` are terminal; `Cancelled` and `Failed`
/// are reachable from every non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckState {
    Idle,
    Validating,
    Loading,
    Parsing,
    Deciding,
    Completed,
    Cancelled,
    Failed,
}

impl CheckState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CheckState::Completed | CheckState::Cancelled | CheckState::Failed
        )
    }

    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: CheckState) -> bool {
        use CheckState::*;

        match (self, next) {
            (from, _) if from.is_terminal() => false,
            (_, Cancelled | Failed) => true,
            (Idle, Validating)
            | (Validating, Loading)
            | (Loading, Parsing)
            | (Parsing, Deciding)
            | (Deciding, Completed) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckState::Idle => "idle",
            CheckState::Validating => "validating",
            CheckState::Loading => "loading",
            CheckState::Parsing => "parsing",
            CheckState::Deciding => "deciding",
            CheckState::Completed => "completed",
            CheckState::Cancelled => "cancelled",
            CheckState::Failed => "failed",
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publishes state transitions of one check to any number of observers
pub(crate) struct StateTracker {
    sender: watch::Sender<CheckState>,
}

impl StateTracker {
    pub(crate) fn new() -> (Self, watch::Receiver<CheckState>) {
        let (sender, receiver) = watch::channel(CheckState::Idle);
        (Self { sender }, receiver)
    }

    pub(crate) fn current(&self) -> CheckState {
        *self.sender.borrow()
    }

    pub(crate) fn advance(&self, next: CheckState) {
        let previous = self.sender.send_replace(next);
        debug_assert!(
            previous.can_transition_to(next),
            "invalid check state transition {previous} -> {next}"
        );
        debug!("Check state {} -> {}", previous, next);
    }
}
