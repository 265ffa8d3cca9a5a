//! Check orchestrator
//!
//! Runs loader -> parser -> decision engine as one cancellable unit of work and
//! reports exactly one [`CheckOutcome`]. Cancellation wins over any result that
//! completes after it was requested.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::check::decision::decide;
use crate::check::error::CheckError;
use crate::check::result::CheckResult;
use crate::check::state::{CheckState, StateTracker};
use crate::loader::traits::Loader;
use crate::parser::traits::PolicyParser;
use crate::version::Version;

/// Terminal outcome of a check
#[derive(Debug)]
pub enum CheckOutcome {
    Success(CheckResult),
    Failed(CheckError),
    Cancelled,
}

impl CheckOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CheckOutcome::Cancelled)
    }

    /// Hand the outcome to the matching callback method
    pub fn deliver<C: UpdateCallback>(self, callback: C) {
        match self {
            CheckOutcome::Success(result) => callback.on_success(result),
            CheckOutcome::Failed(error) => callback.on_error(error),
            CheckOutcome::Cancelled => callback.on_cancelled(),
        }
    }
}

/// Receiver of a check's single terminal notification
///
/// Every method consumes the callback, so at most one of them can ever run.
/// Any `FnOnce(CheckOutcome)` closure is a callback.
pub trait UpdateCallback: Send + 'static {
    fn on_success(self, result: CheckResult);
    fn on_error(self, error: CheckError);
    fn on_cancelled(self);
}

impl<F> UpdateCallback for F
where
    F: FnOnce(CheckOutcome) + Send + 'static,
{
    fn on_success(self, result: CheckResult) {
        self(CheckOutcome::Success(result))
    }

    fn on_error(self, error: CheckError) {
        self(CheckOutcome::Failed(error))
    }

    fn on_cancelled(self) {
        self(CheckOutcome::Cancelled)
    }
}

/// Handle to a check started with [`start`]
pub struct CheckHandle {
    cancel_token: CancellationToken,
    loader: Arc<dyn Loader>,
    state: watch::Receiver<CheckState>,
    task: JoinHandle<()>,
}

impl CheckHandle {
    /// Request cancellation; idempotent and never blocks
    ///
    /// Forwards to the loader so an in-flight transfer stops at its next
    /// checkpoint.
    pub fn cancel(&self) {
        if !self.cancel_token.is_cancelled() {
            debug!("Cancelling update check");
        }
        self.cancel_token.cancel();
        self.loader.cancel();
    }

    pub fn state(&self) -> CheckState {
        *self.state.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the callback has been invoked
    pub async fn wait(self) -> Result<(), JoinError> {
        self.task.await
    }
}

/// Start a check on the Tokio runtime
///
/// The callback receives exactly one notification from the worker task.
///
/// # Panics
/// Panics when called outside a Tokio runtime.
pub fn start<C>(
    current_version: &str,
    loader: Arc<dyn Loader>,
    parser: Arc<dyn PolicyParser>,
    callback: C,
) -> CheckHandle
where
    C: UpdateCallback,
{
    let cancel_token = CancellationToken::new();
    let (tracker, state) = StateTracker::new();
    let current_version = current_version.to_string();

    let task = tokio::spawn({
        let loader = Arc::clone(&loader);
        let cancel_token = cancel_token.clone();
        async move {
            let outcome = run_pipeline(
                &current_version,
                loader.as_ref(),
                parser.as_ref(),
                &cancel_token,
                &tracker,
            )
            .await;
            outcome.deliver(callback);
        }
    });

    CheckHandle {
        cancel_token,
        loader,
        state,
        task,
    }
}

/// Run a check to completion on the current task
///
/// Cancelling `cancel_token` stops the check at the next checkpoint and also
/// cancels the loader.
pub async fn run_check(
    current_version: &str,
    loader: &dyn Loader,
    parser: &dyn PolicyParser,
    cancel_token: &CancellationToken,
) -> CheckOutcome {
    let (tracker, _) = StateTracker::new();
    run_pipeline(current_version, loader, parser, cancel_token, &tracker).await
}

/// Why the pipeline stopped before producing a result
enum Interrupt {
    Cancelled,
    Failed(CheckError),
}

impl From<CheckError> for Interrupt {
    fn from(err: CheckError) -> Self {
        Interrupt::Failed(err)
    }
}

async fn run_pipeline(
    current_version: &str,
    loader: &dyn Loader,
    parser: &dyn PolicyParser,
    cancel_token: &CancellationToken,
    tracker: &StateTracker,
) -> CheckOutcome {
    // A panicking collaborator still ends in exactly one notification
    let executed = AssertUnwindSafe(execute(
        current_version,
        loader,
        parser,
        cancel_token,
        tracker,
    ))
    .catch_unwind()
    .await
    .unwrap_or_else(|payload| Err(CheckError::Panicked(panic_message(&*payload)).into()));
    let stage = tracker.current();

    let outcome = match executed {
        // A result computed after cancellation was requested is discarded
        Ok(_) if is_cancelled(cancel_token, loader) => CheckOutcome::Cancelled,
        Ok(result) => CheckOutcome::Success(result),
        Err(Interrupt::Cancelled) => CheckOutcome::Cancelled,
        Err(Interrupt::Failed(error)) => CheckOutcome::Failed(error),
    };

    match &outcome {
        CheckOutcome::Success(result) => {
            tracker.advance(CheckState::Completed);
            info!(
                "Update check completed: current={}, status={}, update_version={}",
                current_version,
                result.status(),
                result.update_version()
            );
        }
        CheckOutcome::Failed(error) => {
            tracker.advance(CheckState::Failed);
            warn!("Update check failed in {} stage: {}", stage, error);
        }
        CheckOutcome::Cancelled => {
            tracker.advance(CheckState::Cancelled);
            info!("Update check cancelled");
        }
    }

    outcome
}

async fn execute(
    current_version: &str,
    loader: &dyn Loader,
    parser: &dyn PolicyParser,
    cancel_token: &CancellationToken,
    tracker: &StateTracker,
) -> Result<CheckResult, Interrupt> {
    tracker.advance(CheckState::Validating);
    checkpoint(cancel_token, loader)?;
    let current = current_version
        .parse::<Version>()
        .map_err(CheckError::from)?;
    loader.validate().map_err(CheckError::from)?;
    checkpoint(cancel_token, loader)?;

    tracker.advance(CheckState::Loading);
    let loaded = tokio::select! {
        biased;
        _ = cancel_token.cancelled() => {
            // Dropping the load future releases the underlying connection
            loader.cancel();
            return Err(Interrupt::Cancelled);
        }
        loaded = loader.load() => loaded,
    };
    let content = match loaded {
        Ok(content) => content,
        Err(err) if err.is_cancelled() => return Err(Interrupt::Cancelled),
        Err(err) => return Err(CheckError::from(err).into()),
    };
    // Never parse what a cancelled load produced
    checkpoint(cancel_token, loader)?;

    tracker.advance(CheckState::Parsing);
    let policy = parser.parse(&content).map_err(CheckError::from)?;

    tracker.advance(CheckState::Deciding);
    Ok(decide(&current, &policy))
}

fn is_cancelled(cancel_token: &CancellationToken, loader: &dyn Loader) -> bool {
    cancel_token.is_cancelled() || loader.is_cancelled()
}

fn checkpoint(cancel_token: &CancellationToken, loader: &dyn Loader) -> Result<(), Interrupt> {
    if is_cancelled(cancel_token, loader) {
        Err(Interrupt::Cancelled)
    } else {
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
