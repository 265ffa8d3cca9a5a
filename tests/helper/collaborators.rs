//! Spy collaborators for orchestrator tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;

use version_gate::check::{CheckError, CheckResult, UpdateCallback};
use version_gate::parser::{JsonPolicyParser, ParseError, PolicyParser, UpdatePolicy};

/// JSON parser that counts how often it was asked to parse
#[derive(Clone, Default)]
pub struct SpyParser {
    inner: JsonPolicyParser,
    calls: Arc<AtomicUsize>,
}

impl SpyParser {
    pub fn new(inner: JsonPolicyParser) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PolicyParser for SpyParser {
    fn parse(&self, content: &str) -> Result<UpdatePolicy, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.parse(content)
    }
}

/// Parser that panics on every document
pub struct PanickingParser;

impl PolicyParser for PanickingParser {
    fn parse(&self, _content: &str) -> Result<UpdatePolicy, ParseError> {
        panic!("policy parser crashed");
    }
}

/// What a callback was told
#[derive(Debug)]
pub enum Delivery {
    Success(CheckResult),
    Error(CheckError),
    Cancelled,
}

/// Callback forwarding every notification to a channel
pub struct RecordingCallback {
    sender: mpsc::UnboundedSender<Delivery>,
}

impl RecordingCallback {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl UpdateCallback for RecordingCallback {
    fn on_success(self, result: CheckResult) {
        let _ = self.sender.send(Delivery::Success(result));
    }

    fn on_error(self, error: CheckError) {
        let _ = self.sender.send(Delivery::Error(error));
    }

    fn on_cancelled(self) {
        let _ = self.sender.send(Delivery::Cancelled);
    }
}
