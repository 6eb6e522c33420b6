//! The observable "latest result" cell.
//!
//! One writer side ([`StateCell`]) and any number of readers ([`StateStream`]), backed by a
//! `tokio::sync::watch` channel. Readers always see the most recent value; intermediate values
//! may be skipped if a reader falls behind, which is fine for re-rendering.

use tokio::sync::watch;

use crate::model::WeatherReport;

/// Outcome of the most recent weather request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultState {
    /// No request has been made yet.
    #[default]
    Idle,
    Loading,
    Success(WeatherReport),
    Error(String),
}

impl ResultState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResultState::Success(_) | ResultState::Error(_))
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            ResultState::Success(report) => Some(report),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ResultState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResultState::Idle => "idle",
            ResultState::Loading => "loading",
            ResultState::Success(_) => "success",
            ResultState::Error(_) => "error",
        }
    }

    /// `Idle|Success|Error -> Loading -> Success|Error`, plus a direct jump to `Error`
    /// when a request fails before the weather call is issued. Nothing leads back to `Idle`.
    pub fn can_transition_to(&self, next: &ResultState) -> bool {
        use ResultState::*;

        match (self, next) {
            (_, Idle) => false,
            (Loading, Loading) => false,
            (_, Loading) => true,
            (Loading, Success(_)) | (Loading, Error(_)) => true,
            (Idle, Error(_)) | (Success(_), Error(_)) | (Error(_), Error(_)) => true,
            _ => false,
        }
    }
}

/// Writer side of the result cell.
#[derive(Debug)]
pub struct StateCell {
    tx: watch::Sender<ResultState>,
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCell {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ResultState::Idle);
        Self { tx }
    }

    /// Replace the current value and wake every subscriber.
    ///
    /// Unexpected transitions are logged, never rejected: concurrent flows race and the last
    /// write wins.
    pub fn set(&self, next: ResultState) {
        self.tx.send_modify(|current| {
            if !current.can_transition_to(&next) {
                tracing::warn!(
                    from = current.name(),
                    to = next.name(),
                    "unexpected result state transition"
                );
            }
            tracing::debug!(from = current.name(), to = next.name(), "result state changed");
            *current = next;
        });
    }

    pub fn snapshot(&self) -> ResultState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream {
        StateStream { rx: self.tx.subscribe() }
    }
}

/// Reader side of the result cell, handed to the view layer.
#[derive(Debug, Clone)]
pub struct StateStream {
    rx: watch::Receiver<ResultState>,
}

impl StateStream {
    /// Latest value, without marking it as seen.
    pub fn current(&self) -> ResultState {
        self.rx.borrow().clone()
    }

    /// Wait for the next change and return it. `None` once the writer is gone.
    pub async fn changed(&mut self) -> Option<ResultState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the cell holds `Success` or `Error`. Returns immediately if it already does.
    pub async fn wait_terminal(&mut self) -> Option<ResultState> {
        self.rx.wait_for(ResultState::is_terminal).await.ok().map(|s| (*s).clone())
    }
}
