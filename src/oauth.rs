//! Exactly-once handling of one-time authorization codes.
//!
//! Codes arrive asynchronously from an untrusted popup and may be delivered
//! more than once. Each code moves through:
//!
//! ```text
//! Idle → CodeReceived → Exchanging → Done
//!                                  ↘ Failed
//! ```
//!
//! Any transition not on this path is rejected, so a replayed code can
//! never trigger a second exchange.

use std::future::Future;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

/// Lifecycle of one authorization code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeState {
    Idle,
    CodeReceived,
    Exchanging,
    Done,
    Failed(String),
}

impl CodeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CodeState::Done | CodeState::Failed(_))
    }
}

/// Errors raised by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OAuthError {
    #[error("authorization code is empty")]
    EmptyCode,

    #[error("authorization code was already received")]
    Duplicate,

    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: CodeState, to: CodeState },

    #[error("code exchange failed: {0}")]
    ExchangeFailed(String),
}

/// Tracks authorization codes by value.
#[derive(Debug, Default)]
pub struct CodeExchangeTracker {
    codes: DashMap<String, CodeState>,
}

impl CodeExchangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `code`; unseen codes are `Idle`.
    pub fn state(&self, code: &str) -> CodeState {
        self.codes
            .get(code)
            .map(|s| s.value().clone())
            .unwrap_or(CodeState::Idle)
    }

    /// Idle → CodeReceived. A code seen before is rejected whatever its state.
    pub fn receive(&self, code: &str) -> Result<(), OAuthError> {
        if code.trim().is_empty() {
            return Err(OAuthError::EmptyCode);
        }
        match self.codes.entry(code.to_string()) {
            Entry::Occupied(_) => {
                tracing::warn!("Ignoring replayed authorization code");
                Err(OAuthError::Duplicate)
            }
            Entry::Vacant(slot) => {
                slot.insert(CodeState::CodeReceived);
                Ok(())
            }
        }
    }

    /// CodeReceived → Exchanging.
    pub fn begin_exchange(&self, code: &str) -> Result<(), OAuthError> {
        self.transition(code, CodeState::Exchanging, |s| *s == CodeState::CodeReceived)
    }

    /// Exchanging → Done or Failed.
    pub fn complete<T, E: std::fmt::Display>(&self, code: &str, outcome: &Result<T, E>) -> Result<(), OAuthError> {
        let next = match outcome {
            Ok(_) => CodeState::Done,
            Err(e) => CodeState::Failed(e.to_string()),
        };
        self.transition(code, next, |s| *s == CodeState::Exchanging)
    }

    /// Receive a code and run `exchange` for it at most once.
    pub async fn exchange<F, Fut, T, E>(&self, code: &str, exchange: F) -> Result<T, OAuthError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        self.receive(code)?;
        self.begin_exchange(code)?;

        // Dropped before `disarm` when the future is cancelled or the exchange panics.
        let guard = ExchangeGuard {
            tracker: self,
            code,
            armed: true,
        };
        let outcome = exchange(code.to_string()).await;
        guard.disarm();
        self.complete(code, &outcome)?;

        match outcome {
            Ok(value) => {
                tracing::info!("Authorization code exchanged");
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Authorization code exchange failed");
                Err(OAuthError::ExchangeFailed(e.to_string()))
            }
        }
    }

    /// Forget terminal codes. Returns how many were removed.
    pub fn prune_finished(&self) -> usize {
        let before = self.codes.len();
        self.codes.retain(|_, state| !state.is_terminal());
        before - self.codes.len()
    }

    fn transition<P>(&self, code: &str, next: CodeState, allowed: P) -> Result<(), OAuthError>
    where
        P: Fn(&CodeState) -> bool,
    {
        match self.codes.get_mut(code) {
            Some(mut state) if allowed(&state) => {
                *state = next;
                Ok(())
            }
            Some(state) => Err(OAuthError::InvalidTransition {
                from: state.clone(),
                to: next,
            }),
            None => Err(OAuthError::InvalidTransition {
                from: CodeState::Idle,
                to: next,
            }),
        }
    }
}

/// Moves an in-flight code to `Failed` if the exchange never completes.
struct ExchangeGuard<'a> {
    tracker: &'a CodeExchangeTracker,
    code: &'a str,
    armed: bool,
}

impl ExchangeGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(mut state) = self.tracker.codes.get_mut(self.code) {
            if *state == CodeState::Exchanging {
                tracing::warn!("Authorization code exchange cancelled");
                *state = CodeState::Failed("cancelled".to_string());
            }
        }
    }
}

/// Accept popup messages only from the expected origin (scheme, host and port).
pub fn accepts_origin(expected: &str, actual: &str) -> bool {
    match (url::Url::parse(expected), url::Url::parse(actual)) {
        (Ok(e), Ok(a)) => e.origin() == a.origin(),
        _ => false,
    }
}
