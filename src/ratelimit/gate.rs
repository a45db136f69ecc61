//! Async admission gate.

use std::future::Future;
use std::ops::Deref;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use super::window::{GateSnapshot, LimiterState, TimeUnit};
use crate::error::{GateError, Result, TransportError};

/// Fixed-window rate limiting gate for async callers.
///
/// At most `limit` actions run per window. A single mutex covers both the
/// counter and the downstream action, so admitted actions never overlap.
/// Callers over the limit sleep until the window rolls over while still
/// holding the gate; nobody else could be admitted in the meantime.
///
/// The gate can be shared across tasks behind an `Arc`.
pub struct SubmissionGate {
    state: Mutex<LimiterState>,
}

impl SubmissionGate {
    /// Create a gate admitting at most `limit` calls per `window`.
    pub fn new(window: Duration, limit: u64) -> Result<Self> {
        let state = LimiterState::new(window, limit, now())?;
        debug!(
            window_ms = window.as_millis() as u64,
            limit = limit,
            "Submission gate created"
        );
        Ok(Self {
            state: Mutex::new(state),
        })
    }

    /// Create a gate whose window is one `unit` long.
    pub fn with_time_unit(unit: TimeUnit, limit: u64) -> Result<Self> {
        Self::new(unit.duration(), limit)
    }

    /// Wait for admission, then run `action` while holding the gate.
    ///
    /// The attempt counts against the window once `action` finishes, whether
    /// it succeeded or failed. A failure is returned as
    /// [`GateError::Transport`].
    pub async fn run<F, Fut, T>(&self, action: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, TransportError>>,
    {
        let slot = self.admit().await;
        execute(slot, action).await
    }

    /// Like [`run`](Self::run), but give up with [`GateError::Cancelled`] if
    /// `cancel` resolves before the caller is admitted.
    ///
    /// Once admitted the action always runs to completion; `cancel` is no
    /// longer observed.
    pub async fn run_cancellable<C, F, Fut, T>(&self, cancel: C, action: F) -> Result<T>
    where
        C: Future<Output = ()>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, TransportError>>,
    {
        let slot = tokio::select! {
            biased;
            slot = self.admit() => slot,
            _ = cancel => {
                debug!("Caller cancelled before admission");
                return Err(GateError::Cancelled);
            }
        };
        execute(slot, action).await
    }

    /// Like [`run`](Self::run), but give up if not admitted within `timeout`.
    pub async fn run_with_timeout<F, Fut, T>(&self, timeout: Duration, action: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, TransportError>>,
    {
        self.run_cancellable(tokio::time::sleep(timeout), action)
            .await
    }

    /// Current counters, taken once the gate is free.
    pub async fn snapshot(&self) -> GateSnapshot {
        let state = self.state.lock().await;
        GateSnapshot::from(&*state)
    }

    /// Acquire the gate and wait until the current window has room.
    ///
    /// Dropping the returned future before it resolves leaves the counters
    /// untouched apart from a rollover that was due anyway.
    async fn admit(&self) -> Slot<'_> {
        let mut state = self.state.lock().await;

        if state.roll_over(now()) {
            debug!("Rate limit window rolled over");
        }

        while !state.has_capacity() {
            let wait = state.until_rollover(now());
            trace!(
                wait_ms = wait.as_millis() as u64,
                count = state.count(),
                limit = state.limit(),
                "Window exhausted, waiting for rollover"
            );
            tokio::time::sleep(wait).await;

            if state.roll_over(now()) {
                debug!("Rate limit window rolled over");
            }
        }

        debug!(
            admission = state.count() + 1,
            limit = state.limit(),
            "Call admitted"
        );
        Slot { state }
    }
}

/// An admitted caller's hold on the gate.
///
/// Dropping it records the admission, so a completed, failed, or abandoned
/// action all count against the window.
struct Slot<'a> {
    state: MutexGuard<'a, LimiterState>,
}

impl Deref for Slot<'_> {
    type Target = LimiterState;

    fn deref(&self) -> &Self::Target {
        &*self.state
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        self.state.record_admission();
    }
}

async fn execute<F, Fut, T>(slot: Slot<'_>, action: F) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, TransportError>>,
{
    let outcome = action().await;
    let remaining = slot.remaining().saturating_sub(1);
    drop(slot);

    match outcome {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!(
                error = %e,
                remaining = remaining,
                "Downstream action failed; admission slot still consumed"
            );
            Err(GateError::Transport(e))
        }
    }
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}
