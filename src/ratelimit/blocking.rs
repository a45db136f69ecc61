//! Thread-blocking admission gate.

use std::ops::Deref;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, trace, warn};

use super::window::{GateSnapshot, LimiterState, TimeUnit};
use crate::error::{GateError, Result, TransportError};

/// Fixed-window rate limiting gate for synchronous callers.
///
/// Behaves like a monitor: the lock is held while the action runs, and a
/// caller over the limit parks on a condition variable until the window rolls
/// over or the current holder leaves the gate. Waiting releases the lock, so
/// other callers can queue up behind it.
pub struct BlockingGate {
    state: Mutex<LimiterState>,
    released: Condvar,
}

impl BlockingGate {
    /// Create a gate admitting at most `limit` calls per `window`.
    pub fn new(window: Duration, limit: u64) -> Result<Self> {
        let state = LimiterState::new(window, limit, Instant::now())?;
        Ok(Self {
            state: Mutex::new(state),
            released: Condvar::new(),
        })
    }

    /// Create a gate whose window is one `unit` long.
    pub fn with_time_unit(unit: TimeUnit, limit: u64) -> Result<Self> {
        Self::new(unit.duration(), limit)
    }

    /// Block until admitted, then run `action` while holding the gate.
    ///
    /// The attempt is counted once `action` returns, even if it failed or
    /// panicked.
    pub fn run<T, F>(&self, action: F) -> Result<T>
    where
        F: FnOnce() -> std::result::Result<T, TransportError>,
    {
        let slot = self.admit(None)?;
        execute(slot, action)
    }

    /// Like [`run`](Self::run), but fail with [`GateError::Cancelled`] if not
    /// admitted within `timeout`.
    ///
    /// A timeout too large to represent as an instant means no deadline.
    pub fn run_with_timeout<T, F>(&self, timeout: Duration, action: F) -> Result<T>
    where
        F: FnOnce() -> std::result::Result<T, TransportError>,
    {
        let slot = self.admit(Instant::now().checked_add(timeout))?;
        execute(slot, action)
    }

    /// Current counters.
    pub fn snapshot(&self) -> GateSnapshot {
        GateSnapshot::from(&*self.state.lock())
    }

    fn admit(&self, deadline: Option<Instant>) -> Result<Slot<'_>> {
        let mut state = match deadline {
            Some(deadline) => self.state.try_lock_until(deadline).ok_or_else(|| {
                debug!("Caller timed out waiting for the gate");
                GateError::Cancelled
            })?,
            None => self.state.lock(),
        };

        if state.roll_over(Instant::now()) {
            debug!("Rate limit window rolled over");
        }

        while !state.has_capacity() {
            let now = Instant::now();
            if deadline.is_some_and(|deadline| now >= deadline) {
                debug!("Caller timed out before admission");
                return Err(GateError::Cancelled);
            }

            let rollover_at = now.checked_add(state.until_rollover(now));
            let wake_at = match (rollover_at, deadline) {
                (Some(rollover_at), Some(deadline)) => Some(rollover_at.min(deadline)),
                (rollover_at, deadline) => rollover_at.or(deadline),
            };

            trace!(
                count = state.count(),
                limit = state.limit(),
                "Window exhausted, parking until rollover"
            );
            match wake_at {
                Some(wake_at) => {
                    self.released.wait_until(&mut state, wake_at);
                }
                None => self.released.wait(&mut state),
            }

            if state.roll_over(Instant::now()) {
                debug!("Rate limit window rolled over");
            }
        }

        debug!(
            admission = state.count() + 1,
            limit = state.limit(),
            "Call admitted"
        );
        Ok(Slot {
            state,
            released: &self.released,
        })
    }
}

/// An admitted caller's hold on the gate.
///
/// Dropping it records the admission and wakes parked callers, on every exit
/// path of the action including a panic.
struct Slot<'a> {
    state: MutexGuard<'a, LimiterState>,
    released: &'a Condvar,
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
        self.released.notify_all();
    }
}

fn execute<T, F>(slot: Slot<'_>, action: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, TransportError>,
{
    let outcome = action();
    let remaining = slot.remaining().saturating_sub(1);
    drop(slot);

    outcome.map_err(|e| {
        warn!(
            error = %e,
            remaining = remaining,
            "Downstream action failed; admission slot still consumed"
        );
        GateError::Transport(e)
    })
}
