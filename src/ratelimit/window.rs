//! Fixed-window counter state shared by both gate flavours.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::error::{GateError, Result};

/// Time unit whose length defines one rate limit window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Per-millisecond rate limiting
    Millisecond,
    /// Per-second rate limiting
    #[default]
    Second,
    /// Per-minute rate limiting
    Minute,
    /// Per-hour rate limiting
    Hour,
    /// Per-day rate limiting
    Day,
}

impl TimeUnit {
    /// Get the duration of one unit.
    pub fn duration(&self) -> Duration {
        match self {
            TimeUnit::Millisecond => Duration::from_millis(1),
            TimeUnit::Second => Duration::from_secs(1),
            TimeUnit::Minute => Duration::from_secs(60),
            TimeUnit::Hour => Duration::from_secs(3600),
            TimeUnit::Day => Duration::from_secs(86400),
        }
    }
}

/// Admission counter for the current fixed window.
///
/// The state carries no lock of its own. Gates keep it behind their mutex and
/// pass the current instant in, so every mutation happens inside the gate's
/// critical section.
#[derive(Debug, Clone)]
pub struct LimiterState {
    /// When the current window started
    window_start: Instant,
    /// Length of every window
    window: Duration,
    /// Maximum admissions per window
    limit: u64,
    /// Admissions recorded in the current window
    count: u64,
}

impl LimiterState {
    /// Create a fresh state whose first window starts at `now`.
    ///
    /// Fails with [`GateError::Config`] when `limit` is zero or `window` is empty.
    pub fn new(window: Duration, limit: u64, now: Instant) -> Result<Self> {
        if limit == 0 {
            return Err(GateError::Config(
                "request limit must be at least 1".to_string(),
            ));
        }
        if window.is_zero() {
            return Err(GateError::Config(
                "window duration must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            window_start: now,
            window,
            limit,
            count: 0,
        })
    }

    /// Start a new window if the current one has elapsed at `now`.
    ///
    /// Returns `true` when a rollover happened.
    pub fn roll_over(&mut self, now: Instant) -> bool {
        if self.elapsed(now) >= self.window {
            self.count = 0;
            self.window_start = now;
            true
        } else {
            false
        }
    }

    /// Whether another admission fits in the current window.
    pub fn has_capacity(&self) -> bool {
        self.count < self.limit
    }

    /// Time left until the current window ends, measured from `now`.
    pub fn until_rollover(&self, now: Instant) -> Duration {
        self.window.saturating_sub(self.elapsed(now))
    }

    /// Count one completed admission against the current window.
    pub fn record_admission(&mut self) {
        self.count += 1;
    }

    /// Admissions recorded in the current window.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Admissions still available in the current window.
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.count)
    }

    /// Get the limit.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Get the window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Get the start of the current window.
    pub fn window_start(&self) -> Instant {
        self.window_start
    }

    fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.window_start)
    }
}

/// Point-in-time view of a gate's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSnapshot {
    /// Admissions recorded in the current window
    pub count: u64,
    /// Admissions still available in the current window
    pub remaining: u64,
    /// Maximum admissions per window
    pub limit: u64,
    /// Window length
    pub window: Duration,
    /// Start of the current window
    pub window_start: Instant,
}

impl From<&LimiterState> for GateSnapshot {
    fn from(state: &LimiterState) -> Self {
        Self {
            count: state.count(),
            remaining: state.remaining(),
            limit: state.limit(),
            window: state.window(),
            window_start: state.window_start(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_unit_duration() {
        assert_eq!(TimeUnit::Millisecond.duration(), Duration::from_millis(1));
        assert_eq!(TimeUnit::Second.duration(), Duration::from_secs(1));
        assert_eq!(TimeUnit::Minute.duration(), Duration::from_secs(60));
        assert_eq!(TimeUnit::Hour.duration(), Duration::from_secs(3600));
        assert_eq!(TimeUnit::Day.duration(), Duration::from_secs(86400));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let result = LimiterState::new(Duration::from_secs(1), 0, Instant::now());
        assert!(matches!(result, Err(GateError::Config(_))));
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = LimiterState::new(Duration::ZERO, 5, Instant::now());
        assert!(matches!(result, Err(GateError::Config(_))));
    }

    #[test]
    fn test_capacity_exhausted_at_limit() {
        let start = Instant::now();
        let mut state = LimiterState::new(Duration::from_secs(1), 2, start).unwrap();

        assert!(state.has_capacity());
        state.record_admission();
        assert!(state.has_capacity());
        state.record_admission();
        assert!(!state.has_capacity());
        assert_eq!(state.remaining(), 0);
    }

    #[test]
    fn test_no_rollover_inside_window() {
        let start = Instant::now();
        let mut state = LimiterState::new(Duration::from_secs(1), 1, start).unwrap();
        state.record_admission();

        assert!(!state.roll_over(start + Duration::from_millis(999)));
        assert_eq!(state.count(), 1);
        assert_eq!(state.window_start(), start);
    }

    #[test]
    fn test_rollover_resets_count_and_advances_start() {
        let start = Instant::now();
        let mut state = LimiterState::new(Duration::from_secs(1), 1, start).unwrap();
        state.record_admission();

        let later = start + Duration::from_millis(1500);
        assert!(state.roll_over(later));
        assert_eq!(state.count(), 0);
        assert_eq!(state.window_start(), later);
    }

    #[test]
    fn test_earlier_instant_never_moves_window_back() {
        let start = Instant::now() + Duration::from_secs(5);
        let mut state = LimiterState::new(Duration::from_secs(1), 1, start).unwrap();

        assert!(!state.roll_over(start - Duration::from_secs(2)));
        assert_eq!(state.window_start(), start);
        assert_eq!(state.until_rollover(start - Duration::from_secs(2)), Duration::from_secs(1));
    }

    #[test]
    fn test_until_rollover() {
        let start = Instant::now();
        let state = LimiterState::new(Duration::from_millis(100), 1, start).unwrap();

        assert_eq!(state.until_rollover(start + Duration::from_millis(30)), Duration::from_millis(70));
        assert_eq!(state.until_rollover(start + Duration::from_millis(300)), Duration::ZERO);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let start = Instant::now();
        let mut state = LimiterState::new(Duration::from_secs(1), 3, start).unwrap();
        state.record_admission();

        let snapshot = GateSnapshot::from(&state);
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.remaining, 2);
        assert_eq!(snapshot.limit, 3);
        assert_eq!(snapshot.window_start, start);
    }
}
