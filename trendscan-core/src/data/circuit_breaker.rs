//! Circuit breaker guarding the price provider.
//!
//! An HTTP 403 (block) trips it at once; a run of consecutive failures trips
//! it too. While open, every fetch fails fast. After the cooldown the breaker
//! is half-open: requests go through, and a single failure reopens it.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::warn;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Why the breaker opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripReason {
    /// The provider refused us outright.
    Blocked,
    /// `count` requests in a row failed.
    RepeatedFailures { count: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open { since: Instant, reason: TripReason },
    /// Cooldown elapsed; the next failure reopens immediately.
    HalfOpen,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    failures_in_row: u32,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::default_provider()
    }
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration) -> Self {
        Self::with_threshold(cooldown, DEFAULT_FAILURE_THRESHOLD)
    }

    /// A threshold of zero is treated as one.
    pub fn with_threshold(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                failures_in_row: 0,
            }),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// 30-minute cooldown, three strikes.
    pub fn default_provider() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state, after applying any elapsed cooldown.
    pub fn state(&self) -> BreakerState {
        let mut inner = self.lock();
        if let BreakerState::Open { since, .. } = inner.state {
            if since.elapsed() >= self.cooldown {
                inner.state = BreakerState::HalfOpen;
                inner.failures_in_row = 0;
            }
        }
        inner.state
    }

    pub fn is_allowed(&self) -> bool {
        !matches!(self.state(), BreakerState::Open { .. })
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        inner.failures_in_row = 0;
        inner.state = BreakerState::Closed;
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.failures_in_row = inner.failures_in_row.saturating_add(1);
        let reopen = matches!(inner.state, BreakerState::HalfOpen)
            || inner.failures_in_row >= self.failure_threshold;
        if reopen && !matches!(inner.state, BreakerState::Open { .. }) {
            let reason = TripReason::RepeatedFailures {
                count: inner.failures_in_row,
            };
            warn!(?reason, cooldown_secs = self.cooldown.as_secs(), "price provider circuit opened");
            inner.state = BreakerState::Open {
                since: Instant::now(),
                reason,
            };
        }
    }

    /// Open the breaker without waiting for the failure threshold.
    pub fn trip(&self) {
        warn!(cooldown_secs = self.cooldown.as_secs(), "price provider blocked us; circuit opened");
        self.lock().state = BreakerState::Open {
            since: Instant::now(),
            reason: TripReason::Blocked,
        };
    }

    /// Time until requests are allowed again; zero unless open.
    pub fn remaining_cooldown(&self) -> Duration {
        match self.state() {
            BreakerState::Open { since, .. } => self.cooldown.saturating_sub(since.elapsed()),
            BreakerState::Closed | BreakerState::HalfOpen => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minute() -> CircuitBreaker {
        CircuitBreaker::new(Duration::from_secs(60))
    }

    #[test]
    fn fresh_breaker_allows_requests() {
        let cb = minute();
        assert_eq!(cb.state(), BreakerState::Closed);
        assert!(cb.is_allowed());
        assert_eq!(cb.remaining_cooldown(), Duration::ZERO);
    }

    #[test]
    fn third_failure_in_a_row_opens() {
        let cb = minute();
        cb.record_failure();
        cb.record_failure();
        assert!(cb.is_allowed());
        cb.record_failure();
        assert!(!cb.is_allowed());
        assert!(matches!(
            cb.state(),
            BreakerState::Open {
                reason: TripReason::RepeatedFailures { count: 3 },
                ..
            }
        ));
        assert!(cb.remaining_cooldown() > Duration::ZERO);
    }

    #[test]
    fn block_opens_immediately() {
        let cb = minute();
        cb.trip();
        assert!(matches!(
            cb.state(),
            BreakerState::Open {
                reason: TripReason::Blocked,
                ..
            }
        ));
    }

    #[test]
    fn success_clears_the_streak() {
        let cb = minute();
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        assert!(cb.is_allowed());
    }

    #[test]
    fn cooldown_leads_to_half_open_then_one_strike_reopens() {
        let cb = CircuitBreaker::new(Duration::from_millis(10));
        cb.trip();
        assert!(!cb.is_allowed());
        std::thread::sleep(Duration::from_millis(15));
        assert_eq!(cb.state(), BreakerState::HalfOpen);
        assert!(cb.is_allowed());

        cb.record_failure();
        assert!(!cb.is_allowed());
    }

    #[test]
    fn half_open_success_closes() {
        let cb = CircuitBreaker::new(Duration::from_millis(10));
        cb.trip();
        std::thread::sleep(Duration::from_millis(15));
        assert!(cb.is_allowed());
        cb.record_success();
        assert_eq!(cb.state(), BreakerState::Closed);
    }

    #[test]
    fn zero_threshold_behaves_as_one() {
        let cb = CircuitBreaker::with_threshold(Duration::from_secs(60), 0);
        cb.record_failure();
        assert!(!cb.is_allowed());
    }
}
