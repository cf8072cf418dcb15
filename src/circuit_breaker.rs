use std::time::{Duration, Instant};
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Calls flow normally
    Closed,
    /// Calls are refused until the cooldown elapses
    Open,
    /// One trial call is allowed; its outcome closes or reopens the breaker
    HalfOpen,
}

#[derive(Debug)]
struct Inner {
    consecutive_failures: u64,
    opened_at: Option<Instant>,
    half_open: bool,
    trial_in_flight: bool,
}

impl Inner {
    fn close(&mut self) {
        self.consecutive_failures = 0;
        self.opened_at = None;
        self.half_open = false;
        self.trial_in_flight = false;
    }
}

/// Three-state circuit breaker guarding the generation service
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    failure_threshold: u64,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u64, cooldown: Duration) -> Self {
        CircuitBreaker {
            inner: Mutex::new(Inner {
                consecutive_failures: 0,
                opened_at: None,
                half_open: false,
                trial_in_flight: false,
            }),
            failure_threshold: failure_threshold.max(1),
            cooldown,
        }
    }

    fn state_of(&self, inner: &mut Inner) -> BreakerState {
        match inner.opened_at {
            None => BreakerState::Closed,
            Some(_) if inner.half_open => BreakerState::HalfOpen,
            Some(opened) => {
                if opened.elapsed() >= self.cooldown {
                    inner.half_open = true;
                    BreakerState::HalfOpen
                } else {
                    BreakerState::Open
                }
            }
        }
    }

    /// Current state, promoting Open to HalfOpen once the cooldown has passed
    pub fn state(&self) -> BreakerState {
        let mut inner = self.inner.lock();
        self.state_of(&mut inner)
    }

    /// Whether a call may be attempted right now.
    /// In HalfOpen only the first caller gets through until the trial reports back.
    pub fn allows_call(&self) -> bool {
        let mut inner = self.inner.lock();
        match self.state_of(&mut inner) {
            BreakerState::Closed => true,
            BreakerState::Open => false,
            BreakerState::HalfOpen => !std::mem::replace(&mut inner.trial_in_flight, true),
        }
    }

    pub fn record_success(&self) {
        self.inner.lock().close();
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        inner.consecutive_failures += 1;
        inner.trial_in_flight = false;

        // A failed trial call reopens immediately
        if inner.half_open || inner.consecutive_failures >= self.failure_threshold {
            if inner.opened_at.is_none() || inner.half_open {
                tracing::warn!(
                    failures = inner.consecutive_failures,
                    cooldown_secs = self.cooldown.as_secs(),
                    "Circuit breaker opened"
                );
            }
            inner.opened_at = Some(Instant::now());
            inner.half_open = false;
        }
    }

    /// Give up a trial slot without judging the service, e.g. after a
    /// request error that says nothing about its health
    pub fn release_trial(&self) {
        self.inner.lock().trial_in_flight = false;
    }

    pub fn failure_count(&self) -> u64 {
        self.inner.lock().consecutive_failures
    }
}

/// Exponential backoff calculator
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay_ms: u64,
    max_delay_ms: u64,
    multiplier: f64,
}

impl ExponentialBackoff {
    pub fn new(initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        ExponentialBackoff {
            initial_delay_ms,
            max_delay_ms,
            multiplier: 2.0,
        }
    }

    /// Delay before retry number `attempt` (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = (self.initial_delay_ms as f64 * self.multiplier.powi(attempt as i32)) as u64;
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(100, 5000)
    }
}
