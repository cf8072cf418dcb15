use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for generation traffic.
/// Cloning shares the same counters.
#[derive(Debug, Clone, Default)]
pub struct GenerationMetrics {
    calls: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
    timeouts: Arc<AtomicU64>,
    retries: Arc<AtomicU64>,
    degraded: Arc<AtomicU64>,
    /// Sum of successful call latencies
    latency_ms: Arc<AtomicU64>,
}

/// Point-in-time copy of [`GenerationMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub calls: u64,
    pub failures: u64,
    pub timeouts: u64,
    pub retries: u64,
    pub degraded: u64,
    pub latency_ms: u64,
}

impl GenerationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_call(&self, latency_ms: u64) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// An adaptation fell back to a degraded result
    pub fn record_degraded(&self) {
        self.degraded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
            latency_ms: self.latency_ms.load(Ordering::Relaxed),
        }
    }
}
