use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::circuit_breaker::{CircuitBreaker, ExponentialBackoff};
use crate::config::GenerationConfig;
use crate::error::{ErrorKind, StudyError};
use crate::generation::{GenerationRequest, GenerationService};
use crate::logging::{log_model_call, log_timeout};
use crate::metrics::GenerationMetrics;

/// Retries, backoff and a circuit breaker around any [`GenerationService`]
pub struct ResilientGenerator {
    inner: Arc<dyn GenerationService>,
    breaker: CircuitBreaker,
    backoff: ExponentialBackoff,
    max_retries: u32,
    metrics: GenerationMetrics,
}

impl ResilientGenerator {
    pub fn new(inner: Arc<dyn GenerationService>, config: &GenerationConfig, metrics: GenerationMetrics) -> Self {
        ResilientGenerator {
            inner,
            breaker: CircuitBreaker::new(
                config.breaker_threshold,
                Duration::from_secs(config.breaker_cooldown_secs),
            ),
            backoff: ExponentialBackoff::default(),
            max_retries: config.max_retries,
            metrics,
        }
    }

    pub fn with_backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    fn is_retryable(err: &StudyError) -> bool {
        matches!(err.kind, ErrorKind::GenerationTimeout | ErrorKind::GenerationUnavailable)
    }
}

#[async_trait]
impl GenerationService for ResilientGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, StudyError> {
        let model = self.inner.model_name().to_string();
        let mut attempt: u32 = 0;

        loop {
            if !self.breaker.allows_call() {
                self.metrics.record_failure();
                return Err(StudyError::new(
                    ErrorKind::GenerationUnavailable,
                    "Generation service temporarily disabled after repeated failures",
                    "circuit_breaker",
                )
                .with_model(&model));
            }

            let start = Instant::now();
            let outcome = self.inner.generate(request).await;
            let latency_ms = start.elapsed().as_millis() as u64;

            match outcome {
                Ok(text) => {
                    self.breaker.record_success();
                    self.metrics.record_call(latency_ms);
                    log_model_call(&model, "generate", true, latency_ms);
                    return Ok(text);
                }
                Err(err) => {
                    log_model_call(&model, "generate", false, latency_ms);
                    self.metrics.record_failure();
                    if err.kind == ErrorKind::GenerationTimeout {
                        self.metrics.record_timeout();
                        log_timeout(&model, start.elapsed().as_secs());
                    }

                    if !Self::is_retryable(&err) {
                        self.breaker.release_trial();
                        return Err(err);
                    }
                    self.breaker.record_failure();

                    if attempt >= self.max_retries {
                        return Err(err.with_context(format!("after {} attempt(s)", attempt + 1)));
                    }

                    let delay = self.backoff.delay_for_attempt(attempt);
                    tracing::debug!(
                        model = %model,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying generation call"
                    );
                    self.metrics.record_retry();
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
