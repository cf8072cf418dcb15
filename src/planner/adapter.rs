use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use crate::error::ErrorKind;
use crate::generation::extract::{extract_structured, is_truncated};
use crate::generation::{GenerationRequest, GenerationService};
use crate::metrics::GenerationMetrics;
use crate::planner::model::{Adaptation, AdaptationResult, DegradeReason, PerformanceSlice, StudyPlan};
use crate::planner::prompts;

/// Turns a plan plus a quiz slice into revision suggestions.
///
/// [`PlanAdapter::adapt`] never fails: when the service times out, errors,
/// or answers in the wrong shape, the result is marked degraded instead.
pub struct PlanAdapter {
    generator: Arc<dyn GenerationService>,
    timeout: Duration,
    metrics: GenerationMetrics,
}

impl PlanAdapter {
    pub fn new(generator: Arc<dyn GenerationService>, timeout: Duration) -> Self {
        PlanAdapter {
            generator,
            timeout,
            metrics: GenerationMetrics::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: GenerationMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub async fn adapt(&self, plan: &StudyPlan, slice: &PerformanceSlice) -> Adaptation {
        let slice_json = serde_json::to_string_pretty(slice).unwrap_or_else(|_| "{}".to_string());
        let request = GenerationRequest::new(
            prompts::COACH_SYSTEM,
            prompts::build_adapt_prompt(plan, slice, &slice_json),
        );

        tracing::info!(
            goal = %plan.main_goal,
            quizzes = slice.quiz_scores.len(),
            model = self.generator.model_name(),
            "Adapting study plan"
        );

        let outcome = tokio::time::timeout(self.timeout, self.generator.generate(&request)).await;

        let adaptation = match outcome {
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "Plan adaptation timed out");
                Self::unavailable(DegradeReason::Timeout)
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "Generation service failed during plan adaptation");
                let reason = match err.kind {
                    ErrorKind::GenerationTimeout => DegradeReason::Timeout,
                    ErrorKind::Busy => DegradeReason::Busy,
                    _ => DegradeReason::Unavailable,
                };
                Self::unavailable(reason)
            }
            Ok(Ok(raw)) => interpret_response(&raw),
        };

        if adaptation.is_degraded() {
            self.metrics.record_degraded();
        }
        adaptation
    }

    /// Degraded result with no content, for when no answer arrived
    pub fn unavailable(reason: DegradeReason) -> Adaptation {
        Adaptation::degraded(AdaptationResult::empty(), reason)
    }
}

/// Parse a raw service answer into an [`Adaptation`].
///
/// An answer with no usable JSON, or JSON carrying none of the expected
/// keys, becomes a degraded result holding the raw text.
pub fn interpret_response(raw: &str) -> Adaptation {
    let parsed = extract_structured::<serde_json::Value>(raw).and_then(|value| {
        if !AdaptationResult::has_suggestion_keys(&value) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value::<AdaptationResult>(value)?))
    });

    match parsed {
        Ok(Some(mut result)) => {
            result.adapted_at = Utc::now();
            Adaptation::structured(result)
        }
        Ok(None) => {
            tracing::warn!(len = raw.len(), "Adaptation JSON carried none of the expected keys");
            Adaptation::degraded(AdaptationResult::degraded(raw), DegradeReason::ParseFailure)
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                truncated = is_truncated(raw),
                preview = %raw.chars().take(200).collect::<String>(),
                "Could not parse adaptation response"
            );
            Adaptation::degraded(AdaptationResult::degraded(raw), DegradeReason::ParseFailure)
        }
    }
}
