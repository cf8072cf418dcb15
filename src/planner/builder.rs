use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use crate::error::{ErrorKind, StudyError};
use crate::generation::extract::{extract_structured, is_truncated};
use crate::generation::{GenerationRequest, GenerationService};
use crate::planner::model::{KnowledgeLevel, StoredPlan, StudyPlan};
use crate::planner::prompts::{self, PlanRequest};

/// Creates study plans through the generation service
pub struct StudyPlanner {
    generator: Arc<dyn GenerationService>,
    timeout: Duration,
}

impl StudyPlanner {
    pub fn new(generator: Arc<dyn GenerationService>, timeout: Duration) -> Self {
        StudyPlanner { generator, timeout }
    }

    /// Ask the service for a plan reaching `goal` by `deadline`.
    ///
    /// Unlike adaptation, a plan that cannot be parsed is an error: there is
    /// no partial plan worth keeping.
    pub async fn create_study_plan(
        &self,
        goal: &str,
        deadline: NaiveDate,
        daily_hours: f64,
        level: KnowledgeLevel,
        today: NaiveDate,
    ) -> Result<StoredPlan, StudyError> {
        let goal = goal.trim();
        if goal.is_empty() {
            return Err(StudyError::invalid_input("Goal must not be empty", "plan_create"));
        }
        if !daily_hours.is_finite() || daily_hours <= 0.0 {
            return Err(StudyError::invalid_input(
                format!("Daily hours must be positive, got {}", daily_hours),
                "plan_create",
            ));
        }

        let days_available = (deadline - today).num_days();
        if days_available <= 0 {
            return Err(StudyError::invalid_input("Deadline must be in the future", "plan_create")
                .with_context(format!("deadline: {}, today: {}", deadline, today)));
        }
        let total_hours = days_available as f64 * daily_hours;

        tracing::info!(
            goal = goal,
            days_available = days_available,
            total_hours = total_hours,
            level = %level,
            "Creating study plan"
        );

        let request = GenerationRequest::new(
            prompts::PLANNER_SYSTEM,
            prompts::build_plan_prompt(&PlanRequest {
                goal,
                deadline,
                daily_hours,
                total_hours,
                days_available,
                level,
                today,
            }),
        );

        let raw = tokio::time::timeout(self.timeout, self.generator.generate(&request))
            .await
            .map_err(|e| StudyError::from(e).with_model(self.generator.model_name()))??;

        let mut plan: StudyPlan = extract_structured(&raw).map_err(|e| {
            StudyError::new(
                ErrorKind::GenerationParseFailure,
                format!("Failed to generate plan: {}", e),
                "plan_parse",
            )
            .with_model(self.generator.model_name())
            .with_context(format!(
                "truncated: {}, response: {}",
                is_truncated(&raw),
                raw.chars().take(500).collect::<String>()
            ))
        })?;

        // Fill in what the model left out
        if plan.main_goal.trim().is_empty() {
            plan.main_goal = goal.to_string();
        }
        if plan.days_available <= 0 {
            plan.days_available = days_available;
        }
        if plan.total_hours <= 0.0 {
            plan.total_hours = total_hours;
        }

        tracing::info!(
            goal = %plan.main_goal,
            subtasks = plan.subtasks.len(),
            milestones = plan.milestones.len(),
            "Study plan created"
        );

        Ok(StoredPlan::new(plan, Utc::now()))
    }
}
