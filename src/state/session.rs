use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use crate::config::Settings;
use crate::error::StudyError;
use crate::generation::{build_service, GenerationService};
use crate::metrics::GenerationMetrics;
use crate::performance::{PerformanceReport, PerformanceTracker};
use crate::planner::{
    filter_quizzes_for_plan, Adaptation, DegradeReason, KnowledgeLevel, PlanAdapter, PlanStore,
    StoredPlan, StudyPlan, StudyPlanner,
};
use crate::tasks::TodoList;
use crate::state::gate::GenerationGate;

/// Everything one user's session works with.
/// Passed explicitly; nothing here is process-global.
pub struct SessionContext {
    user_id: String,
    settings: Settings,
    pub performance: PerformanceTracker,
    pub todos: TodoList,
    pub plans: PlanStore,
    generator: Option<Arc<dyn GenerationService>>,
    gate: GenerationGate,
    metrics: GenerationMetrics,
}

impl SessionContext {
    /// Load the user's documents. No generation backend is attached yet.
    pub async fn open(settings: Settings, user_id: &str) -> Result<Self, StudyError> {
        let dir = settings.storage.user_data_dir();
        let performance = PerformanceTracker::open(&dir, user_id).await?;
        let todos = TodoList::open(&dir, user_id).await?;
        let plans = PlanStore::new(&dir, user_id)?;

        tracing::info!(user_id = user_id, data_dir = ?dir, "Session opened");

        Ok(SessionContext {
            user_id: user_id.to_string(),
            settings,
            performance,
            todos,
            plans,
            generator: None,
            gate: GenerationGate::new(),
            metrics: GenerationMetrics::new(),
        })
    }

    /// Build the configured generation backend and attach it
    pub fn connect(&mut self) -> Result<(), StudyError> {
        let service = build_service(&self.settings.generation, self.metrics.clone())?;
        self.generator = Some(service);
        Ok(())
    }

    pub fn with_generator(mut self, generator: Arc<dyn GenerationService>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn metrics(&self) -> &GenerationMetrics {
        &self.metrics
    }

    pub fn gate(&self) -> &GenerationGate {
        &self.gate
    }

    fn generator(&self) -> Result<Arc<dyn GenerationService>, StudyError> {
        self.generator
            .clone()
            .ok_or_else(|| StudyError::config("No generation service attached to this session"))
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.generation.request_timeout_secs)
    }

    /// Report with `total_tasks` falling back to the configured default
    pub fn report(&self, total_tasks: Option<usize>) -> PerformanceReport {
        let total = total_tasks.unwrap_or(self.settings.report.default_total_tasks);
        self.performance.generate_performance_report(total)
    }

    /// Complete a pending to-do and log it as a finished task with its estimate.
    /// Only the first completion is recorded.
    pub async fn complete_todo(&mut self, id: &str) -> Result<bool, StudyError> {
        let Some(task) = self.todos.tasks().iter().find(|t| t.id == id).cloned() else {
            return Ok(false);
        };
        if !self.todos.complete_task(id).await? {
            return Ok(false);
        }
        self.performance
            .record_task_completion(&task.id, &task.name, task.estimated_hours)
            .await?;
        Ok(true)
    }

    /// Generate a plan and save it. Returns the plan's file name with it.
    pub async fn create_plan(
        &self,
        goal: &str,
        deadline: NaiveDate,
        daily_hours: f64,
        level: KnowledgeLevel,
        today: NaiveDate,
    ) -> Result<(String, StoredPlan), StudyError> {
        let generator = self.generator()?;
        let _permit = self.gate.try_acquire()?;

        let planner = StudyPlanner::new(generator, self.request_timeout());
        let plan = planner
            .create_study_plan(goal, deadline, daily_hours, level, today)
            .await?;
        let file_name = self.plans.save(&plan).await?;
        tracing::info!(user_id = %self.user_id, file_name = %file_name, "Study plan saved");
        Ok((file_name, plan))
    }

    /// Revise `plan` against the quizzes that match its goal.
    ///
    /// Fails only when no quiz matches or no backend is attached; every
    /// generation problem, including a request already in flight, comes back
    /// as a degraded [`Adaptation`].
    pub async fn adapt_plan(&self, plan: &StudyPlan) -> Result<Adaptation, StudyError> {
        let slice = filter_quizzes_for_plan(plan, &self.performance.record().quiz_scores);
        if slice.is_empty() {
            return Err(StudyError::not_found(
                "No quizzes found matching this plan's topic. Complete some quizzes for this plan before adapting",
                "plan_adapt",
            )
            .with_context(format!("goal: {}", plan.main_goal)));
        }

        let generator = self.generator()?;
        let _permit = match self.gate.try_acquire() {
            Ok(permit) => permit,
            Err(err) => {
                tracing::warn!(user_id = %self.user_id, error = %err, "Adaptation skipped");
                self.metrics.record_degraded();
                return Ok(PlanAdapter::unavailable(DegradeReason::Busy));
            }
        };

        let adapter = PlanAdapter::new(generator, self.request_timeout())
            .with_metrics(self.metrics.clone());
        Ok(adapter.adapt(plan, &slice).await)
    }

    /// Load a saved plan by file name and adapt it
    pub async fn adapt_saved_plan(&self, file_name: &str) -> Result<Adaptation, StudyError> {
        let stored = self.plans.load(file_name).await?.ok_or_else(|| {
            StudyError::not_found(format!("Plan '{}' not found", file_name), "plan_adapt")
        })?;
        self.adapt_plan(&stored.plan).await
    }
}
