use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use crate::error::StudyError;
use crate::logging::log_persist;
use crate::performance::model::{
    round2, PerformanceRecord, QuizEntry, QuizStatus, SessionEntry, TaskEntry,
};
use crate::performance::report::{
    self, CompletionStats, PerformanceReport, StudyTimeStats, TopicPerformance,
};
use crate::performance::store::PerformanceStore;

/// One user's performance record plus the file it is persisted to.
///
/// Recording operations update memory first and then save. When the save
/// fails the caller gets the error, the update stays in memory, and
/// [`PerformanceTracker::save`] can be retried.
#[derive(Debug)]
pub struct PerformanceTracker {
    user_id: String,
    store: PerformanceStore,
    record: PerformanceRecord,
}

impl PerformanceTracker {
    /// Load (or start) the record for `user_id` under `user_data_dir`
    pub async fn open(user_data_dir: &Path, user_id: &str) -> Result<Self, StudyError> {
        let store = PerformanceStore::new(user_data_dir, user_id)?;
        let record = store.load().await?;
        tracing::debug!(
            user_id = user_id,
            quizzes = record.quiz_scores.len(),
            tasks = record.completed_tasks.len(),
            sessions = record.study_sessions.len(),
            "Performance record loaded"
        );
        Ok(PerformanceTracker {
            user_id: user_id.to_string(),
            store,
            record,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn record(&self) -> &PerformanceRecord {
        &self.record
    }

    /// Write the full record to disk
    pub async fn save(&self) -> Result<(), StudyError> {
        let result = self.store.save(&self.record).await;
        log_persist("performance", &self.user_id, result.is_ok());
        result
    }

    pub async fn record_quiz_score(
        &mut self,
        topic: &str,
        score: f64,
        max_score: f64,
    ) -> Result<QuizEntry, StudyError> {
        if !score.is_finite() || !max_score.is_finite() {
            return Err(StudyError::invalid_input("Quiz scores must be finite numbers", "record_quiz")
                .with_context(format!("topic: {}", topic)));
        }
        if max_score <= 0.0 {
            return Err(StudyError::invalid_input(
                format!("max_score must be positive, got {}", max_score),
                "record_quiz",
            ).with_context(format!("topic: {}", topic)));
        }
        if score < 0.0 {
            return Err(StudyError::invalid_input(
                format!("score must not be negative, got {}", score),
                "record_quiz",
            ).with_context(format!("topic: {}", topic)));
        }

        let percentage = score / max_score * 100.0;
        let entry = QuizEntry {
            topic: topic.to_string(),
            score,
            max_score,
            percentage: round2(percentage),
            date: Utc::now(),
            status: QuizStatus::from_percentage(percentage),
        };

        self.record.push_quiz(entry.clone());
        tracing::info!(
            user_id = %self.user_id,
            topic = topic,
            percentage = entry.percentage,
            status = ?entry.status,
            "Quiz score recorded"
        );

        self.save().await?;
        Ok(entry)
    }

    /// Re-recording the same task id appends another entry
    pub async fn record_task_completion(
        &mut self,
        task_id: &str,
        task_name: &str,
        time_spent_hours: f64,
    ) -> Result<TaskEntry, StudyError> {
        if !time_spent_hours.is_finite() || time_spent_hours < 0.0 {
            return Err(StudyError::invalid_input(
                format!("time_spent_hours must be a non-negative number, got {}", time_spent_hours),
                "record_task",
            ).with_context(format!("task_id: {}", task_id)));
        }

        let entry = TaskEntry {
            task_id: task_id.to_string(),
            task_name: task_name.to_string(),
            time_spent_hours,
            completed_at: Utc::now(),
        };

        self.record.completed_tasks.push(entry.clone());
        tracing::info!(user_id = %self.user_id, task_id = task_id, task_name = task_name, "Task completed");

        self.save().await?;
        Ok(entry)
    }

    pub async fn record_study_session<I, S>(
        &mut self,
        duration_minutes: f64,
        topics_covered: I,
    ) -> Result<SessionEntry, StudyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !duration_minutes.is_finite() || duration_minutes < 0.0 {
            return Err(StudyError::invalid_input(
                format!("duration_minutes must be a non-negative number, got {}", duration_minutes),
                "record_session",
            ));
        }

        let entry = SessionEntry {
            duration_minutes,
            topics_covered: topics_covered.into_iter().map(Into::into).collect::<BTreeSet<String>>(),
            date: Utc::now(),
        };

        self.record.study_sessions.push(entry.clone());
        tracing::info!(
            user_id = %self.user_id,
            duration_minutes = duration_minutes,
            topics = entry.topics_covered.len(),
            "Study session recorded"
        );

        self.save().await?;
        Ok(entry)
    }

    pub fn get_topic_performance(&self) -> BTreeMap<String, TopicPerformance> {
        report::topic_performance(&self.record)
    }

    pub fn get_weak_topics(&self) -> &[String] {
        &self.record.weak_topics
    }

    pub fn get_completion_rate(&self, total_tasks: usize) -> CompletionStats {
        report::completion_rate(&self.record, total_tasks)
    }

    pub fn get_study_time_stats(&self) -> StudyTimeStats {
        report::study_time_stats(&self.record)
    }

    pub fn get_recommendations(&self) -> Vec<String> {
        report::recommendations(&self.record)
    }

    pub fn generate_performance_report(&self, total_tasks: usize) -> PerformanceReport {
        report::build_report(&self.user_id, &self.record, total_tasks)
    }

    /// Drop all history and start a new record
    pub async fn clear_data(&mut self) -> Result<(), StudyError> {
        self.record = PerformanceRecord::new();
        tracing::info!(user_id = %self.user_id, "Performance data cleared");
        self.save().await
    }
}
