use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Percentage at or above which a quiz counts as passed
pub const PASS_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    Pass,
    NeedsImprovement,
}

impl QuizStatus {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= PASS_THRESHOLD {
            QuizStatus::Pass
        } else {
            QuizStatus::NeedsImprovement
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizEntry {
    pub topic: String,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub date: DateTime<Utc>,
    pub status: QuizStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEntry {
    pub task_id: String,
    pub task_name: String,
    pub time_spent_hours: f64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub duration_minutes: f64,
    pub topics_covered: BTreeSet<String>,
    pub date: DateTime<Utc>,
}

/// Everything we know about one user's learning history.
/// Persisted in full after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    #[serde(default)]
    pub quiz_scores: Vec<QuizEntry>,
    #[serde(default)]
    pub completed_tasks: Vec<TaskEntry>,
    #[serde(default)]
    pub study_sessions: Vec<SessionEntry>,
    /// Topics whose latest quiz is below the pass threshold, in first-failed order
    #[serde(default)]
    pub weak_topics: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl PerformanceRecord {
    pub fn new() -> Self {
        PerformanceRecord {
            quiz_scores: Vec::new(),
            completed_tasks: Vec::new(),
            study_sessions: Vec::new(),
            weak_topics: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Append a quiz and move its topic in or out of the weak set.
    /// Only the newest entry for a topic decides membership.
    pub fn push_quiz(&mut self, entry: QuizEntry) {
        match entry.status {
            QuizStatus::NeedsImprovement => {
                if !self.weak_topics.iter().any(|t| t == &entry.topic) {
                    self.weak_topics.push(entry.topic.clone());
                }
            }
            QuizStatus::Pass => {
                self.weak_topics.retain(|t| t != &entry.topic);
            }
        }
        self.quiz_scores.push(entry);
    }
}

impl Default for PerformanceRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Round to two decimals, the precision every derived number is reported with
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
