use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::performance::model::{round2, PerformanceRecord, PASS_THRESHOLD};

/// Session length below which we suggest longer sittings
const SHORT_SESSION_MINUTES: f64 = 30.0;
/// Overall average above which we suggest harder material
const ADVANCE_THRESHOLD: f64 = 85.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicPerformance {
    pub average_score: f64,
    pub attempts: usize,
    pub latest_score: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionStats {
    pub completed: usize,
    pub total: usize,
    /// Negative when more completions were recorded than tasks planned
    pub pending: i64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyTimeStats {
    pub total_hours: f64,
    pub total_sessions: usize,
    pub average_session_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub user_id: String,
    pub report_date: DateTime<Utc>,
    pub quiz_performance: BTreeMap<String, TopicPerformance>,
    pub weak_topics: Vec<String>,
    pub completion_stats: CompletionStats,
    pub study_time: StudyTimeStats,
    pub total_quizzes: usize,
    pub recommendations: Vec<String>,
}

/// Group quiz percentages by topic and summarise each group
pub fn topic_performance(record: &PerformanceRecord) -> BTreeMap<String, TopicPerformance> {
    let mut by_topic: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for quiz in &record.quiz_scores {
        by_topic.entry(quiz.topic.as_str()).or_default().push(quiz.percentage);
    }

    by_topic
        .into_iter()
        .filter_map(|(topic, scores)| {
            let first = *scores.first()?;
            let latest = *scores.last()?;
            let trend = if scores.len() > 1 && latest > first {
                Trend::Improving
            } else {
                Trend::Stable
            };
            let average = scores.iter().sum::<f64>() / scores.len() as f64;
            Some((
                topic.to_string(),
                TopicPerformance {
                    average_score: round2(average),
                    attempts: scores.len(),
                    latest_score: latest,
                    trend,
                },
            ))
        })
        .collect()
}

pub fn completion_rate(record: &PerformanceRecord, total_tasks: usize) -> CompletionStats {
    let completed = record.completed_tasks.len();
    let rate = if total_tasks > 0 {
        completed as f64 / total_tasks as f64 * 100.0
    } else {
        0.0
    };

    CompletionStats {
        completed,
        total: total_tasks,
        pending: total_tasks as i64 - completed as i64,
        completion_rate: round2(rate),
    }
}

pub fn study_time_stats(record: &PerformanceRecord) -> StudyTimeStats {
    let sessions = &record.study_sessions;
    if sessions.is_empty() {
        return StudyTimeStats {
            total_hours: 0.0,
            total_sessions: 0,
            average_session_minutes: 0.0,
        };
    }

    let total_minutes: f64 = sessions.iter().map(|s| s.duration_minutes).sum();
    StudyTimeStats {
        total_hours: round2(total_minutes / 60.0),
        total_sessions: sessions.len(),
        average_session_minutes: round2(total_minutes / sessions.len() as f64),
    }
}

/// Rule-based study advice. Never empty.
pub fn recommendations(record: &PerformanceRecord) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !record.weak_topics.is_empty() {
        recommendations.push(format!("Focus on improving: {}", record.weak_topics.join(", ")));
        recommendations.push("Consider revisiting fundamentals for weak topics".to_string());
    }

    let stats = study_time_stats(record);
    if stats.total_sessions > 0 && stats.average_session_minutes < SHORT_SESSION_MINUTES {
        recommendations.push("Try longer study sessions (45-60 minutes) for better retention".to_string());
    }

    let topics = topic_performance(record);
    if !topics.is_empty() {
        let overall = topics.values().map(|t| t.average_score).sum::<f64>() / topics.len() as f64;
        if overall < PASS_THRESHOLD {
            recommendations.push("Consider slowing down pace to improve understanding".to_string());
        } else if overall > ADVANCE_THRESHOLD {
            recommendations.push("Great progress! Consider advancing to more challenging topics".to_string());
        }
    }

    if recommendations.is_empty() {
        recommendations.push("Keep up the good work! Stay consistent.".to_string());
    }

    recommendations
}

/// Snapshot of every derived statistic. Pure read of `record`.
pub fn build_report(user_id: &str, record: &PerformanceRecord, total_tasks: usize) -> PerformanceReport {
    PerformanceReport {
        user_id: user_id.to_string(),
        report_date: Utc::now(),
        quiz_performance: topic_performance(record),
        weak_topics: record.weak_topics.clone(),
        completion_stats: completion_rate(record, total_tasks),
        study_time: study_time_stats(record),
        total_quizzes: record.quiz_scores.len(),
        recommendations: recommendations(record),
    }
}
