use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::performance::QuizEntry;

/// A generated study plan as returned by the generation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StudyPlan {
    #[serde(default)]
    pub main_goal: String,
    #[serde(default, deserialize_with = "deserialize_hours")]
    pub total_hours: f64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub days_available: i64,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub daily_schedule: Vec<DailySchedule>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Subtask {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub task_id: i64,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_hours")]
    pub estimated_hours: f64,
    /// Free-form label from the model; mapped to a task priority on import
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DailySchedule {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub day: i64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_hours")]
    pub duration_hours: f64,
    #[serde(default)]
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Milestone {
    #[serde(default)]
    pub milestone: String,
    #[serde(default)]
    pub due_date: String,
    /// Subtask ids; models emit numbers or strings
    #[serde(default)]
    pub tasks_to_complete: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

/// A plan as persisted: the generated content plus bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPlan {
    #[serde(flatten)]
    pub plan: StudyPlan,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: PlanStatus,
}

impl StoredPlan {
    pub fn new(plan: StudyPlan, created_at: DateTime<Utc>) -> Self {
        StoredPlan {
            plan,
            created_at,
            status: PlanStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for KnowledgeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KnowledgeLevel::Beginner => "beginner",
            KnowledgeLevel::Intermediate => "intermediate",
            KnowledgeLevel::Advanced => "advanced",
        })
    }
}

impl FromStr for KnowledgeLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(KnowledgeLevel::Beginner),
            "intermediate" => Ok(KnowledgeLevel::Intermediate),
            "advanced" => Ok(KnowledgeLevel::Advanced),
            other => Err(format!("unknown knowledge level '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AdjustedHours {
    #[serde(default)]
    pub topic: String,
    #[serde(default, deserialize_with = "deserialize_hours")]
    pub current_hours: f64,
    #[serde(default, deserialize_with = "deserialize_hours")]
    pub recommended_hours: f64,
}

/// Revision suggestions for a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationResult {
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub adjusted_hours: Vec<AdjustedHours>,
    #[serde(default)]
    pub focus_topics: Vec<String>,
    #[serde(default)]
    pub motivational_tips: Vec<String>,
    #[serde(default = "Utc::now")]
    pub adapted_at: DateTime<Utc>,
}

const SUGGESTION_KEYS: [&str; 4] = [
    "recommendations",
    "adjusted_hours",
    "focus_topics",
    "motivational_tips",
];

impl AdaptationResult {
    /// Result carrying nothing but a timestamp
    pub fn empty() -> Self {
        AdaptationResult {
            recommendations: Vec::new(),
            adjusted_hours: Vec::new(),
            focus_topics: Vec::new(),
            motivational_tips: Vec::new(),
            adapted_at: Utc::now(),
        }
    }

    /// Keep an unparseable response as the single recommendation
    pub fn degraded(raw: &str) -> Self {
        let mut result = Self::empty();
        let text = raw.trim();
        if !text.is_empty() {
            result.recommendations.push(text.to_string());
        }
        result
    }

    /// Whether `value` is an object naming at least one suggestion list.
    /// Empty lists still count; only the keys decide.
    pub fn has_suggestion_keys(value: &serde_json::Value) -> bool {
        value
            .as_object()
            .is_some_and(|map| SUGGESTION_KEYS.iter().any(|key| map.contains_key(*key)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradeReason {
    ParseFailure,
    Timeout,
    Unavailable,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdaptationQuality {
    Structured,
    Degraded { reason: DegradeReason },
}

/// What the adapter hands back: always a result, plus how much to trust it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adaptation {
    #[serde(flatten)]
    pub result: AdaptationResult,
    pub quality: AdaptationQuality,
}

impl Adaptation {
    pub fn structured(result: AdaptationResult) -> Self {
        Adaptation {
            result,
            quality: AdaptationQuality::Structured,
        }
    }

    pub fn degraded(result: AdaptationResult, reason: DegradeReason) -> Self {
        Adaptation {
            result,
            quality: AdaptationQuality::Degraded { reason },
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.quality, AdaptationQuality::Degraded { .. })
    }
}

/// The performance subset sent along with a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PerformanceSlice {
    pub quiz_scores: Vec<QuizEntry>,
}

impl PerformanceSlice {
    pub fn new(quiz_scores: Vec<QuizEntry>) -> Self {
        PerformanceSlice { quiz_scores }
    }

    pub fn is_empty(&self) -> bool {
        self.quiz_scores.is_empty()
    }
}

// Models write hours as 10, 10.5, "10" or "10.5"
fn deserialize_hours<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct HoursVisitor;

    impl<'de> Visitor<'de> for HoursVisitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or numeric string")
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<f64, E> {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
        }

        fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }
    }

    deserializer.deserialize_any(HoursVisitor)
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let hours = deserialize_hours(deserializer)?;
    Ok(hours.round() as i64)
}
