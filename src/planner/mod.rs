//! Study plans: creation, storage, quiz matching and adaptation.

pub mod adapter;
pub mod builder;
pub mod matching;
pub mod model;
pub mod prompts;
pub mod store;

pub use adapter::{interpret_response, PlanAdapter};
pub use builder::StudyPlanner;
pub use matching::{clean_topic, filter_quizzes_for_plan, quiz_matches_goal};
pub use model::{
    Adaptation, AdaptationQuality, AdaptationResult, AdjustedHours, DailySchedule, DegradeReason,
    KnowledgeLevel, Milestone, PerformanceSlice, PlanStatus, StoredPlan, StudyPlan, Subtask,
};
pub use store::{PlanEntry, PlanStore};
