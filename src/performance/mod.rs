//! Per-user learning signals and the statistics derived from them.

pub mod model;
pub mod report;
pub mod store;
pub mod tracker;

pub use model::{PerformanceRecord, QuizEntry, QuizStatus, SessionEntry, TaskEntry, PASS_THRESHOLD};
pub use report::{CompletionStats, PerformanceReport, StudyTimeStats, TopicPerformance, Trend};
pub use store::PerformanceStore;
pub use tracker::PerformanceTracker;
