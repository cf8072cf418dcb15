use crate::performance::QuizEntry;
use crate::planner::model::{PerformanceSlice, StudyPlan};

/// Lowercase alphanumerics; every other character becomes a space
pub fn clean_topic(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().collect::<String>()
            } else {
                " ".to_string()
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Whether a quiz topic belongs to a plan goal.
///
/// Matches when either cleaned string contains the other, or when any goal
/// word longer than three characters appears inside the topic.
pub fn quiz_matches_goal(goal: &str, topic: &str) -> bool {
    let goal = clean_topic(goal);
    let topic = clean_topic(topic);
    if goal.is_empty() || topic.is_empty() {
        return false;
    }

    topic.contains(&goal)
        || goal.contains(&topic)
        || goal
            .split_whitespace()
            .filter(|word| word.chars().count() > 3)
            .any(|word| topic.contains(word))
}

/// Quiz entries relevant to `plan`, in recording order
pub fn filter_quizzes_for_plan(plan: &StudyPlan, quizzes: &[QuizEntry]) -> PerformanceSlice {
    let matched: Vec<QuizEntry> = quizzes
        .iter()
        .filter(|quiz| quiz_matches_goal(&plan.main_goal, &quiz.topic))
        .cloned()
        .collect();
    tracing::debug!(
        goal = %plan.main_goal,
        total = quizzes.len(),
        matched = matched.len(),
        "Filtered quizzes for plan"
    );
    PerformanceSlice::new(matched)
}
