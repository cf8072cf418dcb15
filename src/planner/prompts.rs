use chrono::NaiveDate;
use crate::planner::model::{KnowledgeLevel, PerformanceSlice, StudyPlan};

pub const PLANNER_SYSTEM: &str = "You are an expert educational planner who creates realistic, achievable study plans. Always return valid JSON.";

pub const COACH_SYSTEM: &str = "You are an adaptive learning coach who gives specific, structured recommendations in JSON.";

/// Inputs to a plan-creation prompt
#[derive(Debug, Clone)]
pub struct PlanRequest<'a> {
    pub goal: &'a str,
    pub deadline: NaiveDate,
    pub daily_hours: f64,
    pub total_hours: f64,
    pub days_available: i64,
    pub level: KnowledgeLevel,
    pub today: NaiveDate,
}

pub fn build_plan_prompt(req: &PlanRequest<'_>) -> String {
    let first_day = req.today.succ_opt().unwrap_or(req.today);
    let first_milestone = first_day + chrono::Duration::days(7.min(req.days_available.max(1)));

    format!(
        r#"You are an expert study planner. Create a detailed, realistic study plan in JSON format.

Goal: {goal}
Deadline: {deadline} ({days} days from now)
Daily Study Hours: {daily}
Total Available Hours: {total}
Current Knowledge Level: {level}

Create a comprehensive study plan with:
1. Main goal broken into 5-8 subtasks (topics/chapters)
2. Daily schedule with specific topics for each day
3. Weekly milestones (checkpoints)
4. Recommended resources for each subtask

Return ONLY valid JSON in this exact format:
{{
    "main_goal": "{goal}",
    "total_hours": {total},
    "days_available": {days},
    "subtasks": [
        {{
            "task_id": 1,
            "task": "Task name",
            "description": "What to learn",
            "estimated_hours": 10,
            "priority": "high",
            "resources": ["Resource 1", "Resource 2"]
        }}
    ],
    "daily_schedule": [
        {{
            "day": 1,
            "date": "{first_day}",
            "topics": ["Topic 1", "Topic 2"],
            "duration_hours": {daily},
            "tasks": ["Read Chapter 1", "Complete exercises"]
        }}
    ],
    "milestones": [
        {{
            "milestone": "Complete fundamentals",
            "due_date": "{first_milestone}",
            "tasks_to_complete": [1, 2]
        }}
    ]
}}

Make the plan realistic, achievable, and well-structured. Include specific actionable tasks."#,
        goal = req.goal,
        deadline = req.deadline.format("%Y-%m-%d"),
        days = req.days_available,
        daily = req.daily_hours,
        total = req.total_hours,
        level = req.level,
        first_day = first_day.format("%Y-%m-%d"),
        first_milestone = first_milestone.format("%Y-%m-%d"),
    )
}

/// Prompt asking for revisions of `plan` given the quiz slice.
/// `slice_json` is the pretty-printed [`PerformanceSlice`].
pub fn build_adapt_prompt(plan: &StudyPlan, slice: &PerformanceSlice, slice_json: &str) -> String {
    let goal = if plan.main_goal.trim().is_empty() {
        "N/A"
    } else {
        plan.main_goal.as_str()
    };

    format!(
        r#"Based on the current study plan and performance data below, suggest *actionable* study adaptations.
Current Plan Summary:
- Goal: {goal}
- Progress: {count} quizzes completed

Performance Data:
{slice_json}

Provide your answer in JSON with these keys:
- recommendations: ["Tip 1", "Tip 2", ...]
- adjusted_hours: [{{"topic": ..., "current_hours": ..., "recommended_hours": ...}}, ...]
- focus_topics: ["topic1", "topic2", ...]
- motivational_tips: ["tip1", "tip2", ...]

Example:
{{
"recommendations": ["Review Java basics", "Add 2 hours to topic X"],
"adjusted_hours": [{{"topic": "Java Inheritance", "current_hours": 4, "recommended_hours": 7}}],
"focus_topics": ["Java Inheritance", "Polymorphism"],
"motivational_tips": ["You're making progress!", "Keep practicing on weak areas"]
}}

DO NOT return markdown or code, just valid JSON."#,
        goal = goal,
        count = slice.quiz_scores.len(),
        slice_json = slice_json,
    )
}
