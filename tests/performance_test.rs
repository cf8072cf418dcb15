use chrono::Utc;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use studypal_lib::error::ErrorKind;
use studypal_lib::performance::{
    PerformanceRecord, PerformanceStore, PerformanceTracker, QuizEntry, QuizStatus, Trend,
};
use tempfile::TempDir;

async fn tracker(dir: &TempDir) -> PerformanceTracker {
    PerformanceTracker::open(dir.path(), "alice").await.unwrap()
}

#[tokio::test]
async fn test_quiz_below_threshold_marks_topic_weak() {
    let dir = TempDir::new().unwrap();
    let mut t = tracker(&dir).await;

    let entry = t.record_quiz_score("T", 60.0, 100.0).await.unwrap();
    assert_eq!(entry.percentage, 60.0);
    assert_eq!(entry.status, QuizStatus::NeedsImprovement);
    assert_eq!(t.get_weak_topics(), ["T".to_string()]);

    t.record_quiz_score("T", 100.0, 100.0).await.unwrap();
    assert!(t.get_weak_topics().is_empty());
}

#[tokio::test]
async fn test_exactly_seventy_percent_passes() {
    let dir = TempDir::new().unwrap();
    let mut t = tracker(&dir).await;

    let entry = t.record_quiz_score("Graphs", 7.0, 10.0).await.unwrap();
    assert_eq!(entry.status, QuizStatus::Pass);
    assert!(t.get_weak_topics().is_empty());
}

#[tokio::test]
async fn test_algebra_scenario() {
    let dir = TempDir::new().unwrap();
    let mut t = tracker(&dir).await;

    for score in [50.0, 80.0, 90.0] {
        t.record_quiz_score("Algebra", score, 100.0).await.unwrap();
    }

    let perf = t.get_topic_performance();
    let algebra = &perf["Algebra"];
    assert_eq!(algebra.average_score, 73.33);
    assert_eq!(algebra.attempts, 3);
    assert_eq!(algebra.latest_score, 90.0);
    assert_eq!(algebra.trend, Trend::Improving);
    assert!(!t.get_weak_topics().contains(&"Algebra".to_string()));
}

#[tokio::test]
async fn test_single_attempt_is_stable() {
    let dir = TempDir::new().unwrap();
    let mut t = tracker(&dir).await;
    t.record_quiz_score("Sets", 90.0, 100.0).await.unwrap();
    t.record_quiz_score("Logic", 90.0, 100.0).await.unwrap();
    t.record_quiz_score("Logic", 40.0, 100.0).await.unwrap();

    let perf = t.get_topic_performance();
    assert_eq!(perf["Sets"].trend, Trend::Stable);
    assert_eq!(perf["Logic"].trend, Trend::Stable);
}

#[tokio::test]
async fn test_invalid_scores_rejected() {
    let dir = TempDir::new().unwrap();
    let mut t = tracker(&dir).await;

    for (score, max) in [(5.0, 0.0), (5.0, -10.0), (-1.0, 10.0), (f64::NAN, 10.0), (5.0, f64::INFINITY)] {
        let err = t.record_quiz_score("T", score, max).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }
    assert!(t.record().quiz_scores.is_empty());

    let err = t.record_task_completion("1", "Read", -2.0).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    let err = t.record_study_session(f64::NAN, ["x"]).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_completion_rate() {
    let dir = TempDir::new().unwrap();
    let mut t = tracker(&dir).await;

    let empty = t.get_completion_rate(0);
    assert_eq!(empty.completion_rate, 0.0);
    assert_eq!(empty.pending, 0);

    t.record_task_completion("1", "Chapter 1", 1.5).await.unwrap();
    t.record_task_completion("1", "Chapter 1", 1.5).await.unwrap();
    assert_eq!(t.record().completed_tasks.len(), 2);

    let stats = t.get_completion_rate(3);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.completion_rate, 66.67);

    // More completions than planned tasks
    let over = t.get_completion_rate(1);
    assert_eq!(over.pending, -1);
    assert_eq!(over.completion_rate, 200.0);
}

#[tokio::test]
async fn test_study_time_stats() {
    let dir = TempDir::new().unwrap();
    let mut t = tracker(&dir).await;

    let zero = t.get_study_time_stats();
    assert_eq!(zero.total_hours, 0.0);
    assert_eq!(zero.total_sessions, 0);
    assert_eq!(zero.average_session_minutes, 0.0);

    t.record_study_session(50.0, ["Algebra", "Algebra", "Graphs"]).await.unwrap();
    let entry = t.record_study_session(20.0, Vec::<String>::new()).await.unwrap();
    assert!(entry.topics_covered.is_empty());
    assert_eq!(t.record().study_sessions[0].topics_covered.len(), 2);

    let stats = t.get_study_time_stats();
    assert_eq!(stats.total_hours, 1.17);
    assert_eq!(stats.total_sessions, 2);
    assert_eq!(stats.average_session_minutes, 35.0);
}

#[tokio::test]
async fn test_recommendations() {
    let dir = TempDir::new().unwrap();
    let mut t = tracker(&dir).await;

    assert_eq!(t.get_recommendations(), vec!["Keep up the good work! Stay consistent."]);

    t.record_quiz_score("Calculus", 40.0, 100.0).await.unwrap();
    t.record_quiz_score("Statistics", 50.0, 100.0).await.unwrap();
    t.record_study_session(20.0, ["Calculus"]).await.unwrap();

    assert_eq!(
        t.get_recommendations(),
        vec![
            "Focus on improving: Calculus, Statistics",
            "Consider revisiting fundamentals for weak topics",
            "Try longer study sessions (45-60 minutes) for better retention",
            "Consider slowing down pace to improve understanding",
        ]
    );
}

#[tokio::test]
async fn test_high_scores_recommend_advancing() {
    let dir = TempDir::new().unwrap();
    let mut t = tracker(&dir).await;
    t.record_quiz_score("Rust", 95.0, 100.0).await.unwrap();
    t.record_study_session(60.0, ["Rust"]).await.unwrap();

    assert_eq!(
        t.get_recommendations(),
        vec!["Great progress! Consider advancing to more challenging topics"]
    );
}

#[tokio::test]
async fn test_report_on_empty_record() {
    let dir = TempDir::new().unwrap();
    let t = tracker(&dir).await;

    let report = t.generate_performance_report(10);
    assert_eq!(report.user_id, "alice");
    assert_eq!(report.total_quizzes, 0);
    assert!(report.quiz_performance.is_empty());
    assert_eq!(report.completion_stats.pending, 10);
    assert!(!report.recommendations.is_empty());
}

#[tokio::test]
async fn test_failed_save_keeps_entry_in_memory() {
    let dir = TempDir::new().unwrap();
    let mut t = tracker(&dir).await;

    // A directory where the document should be makes every write fail
    let blocker = t_path(&dir);
    std::fs::create_dir_all(&blocker).unwrap();

    let err = t.record_quiz_score("Physics", 30.0, 100.0).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::IoFailure);
    assert_eq!(t.record().quiz_scores.len(), 1);
    assert_eq!(t.get_weak_topics(), ["Physics".to_string()]);

    std::fs::remove_dir(&blocker).unwrap();
    t.save().await.unwrap();
    let reloaded = tracker(&dir).await;
    assert_eq!(reloaded.record().quiz_scores.len(), 1);
}

fn t_path(dir: &TempDir) -> std::path::PathBuf {
    PerformanceStore::new(dir.path(), "alice").unwrap().path().to_path_buf()
}

#[tokio::test]
async fn test_corrupt_document_is_not_reset() {
    let dir = TempDir::new().unwrap();
    std::fs::write(t_path(&dir), "{ not json").unwrap();

    let err = PerformanceTracker::open(dir.path(), "alice").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Serialization);
    assert_eq!(std::fs::read_to_string(t_path(&dir)).unwrap(), "{ not json");
}

#[tokio::test]
async fn test_clear_data_resets_everything() {
    let dir = TempDir::new().unwrap();
    let mut t = tracker(&dir).await;
    t.record_quiz_score("Algebra", 10.0, 100.0).await.unwrap();
    let created = t.record().created_at;

    t.clear_data().await.unwrap();

    assert!(t.record().quiz_scores.is_empty());
    assert!(t.get_weak_topics().is_empty());
    assert!(t.record().created_at >= created);
    let reloaded = tracker(&dir).await;
    assert!(reloaded.record().quiz_scores.is_empty());
}

#[tokio::test]
async fn test_user_id_with_path_is_rejected() {
    let dir = TempDir::new().unwrap();
    for bad in ["", "../bob", "a/b", "a\\b"] {
        let err = PerformanceTracker::open(dir.path(), bad).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }
}

fn quiz(topic: &str, percentage: f64) -> QuizEntry {
    QuizEntry {
        topic: topic.to_string(),
        score: percentage,
        max_score: 100.0,
        percentage,
        date: Utc::now(),
        status: QuizStatus::from_percentage(percentage),
    }
}

proptest! {
    #[test]
    fn weak_topics_follow_latest_quiz(
        quizzes in prop::collection::vec((0usize..4, 0.0f64..=100.0), 0..40)
    ) {
        let topics = ["Algebra", "Graphs", "Logic", "Sets"];
        let mut record = PerformanceRecord::new();
        let mut latest: HashMap<&str, f64> = HashMap::new();

        for (i, pct) in &quizzes {
            record.push_quiz(quiz(topics[*i], *pct));
            latest.insert(topics[*i], *pct);
        }

        let expected: BTreeSet<String> = latest
            .into_iter()
            .filter(|(_, pct)| *pct < 70.0)
            .map(|(topic, _)| topic.to_string())
            .collect();
        let actual: BTreeSet<String> = record.weak_topics.iter().cloned().collect();

        prop_assert_eq!(actual, expected);
        prop_assert_eq!(record.weak_topics.len(), record.weak_topics.iter().collect::<BTreeSet<_>>().len());
    }

    #[test]
    fn recommendations_never_empty(
        quizzes in prop::collection::vec((0usize..3, 0.0f64..=100.0), 0..10),
        sessions in prop::collection::vec(0.0f64..120.0, 0..5)
    ) {
        let topics = ["A", "B", "C"];
        let mut record = PerformanceRecord::new();
        for (i, pct) in quizzes {
            record.push_quiz(quiz(topics[i], pct));
        }
        for minutes in sessions {
            record.study_sessions.push(studypal_lib::performance::SessionEntry {
                duration_minutes: minutes,
                topics_covered: BTreeSet::new(),
                date: Utc::now(),
            });
        }
        prop_assert!(!studypal_lib::performance::report::recommendations(&record).is_empty());
    }

    #[test]
    fn record_survives_reload(
        quizzes in prop::collection::vec((0.0f64..1e6, 1e-3f64..1e6), 1..20),
        hours in prop::collection::vec(0.0f64..1e4, 0..5),
        minutes in prop::collection::vec(0.0f64..1e4, 0..5)
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let dir = TempDir::new().unwrap();
            let mut t = tracker(&dir).await;
            for (score, max_score) in &quizzes {
                t.record_quiz_score("Algebra", *score, *max_score).await.unwrap();
            }
            for (i, h) in hours.iter().enumerate() {
                t.record_task_completion(&format!("t-{i}"), "Exercises", *h).await.unwrap();
            }
            for m in &minutes {
                t.record_study_session(*m, ["Algebra"]).await.unwrap();
            }

            let reloaded = tracker(&dir).await;
            assert_eq!(reloaded.record(), t.record());
        });
    }
}
