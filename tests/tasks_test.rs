use studypal_lib::error::ErrorKind;
use studypal_lib::planner::{StudyPlan, Subtask};
use studypal_lib::tasks::{Priority, TodoList};
use tempfile::TempDir;

fn subtask(name: &str, hours: f64, priority: &str) -> Subtask {
    Subtask {
        task: name.to_string(),
        estimated_hours: hours,
        priority: priority.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_add_complete_delete() {
    let dir = TempDir::new().unwrap();
    let mut todos = TodoList::open(dir.path(), "alice").await.unwrap();

    let read = todos.add_task("Read chapter 1", 2.0, Priority::High).await.unwrap();
    let drill = todos.add_task("Drill exercises", 1.0, Priority::Low).await.unwrap();
    assert_ne!(read.id, drill.id);
    assert!(!read.completed);

    assert!(todos.complete_task(&read.id).await.unwrap());
    assert!(!todos.complete_task("missing").await.unwrap());
    assert_eq!(todos.pending().len(), 1);
    assert_eq!(todos.completed()[0].name, "Read chapter 1");
    assert!(todos.completed()[0].completed_at.is_some());

    let stats = todos.completion_stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.percentage, 50.0);

    assert!(todos.delete_task(&drill.id).await.unwrap());
    assert!(!todos.delete_task(&drill.id).await.unwrap());

    let reloaded = TodoList::open(dir.path(), "alice").await.unwrap();
    assert_eq!(reloaded.tasks(), todos.tasks());
}

#[tokio::test]
async fn test_completing_twice_keeps_first_timestamp() {
    let dir = TempDir::new().unwrap();
    let mut todos = TodoList::open(dir.path(), "alice").await.unwrap();
    let task = todos.add_task("Summarise notes", 1.0, Priority::Medium).await.unwrap();

    assert!(todos.complete_task(&task.id).await.unwrap());
    let first = todos.completed()[0].completed_at;

    assert!(!todos.complete_task(&task.id).await.unwrap());
    assert_eq!(todos.completed()[0].completed_at, first);
    assert_eq!(todos.completion_stats().completed, 1);
}

#[tokio::test]
async fn test_empty_list_stats() {
    let dir = TempDir::new().unwrap();
    let todos = TodoList::open(dir.path(), "alice").await.unwrap();
    let stats = todos.completion_stats();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.percentage, 0.0);
}

#[tokio::test]
async fn test_invalid_task_rejected() {
    let dir = TempDir::new().unwrap();
    let mut todos = TodoList::open(dir.path(), "alice").await.unwrap();

    let err = todos.add_task("  ", 1.0, Priority::Medium).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    let err = todos.add_task("Read", -1.0, Priority::Medium).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    assert!(todos.tasks().is_empty());
}

#[tokio::test]
async fn test_import_skips_existing_names() {
    let dir = TempDir::new().unwrap();
    let mut todos = TodoList::open(dir.path(), "alice").await.unwrap();
    todos.add_task("Ownership", 3.0, Priority::Low).await.unwrap();

    let plan = StudyPlan {
        subtasks: vec![
            subtask("Ownership", 6.0, "high"),
            subtask("Traits", 4.0, "HIGH"),
            subtask("Lifetimes", 5.0, "critical"),
            subtask("Traits", 4.0, "low"),
        ],
        ..Default::default()
    };

    assert_eq!(todos.import_from_study_plan(&plan).await.unwrap(), 2);
    assert_eq!(todos.import_from_study_plan(&plan).await.unwrap(), 0);

    let names: Vec<&str> = todos.tasks().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Ownership", "Traits", "Lifetimes"]);
    assert_eq!(todos.tasks()[0].estimated_hours, 3.0);
    assert_eq!(todos.tasks()[1].priority, Priority::High);
    assert_eq!(todos.tasks()[2].priority, Priority::Medium);
}

#[test]
fn test_priority_labels() {
    assert_eq!("Low".parse::<Priority>().unwrap(), Priority::Low);
    assert!("soon".parse::<Priority>().is_err());
    assert_eq!(Priority::from_label("soon"), Priority::Medium);
    assert_eq!(serde_json::to_value(Priority::High).unwrap(), "high");
}

#[tokio::test]
async fn test_document_shape() {
    let dir = TempDir::new().unwrap();
    let mut todos = TodoList::open(dir.path(), "alice").await.unwrap();
    todos.add_task("Read", 1.0, Priority::Medium).await.unwrap();

    let raw = std::fs::read_to_string(dir.path().join("alice_todos.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let task = &value["tasks"][0];
    assert_eq!(task["name"], "Read");
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["completed"], false);
    assert!(task["completed_at"].is_null());
    assert_eq!(task["id"].as_str().unwrap().len(), 36);
}
