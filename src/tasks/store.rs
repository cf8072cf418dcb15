use std::path::Path;
use crate::error::StudyError;
use crate::logging::log_persist;
use crate::performance::model::round2;
use crate::planner::model::StudyPlan;
use crate::storage;
use crate::tasks::model::{Priority, TodoDocument, TodoStats, TodoTask};

/// One user's to-do list, saved in full after every change
#[derive(Debug)]
pub struct TodoList {
    user_id: String,
    path: std::path::PathBuf,
    document: TodoDocument,
}

impl TodoList {
    pub async fn open(user_data_dir: &Path, user_id: &str) -> Result<Self, StudyError> {
        let path = storage::user_document_path(user_data_dir, user_id, "todos")?;
        let document = storage::read_json::<TodoDocument>(&path).await?.unwrap_or_default();
        tracing::debug!(user_id = user_id, tasks = document.tasks.len(), "Todo list loaded");
        Ok(TodoList {
            user_id: user_id.to_string(),
            path,
            document,
        })
    }

    pub fn tasks(&self) -> &[TodoTask] {
        &self.document.tasks
    }

    pub async fn save(&self) -> Result<(), StudyError> {
        let result = storage::write_json(&self.path, &self.document).await;
        log_persist("todos", &self.user_id, result.is_ok());
        result
    }

    pub async fn add_task(
        &mut self,
        name: &str,
        estimated_hours: f64,
        priority: Priority,
    ) -> Result<TodoTask, StudyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudyError::invalid_input("Task name must not be empty", "todo_add"));
        }
        if !estimated_hours.is_finite() || estimated_hours < 0.0 {
            return Err(StudyError::invalid_input(
                format!("Estimated hours must be a non-negative number, got {}", estimated_hours),
                "todo_add",
            ));
        }

        let task = TodoTask::new(name.to_string(), estimated_hours, priority);
        self.document.tasks.push(task.clone());
        self.save().await?;
        Ok(task)
    }

    /// Mark a pending task done. False when no pending task has that id;
    /// an already completed task keeps its original `completed_at`.
    pub async fn complete_task(&mut self, id: &str) -> Result<bool, StudyError> {
        let Some(task) = self
            .document
            .tasks
            .iter_mut()
            .find(|t| t.id == id && !t.completed)
        else {
            return Ok(false);
        };
        task.completed = true;
        task.completed_at = Some(chrono::Utc::now());
        self.save().await?;
        Ok(true)
    }

    pub async fn delete_task(&mut self, id: &str) -> Result<bool, StudyError> {
        let before = self.document.tasks.len();
        self.document.tasks.retain(|t| t.id != id);
        if self.document.tasks.len() == before {
            return Ok(false);
        }
        self.save().await?;
        Ok(true)
    }

    pub fn pending(&self) -> Vec<&TodoTask> {
        self.document.tasks.iter().filter(|t| !t.completed).collect()
    }

    pub fn completed(&self) -> Vec<&TodoTask> {
        self.document.tasks.iter().filter(|t| t.completed).collect()
    }

    pub fn completion_stats(&self) -> TodoStats {
        let total = self.document.tasks.len();
        let completed = self.completed().len();
        let percentage = if total > 0 {
            round2(completed as f64 / total as f64 * 100.0)
        } else {
            0.0
        };
        TodoStats {
            total,
            completed,
            pending: total - completed,
            percentage,
        }
    }

    /// Add a task per plan subtask whose name is not on the list yet.
    /// Returns how many were added; saves once.
    pub async fn import_from_study_plan(&mut self, plan: &StudyPlan) -> Result<usize, StudyError> {
        let mut imported = 0;
        for subtask in &plan.subtasks {
            let name = subtask.task.trim();
            if name.is_empty() || self.document.tasks.iter().any(|t| t.name == name) {
                continue;
            }
            let hours = if subtask.estimated_hours.is_finite() && subtask.estimated_hours >= 0.0 {
                subtask.estimated_hours
            } else {
                0.0
            };
            self.document.tasks.push(TodoTask::new(
                name.to_string(),
                hours,
                Priority::from_label(&subtask.priority),
            ));
            imported += 1;
        }

        if imported > 0 {
            self.save().await?;
        }
        tracing::info!(user_id = %self.user_id, imported = imported, "Imported tasks from study plan");
        Ok(imported)
    }
}
