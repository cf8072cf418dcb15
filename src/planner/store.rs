use serde::Serialize;
use std::path::{Path, PathBuf};
use crate::error::StudyError;
use crate::logging::log_persist;
use crate::planner::model::StoredPlan;
use crate::storage;

/// A saved plan as shown in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub file_name: String,
    /// Timestamp part of the file name
    pub label: String,
}

/// `(stamp, n)` for a label like `20240101120000_3`; the unsuffixed plan is n = 1
fn save_order(label: &str) -> (&str, u64) {
    match label.split_once('_') {
        Some((stamp, n)) => (stamp, n.parse().unwrap_or(u64::MAX)),
        None => (label, 1),
    }
}

/// One user's saved plans: `<user>_plan_<YYYYmmddHHMMSS>.json` files
#[derive(Debug, Clone)]
pub struct PlanStore {
    dir: PathBuf,
    user_id: String,
}

impl PlanStore {
    pub fn new(user_data_dir: &Path, user_id: &str) -> Result<Self, StudyError> {
        storage::validate_user_id(user_id)?;
        Ok(PlanStore {
            dir: user_data_dir.to_path_buf(),
            user_id: user_id.to_string(),
        })
    }

    fn prefix(&self) -> String {
        format!("{}_plan_", self.user_id)
    }

    /// Label of one of this user's plan files, or None for any other name
    fn label_of(&self, file_name: &str) -> Option<String> {
        let label = file_name
            .strip_prefix(&self.prefix())?
            .strip_suffix(".json")?;
        let well_formed = !label.is_empty()
            && label.chars().all(|c| c.is_ascii_digit() || c == '_')
            && label.starts_with(|c: char| c.is_ascii_digit());
        well_formed.then(|| label.to_string())
    }

    fn checked_path(&self, file_name: &str) -> Result<PathBuf, StudyError> {
        if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
            return Err(StudyError::invalid_input(
                format!("Plan file name '{}' contains path characters", file_name),
                "plan_store",
            ));
        }
        if self.label_of(file_name).is_none() {
            return Err(StudyError::invalid_input(
                format!("'{}' is not a plan file of user '{}'", file_name, self.user_id),
                "plan_store",
            ));
        }
        Ok(self.dir.join(file_name))
    }

    /// Persist a new plan and return its file name.
    /// Plans created within the same second get a numeric suffix.
    pub async fn save(&self, plan: &StoredPlan) -> Result<String, StudyError> {
        let stamp = plan.created_at.format("%Y%m%d%H%M%S").to_string();
        let mut file_name = format!("{}{}.json", self.prefix(), stamp);
        let mut n = 2;
        while tokio::fs::try_exists(self.dir.join(&file_name)).await.unwrap_or(false) {
            file_name = format!("{}{}_{}.json", self.prefix(), stamp, n);
            n += 1;
        }

        let result = storage::write_json(&self.dir.join(&file_name), plan).await;
        log_persist("plan", &self.user_id, result.is_ok());
        result?;
        Ok(file_name)
    }

    /// This user's plans, newest first
    pub async fn list(&self) -> Result<Vec<PlanEntry>, StudyError> {
        let mut read_dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StudyError::io(format!("Failed to list plans: {}", e), "plan_store")
                    .with_context(format!("path: {:?}", self.dir)))
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if let Some(label) = self.label_of(&file_name) {
                entries.push(PlanEntry { file_name, label });
            }
        }
        entries.sort_by(|a, b| save_order(&b.label).cmp(&save_order(&a.label)));
        Ok(entries)
    }

    /// Most recently saved plan, if any
    pub async fn latest(&self) -> Result<Option<(PlanEntry, StoredPlan)>, StudyError> {
        for entry in self.list().await? {
            if let Some(plan) = self.load(&entry.file_name).await? {
                return Ok(Some((entry, plan)));
            }
        }
        Ok(None)
    }

    pub async fn load(&self, file_name: &str) -> Result<Option<StoredPlan>, StudyError> {
        let path = self.checked_path(file_name)?;
        storage::read_json(&path).await
    }

    pub async fn delete(&self, file_name: &str) -> Result<bool, StudyError> {
        let path = self.checked_path(file_name)?;
        let removed = storage::remove_file(&path).await?;
        if removed {
            tracing::info!(user_id = %self.user_id, file_name = file_name, "Plan deleted");
        }
        Ok(removed)
    }
}
