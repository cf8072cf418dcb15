use std::path::{Path, PathBuf};
use crate::error::StudyError;
use crate::performance::model::PerformanceRecord;
use crate::storage;

/// Location of one user's performance document
#[derive(Debug, Clone)]
pub struct PerformanceStore {
    path: PathBuf,
}

impl PerformanceStore {
    pub fn new(user_data_dir: &Path, user_id: &str) -> Result<Self, StudyError> {
        let path = storage::user_document_path(user_data_dir, user_id, "performance")?;
        Ok(PerformanceStore { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record, or start a fresh one when none was saved yet.
    /// A corrupt document is an error rather than a silent reset.
    pub async fn load(&self) -> Result<PerformanceRecord, StudyError> {
        match storage::read_json::<PerformanceRecord>(&self.path).await? {
            Some(record) => Ok(record),
            None => {
                tracing::debug!(path = ?self.path, "No performance data yet, starting fresh");
                Ok(PerformanceRecord::new())
            }
        }
    }

    pub async fn save(&self, record: &PerformanceRecord) -> Result<(), StudyError> {
        storage::write_json(&self.path, record).await
    }
}
