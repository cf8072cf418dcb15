//! Whole-document JSON persistence shared by the per-user stores.
//!
//! Every document is written in full on each save (last write wins).

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{ErrorKind, StudyError};

/// Reject user ids that would escape the user data directory
pub fn validate_user_id(user_id: &str) -> Result<(), StudyError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(StudyError::invalid_input("User id must not be empty", "storage"));
    }
    if trimmed.contains('/') || trimmed.contains('\\') || trimmed.contains("..") {
        return Err(StudyError::invalid_input(
            format!("User id '{}' contains path characters", user_id),
            "storage",
        ));
    }
    Ok(())
}

/// Path of a per-user document, e.g. `<dir>/alice_performance.json`
pub fn user_document_path(dir: &Path, user_id: &str, suffix: &str) -> Result<PathBuf, StudyError> {
    validate_user_id(user_id)?;
    Ok(dir.join(format!("{}_{}.json", user_id, suffix)))
}

/// Read and parse a JSON document. A missing file is `Ok(None)`.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StudyError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => serde_json::from_str(&content)
            .map_err(|e| StudyError::new(
                ErrorKind::Serialization,
                format!("Failed to parse {}: {}", file_label(path), e),
                "json_parse",
            ).with_context(format!("path: {:?}", path)))
            .map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StudyError::io(
            format!("Failed to read {}: {}", file_label(path), e),
            "io",
        ).with_context(format!("path: {:?}", path))),
    }
}

/// Serialize and write a JSON document, creating parent directories
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StudyError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StudyError::io(
                format!("Failed to create directory: {}", e),
                "io",
            ).with_context(format!("path: {:?}", parent)))?;
    }

    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StudyError::new(
            ErrorKind::Serialization,
            format!("Failed to serialize {}: {}", file_label(path), e),
            "json_serialize",
        ))?;

    tokio::fs::write(path, json)
        .await
        .map_err(|e| StudyError::io(
            format!("Failed to write {}: {}", file_label(path), e),
            "io",
        ).with_context(format!("path: {:?}", path)))?;

    Ok(())
}

/// Remove a document. Returns false when it did not exist.
pub async fn remove_file(path: &Path) -> Result<bool, StudyError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StudyError::io(
            format!("Failed to delete {}: {}", file_label(path), e),
            "io",
        ).with_context(format!("path: {:?}", path))),
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
