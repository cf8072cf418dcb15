use serde::{Serialize, Deserialize};
use std::fmt;

/// Broad category of a failure, used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input to a recording or planning operation
    InvalidInput,
    /// Reading or writing a persisted document failed
    IoFailure,
    /// A persisted document could not be (de)serialized
    Serialization,
    /// The generation service answered, but not in the expected shape
    GenerationParseFailure,
    /// The generation service did not answer in time
    GenerationTimeout,
    /// The generation service errored or could not be reached
    GenerationUnavailable,
    /// A generation request is already outstanding for this session
    Busy,
    /// A referenced plan, task or quiz slice does not exist
    NotFound,
    /// Configuration could not be loaded or is incomplete
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::IoFailure => "io_failure",
            ErrorKind::Serialization => "serialization",
            ErrorKind::GenerationParseFailure => "generation_parse_failure",
            ErrorKind::GenerationTimeout => "generation_timeout",
            ErrorKind::GenerationUnavailable => "generation_unavailable",
            ErrorKind::Busy => "busy",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Config => "config",
        };
        f.write_str(label)
    }
}

/// Unified error type for the whole crate.
/// Every fallible operation returns Result<T, StudyError>.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyError {
    pub kind: ErrorKind,
    pub message: String,
    pub stage: String,
    pub model: Option<String>,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl StudyError {
    /// Create a new error with kind, message and stage
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S, stage: &'static str) -> Self {
        StudyError {
            kind,
            message: message.into(),
            stage: stage.to_string(),
            model: None,
            context: None,
            source: None,
        }
    }

    pub fn invalid_input<S: Into<String>>(message: S, stage: &'static str) -> Self {
        Self::new(ErrorKind::InvalidInput, message, stage)
    }

    pub fn io<S: Into<String>>(message: S, stage: &'static str) -> Self {
        Self::new(ErrorKind::IoFailure, message, stage)
    }

    pub fn not_found<S: Into<String>>(message: S, stage: &'static str) -> Self {
        Self::new(ErrorKind::NotFound, message, stage)
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Config, message, "config")
    }

    /// Add model context to the error
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Add additional context information
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add source error information
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    /// True for failures of the external generation service itself
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::GenerationTimeout
                | ErrorKind::GenerationUnavailable
                | ErrorKind::GenerationParseFailure
        )
    }
}

impl fmt::Display for StudyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)?;
        if let Some(ref model) = self.model {
            write!(f, " (model: {})", model)?;
        }
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StudyError {}

impl From<std::io::Error> for StudyError {
    fn from(err: std::io::Error) -> Self {
        StudyError::io(format!("I/O error: {}", err), "io").with_source("std::io")
    }
}

impl From<serde_json::Error> for StudyError {
    fn from(err: serde_json::Error) -> Self {
        StudyError::new(
            ErrorKind::Serialization,
            format!("JSON error: {}", err),
            "json_parse",
        )
        .with_source("serde_json")
    }
}

impl From<toml::de::Error> for StudyError {
    fn from(err: toml::de::Error) -> Self {
        StudyError::config(format!("TOML error: {}", err)).with_source("toml")
    }
}

impl From<reqwest::Error> for StudyError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::GenerationTimeout
        } else {
            ErrorKind::GenerationUnavailable
        };
        StudyError::new(kind, format!("HTTP error: {}", err), "generation").with_source("reqwest")
    }
}

impl From<tokio::time::error::Elapsed> for StudyError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        StudyError::new(ErrorKind::GenerationTimeout, "Operation timed out", "timeout")
            .with_source("tokio::time")
    }
}
