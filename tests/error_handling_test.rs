use studypal_lib::error::{ErrorKind, StudyError};

#[test]
fn test_error_creation() {
    let error = StudyError::new(ErrorKind::InvalidInput, "Test error", "test_stage");
    assert_eq!(error.kind, ErrorKind::InvalidInput);
    assert_eq!(error.message, "Test error");
    assert_eq!(error.stage, "test_stage");
}

#[test]
fn test_error_with_context() {
    let error = StudyError::io("Test error", "test_stage").with_context("Additional context");
    assert_eq!(error.context.as_deref(), Some("Additional context"));
}

#[test]
fn test_error_with_model() {
    let error = StudyError::new(ErrorKind::GenerationTimeout, "Test error", "test_stage")
        .with_model("test-model");
    assert_eq!(error.model.as_deref(), Some("test-model"));
    assert!(error.is_generation_failure());
}

#[test]
fn test_error_display() {
    let error = StudyError::not_found("Test error", "test_stage")
        .with_context("context")
        .with_model("model");
    let display = format!("{}", error);
    assert!(display.starts_with("[test_stage] Test error"));
    assert!(display.contains("(model: model)"));
    assert!(display.contains("(context: context)"));
}

#[test]
fn test_io_error_maps_to_io_failure() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error = StudyError::from(io);
    assert_eq!(error.kind, ErrorKind::IoFailure);
    assert!(!error.is_generation_failure());
}

#[test]
fn test_json_error_maps_to_serialization() {
    let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
    assert_eq!(StudyError::from(json_err).kind, ErrorKind::Serialization);
}

#[test]
fn test_kind_serializes_snake_case() {
    let value = serde_json::to_value(ErrorKind::GenerationParseFailure).unwrap();
    assert_eq!(value, "generation_parse_failure");
    assert_eq!(ErrorKind::Busy.to_string(), "busy");
}
