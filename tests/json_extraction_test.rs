use serde::Deserialize;
use studypal_lib::generation::extract::{
    extract_candidate_json, extract_structured, is_truncated, parse_structured, ParseError,
};

#[derive(Debug, Deserialize, PartialEq)]
struct Sample {
    key: String,
}

#[test]
fn test_extract_json_from_code_block() {
    let text = r#"
    Here's some text.
    ```json
    {"key": "value"}
    ```
    More text.
    "#;

    let json = extract_candidate_json(text).unwrap();
    assert_eq!(json, r#"{"key": "value"}"#);
}

#[test]
fn test_extract_json_from_untagged_fence() {
    let text = "```\n{\"key\": \"value\"}\n```";
    assert_eq!(extract_candidate_json(text).unwrap(), r#"{"key": "value"}"#);
}

#[test]
fn test_extract_json_plain() {
    let text = r#"{"key": "value"}"#;
    assert_eq!(extract_candidate_json(text).unwrap(), text);
}

#[test]
fn test_extract_json_with_extra_text() {
    let text = r#"Some text before {"key": "value"} some text after"#;
    assert_eq!(extract_candidate_json(text).unwrap(), r#"{"key": "value"}"#);
}

#[test]
fn test_braces_inside_strings_do_not_end_object() {
    let text = r#"Result: {"key": "a } inside", "n": {"x": 1}} trailing }"#;
    assert_eq!(
        extract_candidate_json(text).unwrap(),
        r#"{"key": "a } inside", "n": {"x": 1}}"#
    );
}

#[test]
fn test_no_json_found() {
    assert!(extract_candidate_json("I think you should review chapter 3.").is_none());
    assert!(extract_candidate_json("   ").is_none());
    assert!(matches!(
        extract_structured::<Sample>("no json here"),
        Err(ParseError::NoJson { .. })
    ));
}

#[test]
fn test_trailing_comma_repaired() {
    let parsed: Sample = parse_structured(r#"{"key": "value",}"#).unwrap();
    assert_eq!(parsed.key, "value");
}

#[test]
fn test_stray_backslash_repaired() {
    let parsed: Sample = parse_structured(r#"{"key": "time \(O(n)\)"}"#).unwrap();
    assert_eq!(parsed.key, r"time \(O(n)\)");
}

#[test]
fn test_unrepairable_json_is_malformed() {
    let result = parse_structured::<Sample>(r#"{"key": "value",,}"#);
    assert!(matches!(result, Err(ParseError::Malformed(_))));
}

#[test]
fn test_truncation_detection() {
    assert!(is_truncated(r#"{"key": "val"#));
    assert!(is_truncated(r#"{"key": ["a","#));
    assert!(!is_truncated(r#"{"key": "value"}"#));
    assert!(!is_truncated(""));
}
