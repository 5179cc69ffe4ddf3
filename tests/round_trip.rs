//! Round-trip and construction tests over description fixtures
//!
//! Every valid schema description must survive build → describe → build
//! unchanged, with defaults made explicit on the way out.

use linkage_config::{
    load, new_delimited_file_schema, new_fixed_width_file_schema, new_record_comparator, save,
    serialize, Checksum, Compiled, ErrorKind, FileSchema, LinkageError,
};
use serde_json::{json, Value};

fn fixture(name: &str) -> Value {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    load(path).unwrap()
}

fn rebuild(schema: &FileSchema) -> FileSchema {
    let canonical = serialize::to_canonical(&Compiled::from(schema.clone())).unwrap();
    match schema {
        FileSchema::FixedWidth(_) => new_fixed_width_file_schema(&canonical).unwrap(),
        FileSchema::Delimited(_) => new_delimited_file_schema(&canonical).unwrap(),
    }
}

// =============================================================================
// Round-trip
// =============================================================================

#[test]
fn test_fixed_width_round_trip() {
    let schema = new_fixed_width_file_schema(&fixture("census_fixed_width.json")).unwrap();
    assert_eq!(rebuild(&schema), schema);

    let canonical = serialize::to_canonical(&Compiled::from(schema)).unwrap();
    assert_eq!(canonical, fixture("census_fixed_width.json"));
}

#[test]
fn test_delimited_round_trip() {
    let schema = new_delimited_file_schema(&fixture("survey_delimited.json")).unwrap();
    assert_eq!(rebuild(&schema), schema);

    match &schema {
        FileSchema::Delimited(d) => {
            assert_eq!(d.delimiter(), '|');
            assert!(d.header());
        }
        other => panic!("Expected delimited schema, got {:?}", other),
    }
}

#[test]
fn test_defaults_are_made_explicit() {
    let schema = new_delimited_file_schema(&fixture("minimal_delimited.json")).unwrap();
    let canonical = serialize::to_canonical(&Compiled::from(schema.clone())).unwrap();

    assert_eq!(
        canonical,
        json!({
            "columns": ["name", "dob"],
            "blockingFields": [],
            "idFields": [],
            "delimiter": ",",
            "header": false
        })
    );
    assert_eq!(rebuild(&schema), schema);
    assert!(!schema.has_id());
}

#[test]
fn test_saved_file_is_one_line_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("census.json");

    let schema = new_fixed_width_file_schema(&fixture("census_fixed_width.json")).unwrap();
    let checksum = save(&Compiled::from(schema.clone()), &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.ends_with('\n'));

    let reloaded = load(&path).unwrap();
    assert_eq!(new_fixed_width_file_schema(&reloaded).unwrap(), schema);
    assert_eq!(Checksum::from_json(&reloaded), checksum);
}

#[test]
fn test_equivalent_descriptions_share_checksum() {
    let explicit = new_delimited_file_schema(&json!({
        "header": false,
        "delimiter": ",",
        "columns": ["name", "dob"]
    }))
    .unwrap();
    let implicit = new_delimited_file_schema(&fixture("minimal_delimited.json")).unwrap();

    let a = Checksum::from_json(&serialize::to_canonical(&Compiled::from(explicit)).unwrap());
    let b = Checksum::from_json(&serialize::to_canonical(&Compiled::from(implicit)).unwrap());
    assert_eq!(a, b);
}

// =============================================================================
// Construction failures
// =============================================================================

#[test]
fn test_duplicate_column_fails() {
    let err = new_fixed_width_file_schema(&fixture("duplicate_column.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Construction);
    assert!(matches!(err, LinkageError::DuplicateColumn(name) if name == "name"));
}

#[test]
fn test_undeclared_blocking_field_fails() {
    let err = new_delimited_file_schema(&fixture("undeclared_blocking.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Construction);
    assert_eq!(err.to_string(), "No such column (blocking): zip");
}

#[test]
fn test_empty_columns_fail_at_build() {
    let err = new_fixed_width_file_schema(&json!({"columns": []})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Construction);
}

#[test]
fn test_validation_runs_before_building() {
    // Both structurally wrong and semantically wrong: the structural error wins.
    let err = new_delimited_file_schema(&json!({
        "columns": "name",
        "blockingFields": ["zip"]
    }))
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_wrong_kind_of_description() {
    let err = new_delimited_file_schema(&fixture("census_fixed_width.json")).unwrap_err();
    match err {
        LinkageError::Validation { path, .. } => assert_eq!(path, "/columns/0"),
        other => panic!("Expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_duplicate_delimited_column_fails() {
    let err = new_delimited_file_schema(&json!({
        "columns": ["id", "name", "id"],
        "delimiter": "\t"
    }))
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Construction);
    assert!(matches!(err, LinkageError::DuplicateColumn(name) if name == "id"));
}

#[test]
fn test_empty_compare_list_fails_at_build() {
    let err = new_record_comparator(&json!({
        "schema": fixture("census_fixed_width.json"),
        "compare": []
    }))
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Construction);
    assert_eq!(err.to_string(), "Cannot build record comparator: no compare steps declared");
}

#[test]
fn test_fractional_offset_is_a_validation_error() {
    let err = new_fixed_width_file_schema(&json!({"columns": [["name", 0.0, 10]]})).unwrap_err();
    match err {
        LinkageError::Validation { path, .. } => assert_eq!(path, "/columns/0/1"),
        other => panic!("Expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_offset_beyond_u64_is_a_validation_error() {
    let description: Value =
        serde_json::from_str(r#"{"columns": [["name", 18446744073709551616, 10]]}"#).unwrap();
    let err = new_fixed_width_file_schema(&description).unwrap_err();
    match err {
        LinkageError::Validation { path, .. } => assert_eq!(path, "/columns/0/1"),
        other => panic!("Expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_span_ending_past_usize_fails_at_build() {
    let err = new_fixed_width_file_schema(&json!({"columns": [["tail", usize::MAX, 1]]}))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Construction);
    assert!(matches!(err, LinkageError::SpanOverflow { name, .. } if name == "tail"));
}
