//! CLI Command Tests
//!
//! Tests for the docpatch binary's commands against files on disk:
//! - Config loading and schema resolution
//! - rules / validate / compile dispatch
//! - Error codes for bad config, schema and input

use std::fs;
use std::path::PathBuf;

use docpatch::cli::{parse_operations, rules_json, run_command, Command, Config};
use docpatch::Validator;
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const SCHEMA: &str = r#"{
    "type_name": "User",
    "fields": [
        {"name": "id", "rename": "_id", "type": "object_id", "annotations": {"jp_disallow": "true"}},
        {"name": "name", "type": "string", "annotations": {"jp_expression": "^[A-Za-z ]+$"}},
        {"name": "age", "type": "int", "annotations": {"jp_min": "0", "jp_max": "150"}},
        {"name": "groups", "type": "array", "element_type": {"type": "string"}}
    ]
}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(config: serde_json::Value) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
        fs::write(dir.path().join("docpatch.json"), config.to_string()).unwrap();
        Self { dir }
    }

    fn standard() -> Self {
        Self::new(json!({"schema_path": "schema.json"}))
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("docpatch.json")
    }

    fn input(&self, operations: serde_json::Value) -> PathBuf {
        let path = self.dir.path().join("ops.json");
        fs::write(&path, operations.to_string()).unwrap();
        path
    }
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_config_load() {
    let ws = Workspace::new(json!({
        "schema_path": "schema.json",
        "validate": false,
        "log_level": "debug",
        "disallowed_paths": [{"path": "name", "details": "name is managed"}]
    }));

    let config = Config::load(&ws.config()).unwrap();
    assert!(!config.validate);
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.disallowed_paths.len(), 1);

    let schema = config.load_schema().unwrap();
    assert_eq!(schema.type_name.as_deref(), Some("User"));
    assert_eq!(schema.fields.len(), 4);
}

#[test]
fn test_config_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("docpatch.json");
    fs::write(&path, "{ not json").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert_eq!(err.code(), "DOCPATCH_CLI_CONFIG_ERROR");
}

#[test]
fn test_config_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(&dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.code(), "DOCPATCH_CLI_CONFIG_ERROR");
}

#[test]
fn test_missing_schema_file() {
    let ws = Workspace::new(json!({"schema_path": "other.json"}));
    let err = run_command(Command::Rules { config: ws.config() }).unwrap_err();
    assert_eq!(err.code(), "DOCPATCH_CLI_SCHEMA_ERROR");
}

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_rules_command() {
    let ws = Workspace::standard();
    assert!(run_command(Command::Rules { config: ws.config() }).is_ok());

    let config = Config::load(&ws.config()).unwrap();
    let validator = Validator::new(config.load_schema().unwrap()).unwrap();
    let table = rules_json(&validator);

    assert_eq!(
        table["rules"]["_id"],
        json!(["jp_general_matching_operation_to_kind", "jp_general_matching_kind", "jp_disallow"])
    );
    assert_eq!(
        table["rules"]["age"],
        json!(["jp_general_matching_operation_to_kind", "jp_general_matching_kind", "jp_min", "jp_max"])
    );
    assert!(table["wildcard_rules"]["groups.*"].is_array());
}

#[test]
fn test_validate_command() {
    let ws = Workspace::standard();
    let input = ws.input(json!([
        {"op": "replace", "path": "name", "value": "Ada"},
        {"op": "add", "path": "groups", "value": "admins"},
        {"op": "replace", "path": "groups.0", "value": "staff"}
    ]));

    assert!(run_command(Command::Validate {
        config: ws.config(),
        input: Some(input),
    })
    .is_ok());
}

#[test]
fn test_validate_command_rejects() {
    let ws = Workspace::standard();
    let input = ws.input(json!([
        {"op": "replace", "path": "age", "value": 200}
    ]));

    let err = run_command(Command::Validate {
        config: ws.config(),
        input: Some(input),
    })
    .unwrap_err();
    assert_eq!(err.code(), "DOCPATCH_NOT_ALLOWED");
    assert!(err.message().contains("greater then specified"));
}

#[test]
fn test_compile_command() {
    let ws = Workspace::standard();
    let input = ws.input(json!([
        {"op": "remove", "path": "groups.1"},
        {"op": "move", "path": "name", "from": "groups.0"}
    ]));

    assert!(run_command(Command::Compile {
        config: ws.config(),
        input: Some(input),
    })
    .is_ok());
}

#[test]
fn test_compile_command_validates() {
    let ws = Workspace::standard();
    let input = ws.input(json!([{"op": "replace", "path": "_id", "value": "x"}]));

    assert!(run_command(Command::Compile {
        config: ws.config(),
        input: Some(input),
    })
    .is_err());
}

#[test]
fn test_compile_command_without_validation() {
    let ws = Workspace::new(json!({
        "schema_path": "schema.json",
        "validate": false,
        "disallowed_paths": [{"path": "name", "details": "name is managed"}]
    }));

    // unknown paths pass when validation is off
    let input = ws.input(json!([{"op": "remove", "path": "unknown"}]));
    assert!(run_command(Command::Compile {
        config: ws.config(),
        input: Some(input),
    })
    .is_ok());

    // policies still apply
    let input = ws.input(json!([{"op": "remove", "path": "name"}]));
    let err = run_command(Command::Compile {
        config: ws.config(),
        input: Some(input),
    })
    .unwrap_err();
    assert_eq!(err.code(), "DOCPATCH_POLICY_VIOLATION");
    assert_eq!(err.message(), "policy violation: name is managed");
}

// =============================================================================
// Input Tests
// =============================================================================

#[test]
fn test_parse_operations() {
    let specs = parse_operations(
        r#"[{"op": "copy", "path": "a", "from": "b"}, {"op": "add", "path": "d", "value": [1, 2]}]"#,
    )
    .unwrap();
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].from.as_ref().map(|p| p.as_str()), Some("b"));
}

#[test]
fn test_invalid_input() {
    let ws = Workspace::standard();
    let path = ws.dir.path().join("ops.json");
    fs::write(&path, r#"[{"op": "merge", "path": "a"}]"#).unwrap();

    let err = run_command(Command::Validate {
        config: ws.config(),
        input: Some(path),
    })
    .unwrap_err();
    assert_eq!(err.code(), "DOCPATCH_CLI_INVALID_INPUT");
}
