//! Schema loader for JSON schema descriptions
//!
//! A schema file holds one [`StructDef`] as JSON:
//!
//! ```json
//! {
//!   "type_name": "User",
//!   "fields": [
//!     {"name": "_id", "type": "object_id", "annotations": {"jp_disallow": "true"}},
//!     {"name": "groups", "type": "array", "element_type": {"type": "int"}}
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use tracing::debug;

use super::errors::{SchemaError, SchemaResult};
use super::types::StructDef;

/// Reads and checks schema descriptions.
pub struct SchemaLoader;

impl SchemaLoader {
    /// Loads a schema file.
    pub fn load_file(path: &Path) -> SchemaResult<StructDef> {
        let content = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            location: path.display().to_string(),
            source,
        })?;

        let schema = Self::parse(&path.display().to_string(), &content)?;
        debug!(
            path = %path.display(),
            fields = schema.fields.len(),
            "loaded schema"
        );
        Ok(schema)
    }

    /// Parses a schema from JSON text.
    pub fn load_str(content: &str) -> SchemaResult<StructDef> {
        Self::parse("<in-memory>", content)
    }

    fn parse(location: &str, content: &str) -> SchemaResult<StructDef> {
        let schema: StructDef = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed(location, format!("invalid JSON: {}", e)))?;

        schema
            .validate_structure()
            .map_err(|e| SchemaError::malformed(location, e))?;

        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SCHEMA: &str = r#"{
        "fields": [
            {"name": "_id", "type": "object_id"},
            {"name": "tags", "type": "array", "element_type": {"type": "string"}}
        ]
    }"#;

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SCHEMA.as_bytes()).unwrap();

        let schema = SchemaLoader::load_file(file.path()).unwrap();
        assert_eq!(schema.fields.len(), 2);
        assert!(schema.find("tags").is_some());
    }

    #[test]
    fn test_missing_file() {
        let err = SchemaLoader::load_file(Path::new("/nonexistent/schema.json")).unwrap_err();
        assert_eq!(err.code(), "DOCPATCH_SCHEMA_IO");
    }

    #[test]
    fn test_invalid_json() {
        let err = SchemaLoader::load_str("{ not json").unwrap_err();
        assert_eq!(err.code(), "DOCPATCH_MALFORMED_SCHEMA");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = SchemaLoader::load_str(r#"{"fields": [{"name": "a", "type": "decimal"}]}"#)
            .unwrap_err();
        assert_eq!(err.code(), "DOCPATCH_MALFORMED_SCHEMA");
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = SchemaLoader::load_str(
            r#"{"fields": [{"name": "a", "type": "int"}, {"name": "a", "type": "string"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }
}
