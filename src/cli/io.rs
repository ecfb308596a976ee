//! JSON I/O handling for CLI
//!
//! - Input: one JSON array of operation specs, from a file or stdin
//! - Output: one JSON value on stdout
//! - Errors: one JSON object on stderr

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::operation::OperationSpec;

use super::errors::{CliError, CliResult};

/// Reads operation specs from `input`, or stdin when `None`.
pub fn read_operations(input: Option<&Path>) -> CliResult<Vec<OperationSpec>> {
    let content = match input {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            CliError::io_error(format!("Failed to read '{}': {}", path.display(), e))
        })?,
        None => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            buffer
        }
    };

    parse_operations(&content)
}

/// Parses a JSON array of operation specs.
pub fn parse_operations(content: &str) -> CliResult<Vec<OperationSpec>> {
    if content.trim().is_empty() {
        return Err(CliError::invalid_input("Empty input"));
    }

    serde_json::from_str(content)
        .map_err(|e| CliError::invalid_input(format!("Invalid operations JSON: {}", e)))
}

/// Write a JSON value to stdout
pub fn write_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error object to stderr
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stderr = io::stderr();
    serde_json::to_writer(&mut stderr, &response)?;
    writeln!(stderr)?;
    stderr.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Operation;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_operations() {
        let specs = parse_operations(
            r#"[{"op": "replace", "path": "a", "value": "new"}, {"op": "remove", "path": "d.1"}]"#,
        )
        .unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].op, Some(Operation::Replace));
        assert_eq!(specs[1].path.as_str(), "d.1");
    }

    #[test]
    fn test_parse_rejects_object_and_empty() {
        assert_eq!(
            parse_operations(r#"{"op": "remove", "path": "a"}"#).unwrap_err().code(),
            "DOCPATCH_CLI_INVALID_INPUT"
        );
        assert_eq!(parse_operations("  ").unwrap_err().code(), "DOCPATCH_CLI_INVALID_INPUT");
    }

    #[test]
    fn test_read_operations_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"[{"op": "move", "path": "a", "from": "b"}]"#).unwrap();

        let specs = read_operations(Some(file.path())).unwrap();
        assert_eq!(specs[0], OperationSpec::move_from("a", "b"));
    }
}
