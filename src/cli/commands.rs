//! CLI command implementations
//!
//! Every command loads the configuration, loads the schema it names and
//! builds the validator before touching any input.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::compiler::{Compiler, DisallowPathPolicy, SmartParser};
use crate::schema::{SchemaLoader, StructDef};
use crate::validator::{RuleSet, Validator};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_operations, write_error, write_json};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema description file, relative to the config file (required)
    pub schema_path: String,

    /// Validate operations before compiling (optional, default true)
    #[serde(default = "default_validate")]
    pub validate: bool,

    /// Log filter used when RUST_LOG is unset (optional, default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Paths rejected before compilation (optional)
    #[serde(default)]
    pub disallowed_paths: Vec<DisallowPathPolicy>,

    /// Directory of the config file, for resolving relative paths
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_validate() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.schema_path.trim().is_empty() {
            return Err(CliError::config_error("schema_path must not be empty"));
        }

        if EnvFilter::try_new(&self.log_level).is_err() {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'",
                self.log_level
            )));
        }

        for policy in &self.disallowed_paths {
            if policy.path.is_empty() {
                return Err(CliError::config_error("disallowed_paths entries need a path"));
            }
        }

        Ok(())
    }

    /// Schema file location with relative paths resolved against the config file
    pub fn schema_file(&self) -> PathBuf {
        let path = Path::new(&self.schema_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Loads the schema this configuration names.
    pub fn load_schema(&self) -> CliResult<StructDef> {
        Ok(SchemaLoader::load_file(&self.schema_file())?)
    }

    /// Compiler carrying the configured policies
    pub fn compiler(&self) -> Compiler {
        self.disallowed_paths
            .iter()
            .cloned()
            .fold(Compiler::new(), |compiler, policy| compiler.with_policy(policy))
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the config.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // a subscriber may already be installed when running inside tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parses arguments and runs the selected command.
///
/// Failures are reported as a JSON error object on stderr before being
/// returned.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let result = run_command(cli.command);
    if let Err(e) = &result {
        write_error(e.code(), e.message())?;
    }
    result
}

/// Run a CLI command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Rules { config } => rules(&config),
        Command::Validate { config, input } => validate(&config, input.as_deref()),
        Command::Compile { config, input } => compile(&config, input.as_deref()),
    }
}

fn load(config_path: &Path) -> CliResult<(Config, Validator)> {
    let config = Config::load(config_path)?;
    init_logging(&config.log_level);

    let schema = config.load_schema()?;
    let validator = Validator::new(schema)?;
    info!(
        schema = %config.schema_file().display(),
        paths = validator.rules().len(),
        wildcard_paths = validator.wildcard_rules().len(),
        "schema registered"
    );

    Ok((config, validator))
}

/// Prints the rule tables.
pub fn rules(config_path: &Path) -> CliResult<()> {
    let (_, validator) = load(config_path)?;
    write_json(&rules_json(&validator))
}

/// Rule tables as `{"rules": {path: [names]}, "wildcard_rules": {...}}`
pub fn rules_json(validator: &Validator) -> Value {
    fn table<'a>(entries: impl Iterator<Item = (&'a crate::operation::Path, &'a RuleSet)>) -> Value {
        let map: Map<String, Value> = entries
            .map(|(path, set)| (path.to_string(), json!(set.names())))
            .collect();
        Value::Object(map)
    }

    json!({
        "rules": table(validator.rules().iter()),
        "wildcard_rules": table(validator.wildcard_rules().iter()),
    })
}

/// Validates operations; prints `{"valid": true}` when all pass.
pub fn validate(config_path: &Path, input: Option<&Path>) -> CliResult<()> {
    let (_, validator) = load(config_path)?;
    let specs = read_operations(input)?;

    for spec in &specs {
        validator.validate(spec)?;
    }

    debug!(operations = specs.len(), "operations valid");
    write_json(&json!({"valid": true}))
}

/// Compiles operations and prints the update stages.
pub fn compile(config_path: &Path, input: Option<&Path>) -> CliResult<()> {
    let (config, validator) = load(config_path)?;
    let specs = read_operations(input)?;

    let pipeline = if config.validate {
        SmartParser::from_parts(validator, config.compiler()).parse(&specs)?
    } else {
        config.compiler().compile_all(&specs)?
    };

    write_json(&pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_config_defaults_and_relative_schema() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "docpatch.json", r#"{"schema_path": "schema.json"}"#);

        let config = Config::load(&path).unwrap();
        assert!(config.validate);
        assert_eq!(config.log_level, "warn");
        assert!(config.disallowed_paths.is_empty());
        assert_eq!(config.schema_file(), dir.path().join("schema.json"));
    }

    #[test]
    fn test_config_missing_schema_path() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "docpatch.json", r#"{"validate": false}"#);
        let err = Config::load(&path).unwrap_err();
        assert_eq!(err.code(), "DOCPATCH_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_config_policies() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "docpatch.json",
            r#"{"schema_path": "s.json", "disallowed_paths": [{"path": "_id", "details": "immutable"}]}"#,
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.compiler().policies().len(), 1);
    }

    #[test]
    fn test_rules_json() {
        let schema = SchemaLoader::load_str(
            r#"{"fields": [{"name": "d", "type": "array", "element_type": {"type": "int"}}]}"#,
        )
        .unwrap();
        let validator = Validator::new(schema).unwrap();
        assert_eq!(
            rules_json(&validator),
            json!({
                "rules": {"d": ["jp_general_matching_operation_to_kind", "jp_general_matching_kind"]},
                "wildcard_rules": {"d.*": ["jp_general_matching_operation_to_kind", "jp_general_matching_kind"]}
            })
        );
    }
}
