//! File-based environment layer.

use std::collections::HashMap;
use std::path::Path;

use toml::Value;

use super::source::EnvSource;
use super::ConfigError;

/// An environment layer loaded from a TOML file of top-level `NAME = value` pairs.
///
/// ```toml
/// API_PORT = 8080
/// METRICS_DISABLE = true
/// DB_DSN = "postgres://localhost/dev"
/// ```
///
/// Scalar values are stored as their string form, so `API_PORT = 8080` reads
/// back exactly like `API_PORT=8080` in the process environment.
#[derive(Debug, Clone, Default)]
pub struct FileEnv {
    vars: HashMap<String, String>,
}

impl FileEnv {
    /// Loads a file layer.
    ///
    /// If `required` is true, a missing file is an error. Optional files that
    /// don't exist produce an empty layer.
    pub fn load(path: impl AsRef<Path>, required: bool) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let Some(table) = load_env_file(path, required)? else {
            return Ok(Self::default());
        };

        let mut vars = HashMap::with_capacity(table.len());
        for (name, value) in table {
            let value = value_to_string(&value)
                .ok_or_else(|| ConfigError::NonScalarValue(name.clone()))?;
            vars.insert(name, value);
        }

        Ok(Self { vars })
    }
}

impl EnvSource for FileEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Loads and parses a TOML env file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn load_env_file(path: &Path, required: bool) -> Result<Option<toml::Table>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let table = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(Some(table))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(dt) => Some(dt.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_env_stringifies_scalars() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "API_PORT = 8080").unwrap();
        writeln!(file, "METRICS_DISABLE = true").unwrap();
        writeln!(file, "BASE_URL = \"https://example.com\"").unwrap();

        let env = FileEnv::load(file.path(), true).unwrap();

        assert_eq!(env.get("API_PORT").as_deref(), Some("8080"));
        assert_eq!(env.get("METRICS_DISABLE").as_deref(), Some("true"));
        assert_eq!(env.get("BASE_URL").as_deref(), Some("https://example.com"));
        assert_eq!(env.get("DB_DSN"), None);
    }

    #[test]
    fn test_file_env_rejects_tables() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[metrics]").unwrap();
        writeln!(file, "addr = \"localhost\"").unwrap();

        let result = FileEnv::load(file.path(), true);
        assert!(matches!(result, Err(ConfigError::NonScalarValue(name)) if name == "metrics"));
    }

    #[test]
    fn test_file_env_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "API_PORT = ").unwrap();

        let result = FileEnv::load(file.path(), true);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_file_env_required_missing() {
        let result = FileEnv::load("/nonexistent/path/env.toml", true);
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_file_env_optional_missing() {
        let env = FileEnv::load("/nonexistent/path/env.toml", false).unwrap();
        assert_eq!(env.get("API_PORT"), None);
    }
}
