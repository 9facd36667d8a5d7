use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{name} must be 'true' or 'false', got '{value}'")]
    InvalidFlag { name: String, value: String },

    #[error("env '{name}' is not a number: {source}")]
    InvalidInteger {
        name: String,
        source: std::num::ParseIntError,
    },

    #[error("{name} can't be a negative number")]
    Negative { name: String },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("env file value for '{0}' must be a scalar")]
    NonScalarValue(String),

    #[error("required env file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read env file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse env file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}
