//! Environment loading and typed reads.

mod env;
mod error;
mod file;
mod source;

pub use env::{DisableFlag, EnvReader};
pub use error::ConfigError;
pub use file::FileEnv;
pub use source::{EnvSource, MapEnv, ProcessEnv};

/// Listen port for the API, `0` when unset.
pub const API_PORT: &str = "API_PORT";
/// Version string attached to error reports.
pub const CODE_VERSION: &str = "CODE_VERSION";
/// Location of the JSON schemas the service validates against.
pub const JSON_SCHEMA_PATH: &str = "JSON_SCHEMA_PATH";
/// Externally visible base URL of the service.
pub const BASE_URL: &str = "BASE_URL";

/// Postgres connection string. The database is disabled when empty.
pub const DB_DSN: &str = "DB_DSN";
/// Pool size, at least 1. Defaults to 20.
pub const DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";

/// Prefix for the error-reporting variables (`ROLLBAR_DISABLE`, ...).
pub const ROLLBAR_PREFIX: &str = "ROLLBAR";
/// Access token sent with every report.
pub const ROLLBAR_API_KEY: &str = "ROLLBAR_API_KEY";
/// One of `production`, `staging` or `development`.
pub const ROLLBAR_ENVIRONMENT: &str = "ROLLBAR_ENVIRONMENT";

/// Prefix for the metrics variables (`METRICS_DISABLE`, ...).
pub const METRICS_PREFIX: &str = "METRICS";
/// StatsD `host:port`.
pub const METRICS_ADDR: &str = "METRICS_ADDR";
/// Extra `key=value` tags, comma separated.
pub const METRICS_TAGS: &str = "METRICS_TAGS";
/// Metric name prefix; defaults to the app name.
pub const METRICS_NAMESPACE: &str = "METRICS_NAMESPACE";
/// Overrides the `hostname` tag.
pub const METRICS_HOSTNAME: &str = "METRICS_HOSTNAME";

/// `tracing` filter directives, `info` when unset or invalid.
pub const RUST_LOG: &str = "RUST_LOG";
/// `json` for JSON lines, anything else for human-readable output.
pub const LOG_FORMAT: &str = "LOG_FORMAT";
