//! Builds a process-wide application context from the environment.
//!
//! [`AppContext::from_env`] reads the process environment, resolves the
//! hostname, and wires the optional metrics, error-reporting and database
//! handles. The resulting value is cheap to clone and shared read-only.

pub mod config;
pub mod context;
pub mod database;
mod error;
pub mod logging;
pub mod metrics;
pub mod report;

pub use config::{ConfigError, EnvReader, EnvSource, MapEnv};
pub use context::{AppContext, AppContextBuilder};
pub use error::{ClientInitError, ConnectionError, Error, SetupError};
pub use logging::{init_tracing, Logger};
