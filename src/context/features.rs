//! Wiring for the optional sub-resources of a context.
//!
//! Each function returns the no-op variant when its feature is switched off or
//! unconfigured, and an error only when the configuration is malformed or the
//! collaborator fails.

use sqlx::PgPool;
use tracing::debug;

use crate::config::{
    ConfigError, EnvReader, DB_DSN, DB_MAX_CONNECTIONS, METRICS_ADDR, METRICS_HOSTNAME,
    METRICS_NAMESPACE, METRICS_PREFIX, METRICS_TAGS, ROLLBAR_API_KEY, ROLLBAR_ENVIRONMENT,
    ROLLBAR_PREFIX,
};
use crate::database;
use crate::error::SetupError;
use crate::metrics::{MetricsClient, StatsdConfig, TagSet};
use crate::report::{ErrorReportClient, ReportEnvironment, RollbarClient};

/// Tags every metric carries: the application, the host unless blank, then
/// `METRICS_TAGS`.
pub(super) fn metrics_tags(env: &EnvReader, app_name: &str, hostname: &str) -> TagSet {
    let host = env
        .lookup(METRICS_HOSTNAME)
        .unwrap_or_else(|| hostname.to_string());

    let mut tags = TagSet::new();
    tags.insert("application", app_name);
    if !host.is_empty() {
        tags.insert("host", host);
    }
    tags.merge(&env.read_string(METRICS_TAGS));
    tags
}

pub(super) fn metrics_client(
    env: &EnvReader,
    app_name: &str,
    hostname: &str,
) -> Result<MetricsClient, SetupError> {
    if env.read_disable_flag(METRICS_PREFIX).check()? {
        debug!("metrics disabled");
        return Ok(MetricsClient::NoOp);
    }

    let namespace = env
        .lookup(METRICS_NAMESPACE)
        .unwrap_or_else(|| format!("{app_name}."));
    let tags = metrics_tags(env, app_name, hostname);

    let mut config = StatsdConfig::new(&env.read_string(METRICS_ADDR))?;
    config.set_namespace(namespace);
    config.set_tags(tags);
    let client = config.init()?;

    debug!("metrics client initialized");
    Ok(client)
}

pub(super) fn error_report_client(
    env: &EnvReader,
    code_version: &str,
    hostname: &str,
) -> Result<ErrorReportClient, SetupError> {
    if env.read_disable_flag(ROLLBAR_PREFIX).check()? {
        debug!("error reporting disabled");
        return Ok(ErrorReportClient::NoOp);
    }

    let api_key = env.read_string(ROLLBAR_API_KEY);
    if api_key.is_empty() {
        debug!("no rollbar api key, error reporting skipped");
        return Ok(ErrorReportClient::NoOp);
    }

    let mut client = RollbarClient::new(&api_key)?;
    let options = client.options_mut();
    if let Ok(environment) = env.read_string(ROLLBAR_ENVIRONMENT).parse::<ReportEnvironment>() {
        options.environment = Some(environment);
    }
    if !code_version.is_empty() {
        options.code_version = Some(code_version.to_string());
    }
    options.host = Some(hostname.to_string());

    debug!("rollbar client initialized");
    Ok(ErrorReportClient::Live(client.into()))
}

pub(super) fn database(env: &EnvReader) -> Result<Option<PgPool>, SetupError> {
    let dsn = env.read_string(DB_DSN);
    if dsn.is_empty() {
        debug!("no database configured");
        return Ok(None);
    }

    let max_connections = match env.read_int(DB_MAX_CONNECTIONS)? {
        None => database::DEFAULT_MAX_CONNECTIONS,
        Some(n) => u32::try_from(n)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| ConfigError::OutOfRange {
                name: DB_MAX_CONNECTIONS.to_string(),
                value: n,
                min: 1,
                max: i64::from(u32::MAX),
            })?,
    };

    Ok(Some(database::open(&dsn, max_connections)?))
}
