//! Application context holding runtime configuration and shared service handles.

mod builder;
mod features;

pub use builder::{system_hostname, AppContextBuilder, HostnameResolver};

use std::sync::Arc;

use sqlx::PgPool;

use crate::logging::Logger;
use crate::metrics::MetricsClient;
use crate::report::ErrorReportClient;
use crate::Error;

/// Central application context built once at startup from the environment.
///
/// Cloning is cheap: everything except the logger is shared behind an `Arc`.
/// The context is read-only apart from [`with_logger`](Self::with_logger),
/// which returns a new value instead of changing this one.
///
/// ## Example
///
/// ```no_run
/// use app_context::{init_tracing, AppContext};
///
/// // Install the stdout subscriber first so the context's logger is live.
/// init_tracing();
///
/// let ctx = AppContext::builder("billing")
///     .with_env_file("config/dev.toml", false)
///     .with_process_env()
///     .build()?;
///
/// ctx.metrics_client().incr("startup");
/// let request_ctx = ctx.with_logger(ctx.logger().request("req-42"));
/// request_ctx.logger().info("handling request");
/// # Ok::<(), app_context::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct AppContext {
    shared: Arc<Shared>,
    logger: Logger,
}

#[derive(Debug)]
struct Shared {
    api_port: u16,
    app_name: String,
    base_external_url: String,
    code_version: String,
    database: Option<PgPool>,
    hostname: String,
    json_schema_path: String,
    metrics_client: MetricsClient,
    error_report_client: ErrorReportClient,
}

impl AppContext {
    /// Creates a new builder for constructing an `AppContext`.
    pub fn builder(app_name: impl Into<String>) -> AppContextBuilder {
        AppContextBuilder::new(app_name.into())
    }

    /// Builds a context from the process environment and the OS hostname.
    ///
    /// Installs the stdout subscriber through [`init_tracing`](crate::init_tracing)
    /// first, unless one is already set, so the default logger is live.
    pub fn from_env(app_name: impl Into<String>) -> Result<Self, Error> {
        crate::logging::init_tracing();
        Self::builder(app_name).build()
    }

    /// Listen port for the API; `0` means unset.
    pub fn api_port(&self) -> u16 {
        self.shared.api_port
    }

    /// Name supplied by the caller at build time.
    pub fn app_name(&self) -> &str {
        &self.shared.app_name
    }

    /// Public base URL from `BASE_URL`; may be empty.
    pub fn base_external_url(&self) -> &str {
        &self.shared.base_external_url
    }

    /// Deployed code version from `CODE_VERSION`; may be empty.
    pub fn code_version(&self) -> &str {
        &self.shared.code_version
    }

    /// The database pool, if `DB_DSN` was configured.
    pub fn database(&self) -> Option<&PgPool> {
        self.shared.database.as_ref()
    }

    /// Hostname resolved at build time. Never empty.
    pub fn hostname(&self) -> &str {
        &self.shared.hostname
    }

    /// Schema location from `JSON_SCHEMA_PATH`; may be empty.
    pub fn json_schema_path(&self) -> &str {
        &self.shared.json_schema_path
    }

    /// The logger of this copy of the context.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// The metrics client; a no-op when metrics are off.
    pub fn metrics_client(&self) -> &MetricsClient {
        &self.shared.metrics_client
    }

    /// Whether a live metrics backend is wired.
    pub fn metrics_enabled(&self) -> bool {
        self.shared.metrics_client.is_live()
    }

    /// The error-report client; a no-op when reporting is off.
    pub fn error_report_client(&self) -> &ErrorReportClient {
        &self.shared.error_report_client
    }

    /// Whether a live error-report client is wired.
    pub fn error_report_enabled(&self) -> bool {
        self.shared.error_report_client.is_live()
    }

    /// Returns a copy of this context that logs through `logger`.
    ///
    /// Other holders of the original context keep their logger.
    pub fn with_logger(&self, logger: Logger) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            logger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapEnv;

    fn fixed_host() -> std::io::Result<String> {
        Ok("box-1".to_string())
    }

    fn disabled_context() -> AppContext {
        AppContext::builder("svc")
            .with_source(MapEnv::from_iter([
                ("METRICS_DISABLE", "true"),
                ("ROLLBAR_DISABLE", "true"),
            ]))
            .with_hostname_resolver(fixed_host)
            .build()
            .unwrap()
    }

    #[test]
    fn test_context_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AppContext>();
    }

    #[test]
    fn test_with_logger_leaves_original_untouched() {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let ctx = disabled_context();
            let scoped = ctx.with_logger(ctx.logger().request("req-1"));

            let name = |c: &AppContext| c.logger().span().metadata().map(|m| m.name());
            assert_eq!(name(&ctx), Some("app"));
            assert_eq!(name(&scoped), Some("request"));

            assert!(Arc::ptr_eq(&ctx.shared, &scoped.shared));
            assert_eq!(scoped.hostname(), "box-1");
        });
    }

    #[test]
    fn test_clients_default_to_noop() {
        let ctx = disabled_context();

        assert!(!ctx.metrics_enabled());
        assert!(!ctx.error_report_enabled());
        assert!(!ctx.metrics_client().is_live());
        assert!(!ctx.error_report_client().is_live());
        assert!(ctx.database().is_none());
    }
}
