//! Logging on top of `tracing`.
//!
//! [`init_tracing`] installs the process-wide stdout subscriber. A [`Logger`]
//! is a span that every event it emits is parented to, so request-scoped
//! loggers carry their fields without touching global state.
//!
//! Call [`init_tracing`] before building a context: a span created while no
//! subscriber is installed stays disabled for its whole life.

use tracing::{debug, error, info, info_span, warn, Span};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{EnvReader, LOG_FORMAT, RUST_LOG};

/// A span-scoped logger.
#[derive(Debug, Clone)]
pub struct Logger {
    span: Span,
}

impl Logger {
    /// Wraps an existing span.
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    /// The default logger for an application, writing through the global subscriber.
    pub fn stdout(app_name: &str) -> Self {
        Self::new(info_span!("app", app = %app_name))
    }

    /// A child logger tagged with `request_id`.
    pub fn request(&self, request_id: &str) -> Self {
        Self::new(info_span!(parent: &self.span, "request", request_id = %request_id))
    }

    /// The span every event of this logger is parented to.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Emits a `debug` event inside this logger's span.
    pub fn debug(&self, message: &str) {
        debug!(parent: &self.span, "{message}");
    }

    /// Emits an `info` event inside this logger's span.
    pub fn info(&self, message: &str) {
        info!(parent: &self.span, "{message}");
    }

    /// Emits a `warn` event inside this logger's span.
    pub fn warn(&self, message: &str) {
        warn!(parent: &self.span, "{message}");
    }

    /// Emits an `error` event inside this logger's span.
    pub fn error(&self, message: &str) {
        error!(parent: &self.span, "{message}");
    }
}

/// Installs a stdout subscriber configured from `RUST_LOG` and `LOG_FORMAT`.
///
/// An invalid filter falls back to `info`. Does nothing if a global subscriber
/// is already set. Returns whether this call installed the subscriber.
pub fn init_tracing() -> bool {
    init_tracing_from(&EnvReader::process())
}

/// Same as [`init_tracing`], reading `RUST_LOG` and `LOG_FORMAT` from `env`.
pub fn init_tracing_from(env: &EnvReader) -> bool {
    let directives = env.read_string(RUST_LOG);
    let filter = if directives.is_empty() {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false);

    let installed = if env.read_string(LOG_FORMAT) == "json" {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_logger_is_child_of_parent() {
        let subscriber = fmt().with_env_filter(EnvFilter::new("debug")).finish();
        tracing::subscriber::with_default(subscriber, || {
            let parent = Logger::stdout("svc");
            let child = parent.request("req-1");

            assert!(parent.span().id().is_some());
            assert_ne!(parent.span().id(), child.span().id());
            child.info("handled");
            child.debug("details");
        });
    }
}
