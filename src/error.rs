use crate::config::ConfigError;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type for building an application context.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("application context requires an app name")]
    MissingAppName,

    #[error("couldn't figure out hostname: {0}")]
    HostResolution(#[source] std::io::Error),

    #[error("error setting metrics client: {0}")]
    MetricsSetup(#[source] SetupError),

    #[error("error setting error-report client: {0}")]
    ErrorReportSetup(#[source] SetupError),

    #[error("error setting database: {0}")]
    DatabaseSetup(#[source] SetupError),
}

/// Failure while wiring one optional sub-resource.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ClientInit(#[from] ClientInitError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("a Tokio runtime is required when DB_DSN is set")]
    MissingRuntime,
}

/// A collaborator client couldn't be constructed or initialized.
#[derive(Debug, Error)]
#[error("failed to initialize {client} client: {source}")]
pub struct ClientInitError {
    pub client: &'static str,
    #[source]
    pub source: BoxError,
}

impl ClientInitError {
    pub fn new(client: &'static str, source: impl Into<BoxError>) -> Self {
        Self {
            client,
            source: source.into(),
        }
    }
}

/// The database handle couldn't be opened.
///
/// The message is fixed: the driver error may echo parts of the DSN, which can
/// hold credentials.
#[derive(Debug, Error)]
#[error("couldn't open the database; check that DB_DSN is correct")]
pub struct ConnectionError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_errors_carry_cause_text() {
        let err = Error::MetricsSetup(SetupError::ClientInit(ClientInitError::new(
            "metrics",
            "bad address",
        )));

        assert_eq!(
            err.to_string(),
            "error setting metrics client: failed to initialize metrics client: bad address"
        );
    }

    #[test]
    fn test_connection_error_is_fixed() {
        let err = Error::DatabaseSetup(ConnectionError.into());
        assert_eq!(
            err.to_string(),
            "error setting database: couldn't open the database; check that DB_DSN is correct"
        );
    }
}
