//! Postgres connection pool.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::warn;

use crate::error::{ConnectionError, SetupError};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a lazily connected pool for `dsn`.
///
/// No connection is made here. A malformed DSN is a [`ConnectionError`].
/// The pool runs its maintenance task on the current Tokio runtime, so
/// calling this outside one is [`SetupError::MissingRuntime`].
pub fn open(dsn: &str, max_connections: u32) -> Result<PgPool, SetupError> {
    let options = dsn.parse::<PgConnectOptions>().map_err(|_| {
        warn!("rejected database connection string");
        ConnectionError
    })?;

    if tokio::runtime::Handle::try_current().is_err() {
        return Err(SetupError::MissingRuntime);
    }

    Ok(PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_lazy_with(options))
}
