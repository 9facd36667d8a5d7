use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use super::{features, AppContext, Shared};
use crate::config::{
    ConfigError, EnvReader, EnvSource, FileEnv, ProcessEnv, API_PORT, BASE_URL, CODE_VERSION,
    JSON_SCHEMA_PATH,
};
use crate::logging::Logger;
use crate::Error;

/// Resolves the name of the host the process runs on.
pub type HostnameResolver = fn() -> io::Result<String>;

/// The operating system's hostname.
pub fn system_hostname() -> io::Result<String> {
    hostname::get()?
        .into_string()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "hostname is not valid UTF-8"))
}

/// An environment layer registered on the builder.
#[derive(Debug)]
enum Layer {
    Source(Box<dyn EnvSource>),
    File { path: PathBuf, required: bool },
}

/// Builder for constructing an [`AppContext`].
///
/// Environment layers are applied in registration order, so later layers
/// override earlier ones. With no layers registered, the process environment
/// is used.
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct AppContextBuilder {
    app_name: String,
    layers: Vec<Layer>,
    resolve_hostname: HostnameResolver,
    logger: Option<Logger>,
}

impl AppContextBuilder {
    pub(super) fn new(app_name: String) -> Self {
        Self {
            app_name,
            layers: Vec::new(),
            resolve_hostname: system_hostname,
            logger: None,
        }
    }

    /// Adds an environment layer.
    pub fn with_source(mut self, source: impl EnvSource + 'static) -> Self {
        self.layers.push(Layer::Source(Box::new(source)));
        self
    }

    /// Adds the process environment as a layer.
    pub fn with_process_env(self) -> Self {
        self.with_source(ProcessEnv)
    }

    /// Adds a TOML env file as a layer. See [`FileEnv`].
    ///
    /// The file is read when [`build`](Self::build) runs.
    pub fn with_env_file(mut self, path: impl Into<PathBuf>, required: bool) -> Self {
        self.layers.push(Layer::File {
            path: path.into(),
            required,
        });
        self
    }

    /// Replaces the OS hostname lookup.
    pub fn with_hostname_resolver(mut self, resolve: HostnameResolver) -> Self {
        self.resolve_hostname = resolve;
        self
    }

    /// Uses `logger` instead of the default stdout logger.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Builds the `AppContext`.
    ///
    /// Steps run in a fixed order and the first failure aborts the build:
    /// hostname, scalar settings, metrics, error reporting, then the database.
    ///
    /// The default logger is a span; call [`init_tracing`](crate::init_tracing)
    /// beforehand or it is created disabled. With `DB_DSN` set this must run
    /// inside a Tokio runtime.
    pub fn build(self) -> Result<AppContext, Error> {
        let Self {
            app_name,
            layers,
            resolve_hostname,
            logger,
        } = self;

        if app_name.is_empty() {
            return Err(Error::MissingAppName);
        }
        let env = load_layers(layers)?;

        let hostname = resolve_hostname().map_err(Error::HostResolution)?;
        if hostname.is_empty() {
            return Err(Error::HostResolution(io::Error::new(
                io::ErrorKind::InvalidData,
                "hostname is empty",
            )));
        }

        // Read before the error-report client, which carries it.
        let code_version = env.read_string(CODE_VERSION);
        let api_port = read_port(&env)?;
        let json_schema_path = env.read_string(JSON_SCHEMA_PATH);
        let base_external_url = env.read_string(BASE_URL);

        let metrics_client =
            features::metrics_client(&env, &app_name, &hostname).map_err(Error::MetricsSetup)?;
        let error_report_client = features::error_report_client(&env, &code_version, &hostname)
            .map_err(Error::ErrorReportSetup)?;
        let database = features::database(&env).map_err(Error::DatabaseSetup)?;

        info!(
            app = %app_name,
            %hostname,
            api_port,
            metrics = metrics_client.is_live(),
            error_report = error_report_client.is_live(),
            database = database.is_some(),
            "application context ready"
        );

        let logger = logger.unwrap_or_else(|| Logger::stdout(&app_name));
        Ok(AppContext {
            shared: Arc::new(Shared {
                api_port,
                app_name,
                base_external_url,
                code_version,
                database,
                hostname,
                json_schema_path,
                metrics_client,
                error_report_client,
            }),
            logger,
        })
    }
}

fn load_layers(layers: Vec<Layer>) -> Result<EnvReader, ConfigError> {
    if layers.is_empty() {
        return Ok(EnvReader::process());
    }

    let mut sources: Vec<Box<dyn EnvSource>> = Vec::with_capacity(layers.len());
    for layer in layers {
        match layer {
            Layer::Source(source) => sources.push(source),
            Layer::File { path, required } => {
                sources.push(Box::new(FileEnv::load(&path, required)?));
            }
        }
    }
    Ok(EnvReader::new(sources))
}

fn read_port(env: &EnvReader) -> Result<u16, ConfigError> {
    let Some(port) = env.read_int(API_PORT)? else {
        return Ok(0);
    };
    if port < 0 {
        return Err(ConfigError::Negative {
            name: API_PORT.to_string(),
        });
    }
    u16::try_from(port).map_err(|_| ConfigError::OutOfRange {
        name: API_PORT.to_string(),
        value: port,
        min: 0,
        max: i64::from(u16::MAX),
    })
}
