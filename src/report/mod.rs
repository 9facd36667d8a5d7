//! Rollbar error reporting.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::error::ClientInitError;

pub const DEFAULT_ENDPOINT: &str = "https://api.rollbar.com/api/1/item/";

const CLIENT_NAME: &str = "rollbar";
const ACCESS_TOKEN_HEADER: &str = "x-rollbar-access-token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Deployment environment attached to every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportEnvironment {
    Development,
    Staging,
    Production,
}

impl ReportEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl FromStr for ReportEnvironment {
    type Err = ();

    /// Accepts the exact lowercase names only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

/// Mutable settings of a [`RollbarClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbarOptions {
    /// `None` reports as `development`.
    pub environment: Option<ReportEnvironment>,
    pub code_version: Option<String>,
    pub host: Option<String>,
    pub endpoint: String,
}

impl Default for RollbarOptions {
    fn default() -> Self {
        Self {
            environment: None,
            code_version: None,
            host: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to send report: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("report rejected with status {0}")]
    Rejected(reqwest::StatusCode),
}

/// A live Rollbar client.
#[derive(Debug)]
pub struct RollbarClient {
    http: reqwest::Client,
    options: RollbarOptions,
}

impl RollbarClient {
    /// Creates a client authenticating with `access_token`.
    ///
    /// Fails if the token can't be sent as a header value or the HTTP client
    /// can't be built.
    pub fn new(access_token: &str) -> Result<Self, ClientInitError> {
        let mut token = HeaderValue::from_str(access_token)
            .map_err(|e| ClientInitError::new(CLIENT_NAME, e))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientInitError::new(CLIENT_NAME, e))?;

        Ok(Self {
            http,
            options: RollbarOptions::default(),
        })
    }

    /// Environment, code version and host sent with every item.
    pub fn options(&self) -> &RollbarOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut RollbarOptions {
        &mut self.options
    }

    /// Builds the item payload for a message.
    pub fn item<'a>(&'a self, level: Level, message: &'a str) -> Item<'a> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Item {
            data: ItemData {
                environment: self
                    .options
                    .environment
                    .unwrap_or(ReportEnvironment::Development),
                level,
                timestamp,
                language: "rust",
                server: Server {
                    host: self.options.host.as_deref(),
                    code_version: self.options.code_version.as_deref(),
                },
                body: Body {
                    message: Message { body: message },
                },
            },
        }
    }

    /// Posts one item to the Rollbar API.
    pub async fn report(&self, level: Level, message: &str) -> Result<(), ReportError> {
        let response = self
            .http
            .post(&self.options.endpoint)
            .json(&self.item(level, message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Rejected(status));
        }
        debug!(?level, "error report delivered");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct Item<'a> {
    pub data: ItemData<'a>,
}

#[derive(Debug, Serialize)]
pub struct ItemData<'a> {
    pub environment: ReportEnvironment,
    pub level: Level,
    pub timestamp: u64,
    pub language: &'static str,
    pub server: Server<'a>,
    pub body: Body<'a>,
}

#[derive(Debug, Serialize)]
pub struct Server<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_version: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct Body<'a> {
    pub message: Message<'a>,
}

#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub body: &'a str,
}

/// Handle for reporting errors: a live Rollbar client or a no-op.
#[derive(Clone, Default)]
pub enum ErrorReportClient {
    Live(Arc<RollbarClient>),
    #[default]
    NoOp,
}

impl ErrorReportClient {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    /// Sends `message` at `level`. The no-op client returns `Ok` without sending.
    pub async fn report(&self, level: Level, message: &str) -> Result<(), ReportError> {
        match self {
            Self::Live(client) => client.report(level, message).await,
            Self::NoOp => Ok(()),
        }
    }
}

impl fmt::Debug for ErrorReportClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live(_) => f.write_str("ErrorReportClient::Live"),
            Self::NoOp => f.write_str("ErrorReportClient::NoOp"),
        }
    }
}
