//! Typed reads over a layered environment.

use super::source::{EnvSource, ProcessEnv};
use super::ConfigError;

/// Outcome of reading a `<PREFIX>_DISABLE` flag.
///
/// A malformed value counts as disabled *and* carries an error. Callers that
/// want to abort on bad input go through [`check`](Self::check) before looking
/// at anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisableFlag {
    /// The flag isn't set.
    Unset,
    /// The flag is `"false"`.
    Enabled,
    /// The flag is `"true"`.
    Disabled,
    /// The flag holds something other than `"true"` or `"false"`.
    Invalid { name: String, value: String },
}

impl DisableFlag {
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled | Self::Invalid { .. })
    }

    /// Returns whether the feature is disabled, or the error for a malformed flag.
    pub fn check(&self) -> Result<bool, ConfigError> {
        match self {
            Self::Invalid { name, value } => Err(ConfigError::InvalidFlag {
                name: name.clone(),
                value: value.clone(),
            }),
            other => Ok(other.is_disabled()),
        }
    }
}

/// Reads variables from a stack of [`EnvSource`] layers.
///
/// Layers are consulted last-to-first, so later layers override earlier ones.
#[derive(Debug)]
pub struct EnvReader {
    layers: Vec<Box<dyn EnvSource>>,
}

impl EnvReader {
    pub fn new(layers: Vec<Box<dyn EnvSource>>) -> Self {
        Self { layers }
    }

    /// A reader over the real process environment only.
    pub fn process() -> Self {
        Self::from_source(ProcessEnv)
    }

    pub fn from_source(source: impl EnvSource + 'static) -> Self {
        Self::new(vec![Box::new(source)])
    }

    /// Returns the value of `name`, distinguishing "set to empty" from unset.
    pub fn lookup(&self, name: &str) -> Option<String> {
        self.layers.iter().rev().find_map(|layer| layer.get(name))
    }

    /// Returns the value of `name`, or an empty string if unset.
    pub fn read_string(&self, name: &str) -> String {
        self.lookup(name).unwrap_or_default()
    }

    /// Reads an integer.
    ///
    /// Unset and empty both give `Ok(None)`. A value that is set but isn't an
    /// integer is an error.
    pub fn read_int(&self, name: &str) -> Result<Option<i64>, ConfigError> {
        match self.lookup(name) {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|source| ConfigError::InvalidInteger {
                    name: name.to_string(),
                    source,
                }),
        }
    }

    /// Reads `<prefix>_DISABLE`.
    pub fn read_disable_flag(&self, prefix: &str) -> DisableFlag {
        let name = format!("{prefix}_DISABLE");
        match self.lookup(&name).as_deref() {
            None => DisableFlag::Unset,
            Some("true") => DisableFlag::Disabled,
            Some("false") => DisableFlag::Enabled,
            Some(value) => DisableFlag::Invalid {
                value: value.to_string(),
                name,
            },
        }
    }
}
