use std::collections::HashMap;

/// One layer of the environment a context is assembled from.
pub trait EnvSource: Send + Sync + std::fmt::Debug {
    /// Returns the value of `name`, or `None` if this layer doesn't define it.
    ///
    /// A variable set to the empty string is `Some("")`, not `None`.
    fn get(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// An in-memory environment.
///
/// Useful in tests and when embedding a context in a host that owns its own
/// settings:
///
/// ```
/// use app_context::config::{EnvSource, MapEnv};
///
/// let env = MapEnv::from_iter([("API_PORT", "8080")]);
/// assert_eq!(env.get("API_PORT").as_deref(), Some("8080"));
/// assert_eq!(env.get("BASE_URL"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    /// An empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, replacing any previous value.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_env_distinguishes_empty_from_unset() {
        let env = MapEnv::new().set("EMPTY", "");

        assert_eq!(env.get("EMPTY").as_deref(), Some(""));
        assert_eq!(env.get("MISSING"), None);
    }

    #[test]
    fn test_map_env_set_overwrites() {
        let env = MapEnv::from_iter([("A", "1")]).set("A", "2");
        assert_eq!(env.get("A").as_deref(), Some("2"));
    }
}
