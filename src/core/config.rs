//! Configuration tree for backend construction
//!
//! Configuration-file parsing lives outside this crate; whatever loads the
//! file hands over a deserialized [`ReporterConfig`]. Each backend factory
//! receives only its own [`BackendConfig`] section, and an absent section
//! means the factory applies its documented defaults.

use super::error::{ReporterError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One backend's key-value configuration section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(flatten)]
    values: Map<String, Value>,
}

impl BackendConfig {
    pub fn new() -> Self {
        Self { values: Map::new() }
    }

    /// Builder-style insertion, mainly for bootstrap code and tests
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Read a key as a TCP port number
    ///
    /// Missing key is `Ok(None)`; a present key that is not a valid port
    /// is a configuration error attributed to `backend`.
    pub fn get_port(&self, key: &str, backend: &str) -> Result<Option<u16>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(value) => {
                let port = value
                    .as_u64()
                    .and_then(|p| u16::try_from(p).ok())
                    .ok_or_else(|| {
                        ReporterError::configuration(
                            backend,
                            format!("'{}' must be a port number, got {}", key, value),
                        )
                    })?;
                Ok(Some(port))
            }
        }
    }

    /// Read a key as a boolean, with a default for the missing case
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The full configuration tree, keyed by backend name
///
/// ```
/// use process_reporter::core::config::{BackendConfig, ReporterConfig};
///
/// let config = ReporterConfig::new()
///     .with_initial_backend("graphite")
///     .with_section(
///         "graphite",
///         BackendConfig::new()
///             .with_value("host", "metrics.internal")
///             .with_value("port", 2003),
///     );
/// assert_eq!(config.initial_backend(), Some("graphite"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Initial active backend name; falls back to `"default"` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,

    /// Per-backend configuration sections
    #[serde(default)]
    pub backends: HashMap<String, BackendConfig>,
}

impl ReporterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_initial_backend(mut self, name: impl Into<String>) -> Self {
        self.backend = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_section(mut self, name: impl Into<String>, section: BackendConfig) -> Self {
        self.backends.insert(name.into(), section);
        self
    }

    pub fn initial_backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    pub fn section(&self, name: &str) -> Option<&BackendConfig> {
        self.backends.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_lookup() {
        let config = ReporterConfig::new().with_section(
            "graphite",
            BackendConfig::new().with_value("host", "10.0.0.5"),
        );

        let section = config.section("graphite").expect("section exists");
        assert_eq!(section.get_str("host"), Some("10.0.0.5"));
        assert!(config.section("datadog").is_none());
    }

    #[test]
    fn test_get_port() {
        let section = BackendConfig::new().with_value("port", 2003);
        assert_eq!(section.get_port("port", "graphite").unwrap(), Some(2003));
        assert_eq!(section.get_port("missing", "graphite").unwrap(), None);

        let bad = BackendConfig::new().with_value("port", "not-a-port");
        let err = bad.get_port("port", "graphite").unwrap_err();
        assert!(matches!(
            err,
            crate::core::error::ReporterError::Configuration { .. }
        ));
    }

    #[test]
    fn test_get_bool_default() {
        let section = BackendConfig::new().with_value("colors", false);
        assert!(!section.get_bool("colors", true));
        assert!(section.get_bool("missing", true));
    }

    #[test]
    fn test_deserialize_tree() {
        let config: ReporterConfig = serde_json::from_str(
            r#"{
                "backend": "graphite",
                "backends": {
                    "graphite": { "host": "127.0.0.1", "port": 2003 }
                }
            }"#,
        )
        .expect("valid config");

        assert_eq!(config.initial_backend(), Some("graphite"));
        let section = config.section("graphite").expect("section exists");
        assert_eq!(section.get_str("host"), Some("127.0.0.1"));
        assert_eq!(section.get_port("port", "graphite").unwrap(), Some(2003));
    }
}
