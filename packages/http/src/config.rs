//! Server configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use kvorm_core::Error;

pub const NAMESPACE_ENV: &str = "KVORM_NAMESPACE";
pub const PATH_PREFIX_ENV: &str = "KVORM_PATH_PREFIX";

/// Configuration for a [`Server`](crate::Server).
///
/// ```json
/// { "namespace": "inventory", "path_prefix": "/api" }
/// ```
///
/// Both keys are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Prefix of every storage key this server writes.
    pub namespace: String,

    /// Request paths must start with this prefix, which is stripped before
    /// resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            namespace: "kvorm".to_string(),
            path_prefix: None,
        }
    }
}

impl ServerConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| Error::configuration("Invalid server configuration").with_source(e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!("Cannot read configuration '{}'", path.display()))
                .with_source(e)
        })?;
        Self::from_json_str(&text)
    }

    /// Apply `KVORM_NAMESPACE` and `KVORM_PATH_PREFIX` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Result<Self, Error> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(namespace) = lookup(NAMESPACE_ENV) {
            self.namespace = namespace;
        }
        if let Some(prefix) = lookup(PATH_PREFIX_ENV) {
            self.path_prefix = Some(prefix);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.namespace.is_empty() {
            return Err(Error::configuration("Namespace must not be empty."));
        }
        if self.namespace.contains(':') {
            return Err(Error::configuration(format!(
                "Namespace '{}' must not contain ':'.",
                self.namespace
            )));
        }
        if let Some(prefix) = self.path_prefix.as_deref() {
            if !prefix.is_empty() && !prefix.starts_with('/') {
                return Err(Error::configuration(format!(
                    "Path prefix '{}' must start with '/'.",
                    prefix
                )));
            }
        }
        Ok(())
    }

    /// The path prefix without trailing slashes, or `None` when it is empty.
    pub fn normalized_prefix(&self) -> Option<&str> {
        self.path_prefix
            .as_deref()
            .map(|p| p.trim_end_matches('/'))
            .filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvorm_core::ErrorKind;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ServerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.namespace, "kvorm");
        assert_eq!(config.normalized_prefix(), None);
    }

    #[test]
    fn from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"namespace": "inventory", "path_prefix": "/api/"}}"#).unwrap();

        let config = ServerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.namespace, "inventory");
        assert_eq!(config.normalized_prefix(), Some("/api"));
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().starts_with("Cannot read configuration"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ServerConfig::from_json_str(r#"{"namespce": "typo"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn invalid_namespaces() {
        assert!(ServerConfig::from_json_str(r#"{"namespace": ""}"#).is_err());
        assert!(ServerConfig::from_json_str(r#"{"namespace": "a:b"}"#).is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let config = ServerConfig::new("file")
            .with_overrides(|key| match key {
                NAMESPACE_ENV => Some("env".to_string()),
                PATH_PREFIX_ENV => Some("/v1".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.namespace, "env");
        assert_eq!(config.normalized_prefix(), Some("/v1"));

        let config = ServerConfig::new("file").with_overrides(|_| None).unwrap();
        assert_eq!(config.namespace, "file");
    }

    #[test]
    fn prefixes_must_be_absolute() {
        let err = ServerConfig::from_json_str(r#"{"path_prefix": "api"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.to_string(), "Path prefix 'api' must start with '/'.");

        let err = ServerConfig::default()
            .with_overrides(|key| (key == PATH_PREFIX_ENV).then(|| "v1/".to_string()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        assert!(ServerConfig::from_json_str(r#"{"path_prefix": ""}"#).is_ok());
        assert!(ServerConfig::default().with_path_prefix("/api").validate().is_ok());
    }

    #[test]
    fn root_prefix_is_no_prefix() {
        let config = ServerConfig::default().with_path_prefix("/");
        assert_eq!(config.normalized_prefix(), None);
    }
}
