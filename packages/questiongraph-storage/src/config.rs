//! Connection settings for the graph database
//!
//! Loaded from the process environment (`URI`, `USER`, `PASSWORD`, plus the
//! optional `DATABASE` and `MAX_CONNECTIONS`) or from a YAML file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Result, StorageError};

pub const ENV_URI: &str = "URI";
pub const ENV_USER: &str = "USER";
pub const ENV_PASSWORD: &str = "PASSWORD";
pub const ENV_DATABASE: &str = "DATABASE";
pub const ENV_MAX_CONNECTIONS: &str = "MAX_CONNECTIONS";

const SUPPORTED_SCHEMES: &[&str] = &[
    "bolt",
    "bolt+s",
    "bolt+ssc",
    "neo4j",
    "neo4j+s",
    "neo4j+ssc",
];

fn missing_variable(key: &str) -> StorageError {
    StorageError::config(format!("Missing environment variable {}", key))
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_max_connections() -> usize {
    16
}

fn default_fetch_size() -> usize {
    200
}

/// Graph database connection settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    /// Bolt URI, e.g. `bolt://localhost:7687`
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    pub password: String,

    /// Target database; the server default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Upper bound on pooled Bolt connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Rows pulled per round trip
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

impl std::fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphConfig")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("fetch_size", &self.fetch_size)
            .finish()
    }
}

impl GraphConfig {
    pub fn new(
        uri: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            user: user.into(),
            password: password.into(),
            database: None,
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }

    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| missing_variable(key))
        };

        let mut config = Self::new(
            required(ENV_URI)?,
            lookup(ENV_USER).unwrap_or_else(default_user),
            required(ENV_PASSWORD)?,
        );
        config.database = lookup(ENV_DATABASE).filter(|v| !v.is_empty());
        if let Some(raw) = lookup(ENV_MAX_CONNECTIONS) {
            config.max_connections = raw.parse().map_err(|_| {
                StorageError::config(format!(
                    "{} must be a positive integer, got '{}'",
                    ENV_MAX_CONNECTIONS, raw
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load settings from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GraphConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = || StorageError::config(format!("Invalid graph URI '{}'", self.uri));
        let (scheme, _) = self.uri.split_once("://").ok_or_else(invalid)?;

        if !SUPPORTED_SCHEMES.contains(&scheme) {
            return Err(StorageError::config(format!(
                "Unsupported URI scheme '{}'. Supported: {}",
                scheme,
                SUPPORTED_SCHEMES.join(", ")
            )));
        }
        if self.max_connections == 0 {
            return Err(StorageError::config("max_connections must be at least 1"));
        }
        if self.fetch_size == 0 {
            return Err(StorageError::config("fetch_size must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_minimal() {
        let env = lookup(&[("URI", "bolt://localhost:7687"), ("PASSWORD", "pw")]);
        let config = GraphConfig::from_lookup(env).unwrap();

        assert_eq!(config.uri, "bolt://localhost:7687");
        assert_eq!(config.user, "neo4j");
        assert_eq!(config.password, "pw");
        assert_eq!(config.database, None);
        assert_eq!(config.max_connections, 16);
    }

    #[test]
    fn test_from_lookup_all_fields() {
        let env = lookup(&[
            ("URI", "neo4j+s://graph.example.com"),
            ("USER", "admin"),
            ("PASSWORD", "secret"),
            ("DATABASE", "questions"),
            ("MAX_CONNECTIONS", "4"),
        ]);
        let config = GraphConfig::from_lookup(env).unwrap();

        assert_eq!(config.user, "admin");
        assert_eq!(config.database.as_deref(), Some("questions"));
        assert_eq!(config.max_connections, 4);
    }

    #[test]
    fn test_from_lookup_missing_uri() {
        let env = lookup(&[("PASSWORD", "x")]);
        let err = GraphConfig::from_lookup(env).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
        assert!(err.message.contains("URI"));
    }

    #[test]
    fn test_from_lookup_bad_pool_size() {
        let env = lookup(&[
            ("URI", "bolt://localhost:7687"),
            ("PASSWORD", "x"),
            ("MAX_CONNECTIONS", "many"),
        ]);
        let err = GraphConfig::from_lookup(env).unwrap_err();
        assert!(err.message.contains("MAX_CONNECTIONS"));
    }

    #[test]
    fn test_validate_rejects_unknown_scheme() {
        let config = GraphConfig::new("http://localhost:7474", "neo4j", "x");
        let err = config.validate().unwrap_err();
        assert!(err.message.contains("Unsupported URI scheme 'http'"));

        let config = GraphConfig::new("localhost:7687", "neo4j", "x");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = GraphConfig::new("bolt://localhost:7687", "neo4j", "passw0rd");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("passw0rd"));
    }

    #[test]
    fn test_yaml_loading() {
        let yaml_content = r#"
uri: bolt://db:7687
password: passw0rd
max_connections: 8
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = GraphConfig::from_yaml(temp_file.path()).unwrap();
        assert_eq!(config.uri, "bolt://db:7687");
        assert_eq!(config.user, "neo4j");
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.fetch_size, 200);
    }

    #[test]
    fn test_yaml_unknown_field() {
        let yaml_content = r#"
uri: bolt://db:7687
password: passw0rd
pasword: typo
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let err = GraphConfig::from_yaml(temp_file.path()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
    }

    #[test]
    fn test_yaml_missing_file() {
        let err = GraphConfig::from_yaml("/nonexistent/graph.yaml").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
    }
}
