//! Command-line arguments.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use questiongraph_storage::config::{ENV_PASSWORD, ENV_URI, ENV_USER};
use questiongraph_storage::{GraphConfig, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Neo4j over Bolt
    Neo4j,
    /// Process-local graph, lost on exit
    Memory,
}

#[derive(Debug, Parser)]
#[command(name = "questiongraph-server")]
#[command(about = "HTTP service for question graphs stored in Neo4j")]
pub struct Cli {
    /// HTTP listen address
    #[arg(long, default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// YAML file with graph connection settings (takes precedence over env)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Storage backend
    #[arg(long, value_enum, default_value_t = Backend::Neo4j)]
    pub backend: Backend,

    /// Bolt URI, overrides $URI
    #[arg(long)]
    pub uri: Option<String>,

    /// Database user, overrides $USER (usually the OS login name)
    #[arg(long)]
    pub user: Option<String>,

    /// Database password, overrides $PASSWORD
    #[arg(long)]
    pub password: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Create uniqueness constraints before serving
    #[arg(long)]
    pub ensure_schema: bool,
}

impl Cli {
    /// Resolve connection settings: YAML file if given, else flags over env.
    pub fn graph_config(&self) -> Result<GraphConfig> {
        self.graph_config_with(|key| std::env::var(key).ok())
    }

    pub fn graph_config_with<F>(&self, env: F) -> Result<GraphConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config {
            return GraphConfig::from_yaml(path);
        }

        GraphConfig::from_lookup(|key| {
            let flag = match key {
                ENV_URI => self.uri.clone(),
                ENV_USER => self.user.clone(),
                ENV_PASSWORD => self.password.clone(),
                _ => None,
            };
            flag.or_else(|| env(key))
        })
    }
}
