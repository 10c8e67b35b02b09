//! Binary entrypoint for the question graph HTTP server.

use anyhow::Context;
use clap::Parser;
use questiongraph_storage::{GraphStore, InMemoryBackend};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use questiongraph_server::cli::{Backend, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let store = match cli.backend {
        Backend::Memory => {
            info!("Using in-memory graph; data is lost on exit");
            GraphStore::new(InMemoryBackend::new())
        }
        Backend::Neo4j => {
            let config = cli.graph_config().context("invalid graph configuration")?;
            info!("Connecting to {} as user '{}'", config.uri, config.user);
            GraphStore::connect(&config)
                .await
                .context("failed to connect to graph database")?
        }
    };

    if cli.ensure_schema {
        store
            .ensure_schema()
            .await
            .context("failed to ensure schema")?;
    }

    questiongraph_server::serve(cli.bind, store).await
}
