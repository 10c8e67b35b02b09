//! Neo4j adapter over the Bolt protocol (`neo4rs`)
//!
//! The driver keeps its own connection pool; every `execute` borrows one
//! connection for a single explicit transaction and commits it, or rolls it
//! back when the statement or row stream fails.
//!
//! `AccessMode` is not forwarded: the driver opens every explicit
//! transaction the same way, so read statements run like writes.

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Query, Txn};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::GraphConfig;
use crate::domain::{AccessMode, GraphBackend, GraphValue, Row};
use crate::query::{GraphOperation, Statement, AFFECTED_COLUMN, NEXT_ID_COLUMN};
use crate::{Result, StorageError};

/// Neo4j-backed graph store adapter
pub struct Neo4jBackend {
    graph: RwLock<Option<Graph>>,
    uri: String,
}

impl Neo4jBackend {
    /// Open the connection pool and check the server accepts our credentials
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .max_connections(config.max_connections)
            .fetch_size(config.fetch_size);
        if let Some(db) = &config.database {
            builder = builder.db(db.as_str());
        }
        let neo_config = builder.build().map_err(|e| {
            StorageError::config(format!("Invalid Neo4j configuration: {}", e)).with_source(e)
        })?;

        let graph = Graph::connect(neo_config).await.map_err(|e| {
            let message = format!("Failed to connect to {}: {}", config.uri, e);
            StorageError::connection(message).with_source(e)
        })?;

        // The pool connects lazily; force a round trip so bad credentials fail here
        graph.run(query("RETURN 1")).await.map_err(|e| {
            let message = format!("{} refused the session: {}", config.uri, e);
            StorageError::connection(message).with_source(e)
        })?;

        info!(uri = %config.uri, user = %config.user, "Connected to Neo4j");
        Ok(Self {
            graph: RwLock::new(Some(graph)),
            uri: config.uri.clone(),
        })
    }

    fn graph(&self) -> Result<Graph> {
        self.graph
            .read()
            .clone()
            .ok_or_else(StorageError::store_closed)
    }
}

/// Bind every parameter with its native Bolt type
fn to_query(statement: &Statement) -> Query {
    statement
        .params
        .iter()
        .fold(query(&statement.cypher), |q, (name, value)| match value {
            // Absent values never reach the parameter map
            GraphValue::Null => q,
            GraphValue::Bool(b) => q.param(name, *b),
            GraphValue::Integer(i) => q.param(name, *i),
            GraphValue::Float(f) => q.param(name, *f),
            GraphValue::String(s) => q.param(name, s.as_str()),
        })
}

fn decode_row(operation: GraphOperation, row: &neo4rs::Row) -> Result<Row> {
    let mut decoded = Row::new();
    for &column in operation.result_columns() {
        let value = match column {
            NEXT_ID_COLUMN => row.get::<String>(column).map(GraphValue::String),
            AFFECTED_COLUMN => row.get::<i64>(column).map(GraphValue::Integer),
            _ => continue,
        };
        let value = value.map_err(|e| {
            let message = format!("Column '{}' of {}: {}", column, operation, e);
            StorageError::decode(message)
        })?;
        decoded.insert(column.to_string(), value);
    }
    Ok(decoded)
}

async fn collect_rows(txn: &mut Txn, statement: &Statement) -> Result<Vec<Row>> {
    let mut stream = txn.execute(to_query(statement)).await?;
    let mut rows = Vec::new();
    while let Some(row) = stream.next(txn.handle()).await? {
        rows.push(decode_row(statement.operation, &row)?);
    }
    Ok(rows)
}

#[async_trait]
impl GraphBackend for Neo4jBackend {
    fn name(&self) -> &'static str {
        "neo4j"
    }

    async fn execute(&self, statement: &Statement, mode: AccessMode) -> Result<Vec<Row>> {
        let graph = self.graph()?;
        debug!(
            operation = %statement.operation,
            mode = mode.as_str(),
            cypher = %statement.cypher,
            "Running Cypher"
        );

        let mut txn = graph.start_txn().await?;
        match collect_rows(&mut txn, statement).await {
            Ok(rows) => {
                txn.commit().await?;
                Ok(rows)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(
                        "Rollback after failed {} also failed: {}",
                        statement.operation, rollback
                    );
                }
                Err(e)
            }
        }
    }

    async fn close(&self) -> Result<()> {
        if self.graph.write().take().is_some() {
            info!(uri = %self.uri, "Released Neo4j connection pool");
        }
        Ok(())
    }
}
