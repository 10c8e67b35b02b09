//! GraphStore: the question graph operations over a shared backend

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{AccessMode, Choice, GraphBackend, GraphValue, Row};
use crate::query::{QueryBuilder, Statement, AFFECTED_COLUMN, NEXT_ID_COLUMN};
use crate::{Result, StorageError};

#[cfg(feature = "neo4j")]
use crate::config::GraphConfig;

/// Transaction mode of `find_successor`.
///
/// Lookups have always run in write transactions; switching to read would
/// change locking and routing behaviour for existing deployments.
pub const SUCCESSOR_LOOKUP_MODE: AccessMode = AccessMode::Write;

/// Question graph store
///
/// Cheap to clone; clones share one backend. Construct once at startup and
/// hand it to whatever serves requests.
///
/// # Examples
///
/// ```rust,ignore
/// use questiongraph_storage::{Choice, GraphStore, InMemoryBackend};
///
/// let store = GraphStore::new(InMemoryBackend::new());
/// store.create_node("q1").await?;
/// store.create_node("q2").await?;
/// store.create_edge("q1", "q2", &Choice::text("yes"), "e1").await?;
///
/// let next = store.find_successor("q1", &Choice::text("yes")).await?;
/// assert_eq!(next, "q2");
/// ```
#[derive(Clone)]
pub struct GraphStore {
    backend: Arc<dyn GraphBackend>,
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl GraphStore {
    pub fn new(backend: impl GraphBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn from_shared(backend: Arc<dyn GraphBackend>) -> Self {
        Self { backend }
    }

    /// Connect to Neo4j and verify the credentials
    ///
    /// # Errors
    ///
    /// `ErrorKind::Connection` if the server is unreachable or rejects the
    /// credentials, `ErrorKind::Config` for an invalid configuration.
    #[cfg(feature = "neo4j")]
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let backend = crate::infrastructure::Neo4jBackend::connect(config).await?;
        Ok(Self::new(backend))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Release the backend; repeated calls are no-ops
    pub async fn close(&self) -> Result<()> {
        info!(backend = self.backend.name(), "Closing graph store");
        self.backend.close().await
    }

    /// Run one statement in one transaction
    pub async fn execute(&self, statement: &Statement, mode: AccessMode) -> Result<Vec<Row>> {
        debug!(
            operation = %statement.operation,
            mode = mode.as_str(),
            "Executing statement"
        );
        self.backend.execute(statement, mode).await
    }

    /// Apply uniqueness constraints, skipping any the server refuses
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in QueryBuilder::ensure_schema() {
            if let Err(e) = self.execute(&statement, AccessMode::Write).await {
                warn!("Schema constraint skipped ({}): {}", statement.cypher, e);
            }
        }
        Ok(())
    }

    pub async fn create_node(&self, id: &str) -> Result<String> {
        let rows = self
            .execute(&QueryBuilder::create_node(id), AccessMode::Write)
            .await?;
        debug!(id, affected = affected(&rows), "Merged question");
        Ok(format!(">>> Save Node: {}", id))
    }

    pub async fn delete_node(&self, id: &str) -> Result<String> {
        let rows = self
            .execute(&QueryBuilder::delete_node(id), AccessMode::Write)
            .await?;
        if affected(&rows) == 0 {
            debug!(id, "Delete matched no question");
        }
        Ok(format!(">>> Deleted node : {}", id))
    }

    /// Wipe the whole graph. Not exposed over HTTP.
    pub async fn delete_all_nodes(&self) -> Result<String> {
        let rows = self
            .execute(&QueryBuilder::delete_all_nodes(), AccessMode::Write)
            .await?;
        info!(deleted = affected(&rows), "Deleted all questions");
        Ok(">>> All Nodes Deleted".to_string())
    }

    /// Missing endpoints are not an error: nothing is created and the
    /// confirmation is still returned.
    pub async fn create_edge(
        &self,
        source: &str,
        target: &str,
        choice: &Choice,
        edge_id: &str,
    ) -> Result<String> {
        let statement = QueryBuilder::create_edge(source, target, choice, edge_id);
        let rows = self.execute(&statement, AccessMode::Write).await?;
        if affected(&rows) == 0 {
            warn!(
                source,
                target,
                edge_id,
                "Edge not created: source or target question does not exist"
            );
        }
        Ok(format!(">>> Create Edge Between {} and {}", source, target))
    }

    pub async fn update_edge(&self, edge_id: &str, choice: &Choice) -> Result<String> {
        let statement = QueryBuilder::update_edge_choice(edge_id, choice);
        let rows = self.execute(&statement, AccessMode::Write).await?;
        match affected(&rows) {
            0 => warn!(edge_id, "Update matched no edge"),
            1 => debug!(edge_id, %choice, "Updated edge choice"),
            n => warn!(edge_id, matched = n, "Duplicate edge ids updated"),
        }
        Ok(format!(">>> Updated Edge: {}", edge_id))
    }

    pub async fn delete_edge(&self, edge_id: &str) -> Result<String> {
        let rows = self
            .execute(&QueryBuilder::delete_edge(edge_id), AccessMode::Write)
            .await?;
        if affected(&rows) == 0 {
            debug!(edge_id, "Delete matched no edge");
        }
        Ok(format!(">>> Deleted relationship {}", edge_id))
    }

    /// Id of the question reached from `id` under `choice`
    ///
    /// # Errors
    ///
    /// `ErrorKind::NotFound` when no outgoing edge matches.
    pub async fn find_successor(&self, id: &str, choice: &Choice) -> Result<String> {
        let statement = QueryBuilder::find_successor(id, choice);
        let rows = self.execute(&statement, SUCCESSOR_LOOKUP_MODE).await?;

        let row = rows
            .first()
            .ok_or_else(|| StorageError::successor_not_found(id, choice))?;
        match row.get(NEXT_ID_COLUMN) {
            Some(GraphValue::String(next)) => Ok(next.clone()),
            other => Err(StorageError::decode(format!(
                "Expected string column '{}', got {:?}",
                NEXT_ID_COLUMN, other
            ))),
        }
    }
}

/// Row count reported by a mutation, 0 when absent
fn affected(rows: &[Row]) -> i64 {
    rows.first()
        .and_then(|row| row.get(AFFECTED_COLUMN))
        .and_then(GraphValue::as_i64)
        .unwrap_or(0)
}
