//! Domain layer for the question graph
//!
//! # Domain Models
//!
//! - `QuestionNode`: a vertex, identified by its question id
//! - `Transition`: a directed `NEXT` edge, identified by `edge_id`
//! - `Choice`: the typed condition a transition carries (or not)
//!
//! # Port Trait
//!
//! - `GraphBackend`: runs one statement in one transaction, rows out
//!
//! # Examples
//!
//! ```rust,ignore
//! use questiongraph_storage::domain::{AccessMode, GraphBackend};
//! use questiongraph_storage::QueryBuilder;
//!
//! async fn example(backend: impl GraphBackend) -> Result<()> {
//!     let statement = QueryBuilder::create_node("q1");
//!     let rows = backend.execute(&statement, AccessMode::Write).await?;
//!     assert_eq!(rows.len(), 1);
//!     Ok(())
//! }
//! ```

mod choice;

pub use choice::{Choice, ChoiceError, ChoiceKind, GraphValue, NO_CONDITION_SENTINEL};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::query::Statement;
use crate::Result;

// ═══════════════════════════════════════════════════════════════════════════
// Domain Models
// ═══════════════════════════════════════════════════════════════════════════

/// Question vertex
///
/// Identity is `id`; the graph holds at most one node per id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionNode {
    pub id: String,
}

impl QuestionNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Directed transition between two questions
///
/// # Examples
///
/// ```rust
/// use questiongraph_storage::domain::{Choice, Transition};
///
/// let edge = Transition::new("e1", "q1", "q2", Choice::text("yes"));
/// assert_eq!(edge.edge_id, "e1");
/// assert!(!edge.is_unconditional());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(rename = "edgeId")]
    pub edge_id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub choice: Choice,
}

impl Transition {
    pub fn new(
        edge_id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        choice: Choice,
    ) -> Self {
        Self {
            edge_id: edge_id.into(),
            source: source.into(),
            target: target.into(),
            choice,
        }
    }

    /// Default transition, taken when no choice is given
    pub fn is_unconditional(&self) -> bool {
        self.choice.is_none()
    }
}

/// One result row: return column name to value
pub type Row = BTreeMap<String, GraphValue>;

/// Transaction mode a statement runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Read => "read",
            AccessMode::Write => "write",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Port Trait: GraphBackend
// ═══════════════════════════════════════════════════════════════════════════

/// Graph database execution port
///
/// A backend owns whatever connection state it needs and must be safe to
/// share across concurrent requests. Each `execute` call is exactly one
/// statement inside exactly one transaction; nothing is retried.
///
/// # Implementations
///
/// - `Neo4jBackend`: Bolt driver (feature `neo4j`)
/// - `InMemoryBackend`: process-local graph for tests and development
#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Run one statement in one transaction
    ///
    /// # Errors
    ///
    /// - `ErrorKind::Connection` if the backend is closed or unreachable
    /// - `ErrorKind::QueryExecution` if the database rejects the statement
    async fn execute(&self, statement: &Statement, mode: AccessMode) -> Result<Vec<Row>>;

    /// Release connections. Calling it again is a no-op.
    async fn close(&self) -> Result<()>;
}
