//! questiongraph-storage - branching question graphs on a graph database
//!
//! > Questions are nodes, answers are edges: the next question is whatever
//! > the chosen answer points at.
//!
//! ## Core Principles
//!
//! 1. **Identity by id**: one `QUESTION` node per question id (merge, never create)
//! 2. **Edges by edgeId**: transitions are updated and deleted through `edgeId` only
//! 3. **Typed choices**: `1`, `1.0`, `"1"` and `true` are distinct conditions; an
//!    absent choice marks the default transition
//! 4. **Bound parameters**: values never appear in the Cypher text
//! 5. **One statement, one transaction**: no retries, no batching
//!
//! ## Usage
//!
//! ```rust,ignore
//! use questiongraph_storage::{Choice, GraphConfig, GraphStore};
//!
//! let store = GraphStore::connect(&GraphConfig::from_env()?).await?;
//!
//! store.create_node("q1").await?;
//! store.create_node("q2").await?;
//! store.create_edge("q1", "q2", &Choice::text("yes"), "q1-yes").await?;
//!
//! assert_eq!(store.find_successor("q1", &Choice::text("yes")).await?, "q2");
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod query;
pub mod store;

pub use config::GraphConfig;
pub use error::{ErrorKind, Result, StorageError};
pub use store::GraphStore;

pub use domain::{
    AccessMode, Choice, ChoiceError, ChoiceKind, GraphBackend, GraphValue, QuestionNode, Row,
    Transition,
};
pub use infrastructure::InMemoryBackend;
pub use query::{GraphOperation, QueryBuilder, Statement};

#[cfg(feature = "neo4j")]
pub use infrastructure::Neo4jBackend;
