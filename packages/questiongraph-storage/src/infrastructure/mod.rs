//! Infrastructure layer - graph backends
//!
//! - `neo4j`: Bolt adapter (feature `neo4j`)
//! - `memory`: process-local graph

pub mod memory;

#[cfg(feature = "neo4j")]
pub mod neo4j;

pub use memory::InMemoryBackend;

#[cfg(feature = "neo4j")]
pub use neo4j::Neo4jBackend;
