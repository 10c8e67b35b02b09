//! In-memory backend
//!
//! Interprets statements by their `GraphOperation` and bound parameters,
//! reproducing what the Cypher text does on a real server: merge semantics,
//! cascading deletes, typed equality on `choice`, and `count(*)` results.
//! Edges keep insertion order, which stands in for the server's unspecified
//! row order.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::domain::{AccessMode, Choice, GraphBackend, GraphValue, QuestionNode, Row, Transition};
use crate::query::{GraphOperation, Statement, AFFECTED_COLUMN, NEXT_ID_COLUMN};
use crate::{Result, StorageError};

#[derive(Debug, Clone)]
struct StoredEdge {
    edge_id: String,
    source: String,
    target: String,
    choice: Option<GraphValue>,
}

impl StoredEdge {
    fn choice_matches(&self, wanted: &GraphValue) -> bool {
        self.choice
            .as_ref()
            .map_or(false, |stored| stored.graph_eq(wanted))
    }
}

#[derive(Debug, Default)]
struct MemoryGraph {
    nodes: BTreeSet<String>,
    edges: Vec<StoredEdge>,
    /// Set once `ensure_schema` ran; enforces unique edge ids from then on
    unique_edge_ids: bool,
}

/// Process-local graph backend
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    graph: Mutex<MemoryGraph>,
    closed: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> Vec<QuestionNode> {
        self.graph
            .lock()
            .nodes
            .iter()
            .map(QuestionNode::new)
            .collect()
    }

    pub fn transitions(&self) -> Vec<Transition> {
        self.graph
            .lock()
            .edges
            .iter()
            .map(|e| {
                Transition::new(
                    e.edge_id.clone(),
                    e.source.clone(),
                    e.target.clone(),
                    e.choice.clone().map(Choice::from).unwrap_or_default(),
                )
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.lock().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.lock().edges.len()
    }
}

fn required<'a>(statement: &'a Statement, name: &str) -> Result<&'a str> {
    statement.get_str(name).ok_or_else(|| {
        StorageError::query_execution(format!(
            "Expected string parameter ${} for {}",
            name, statement.operation
        ))
    })
}

fn count_row(count: usize) -> Vec<Row> {
    let mut row = Row::new();
    let affected = GraphValue::Integer(count as i64);
    row.insert(AFFECTED_COLUMN.to_string(), affected);
    vec![row]
}

impl MemoryGraph {
    fn apply(&mut self, statement: &Statement) -> Result<Vec<Row>> {
        let choice = statement.get("choice");

        match statement.operation {
            GraphOperation::EnsureSchema => {
                self.unique_edge_ids = true;
                Ok(Vec::new())
            }
            GraphOperation::CreateNode => {
                let id = required(statement, "id")?;
                self.nodes.insert(id.to_string());
                Ok(count_row(1))
            }
            GraphOperation::DeleteNode => {
                let id = required(statement, "id")?;
                if !self.nodes.remove(id) {
                    return Ok(count_row(0));
                }
                self.edges.retain(|e| e.source != id && e.target != id);
                Ok(count_row(1))
            }
            GraphOperation::DeleteAllNodes => {
                let count = self.nodes.len();
                self.nodes.clear();
                self.edges.clear();
                Ok(count_row(count))
            }
            GraphOperation::CreateEdge => {
                let source = required(statement, "source")?;
                let target = required(statement, "target")?;
                let edge_id = required(statement, "edge_id")?;
                if !self.nodes.contains(source) || !self.nodes.contains(target) {
                    return Ok(count_row(0));
                }

                // MERGE matches on every property in the pattern
                let exists = self.edges.iter().any(|e| {
                    e.source == source
                        && e.target == target
                        && e.edge_id == edge_id
                        && choice.map_or(true, |c| e.choice_matches(c))
                });
                if !exists {
                    let taken = self.edges.iter().any(|e| e.edge_id == edge_id);
                    if self.unique_edge_ids && taken {
                        return Err(StorageError::query_execution(format!(
                            "Relationship already exists with type NEXT and property edgeId = '{}'",
                            edge_id
                        )));
                    }
                    self.edges.push(StoredEdge {
                        edge_id: edge_id.to_string(),
                        source: source.to_string(),
                        target: target.to_string(),
                        choice: choice.cloned(),
                    });
                }
                Ok(count_row(1))
            }
            GraphOperation::UpdateEdgeChoice => {
                let edge_id = required(statement, "edge_id")?;
                let mut count = 0;
                for edge in self.edges.iter_mut().filter(|e| e.edge_id == edge_id) {
                    edge.choice = choice.cloned();
                    count += 1;
                }
                Ok(count_row(count))
            }
            GraphOperation::DeleteEdge => {
                let edge_id = required(statement, "edge_id")?;
                let before = self.edges.len();
                self.edges.retain(|e| e.edge_id != edge_id);
                Ok(count_row(before - self.edges.len()))
            }
            GraphOperation::FindSuccessor => {
                let id = required(statement, "id")?;
                let mut outgoing = self.edges.iter().filter(|e| e.source == id);
                let found = match choice {
                    Some(wanted) => outgoing.find(|e| e.choice_matches(wanted)),
                    None => {
                        let outgoing: Vec<&StoredEdge> = outgoing.collect();
                        outgoing
                            .iter()
                            .find(|e| e.choice.is_none())
                            .or_else(|| outgoing.first())
                            .copied()
                    }
                };

                Ok(found
                    .map(|e| {
                        let mut row = Row::new();
                        let next = GraphValue::String(e.target.clone());
                        row.insert(NEXT_ID_COLUMN.to_string(), next);
                        vec![row]
                    })
                    .unwrap_or_default())
            }
        }
    }
}

#[async_trait]
impl GraphBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn execute(&self, statement: &Statement, mode: AccessMode) -> Result<Vec<Row>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::store_closed());
        }
        if mode == AccessMode::Read && statement.operation != GraphOperation::FindSuccessor {
            return Err(StorageError::query_execution(format!(
                "Writing in read access mode not allowed ({})",
                statement.operation
            )));
        }

        // One lock per statement: each call is its own transaction
        let rows = self.graph.lock().apply(statement)?;
        debug!(operation = %statement.operation, rows = rows.len(), "In-memory statement applied");
        Ok(rows)
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
