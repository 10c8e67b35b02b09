//! Cypher statement construction
//!
//! Every caller-supplied value is bound as a parameter; nothing is spliced
//! into the query text. The text itself only varies with the *shape* of the
//! request: a `Choice::NoCondition` drops the `choice` attribute (create),
//! removes it (update) or drops the filter (lookup) instead of binding null.
//!
//! Property and column names:
//!
//! | Element | Name |
//! |---|---|
//! | node label | `QUESTION` |
//! | node id property | `id_question` |
//! | edge type | `NEXT` |
//! | edge properties | `edgeId`, `choice` |
//! | mutation result column | `affected` |
//! | lookup result column | `next_id` |

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{Choice, GraphValue};

/// Result column carrying the row count of a mutation
pub const AFFECTED_COLUMN: &str = "affected";

/// Result column carrying the successor id of a lookup
pub const NEXT_ID_COLUMN: &str = "next_id";

/// Logical graph operation a statement performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphOperation {
    EnsureSchema,
    CreateNode,
    DeleteNode,
    DeleteAllNodes,
    CreateEdge,
    UpdateEdgeChoice,
    DeleteEdge,
    FindSuccessor,
}

impl GraphOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphOperation::EnsureSchema => "ensure_schema",
            GraphOperation::CreateNode => "create_node",
            GraphOperation::DeleteNode => "delete_node",
            GraphOperation::DeleteAllNodes => "delete_all_nodes",
            GraphOperation::CreateEdge => "create_edge",
            GraphOperation::UpdateEdgeChoice => "update_edge_choice",
            GraphOperation::DeleteEdge => "delete_edge",
            GraphOperation::FindSuccessor => "find_successor",
        }
    }

    /// Columns the statement returns
    pub fn result_columns(&self) -> &'static [&'static str] {
        match self {
            GraphOperation::EnsureSchema => &[],
            GraphOperation::FindSuccessor => &[NEXT_ID_COLUMN],
            _ => &[AFFECTED_COLUMN],
        }
    }
}

impl fmt::Display for GraphOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parameterized Cypher statement
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub operation: GraphOperation,
    pub cypher: String,
    pub params: BTreeMap<String, GraphValue>,
}

impl Statement {
    pub fn new(operation: GraphOperation, cypher: impl Into<String>) -> Self {
        Self {
            operation,
            cypher: cypher.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<GraphValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Bind `choice` only when it carries a value
    fn choice_param(self, choice: &Choice) -> Self {
        match choice.value() {
            Some(value) => self.param("choice", value),
            None => self,
        }
    }

    pub fn get(&self, name: &str) -> Option<&GraphValue> {
        self.params.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(GraphValue::as_str)
    }
}

/// Builds the statement for each graph operation
pub struct QueryBuilder;

impl QueryBuilder {
    /// Uniqueness constraints for node ids and edge ids
    ///
    /// Relationship constraints need a recent server; callers treat failures
    /// as warnings.
    pub fn ensure_schema() -> Vec<Statement> {
        vec![
            Statement::new(
                GraphOperation::EnsureSchema,
                "CREATE CONSTRAINT question_id_unique IF NOT EXISTS \
                 FOR (q:QUESTION) REQUIRE q.id_question IS UNIQUE",
            ),
            Statement::new(
                GraphOperation::EnsureSchema,
                "CREATE CONSTRAINT transition_edge_id_unique IF NOT EXISTS \
                 FOR ()-[r:NEXT]-() REQUIRE r.edgeId IS UNIQUE",
            ),
        ]
    }

    /// Match-or-create the question node with this id
    pub fn create_node(id: &str) -> Statement {
        Statement::new(
            GraphOperation::CreateNode,
            "MERGE (n:QUESTION {id_question: $id})\n\
             RETURN count(*) AS affected",
        )
        .param("id", id)
    }

    /// Remove the node and every edge touching it
    pub fn delete_node(id: &str) -> Statement {
        Statement::new(
            GraphOperation::DeleteNode,
            "MATCH (n:QUESTION {id_question: $id})\n\
             DETACH DELETE n\n\
             RETURN count(*) AS affected",
        )
        .param("id", id)
    }

    /// Remove every node and edge in the database
    pub fn delete_all_nodes() -> Statement {
        Statement::new(
            GraphOperation::DeleteAllNodes,
            "MATCH (n)\n\
             DETACH DELETE n\n\
             RETURN count(*) AS affected",
        )
    }

    /// Merge a `NEXT` edge between two existing questions
    ///
    /// A missing endpoint leaves the match empty, so nothing is created.
    pub fn create_edge(source: &str, target: &str, choice: &Choice, edge_id: &str) -> Statement {
        let properties = if choice.is_none() {
            "{edgeId: $edge_id}"
        } else {
            "{edgeId: $edge_id, choice: $choice}"
        };
        let cypher = format!(
            "MATCH (n:QUESTION {{id_question: $source}}), (m:QUESTION {{id_question: $target}})\n\
             MERGE (n)-[r:NEXT {}]->(m)\n\
             RETURN count(*) AS affected",
            properties
        );

        Statement::new(GraphOperation::CreateEdge, cypher)
            .param("source", source)
            .param("target", target)
            .param("edge_id", edge_id)
            .choice_param(choice)
    }

    /// Set or clear the choice on every edge with this id
    pub fn update_edge_choice(edge_id: &str, choice: &Choice) -> Statement {
        let mutation = if choice.is_none() {
            "REMOVE r.choice"
        } else {
            "SET r.choice = $choice"
        };
        let cypher = format!(
            "MATCH (:QUESTION)-[r:NEXT {{edgeId: $edge_id}}]->(:QUESTION)\n\
             {}\n\
             RETURN count(*) AS affected",
            mutation
        );

        Statement::new(GraphOperation::UpdateEdgeChoice, cypher)
            .param("edge_id", edge_id)
            .choice_param(choice)
    }

    /// Remove every edge with this id, endpoints untouched
    ///
    /// Every relationship has exactly one direction, so a directed pattern
    /// reaches all of them without matching each twice.
    pub fn delete_edge(edge_id: &str) -> Statement {
        Statement::new(
            GraphOperation::DeleteEdge,
            "MATCH (:QUESTION)-[r:NEXT {edgeId: $edge_id}]->(:QUESTION)\n\
             DELETE r\n\
             RETURN count(*) AS affected",
        )
        .param("edge_id", edge_id)
    }

    /// Target of an outgoing edge whose choice equals `choice`
    ///
    /// Without a choice any outgoing edge qualifies, edges without a choice
    /// first. Ties are returned in database order.
    pub fn find_successor(id: &str, choice: &Choice) -> Statement {
        let cypher = if choice.is_none() {
            "MATCH (n:QUESTION {id_question: $id})-[r:NEXT]->(m:QUESTION)\n\
             RETURN m.id_question AS next_id\n\
             ORDER BY r.choice IS NULL DESC\n\
             LIMIT 1"
        } else {
            "MATCH (n:QUESTION {id_question: $id})-[r:NEXT]->(m:QUESTION)\n\
             WHERE r.choice = $choice\n\
             RETURN m.id_question AS next_id\n\
             LIMIT 1"
        };

        Statement::new(GraphOperation::FindSuccessor, cypher)
            .param("id", id)
            .choice_param(choice)
    }
}
