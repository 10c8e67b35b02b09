//! HTTP endpoints for the question graph using axum.
//!
//! Endpoints:
//! - POST   /insert-question                  - create (merge) a question
//! - DELETE /delete-question/:id              - delete a question and its edges
//! - GET    /find-next-question/:id/:choice   - follow the edge matching a choice
//! - GET    /find-next-question/:id/          - follow the default edge
//! - POST   /create-edge                      - link two questions
//! - POST   /update-edge                      - change or clear an edge's choice
//! - DELETE /delete-edge/:edge_id             - delete an edge
//! - GET    /health                           - liveness

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use questiongraph_storage::{Choice, ChoiceKind, GraphStore};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: GraphStore,
}

/// Build the axum router with all endpoints.
pub fn router(store: GraphStore) -> Router {
    Router::new()
        .route("/insert-question", post(insert_question))
        .route("/delete-question/:id", delete(delete_question))
        .route("/find-next-question/:id/:choice", get(find_next_question))
        .route("/find-next-question/:id/", get(find_default_question))
        .route("/create-edge", post(create_edge))
        .route("/update-edge", post(update_edge))
        .route("/delete-edge/:edge_id", delete(delete_edge))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { store })
}

// ── Request / Response types ────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InsertQuestionRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateEdgeRequest {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub choice: Choice,
    #[serde(rename = "edgeId")]
    pub edge_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEdgeRequest {
    #[serde(default)]
    pub choice: Choice,
    #[serde(rename = "edgeId")]
    pub edge_id: String,
}

/// How to read the `:choice` path segment; text unless told otherwise.
#[derive(Debug, Default, Deserialize)]
pub struct FindNextParams {
    #[serde(default)]
    pub kind: ChoiceKind,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NextNodeResponse {
    pub next_node: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
}

fn non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn message(message: String) -> Json<MessageResponse> {
    Json(MessageResponse { message })
}

// ── Handlers ────────────────────────────────────────────────────────

async fn insert_question(
    State(state): State<AppState>,
    payload: Result<Json<InsertQuestionRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    non_empty("id", &req.id)?;

    let response = state.store.create_node(&req.id).await?;
    Ok(message(response))
}

async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let response = state.store.delete_node(&id).await?;
    Ok(message(response))
}

async fn find_next_question(
    State(state): State<AppState>,
    Path((id, raw_choice)): Path<(String, String)>,
    params: Result<Query<FindNextParams>, QueryRejection>,
) -> Result<Json<NextNodeResponse>, ApiError> {
    let Query(params) = params?;
    let choice = Choice::parse_segment(&raw_choice, params.kind)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let next_node = state.store.find_successor(&id, &choice).await?;
    Ok(Json(NextNodeResponse { next_node }))
}

/// Empty choice segment: same as `null`
async fn find_default_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NextNodeResponse>, ApiError> {
    let choice = Choice::NoCondition;
    let next_node = state.store.find_successor(&id, &choice).await?;
    Ok(Json(NextNodeResponse { next_node }))
}

async fn create_edge(
    State(state): State<AppState>,
    payload: Result<Json<CreateEdgeRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    non_empty("source", &req.source)?;
    non_empty("target", &req.target)?;
    non_empty("edgeId", &req.edge_id)?;

    let response = state
        .store
        .create_edge(&req.source, &req.target, &req.choice, &req.edge_id)
        .await?;
    Ok(message(response))
}

/// Answers in plain text, unlike the other mutations
async fn update_edge(
    State(state): State<AppState>,
    payload: Result<Json<UpdateEdgeRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let Json(req) = payload?;
    non_empty("edgeId", &req.edge_id)?;

    state.store.update_edge(&req.edge_id, &req.choice).await?;
    Ok(format!("Updated Edge {}", req.edge_id))
}

async fn delete_edge(
    State(state): State<AppState>,
    Path(edge_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let response = state.store.delete_edge(&edge_id).await?;
    Ok(message(response))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        backend: state.store.backend_name().to_string(),
    })
}
