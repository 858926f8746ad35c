//! HTTP surface for an embedding host

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::bridge::SelectionBridge;
use crate::messages::{HostEvent, SelectionEvent};
use crate::types::{ContextMap, StateTransition, State as PipelineState};

/// The lock serializes pipeline runs; the machine itself is unsynchronized
pub type SharedBridge = Arc<Mutex<SelectionBridge>>;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub state: PipelineState,
    pub history: Vec<StateTransition>,
}

async fn selection_handler(
    State(bridge): State<SharedBridge>,
    Json(event): Json<SelectionEvent>,
) -> Response {
    info!("Received selection: file='{}', line={}", event.file_name, event.line_number);

    if event.line_number == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid selection".to_string(),
                details: Some("lineNumber must be 1 or greater".to_string()),
            }),
        )
            .into_response();
    }

    let mut bridge = bridge.lock().await;
    match bridge.on_selection(event) {
        Some(context_map) => Json(context_map).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn state_handler(State(bridge): State<SharedBridge>) -> Json<StateResponse> {
    let bridge = bridge.lock().await;
    let machine = bridge.machine();

    Json(StateResponse {
        state: machine.state(),
        history: machine.state_history().to_vec(),
    })
}

async fn session_handler(
    State(bridge): State<SharedBridge>,
    Path(session_id): Path<String>,
) -> Result<Json<ContextMap>, (StatusCode, Json<ErrorResponse>)> {
    let bridge = bridge.lock().await;

    bridge
        .machine()
        .cached_context(&session_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Session not cached".to_string(),
                    details: Some(session_id),
                }),
            )
        })
}

async fn clear_handler(State(bridge): State<SharedBridge>) -> StatusCode {
    bridge.lock().await.clear();
    StatusCode::NO_CONTENT
}

async fn event_handler(
    State(bridge): State<SharedBridge>,
    Json(event): Json<HostEvent>,
) -> StatusCode {
    bridge.lock().await.on_host_event(event);
    StatusCode::ACCEPTED
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "context-bridge".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create and configure the HTTP router
pub fn create_router(bridge: SharedBridge) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/selection", post(selection_handler))
        .route("/state", get(state_handler))
        .route("/sessions", delete(clear_handler))
        .route("/sessions/:session_id", get(session_handler))
        .route("/events", post(event_handler))
        .with_state(bridge)
}

/// Run the HTTP server
pub async fn run_server(bridge: SharedBridge, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    info!("Starting context bridge server on {}", addr);

    let app = create_router(bridge);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
