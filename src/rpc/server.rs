//! RPC HTTP Server
//!
//! Axum-based HTTP server that handles JSON-RPC requests.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::rpc::methods::{get_info, handle_request, JsonRpcRequest, JsonRpcResponse, RpcState};

/// Build the RPC router over `state`
pub fn router(state: Arc<RpcState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", post(handle_rpc))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// Serve RPC on `addr` until the listener fails
pub async fn start_rpc_server(state: Arc<RpcState>, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "RPC server listening");
    axum::serve(listener, router(state)).await
}

async fn health(State(state): State<Arc<RpcState>>) -> (StatusCode, Json<Value>) {
    match get_info(&state) {
        Ok(info) => (StatusCode::OK, Json(info)),
        Err((_, message)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": message })),
        ),
    }
}

/// Handle incoming JSON-RPC requests
async fn handle_rpc(
    State(state): State<Arc<RpcState>>,
    Json(request): Json<JsonRpcRequest>,
) -> (StatusCode, Json<JsonRpcResponse>) {
    debug!(method = %request.method, "rpc call");
    let response = handle_request(&state, request);
    (StatusCode::OK, Json(response))
}
