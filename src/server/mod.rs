//! Reference implementation of the assignment endpoints over an in-memory
//! [`Inventory`]. Used for local demos and end-to-end tests of the client.

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServerConfig;
use crate::gateway::{
    ACTIVE_GROUPS_PATH, ASSIGNED_LOCATIONS_PATH, BULK_SAVE_PATH, LOCATIONS_PATH, SUMMARY_PATH,
    USERS_PATH, WAREHOUSES_PATH,
};
use crate::model::{
    BulkAssignmentRequest, CountGroup, GroupId, Location, UserRecord, Warehouse, WarehouseId,
    WorkerId, WorkloadSummaryEntry,
};

pub mod store;

pub use store::{Inventory, StoreError};

#[derive(Clone)]
pub struct ServerState {
    pub inventory: Arc<RwLock<Inventory>>,
    token: Option<Arc<str>>,
}

impl ServerState {
    pub fn new(inventory: Inventory, token: Option<String>) -> Self {
        Self {
            inventory: Arc::new(RwLock::new(inventory)),
            token: token.map(Arc::from),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing or invalid bearer token")]
    Unauthorized,

    #[error(transparent)]
    Rejected(#[from] StoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Deserialize)]
struct WarehouseQuery {
    #[serde(rename = "bodegaId")]
    warehouse: WarehouseId,
}

#[derive(Deserialize)]
struct AssignedQuery {
    #[serde(rename = "usuarioId")]
    worker: WorkerId,
    #[serde(rename = "bodegaId")]
    warehouse: WarehouseId,
}

#[derive(Deserialize)]
struct SummaryQuery {
    #[serde(rename = "usuarioId")]
    worker: WorkerId,
    #[serde(rename = "grupoId")]
    group: GroupId,
}

#[derive(Serialize)]
struct SaveResponse {
    success: bool,
    total: usize,
}

pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(USERS_PATH, get(list_users_handler))
        .route(ACTIVE_GROUPS_PATH, get(list_active_groups_handler))
        .route(WAREHOUSES_PATH, get(list_warehouses_handler))
        .route(LOCATIONS_PATH, get(list_locations_handler))
        .route(ASSIGNED_LOCATIONS_PATH, get(assigned_locations_handler))
        .route(SUMMARY_PATH, get(summary_handler))
        .route(BULK_SAVE_PATH, post(bulk_save_handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .layer(cors)
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    state: ServerState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let app = router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

pub async fn run_server(
    config: &ServerConfig,
    inventory: Inventory,
    shutdown: CancellationToken,
) -> crate::error::Result<()> {
    if config.token.is_none() {
        tracing::warn!("Reference server running without a bearer token check");
    }

    let listener = TcpListener::bind(config.listen_addr).await.map_err(|e| {
        tracing::error!(addr = %config.listen_addr, error = %e, "Failed to bind reference server");
        e
    })?;
    tracing::info!(addr = %config.listen_addr, "Reference server listening");

    let state = ServerState::new(inventory, config.token.clone());
    serve(listener, state, shutdown).await?;

    tracing::info!("Reference server stopped");
    Ok(())
}

async fn require_bearer(State(state): State<ServerState>, request: Request, next: Next) -> Response {
    if let Some(expected) = state.token.as_deref() {
        let presented = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(expected) {
            tracing::debug!(path = %request.uri().path(), "Rejected unauthenticated request");
            return ApiError::Unauthorized.into_response();
        }
    }
    next.run(request).await
}

async fn list_users_handler(State(state): State<ServerState>) -> Json<Vec<UserRecord>> {
    Json(state.inventory.read().await.users.clone())
}

async fn list_active_groups_handler(State(state): State<ServerState>) -> Json<Vec<CountGroup>> {
    Json(state.inventory.read().await.active_groups())
}

async fn list_warehouses_handler(State(state): State<ServerState>) -> Json<Vec<Warehouse>> {
    Json(state.inventory.read().await.warehouses.clone())
}

async fn list_locations_handler(
    State(state): State<ServerState>,
    Query(query): Query<WarehouseQuery>,
) -> Json<Vec<Location>> {
    Json(state.inventory.read().await.locations_in(query.warehouse))
}

async fn assigned_locations_handler(
    State(state): State<ServerState>,
    Query(query): Query<AssignedQuery>,
) -> Json<Vec<Location>> {
    Json(
        state
            .inventory
            .read()
            .await
            .assigned_to(query.worker, query.warehouse),
    )
}

async fn summary_handler(
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> Json<Vec<WorkloadSummaryEntry>> {
    Json(state.inventory.read().await.summary(query.worker, query.group))
}

async fn bulk_save_handler(
    State(state): State<ServerState>,
    Json(payload): Json<BulkAssignmentRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    let total = state.inventory.write().await.replace(&payload)?;
    tracing::info!(
        worker_id = %payload.worker_id,
        group_id = %payload.group_id,
        warehouse_id = %payload.warehouse_id,
        company_id = ?payload.company_id,
        total,
        "Assignment replaced"
    );
    Ok(Json(SaveResponse {
        success: true,
        total,
    }))
}
