//! HTTP server implementation for the task API.
//!
//! This module provides the axum-based router and handlers mapping each
//! task operation to a verb+path, translating service outcomes into status
//! codes. PUT and PATCH share one handler: both apply the same
//! partial-update logic over the fields present in the payload.

use axum::{
    Router,
    extract::{FromRequest, Path, Query, Request, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::db::Database;
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::types::{CreateTask, TaskStatus, TaskView, UpdateTask};

/// Default page size for task listing.
const DEFAULT_LIMIT: i64 = 100;
/// Maximum page size for task listing.
const MAX_LIMIT: i64 = 1000;

/// API server state shared across handlers.
#[derive(Clone)]
pub struct ApiServer {
    /// Reference to the task database.
    db: Arc<Database>,
}

impl ApiServer {
    /// Create a new API server instance.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Get the database reference.
    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

/// JSON body extractor that reports rejections as structured errors.
///
/// axum's stock `Json` rejection is a plain-text body; clients of this API
/// expect every failure in the `{code, message, field}` shape, so body
/// rejections go through `ApiError` like validation failures do.
struct ApiJson<T>(T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(body_rejection_error(&rejection)),
        }
    }
}

/// Convert a JSON body rejection into the structured error shape.
fn body_rejection_error(rejection: &JsonRejection) -> ApiError {
    let message = rejection.body_text();
    if let Some(field) = missing_field_name(&message) {
        return ApiError::missing_field(&field);
    }
    ApiError::new(ErrorCode::InvalidFieldValue, message)
}

/// Pull the field name out of serde's "missing field `name`" message.
fn missing_field_name(message: &str) -> Option<String> {
    let rest = message.split("missing field `").nth(1)?;
    let name = rest.split('`').next()?;
    Some(name.to_string())
}

/// Service banner for the root endpoint.
#[derive(serde::Serialize)]
struct BannerResponse {
    message: &'static str,
    version: &'static str,
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Root endpoint - service banner.
async fn root() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Welcome to the QuickTask API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Bounds-checked query parameters for GET /tasks.
#[derive(Debug)]
struct ListParams {
    skip: i64,
    limit: i64,
    status: Option<TaskStatus>,
}

/// Parse list query parameters from the raw string map, so malformed values
/// surface as 422 with the offending field named rather than axum's
/// default 400.
fn parse_list_params(params: &HashMap<String, String>) -> ApiResult<ListParams> {
    let skip = match params.get("skip") {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| ApiError::invalid_value("skip", "skip must be an integer"))?,
        None => 0,
    };
    if skip < 0 {
        return Err(ApiError::invalid_value("skip", "skip must be >= 0"));
    }

    let limit = match params.get("limit") {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| ApiError::invalid_value("limit", "limit must be an integer"))?,
        None => DEFAULT_LIMIT,
    };
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::invalid_value(
            "limit",
            "limit must be between 1 and 1000",
        ));
    }

    let status = match params.get("status") {
        Some(raw) => Some(TaskStatus::from_str(raw).ok_or_else(|| {
            ApiError::invalid_value("status", "status must be one of: pending, completed")
        })?),
        None => None,
    };

    Ok(ListParams {
        skip,
        limit,
        status,
    })
}

/// GET /tasks - list visible tasks with offset pagination.
async fn list_tasks(
    State(state): State<ApiServer>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<TaskView>>> {
    let params = parse_list_params(&params)?;
    let tasks = state
        .db()
        .list_tasks(params.skip, params.limit, params.status)
        .map_err(ApiError::database)?;
    debug!(count = tasks.len(), skip = params.skip, "Listed tasks");
    Ok(Json(tasks.into_iter().map(|t| t.into_view()).collect()))
}

/// GET /tasks/{id} - fetch a single visible task.
async fn get_task(
    State(state): State<ApiServer>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<TaskView>> {
    let task = state
        .db()
        .get_task(task_id)
        .map_err(ApiError::database)?
        .ok_or_else(|| ApiError::task_not_found(task_id))?;
    Ok(Json(task.into_view()))
}

/// POST /tasks - create a task.
async fn create_task(
    State(state): State<ApiServer>,
    ApiJson(body): ApiJson<CreateTask>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    let new = body.validate()?;
    let task = state.db().create_task(new).map_err(ApiError::database)?;
    info!(task_id = task.id, "Created task");
    Ok((StatusCode::CREATED, Json(task.into_view())))
}

/// PUT and PATCH /tasks/{id} - partial update over the fields present in
/// the payload. Both verbs run identical field-application logic.
async fn update_task(
    State(state): State<ApiServer>,
    Path(task_id): Path<i64>,
    ApiJson(body): ApiJson<UpdateTask>,
) -> ApiResult<Json<TaskView>> {
    let changes = body.validate()?;
    let task = state
        .db()
        .update_task(task_id, changes)
        .map_err(ApiError::database)?
        .ok_or_else(|| ApiError::task_not_found(task_id))?;
    info!(task_id, "Updated task");
    Ok(Json(task.into_view()))
}

/// DELETE /tasks/{id} - soft-delete.
async fn delete_task(
    State(state): State<ApiServer>,
    Path(task_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = state
        .db()
        .delete_task(task_id)
        .map_err(ApiError::database)?;
    if !deleted {
        return Err(ApiError::task_not_found(task_id));
    }
    info!(task_id, "Soft-deleted task");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /tasks/{id}/restore - clear the soft-delete flag.
async fn restore_task(
    State(state): State<ApiServer>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<TaskView>> {
    let task = state
        .db()
        .restore_task(task_id)
        .map_err(ApiError::database)?
        .ok_or_else(|| ApiError::task_not_found(task_id))?;
    info!(task_id, "Restored task");
    Ok(Json(task.into_view()))
}

/// Build the router with all routes.
pub fn build_router(state: ApiServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{task_id}",
            get(get_task)
                .put(update_task)
                .patch(update_task)
                .delete(delete_task),
        )
        .route("/tasks/{task_id}/restore", post(restore_task))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create the application router for the given database handle.
pub fn router(db: Arc<Database>) -> Router {
    build_router(ApiServer::new(db))
}

/// Bind the listener and serve until interrupted.
pub async fn serve(db: Arc<Database>, port: u16) -> anyhow::Result<()> {
    let app = router(db);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("QuickTask API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
