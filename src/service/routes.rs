//! Axum routes for the risk kernel service.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::engine::{EngineError, RiskEngine};
use crate::metrics::{selector, SelectorError, BIRNBAUM_IMPORTANCES, BIRNBAUM_STRUCTURAL_IMPORTANCES};
use crate::store::LruResultCache;
use crate::types::{EntityId, SystemGraph};
use crate::RISK_KERNEL_SCHEMA_VERSION;

use super::middleware::record_computation;
use super::state::ServiceState;

/// Type alias for the service state with the bounded LRU cache.
pub type AppState = ServiceState<LruResultCache>;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response of `POST /risk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskResponse {
    /// System failure probability.
    pub risk: f64,
}

/// Response of `POST /birnbaum-structural-importances`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralImportancesResponse {
    /// Structural importance per entity.
    pub birnbaum_structural_importances: BTreeMap<EntityId, f64>,
}

/// Response of `POST /birnbaum-importances`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportancesResponse {
    /// Birnbaum importance per entity.
    pub birnbaum_importances: BTreeMap<EntityId, f64>,
}

/// Service status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Always `alive`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Graph schema version.
    pub schema_version: String,
    /// Seconds since startup.
    pub uptime_secs: u64,
}

/// Structured error response with correlation ID for tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Correlation ID for request tracing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            correlation_id: None,
            details: None,
        }
    }

    /// Add a correlation ID to the error.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Map an engine failure to a status code and error body.
fn engine_error(e: EngineError) -> ApiError {
    let (status, code) = match &e {
        EngineError::InvalidGraph(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_GRAPH"),
        EngineError::Mocus(_) => (StatusCode::UNPROCESSABLE_ENTITY, "CUTSETS_FAILED"),
        EngineError::Selector(_) => (StatusCode::BAD_REQUEST, "INVALID_SELECTOR"),
        EngineError::Cache(_) | EngineError::CacheTypeMismatch { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "CACHE_FAILED")
        }
    };
    let body = ErrorResponse::new(code, e.to_string())
        .with_correlation_id(uuid::Uuid::new_v4().to_string());
    tracing::warn!(code, error = %e, correlation_id = ?body.correlation_id, "Request error");
    (status, Json(body))
}

fn selector_error(e: SelectorError, attribute: &str, value: &str) -> ApiError {
    let (status, Json(body)) = engine_error(EngineError::Selector(e));
    (status, Json(body.with_details(format!("{}={}", attribute, value))))
}

/// Run an engine call on the blocking pool.
///
/// Enumeration is CPU-bound, so it must not occupy an async worker while
/// other requests wait.
async fn offload<T, F, Fut>(state: &AppState, job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(RiskEngine<LruResultCache>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, EngineError>>,
{
    let engine = state.engine.clone();
    let handle = tokio::runtime::Handle::current();
    tokio::task::spawn_blocking(move || handle.block_on(job(engine)))
        .await
        .map_err(|e| {
            let body = ErrorResponse::new("COMPUTATION_ABORTED", e.to_string())
                .with_correlation_id(uuid::Uuid::new_v4().to_string());
            tracing::error!(error = %e, correlation_id = ?body.correlation_id, "Engine task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
        })?
        .map_err(engine_error)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// System failure probability.
async fn risk_handler(
    State(state): State<Arc<AppState>>,
    Json(graph): Json<SystemGraph>,
) -> Result<Json<RiskResponse>, ApiError> {
    let start = Instant::now();
    let _guard = state.locks.acquire(graph.identity()).await;

    let entity_count = graph.entity_ids().count();
    let risk = offload(&state, move |engine| async move { engine.get_risk(&graph).await }).await?;

    record_computation("risk", entity_count, 1, start.elapsed().as_millis() as u64);
    Ok(Json(RiskResponse { risk }))
}

/// Structural importance of every entity.
async fn structural_importances_handler(
    State(state): State<Arc<AppState>>,
    Json(graph): Json<SystemGraph>,
) -> Result<Json<StructuralImportancesResponse>, ApiError> {
    let start = Instant::now();
    let _guard = state.locks.acquire(graph.identity()).await;

    let entity_count = graph.entity_ids().count();
    let importances = offload(&state, move |engine| async move {
        engine.get_birnbaum_structural_importances(&graph).await
    })
    .await?;

    record_computation(
        BIRNBAUM_STRUCTURAL_IMPORTANCES,
        entity_count,
        importances.len(),
        start.elapsed().as_millis() as u64,
    );
    Ok(Json(StructuralImportancesResponse {
        birnbaum_structural_importances: importances,
    }))
}

/// Birnbaum importance of every entity.
async fn importances_handler(
    State(state): State<Arc<AppState>>,
    Json(graph): Json<SystemGraph>,
) -> Result<Json<ImportancesResponse>, ApiError> {
    let start = Instant::now();
    let _guard = state.locks.acquire(graph.identity()).await;

    let entity_count = graph.entity_ids().count();
    let importances = offload(&state, move |engine| async move {
        engine.get_birnbaum_importances(&graph).await
    })
    .await?;

    record_computation(
        BIRNBAUM_IMPORTANCES,
        entity_count,
        importances.len(),
        start.elapsed().as_millis() as u64,
    );
    Ok(Json(ImportancesResponse {
        birnbaum_importances: importances,
    }))
}

/// Structural importance of the entities with `attributes[att] == val`.
async fn select_structural_importances_handler(
    State(state): State<Arc<AppState>>,
    Path((attribute, value)): Path<(String, String)>,
    Json(graph): Json<SystemGraph>,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    let selector = selector(&attribute, &value).map_err(|e| selector_error(e, &attribute, &value))?;
    let _guard = state.locks.acquire(graph.identity()).await;

    let result = offload(&state, move |engine| async move {
        engine.get_birnbaum_structural_importances_select(&graph, &selector).await
    })
    .await?;
    Ok(Json(result))
}

/// Birnbaum importance of the entities with `attributes[att] == val`.
async fn select_importances_handler(
    State(state): State<Arc<AppState>>,
    Path((attribute, value)): Path<(String, String)>,
    Json(graph): Json<SystemGraph>,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    let selector = selector(&attribute, &value).map_err(|e| selector_error(e, &attribute, &value))?;
    let _guard = state.locks.acquire(graph.identity()).await;

    let result = offload(&state, move |engine| async move {
        engine.get_birnbaum_importances_select(&graph, &selector).await
    })
    .await?;
    Ok(Json(result))
}

/// Share of system risk carried by each attribute value.
async fn fractional_importance_traits_handler(
    State(state): State<Arc<AppState>>,
    Json(graph): Json<SystemGraph>,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    let start = Instant::now();
    let _guard = state.locks.acquire(graph.identity()).await;

    let entity_count = graph.entity_ids().count();
    let fractions = offload(&state, move |engine| async move {
        engine.get_fractional_importance_traits(&graph).await
    })
    .await?;

    record_computation(
        "fractional_importance_traits",
        entity_count,
        fractions.len(),
        start.elapsed().as_millis() as u64,
    );
    Ok(Json(fractions))
}

/// Liveness endpoint.
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: RISK_KERNEL_SCHEMA_VERSION.to_string(),
        uptime_secs: state.uptime_secs(),
    })
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the risk kernel service.
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        // Whole-graph metrics
        .route("/risk", post(risk_handler))
        .route("/birnbaum-structural-importances", post(structural_importances_handler))
        .route("/birnbaum-importances", post(importances_handler))
        .route("/fractional-importance-traits", post(fractional_importance_traits_handler))
        .route("/fractional_importance_traits", post(fractional_importance_traits_handler))
        // Attribute selection
        .route(
            "/attribute/:att/:val/birnbaum-structural-importances",
            post(select_structural_importances_handler),
        )
        .route(
            "/attribute/:att/:val/birnbaum-importances",
            post(select_importances_handler),
        )
        // Health
        .route("/status", get(status_handler))
        .with_state(state)
}
