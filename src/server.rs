//! HTTP interface.
//!
//! Endpoints:
//! - GET  /                 - Service banner
//! - GET  /health           - Component status
//! - POST /ask              - Natural-language question
//! - GET  /providers?...    - Radius search for a procedure

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::doctor::{CompletionHealth, CoordinatesHealth, DatabaseHealth, HealthReport};
use crate::service::{
    AskResponse, NavigatorService, ProviderSearch, ProviderSearchResponse, SearchError,
};
use crate::translator::QueryTranslator;

/// Shared handler state.
///
/// The translator is used without the service lock so a slow completion
/// call never blocks other requests from reaching the database.
#[derive(Clone)]
pub struct AppState {
    service: Arc<Mutex<NavigatorService>>,
    translator: Arc<QueryTranslator>,
    health: Arc<HealthContext>,
}

/// What `/health` reports besides live database and coordinate state.
#[derive(Debug, Clone)]
pub struct HealthContext {
    pub database_path: String,
    pub zip_file: String,
    pub completion: CompletionHealth,
}

impl AppState {
    pub fn new(service: NavigatorService, translator: QueryTranslator, health: HealthContext) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
            translator: Arc::new(translator),
            health: Arc::new(health),
        }
    }
}

/// Body of `POST /ask`.
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Errors surfaced as a JSON `{"error": ...}` body.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(error: SearchError) -> Self {
        if error.is_invalid_input() {
            ApiError::BadRequest(error.to_string())
        } else {
            tracing::error!(%error, "provider search failed");
            ApiError::Internal(error.to_string())
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(error: tokio::task::JoinError) -> Self {
        tracing::error!(%error, "blocking task failed");
        ApiError::Internal("Internal task failed".to_string())
    }
}

/// Locks the service, recovering from poisoning.
///
/// The service is read-only, so its state is consistent even after a panic.
fn lock(service: &Mutex<NavigatorService>) -> MutexGuard<'_, NavigatorService> {
    service.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Builds the router with permissive CORS.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ask", post(ask))
        .route("/providers", get(providers))
        .layer(cors)
        .with_state(state)
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Healthcare Cost Navigator API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "ask": "POST /ask - natural language questions about hospital pricing and quality",
            "providers": "GET /providers?procedure=470&origin_zip=10001&radius_km=50 - providers near a ZIP, cheapest first",
            "health": "GET /health - component status"
        }
    }))
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthReport>, ApiError> {
    let service = state.service.clone();
    let context = state.health.clone();

    let report = tokio::task::spawn_blocking(move || {
        let service = lock(&service);
        HealthReport {
            database: DatabaseHealth::check(&context.database_path, service.database()),
            coordinates: CoordinatesHealth::check(&context.zip_file, service.coordinates()),
            completion: context.completion.clone(),
        }
    })
    .await?;

    Ok(Json(report))
}

async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = request.question;
    tracing::info!(%question, "ask");

    let translator = state.translator.clone();
    let to_translate = question.clone();
    let translation =
        tokio::task::spawn_blocking(move || translator.translate(&to_translate)).await?;

    let service = state.service.clone();
    let response = tokio::task::spawn_blocking(move || {
        lock(&service).answer_translation(&question, translation)
    })
    .await?;

    Ok(Json(response))
}

async fn providers(
    State(state): State<AppState>,
    query: Result<Query<ProviderSearch>, QueryRejection>,
) -> Result<Json<ProviderSearchResponse>, ApiError> {
    let Query(search) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let service = state.service.clone();
    let response = tokio::task::spawn_blocking(move || {
        lock(&service)
            .search_providers(&search)
            .map_err(ApiError::from)
    })
    .await??;

    Ok(Json(response))
}
