//! Common routes: service info, health, readiness, OpenAPI document.

use crate::response::{HealthResponse, ReadyResponse, ServiceInfo};
use crate::routes::ApiDoc;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use utoipa::OpenApi;

const ENDPOINTS: &[&str] = &[
    "GET /wallets",
    "GET /wallets/count",
    "GET /wallets/search/by-address",
    "GET /wallets/{id}",
    "POST /wallets",
    "POST /wallets/bulk",
    "PUT /wallets/{id}",
    "DELETE /wallets/{id}",
    "GET /health",
    "GET /ready",
    "GET /openapi.json",
];

#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses((status = 200, description = "Service name, version and endpoints", body = ServiceInfo))
)]
pub async fn info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        database: state.backend(),
        endpoints: ENDPOINTS.to_vec(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "service",
    responses((status = 200, description = "Process is up", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        database: state.backend(),
    })
}

#[utoipa::path(
    get,
    path = "/ready",
    tag = "service",
    responses(
        (status = 200, description = "Backend reachable", body = ReadyResponse),
        (status = 503, description = "Backend unreachable", body = ReadyResponse)
    )
)]
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let database = state.backend();
    match state.service.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ok",
                database,
                detail: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse {
                    status: "degraded",
                    database,
                    detail: Some(e.to_string()),
                }),
            )
        }
    }
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(info))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/openapi.json", get(openapi))
        .with_state(state)
}
