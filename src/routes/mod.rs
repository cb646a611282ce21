//! Router assembly: wallet and common routes plus CORS, body limit and request tracing.

pub mod common;
pub mod wallet;

pub use common::common_routes;
pub use wallet::wallet_routes;

use crate::config::Settings;
use crate::error::{ErrorBody, ErrorDetail};
use crate::handlers;
use crate::model::{CreateWallet, UpdateWallet, Wallet};
use crate::response::{BulkCreateResponse, CountResponse, DeleteResponse, HealthResponse, ReadyResponse, ServiceInfo};
use crate::state::AppState;
use axum::http::HeaderValue;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::wallet::list,
        handlers::wallet::count,
        handlers::wallet::read,
        handlers::wallet::search_by_address,
        handlers::wallet::create,
        handlers::wallet::update,
        handlers::wallet::delete,
        handlers::wallet::bulk_create,
        common::info,
        common::health,
        common::ready,
    ),
    components(schemas(
        Wallet,
        CreateWallet,
        UpdateWallet,
        DeleteResponse,
        BulkCreateResponse,
        CountResponse,
        HealthResponse,
        ReadyResponse,
        ServiceInfo,
        ErrorBody,
        ErrorDetail,
    )),
    tags(
        (name = "wallets", description = "Smart wallet records"),
        (name = "service", description = "Liveness, readiness and metadata")
    )
)]
pub struct ApiDoc;

fn cors(settings: &Settings) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if settings.allows_any_origin() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Full application router for the given state.
pub fn app(state: AppState, settings: &Settings) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(wallet_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(settings.body_limit))
                .layer(cors(settings)),
        )
}
