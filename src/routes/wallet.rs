//! Wallet routes under `/wallets`. Static segments (`count`, `bulk`, `search`) win over `:id`.

use crate::handlers::wallet::{bulk_create, count, create, delete, list, read, search_by_address, update};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn wallet_routes(state: AppState) -> Router {
    Router::new()
        .route("/wallets", get(list).post(create))
        .route("/wallets/count", get(count))
        .route("/wallets/bulk", post(bulk_create))
        .route("/wallets/search/by-address", get(search_by_address))
        .route("/wallets/:id", get(read).put(update).delete(delete))
        .with_state(state)
}
