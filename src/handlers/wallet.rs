//! Wallet handlers: list, count, read, search, create, update, delete, bulk create.
//! Extractor rejections are folded into `AppError` so every failure has the same body.

use crate::error::{AppError, ErrorBody};
use crate::model::{CreateWallet, UpdateWallet, Wallet};
use crate::query::{CountParams, ListFilter, ListParams, ListQuery};
use crate::response::{BulkCreateResponse, CountResponse, DeleteResponse};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddressParams {
    /// `0x` followed by 40 hex digits, any case.
    pub address: String,
}

fn query<T>(q: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    q.map(|Query(v)| v).map_err(|e| AppError::BadRequest(e.body_text()))
}

fn json<T>(j: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    j.map(|Json(v)| v).map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(e.body_text())
        } else {
            AppError::BadRequest(e.body_text())
        }
    })
}

#[utoipa::path(
    get,
    path = "/wallets",
    tag = "wallets",
    params(ListParams),
    responses(
        (status = 200, description = "Matching wallets", body = [Wallet]),
        (status = 400, description = "Malformed query string", body = ErrorBody),
        (status = 422, description = "Score, limit or offset out of range", body = ErrorBody)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Wallet>>, AppError> {
    let q = ListQuery::try_from(query(params)?)?;
    Ok(Json(state.service.list(&q).await?))
}

#[utoipa::path(
    get,
    path = "/wallets/count",
    tag = "wallets",
    params(CountParams),
    responses(
        (status = 200, description = "Number of matching wallets", body = CountResponse),
        (status = 422, description = "Score out of range", body = ErrorBody)
    )
)]
pub async fn count(
    State(state): State<AppState>,
    params: Result<Query<CountParams>, QueryRejection>,
) -> Result<Json<CountResponse>, AppError> {
    let filter = ListFilter::try_from(query(params)?)?;
    let count = state.service.count(&filter).await?;
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    get,
    path = "/wallets/{id}",
    tag = "wallets",
    params(("id" = String, Path, description = "Wallet identifier")),
    responses(
        (status = 200, description = "Wallet found", body = Wallet),
        (status = 400, description = "Malformed identifier", body = ErrorBody),
        (status = 404, description = "Wallet not found", body = ErrorBody)
    )
)]
pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Wallet>, AppError> {
    Ok(Json(state.service.get(&id).await?))
}

#[utoipa::path(
    get,
    path = "/wallets/search/by-address",
    tag = "wallets",
    params(AddressParams),
    responses(
        (status = 200, description = "Wallet found", body = Wallet),
        (status = 400, description = "Malformed address", body = ErrorBody),
        (status = 404, description = "No wallet with that address", body = ErrorBody)
    )
)]
pub async fn search_by_address(
    State(state): State<AppState>,
    params: Result<Query<AddressParams>, QueryRejection>,
) -> Result<Json<Wallet>, AppError> {
    let AddressParams { address } = query(params)?;
    Ok(Json(state.service.find_by_address(&address).await?))
}

#[utoipa::path(
    post,
    path = "/wallets",
    tag = "wallets",
    request_body = CreateWallet,
    responses(
        (status = 201, description = "Wallet created", body = Wallet),
        (status = 400, description = "Invalid address or duplicate", body = ErrorBody),
        (status = 422, description = "Score out of range", body = ErrorBody)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateWallet>, JsonRejection>,
) -> Result<(StatusCode, Json<Wallet>), AppError> {
    let payload = json(body)?;
    let wallet = state.service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(wallet)))
}

#[utoipa::path(
    put,
    path = "/wallets/{id}",
    tag = "wallets",
    params(("id" = String, Path, description = "Wallet identifier")),
    request_body = UpdateWallet,
    responses(
        (status = 200, description = "Wallet updated", body = Wallet),
        (status = 400, description = "Malformed identifier or body", body = ErrorBody),
        (status = 404, description = "Wallet not found", body = ErrorBody),
        (status = 422, description = "Score out of range", body = ErrorBody)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateWallet>, JsonRejection>,
) -> Result<Json<Wallet>, AppError> {
    let payload = json(body)?;
    Ok(Json(state.service.update(&id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/wallets/{id}",
    tag = "wallets",
    params(("id" = String, Path, description = "Wallet identifier")),
    responses(
        (status = 200, description = "Wallet deleted", body = DeleteResponse),
        (status = 400, description = "Malformed identifier", body = ErrorBody),
        (status = 404, description = "Wallet not found", body = ErrorBody)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let wallet = state.service.delete(&id).await?;
    Ok(Json(DeleteResponse::new(wallet)))
}

#[utoipa::path(
    post,
    path = "/wallets/bulk",
    tag = "wallets",
    request_body = [CreateWallet],
    responses(
        (status = 201, description = "All wallets created", body = BulkCreateResponse),
        (status = 400, description = "Batch too large, invalid entry or duplicate; nothing stored", body = ErrorBody),
        (status = 422, description = "Score out of range; nothing stored", body = ErrorBody)
    )
)]
pub async fn bulk_create(
    State(state): State<AppState>,
    body: Result<Json<Vec<CreateWallet>>, JsonRejection>,
) -> Result<(StatusCode, Json<BulkCreateResponse>), AppError> {
    let payloads = json(body)?;
    let ids = state.service.bulk_create(&payloads).await?;
    Ok((StatusCode::CREATED, Json(BulkCreateResponse::new(ids))))
}
