//! Response bodies that are not a bare wallet or wallet list.

use crate::model::{Backend, Wallet};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "Wallet deleted successfully")]
    pub message: String,
    pub deleted_wallet: Wallet,
}

impl DeleteResponse {
    pub fn new(deleted_wallet: Wallet) -> Self {
        DeleteResponse {
            message: "Wallet deleted successfully".into(),
            deleted_wallet,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkCreateResponse {
    #[schema(example = "Successfully created 3 wallets")]
    pub message: String,
    /// Identifiers in the same order as the request entries.
    pub inserted_ids: Vec<String>,
}

impl BulkCreateResponse {
    pub fn new(inserted_ids: Vec<String>) -> Self {
        BulkCreateResponse {
            message: format!("Successfully created {} wallets", inserted_ids.len()),
            inserted_ids,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: &'static str,
    /// Active backend mode.
    #[schema(value_type = String, example = "postgres")]
    pub database: Backend,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    #[schema(value_type = String, example = "postgres")]
    pub database: Backend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    #[schema(value_type = String)]
    pub database: Backend,
    pub endpoints: Vec<&'static str>,
}
