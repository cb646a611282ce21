//! Wallet record, request payloads and validated identifiers.

use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Lowest and highest score a wallet may carry.
pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 10;

/// Which storage implementation backs the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Postgres,
    Mongodb,
    Memory,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Postgres => "postgres",
            Backend::Mongodb => "mongodb",
            Backend::Memory => "memory",
        }
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "mongodb" | "mongo" => Ok(Backend::Mongodb),
            "memory" => Ok(Backend::Memory),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of identifiers accepted by the active backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdKind {
    /// 24 hex characters assigned by the document store.
    ObjectId,
    /// Hyphenated UUID text generated by the service.
    Uuid,
}

/// A record identifier that has already passed format validation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WalletId(pub(crate) String);

impl WalletId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A lowercase `0x`-prefixed 40-hex-digit address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub(crate) String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A wallet as returned by the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Wallet {
    #[schema(example = "3f2b8c1e-9a4d-4b7e-8f21-6c0d5e4a7b19")]
    pub id: String,
    #[schema(example = "0x742d35cc6634c0532925a3b844bc454e4438f44e")]
    pub address: String,
    #[schema(example = 7)]
    pub score: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Body of `POST /wallets` and of each `POST /wallets/bulk` entry.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateWallet {
    #[schema(example = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e")]
    pub address: String,
    #[schema(example = 5)]
    pub score: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Body of `PUT /wallets/{id}`. Absent fields keep their stored value.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateWallet {
    pub score: Option<i64>,
    pub is_active: Option<bool>,
}

/// Validated create payload, stamped and ready for the storage codec.
#[derive(Clone, Debug, PartialEq)]
pub struct NewWallet {
    pub address: Address,
    pub score: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Validated partial update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalletPatch {
    pub score: Option<i32>,
    pub is_active: Option<bool>,
}
