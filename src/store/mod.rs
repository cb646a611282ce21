//! Persistence capability shared by every backend, and startup wiring.

pub mod memory;
pub mod mongo;
pub mod postgres;

use crate::config::Settings;
use crate::error::AppError;
use crate::model::{Address, Backend, IdKind, NewWallet, Wallet, WalletId, WalletPatch};
use crate::query::{ListFilter, ListQuery};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use postgres::PgStore;

#[async_trait]
pub trait WalletStore: Send + Sync {
    fn backend(&self) -> Backend;

    fn id_kind(&self) -> IdKind;

    /// Round trip to the backend; used by the readiness check.
    async fn ping(&self) -> Result<(), AppError>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<Wallet>, AppError>;

    async fn count_matching(&self, filter: &ListFilter) -> Result<u64, AppError>;

    async fn get_by_id(&self, id: &WalletId) -> Result<Option<Wallet>, AppError>;

    async fn get_by_address(&self, address: &Address) -> Result<Option<Wallet>, AppError>;

    /// Subset of `addresses` already stored.
    async fn existing_addresses(&self, addresses: &[Address]) -> Result<HashSet<Address>, AppError>;

    /// Persist one wallet. A uniqueness violation surfaces as `AppError::Conflict`.
    async fn insert(&self, new: NewWallet) -> Result<Wallet, AppError>;

    /// Apply `patch` to the stored record in one write, touching only the fields it
    /// carries plus `last_updated`. Returns the record after the write.
    async fn update(&self, id: &WalletId, patch: &WalletPatch, now: DateTime<Utc>) -> Result<Option<Wallet>, AppError>;

    /// Hard delete; returns the record as it was.
    async fn delete(&self, id: &WalletId) -> Result<Option<Wallet>, AppError>;

    /// Insert every wallet or none of them; returns ids in input order.
    async fn bulk_insert(&self, batch: Vec<NewWallet>) -> Result<Vec<String>, AppError>;

    async fn close(&self);
}

/// Connect the configured backend and prepare its schema or indexes.
pub async fn connect(settings: &Settings) -> Result<Arc<dyn WalletStore>, AppError> {
    let store: Arc<dyn WalletStore> = match settings.backend {
        Backend::Postgres => Arc::new(PgStore::connect(&settings.postgres).await?),
        Backend::Mongodb => Arc::new(MongoStore::connect(&settings.mongodb).await?),
        Backend::Memory => Arc::new(MemoryStore::new()),
    };
    tracing::info!(backend = %store.backend(), "wallet store ready");
    Ok(store)
}
