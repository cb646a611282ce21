//! MongoDB adapter: structured filters from `crate::query::document`, ObjectIds assigned by the store,
//! address uniqueness enforced by a unique index.

use super::WalletStore;
use crate::codec::document::{from_document, patch_document, to_document};
use crate::config::MongoSettings;
use crate::error::AppError;
use crate::model::{Address, Backend, IdKind, NewWallet, Wallet, WalletId, WalletPatch};
use crate::query::document::{build_filter, build_list_query};
use crate::query::{ListFilter, ListQuery};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use std::collections::HashSet;

pub struct MongoStore {
    client: Client,
    db: Database,
    wallets: Collection<Document>,
}

impl MongoStore {
    pub async fn connect(settings: &MongoSettings) -> Result<Self, AppError> {
        let client = Client::with_uri_str(&settings.url).await?;
        let db = client.database(&settings.database);
        let wallets = db.collection::<Document>(&settings.collection);
        let store = MongoStore { client, db, wallets };
        store.ping().await?;
        store.ensure_indexes().await?;
        tracing::info!(
            database = %settings.database,
            collection = %settings.collection,
            "connected to mongodb"
        );
        Ok(store)
    }

    /// Unique index on `address` closes the duplicate-insert race natively.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        let unique_address = IndexModel::builder()
            .keys(doc! { "address": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.wallets.create_index(unique_address).await?;
        Ok(())
    }

    fn object_id(id: &WalletId) -> Result<ObjectId, AppError> {
        ObjectId::parse_str(id.as_str())
            .map_err(|_| AppError::InvalidFormat("invalid wallet ID format".into()))
    }

    /// Undo a partially applied batch. Only the ids assigned to this batch are removed,
    /// so a concurrent insert of the same address survives.
    async fn rollback_batch(&self, ids: &[ObjectId]) {
        match self.wallets.delete_many(doc! { "_id": { "$in": ids.to_vec() } }).await {
            Ok(res) => tracing::warn!(removed = res.deleted_count, "rolled back partial bulk insert"),
            Err(e) => tracing::error!(error = %e, "failed to roll back partial bulk insert"),
        }
    }
}

/// Insert document with a client-assigned `_id`, so a failed batch can be undone by id.
fn batch_document(new: &NewWallet, id: ObjectId) -> Document {
    let mut d = to_document(new);
    d.insert("_id", id);
    d
}

#[async_trait]
impl WalletStore for MongoStore {
    fn backend(&self) -> Backend {
        Backend::Mongodb
    }

    fn id_kind(&self) -> IdKind {
        IdKind::ObjectId
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Wallet>, AppError> {
        let q = build_list_query(query);
        tracing::debug!(filter = %q.filter, sort = %q.sort, skip = q.skip, limit = q.limit, "find");
        let docs: Vec<Document> = self
            .wallets
            .find(q.filter)
            .sort(q.sort)
            .skip(q.skip)
            .limit(q.limit)
            .await?
            .try_collect()
            .await?;
        docs.iter().map(from_document).collect()
    }

    async fn count_matching(&self, filter: &ListFilter) -> Result<u64, AppError> {
        Ok(self.wallets.count_documents(build_filter(filter)).await?)
    }

    async fn get_by_id(&self, id: &WalletId) -> Result<Option<Wallet>, AppError> {
        let found = self
            .wallets
            .find_one(doc! { "_id": Self::object_id(id)? })
            .await?;
        found.as_ref().map(from_document).transpose()
    }

    async fn get_by_address(&self, address: &Address) -> Result<Option<Wallet>, AppError> {
        let found = self
            .wallets
            .find_one(doc! { "address": address.as_str() })
            .await?;
        found.as_ref().map(from_document).transpose()
    }

    async fn existing_addresses(&self, addresses: &[Address]) -> Result<HashSet<Address>, AppError> {
        if addresses.is_empty() {
            return Ok(HashSet::new());
        }
        let wanted: Vec<&str> = addresses.iter().map(Address::as_str).collect();
        let docs: Vec<Document> = self
            .wallets
            .find(doc! { "address": { "$in": wanted } })
            .projection(doc! { "address": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(docs
            .iter()
            .filter_map(|d| d.get_str("address").ok())
            .map(|a| Address(a.to_string()))
            .collect())
    }

    async fn insert(&self, new: NewWallet) -> Result<Wallet, AppError> {
        let mut d = to_document(&new);
        let res = self.wallets.insert_one(&d).await?;
        d.insert("_id", res.inserted_id);
        from_document(&d)
    }

    async fn update(&self, id: &WalletId, patch: &WalletPatch, now: DateTime<Utc>) -> Result<Option<Wallet>, AppError> {
        let updated = self
            .wallets
            .find_one_and_update(doc! { "_id": Self::object_id(id)? }, patch_document(patch, now))
            .return_document(ReturnDocument::After)
            .await?;
        updated.as_ref().map(from_document).transpose()
    }

    async fn delete(&self, id: &WalletId) -> Result<Option<Wallet>, AppError> {
        let removed = self
            .wallets
            .find_one_and_delete(doc! { "_id": Self::object_id(id)? })
            .await?;
        removed.as_ref().map(from_document).transpose()
    }

    async fn bulk_insert(&self, batch: Vec<NewWallet>) -> Result<Vec<String>, AppError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<ObjectId> = batch.iter().map(|_| ObjectId::new()).collect();
        let docs: Vec<Document> = batch
            .iter()
            .zip(&ids)
            .map(|(new, id)| batch_document(new, *id))
            .collect();
        if let Err(e) = self.wallets.insert_many(docs).await {
            self.rollback_batch(&ids).await;
            return Err(e.into());
        }
        Ok(ids.iter().map(|id| id.to_hex()).collect())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}
