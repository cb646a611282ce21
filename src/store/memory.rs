//! In-process store for development and tests. Uniqueness and batch atomicity
//! hold because every write runs under one `RwLock` write guard.

use super::WalletStore;
use crate::codec::apply_patch;
use crate::codec::row::WalletRow;
use crate::error::AppError;
use crate::model::{Address, Backend, IdKind, NewWallet, Wallet, WalletId, WalletPatch};
use crate::query::{ListFilter, ListQuery, SortDirection, SortField};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    wallets: RwLock<HashMap<String, Wallet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(w: &Wallet, f: &ListFilter) -> bool {
    w.score >= f.min_score && w.score <= f.max_score && (!f.active_only || w.is_active)
}

fn compare(a: &Wallet, b: &Wallet, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Score => a.score.cmp(&b.score),
        SortField::Address => a.address.cmp(&b.address),
        SortField::LastUpdated => a.last_updated.cmp(&b.last_updated),
        SortField::IsActive => a.is_active.cmp(&b.is_active),
    }
}

fn address_taken(map: &HashMap<String, Wallet>, address: &str) -> bool {
    map.values().any(|w| w.address == address)
}

#[async_trait]
impl WalletStore for MemoryStore {
    fn backend(&self) -> Backend {
        Backend::Memory
    }

    fn id_kind(&self) -> IdKind {
        IdKind::Uuid
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Wallet>, AppError> {
        let map = self.wallets.read().await;
        let mut hits: Vec<&Wallet> = map.values().filter(|w| matches(w, &query.filter)).collect();
        hits.sort_by(|a, b| {
            let ord = compare(a, b, query.sort.field).then_with(|| a.id.cmp(&b.id));
            match query.sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        Ok(hits
            .into_iter()
            .skip(query.page.offset as usize)
            .take(query.page.limit as usize)
            .cloned()
            .collect())
    }

    async fn count_matching(&self, filter: &ListFilter) -> Result<u64, AppError> {
        let map = self.wallets.read().await;
        Ok(map.values().filter(|w| matches(w, filter)).count() as u64)
    }

    async fn get_by_id(&self, id: &WalletId) -> Result<Option<Wallet>, AppError> {
        Ok(self.wallets.read().await.get(id.as_str()).cloned())
    }

    async fn get_by_address(&self, address: &Address) -> Result<Option<Wallet>, AppError> {
        let map = self.wallets.read().await;
        Ok(map.values().find(|w| w.address == address.as_str()).cloned())
    }

    async fn existing_addresses(&self, addresses: &[Address]) -> Result<HashSet<Address>, AppError> {
        let map = self.wallets.read().await;
        Ok(addresses
            .iter()
            .filter(|a| address_taken(&map, a.as_str()))
            .cloned()
            .collect())
    }

    async fn insert(&self, new: NewWallet) -> Result<Wallet, AppError> {
        let mut map = self.wallets.write().await;
        if address_taken(&map, new.address.as_str()) {
            return Err(AppError::Conflict("wallet address already exists".into()));
        }
        let wallet = Wallet::from(WalletRow::new(&new));
        map.insert(wallet.id.clone(), wallet.clone());
        Ok(wallet)
    }

    async fn update(&self, id: &WalletId, patch: &WalletPatch, now: DateTime<Utc>) -> Result<Option<Wallet>, AppError> {
        let mut map = self.wallets.write().await;
        Ok(map.get_mut(id.as_str()).map(|stored| {
            apply_patch(stored, patch, now);
            stored.clone()
        }))
    }

    async fn delete(&self, id: &WalletId) -> Result<Option<Wallet>, AppError> {
        Ok(self.wallets.write().await.remove(id.as_str()))
    }

    async fn bulk_insert(&self, batch: Vec<NewWallet>) -> Result<Vec<String>, AppError> {
        let mut map = self.wallets.write().await;
        let mut seen = HashSet::with_capacity(batch.len());
        for new in &batch {
            if address_taken(&map, new.address.as_str()) || !seen.insert(new.address.as_str()) {
                return Err(AppError::Conflict(format!(
                    "wallet address already exists: {}",
                    new.address
                )));
            }
        }
        let mut ids = Vec::with_capacity(batch.len());
        for new in &batch {
            let wallet = Wallet::from(WalletRow::new(new));
            ids.push(wallet.id.clone());
            map.insert(wallet.id.clone(), wallet);
        }
        Ok(ids)
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    fn new_wallet(score: i32) -> NewWallet {
        let now = codec::now();
        NewWallet {
            address: Address("0x2222222222222222222222222222222222222222".into()),
            score,
            is_active: true,
            created_at: now,
            last_updated: now,
        }
    }

    #[tokio::test]
    async fn interleaved_patches_keep_each_others_fields() {
        let store = MemoryStore::new();
        let created = store.insert(new_wallet(0)).await.unwrap();
        let id = WalletId(created.id.clone());

        store
            .update(&id, &WalletPatch { score: Some(9), is_active: None }, codec::now())
            .await
            .unwrap();
        let last = store
            .update(&id, &WalletPatch { score: None, is_active: Some(false) }, codec::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.score, 9);
        assert!(!last.is_active);
        assert_eq!(store.get_by_id(&id).await.unwrap().unwrap(), last);
    }

    #[tokio::test]
    async fn update_of_missing_id_is_none() {
        let store = MemoryStore::new();
        let id = WalletId(uuid::Uuid::new_v4().to_string());
        let res = store.update(&id, &WalletPatch::default(), codec::now()).await.unwrap();
        assert!(res.is_none());
    }
}
