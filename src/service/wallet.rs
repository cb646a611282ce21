//! Wallet operations over any [`WalletStore`]: validation first, then storage round trips.

use super::validation::{validate_address, validate_identifier, RequestValidator};
use crate::codec;
use crate::error::AppError;
use crate::model::{Backend, CreateWallet, UpdateWallet, Wallet};
use crate::query::{ListFilter, ListQuery};
use crate::store::WalletStore;
use std::collections::HashSet;
use std::sync::Arc;

pub const BULK_LIMIT: usize = 100;

#[derive(Clone)]
pub struct WalletService {
    store: Arc<dyn WalletStore>,
}

impl WalletService {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        WalletService { store }
    }

    pub fn backend(&self) -> Backend {
        self.store.backend()
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }

    /// Release the storage client; called once at shutdown.
    pub async fn close(&self) {
        self.store.close().await;
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Wallet>, AppError> {
        self.store.list(query).await
    }

    pub async fn count(&self, filter: &ListFilter) -> Result<u64, AppError> {
        self.store.count_matching(filter).await
    }

    pub async fn get(&self, raw_id: &str) -> Result<Wallet, AppError> {
        let id = validate_identifier(raw_id, self.store.id_kind())?;
        self.store
            .get_by_id(&id)
            .await?
            .ok_or_else(|| not_found(raw_id))
    }

    pub async fn find_by_address(&self, raw_address: &str) -> Result<Wallet, AppError> {
        let address = validate_address(raw_address)?;
        self.store
            .get_by_address(&address)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("wallet with address {} not found", address)))
    }

    /// Pre-checks the address for a clear error; the store's own uniqueness
    /// enforcement still catches a concurrent insert of the same address.
    pub async fn create(&self, payload: &CreateWallet) -> Result<Wallet, AppError> {
        let new = RequestValidator::create(payload, codec::now())?;
        if self.store.get_by_address(&new.address).await?.is_some() {
            tracing::warn!(address = %new.address, "rejected duplicate wallet address");
            return Err(AppError::Conflict("wallet address already exists".into()));
        }
        let wallet = self.store.insert(new).await?;
        tracing::info!(id = %wallet.id, address = %wallet.address, "created wallet");
        Ok(wallet)
    }

    pub async fn update(&self, raw_id: &str, payload: &UpdateWallet) -> Result<Wallet, AppError> {
        let id = validate_identifier(raw_id, self.store.id_kind())?;
        let patch = RequestValidator::patch(payload)?;
        let wallet = self
            .store
            .update(&id, &patch, codec::now())
            .await?
            .ok_or_else(|| not_found(raw_id))?;
        tracing::info!(id = %wallet.id, score = wallet.score, is_active = wallet.is_active, "updated wallet");
        Ok(wallet)
    }

    pub async fn delete(&self, raw_id: &str) -> Result<Wallet, AppError> {
        let id = validate_identifier(raw_id, self.store.id_kind())?;
        let wallet = self
            .store
            .delete(&id)
            .await?
            .ok_or_else(|| not_found(raw_id))?;
        tracing::info!(id = %wallet.id, "deleted wallet");
        Ok(wallet)
    }

    /// All-or-nothing: size check, then every entry validated, then one existence
    /// query for the batch, then duplicates inside the batch, then the insert.
    pub async fn bulk_create(&self, payloads: &[CreateWallet]) -> Result<Vec<String>, AppError> {
        if payloads.len() > BULK_LIMIT {
            return Err(AppError::BatchTooLarge {
                size: payloads.len(),
                max: BULK_LIMIT,
            });
        }
        let now = codec::now();
        let batch = payloads
            .iter()
            .map(|p| RequestValidator::create(p, now))
            .collect::<Result<Vec<_>, _>>()?;

        let addresses: Vec<_> = batch.iter().map(|n| n.address.clone()).collect();
        let existing = self.store.existing_addresses(&addresses).await?;
        let mut seen = HashSet::with_capacity(batch.len());
        for (payload, address) in payloads.iter().zip(&addresses) {
            if existing.contains(address) {
                tracing::warn!(address = %address, "bulk create rejected: address exists");
                return Err(AppError::Conflict(format!(
                    "wallet address already exists: {}",
                    payload.address
                )));
            }
            if !seen.insert(address) {
                tracing::warn!(address = %address, "bulk create rejected: address repeated in batch");
                return Err(AppError::Conflict(format!(
                    "wallet address appears more than once in batch: {}",
                    payload.address
                )));
            }
        }

        let ids = self.store.bulk_insert(batch).await?;
        tracing::info!(count = ids.len(), "bulk created wallets");
        Ok(ids)
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("wallet with ID {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ListParams, SortField};
    use crate::store::MemoryStore;
    use std::time::Duration;

    const ADDR: &str = "0x1111111111111111111111111111111111111111";

    fn service() -> WalletService {
        WalletService::new(Arc::new(MemoryStore::new()))
    }

    fn payload(address: &str, score: i64) -> CreateWallet {
        CreateWallet {
            address: address.into(),
            score,
            is_active: true,
        }
    }

    fn addr(n: u32) -> String {
        format!("0x{:040x}", n)
    }

    #[tokio::test]
    async fn create_update_delete_scenario() {
        let svc = service();
        let created = svc.create(&payload(ADDR, 5)).await.unwrap();
        assert_eq!(created.created_at, created.last_updated);
        assert!(created.is_active);

        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = svc
            .update(&created.id, &UpdateWallet { score: Some(9), is_active: None })
            .await
            .unwrap();
        assert_eq!(updated.score, 9);
        assert!(updated.is_active);
        assert_eq!(updated.address, created.address);
        assert!(updated.last_updated > updated.created_at);

        let deleted = svc.delete(&created.id).await.unwrap();
        assert_eq!(deleted.score, 9);
        assert!(matches!(svc.get(&created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_address_conflicts_case_insensitively() {
        let svc = service();
        let mixed = "0xABCDEFabcdefABCDEFabcdefABCDEFabcdefABCD";
        svc.create(&payload(mixed, 1)).await.unwrap();
        let again = svc.create(&payload(&mixed.to_lowercase(), 2)).await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_storage() {
        let svc = service();
        assert!(matches!(svc.create(&payload("0x123", 5)).await, Err(AppError::InvalidFormat(_))));
        assert!(matches!(svc.create(&payload(ADDR, 11)).await, Err(AppError::OutOfRange(_))));
        assert!(matches!(svc.get("not-a-uuid").await, Err(AppError::InvalidFormat(_))));
        assert_eq!(svc.count(&ListFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_partial_updates_both_land() {
        let svc = service();
        let created = svc.create(&payload(ADDR, 0)).await.unwrap();
        let score = UpdateWallet { score: Some(9), is_active: None };
        let active = UpdateWallet { score: None, is_active: Some(false) };
        let (a, b) = tokio::join!(svc.update(&created.id, &score), svc.update(&created.id, &active));
        a.unwrap();
        b.unwrap();
        let stored = svc.get(&created.id).await.unwrap();
        assert_eq!(stored.score, 9);
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn empty_update_refreshes_last_updated() {
        let svc = service();
        let created = svc.create(&payload(ADDR, 3)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = svc.update(&created.id, &UpdateWallet::default()).await.unwrap();
        assert_eq!(updated.score, 3);
        assert!(updated.last_updated > created.last_updated);
    }

    #[tokio::test]
    async fn bulk_over_limit_persists_nothing() {
        let svc = service();
        let batch: Vec<_> = (0..101).map(|i| payload(&addr(i), 1)).collect();
        let err = svc.bulk_create(&batch).await.unwrap_err();
        assert!(matches!(err, AppError::BatchTooLarge { size: 101, max: 100 }));
        assert_eq!(svc.count(&ListFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn bulk_with_existing_address_is_all_or_nothing() {
        let svc = service();
        svc.create(&payload(&addr(3), 2)).await.unwrap();
        let batch: Vec<_> = (1..=5).map(|i| payload(&addr(i), 4)).collect();
        assert!(matches!(svc.bulk_create(&batch).await, Err(AppError::Conflict(_))));
        assert_eq!(svc.count(&ListFilter::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn bulk_with_repeated_address_is_rejected() {
        let svc = service();
        let batch = vec![
            payload(&addr(0xab), 1),
            payload(&addr(2), 2),
            payload(&addr(0xab).to_uppercase().replacen("0X", "0x", 1), 3),
        ];
        assert!(matches!(svc.bulk_create(&batch).await, Err(AppError::Conflict(_))));
        assert_eq!(svc.count(&ListFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn bulk_with_one_bad_address_inserts_nothing() {
        let svc = service();
        let batch = vec![payload(&addr(1), 1), payload("0xnothex", 2)];
        assert!(matches!(svc.bulk_create(&batch).await, Err(AppError::InvalidFormat(_))));
        assert_eq!(svc.count(&ListFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn bulk_returns_ids_in_order() {
        let svc = service();
        let batch: Vec<_> = (1..=3).map(|i| payload(&addr(i), i as i64)).collect();
        let ids = svc.bulk_create(&batch).await.unwrap();
        assert_eq!(ids.len(), 3);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(svc.get(id).await.unwrap().address, addr(i as u32 + 1));
        }
    }

    #[tokio::test]
    async fn list_filters_and_sorts() {
        let svc = service();
        for (i, (score, active)) in [(7, true), (9, true), (6, false), (2, true), (6, true)].iter().enumerate() {
            svc.create(&CreateWallet {
                address: addr(i as u32 + 1),
                score: *score,
                is_active: *active,
            })
            .await
            .unwrap();
        }
        let query = ListQuery::try_from(ListParams {
            active_only: true,
            min_score: 6,
            max_score: 10,
            sort_by: "score".into(),
            sort_order: 1,
            ..ListParams::default()
        })
        .unwrap();
        assert_eq!(query.sort.field, SortField::Score);
        let scores: Vec<i32> = svc.list(&query).await.unwrap().iter().map(|w| w.score).collect();
        assert_eq!(scores, vec![6, 7, 9]);
    }

    #[tokio::test]
    async fn search_by_address_normalizes_case() {
        let svc = service();
        let created = svc.create(&payload(ADDR, 5)).await.unwrap();
        let upper = ADDR.to_uppercase().replacen("0X", "0x", 1);
        assert_eq!(svc.find_by_address(&upper).await.unwrap().id, created.id);
        assert!(matches!(
            svc.find_by_address(&addr(42)).await,
            Err(AppError::NotFound(_))
        ));
    }
}
