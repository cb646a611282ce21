//! Typed rows for the PostgreSQL table. Ids are generated here, not by the database.

use crate::model::{NewWallet, Wallet};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct WalletRow {
    pub id: Uuid,
    pub address: String,
    pub score: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl WalletRow {
    /// Row for a new wallet with a fresh random id.
    pub fn new(new: &NewWallet) -> Self {
        WalletRow {
            id: Uuid::new_v4(),
            address: new.address.as_str().to_string(),
            score: new.score,
            is_active: new.is_active,
            created_at: new.created_at,
            last_updated: new.last_updated,
        }
    }
}

impl From<WalletRow> for Wallet {
    fn from(row: WalletRow) -> Self {
        Wallet {
            id: row.id.to_string(),
            address: row.address,
            score: row.score,
            is_active: row.is_active,
            created_at: row.created_at,
            last_updated: row.last_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Address;

    fn new_wallet() -> NewWallet {
        let now = crate::codec::now();
        NewWallet {
            address: Address("0x1234567890123456789012345678901234567890".into()),
            score: 8,
            is_active: true,
            created_at: now,
            last_updated: now,
        }
    }

    #[test]
    fn each_row_gets_its_own_id() {
        let n = new_wallet();
        assert_ne!(WalletRow::new(&n).id, WalletRow::new(&n).id);
    }

    #[test]
    fn wallet_id_is_hyphenated_uuid_text() {
        let row = WalletRow::new(&new_wallet());
        let id = row.id;
        let wallet = Wallet::from(row.clone());
        assert_eq!(wallet.id, id.to_string());
    }
}
