//! PostgreSQL adapter: parameterized statements from `crate::sql`, UUIDs generated client-side.

use super::WalletStore;
use crate::codec::row::WalletRow;
use crate::config::PostgresSettings;
use crate::error::{AppError, ConfigError};
use crate::model::{Address, Backend, IdKind, NewWallet, Wallet, WalletId, WalletPatch};
use crate::query::{ListFilter, ListQuery};
use crate::sql::{self, bind_all, quote_ident, QueryBuf};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{ConnectOptions, FromRow, Row};
use std::collections::HashSet;
use std::str::FromStr;

pub struct PgStore {
    pool: PgPool,
    table: String,
}

impl PgStore {
    pub async fn connect(settings: &PostgresSettings) -> Result<Self, AppError> {
        if settings.create_database {
            ensure_database_exists(&settings.url).await?;
        }
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.url)
            .await?;
        let store = PgStore {
            pool,
            table: settings.table.clone(),
        };
        store.ensure_table().await?;
        Ok(store)
    }

    /// Create the wallet table with a native unique constraint on `address`.
    pub async fn ensure_table(&self) -> Result<(), AppError> {
        let table = quote_ident(&self.table);
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                address TEXT NOT NULL UNIQUE,
                score INTEGER NOT NULL CHECK (score BETWEEN 0 AND 10),
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL,
                last_updated TIMESTAMPTZ NOT NULL,
                CHECK (created_at <= last_updated)
            )
            "#,
            table
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        for column in ["score", "created_at"] {
            let index = quote_ident(&format!("{}_{}_idx", self.table, column));
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                index, table, column
            ))
            .execute(&self.pool)
            .await?;
        }
        tracing::info!(table = %self.table, "wallet table ensured");
        Ok(())
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Wallet>, AppError> {
        let (sql, params) = q.to_positional()?;
        tracing::debug!(sql = %sql, "query");
        let row = bind_all(&sql, params).fetch_optional(&self.pool).await?;
        row.as_ref().map(decode).transpose()
    }

    fn uuid(id: &WalletId) -> Result<uuid::Uuid, AppError> {
        uuid::Uuid::parse_str(id.as_str())
            .map_err(|_| AppError::InvalidFormat("invalid wallet ID format".into()))
    }
}

fn decode(row: &PgRow) -> Result<Wallet, AppError> {
    Ok(WalletRow::from_row(row)?.into())
}

#[async_trait]
impl WalletStore for PgStore {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    fn id_kind(&self) -> IdKind {
        IdKind::Uuid
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Wallet>, AppError> {
        let (sql, params) = sql::select_list(&self.table, query).to_positional()?;
        tracing::debug!(sql = %sql, "query");
        let rows = bind_all(&sql, params).fetch_all(&self.pool).await?;
        rows.iter().map(decode).collect()
    }

    async fn count_matching(&self, filter: &ListFilter) -> Result<u64, AppError> {
        let (sql, params) = sql::count_matching(&self.table, filter).to_positional()?;
        tracing::debug!(sql = %sql, "query");
        let row = bind_all(&sql, params).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count.max(0) as u64)
    }

    async fn get_by_id(&self, id: &WalletId) -> Result<Option<Wallet>, AppError> {
        self.fetch_optional(&sql::select_by_id(&self.table, Self::uuid(id)?))
            .await
    }

    async fn get_by_address(&self, address: &Address) -> Result<Option<Wallet>, AppError> {
        self.fetch_optional(&sql::select_by_address(&self.table, address))
            .await
    }

    async fn existing_addresses(&self, addresses: &[Address]) -> Result<HashSet<Address>, AppError> {
        if addresses.is_empty() {
            return Ok(HashSet::new());
        }
        let (sql, params) = sql::select_addresses_in(&self.table, addresses).to_positional()?;
        tracing::debug!(sql = %sql, "query");
        let rows = bind_all(&sql, params).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|r| -> Result<Address, AppError> { Ok(Address(r.try_get("address")?)) })
            .collect()
    }

    async fn insert(&self, new: NewWallet) -> Result<Wallet, AppError> {
        let row = WalletRow::new(&new);
        self.fetch_optional(&sql::insert(&self.table, &row))
            .await?
            .ok_or_else(|| AppError::Backend("insert returned no row".into()))
    }

    async fn update(&self, id: &WalletId, patch: &WalletPatch, now: DateTime<Utc>) -> Result<Option<Wallet>, AppError> {
        self.fetch_optional(&sql::update(&self.table, Self::uuid(id)?, patch, now))
            .await
    }

    async fn delete(&self, id: &WalletId) -> Result<Option<Wallet>, AppError> {
        self.fetch_optional(&sql::delete(&self.table, Self::uuid(id)?))
            .await
    }

    async fn bulk_insert(&self, batch: Vec<NewWallet>) -> Result<Vec<String>, AppError> {
        let mut ids = Vec::with_capacity(batch.len());
        let mut tx = self.pool.begin().await?;
        for new in &batch {
            let row = WalletRow::new(new);
            let (sql, params) = sql::insert(&self.table, &row).to_positional()?;
            tracing::debug!(sql = %sql, "query (tx)");
            bind_all(&sql, params).execute(&mut *tx).await?;
            ids.push(row.id.to_string());
        }
        tx.commit().await?;
        Ok(ids)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let Some((admin, db_name)) = admin_target(database_url)? else {
        return Ok(());
    };
    let mut conn: sqlx::PgConnection = admin.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Admin connection (same server, `postgres` database) and the database to create.
/// `None` when the URL names no database or names `postgres` itself.
fn admin_target(database_url: &str) -> Result<Option<(PgConnectOptions, String)>, AppError> {
    let opts = PgConnectOptions::from_str(database_url).map_err(|e| invalid_url(e.to_string()))?;
    let db_name = match opts.get_database() {
        Some(name) if !name.is_empty() && name != "postgres" => name.to_string(),
        _ => return Ok(None),
    };
    Ok(Some((opts.database("postgres"), db_name)))
}

fn invalid_url(reason: String) -> AppError {
    ConfigError::InvalidValue {
        key: "DATABASE_URL",
        reason,
    }
    .into()
}
