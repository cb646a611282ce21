//! Builds parameterized statements for the wallet table.
//!
//! Values always travel as `@name` placeholders. Only the table name (validated
//! config) and the sort column/direction (closed enums) are written into the text.

use super::params::SqlParam;
use crate::codec::row::WalletRow;
use crate::error::AppError;
use crate::model::{Address, WalletPatch};
use chrono::{DateTime, Utc};
use crate::query::{ListFilter, ListQuery};

const COLUMNS: &str = "id, address, score, is_active, created_at, last_updated";

/// Quote identifier for PostgreSQL (safe: only from config).
pub fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<(&'static str, SqlParam)>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    fn bind(&mut self, name: &'static str, v: SqlParam) -> String {
        self.params.push((name, v));
        format!("@{}", name)
    }

    pub fn param(&self, name: &str) -> Option<&SqlParam> {
        self.params.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Rewrite `@name` placeholders to `$1, $2, …` and return values in that order.
    /// A name used more than once maps to a single position.
    pub fn to_positional(&self) -> Result<(String, Vec<SqlParam>), AppError> {
        let mut out = String::with_capacity(self.sql.len());
        let mut order: Vec<&str> = Vec::new();
        let mut values = Vec::new();
        let mut chars = self.sql.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c != '@' {
                out.push(c);
                continue;
            }
            let start = i + 1;
            let mut end = start;
            while let Some(&(j, n)) = chars.peek() {
                if n.is_ascii_alphanumeric() || n == '_' {
                    end = j + n.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let name = &self.sql[start..end];
            if name.is_empty() {
                out.push('@');
                continue;
            }
            let pos = match order.iter().position(|n| *n == name) {
                Some(p) => p + 1,
                None => {
                    let value = self
                        .param(name)
                        .ok_or_else(|| AppError::Backend(format!("unbound placeholder @{}", name)))?;
                    order.push(name);
                    values.push(value.clone());
                    order.len()
                }
            };
            out.push('$');
            out.push_str(&pos.to_string());
        }
        Ok((out, values))
    }
}

fn where_clause(q: &mut QueryBuf, filter: &ListFilter) -> String {
    let mut parts = vec![
        format!("score >= {}", q.bind("min_score", SqlParam::Int(filter.min_score))),
        format!("score <= {}", q.bind("max_score", SqlParam::Int(filter.max_score))),
    ];
    if filter.active_only {
        parts.push(format!("is_active = {}", q.bind("is_active", SqlParam::Bool(true))));
    }
    format!(" WHERE {}", parts.join(" AND "))
}

/// SELECT page of wallets matching the filter, ordered by the requested column.
pub fn select_list(table: &str, query: &ListQuery) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, &query.filter);
    let limit = q.bind("limit", SqlParam::BigInt(query.page.limit));
    let offset = q.bind("offset", SqlParam::BigInt(query.page.offset));
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} {} LIMIT {} OFFSET {}",
        COLUMNS,
        quote_ident(table),
        where_sql,
        query.sort.field.column(),
        query.sort.direction.sql(),
        limit,
        offset
    );
    q
}

pub fn count_matching(table: &str, filter: &ListFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, filter);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quote_ident(table), where_sql);
    q
}

pub fn select_by_id(table: &str, id: uuid::Uuid) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.bind("id", SqlParam::Uuid(id));
    q.sql = format!("SELECT {} FROM {} WHERE id = {}", COLUMNS, quote_ident(table), ph);
    q
}

pub fn select_by_address(table: &str, address: &Address) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.bind("address", SqlParam::Text(address.as_str().to_string()));
    q.sql = format!(
        "SELECT {} FROM {} WHERE address = {} LIMIT 1",
        COLUMNS,
        quote_ident(table),
        ph
    );
    q
}

/// Which of `addresses` already exist; one round trip for a whole batch.
pub fn select_addresses_in(table: &str, addresses: &[Address]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let values = addresses.iter().map(|a| a.as_str().to_string()).collect();
    let ph = q.bind("addresses", SqlParam::TextArray(values));
    q.sql = format!("SELECT address FROM {} WHERE address = ANY({})", quote_ident(table), ph);
    q
}

pub fn insert(table: &str, row: &WalletRow) -> QueryBuf {
    let mut q = QueryBuf::new();
    let placeholders = [
        q.bind("id", SqlParam::Uuid(row.id)),
        q.bind("address", SqlParam::Text(row.address.clone())),
        q.bind("score", SqlParam::Int(row.score)),
        q.bind("is_active", SqlParam::Bool(row.is_active)),
        q.bind("created_at", SqlParam::Timestamp(row.created_at)),
        q.bind("last_updated", SqlParam::Timestamp(row.last_updated)),
    ];
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quote_ident(table),
        COLUMNS,
        placeholders.join(", "),
        COLUMNS
    );
    q
}

/// UPDATE only the columns present in `patch`; `last_updated` never moves backwards.
pub fn update(table: &str, id: uuid::Uuid, patch: &WalletPatch, now: DateTime<Utc>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    if let Some(score) = patch.score {
        sets.push(format!("score = {}", q.bind("score", SqlParam::Int(score))));
    }
    if let Some(active) = patch.is_active {
        sets.push(format!("is_active = {}", q.bind("is_active", SqlParam::Bool(active))));
    }
    sets.push(format!(
        "last_updated = GREATEST({}, last_updated)",
        q.bind("now", SqlParam::Timestamp(now))
    ));
    let id = q.bind("id", SqlParam::Uuid(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE id = {} RETURNING {}",
        quote_ident(table),
        sets.join(", "),
        id,
        COLUMNS
    );
    q
}

pub fn delete(table: &str, id: uuid::Uuid) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.bind("id", SqlParam::Uuid(id));
    q.sql = format!("DELETE FROM {} WHERE id = {} RETURNING {}", quote_ident(table), ph, COLUMNS);
    q
}
