//! Typed values bound to named placeholders.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

/// A value that can be bound to a PostgreSQL query.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlParam {
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Text(String),
    TextArray(Vec<String>),
    Uuid(uuid::Uuid),
    Timestamp(DateTime<Utc>),
}

impl SqlParam {
    pub fn bind_to<'q>(
        self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            SqlParam::Bool(b) => query.bind(b),
            SqlParam::Int(n) => query.bind(n),
            SqlParam::BigInt(n) => query.bind(n),
            SqlParam::Text(s) => query.bind(s),
            SqlParam::TextArray(v) => query.bind(v),
            SqlParam::Uuid(u) => query.bind(u),
            SqlParam::Timestamp(t) => query.bind(t),
        }
    }
}

/// Build a query from rendered SQL and positional values, in order.
pub fn bind_all(sql: &str, params: Vec<SqlParam>) -> Query<'_, Postgres, PgArguments> {
    params
        .into_iter()
        .fold(sqlx::query(sql), |q, p| p.bind_to(q))
}
