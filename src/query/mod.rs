//! Backend-neutral list request (filter, sort, page) and its validation.
//!
//! `document` turns a [`ListQuery`] into a MongoDB filter/sort; the SQL form
//! lives in [`crate::sql`].

pub mod document;

use crate::error::AppError;
use crate::model::{MAX_SCORE, MIN_SCORE};
use serde::Deserialize;
use utoipa::IntoParams;

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListFilter {
    pub active_only: bool,
    pub min_score: i32,
    pub max_score: i32,
}

impl Default for ListFilter {
    fn default() -> Self {
        ListFilter {
            active_only: false,
            min_score: MIN_SCORE as i32,
            max_score: MAX_SCORE as i32,
        }
    }
}

/// Sortable columns. Closed set: the SQL builder interpolates `column()` directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    Score,
    Address,
    LastUpdated,
    IsActive,
}

impl SortField {
    pub fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "created_at" => SortField::CreatedAt,
            "score" => SortField::Score,
            "address" => SortField::Address,
            "last_updated" => SortField::LastUpdated,
            "is_active" => SortField::IsActive,
            _ => return None,
        })
    }

    /// Unknown names fall back to `created_at` instead of failing the request.
    pub fn parse_lenient(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
            tracing::warn!(sort_by = %raw, "unknown sort field, falling back to created_at");
            SortField::CreatedAt
        })
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Score => "score",
            SortField::Address => "address",
            SortField::LastUpdated => "last_updated",
            SortField::IsActive => "is_active",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Wire form: `1` ascending, `-1` descending.
    pub fn from_order(order: i64) -> Result<Self, AppError> {
        match order {
            1 => Ok(SortDirection::Asc),
            -1 => Ok(SortDirection::Desc),
            other => Err(AppError::OutOfRange(format!(
                "sort_order must be 1 or -1, got {}",
                other
            ))),
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn signum(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: ListFilter,
    pub sort: Sort,
    pub page: Page,
}

/// Query string of `GET /wallets`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Only return active wallets.
    #[serde(default)]
    pub active_only: bool,
    #[serde(default = "default_min_score")]
    pub min_score: i64,
    #[serde(default = "default_max_score")]
    pub max_score: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    /// created_at, score, address, last_updated or is_active.
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// 1 for ascending, -1 for descending.
    #[serde(default = "default_sort_order")]
    pub sort_order: i64,
}

impl Default for ListParams {
    fn default() -> Self {
        ListParams {
            active_only: false,
            min_score: default_min_score(),
            max_score: default_max_score(),
            limit: default_limit(),
            offset: 0,
            sort_by: default_sort_by(),
            sort_order: default_sort_order(),
        }
    }
}

/// Query string of `GET /wallets/count`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CountParams {
    #[serde(default)]
    pub active_only: bool,
    #[serde(default = "default_min_score")]
    pub min_score: i64,
    #[serde(default = "default_max_score")]
    pub max_score: i64,
}

fn default_min_score() -> i64 {
    MIN_SCORE
}
fn default_max_score() -> i64 {
    MAX_SCORE
}
fn default_limit() -> i64 {
    DEFAULT_LIMIT
}
fn default_sort_by() -> String {
    "created_at".into()
}
fn default_sort_order() -> i64 {
    -1
}

fn score_bound(name: &str, value: i64) -> Result<i32, AppError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(AppError::OutOfRange(format!(
            "{} must be between {} and {}, got {}",
            name, MIN_SCORE, MAX_SCORE, value
        )));
    }
    Ok(value as i32)
}

fn filter_from(active_only: bool, min_score: i64, max_score: i64) -> Result<ListFilter, AppError> {
    Ok(ListFilter {
        active_only,
        min_score: score_bound("min_score", min_score)?,
        max_score: score_bound("max_score", max_score)?,
    })
}

impl TryFrom<ListParams> for ListQuery {
    type Error = AppError;

    fn try_from(p: ListParams) -> Result<Self, Self::Error> {
        let filter = filter_from(p.active_only, p.min_score, p.max_score)?;
        if !(1..=MAX_LIMIT).contains(&p.limit) {
            return Err(AppError::OutOfRange(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, p.limit
            )));
        }
        if p.offset < 0 {
            return Err(AppError::OutOfRange(format!(
                "offset must be non-negative, got {}",
                p.offset
            )));
        }
        Ok(ListQuery {
            filter,
            sort: Sort {
                field: SortField::parse_lenient(&p.sort_by),
                direction: SortDirection::from_order(p.sort_order)?,
            },
            page: Page {
                limit: p.limit,
                offset: p.offset,
            },
        })
    }
}

impl TryFrom<CountParams> for ListFilter {
    type Error = AppError;

    fn try_from(p: CountParams) -> Result<Self, Self::Error> {
        filter_from(p.active_only, p.min_score, p.max_score)
    }
}
