//! MongoDB form of a list request: structured filter and sort documents, never strings.

use super::{ListFilter, ListQuery};
use mongodb::bson::{doc, Document};

#[derive(Clone, Debug, PartialEq)]
pub struct DocumentQuery {
    pub filter: Document,
    pub sort: Document,
    pub skip: u64,
    pub limit: i64,
}

/// `{score: {$gte, $lte}}` plus `is_active: true` when only active wallets are wanted.
pub fn build_filter(filter: &ListFilter) -> Document {
    let mut d = doc! {
        "score": { "$gte": filter.min_score, "$lte": filter.max_score },
    };
    if filter.active_only {
        d.insert("is_active", true);
    }
    d
}

pub fn build_list_query(query: &ListQuery) -> DocumentQuery {
    let mut sort = Document::new();
    sort.insert(query.sort.field.column(), query.sort.direction.signum());
    DocumentQuery {
        filter: build_filter(&query.filter),
        sort,
        skip: query.page.offset as u64,
        limit: query.page.limit,
    }
}
