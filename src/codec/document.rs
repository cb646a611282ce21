//! BSON documents for the MongoDB collection. `_id` is assigned by the store.

use crate::error::AppError;
use crate::model::{NewWallet, Wallet, WalletPatch};
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};

fn to_bson_time(t: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(t.timestamp_millis())
}

fn from_bson_time(t: &BsonDateTime) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp_millis(t.timestamp_millis())
        .ok_or_else(|| AppError::Backend(format!("timestamp out of range: {}", t)))
}

fn corrupt(field: &str, err: impl std::fmt::Display) -> AppError {
    AppError::Backend(format!("stored wallet has bad '{}': {}", field, err))
}

pub fn to_document(new: &NewWallet) -> Document {
    doc! {
        "address": new.address.as_str(),
        "score": new.score,
        "is_active": new.is_active,
        "created_at": to_bson_time(new.created_at),
        "last_updated": to_bson_time(new.last_updated),
    }
}

/// Update document touching only the fields present in `patch`. `last_updated`
/// goes through `$max` so it never moves backwards.
pub fn patch_document(patch: &WalletPatch, now: DateTime<Utc>) -> Document {
    let mut set = Document::new();
    if let Some(score) = patch.score {
        set.insert("score", score);
    }
    if let Some(active) = patch.is_active {
        set.insert("is_active", active);
    }
    let mut update = doc! { "$max": { "last_updated": to_bson_time(now) } };
    if !set.is_empty() {
        update.insert("$set", set);
    }
    update
}

pub fn from_document(d: &Document) -> Result<Wallet, AppError> {
    let id = d.get_object_id("_id").map_err(|e| corrupt("_id", e))?;
    let score = match d.get("score") {
        Some(Bson::Int32(n)) => *n,
        Some(Bson::Int64(n)) => i32::try_from(*n).map_err(|e| corrupt("score", e))?,
        other => return Err(corrupt("score", format!("{:?}", other))),
    };
    Ok(Wallet {
        id: id.to_hex(),
        address: d.get_str("address").map_err(|e| corrupt("address", e))?.to_string(),
        score,
        // documents written before the flag existed count as active
        is_active: d.get_bool("is_active").unwrap_or(true),
        created_at: from_bson_time(d.get_datetime("created_at").map_err(|e| corrupt("created_at", e))?)?,
        last_updated: from_bson_time(
            d.get_datetime("last_updated").map_err(|e| corrupt("last_updated", e))?,
        )?,
    })
}
