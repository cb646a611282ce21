//! Identifier, address and payload validation. Runs before any storage access.

use crate::error::AppError;
use crate::model::{
    Address, CreateWallet, IdKind, NewWallet, UpdateWallet, WalletId, WalletPatch, MAX_SCORE,
    MIN_SCORE,
};
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use regex::Regex;
use std::sync::LazyLock;

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("address pattern compiles"));

pub const ADDRESS_LEN: usize = 42;

/// Checks `0x` + 40 hex digits and returns the lowercase form.
pub fn validate_address(raw: &str) -> Result<Address, AppError> {
    if raw.len() != ADDRESS_LEN || !ADDRESS_RE.is_match(raw) {
        return Err(AppError::InvalidFormat(format!(
            "invalid Ethereum address format: '{}'",
            raw
        )));
    }
    Ok(Address(raw.to_ascii_lowercase()))
}

/// Parses an identifier in the form the active backend issues.
pub fn validate_identifier(raw: &str, kind: IdKind) -> Result<WalletId, AppError> {
    match kind {
        IdKind::ObjectId => ObjectId::parse_str(raw)
            .map(|oid| WalletId(oid.to_hex()))
            .map_err(|_| AppError::InvalidFormat("invalid wallet ID format".into())),
        IdKind::Uuid => uuid::Uuid::parse_str(raw)
            .map(|u| WalletId(u.to_string()))
            .map_err(|_| AppError::InvalidFormat("invalid wallet ID format".into())),
    }
}

pub fn validate_score(score: i64) -> Result<i32, AppError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(AppError::OutOfRange(format!(
            "score must be between {} and {}, got {}",
            MIN_SCORE, MAX_SCORE, score
        )));
    }
    Ok(score as i32)
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create payload and stamp both timestamps with `now`.
    pub fn create(payload: &CreateWallet, now: DateTime<Utc>) -> Result<NewWallet, AppError> {
        let address = validate_address(&payload.address)?;
        let score = validate_score(payload.score)?;
        Ok(NewWallet {
            address,
            score,
            is_active: payload.is_active,
            created_at: now,
            last_updated: now,
        })
    }

    pub fn patch(payload: &UpdateWallet) -> Result<WalletPatch, AppError> {
        let score = payload.score.map(validate_score).transpose()?;
        Ok(WalletPatch {
            score,
            is_active: payload.is_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

    #[test]
    fn address_is_lowercased() {
        let a = validate_address(ADDR).unwrap();
        assert_eq!(a.as_str(), "0x742d35cc6634c0532925a3b844bc454e4438f44e");
    }

    #[test]
    fn address_rejects_bad_shapes() {
        for bad in [
            "",
            "0x",
            "742d35Cc6634C0532925a3b844Bc454e4438f44e00",
            "0X742d35Cc6634C0532925a3b844Bc454e4438f44e",
            "0x742d35Cc6634C0532925a3b844Bc454e4438f44",
            "0x742d35Cc6634C0532925a3b844Bc454e4438f44e1",
            "0x742d35Cc6634C0532925a3b844Bc454e4438f44g",
        ] {
            assert!(
                matches!(validate_address(bad), Err(AppError::InvalidFormat(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn identifier_follows_backend_kind() {
        let oid = "64b7f0c2a1b2c3d4e5f60718";
        assert_eq!(validate_identifier(oid, IdKind::ObjectId).unwrap().as_str(), oid);
        assert!(validate_identifier(oid, IdKind::Uuid).is_err());

        let uuid = "3F2B8C1E-9A4D-4B7E-8F21-6C0D5E4A7B19";
        assert_eq!(
            validate_identifier(uuid, IdKind::Uuid).unwrap().as_str(),
            "3f2b8c1e-9a4d-4b7e-8f21-6c0d5e4a7b19"
        );
        assert!(validate_identifier(uuid, IdKind::ObjectId).is_err());
        assert!(validate_identifier("not-an-id", IdKind::Uuid).is_err());
    }

    #[test]
    fn score_bounds_are_inclusive() {
        assert_eq!(validate_score(0).unwrap(), 0);
        assert_eq!(validate_score(10).unwrap(), 10);
        assert!(matches!(validate_score(-1), Err(AppError::OutOfRange(_))));
        assert!(matches!(validate_score(11), Err(AppError::OutOfRange(_))));
    }

    #[test]
    fn create_stamps_equal_timestamps() {
        let now = Utc::now();
        let new = RequestValidator::create(
            &CreateWallet {
                address: ADDR.into(),
                score: 5,
                is_active: true,
            },
            now,
        )
        .unwrap();
        assert_eq!(new.created_at, new.last_updated);
        assert_eq!(new.score, 5);
    }

    #[test]
    fn patch_validates_present_score_only() {
        let p = RequestValidator::patch(&UpdateWallet {
            score: None,
            is_active: Some(false),
        })
        .unwrap();
        assert_eq!(p.score, None);
        assert!(RequestValidator::patch(&UpdateWallet {
            score: Some(42),
            is_active: None
        })
        .is_err());
    }

    proptest! {
        #[test]
        fn normalization_ignores_case(hex in "[0-9a-fA-F]{40}") {
            let raw = format!("0x{hex}");
            let lower = validate_address(&raw).unwrap();
            let upper = validate_address(&format!("0x{}", hex.to_uppercase())).unwrap();
            prop_assert_eq!(lower, upper);
        }

        #[test]
        fn non_hex_bodies_are_rejected(body in "[g-zG-Z]{1}[0-9a-fA-F]{39}") {
            let raw = format!("0x{body}");
            prop_assert!(matches!(validate_address(&raw), Err(AppError::InvalidFormat(_))));
        }
    }
}
