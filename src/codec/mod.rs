//! Mapping between API records and each backend's storage shape.

pub mod document;
pub mod row;

use crate::model::{Wallet, WalletPatch};
use chrono::{DateTime, SubsecRound, Utc};

/// Current time at millisecond precision, the finest every backend keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Overwrite the fields present in `patch` and refresh `last_updated`,
/// even when no value actually changes. Stores call this on the current record
/// while holding their write guard.
pub fn apply_patch(wallet: &mut Wallet, patch: &WalletPatch, now: DateTime<Utc>) {
    if let Some(score) = patch.score {
        wallet.score = score;
    }
    if let Some(active) = patch.is_active {
        wallet.is_active = active;
    }
    // last_updated never moves backwards, so it stays >= created_at.
    wallet.last_updated = now.max(wallet.last_updated);
}
