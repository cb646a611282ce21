//! Settings validation: identifiers that end up in DDL or index names, and numeric floors.

use crate::config::Settings;
use crate::error::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("identifier pattern compiles"));

pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

fn identifier(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if is_identifier(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            key,
            value: value.to_string(),
        })
    }
}

pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    identifier("WALLET_TABLE", &settings.postgres.table)?;
    identifier("DB_NAME", &settings.mongodb.database)?;
    identifier("WALLETS_COLLECTION", &settings.mongodb.collection)?;
    if settings.postgres.max_connections == 0 {
        return Err(ConfigError::InvalidValue {
            key: "DATABASE_MAX_CONNECTIONS",
            reason: "must be at least 1".into(),
        });
    }
    if settings.body_limit == 0 {
        return Err(ConfigError::InvalidValue {
            key: "BODY_LIMIT_BYTES",
            reason: "must be at least 1".into(),
        });
    }
    if settings.allowed_origins.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "ALLOWED_ORIGINS",
            reason: "at least one origin (or *) required".into(),
        });
    }
    Ok(())
}
