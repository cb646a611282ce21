//! Load settings from the environment (after an optional `.env`).

use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use std::str::FromStr;

impl Settings {
    /// Read `.env` if present, then the process environment.
    pub fn from_env() -> Result<Settings, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Unset or blank keys take their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Settings::default();

        let backend = match get("WALLET_BACKEND") {
            Some(raw) => raw.parse()?,
            None => defaults.backend,
        };
        let postgres = PostgresSettings {
            url: get("DATABASE_URL").unwrap_or(defaults.postgres.url),
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"), defaults.postgres.max_connections)?,
            table: get("WALLET_TABLE").unwrap_or(defaults.postgres.table),
            create_database: parse_bool_or("DATABASE_CREATE", get("DATABASE_CREATE"), defaults.postgres.create_database)?,
        };
        let mongodb = MongoSettings {
            url: get("MONGODB_URL").unwrap_or(defaults.mongodb.url),
            database: get("DB_NAME").unwrap_or(defaults.mongodb.database),
            collection: get("WALLETS_COLLECTION").unwrap_or(defaults.mongodb.collection),
        };
        let allowed_origins = match get("ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
            None => defaults.allowed_origins,
        };

        let settings = Settings {
            backend,
            postgres,
            mongodb,
            host: get("API_HOST").unwrap_or(defaults.host),
            port: parse_or("API_PORT", get("API_PORT"), defaults.port)?,
            allowed_origins,
            body_limit: parse_or("BODY_LIMIT_BYTES", get("BODY_LIMIT_BYTES"), defaults.body_limit)?,
        };
        validate(&settings)?;
        Ok(settings)
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(s) => s.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: format!("'{}': {}", s, e),
        }),
    }
}

fn parse_bool_or(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::to_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError::InvalidValue {
            key,
            reason: format!("'{}' is not a boolean", other),
        }),
    }
}
