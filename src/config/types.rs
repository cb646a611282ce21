//! Runtime settings for the server and its storage backend.

use crate::model::Backend;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/crypto_tracker";
pub const DEFAULT_MONGODB_URL: &str = "mongodb://localhost:27017";
pub const DEFAULT_DB_NAME: &str = "crypto_tracker";
pub const DEFAULT_COLLECTION: &str = "smart_wallets";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// SQL mode: connection and table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostgresSettings {
    pub url: String,
    pub max_connections: u32,
    pub table: String,
    /// Create the database named in `url` when it does not exist yet.
    pub create_database: bool,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        PostgresSettings {
            url: DEFAULT_DATABASE_URL.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            table: DEFAULT_COLLECTION.into(),
            create_database: true,
        }
    }
}

/// Document mode: cluster, database and collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MongoSettings {
    pub url: String,
    pub database: String,
    pub collection: String,
}

impl Default for MongoSettings {
    fn default() -> Self {
        MongoSettings {
            url: DEFAULT_MONGODB_URL.into(),
            database: DEFAULT_DB_NAME.into(),
            collection: DEFAULT_COLLECTION.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub backend: Backend,
    pub postgres: PostgresSettings,
    pub mongodb: MongoSettings,
    pub host: String,
    pub port: u16,
    /// `["*"]` allows any origin.
    pub allowed_origins: Vec<String>,
    pub body_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            backend: Backend::Postgres,
            postgres: PostgresSettings::default(),
            mongodb: MongoSettings::default(),
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            allowed_origins: vec!["*".into()],
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl Settings {
    /// In-process settings for tests and local experiments.
    pub fn memory() -> Self {
        Settings {
            backend: Backend::Memory,
            ..Settings::default()
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}
