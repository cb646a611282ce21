//! Wallet registry: a wallet record API over PostgreSQL, MongoDB or an in-process store.

pub mod codec;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::{AppError, ConfigError};
pub use model::{Backend, CreateWallet, UpdateWallet, Wallet};
pub use routes::{app, common_routes, wallet_routes, ApiDoc};
pub use service::WalletService;
pub use state::AppState;
pub use store::{connect, WalletStore};
