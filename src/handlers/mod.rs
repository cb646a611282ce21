//! HTTP handlers for the wallet endpoints.

pub mod wallet;
pub use wallet::*;
