//! WalletService: CRUD, search and bulk create on top of a `WalletStore`.

mod validation;
mod wallet;
pub use validation::{validate_address, validate_identifier, validate_score, RequestValidator};
pub use wallet::{WalletService, BULK_LIMIT};
