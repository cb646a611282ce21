//! Shared application state for all routes.

use crate::model::Backend;
use crate::service::WalletService;

#[derive(Clone)]
pub struct AppState {
    pub service: WalletService,
}

impl AppState {
    pub fn new(service: WalletService) -> Self {
        AppState { service }
    }

    pub fn backend(&self) -> Backend {
        self.service.backend()
    }
}
