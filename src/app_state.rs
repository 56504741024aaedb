/// Shared application state
use crate::security::jwt::TokenCodec;
use crate::services::AuthService;
use crate::store::CredentialStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub store: Arc<dyn CredentialStore>,
    pub tokens: TokenCodec,
}

impl AppState {
    pub fn new(auth: AuthService, store: Arc<dyn CredentialStore>, tokens: TokenCodec) -> Self {
        Self {
            auth,
            store,
            tokens,
        }
    }
}
