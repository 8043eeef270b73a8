//! Authentication operations, the only writers of the [`SessionStore`].

use crate::api::{ApiService, Credentials, HttpTransport, Transport};
use crate::error::ApiResult;
use crate::models::Account;
use crate::session::SessionStore;
use log::{info, warn};
use std::sync::Arc;

pub struct Auth<T: Transport = HttpTransport> {
    api: ApiService<T>,
    store: Arc<SessionStore>,
}

impl<T: Transport> Auth<T> {
    pub fn new(api: ApiService<T>, store: Arc<SessionStore>) -> Self {
        Self { api, store }
    }

    pub fn api(&self) -> &ApiService<T> {
        &self.api
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Sign in; the store is left untouched if the backend refuses
    pub fn login(&self, credentials: &Credentials) -> ApiResult<Account> {
        let account = self.api.login(credentials)?;
        info!("signed in as {}", account.username);
        self.store.set(Some(account.clone()));
        Ok(account)
    }

    /// Create an account and sign in as it
    pub fn signup(&self, credentials: &Credentials) -> ApiResult<Account> {
        let account = self.api.signup(credentials)?;
        info!("signed up as {}", account.username);
        self.store.set(Some(account.clone()));
        Ok(account)
    }

    /// Sign out. The local account is cleared even if the backend call fails.
    pub fn logout(&self) -> ApiResult<()> {
        let result = self.api.logout();
        if let Err(e) = &result {
            warn!("logout request failed: {}", e);
        }
        self.store.set(None);
        result
    }

    /// Sync the store with the backend's view of the current session
    pub fn check_session(&self) -> ApiResult<Option<Account>> {
        let account = self.api.check_session()?;
        self.store.set(account.clone());
        Ok(account)
    }
}
