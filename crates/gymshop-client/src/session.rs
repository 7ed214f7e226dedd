//! Bearer-token session backed by a [`KeyValueStore`].
//!
//! Tokens and the cached customer live under fixed keys so that a session
//! survives process restarts when the store is file-backed.

use std::sync::Arc;

use gymshop_core::storage::{load_json, save_json};
use gymshop_core::{Customer, KeyValueStore, StorageError};
use serde::Deserialize;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_INFO_KEY: &str = "userInfo";

/// Access/refresh pair returned by login and refresh.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .finish()
    }
}

/// Session lifecycle notifications published by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// Tokens were refreshed. Requests that failed with 401 are not replayed;
    /// consumers reload their state.
    Refreshed,
    /// Refresh failed and the session was wiped. Consumers send the user to
    /// the sign-in flow.
    SessionExpired,
}

#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("tokens", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl Session {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The backing store, shared with other local-state users.
    #[must_use]
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    /// # Errors
    ///
    /// Propagates store failures.
    pub fn access_token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    /// # Errors
    ///
    /// Propagates store failures.
    pub fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    /// # Errors
    ///
    /// Propagates store failures.
    pub fn set_tokens(&self, tokens: &TokenPair) -> Result<(), StorageError> {
        self.store.set(ACCESS_TOKEN_KEY, &tokens.access_token)?;
        self.store.set(REFRESH_TOKEN_KEY, &tokens.refresh_token)
    }

    /// Cached profile of the signed-in customer.
    ///
    /// # Errors
    ///
    /// Propagates store failures and corrupt cached JSON.
    pub fn user_info(&self) -> Result<Option<Customer>, StorageError> {
        load_json(self.store.as_ref(), USER_INFO_KEY)
    }

    /// # Errors
    ///
    /// Propagates store failures.
    pub fn set_user_info(&self, customer: &Customer) -> Result<(), StorageError> {
        save_json(self.store.as_ref(), USER_INFO_KEY, customer)
    }

    /// # Errors
    ///
    /// Propagates store failures and corrupt cached JSON.
    pub fn customer_id(&self) -> Result<Option<i64>, StorageError> {
        Ok(self.user_info()?.map(|c| c.id))
    }

    /// Removes tokens and cached user info.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        self.store.remove(USER_INFO_KEY)
    }
}
