//! Sign-in, sign-out and the single-flight token refresh.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::PoisonError;
use std::time::Instant;

use gymshop_core::{Customer, Envelope};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{decode, embedded_unauthorized, StorefrontClient};
use crate::error::ApiError;
use crate::session::{AuthEvent, TokenPair};

const LOGIN_PATH: &str = "api/storefront-auth/login";
const REGISTER_PATH: &str = "api/storefront-auth/register";
const LOGOUT_PATH: &str = "api/storefront-auth/logout";
const REFRESH_PATH: &str = "api/storefront-auth/refresh-token";

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    #[serde(flatten)]
    tokens: TokenPair,
    #[serde(alias = "user")]
    customer: Customer,
}

/// Clears the in-flight flag even if the refresh future is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl StorefrontClient {
    /// Signs in and stores tokens plus the customer profile in the session.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Status`] for rejected credentials.
    /// - [`ApiError::Http`] on network failure.
    /// - [`ApiError::Storage`] if the session cannot be persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<Customer, ApiError> {
        let body: LoginBody = self
            .send_body(Method::POST, LOGIN_PATH, &Credentials { email, password })
            .await?;
        self.session.set_tokens(&body.tokens)?;
        self.session.set_user_info(&body.customer)?;
        tracing::info!(customer_id = body.customer.id, "signed in");
        Ok(body.customer)
    }

    /// Creates an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] on validation failure (e.g. email taken).
    pub async fn register(&self, registration: &Registration) -> Result<Customer, ApiError> {
        self.send_body(Method::POST, REGISTER_PATH, registration).await
    }

    /// Notifies the API and wipes the local session regardless of the outcome.
    ///
    /// # Errors
    ///
    /// [`ApiError::Storage`] if the local session cannot be cleared.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Err(e) = self.send_unit::<Value>(Method::POST, LOGOUT_PATH, None).await {
            tracing::warn!(error = %e, "logout call failed; clearing local session anyway");
        }
        self.session.clear()?;
        Ok(())
    }

    /// Exchanges the refresh token for a new pair.
    ///
    /// On success the new tokens are stored and [`AuthEvent::Refreshed`] is
    /// published. On any failure the session is wiped and
    /// [`AuthEvent::SessionExpired`] is published.
    ///
    /// # Errors
    ///
    /// [`ApiError::SessionExpired`] when the refresh token is missing or
    /// rejected.
    pub async fn refresh_session(&self) -> Result<(), ApiError> {
        let Some(refresh_token) = self.session.refresh_token()? else {
            self.expire_session();
            return Err(ApiError::SessionExpired);
        };

        match self.request_refresh(&refresh_token).await {
            Ok(tokens) => {
                self.session.set_tokens(&tokens)?;
                tracing::info!("access token refreshed");
                let _ = self.events.send(AuthEvent::Refreshed);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed; wiping session");
                self.expire_session();
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Entry point from the request path after a 401.
    ///
    /// Only one refresh runs at a time, and a 401 arriving within the
    /// debounce window after a completed refresh is ignored. Without a
    /// refresh token there is nothing to refresh.
    pub(crate) async fn handle_expired_token(&self) {
        match self.session.refresh_token() {
            Ok(Some(_)) => {}
            Ok(None) => {
                if matches!(self.session.access_token(), Ok(Some(_))) {
                    tracing::warn!("access token rejected and no refresh token held; wiping session");
                    self.expire_session();
                }
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read refresh token");
                return;
            }
        }

        if self.refresh.in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!("refresh already in flight; collapsing");
            return;
        }
        let _guard = InFlightGuard(&self.refresh.in_flight);

        let recently = self
            .refresh
            .last_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|at| at.elapsed() < self.refresh.debounce);
        if recently {
            tracing::debug!("refresh completed moments ago; skipping");
            return;
        }

        let _ = self.refresh_session().await;
        *self
            .refresh
            .last_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }

    /// Raw refresh call. Bypasses [`StorefrontClient::send`] so a rejected
    /// refresh cannot recurse into another refresh.
    async fn request_refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let url = self.build_url(REFRESH_PATH, &[])?;
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: text,
            });
        }
        let value: Value = serde_json::from_str(&text).map_err(|source| ApiError::Deserialize {
            context: REFRESH_PATH.to_owned(),
            source,
        })?;
        if embedded_unauthorized(&value) {
            return Err(ApiError::Unauthorized);
        }
        let envelope: Envelope<TokenPair> = decode(value, REFRESH_PATH)?;
        Ok(envelope.body)
    }

    fn expire_session(&self) {
        if let Err(e) = self.session.clear() {
            tracing::warn!(error = %e, "failed to clear session");
        }
        let _ = self.events.send(AuthEvent::SessionExpired);
    }
}
