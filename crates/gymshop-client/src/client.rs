//! HTTP client for the storefront REST API.
//!
//! Wraps `reqwest` with bearer-token injection, token-expiry detection and
//! typed envelope decoding. The client is constructed explicitly and shared
//! by `Arc`; it owns its session and the single-flight refresh state.

use std::sync::atomic::AtomicBool;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use gymshop_core::{AppConfig, Envelope};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::ApiError;
use crate::session::{AuthEvent, Session};

const DEFAULT_REFRESH_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Collapses concurrent and back-to-back refresh attempts into one.
#[derive(Debug)]
pub(crate) struct RefreshGate {
    pub(crate) in_flight: AtomicBool,
    pub(crate) last_refresh: Mutex<Option<Instant>>,
    pub(crate) debounce: Duration,
}

/// Client for the storefront REST API.
///
/// Use [`StorefrontClient::new`] with an explicit base URL (tests point it at
/// a mock server) or [`StorefrontClient::from_config`].
pub struct StorefrontClient {
    pub(crate) http: Client,
    pub(crate) base_url: Url,
    pub(crate) session: Session,
    pub(crate) refresh: RefreshGate,
    pub(crate) events: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl StorefrontClient {
    /// Creates a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        session: Session,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so relative joins append to the path.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let (events, _) = broadcast::channel(16);

        Ok(Self {
            http,
            base_url: parsed,
            session,
            refresh: RefreshGate {
                in_flight: AtomicBool::new(false),
                last_refresh: Mutex::new(None),
                debounce: DEFAULT_REFRESH_DEBOUNCE,
            },
            events,
        })
    }

    /// Creates a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// See [`StorefrontClient::new`].
    pub fn from_config(config: &AppConfig, session: Session) -> Result<Self, ApiError> {
        Ok(Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
            session,
        )?
        .with_refresh_debounce(config.refresh_debounce()))
    }

    /// Window after a refresh in which further 401s do not trigger another.
    #[must_use]
    pub fn with_refresh_debounce(mut self, debounce: Duration) -> Self {
        self.refresh.debounce = debounce;
        self
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Subscribes to refresh / expiry notifications.
    #[must_use]
    pub fn subscribe_auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Id of the signed-in customer from the cached user info.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotSignedIn`] when no customer is cached.
    pub fn require_customer_id(&self) -> Result<i64, ApiError> {
        self.session.customer_id()?.ok_or(ApiError::NotSignedIn)
    }

    /// Joins `path` onto the base URL and appends query pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if the join fails.
    pub(crate) fn build_url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let value = self.send(Method::GET, path, query, None).await?;
        decode(value, path)
    }

    /// Sends `body` as JSON and decodes the response's `body` field.
    pub(crate) async fn send_body<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|source| ApiError::Deserialize {
            context: format!("request body for {path}"),
            source,
        })?;
        let value = self.send(method, path, &[], Some(body)).await?;
        let envelope: Envelope<T> = decode(value, path)?;
        Ok(envelope.body)
    }

    /// Sends a request and ignores the response body.
    pub(crate) async fn send_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|source| ApiError::Deserialize {
                context: format!("request body for {path}"),
                source,
            })?;
        self.send(method, path, &[], body).await.map(|_| ())
    }

    /// Dispatches one request.
    ///
    /// A 401 status, or a 2xx body carrying `"statusCode": 401`, triggers the
    /// single-flight refresh and returns [`ApiError::Unauthorized`]; the
    /// request itself is not retried.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = self.build_url(path, query)?;
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(token) = self.session.access_token()? {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, "storefront request");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let lenient: Option<Value> = serde_json::from_str(&text).ok();

        if status == StatusCode::UNAUTHORIZED || lenient.as_ref().is_some_and(embedded_unauthorized)
        {
            tracing::warn!(%method, path, %status, "access token rejected");
            self.handle_expired_token().await;
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let message = lenient
                .as_ref()
                .and_then(|v| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_owned());
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| ApiError::Deserialize {
            context: url.to_string(),
            source,
        })
    }
}

/// Some endpoints report expiry inside a 2xx body instead of via the status.
pub(crate) fn embedded_unauthorized(body: &Value) -> bool {
    body.get("statusCode").and_then(Value::as_u64) == Some(401)
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value, context: &str) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|source| ApiError::Deserialize {
        context: context.to_owned(),
        source,
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
