//! Session-aware client for the satellite monitoring REST API.
//!
//! Every request carries the stored access token as a bearer credential. A
//! 401 triggers at most one token refresh per request; if the refresh fails
//! or the resend is rejected again, both tokens are cleared and the caller
//! gets `ApiError::Unauthorized`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::auth::{SessionMonitor, SessionState, TokenKind, TokenStore};
use crate::config::{Config, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::models::User;

use super::retry::{self, Attempt, RetryError};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Login endpoint, called without a bearer header
const LOGIN_PATH: &str = "/auth/login/";

/// Refresh endpoint, exchanges a refresh token for a new access token
const REFRESH_PATH: &str = "/auth/token/refresh/";

/// Token refreshes allowed per request. A second 401 ends the session.
const MAX_REFRESH_ATTEMPTS: u32 = 1;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(alias = "access_token", alias = "accessToken")]
    access: String,
    #[serde(alias = "refresh_token", alias = "refreshToken")]
    refresh: String,
    user: User,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(alias = "access_token", alias = "accessToken")]
    access: String,
    /// Present when the server rotates refresh tokens
    #[serde(default, alias = "refresh_token", alias = "refreshToken")]
    refresh: Option<String>,
}

// ============================================================================
// Requests
// ============================================================================

/// A request that can be sent more than once.
///
/// The body is serialized up front so a resend after refresh carries exactly
/// the same payload; only the authorization header changes.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body for {}: {}", self.path, e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Context carried from a rejected attempt into the refresh step
#[derive(Debug)]
struct Rejection {
    /// Access token the rejected attempt was sent with
    token: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// API client for the monitoring backend.
/// Clone is cheap - the HTTP pool, token store and refresh lock are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    store: Arc<dyn TokenStore>,
    session: Arc<SessionMonitor>,
    /// Serializes refreshes so concurrent 401s share one round trip
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a new API client with the default request timeout
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, store, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: &str,
        store: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let session = SessionMonitor::new(SessionState::from_store(store.as_ref()));

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            store,
            session: Arc::new(session),
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Create a client from the persisted configuration
    pub fn from_config(config: &Config, store: Arc<dyn TokenStore>) -> anyhow::Result<Self> {
        Self::with_timeout(
            &config.api_base_url(),
            store,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Session =====

    /// Authenticate with email and password.
    ///
    /// Sent without a bearer header. On success both tokens are stored and
    /// the authenticated user is returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(email = email, "Login rejected");
            return Err(ApiError::InvalidCredentials);
        }

        let response = Self::check_response(response).await?;
        let login: LoginResponse = Self::decode(response).await?;

        self.store.set(TokenKind::Access, &login.access);
        self.store.set(TokenKind::Refresh, &login.refresh);
        self.session.started();

        info!(user_id = login.user.id, "Login successful");
        Ok(login.user)
    }

    /// Forget both tokens. Never contacts the server.
    pub fn logout(&self) {
        self.end_session();
        info!("Logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.get(TokenKind::Access).is_some()
    }

    pub fn session_state(&self) -> SessionState {
        SessionState::from_store(self.store.as_ref())
    }

    /// Watch session transitions, e.g. to route back to login when a
    /// refresh fails in the background.
    pub fn subscribe_session(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    fn end_session(&self) {
        self.store.clear();
        self.session.ended();
    }

    // ===== Request pipeline =====

    /// Send a request with bearer authentication and one-shot refresh.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let outcome = retry::with_recovery(
            MAX_REFRESH_ATTEMPTS,
            || self.attempt(request),
            |rejection: Rejection| self.refresh_access_token(rejection.token),
        )
        .await;

        match outcome {
            Ok(response) => Ok(response),
            Err(RetryError::Failed(e)) => Err(e),
            Err(RetryError::Exhausted(_)) => {
                warn!(path = %request.path, "Request rejected with a fresh token, ending session");
                self.end_session();
                Err(ApiError::Unauthorized)
            }
            Err(RetryError::RecoveryFailed(e)) => {
                // The refresh step has already cleared the store
                debug!(path = %request.path, error = %e, "Could not recover from 401");
                Err(ApiError::Unauthorized)
            }
        }
    }

    /// Send a request and decode the JSON body
    pub async fn send<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        Self::decode(response).await
    }

    /// Send a request whose response body is irrelevant (e.g. 204 No Content)
    pub async fn send_empty(&self, request: &ApiRequest) -> Result<(), ApiError> {
        self.execute(request).await?;
        Ok(())
    }

    async fn attempt(&self, request: &ApiRequest) -> Result<Attempt<Response, Rejection>, ApiError> {
        // Read once so the header and the rejection agree on which token was used
        let token = self.store.get(TokenKind::Access);

        let mut builder = self.client.request(request.method.clone(), self.url(&request.path));
        if let Some(ref token) = token {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        debug!(
            method = %request.method,
            path = %request.path,
            authenticated = token.is_some(),
            "Sending request"
        );
        let response = builder.send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(Attempt::Done(response))
        } else if status == StatusCode::UNAUTHORIZED {
            debug!(path = %request.path, "Request rejected with 401");
            Ok(Attempt::Rejected(Rejection { token }))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Obtain a new access token after `rejected` was refused.
    ///
    /// Holds the refresh lock for the whole exchange. If another request
    /// already replaced the rejected token, that token is reused. Any failure
    /// ends the session before the lock is released.
    async fn refresh_access_token(&self, rejected: Option<String>) -> Result<(), ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.store.get(TokenKind::Access);
        if current.is_some() && current != rejected {
            debug!("Access token already refreshed by a concurrent request");
            return Ok(());
        }

        let result = self.request_new_access_token().await;
        if let Err(ref e) = result {
            warn!(error = %e, "Token refresh failed, ending session");
            self.end_session();
        }
        result
    }

    async fn request_new_access_token(&self) -> Result<(), ApiError> {
        let refresh = self
            .store
            .get(TokenKind::Refresh)
            .ok_or(ApiError::Unauthorized)?;

        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let tokens: RefreshResponse = Self::decode(response).await?;

        self.store.set(TokenKind::Access, &tokens.access);
        if let Some(rotated) = tokens.refresh {
            self.store.set(TokenKind::Refresh, &rotated);
        }
        info!("Access token refreshed");
        Ok(())
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let path = response.url().path().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e)))
    }

    // ===== Typed helpers for endpoint modules =====

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(&ApiRequest::get(path)).await
    }

    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        self.send(&ApiRequest::get(path).query(query)).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(&ApiRequest::new(Method::POST, path).json(body)?).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(&ApiRequest::new(Method::PUT, path).json(body)?).await
    }

    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(&ApiRequest::new(Method::PATCH, path).json(body)?).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send_empty(&ApiRequest::delete(path)).await
    }
}
