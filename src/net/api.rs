//! REST API client for the preparedness backend.
//!
//! DESIGN
//! ======
//! One `reqwest::Client` is built from config and shared by every clone of
//! [`ApiClient`]. A bearer token is attached per clone via
//! [`ApiClient::with_bearer`], so callers pass the session explicitly instead
//! of the client reading ambient session state.
//!
//! ERROR HANDLING
//! ==============
//! Status handling is centralized in `classify_status`: 401 becomes
//! [`ApiError::Unauthorized`], 404 becomes [`ApiError::NotFound`], anything
//! else non-2xx is [`ApiError::Status`]. Endpoints with "absent" semantics
//! (current household) turn `NotFound` into `Ok(None)`.

use std::fmt;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};

use super::types::{
    CreateHouseholdRequest, ErrorBody, Household, LoginRequest, RegisterRequest, TokenResponse,
};
use crate::config::{ApiTimeouts, ClientConfig};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend rejected the bearer token (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Any other non-success status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("API request failed: {0}")]
    Request(String),

    /// The response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

// =============================================================================
// HOUSEHOLD LOOKUP TRAIT
// =============================================================================

/// Async seam the navigation guard uses to resolve household membership.
/// Enables mocking in tests.
#[async_trait::async_trait]
pub trait HouseholdLookup: Send + Sync {
    /// Fetch the household of the user identified by `token`.
    ///
    /// Returns `Ok(None)` when the user belongs to no household.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the token is rejected, and any
    /// other [`ApiError`] for transport or backend failures.
    async fn current_household(&self, token: &str) -> Result<Option<Household>, ApiError>;
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client for `base_url` (e.g. `http://localhost:8080/api`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>, timeouts: ApiTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url, bearer: None })
    }

    /// Build a client from parsed config.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(config.api_base_url.clone(), config.timeouts)
    }

    /// A clone of this client that authenticates as `token`.
    #[must_use]
    pub fn with_bearer(&self, token: impl Into<String>) -> Self {
        Self { http: self.http.clone(), base_url: self.base_url.clone(), bearer: Some(token.into()) }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = endpoint(&self.base_url, path);
        let builder = self.http.request(method, url);
        match &self.bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await.map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;
        if (200..300).contains(&status) {
            Ok(text)
        } else {
            Err(classify_status(status, text))
        }
    }

    /// Fetch the current user's household via `GET /households/current`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] on 401 and other [`ApiError`]s for
    /// non-404 failures. A 404 is `Ok(None)`.
    pub async fn get_current_household(&self) -> Result<Option<Household>, ApiError> {
        match self.send(self.request(Method::GET, "/households/current")).await {
            Ok(body) => parse_json::<Household>(&body).map(Some),
            Err(ApiError::NotFound { message }) => {
                tracing::debug!(%message, "no household for current user");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Exchange credentials for a session token via `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the credentials are rejected or the request fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let body = LoginRequest { email: email.to_owned(), password: password.to_owned() };
        let text = self.send(self.request(Method::POST, "/auth/login").json(&body)).await?;
        Ok(parse_json::<TokenResponse>(&text)?.token)
    }

    /// Create an account via `POST /auth/register`, returning its session token.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if registration is rejected or the request fails.
    pub async fn register(&self, body: &RegisterRequest) -> Result<String, ApiError> {
        let text = self.send(self.request(Method::POST, "/auth/register").json(body)).await?;
        Ok(parse_json::<TokenResponse>(&text)?.token)
    }

    /// Create a household owned by the current user via `POST /households`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the backend rejects the request.
    pub async fn create_household(&self, body: &CreateHouseholdRequest) -> Result<Household, ApiError> {
        let text = self.send(self.request(Method::POST, "/households").json(body)).await?;
        parse_json(&text)
    }

    /// Leave the current household via `POST /households/leave`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the backend rejects the request.
    pub async fn leave_household(&self) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, "/households/leave")).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl HouseholdLookup for ApiClient {
    async fn current_household(&self, token: &str) -> Result<Option<Household>, ApiError> {
        self.with_bearer(token).get_current_household().await
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Map a non-success status and its body to an [`ApiError`].
fn classify_status(status: u16, body: String) -> ApiError {
    match status {
        401 => ApiError::Unauthorized,
        404 => {
            let message = serde_json::from_str::<ErrorBody>(&body).map_or(body, |e| e.message);
            ApiError::NotFound { message }
        }
        _ => ApiError::Status { status, body },
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
