//! Typed REST gateway for the certificate-management backend.
//!
//! One synchronous request per call, no retries, no caching. The bearer token
//! is attached to every request when present; the session store is the only
//! writer of the token slot.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;

mod auth;
mod certificates;
mod errors;
mod settings;
mod types;
mod users;

pub use errors::{GatewayError, GatewayErrorKind};
pub use types::*;

/// HTTP client for the backend API.
///
/// Cheap to clone; clones share the token slot.
#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl Gateway {
    /// Creates a gateway for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Replaces the bearer token attached to subsequent requests.
    ///
    /// Only the session store may call this; surfaces read state through the
    /// store, never through the gateway.
    pub fn set_token(&self, token: Option<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Returns the current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request with the bearer token attached and maps failures into
    /// `GatewayError`, including the 401 session-invalid classification.
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, GatewayError> {
        let builder = match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await.map_err(Self::classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::http_status(status.as_u16(), &body));
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self.send(self.http.get(self.url(path))).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::parse(format!("invalid response from {path}: {e}")))
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, GatewayError> {
        let response = self.send(self.http.get(self.url(path))).await?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| GatewayError::parse(format!("invalid response from {path}: {e}")))
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.http.post(self.url(path)).json(body)).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::parse(format!("invalid response from {path}: {e}")))
    }

    async fn post_unit<B>(&self, path: &str, body: &B) -> Result<(), GatewayError>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.http.post(self.url(path)).json(body)).await?;
        Ok(())
    }

    async fn put_unit<B>(&self, path: &str, body: &B) -> Result<(), GatewayError>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.http.put(self.url(path)).json(body)).await?;
        Ok(())
    }

    async fn delete_unit(&self, path: &str) -> Result<(), GatewayError> {
        self.send(self.http.delete(self.url(path))).await?;
        Ok(())
    }

    /// Classifies a reqwest error into a GatewayError.
    fn classify_reqwest_error(e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::timeout(format!("Request timed out: {}", e))
        } else if e.is_connect() {
            GatewayError::timeout(format!("Connection failed: {}", e))
        } else if e.is_decode() {
            GatewayError::parse(format!("Invalid response body: {}", e))
        } else {
            GatewayError::new(GatewayErrorKind::HttpStatus, format!("Request error: {}", e))
        }
    }
}
