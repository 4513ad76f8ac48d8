//! HTTP client with bearer token injection and JSON request/response handling.
//!
//! Every call goes through [`ApiClient::execute_request`], which joins the
//! relative path onto the base URL, always sends `Content-Type: application/json`
//! and rejects non-2xx responses with the raw status and body.

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use zeroize::Zeroize;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. The caller decides what a given status means.
    #[error("Request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of a rejected response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status(),
            ApiError::Decode(_) => None,
        }
    }
}

/// HTTP client wrapper for the IMIS backend.
///
/// Holds the base URL and the bearer token attached to every request
/// while a session is active.
pub struct ApiClient {
    client: Client,
    base_url: String,
    bearer_token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new API client with the given base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store the bearer token for authenticated requests.
    pub async fn set_bearer_token(&self, token: &str) {
        let mut guard = self.bearer_token.write().await;
        if let Some(ref mut old) = *guard {
            old.zeroize();
        }
        *guard = Some(token.to_string());
    }

    /// Drop the bearer token (used on logout).
    pub async fn remove_bearer_token(&self) {
        let mut guard = self.bearer_token.write().await;
        if let Some(ref mut old) = *guard {
            old.zeroize();
        }
        *guard = None;
    }

    pub async fn has_bearer_token(&self) -> bool {
        self.bearer_token.read().await.is_some()
    }

    /// Send a JSON request to `{base_url}/{path}` and decode the JSON response.
    ///
    /// An empty 2xx body decodes as JSON `null`, so endpoints without a
    /// response body can be called with `T = ()` or `T = Option<_>`.
    pub async fn execute_request<T, B>(
        &self,
        path: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        log::debug!("{} {}", method, url);

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        {
            let token = self.bearer_token.read().await;
            if let Some(ref t) = *token {
                builder = builder.bearer_auth(t);
            }
        }

        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            log::error!("{} {} failed ({}): {}", method, url, status, text);
            return Err(ApiError::Status { status, body: text });
        }

        let payload = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(payload)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute_request::<T, ()>(path, Method::GET, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute_request(path, Method::POST, Some(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute_request(path, Method::PUT, Some(body)).await
    }
}

/// Percent-encode a single path segment carrying user data.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
