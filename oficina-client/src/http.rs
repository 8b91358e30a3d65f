//! HTTP client for network-based API calls

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::response::ApiErrorBody;

use crate::{ClientConfig, ClientError, ClientResult};

/// HTTP client for the service-order API
///
/// Cheap to clone; clones share the token slot so a login performed through
/// one handle authenticates every other handle.
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl NetworkHttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(config.token.clone())),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the current token
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Replace the current token (`None` signs the client out)
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.client.request(method, self.url(path));
        if let Some(token) = self.token.read().as_deref() {
            req = req.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token));
        }
        req
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.request(Method::GET, path).send().await?;
        Self::handle_response(response).await
    }

    /// Make a GET request with query-string pairs
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a PATCH request with JSON body
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.request(Method::PATCH, path).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request, ignoring any response body
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    /// Make a POST request without body, ignoring any response body
    pub async fn post_empty(&self, path: &str) -> ClientResult<()> {
        let response = self.request(Method::POST, path).send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    /// Map non-2xx responses to [`ClientError`]
    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await?;
        // The API answers errors with {message, errors}; plain text is tolerated
        let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_else(|_| ApiErrorBody {
            message: text.clone(),
            ..Default::default()
        });

        tracing::debug!(status = %status, message = %body.message, "API request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(body.message),
            StatusCode::NOT_FOUND => ClientError::NotFound(body.message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation {
                message: body.message,
                errors: body.errors,
            },
            StatusCode::CONFLICT => ClientError::Conflict(body.message),
            _ => ClientError::Internal(format!("{}: {}", status, body.message)),
        })
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(error = %e, "Failed to decode API response");
            ClientError::InvalidResponse(e.to_string())
        })
    }
}
