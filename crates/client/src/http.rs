//! Thin REST client over `reqwest`.
//!
//! All requests share one connection pool and cookie store so the backend's
//! session cookie follows the user across calls. Non-success responses are
//! turned into [`ApiError`] with the server's `message` preserved for
//! classification.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};

/// Shared HTTP client for the storefront REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner { client, config }),
        })
    }

    /// Configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .inner
            .client
            .request(method, url)
            .header("Accept", "application/json");

        match &self.inner.config.api_token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, builder: RequestBuilder) -> Result<String> {
        let response = builder.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_response(status, &body);
            if err.is_unauthorized() {
                tracing::debug!(status = %status, "API request rejected as unauthorized");
            } else {
                tracing::warn!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "API returned non-success status"
                );
            }
            return Err(err);
        }

        Ok(body)
    }

    fn parse<T: DeserializeOwned>(body: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// `GET` an API path and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not a success, or
    /// the body does not decode as `T`.
    #[instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.inner.config.endpoint(path)?;
        let body = self.execute(self.request(Method::GET, url)).await?;
        Self::parse(&body)
    }

    /// `GET` an API path that returns a list, either bare or wrapped as `{ "items": [...] }`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get_json`].
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let list: ListBody<T> = self.get_json(path).await?;
        Ok(list.into_vec())
    }

    /// `GET` an absolute URL as text (used for static assets).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not a success.
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn get_text(&self, url: &Url) -> Result<String> {
        self.execute(self.inner.client.get(url.clone())).await
    }

    /// Send a mutation with an optional JSON body, discarding the response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not a success.
    #[instrument(skip(self, method, body), fields(method = %method))]
    pub async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<()> {
        let url = self.inner.config.endpoint(path)?;
        let builder = self.request(method, url);
        let builder = match body {
            Some(body) => builder.json(body),
            None => builder,
        };
        self.execute(builder).await.map(|_| ())
    }

    /// Send a mutation without a body.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::send`].
    pub async fn send_empty(&self, method: Method, path: &str) -> Result<()> {
        self.send::<()>(method, path, None).await
    }
}

/// List responses: a bare array or an object wrapping it.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Wrapped { items: Vec<T> },
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { items } => items,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_list_body_accepts_both_shapes() {
        let bare: ListBody<u32> = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(bare.into_vec(), vec![1, 2]);

        let wrapped: ListBody<u32> = serde_json::from_str(r#"{"items": [3]}"#).unwrap();
        assert_eq!(wrapped.into_vec(), vec![3]);
    }

    #[test]
    fn test_client_builds_from_config() {
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        let client = ApiClient::new(config).unwrap();
        assert_eq!(client.config().login_path, "/login");
    }
}
