//! Shared HTTP plumbing for the studio backend

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::error::ApiError;
use crate::config::ApiConfig;

/// HTTP client bound to one backend base URL
///
/// Implements every service trait in [`crate::api`]; cheap to clone.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for `base_url` (trailing slashes are ignored)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Unknown(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/projects/42`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        Self::decode(Self::check(response).await?).await
    }

    /// GET that maps a 404 to `None`
    pub(crate) async fn get_optional<R: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<R>, ApiError> {
        match self.get_json(path).await {
            Ok(value) => Ok(Some(value)),
            Err(ApiError::NotFound(detail)) => {
                debug!(path, %detail, "resource absent");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn post_json<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self.client.post(&url).json(body).send().await?;
        Self::decode(Self::check(response).await?).await
    }

    /// POST without a request body
    pub(crate) async fn post_empty<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self.client.post(&url).send().await?;
        Self::decode(Self::check(response).await?).await
    }

    /// GET returning the raw response body (binary downloads)
    pub(crate) async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET (binary)");
        let response = self.client.get(&url).send().await?;
        let bytes = Self::check(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// POST returning the raw response body (binary downloads)
    pub(crate) async fn post_bytes<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.url(path);
        debug!(%url, "POST (binary)");
        let response = self.client.post(&url).json(body).send().await?;
        let bytes = Self::check(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), %body, "backend returned error");
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    async fn decode<R: DeserializeOwned>(response: Response) -> Result<R, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::Unknown(format!("invalid response body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = BackendClient::new("http://localhost:8000/api/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api/v1");
        assert_eq!(client.url("/projects/42"), "http://localhost:8000/api/v1/projects/42");
        assert_eq!(client.url("projects/"), "http://localhost:8000/api/v1/projects/");
    }

    #[test]
    fn test_from_config() {
        let config = ApiConfig {
            base_url: "http://studio.test/api/v1".to_string(),
            timeout_secs: 1,
        };
        let client = BackendClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://studio.test/api/v1");
    }
}
