//! HTTP client for the backend wire contract

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Thin JSON wrapper around `reqwest` for backend calls.
///
/// Response handling is centralized: 401 maps to
/// [`ClientError::Unauthorized`] (the session layer decides whether that
/// means teardown), every other non-success status maps to
/// [`ClientError::Backend`] carrying the status code.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        if config.base_url.is_empty() {
            return Err(ClientError::Config("base_url must not be empty".to_string()));
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Make a GET request, attaching the bearer token when given
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> ClientResult<T> {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with a JSON body, attaching the bearer token
    /// when given
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> ClientResult<T> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request without a body, discarding any response body
    pub async fn post_empty(&self, path: &str, token: Option<&str>) -> ClientResult<()> {
        let mut request = self.client.post(self.url(path));
        if let Some(token) = token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }
        Ok(())
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }

        response.json().await.map_err(Into::into)
    }

    async fn status_error(status: StatusCode, response: reqwest::Response) -> ClientError {
        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            _ => ClientError::Backend {
                status: status.as_u16(),
                message,
            },
        }
    }
}
