use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Response;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::session::errors::AuthApiError;
use crate::domain::session::models::Credentials;
use crate::domain::session::models::Registration;
use crate::domain::session::ports::AuthApi;
use crate::domain::token::models::TokenPair;

/// Auth API client over HTTP.
///
/// Endpoints are resolved relative to a base URL such as
/// `http://localhost:8080/api/auth`.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequestBody<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpAuthApi {
    /// Create a client with its own connection pool.
    ///
    /// # Errors
    /// * `Transport` - The HTTP client could not be built
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthApiError::Transport(e.to_string()))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Create a client sharing an existing connection pool.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Underlying HTTP client, for sharing its pool and timeout.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Full URL of an Auth API endpoint.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<TokenPair, AuthApiError> {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, "Calling Auth API");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthApiError::Transport(e.to_string()))?;

        Self::token_pair(response).await
    }

    async fn token_pair(response: Response) -> Result<TokenPair, AuthApiError> {
        let status = response.status();

        if !status.is_success() {
            let bytes = response.bytes().await.unwrap_or_default();
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.message)
                .filter(|message| !message.is_empty());

            tracing::debug!(status = status.as_u16(), ?message, "Auth API rejected request");
            return Err(AuthApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<TokenPair>()
            .await
            .map_err(|e| AuthApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AuthApiError> {
        self.post("login", credentials).await
    }

    async fn register(&self, registration: &Registration) -> Result<TokenPair, AuthApiError> {
        self.post("register", registration).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthApiError> {
        self.post("refresh-token", &RefreshRequestBody { refresh_token })
            .await
    }
}
