use std::sync::Arc;

use reqwest::header::HeaderValue;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use reqwest::Request;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::StatusCode;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::session::ports::SessionPort;

/// Errors surfaced by request mediation
#[derive(Debug, Error)]
pub enum MediatorError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Access token is not a valid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Which requests receive the bearer token.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MediatorSettings {
    /// Origins (`http://host:port`) or `host:port` pairs that receive the
    /// token. Empty means every origin.
    pub protected_origins: Vec<String>,
    /// Path suffixes that never carry a token.
    pub exempt_paths: Vec<String>,
}

impl Default for MediatorSettings {
    fn default() -> Self {
        Self {
            protected_origins: Vec::new(),
            exempt_paths: vec!["/login".to_string(), "/register".to_string()],
        }
    }
}

/// Sends requests to protected collaborators on behalf of the session.
///
/// Attaches the access token, and on `401 Unauthorized` refreshes the
/// session once and replays the request once. A second 401, or a failed
/// refresh, is handed back to the caller as received.
pub struct RequestMediator<S>
where
    S: SessionPort,
{
    client: Client,
    session: Arc<S>,
    settings: MediatorSettings,
}

impl<S> RequestMediator<S>
where
    S: SessionPort,
{
    pub fn new(client: Client, session: Arc<S>, settings: MediatorSettings) -> Self {
        Self {
            client,
            session,
            settings,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Build and execute a request.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, MediatorError> {
        self.execute(builder.build()?).await
    }

    /// Execute a request with bearer attachment and one refresh-and-retry.
    ///
    /// # Errors
    /// * `Transport` - Request could not be sent
    /// * `InvalidHeader` - Access token cannot be placed in a header
    pub async fn execute(&self, mut request: Request) -> Result<Response, MediatorError> {
        if self.is_exempt(request.url()) {
            request.headers_mut().remove(AUTHORIZATION);
            return Ok(self.client.execute(request).await?);
        }

        if !self.is_protected(request.url()) {
            return Ok(self.client.execute(request).await?);
        }

        let replay = request.try_clone();
        self.authorize(&mut request)?;

        let response = self.client.execute(request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(mut replay) = replay else {
            tracing::debug!(
                url = %response.url(),
                "Streaming request cannot be replayed after 401"
            );
            return Ok(response);
        };

        match self.session.refresh().await {
            Ok(identity) => {
                tracing::info!(
                    url = %replay.url(),
                    username = %identity.username(),
                    "Session refreshed after 401, replaying request"
                );
            }
            Err(e) => {
                tracing::warn!(url = %response.url(), error = %e, "Refresh after 401 failed");
                return Ok(response);
            }
        }

        self.authorize(&mut replay)?;
        Ok(self.client.execute(replay).await?)
    }

    fn authorize(&self, request: &mut Request) -> Result<(), MediatorError> {
        let headers = request.headers_mut();
        match self.session.access_token() {
            Some(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            None => {
                headers.remove(AUTHORIZATION);
            }
        }
        Ok(())
    }

    /// Login and registration never carry a token, not even one the caller set.
    pub fn is_exempt(&self, url: &Url) -> bool {
        let path = url.path().trim_end_matches('/');

        self.settings
            .exempt_paths
            .iter()
            .map(|exempt| exempt.trim_end_matches('/'))
            .any(|exempt| !exempt.is_empty() && path.ends_with(exempt))
    }

    /// Whether the URL belongs to a collaborator that receives the token.
    pub fn is_protected(&self, url: &Url) -> bool {
        if self.settings.protected_origins.is_empty() {
            return true;
        }

        let origin = url.origin().ascii_serialization();
        let authority = match (url.host_str(), url.port_or_known_default()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => String::new(),
        };

        self.settings
            .protected_origins
            .iter()
            .map(|allowed| allowed.trim_end_matches('/'))
            .any(|allowed| allowed == origin || allowed == authority)
    }
}
