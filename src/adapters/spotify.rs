use crate::domain::ports::PlaylistSource;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;

pub const DEFAULT_ACCOUNTS_ENDPOINT: &str = "https://accounts.spotify.com";
pub const DEFAULT_API_ENDPOINT: &str = "https://api.spotify.com";

#[derive(Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client-credentials access to the Web API. A token is requested per fetch;
/// every invocation is short-lived so nothing is cached.
pub struct SpotifyClient {
    client: Client,
    credentials: SpotifyCredentials,
    accounts_endpoint: String,
    api_endpoint: String,
}

impl SpotifyClient {
    pub fn new(credentials: SpotifyCredentials) -> Self {
        Self::with_endpoints(credentials, DEFAULT_ACCOUNTS_ENDPOINT, DEFAULT_API_ENDPOINT)
    }

    pub fn with_endpoints(
        credentials: SpotifyCredentials,
        accounts_endpoint: &str,
        api_endpoint: &str,
    ) -> Self {
        Self {
            client: Client::new(),
            credentials,
            accounts_endpoint: accounts_endpoint.trim_end_matches('/').to_string(),
            api_endpoint: api_endpoint.trim_end_matches('/').to_string(),
        }
    }

    async fn access_token(&self) -> Result<String> {
        let url = format!("{}/api/token", self.accounts_endpoint);
        tracing::debug!("Requesting client-credentials token from {}", url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let token: TokenResponse = ensure_success(response).await?.json().await?;
        Ok(token.access_token)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    tracing::debug!("API response status: {}", status);
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(EtlError::UpstreamFetchError {
        status: status.as_u16(),
        message: if message.is_empty() {
            status.canonical_reason().unwrap_or("unknown").to_string()
        } else {
            message
        },
    })
}

#[async_trait]
impl PlaylistSource for SpotifyClient {
    async fn fetch_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<u8>> {
        let token = self.access_token().await?;

        // 只取第一頁，不跟隨 `next`
        let url = format!("{}/v1/playlists/{}/tracks", self.api_endpoint, playlist_id);
        tracing::debug!("Making API request to: {}", url);

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let body = ensure_success(response).await?.bytes().await?;
        Ok(body.to_vec())
    }
}
