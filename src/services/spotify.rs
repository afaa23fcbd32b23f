use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    AddTracks, ArtistsResponse, CreatedPlaylist, NewPlaylist, PlaylistPage, PlaylistTracksPage,
    SessionCredential, UserProfile,
};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// Scopes requested at login: read private playlists, modify public ones.
pub const SCOPES: &str = "playlist-read-private playlist-modify-public";

/// Upstream limit on ids per `GET /artists` call
pub const MAX_ARTISTS_PER_REQUEST: usize = 50;

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    accounts_url: String,
    api_url: String,
    open_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    client: Client,
}

impl SpotifyClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            accounts_url: config.spotify_accounts_url.clone(),
            api_url: config.spotify_api_url.clone(),
            open_url: config.spotify_open_url.clone(),
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
            redirect_uri: config.spotify_redirect_uri.clone(),
            client,
        })
    }

    pub fn authorization_url(&self) -> Result<String> {
        let base = format!("{}/authorize", self.accounts_url);
        let url = Url::parse_with_params(
            &base,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPES),
            ],
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid accounts URL {}: {}", base, e)))?;

        Ok(url.into())
    }

    pub fn playlist_url(&self, playlist_id: &str) -> String {
        format!("{}/playlist/{}", self.open_url, playlist_id)
    }

    /// Trades an authorization code for a token. Never returns a credential
    /// with an empty access token.
    pub async fn exchange_code(&self, code: &str) -> Result<SessionCredential> {
        let url = format!("{}/api/token", self.accounts_url);

        tracing::debug!("Exchanging authorization code at {}", url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::AuthExchange(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::AuthExchange(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::AuthExchange(format!(
                "Token endpoint returned status: {} - {}",
                status,
                truncate(&body, 200)
            )));
        }

        let credential: SessionCredential = serde_json::from_str(&body).map_err(|e| {
            AppError::AuthExchange(format!("Unexpected token response: {} - {}", e, truncate(&body, 200)))
        })?;

        if credential.access_token.is_empty() {
            return Err(AppError::AuthExchange("Token response carried an empty access token".to_string()));
        }

        Ok(credential)
    }

    pub async fn current_user_playlists(&self, token: &str) -> Result<PlaylistPage> {
        let url = self.endpoint(&["me", "playlists"])?;
        self.send_json(self.client.get(url.clone()).bearer_auth(token), &url).await
    }

    pub async fn playlist_tracks(&self, token: &str, playlist_id: &str) -> Result<PlaylistTracksPage> {
        let url = self.endpoint(&["playlists", playlist_id, "tracks"])?;
        self.send_json(self.client.get(url.clone()).bearer_auth(token), &url).await
    }

    pub async fn current_user(&self, token: &str) -> Result<UserProfile> {
        let url = self.endpoint(&["me"])?;
        self.send_json(self.client.get(url.clone()).bearer_auth(token), &url).await
    }

    pub async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Result<CreatedPlaylist> {
        let url = self.endpoint(&["users", user_id, "playlists"])?;
        let body = NewPlaylist { name, public };
        self.send_json(self.client.post(url.clone()).bearer_auth(token).json(&body), &url)
            .await
    }

    pub async fn add_tracks(&self, token: &str, playlist_id: &str, uris: &[String]) -> Result<()> {
        let url = self.endpoint(&["playlists", playlist_id, "tracks"])?;
        let body = AddTracks { uris };
        self.send(self.client.post(url.clone()).bearer_auth(token).json(&body), &url)
            .await?;
        Ok(())
    }

    /// Looks up at most [`MAX_ARTISTS_PER_REQUEST`] artists in one call.
    pub async fn artists(&self, token: &str, ids: &[&str]) -> Result<ArtistsResponse> {
        let url = self.endpoint(&["artists"])?;
        let joined = ids.join(",");
        self.send_json(
            self.client.get(url.clone()).bearer_auth(token).query(&[("ids", joined.as_str())]),
            &url,
        )
        .await
    }

    /// Appends `segments` to the API base. Each segment is percent-encoded as a
    /// single path segment, so ids can never reach another resource.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(AppError::Validation(format!("Invalid id: {:?}", bad)));
        }

        let mut url = Url::parse(&self.api_url)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid API URL {}: {}", self.api_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("API URL cannot take a path: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<String> {
        tracing::debug!("Spotify request: {}", url);

        let response = request.send().await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::upstream(Some(status.as_u16()), format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::error!("Spotify API error: {} - {}", status, truncate(&body, 500));
            return Err(AppError::upstream(
                Some(status.as_u16()),
                format!("Spotify returned status: {} - {}", status, upstream_message(&body)),
            ));
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, url: &Url) -> Result<T> {
        let body = self.send(request, url).await?;
        serde_json::from_str(&body).map_err(|e| {
            AppError::upstream(
                None,
                format!("Failed to parse response: {} - Response: {}", e, truncate(&body, 200)),
            )
        })
    }
}

/// Pulls `error.message` out of a Web API error object, falling back to the raw body.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| truncate(body, 200).to_string())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
