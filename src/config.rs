use crate::services::genre::GenrePolicy;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    /// Must point back at this server's `/callback` route
    pub spotify_redirect_uri: String,
    pub spotify_accounts_url: String,
    pub spotify_api_url: String,
    /// Base for browser-openable playlist links
    pub spotify_open_url: String,
    pub session_secret: String,
    pub session_cookie_name: String,
    pub cookie_secure: bool,
    pub frontend_url: String,
    /// When set, session credentials live in Redis instead of process memory
    pub redis_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    /// Allowed CORS origins (comma-separated). Credentials are allowed, so "*" is not accepted.
    pub cors_origins: Vec<String>,
    pub upstream_timeout: Duration,
    pub genre_policy: GenrePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} environment variable must be set", key))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // SESSION_SECRET is required - no insecure defaults
        let session_secret = lookup("SESSION_SECRET").ok_or_else(|| {
            anyhow::anyhow!(
                "SESSION_SECRET environment variable must be set. \
                Generate a secure secret with: openssl rand -base64 32"
            )
        })?;

        // HS256 session cookies need at least 32 bytes of key
        if session_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "SESSION_SECRET must be at least 32 characters long for security. \
                Generate a secure secret with: openssl rand -base64 32"
            ));
        }

        let cors_origins = or_default("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let genre_policy = or_default("GENRE_POLICY", "passthrough")
            .parse::<GenrePolicy>()
            .map_err(|e| anyhow::anyhow!(e))?;

        let upstream_timeout = Duration::from_secs(
            or_default("UPSTREAM_TIMEOUT_SECS", "10")
                .parse()
                .map_err(|_| anyhow::anyhow!("UPSTREAM_TIMEOUT_SECS must be a whole number of seconds"))?,
        );

        Ok(Config {
            spotify_client_id: required("SPOTIFY_CLIENT_ID")?,
            spotify_client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            spotify_redirect_uri: or_default("SPOTIFY_REDIRECT_URI", "http://127.0.0.1:5000/callback"),
            spotify_accounts_url: trim_base(or_default("SPOTIFY_ACCOUNTS_URL", "https://accounts.spotify.com")),
            spotify_api_url: trim_base(or_default("SPOTIFY_API_URL", "https://api.spotify.com/v1")),
            spotify_open_url: trim_base(or_default("SPOTIFY_OPEN_URL", "https://open.spotify.com")),
            session_secret,
            session_cookie_name: or_default("SESSION_COOKIE_NAME", "playlist_session"),
            cookie_secure: or_default("COOKIE_SECURE", "false").eq_ignore_ascii_case("true"),
            frontend_url: or_default("FRONTEND_URL", "http://localhost:3000"),
            redis_url: lookup("REDIS_URL").filter(|v| !v.is_empty()),
            server_host: or_default("SERVER_HOST", "127.0.0.1"),
            server_port: or_default("SERVER_PORT", "5000")
                .parse()
                .unwrap_or(5000),
            cors_origins,
            upstream_timeout,
            genre_policy,
        })
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        spotify_client_id: "client-123".to_string(),
        spotify_client_secret: "secret".to_string(),
        spotify_redirect_uri: "http://127.0.0.1:5000/callback".to_string(),
        spotify_accounts_url: "https://accounts.spotify.com".to_string(),
        spotify_api_url: "https://api.spotify.com/v1".to_string(),
        spotify_open_url: "https://open.spotify.com".to_string(),
        session_secret: "0123456789abcdef0123456789abcdef".to_string(),
        session_cookie_name: "playlist_session".to_string(),
        cookie_secure: false,
        frontend_url: "http://localhost:3000".to_string(),
        redis_url: None,
        server_host: "127.0.0.1".to_string(),
        server_port: 5000,
        cors_origins: vec![],
        upstream_timeout: Duration::from_secs(5),
        genre_policy: GenrePolicy::PassThrough,
    }
}
