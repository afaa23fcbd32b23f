use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::SessionCredential;
use crate::services::session::{CredentialStore, SESSION_TTL_SECONDS};
use crate::services::SpotifyClient;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Payload of the signed session cookie.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sid: Uuid,
    pub exp: i64,
}

pub struct AuthService {
    spotify: Arc<SpotifyClient>,
    store: Arc<dyn CredentialStore>,
    session_secret: String,
    cookie_name: String,
    cookie_secure: bool,
    authorization_url: String,
}

impl AuthService {
    pub fn new(
        spotify: Arc<SpotifyClient>,
        store: Arc<dyn CredentialStore>,
        config: &Config,
    ) -> Result<Self> {
        // Built once; the URL only depends on configuration
        let authorization_url = spotify.authorization_url()?;

        Ok(Self {
            spotify,
            store,
            session_secret: config.session_secret.clone(),
            cookie_name: config.session_cookie_name.clone(),
            cookie_secure: config.cookie_secure,
            authorization_url,
        })
    }

    pub fn build_authorization_url(&self) -> String {
        self.authorization_url.clone()
    }

    /// Exchanges `code` and stores the resulting credential under `session_id`.
    /// Nothing is stored when the exchange fails.
    pub async fn exchange_code_for_token(
        &self,
        session_id: Uuid,
        code: &str,
    ) -> Result<SessionCredential> {
        let credential = self.spotify.exchange_code(code).await?;

        self.store.put(session_id, credential.clone()).await?;
        tracing::info!("Stored credential for session {}", session_id);

        Ok(credential)
    }

    pub async fn is_authenticated(&self, session_id: Option<Uuid>) -> Result<bool> {
        match session_id {
            Some(id) => Ok(self.store.get(id).await?.is_some()),
            None => Ok(false),
        }
    }

    pub async fn logout(&self, session_id: Uuid) -> Result<()> {
        self.store.remove(session_id).await?;
        tracing::info!("Session {} logged out", session_id);
        Ok(())
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn sign_session(&self, session_id: Uuid) -> Result<String> {
        let claims = SessionClaims {
            sid: session_id,
            exp: (Utc::now() + Duration::seconds(SESSION_TTL_SECONDS as i64)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.session_secret.as_bytes()),
        )
        .map_err(|e| AppError::Session(format!("Session signing failed: {}", e)))
    }

    /// Returns the session id carried by a cookie value, or `None` when the
    /// signature or expiry does not check out.
    pub fn verify_session(&self, token: &str) -> Option<Uuid> {
        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.session_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims.sid)
        .ok()
    }

    pub fn session_cookie(&self, session_id: Uuid) -> Result<String> {
        let value = self.sign_session(session_id)?;
        Ok(self.cookie_header(&value, SESSION_TTL_SECONDS))
    }

    pub fn expired_cookie(&self) -> String {
        self.cookie_header("", 0)
    }

    fn cookie_header(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name, value, max_age
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}
