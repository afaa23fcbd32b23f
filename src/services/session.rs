use crate::error::{AppError, Result};
use crate::models::SessionCredential;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// How long a stored credential outlives its last login (7 days)
pub const SESSION_TTL_SECONDS: u64 = 60 * 60 * 24 * 7;

const SESSION_PREFIX: &str = "session:";

/// Holds the upstream credential for each session.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, session_id: Uuid) -> Result<Option<SessionCredential>>;
    async fn put(&self, session_id: Uuid, credential: SessionCredential) -> Result<()>;
    async fn remove(&self, session_id: Uuid) -> Result<()>;
}

#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionCredential>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, session_id: Uuid) -> Result<Option<SessionCredential>> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn put(&self, session_id: Uuid, credential: SessionCredential) -> Result<()> {
        self.sessions.write().await.insert(session_id, credential);
        Ok(())
    }

    async fn remove(&self, session_id: Uuid) -> Result<()> {
        self.sessions.write().await.remove(&session_id);
        Ok(())
    }
}

/// Credentials serialized as JSON under `session:<id>` with a TTL.
#[derive(Clone)]
pub struct RedisCredentialStore {
    redis: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisCredentialStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self {
            redis,
            ttl_seconds: SESSION_TTL_SECONDS,
        }
    }

    fn key(session_id: Uuid) -> String {
        format!("{}{}", SESSION_PREFIX, session_id)
    }
}

#[async_trait]
impl CredentialStore for RedisCredentialStore {
    async fn get(&self, session_id: Uuid) -> Result<Option<SessionCredential>> {
        let mut conn = self.redis.clone();
        let raw: Option<String> = redis::cmd("GET")
            .arg(Self::key(session_id))
            .query_async(&mut conn)
            .await?;

        match raw {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(credential) => Ok(Some(credential)),
                Err(e) => {
                    // A corrupt entry is treated as logged out
                    tracing::warn!("Discarding unreadable session {}: {}", session_id, e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn put(&self, session_id: Uuid, credential: SessionCredential) -> Result<()> {
        let value = serde_json::to_string(&credential)
            .map_err(|e| AppError::Session(format!("Failed to encode credential: {}", e)))?;

        let mut conn = self.redis.clone();
        redis::cmd("SET")
            .arg(Self::key(session_id))
            .arg(value)
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn remove(&self, session_id: Uuid) -> Result<()> {
        let mut conn = self.redis.clone();
        redis::cmd("DEL")
            .arg(Self::key(session_id))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}
