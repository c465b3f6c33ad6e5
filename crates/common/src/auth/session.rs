//! Admin session storage
//!
//! Sessions are keyed by the SHA-256 of the opaque token handed to the
//! browser, so a leaked store never reveals usable cookies. Two backends:
//! - In-process map (single instance, lost on restart)
//! - Redis with per-key TTL

use crate::errors::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Server-side state bound to a logged-in admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub admin_id: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// New session for `admin_id` that lives for `ttl`
    pub fn new(admin_id: i32, ttl: std::time::Duration) -> Self {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::days(7));
        Self {
            admin_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Backend holding sessions by hashed token
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, key: &str, session: &Session) -> Result<()>;

    /// Returns `None` for unknown or expired keys
    async fn get(&self, key: &str) -> Result<Option<Session>>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-process session map
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, key: &str, session: &Session) -> Result<()> {
        let purged = self.purge_expired().await;
        if purged > 0 {
            debug!(purged, "Expired sessions purged");
        }

        self.sessions
            .write()
            .await
            .insert(key.to_string(), session.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Session>> {
        let found = self.sessions.read().await.get(key).cloned();

        match found {
            Some(session) if session.is_expired() => {
                self.sessions.write().await.remove(key);
                debug!("Expired session evicted");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.sessions.write().await.remove(key);
        Ok(())
    }
}

/// Redis-backed session store
pub struct RedisSessionStore {
    connection: MultiplexedConnection,
    key_prefix: String,
}

impl RedisSessionStore {
    /// Connect to Redis
    pub async fn new(url: &str, key_prefix: &str) -> Result<Self> {
        let client = Client::open(url).map_err(|e| AppError::SessionStore {
            message: format!("Failed to create Redis client: {}", e),
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::SessionStore {
                message: format!("Failed to connect to Redis: {}", e),
            })?;

        Ok(Self {
            connection,
            key_prefix: key_prefix.to_string(),
        })
    }

    /// Build a prefixed key
    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn insert(&self, key: &str, session: &Session) -> Result<()> {
        let full_key = self.key(key);
        let json = serde_json::to_string(session)?;
        let ttl_secs = (session.expires_at - Utc::now()).num_seconds().max(1) as u64;

        let mut conn = self.connection.clone();
        let _: () = conn.set_ex(&full_key, json, ttl_secs).await?;

        debug!(ttl_secs, "Session stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Session>> {
        let full_key = self.key(key);
        let mut conn = self.connection.clone();

        let value: Option<String> = conn.get(&full_key).await?;

        match value {
            Some(json) => {
                let session: Session = serde_json::from_str(&json)?;
                Ok((!session.is_expired()).then_some(session))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let full_key = self.key(key);
        let mut conn = self.connection.clone();

        let _: i64 = conn.del(&full_key).await?;
        Ok(())
    }
}
