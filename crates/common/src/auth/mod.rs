//! Authentication and authorization utilities
//!
//! Provides:
//! - Argon2 password hashing for admin accounts
//! - Opaque session tokens carried in a cookie
//! - `CurrentSession` / `AdminSession` extractors (the admin gate)

mod session;

pub use session::{MemorySessionStore, RedisSessionStore, Session, SessionStore};

use crate::config::{SessionBackend, SessionConfig};
use crate::errors::{AppError, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::COOKIE, request::Parts, HeaderMap},
};
use sha2::{Digest, Sha256};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info};

/// Hash a password for storage (PHC string format)
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal {
            message: format!("Failed to hash password: {}", e),
        })
}

/// Check a password against a stored hash; malformed hashes never match
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("yomitomo-unknown-admin").unwrap_or_default());

/// Spend the same argon2 work as a real check; never matches.
///
/// Used for usernames that do not exist, so both login failures take
/// equally long.
pub fn verify_dummy_password(password: &str) -> bool {
    verify_password(password, &DUMMY_HASH);
    false
}

/// Generate a new session token
pub fn generate_session_token() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}

/// Hash a session token into its store key
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract a cookie value from request headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Issues, resolves and revokes admin sessions
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    cookie_name: String,
    cookie_secure: bool,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, config: &SessionConfig) -> Self {
        Self {
            store,
            cookie_name: config.cookie_name.clone(),
            cookie_secure: config.cookie_secure,
            ttl: Duration::from_secs(config.ttl_secs),
        }
    }

    /// Build the configured backend
    pub async fn from_config(config: &SessionConfig) -> Result<Self> {
        let store: Arc<dyn SessionStore> = match config.backend {
            SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
            SessionBackend::Redis => {
                let url = config
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| AppError::Configuration {
                        message: "session.redis_url is required for the redis backend".to_string(),
                    })?;
                Arc::new(RedisSessionStore::new(url, &config.key_prefix).await?)
            }
        };

        info!(backend = ?config.backend, "Session store ready");
        Ok(Self::new(store, config))
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Bind a fresh session to `admin_id` and return its token
    pub async fn start(&self, admin_id: i32) -> Result<String> {
        let token = generate_session_token();
        let session = Session::new(admin_id, self.ttl);

        self.store
            .insert(&hash_session_token(&token), &session)
            .await?;

        debug!(admin_id, "Session started");
        Ok(token)
    }

    /// Look up the session a token refers to
    pub async fn resolve(&self, token: &str) -> Result<Option<Session>> {
        self.store.get(&hash_session_token(token)).await
    }

    /// Destroy the session a token refers to, if any
    pub async fn end(&self, token: &str) -> Result<()> {
        self.store.remove(&hash_session_token(token)).await
    }

    /// `Set-Cookie` value carrying a session token
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
            self.cookie_name,
            token,
            self.ttl.as_secs(),
            if self.cookie_secure { "; Secure" } else { "" }
        )
    }

    /// `Set-Cookie` value that removes the session cookie
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
            self.cookie_name,
            if self.cookie_secure { "; Secure" } else { "" }
        )
    }
}

/// Session state of the current request, admin-bound or not
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    /// Token presented by the client, even if it no longer resolves
    pub token: Option<String>,

    /// Admin the session is bound to
    pub admin_id: Option<i32>,
}

impl CurrentSession {
    pub fn is_admin(&self) -> bool {
        self.admin_id.is_some()
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    SessionManager: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let sessions = SessionManager::from_ref(state);

        let Some(token) = extract_cookie(&parts.headers, sessions.cookie_name()) else {
            return Ok(CurrentSession::default());
        };

        let admin_id = sessions.resolve(&token).await?.map(|s| s.admin_id);

        Ok(CurrentSession {
            token: Some(token),
            admin_id,
        })
    }
}

/// Proof that the request carries an admin session.
///
/// Using this extractor on a handler is the admin gate: without a bound
/// session the request is rejected with `401` before the handler runs.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub admin_id: i32,
    pub token: String,
}

impl<S> FromRequestParts<S> for AdminSession
where
    SessionManager: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        match CurrentSession::from_request_parts(parts, state).await? {
            CurrentSession {
                token: Some(token),
                admin_id: Some(admin_id),
            } => Ok(AdminSession { admin_id, token }),
            _ => Err(AppError::unauthorized()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(MemorySessionStore::new()), &SessionConfig::default())
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("pass123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("pass123", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("pass123", "not-a-hash"));
    }

    #[test]
    fn test_dummy_password_never_matches() {
        assert!(DUMMY_HASH.starts_with("$argon2"));
        assert!(!verify_dummy_password("yomitomo-unknown-admin"));
        assert!(!verify_dummy_password(""));
    }

    #[test]
    fn test_session_tokens_are_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_ne!(hash_session_token(&a), a);
        assert_eq!(hash_session_token(&a), hash_session_token(&a));
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; yomitomo_session=abc123; lang=ja"),
        );
        assert_eq!(extract_cookie(&headers, "yomitomo_session").as_deref(), Some("abc123"));
        assert_eq!(extract_cookie(&headers, "missing"), None);

        headers.insert(COOKIE, HeaderValue::from_static("yomitomo_session="));
        assert_eq!(extract_cookie(&headers, "yomitomo_session"), None);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let sessions = manager();

        let token = sessions.start(3).await.unwrap();
        let session = sessions.resolve(&token).await.unwrap().unwrap();
        assert_eq!(session.admin_id, 3);

        sessions.end(&token).await.unwrap();
        assert!(sessions.resolve(&token).await.unwrap().is_none());
        assert!(sessions.resolve("never-issued").await.unwrap().is_none());
    }

    #[test]
    fn test_cookie_strings() {
        let sessions = manager();
        let cookie = sessions.session_cookie("tok");
        assert!(cookie.starts_with("yomitomo_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
        assert!(sessions.clear_cookie().contains("Max-Age=0"));
    }
}
