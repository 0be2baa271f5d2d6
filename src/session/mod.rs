//! Session Module
//!
//! Keeps just enough identity data between runs to avoid logging in again and
//! to branch on the user's role. The token lives in a cookie-like record with a
//! fixed expiry; the profile is a cache of the last fetched user.

pub mod manager;
pub mod storage;

pub use manager::SessionManager;
pub use storage::FileSessionStore;

use crate::config::SESSION_TTL_DAYS;
use crate::models::{Role, User};
use crate::types::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Bearer token plus its expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionCookie {
    pub fn issue(token: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Cached identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: i64,
    pub role: Role,
    pub name: String,
    pub email: String,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub cookie: Option<SessionCookie>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

impl Session {
    pub fn for_user(token: impl Into<String>, user: &User, now: DateTime<Utc>) -> Self {
        Self {
            cookie: Some(SessionCookie::issue(token, now)),
            profile: Some(Profile::from(user)),
        }
    }

    /// Token to send, if the cookie exists and has not expired.
    pub fn token(&self) -> Option<&str> {
        self.token_at(Utc::now())
    }

    pub fn token_at(&self, now: DateTime<Utc>) -> Option<&str> {
        self.cookie
            .as_ref()
            .filter(|c| !c.is_expired(now))
            .map(|c| c.token.as_str())
    }

    pub fn user_id(&self) -> Option<i64> {
        self.profile.as_ref().map(|p| p.user_id)
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }
}

/// Repository for the session. Every consumer goes through this instead of
/// touching the storage directly.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> AppResult<Session>;

    async fn save(&self, session: &Session) -> AppResult<()>;

    async fn clear(&self) -> AppResult<()>;

    /// Drops the token but keeps the cached profile.
    async fn clear_cookie(&self) -> AppResult<()> {
        let mut session = self.load().await?;
        session.cookie = None;
        self.save(&session).await
    }
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: RwLock::new(session),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> AppResult<Session> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, session: &Session) -> AppResult<()> {
        *self.inner.write().await = session.clone();
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.inner.write().await = Session::default();
        Ok(())
    }
}
