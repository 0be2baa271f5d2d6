//! Login, logout and the protected-page guard.

use super::{Profile, Session, SessionStore};
use crate::navigation::{home_route, Navigator, Route};
use crate::models::User;
use crate::services::UserService;
use crate::types::{AppError, AppResult};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub struct SessionManager {
    users: UserService,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl SessionManager {
    pub fn new(
        users: UserService,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            users,
            store,
            navigator,
        }
    }

    /// Authenticates, stores the cookie and profile, then lands on the role's home page.
    pub async fn login(&self, cpf: &str, password: &str) -> AppResult<User> {
        let response = self.users.authenticate(cpf, password).await?;

        let session = Session::for_user(&response.token, &response.user, Utc::now());
        self.store.save(&session).await?;

        let route = home_route(response.user.role);
        info!(user_id = response.user.id, route = %route, "Logged in");
        self.navigator.navigate(route);

        Ok(response.user)
    }

    /// Guard run when a protected page loads.
    ///
    /// The cached profile only tells us who to ask for; the backend record is
    /// always fetched and written back over the cache.
    pub async fn require_user(&self) -> AppResult<User> {
        let mut session = self.store.load().await?;

        let Some(user_id) = session.user_id() else {
            warn!("No cached user, redirecting to login");
            self.navigator.navigate(Route::Login);
            return Err(AppError::Unauthenticated);
        };

        let user = self.users.fetch_user_by_id(user_id).await?;

        let refreshed = Profile::from(&user);
        if session.profile.as_ref() != Some(&refreshed) {
            session.profile = Some(refreshed);
            // The 401 handler may have dropped the cookie meanwhile; do not resurrect it.
            session.cookie = self.store.load().await?.cookie;
            self.store.save(&session).await?;
        }

        Ok(user)
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.store.clear().await?;
        info!("Logged out");
        self.navigator.navigate(Route::Login);
        Ok(())
    }

    pub async fn current_session(&self) -> AppResult<Session> {
        self.store.load().await
    }
}
