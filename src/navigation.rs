//! Navigation
//!
//! Routes of the application and the [`Navigator`] seam used by the HTTP client
//! and the session manager to move the user around (e.g. back to `/login` when
//! the backend rejects a token).

use crate::models::Role;
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    Dashboard,
    Wallet,
    Statement,
    Payments,
    LoanRequest,
    Proposals,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/cadastro",
            Route::Dashboard => "/dashboard",
            Route::Wallet => "/carteira",
            Route::Statement => "/extrato",
            Route::Payments => "/pagamentos",
            Route::LoanRequest => "/solicitar-emprestimo",
            Route::Proposals => "/propostas",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Landing page per role.
const HOME_ROUTES: [(Role, Route); 2] = [
    (Role::Borrower, Route::Dashboard),
    (Role::Investor, Route::Wallet),
];

pub fn home_route(role: Role) -> Route {
    HOME_ROUTES
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, route)| *route)
        .unwrap_or(Route::Login)
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that keeps every visited route.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Route>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Route> {
        self.history.lock().ok().and_then(|h| h.last().copied())
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, route: Route) {
        info!(route = %route, "Navigating");
        if let Ok(mut history) = self.history.lock() {
            history.push(route);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_route_by_role() {
        assert_eq!(home_route(Role::Borrower), Route::Dashboard);
        assert_eq!(home_route(Role::Investor), Route::Wallet);
        assert_eq!(home_route(Role::Investor).path(), "/carteira");
    }

    #[test]
    fn test_history_navigator_tracks_current() {
        let nav = HistoryNavigator::new();
        assert_eq!(nav.current(), None);
        nav.navigate(Route::Dashboard);
        nav.navigate(Route::Login);
        assert_eq!(nav.current(), Some(Route::Login));
        assert_eq!(nav.history(), vec![Route::Dashboard, Route::Login]);
    }
}
