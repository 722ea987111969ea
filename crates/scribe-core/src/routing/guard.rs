//! Session guard - decides whether a navigation proceeds or redirects.
//!
//! One session lookup per navigation, no retries, nothing remembered between
//! calls. The decision itself is a pure state transition so it can be tested
//! without a backend.

use std::sync::Arc;

use url::form_urlencoded;

use crate::domain::Session;
use crate::ports::{AuthError, AuthProvider};

use super::routes::{RouteMeta, RouteTable};

/// Where redirects go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    pub login_path: String,
    /// Destination for signed-in users hitting a guest-only page.
    pub authenticated_home: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            authenticated_home: "/dashboard".to_string(),
        }
    }
}

/// Result of the session lookup, as far as the guard cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLookup {
    Active,
    Absent,
    Failed,
}

impl From<&Result<Option<Session>, AuthError>> for SessionLookup {
    fn from(result: &Result<Option<Session>, AuthError>) -> Self {
        match result {
            Ok(Some(_)) => SessionLookup::Active,
            Ok(None) => SessionLookup::Absent,
            Err(_) => SessionLookup::Failed,
        }
    }
}

/// Navigation check progress: `Unknown -> Checking -> settled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Unknown,
    Checking,
    Allowed,
    /// Send the user to login; `location` carries the requested path.
    RedirectLogin { location: String },
    RedirectHome { location: String },
}

impl GuardState {
    pub fn begin(self) -> Self {
        match self {
            GuardState::Unknown => GuardState::Checking,
            other => other,
        }
    }

    /// Apply the lookup result. Only a `Checking` state moves.
    pub fn settle(
        self,
        meta: RouteMeta,
        lookup: SessionLookup,
        target: &str,
        config: &GuardConfig,
    ) -> Self {
        if self != GuardState::Checking {
            return self;
        }

        let to_login = || GuardState::RedirectLogin {
            location: login_location(&config.login_path, target),
        };

        match lookup {
            // redirecting the login page to itself would loop
            SessionLookup::Failed if is_same_path(target, &config.login_path) => {
                GuardState::Allowed
            }
            SessionLookup::Failed => to_login(),
            SessionLookup::Absent if meta.requires_auth => to_login(),
            SessionLookup::Active if meta.redirect_if_authenticated => GuardState::RedirectHome {
                location: config.authenticated_home.clone(),
            },
            _ => GuardState::Allowed,
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, GuardState::Unknown | GuardState::Checking)
    }

    /// Redirect target, if the navigation was redirected.
    pub fn redirect(&self) -> Option<&str> {
        match self {
            GuardState::RedirectLogin { location } | GuardState::RedirectHome { location } => {
                Some(location)
            }
            _ => None,
        }
    }
}

fn is_same_path(target: &str, path: &str) -> bool {
    let bare = target.split(['?', '#']).next().unwrap_or_default();
    bare.trim_end_matches('/') == path.trim_end_matches('/')
}

fn login_location(login_path: &str, target: &str) -> String {
    if target.is_empty() || target == "/" {
        return login_path.to_string();
    }
    let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{login_path}?redirect={encoded}")
}

/// Runs the guard against the live auth backend.
#[derive(Clone)]
pub struct SessionGuard {
    auth: Arc<dyn AuthProvider>,
    routes: Arc<RouteTable>,
    config: GuardConfig,
}

impl SessionGuard {
    pub fn new(auth: Arc<dyn AuthProvider>, routes: RouteTable, config: GuardConfig) -> Self {
        Self {
            auth,
            routes: Arc::new(routes),
            config,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Check a navigation to `path`. Unknown paths carry no attributes.
    pub async fn check(&self, path: &str) -> GuardState {
        let meta = self
            .routes
            .resolve(path)
            .map(|m| m.meta)
            .unwrap_or_default();

        let state = GuardState::Unknown.begin();
        tracing::debug!(path, ?meta, "Checking navigation");

        let result = self.auth.current_session().await;
        if let Err(e) = &result {
            tracing::warn!(path, error = %e, "Session lookup failed");
        }

        let state = state.settle(meta, SessionLookup::from(&result), path, &self.config);
        tracing::debug!(path, ?state, "Navigation settled");
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::StubAuth;

    fn settle(meta: RouteMeta, lookup: SessionLookup, target: &str) -> GuardState {
        GuardState::Unknown
            .begin()
            .settle(meta, lookup, target, &GuardConfig::default())
    }

    #[test]
    fn test_protected_routes_never_allow_without_session() {
        for lookup in [SessionLookup::Absent, SessionLookup::Failed] {
            let state = settle(RouteMeta::PROTECTED, lookup, "/dashboard/stats");
            assert_eq!(
                state,
                GuardState::RedirectLogin {
                    location: "/login?redirect=%2Fdashboard%2Fstats".to_string()
                }
            );
        }
    }

    #[test]
    fn test_protected_route_allows_active_session() {
        assert_eq!(
            settle(RouteMeta::PROTECTED, SessionLookup::Active, "/dashboard"),
            GuardState::Allowed
        );
    }

    #[test]
    fn test_guest_only_route() {
        assert_eq!(
            settle(RouteMeta::GUEST_ONLY, SessionLookup::Active, "/register"),
            GuardState::RedirectHome {
                location: "/dashboard".to_string()
            }
        );
        assert_eq!(
            settle(RouteMeta::GUEST_ONLY, SessionLookup::Absent, "/register"),
            GuardState::Allowed
        );
    }

    #[test]
    fn test_failed_lookup_redirects_public_routes_too() {
        assert!(matches!(
            settle(RouteMeta::PUBLIC, SessionLookup::Failed, "/about"),
            GuardState::RedirectLogin { .. }
        ));
    }

    #[test]
    fn test_failed_lookup_on_login_page_does_not_loop() {
        assert_eq!(
            settle(RouteMeta::GUEST_ONLY, SessionLookup::Failed, "/login?redirect=/x"),
            GuardState::Allowed
        );
    }

    #[test]
    fn test_only_checking_state_moves() {
        let config = GuardConfig::default();
        let state = GuardState::Unknown.settle(RouteMeta::PROTECTED, SessionLookup::Absent, "/x", &config);
        assert_eq!(state, GuardState::Unknown);
        assert!(!state.is_settled());

        let settled = GuardState::Allowed.begin();
        assert_eq!(settled, GuardState::Allowed);
    }

    #[test]
    fn test_login_location_encoding() {
        assert_eq!(login_location("/login", "/"), "/login");
        assert_eq!(
            login_location("/login", "/blogs?tag=a&b"),
            "/login?redirect=%2Fblogs%3Ftag%3Da%26b"
        );
        assert_eq!(
            login_location("/login", "/blogs/café\tmenu #2"),
            "/login?redirect=%2Fblogs%2Fcaf%C3%A9%09menu+%232"
        );
    }

    #[tokio::test]
    async fn test_guard_uses_route_table_and_session() {
        let signed_out = SessionGuard::new(
            Arc::new(StubAuth::signed_out()),
            RouteTable::standard(),
            GuardConfig::default(),
        );
        let signed_in = SessionGuard::new(
            Arc::new(StubAuth::signed_in("u1")),
            RouteTable::standard(),
            GuardConfig {
                authenticated_home: "/dashboard/profile".to_string(),
                ..GuardConfig::default()
            },
        );

        assert_eq!(
            signed_out.check("/dashboard/blogs/new").await.redirect(),
            Some("/login?redirect=%2Fdashboard%2Fblogs%2Fnew")
        );
        assert_eq!(signed_out.check("/blogs/hello").await, GuardState::Allowed);
        assert_eq!(signed_out.check("/unknown").await, GuardState::Allowed);
        assert_eq!(signed_in.check("/dashboard").await, GuardState::Allowed);
        assert_eq!(signed_in.check("/login").await.redirect(), Some("/dashboard/profile"));
    }

    #[tokio::test]
    async fn test_guard_performs_one_lookup_per_navigation() {
        let auth = Arc::new(StubAuth::signed_in("u1"));
        let guard = SessionGuard::new(auth.clone(), RouteTable::standard(), GuardConfig::default());

        guard.check("/dashboard").await;
        guard.check("/about").await;

        assert_eq!(auth.calls(), vec!["current_session", "current_session"]);
    }

    #[tokio::test]
    async fn test_guard_failed_lookup_redirects_to_login() {
        let guard = SessionGuard::new(
            Arc::new(StubAuth::failing(AuthError::Connection("offline".into()))),
            RouteTable::standard(),
            GuardConfig::default(),
        );

        let state = guard.check("/dashboard").await;
        assert_eq!(state.redirect(), Some("/login?redirect=%2Fdashboard"));
    }
}
