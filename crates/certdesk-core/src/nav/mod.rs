//! Routes and the navigation guard.
//!
//! Every navigation into the authenticated shell is resolved here: the guard
//! lazily bootstraps the session store, redirects to First-Setup or Login
//! when the state demands it, and completes a pending external-provider
//! round trip signaled by the reserved query marker.

use std::sync::Arc;

use anyhow::{Context, Result};
use url::Url;

use crate::session::SessionStore;

/// Reserved query parameter signaling an external-provider return. Its mere
/// presence (value irrelevant) triggers completion of the login round trip.
pub const EXTERNAL_LOGIN_MARKER: &str = "oidc";

/// Application routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Password / external-provider login. Always reachable.
    Login,
    /// First-time backend setup. Always reachable.
    FirstSetup,
    /// Certificate overview; the shell's default child.
    Overview,
    /// Certificate generation.
    Generate,
    /// Backend settings.
    Settings,
}

impl Route {
    /// Returns the canonical path of this route.
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::FirstSetup => "/first-setup",
            Route::Overview => "/overview",
            Route::Generate => "/generate",
            Route::Settings => "/settings",
        }
    }

    /// Resolves a path to a route.
    ///
    /// `/` resolves to the shell's default child. Unknown paths resolve to
    /// `None`; the guard treats them as shell territory so nothing escapes
    /// the auth checks.
    pub fn match_path(path: &str) -> Option<Route> {
        match path.trim_end_matches('/') {
            "" => Some(Route::Overview),
            "/login" => Some(Route::Login),
            "/first-setup" => Some(Route::FirstSetup),
            "/overview" => Some(Route::Overview),
            "/generate" => Some(Route::Generate),
            "/settings" => Some(Route::Settings),
            _ => None,
        }
    }

    /// Whether this route lives under the authenticated shell.
    pub fn is_shell(self) -> bool {
        matches!(self, Route::Overview | Route::Generate | Route::Settings)
    }
}

/// A parsed navigation target: path plus query pairs.
#[derive(Debug, Clone)]
pub struct NavRequest {
    path: String,
    query: Vec<(String, String)>,
}

impl NavRequest {
    /// Parses a navigation target such as `/overview`, `/?oidc`, or a full
    /// URL; relative targets are resolved against the application root.
    pub fn parse(target: &str) -> Result<Self> {
        let base = Url::parse("app://local/").expect("static base URL");
        let url = base
            .join(target)
            .with_context(|| format!("Invalid navigation target: {target}"))?;

        Ok(Self {
            path: url.path().to_string(),
            query: url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        })
    }

    /// Builds a request for a route directly, with no query.
    pub fn to_route(route: Route) -> Self {
        Self {
            path: route.path().to_string(),
            query: Vec::new(),
        }
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when the external-provider return marker is present, whatever
    /// its value.
    pub fn has_external_login_marker(&self) -> bool {
        self.query.iter().any(|(k, _)| k == EXTERNAL_LOGIN_MARKER)
    }
}

/// Result of resolving a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Navigation may proceed to this route.
    Allow(Route),
    /// Navigation is redirected to this route instead.
    Redirect(Route),
}

impl NavOutcome {
    /// The route the application ends up on.
    pub fn route(self) -> Route {
        match self {
            NavOutcome::Allow(route) | NavOutcome::Redirect(route) => route,
        }
    }
}

/// Gatekeeper evaluated before entering any route under the authenticated
/// shell. Login and First-Setup are always reachable and never evaluated.
pub struct NavigationGuard {
    store: Arc<SessionStore>,
}

impl NavigationGuard {
    /// Creates a guard over the shared session store.
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Resolves a navigation request.
    ///
    /// Deterministic, no hidden retries:
    /// 1. awaits lazy `init()` when the store is uninitialized (navigation
    ///    is held, never abandoned);
    /// 2. redirects to First-Setup while the backend is unconfigured;
    /// 3. completes a pending external-provider return when the marker is
    ///    present (failure falls through to the next step);
    /// 4. redirects to Login when unauthenticated;
    /// 5. otherwise allows passage.
    pub async fn resolve(&self, request: &NavRequest) -> NavOutcome {
        let route = Route::match_path(request.path()).unwrap_or(Route::Overview);
        if !route.is_shell() {
            return NavOutcome::Allow(route);
        }

        if !self.store.snapshot().initialized {
            self.store.init().await;
        }

        if !self.store.snapshot().setup_complete {
            return NavOutcome::Redirect(Route::FirstSetup);
        }

        // Completing the round trip is only meaningful while logged out; a
        // stale marker on an already-authenticated session is ignored so
        // back-navigation cannot tear the session down.
        if request.has_external_login_marker() && !self.store.snapshot().authenticated {
            let _ = self.store.finish_external_login().await;
        }

        if !self.store.snapshot().authenticated {
            return NavOutcome::Redirect(Route::Login);
        }

        NavOutcome::Allow(route)
    }
}
