//! Session state and the store that owns it.
//!
//! The [`SessionStore`] is the single authority over authentication and
//! bootstrap state. Every mutation goes through one of its actions; surfaces
//! read immutable snapshots and may subscribe to change notifications. The
//! store pairs every durable write/delete with the matching in-memory
//! transition, so the persisted marker never drifts from the live state.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;

use crate::gateway::{
    ChangePasswordRequest, Gateway, GatewayError, LoginRequest, SetupRequest, User,
};

mod persist;

pub use persist::{SessionCache, mask_token};

/// Default bound on the session re-hydration network call.
const DEFAULT_HYDRATE_TIMEOUT_SECS: u64 = 10;

/// In-memory session state.
///
/// Created at process start with everything false/absent; mutated only by
/// [`SessionStore`] actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// True once the first bootstrap sequence has completed (success or
    /// failure). Never resets to false.
    pub initialized: bool,
    /// Mirrors backend setup completion; false until first fetched.
    pub setup_complete: bool,
    /// True only after a successful login or token re-hydration.
    pub authenticated: bool,
    /// Whether password login is offered.
    pub password_auth: bool,
    /// External identity provider login URL, when one is configured.
    pub external_login_url: Option<String>,
    /// Opaque bearer token; absent means unauthenticated.
    pub token: Option<String>,
    /// The user the current session belongs to.
    pub current_user: Option<User>,
    /// Last operation's failure message; cleared at the start of every
    /// new operation.
    pub last_error: Option<String>,
}

/// Single authority over [`SessionState`].
///
/// Each action performs at most one logical backend exchange and then
/// atomically updates state. Actions never panic on backend failure; they
/// record `last_error` and return a success/failure signal instead.
pub struct SessionStore {
    gateway: Gateway,
    cache_path: PathBuf,
    hydrate_timeout: Duration,
    state: watch::Sender<SessionState>,
    // Single-flight gate so overlapping init() calls from racing navigations
    // produce exactly one bootstrap sequence.
    init_gate: tokio::sync::Mutex<()>,
}

impl SessionStore {
    /// Creates a store backed by `gateway`, persisting to `cache_path`.
    pub fn new(gateway: Gateway, cache_path: PathBuf) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            gateway,
            cache_path,
            hydrate_timeout: Duration::from_secs(DEFAULT_HYDRATE_TIMEOUT_SECS),
            state,
            init_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Overrides the bound on the re-hydration network call.
    pub fn with_hydrate_timeout(mut self, timeout: Duration) -> Self {
        self.hydrate_timeout = timeout;
        self
    }

    /// Returns an immutable snapshot of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribes to state-change notifications.
    ///
    /// Surfaces that render reactively watch this; the store itself is
    /// unaware of rendering.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Returns the gateway this store authenticates.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Bootstraps the session: queries setup status and, when a persisted
    /// authenticated marker exists, re-hydrates the session from the stored
    /// token.
    ///
    /// Idempotent per process lifetime and single-flight under concurrent
    /// callers. Hard postcondition: `initialized == true` afterwards,
    /// regardless of outcome. Any hydration failure (transport, rejection,
    /// timeout, missing token) falls back to a forced logout rather than a
    /// partially-authenticated state.
    pub async fn init(&self) {
        let _gate = self.init_gate.lock().await;
        if self.state.borrow().initialized {
            return;
        }

        self.check_setup().await;

        // A backend with no completed setup cannot have valid sessions.
        if self.state.borrow().setup_complete {
            let cache = SessionCache::load_from(&self.cache_path).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "unreadable session cache, starting logged out");
                SessionCache::default()
            });

            if cache.authenticated {
                match cache.token.filter(|t| !t.is_empty()) {
                    Some(token) => {
                        self.gateway.set_token(Some(token.clone()));
                        self.hydrate(token).await;
                    }
                    None => self.force_logout("Stored session is missing its token"),
                }
            }
        }

        self.state.send_modify(|s| s.initialized = true);
    }

    /// Queries backend setup status unconditionally and updates
    /// `setup_complete`, `password_auth`, and `external_login_url`.
    ///
    /// On failure leaves the previous values untouched, records
    /// `last_error`, and returns false.
    pub async fn check_setup(&self) -> bool {
        self.state.send_modify(|s| s.last_error = None);

        match self.gateway.is_setup().await {
            Ok(status) => {
                self.state.send_modify(|s| {
                    s.setup_complete = status.setup;
                    s.password_auth = status.password;
                    s.external_login_url =
                        (!status.oidc.is_empty()).then(|| status.oidc.clone());
                });
                true
            }
            Err(err) => {
                self.record_error(format!("Failed to query setup status: {err}"));
                false
            }
        }
    }

    /// Exchanges credentials for a token and hydrates the session.
    ///
    /// On success the token is adopted, the current user fetched, and the
    /// authenticated marker persisted. On any failure nothing is applied:
    /// the token is discarded, no durable write happens, and `last_error`
    /// carries the reason.
    pub async fn login(&self, credentials: &LoginRequest) -> bool {
        self.state.send_modify(|s| s.last_error = None);

        let token = match self.gateway.login(credentials).await {
            Ok(response) => response.token,
            Err(err) => {
                self.record_error(format!("Login failed: {err}"));
                return false;
            }
        };
        if token.is_empty() {
            self.record_error("Login succeeded but the backend returned an empty token");
            return false;
        }

        self.gateway.set_token(Some(token.clone()));
        self.hydrate(token).await
    }

    /// Completes an external-identity-provider round trip.
    ///
    /// The redirect already established a session server-side; this confirms
    /// it, adopts the token, and hydrates the current user the same way
    /// `init()` does. On failure the session is left unauthenticated; there
    /// is no automatic retry.
    pub async fn finish_external_login(&self) -> bool {
        self.state.send_modify(|s| s.last_error = None);

        let token = match self.gateway.oidc_login().await {
            Ok(response) => response.token,
            Err(err) => {
                self.force_logout(format!("External login failed: {err}"));
                return false;
            }
        };
        if token.is_empty() {
            self.force_logout("External login returned an empty token");
            return false;
        }

        self.gateway.set_token(Some(token.clone()));
        self.hydrate(token).await
    }

    /// Submits a password change. On success password login is enabled;
    /// the authenticated flag is untouched.
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> bool {
        self.state.send_modify(|s| s.last_error = None);

        match self.gateway.change_password(request).await {
            Ok(()) => {
                self.state.send_modify(|s| s.password_auth = true);
                true
            }
            Err(err) => {
                if self.absorb_unauthorized(&err) {
                    return false;
                }
                self.record_error(format!("Failed to change password: {err}"));
                false
            }
        }
    }

    /// Runs first-time backend setup and refreshes the setup status.
    pub async fn run_setup(&self, request: &SetupRequest) -> bool {
        self.state.send_modify(|s| s.last_error = None);

        match self.gateway.setup(request).await {
            Ok(()) => self.check_setup().await,
            Err(err) => {
                self.record_error(format!("Setup failed: {err}"));
                false
            }
        }
    }

    /// Clears the session: token, user, authenticated flag, persisted
    /// marker, and `last_error`. Synchronous; cannot fail. Idempotent.
    pub fn logout(&self) {
        self.reset_authentication();
        self.state.send_modify(|s| s.last_error = None);
    }

    /// Circuit-breaker entry point: if `err` is the authorization-rejected
    /// signal, clears the session and records why, returning true. The next
    /// guard evaluation then redirects to Login.
    pub fn absorb_unauthorized(&self, err: &GatewayError) -> bool {
        if !err.is_unauthorized() {
            return false;
        }
        self.force_logout("Session is no longer valid, please log in again");
        true
    }

    /// Fetches the current user under the hydration timeout and, on success,
    /// applies the fully-authenticated state. Any failure tears the session
    /// back down to logged-out.
    async fn hydrate(&self, token: String) -> bool {
        match tokio::time::timeout(self.hydrate_timeout, self.gateway.current_user()).await {
            Ok(Ok(user)) => {
                self.apply_authentication(token, user);
                true
            }
            Ok(Err(err)) => {
                self.force_logout(format!("Failed to fetch current user: {err}"));
                false
            }
            Err(_) => {
                self.force_logout("Timed out while contacting the backend");
                false
            }
        }
    }

    /// Marks the session authenticated and persists the marker + token in
    /// the same transition.
    fn apply_authentication(&self, token: String, user: User) {
        let cache = SessionCache {
            authenticated: true,
            token: Some(token.clone()),
        };
        if let Err(err) = cache.save_to(&self.cache_path) {
            tracing::warn!(error = %err, "failed to persist session cache");
        }

        self.state.send_modify(|s| {
            s.token = Some(token);
            s.authenticated = true;
            s.current_user = Some(user);
            s.last_error = None;
        });
    }

    /// Clears authentication state and the persisted cache together.
    fn reset_authentication(&self) {
        self.gateway.set_token(None);
        self.state.send_modify(|s| {
            s.token = None;
            s.authenticated = false;
            s.current_user = None;
        });

        if let Err(err) = SessionCache::clear_at(&self.cache_path) {
            tracing::warn!(error = %err, "failed to remove session cache");
        }
    }

    /// Logout that keeps a failure message, for hydration failures and the
    /// 401 circuit breaker.
    fn force_logout(&self, reason: impl Into<String>) {
        self.reset_authentication();
        self.state.send_modify(|s| s.last_error = Some(reason.into()));
    }

    fn record_error(&self, message: impl Into<String>) {
        self.state.send_modify(|s| s.last_error = Some(message.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: the default state is fully unauthenticated and uninitialized.
    #[test]
    fn test_default_state_shape() {
        let state = SessionState::default();
        assert!(!state.initialized);
        assert!(!state.setup_complete);
        assert!(!state.authenticated);
        assert!(state.token.is_none());
        assert!(state.current_user.is_none());
        assert!(state.last_error.is_none());
    }

    /// Test: logout is synchronous, idempotent, and clears the error.
    #[tokio::test]
    async fn test_logout_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(
            Gateway::new("http://127.0.0.1:9"),
            dir.path().join("session.json"),
        );

        store.logout();
        let once = store.snapshot();
        store.logout();
        let twice = store.snapshot();

        assert_eq!(once, twice);
        assert!(!twice.authenticated);
        assert!(twice.token.is_none());
        assert!(twice.last_error.is_none());
    }

    /// Test: subscribers observe state transitions.
    #[tokio::test]
    async fn test_subscribe_sees_changes() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(
            Gateway::new("http://127.0.0.1:9"),
            dir.path().join("session.json"),
        );

        let mut rx = store.subscribe();
        store.force_logout("gone");

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().last_error.as_deref(), Some("gone"));
    }

    /// Test: only the unauthorized kind trips the circuit breaker.
    #[tokio::test]
    async fn test_absorb_unauthorized_ignores_other_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(
            Gateway::new("http://127.0.0.1:9"),
            dir.path().join("session.json"),
        );

        let plain = GatewayError::http_status(500, "");
        assert!(!store.absorb_unauthorized(&plain));
        assert!(store.snapshot().last_error.is_none());

        let rejected = GatewayError::http_status(401, "");
        assert!(store.absorb_unauthorized(&rejected));
        assert!(store.snapshot().last_error.is_some());
        assert!(!store.snapshot().authenticated);
    }
}
