//! Command handlers.

use anyhow::{Result, anyhow, bail};
use certdesk_core::gateway::GatewayError;
use certdesk_core::session::SessionStore;

pub mod auth;
pub mod certs;
pub mod config;
pub mod open;
pub mod settings;
pub mod setup;
pub mod status;
pub mod users;

/// Bootstraps the store and bails unless the session is usable for
/// authenticated calls.
pub(crate) async fn ensure_authenticated(store: &SessionStore) -> Result<()> {
    store.init().await;

    let state = store.snapshot();
    if !state.setup_complete {
        bail!("Backend is not set up yet; run `certdesk setup` first");
    }
    if !state.authenticated {
        bail!("Not logged in; run `certdesk login` first");
    }
    Ok(())
}

/// Maps a gateway failure into a command error, routing the global
/// session-invalid signal through the store's circuit breaker.
pub(crate) fn gateway_failure(
    store: &SessionStore,
    action: &str,
    err: GatewayError,
) -> anyhow::Error {
    if store.absorb_unauthorized(&err) {
        anyhow!("Session expired; run `certdesk login` to sign in again")
    } else {
        anyhow!("{action}: {err}")
    }
}
