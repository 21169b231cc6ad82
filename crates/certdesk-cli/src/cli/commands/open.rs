//! Guarded navigation command handler.
//!
//! `certdesk open <target>` resolves the target through the navigation guard
//! and renders the surface the application lands on, mirroring what a
//! route-driven shell would display.

use std::sync::Arc;

use anyhow::Result;
use certdesk_core::nav::{NavOutcome, NavRequest, NavigationGuard, Route};
use certdesk_core::session::SessionStore;

pub async fn run(store: &Arc<SessionStore>, target: &str) -> Result<()> {
    let request = NavRequest::parse(target)?;
    let guard = NavigationGuard::new(Arc::clone(store));

    let outcome = guard.resolve(&request).await;
    let route = match outcome {
        NavOutcome::Allow(route) => route,
        NavOutcome::Redirect(route) => {
            println!("→ redirected to {}", route.path());
            route
        }
    };

    render(store, route).await
}

async fn render(store: &Arc<SessionStore>, route: Route) -> Result<()> {
    match route {
        Route::Login => {
            let state = store.snapshot();
            if let Some(error) = &state.last_error {
                println!("{error}");
            }
            if state.password_auth {
                println!("Log in with `certdesk login`");
            }
            if state.external_login_url.is_some() {
                println!("Log in with `certdesk login --oidc`");
            }
            Ok(())
        }
        Route::FirstSetup => {
            println!("Backend is not set up yet.");
            println!("Run `certdesk setup --name <name> --ca-name <ca>` to initialize it.");
            Ok(())
        }
        Route::Overview => super::certs::list(store).await,
        Route::Generate => {
            println!("Create a certificate with `certdesk certs create --name <name> --user-id <id>`");
            Ok(())
        }
        Route::Settings => super::settings::show(store).await,
    }
}
