//! First-setup command handler.

use anyhow::{Result, bail};
use certdesk_core::gateway::SetupRequest;
use certdesk_core::session::SessionStore;

pub async fn run(
    store: &SessionStore,
    name: String,
    ca_name: String,
    ca_validity_years: u32,
    password: Option<String>,
) -> Result<()> {
    store.init().await;

    if store.snapshot().setup_complete {
        println!("Backend is already set up.");
        return Ok(());
    }

    let request = SetupRequest {
        name,
        ca_name,
        ca_validity_in_years: ca_validity_years,
        password,
    };

    if !store.run_setup(&request).await {
        let state = store.snapshot();
        bail!(
            "{}",
            state
                .last_error
                .unwrap_or_else(|| "Setup failed".to_string())
        );
    }

    println!("✓ Backend setup complete");
    if store.snapshot().password_auth {
        println!("  Log in with `certdesk login`");
    } else {
        println!("  Log in with `certdesk login --oidc`");
    }

    Ok(())
}
