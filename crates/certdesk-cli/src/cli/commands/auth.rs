//! Auth command handlers.

use std::io::{self, BufRead, Write};

use anyhow::{Result, bail};
use certdesk_core::gateway::{ChangePasswordRequest, LoginRequest};
use certdesk_core::session::{SessionCache, SessionStore, mask_token};

pub async fn login(
    store: &SessionStore,
    email: Option<String>,
    password: Option<String>,
    oidc: bool,
) -> Result<()> {
    store.init().await;

    let state = store.snapshot();
    if !state.setup_complete {
        bail!("Backend is not set up yet; run `certdesk setup` first");
    }

    // Check if already logged in
    if state.authenticated {
        if let Some(user) = &state.current_user {
            println!("Already logged in as {} <{}>", user.name, user.email);
        } else {
            println!("Already logged in");
        }
        print!("Do you want to replace the existing session? [y/N] ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().lock().read_line(&mut response)?;
        if !response.trim().eq_ignore_ascii_case("y") {
            println!("Login cancelled.");
            return Ok(());
        }
        store.logout();
    }

    if oidc {
        login_external(store).await
    } else {
        login_password(store, email, password).await
    }
}

async fn login_password(
    store: &SessionStore,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    if !store.snapshot().password_auth {
        if store.snapshot().external_login_url.is_some() {
            bail!("Password login is disabled; use `certdesk login --oidc`");
        }
        bail!("Password login is disabled on this backend");
    }

    let password = match password {
        Some(p) => p,
        None => {
            print!("Password: ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().lock().read_line(&mut input)?;
            input.trim().to_string()
        }
    };
    if password.is_empty() {
        bail!("Password cannot be empty");
    }

    let credentials = LoginRequest {
        email,
        password: Some(password),
    };
    if !store.login(&credentials).await {
        let state = store.snapshot();
        bail!(
            "{}",
            state
                .last_error
                .unwrap_or_else(|| "Login failed".to_string())
        );
    }

    report_login(store);
    Ok(())
}

async fn login_external(store: &SessionStore) -> Result<()> {
    let Some(auth_url) = store.snapshot().external_login_url else {
        bail!("No external identity provider is configured on this backend");
    };

    println!("To log in with the external identity provider:");
    println!();
    println!("  1. A browser window will open (or visit the URL below)");
    println!("  2. Log in and authorize access");
    println!("  3. Return here once the provider confirms success");
    println!();
    println!("Login URL:");
    println!("  {auth_url}");
    println!();

    // Try to open browser (best effort, skip in tests)
    if std::env::var("CERTDESK_NO_BROWSER").is_err() {
        let _ = open::that(&auth_url);
    }

    print!("Press Enter to complete the login: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    if !store.finish_external_login().await {
        let state = store.snapshot();
        bail!(
            "{}",
            state
                .last_error
                .unwrap_or_else(|| "External login failed".to_string())
        );
    }

    report_login(store);
    Ok(())
}

fn report_login(store: &SessionStore) {
    let state = store.snapshot();
    println!();
    match (&state.current_user, &state.token) {
        (Some(user), Some(token)) => println!(
            "✓ Logged in as {} <{}> (token: {})",
            user.name,
            user.email,
            mask_token(token)
        ),
        _ => println!("✓ Logged in"),
    }
    println!("  Session saved to: {}", SessionCache::cache_path().display());
}

pub fn logout(store: &SessionStore) -> Result<()> {
    let cache_path = SessionCache::cache_path();
    let had_session = cache_path.exists();

    store.logout();

    if had_session {
        println!("✓ Logged out");
        println!("  Session removed from: {}", cache_path.display());
    } else {
        println!("Not logged in (no stored session found).");
    }

    Ok(())
}

pub async fn change_password(
    store: &SessionStore,
    old_password: Option<String>,
    new_password: String,
) -> Result<()> {
    super::ensure_authenticated(store).await?;

    if new_password.is_empty() {
        bail!("New password cannot be empty");
    }

    let request = ChangePasswordRequest {
        old_password,
        new_password,
    };
    if !store.change_password(&request).await {
        let state = store.snapshot();
        if !state.authenticated {
            bail!("Session expired; run `certdesk login` to sign in again");
        }
        bail!(
            "{}",
            state
                .last_error
                .unwrap_or_else(|| "Failed to change password".to_string())
        );
    }

    println!("✓ Password changed");
    Ok(())
}
