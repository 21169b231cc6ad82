//! Status command handler.

use anyhow::Result;
use certdesk_core::session::{SessionStore, mask_token};

pub async fn run(store: &SessionStore) -> Result<()> {
    store.init().await;
    let state = store.snapshot();

    println!(
        "Backend setup:   {}",
        if state.setup_complete {
            "complete"
        } else {
            "not set up"
        }
    );
    println!(
        "Password login:  {}",
        if state.password_auth {
            "enabled"
        } else {
            "disabled"
        }
    );
    match &state.external_login_url {
        Some(url) => println!("External login:  {url}"),
        None => println!("External login:  not configured"),
    }

    match (&state.current_user, &state.token) {
        (Some(user), Some(token)) => {
            println!(
                "Session:         logged in as {} <{}> (token: {})",
                user.name,
                user.email,
                mask_token(token)
            );
        }
        _ => println!("Session:         logged out"),
    }

    if let Some(error) = &state.last_error {
        println!("Last error:      {error}");
    }

    Ok(())
}
