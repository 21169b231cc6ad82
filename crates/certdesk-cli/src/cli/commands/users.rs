//! User command handlers.

use anyhow::Result;
use certdesk_core::gateway::{CreateUserRequest, UserRole};
use certdesk_core::session::SessionStore;
use comfy_table::Table;

use super::{ensure_authenticated, gateway_failure};
use crate::cli::UsersCommands;

pub async fn run(store: &SessionStore, command: UsersCommands) -> Result<()> {
    match command {
        UsersCommands::List => list(store).await,
        UsersCommands::Create {
            name,
            email,
            password,
            admin,
        } => create(store, name, email, password, admin).await,
        UsersCommands::Delete { id } => delete(store, id).await,
    }
}

async fn list(store: &SessionStore) -> Result<()> {
    ensure_authenticated(store).await?;

    let users = store
        .gateway()
        .users()
        .await
        .map_err(|e| gateway_failure(store, "Failed to fetch users", e))?;

    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(["ID", "Name", "Email", "Role", "Password"]);
    for user in &users {
        table.add_row([
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            role_label(user.role).to_string(),
            if user.has_password { "set" } else { "none" }.to_string(),
        ]);
    }
    println!("{table}");

    Ok(())
}

async fn create(
    store: &SessionStore,
    name: String,
    email: String,
    password: Option<String>,
    admin: bool,
) -> Result<()> {
    ensure_authenticated(store).await?;

    let request = CreateUserRequest {
        user_name: name,
        user_email: email,
        password,
        role: if admin { UserRole::Admin } else { UserRole::User },
    };

    let user = store
        .gateway()
        .create_user(&request)
        .await
        .map_err(|e| gateway_failure(store, "Failed to create user", e))?;

    println!("✓ Created user {} <{}> (id {})", user.name, user.email, user.id);
    Ok(())
}

async fn delete(store: &SessionStore, id: i64) -> Result<()> {
    ensure_authenticated(store).await?;

    store
        .gateway()
        .delete_user(id)
        .await
        .map_err(|e| gateway_failure(store, "Failed to delete user", e))?;

    println!("✓ Deleted user {id}");
    Ok(())
}

fn role_label(role: UserRole) -> &'static str {
    match role {
        UserRole::User => "user",
        UserRole::Admin => "admin",
    }
}
