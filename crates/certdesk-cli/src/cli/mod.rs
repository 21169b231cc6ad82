//! CLI entry and dispatch.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use certdesk_core::config::Config;
use certdesk_core::gateway::Gateway;
use certdesk_core::session::{SessionCache, SessionStore};
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "certdesk")]
#[command(version)]
#[command(about = "Terminal client for a certificate-management service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the backend server URL from config
    #[arg(long, value_name = "URL")]
    server: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show backend setup and session status
    Status,

    /// Run first-time backend setup
    Setup {
        /// Display name for the backend instance
        #[arg(long)]
        name: String,

        /// Name of the certificate authority to create
        #[arg(long = "ca-name")]
        ca_name: String,

        /// CA validity in years
        #[arg(long = "ca-validity-years", default_value_t = 10)]
        ca_validity_years: u32,

        /// Admin password (omit for an external-provider-only backend)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in to the backend
    Login {
        /// Email to log in with
        #[arg(long)]
        email: Option<String>,

        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Use the external identity provider instead of a password
        #[arg(long)]
        oidc: bool,
    },

    /// Log out and clear the stored session
    Logout,

    /// Change the current user's password
    ChangePassword {
        /// Current password (omit when none is set yet)
        #[arg(long = "old-password")]
        old_password: Option<String>,

        /// New password
        #[arg(long = "new-password")]
        new_password: String,
    },

    /// Navigate to an application route through the guard
    Open {
        /// Route target, e.g. "/overview" or "/?oidc"
        #[arg(value_name = "TARGET")]
        target: String,
    },

    /// Manage certificates
    Certs {
        #[command(subcommand)]
        command: CertsCommands,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },

    /// Show or replace backend settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Manage local configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum CertsCommands {
    /// List certificates
    List,
    /// Create a certificate
    Create {
        /// Certificate name
        #[arg(long)]
        name: String,

        /// Owning user id
        #[arg(long = "user-id")]
        user_id: i64,

        /// Validity in years
        #[arg(long = "validity-years", default_value_t = 1)]
        validity_years: u32,

        /// PKCS#12 password (omit to let the backend generate one)
        #[arg(long = "pkcs12-password")]
        pkcs12_password: Option<String>,

        /// Email the owning user about the new certificate
        #[arg(long)]
        notify: bool,
    },
    /// Delete a certificate
    Delete {
        #[arg(value_name = "ID")]
        id: i64,
    },
    /// Download a certificate's PKCS#12 bundle
    Download {
        #[arg(value_name = "ID")]
        id: i64,

        /// Output file (default: certificate-<id>.p12)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Subcommand)]
enum UsersCommands {
    /// List users
    List,
    /// Create a user
    Create {
        /// User name
        #[arg(long)]
        name: String,

        /// User email
        #[arg(long)]
        email: String,

        /// Initial password (omit for external-provider users)
        #[arg(long)]
        password: Option<String>,

        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },
    /// Delete a user
    Delete {
        #[arg(value_name = "ID")]
        id: i64,
    },
}

#[derive(clap::Subcommand)]
enum SettingsCommands {
    /// Show the backend settings as JSON
    Show,
    /// Replace the backend settings from a JSON file
    Apply {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set the backend server URL in the config file
    SetServer {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = crate::logging::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Local config commands never touch the backend.
    if let Commands::Config { command } = &cli.command {
        return commands::config::run(command);
    }

    let mut config = Config::load().context("load config")?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    let store = Arc::new(
        SessionStore::new(
            Gateway::new(config.server_url.clone()),
            SessionCache::cache_path(),
        )
        .with_hydrate_timeout(Duration::from_secs(config.hydrate_timeout_secs)),
    );

    match cli.command {
        Commands::Status => commands::status::run(&store).await,
        Commands::Setup {
            name,
            ca_name,
            ca_validity_years,
            password,
        } => commands::setup::run(&store, name, ca_name, ca_validity_years, password).await,
        Commands::Login {
            email,
            password,
            oidc,
        } => commands::auth::login(&store, email, password, oidc).await,
        Commands::Logout => commands::auth::logout(&store),
        Commands::ChangePassword {
            old_password,
            new_password,
        } => commands::auth::change_password(&store, old_password, new_password).await,
        Commands::Open { target } => commands::open::run(&store, &target).await,
        Commands::Certs { command } => commands::certs::run(&store, command).await,
        Commands::Users { command } => commands::users::run(&store, command).await,
        Commands::Settings { command } => commands::settings::run(&store, command).await,
        Commands::Config { .. } => unreachable!("handled before store construction"),
    }
}
