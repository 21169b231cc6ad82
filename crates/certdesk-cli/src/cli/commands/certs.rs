//! Certificate command handlers.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use certdesk_core::gateway::{Certificate, CertificateRequirements, CertificateType};
use certdesk_core::session::SessionStore;
use chrono::{DateTime, Utc};
use comfy_table::Table;

use super::{ensure_authenticated, gateway_failure};
use crate::cli::CertsCommands;

pub async fn run(store: &SessionStore, command: CertsCommands) -> Result<()> {
    match command {
        CertsCommands::List => list(store).await,
        CertsCommands::Create {
            name,
            user_id,
            validity_years,
            pkcs12_password,
            notify,
        } => create(store, name, user_id, validity_years, pkcs12_password, notify).await,
        CertsCommands::Delete { id } => delete(store, id).await,
        CertsCommands::Download { id, output } => download(store, id, output).await,
    }
}

pub async fn list(store: &SessionStore) -> Result<()> {
    ensure_authenticated(store).await?;

    let certificates = store
        .gateway()
        .certificates()
        .await
        .map_err(|e| gateway_failure(store, "Failed to fetch certificates", e))?;

    if certificates.is_empty() {
        println!("No certificates.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(["ID", "Name", "Type", "Created", "Valid until", "User"]);
    for cert in &certificates {
        table.add_row([
            cert.id.to_string(),
            cert.name.clone(),
            type_label(cert.certificate_type).to_string(),
            format_timestamp(cert.created_on),
            format_timestamp(cert.valid_until),
            cert.user_id.to_string(),
        ]);
    }
    println!("{table}");

    Ok(())
}

async fn create(
    store: &SessionStore,
    name: String,
    user_id: i64,
    validity_years: u32,
    pkcs12_password: Option<String>,
    notify: bool,
) -> Result<()> {
    ensure_authenticated(store).await?;

    let requirements = CertificateRequirements {
        cert_name: name,
        user_id,
        validity_in_years: validity_years,
        system_generated_password: pkcs12_password.is_none(),
        pkcs12_password: pkcs12_password.unwrap_or_default(),
        notify_user: notify,
    };

    let certificate: Certificate = store
        .gateway()
        .create_certificate(&requirements)
        .await
        .map_err(|e| gateway_failure(store, "Failed to create certificate", e))?;

    println!(
        "✓ Created certificate {} (id {}, valid until {})",
        certificate.name,
        certificate.id,
        format_timestamp(certificate.valid_until)
    );

    Ok(())
}

async fn delete(store: &SessionStore, id: i64) -> Result<()> {
    ensure_authenticated(store).await?;

    store
        .gateway()
        .delete_certificate(id)
        .await
        .map_err(|e| gateway_failure(store, "Failed to delete certificate", e))?;

    println!("✓ Deleted certificate {id}");
    Ok(())
}

async fn download(store: &SessionStore, id: i64, output: Option<PathBuf>) -> Result<()> {
    ensure_authenticated(store).await?;

    let bytes = store
        .gateway()
        .download_certificate(id)
        .await
        .map_err(|e| gateway_failure(store, "Failed to download certificate", e))?;

    let output = output.unwrap_or_else(|| PathBuf::from(format!("certificate-{id}.p12")));
    fs::write(&output, bytes)
        .with_context(|| format!("Failed to write certificate to {}", output.display()))?;

    println!("✓ Downloaded certificate {id} to {}", output.display());
    Ok(())
}

fn type_label(kind: CertificateType) -> &'static str {
    match kind {
        CertificateType::Client => "client",
        CertificateType::Server => "server",
        CertificateType::Ca => "ca",
    }
}

/// Formats a UNIX-milliseconds timestamp for display.
fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| millis.to_string())
}
