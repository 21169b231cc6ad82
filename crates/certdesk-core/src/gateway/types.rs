//! Request and response shapes for the backend API.

use serde::{Deserialize, Serialize};

/// Response of `GET /is_setup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsSetupResponse {
    /// Whether first-time setup has completed
    pub setup: bool,
    /// Whether password login is offered
    pub password: bool,
    /// External identity provider login URL; empty when none is configured
    #[serde(default)]
    pub oidc: String,
}

/// Request body of `POST /setup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupRequest {
    pub name: String,
    pub ca_name: String,
    pub ca_validity_in_years: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Request body of `POST /auth/login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Response of `POST /auth/login` and `GET /auth/oidc/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token for the authenticated session
    pub token: String,
}

/// Request body of `POST /auth/change_password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_password: Option<String>,
    pub new_password: String,
}

/// Role of a backend user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum UserRole {
    User,
    Admin,
}

impl From<UserRole> for u8 {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::User => 0,
            UserRole::Admin => 1,
        }
    }
}

impl TryFrom<u8> for UserRole {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(UserRole::User),
            1 => Ok(UserRole::Admin),
            other => Err(format!("unknown user role: {other}")),
        }
    }
}

/// A backend user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub has_password: bool,
    pub role: UserRole,
}

/// Request body of `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub user_name: String,
    pub user_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: UserRole,
}

/// Kind of an issued certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CertificateType {
    Client,
    Server,
    Ca,
}

impl From<CertificateType> for u8 {
    fn from(kind: CertificateType) -> Self {
        match kind {
            CertificateType::Client => 0,
            CertificateType::Server => 1,
            CertificateType::Ca => 2,
        }
    }
}

impl TryFrom<u8> for CertificateType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CertificateType::Client),
            1 => Ok(CertificateType::Server),
            2 => Ok(CertificateType::Ca),
            other => Err(format!("unknown certificate type: {other}")),
        }
    }
}

/// An issued certificate.
///
/// Timestamps are UNIX epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: i64,
    pub name: String,
    pub created_on: i64,
    pub valid_until: i64,
    pub pkcs12_password: String,
    pub certificate_type: CertificateType,
    pub user_id: i64,
}

/// Request body of `POST /certificates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateRequirements {
    pub cert_name: String,
    pub user_id: i64,
    pub validity_in_years: u32,
    pub system_generated_password: bool,
    pub pkcs12_password: String,
    pub notify_user: bool,
}

/// SMTP transport encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Encryption {
    None,
    Tls,
    StartTls,
}

impl From<Encryption> for u8 {
    fn from(enc: Encryption) -> Self {
        match enc {
            Encryption::None => 0,
            Encryption::Tls => 1,
            Encryption::StartTls => 2,
        }
    }
}

impl TryFrom<u8> for Encryption {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Encryption::None),
            1 => Ok(Encryption::Tls),
            2 => Ok(Encryption::StartTls),
            other => Err(format!("unknown encryption mode: {other}")),
        }
    }
}

/// Backend settings, `GET/PUT /settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub common: CommonSettings,
    pub mail: MailSettings,
    pub oidc: OidcSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonSettings {
    pub password_enabled: bool,
    pub server_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub encryption: Encryption,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OidcSettings {
    pub id: String,
    pub secret: String,
    pub auth_url: String,
    pub callback_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: integer-tagged enums round-trip through their wire values.
    #[test]
    fn test_role_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "1");
        let role: UserRole = serde_json::from_str("0").unwrap();
        assert_eq!(role, UserRole::User);
    }

    /// Test: unknown enum values are rejected, not mapped silently.
    #[test]
    fn test_unknown_role_rejected() {
        let result: Result<UserRole, _> = serde_json::from_str("7");
        assert!(result.is_err());
    }

    /// Test: user record deserializes from the backend shape.
    #[test]
    fn test_user_from_backend_json() {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "name": "admin", "email": "admin@example.com", "has_password": true, "role": 1}"#,
        )
        .unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert!(user.has_password);
    }

    /// Test: login request omits absent credential fields.
    #[test]
    fn test_login_request_omits_absent_fields() {
        let req = LoginRequest {
            email: None,
            password: Some("secret".to_string()),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"password":"secret"}"#);
    }

    /// Test: missing oidc field defaults to empty.
    #[test]
    fn test_is_setup_missing_oidc_defaults_empty() {
        let resp: IsSetupResponse =
            serde_json::from_str(r#"{"setup": true, "password": true}"#).unwrap();
        assert!(resp.oidc.is_empty());
    }
}
