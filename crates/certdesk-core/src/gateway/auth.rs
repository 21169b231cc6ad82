//! Setup and authentication endpoints.

use super::types::{
    ChangePasswordRequest, IsSetupResponse, LoginRequest, LoginResponse, SetupRequest, User,
};
use super::{Gateway, GatewayError};

impl Gateway {
    /// Queries backend setup status. Never requires authentication.
    pub async fn is_setup(&self) -> Result<IsSetupResponse, GatewayError> {
        self.get_json("/is_setup").await
    }

    /// Runs first-time backend setup (root identity, CA, admin credential).
    pub async fn setup(&self, request: &SetupRequest) -> Result<(), GatewayError> {
        self.post_unit("/setup", request).await
    }

    /// Exchanges credentials for a bearer token.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, GatewayError> {
        self.post_json("/auth/login", request).await
    }

    /// Completes an external-identity-provider round trip.
    ///
    /// The provider redirect already established a session server-side; this
    /// call adopts it and returns the bearer token for it.
    pub async fn oidc_login(&self) -> Result<LoginResponse, GatewayError> {
        self.get_json("/auth/oidc/login").await
    }

    /// Returns the user the current token belongs to.
    pub async fn current_user(&self) -> Result<User, GatewayError> {
        self.get_json("/auth/me").await
    }

    /// Changes the current user's password.
    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<(), GatewayError> {
        self.post_unit("/auth/change_password", request).await
    }
}
