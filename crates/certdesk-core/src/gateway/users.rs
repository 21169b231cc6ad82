//! User administration endpoints.

use super::types::{CreateUserRequest, User};
use super::{Gateway, GatewayError};

impl Gateway {
    /// Lists all users.
    pub async fn users(&self) -> Result<Vec<User>, GatewayError> {
        self.get_json("/users").await
    }

    /// Creates a user and returns the stored record.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User, GatewayError> {
        self.post_json("/users", request).await
    }

    /// Deletes a user by id.
    pub async fn delete_user(&self, id: i64) -> Result<(), GatewayError> {
        self.delete_unit(&format!("/users/{id}")).await
    }
}
