//! Backend settings endpoints.

use super::types::Settings;
use super::{Gateway, GatewayError};

impl Gateway {
    /// Fetches the backend settings.
    pub async fn settings(&self) -> Result<Settings, GatewayError> {
        self.get_json("/settings").await
    }

    /// Replaces the backend settings.
    pub async fn put_settings(&self, settings: &Settings) -> Result<(), GatewayError> {
        self.put_unit("/settings", settings).await
    }
}
