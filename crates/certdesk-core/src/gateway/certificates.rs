//! Certificate endpoints.

use super::types::{Certificate, CertificateRequirements};
use super::{Gateway, GatewayError};

impl Gateway {
    /// Lists certificates visible to the current user.
    pub async fn certificates(&self) -> Result<Vec<Certificate>, GatewayError> {
        self.get_json("/certificates").await
    }

    /// Creates a certificate and returns the stored record.
    pub async fn create_certificate(
        &self,
        requirements: &CertificateRequirements,
    ) -> Result<Certificate, GatewayError> {
        self.post_json("/certificates", requirements).await
    }

    /// Deletes a certificate by id.
    pub async fn delete_certificate(&self, id: i64) -> Result<(), GatewayError> {
        self.delete_unit(&format!("/certificates/{id}")).await
    }

    /// Downloads the PKCS#12 bundle for a certificate.
    pub async fn download_certificate(&self, id: i64) -> Result<Vec<u8>, GatewayError> {
        self.get_bytes(&format!("/certificates/{id}/download")).await
    }
}
