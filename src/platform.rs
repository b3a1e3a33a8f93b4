use async_trait::async_trait;

use crate::ceremony::binary::{AuthenticationOptions, Credential, RegistrationOptions};

/// Reasons a platform refuses or abandons a ceremony.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("not allowed: {0}")]
    NotAllowed(String),
    #[error("user action timeout")]
    UserActionTimeout,
    #[error("cancelled")]
    Cancelled,
    #[error("credential excluded")]
    CredentialExcluded,
    #[error("no credentials")]
    NoCredentials,
    #[error("not supported: {0}")]
    NotSupported(String),
    #[error("security: {0}")]
    Security(String),
    #[error("{0}")]
    Internal(String),
}

/// Creates and retrieves public-key credentials.
///
/// Both operations may suspend for as long as the user takes to respond.
/// `Ok(None)` means the platform produced nothing.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn create_credential(
        &self,
        options: RegistrationOptions,
    ) -> Result<Option<Credential>, PlatformError>;

    async fn get_credential(
        &self,
        options: AuthenticationOptions,
    ) -> Result<Option<Credential>, PlatformError>;
}
