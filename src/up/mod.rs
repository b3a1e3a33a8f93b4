pub(crate) mod pinentry;
pub(crate) mod prompt;

use async_trait::async_trait;

pub use pinentry::{AutoConfirm, Pinentry};
pub use prompt::UpPrompt;

/// Evidence that a presence check passed. Signing requires one.
pub struct UserPresenceProof {
    pub(crate) _private: (),
}

#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("user denied")]
    Denied,
    #[error("user action timeout")]
    Timeout,
    #[error("presence check unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PresenceCheck: Send + Sync {
    async fn confirm(&self, prompt: &UpPrompt) -> Result<UserPresenceProof, PresenceError>;
}
