use std::time::Duration;

use async_trait::async_trait;

use super::{PresenceCheck, PresenceError, UpPrompt, UserPresenceProof};

/// Asks through a pinentry confirmation dialog.
pub struct Pinentry {
    binary: String,
    timeout: Duration,
}

impl Pinentry {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self { binary: binary.into(), timeout }
    }
}

// Blocks until the dialog closes.
fn ask(binary: &str, prompt: &UpPrompt) -> Result<(), PresenceError> {
    let mut dialog = pinentry::ConfirmationDialog::with_binary(binary).ok_or_else(|| {
        PresenceError::Unavailable(format!("pinentry binary '{binary}' not found"))
    })?;
    let confirmed = dialog
        .with_title(&prompt.title)
        .with_ok("Confirm")
        .with_cancel("Deny")
        .confirm(&prompt.description);
    match confirmed {
        Ok(true) => Ok(()),
        Ok(false) => Err(PresenceError::Denied),
        Err(pinentry::Error::Timeout) => Err(PresenceError::Timeout),
        Err(pinentry::Error::Io(e)) => Err(PresenceError::Unavailable(e.to_string())),
        Err(e) => {
            tracing::debug!(error = %e, "pinentry dialog failed");
            Err(PresenceError::Denied)
        }
    }
}

#[async_trait]
impl PresenceCheck for Pinentry {
    async fn confirm(&self, prompt: &UpPrompt) -> Result<UserPresenceProof, PresenceError> {
        let binary = self.binary.clone();
        let prompt = UpPrompt { title: prompt.title.clone(), description: prompt.description.clone() };
        let dialog = tokio::task::spawn_blocking(move || ask(&binary, &prompt));

        match tokio::time::timeout(self.timeout, dialog).await {
            Err(_) => Err(PresenceError::Timeout),
            Ok(Err(join)) => Err(PresenceError::Unavailable(join.to_string())),
            Ok(Ok(answer)) => answer.map(|()| UserPresenceProof { _private: () }),
        }
    }
}

/// Confirms every prompt without asking. For `--yes` and tests.
pub struct AutoConfirm;

#[async_trait]
impl PresenceCheck for AutoConfirm {
    async fn confirm(&self, prompt: &UpPrompt) -> Result<UserPresenceProof, PresenceError> {
        tracing::debug!(title = %prompt.title, "User presence auto-confirmed");
        Ok(UserPresenceProof { _private: () })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> UpPrompt {
        UpPrompt { title: "t".into(), description: "d".into() }
    }

    #[tokio::test]
    async fn test_auto_confirm() {
        assert!(AutoConfirm.confirm(&prompt()).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_pinentry_binary_is_unavailable() {
        let check = Pinentry::new("/nonexistent/pinentry-ceremonium", Duration::from_secs(5));
        let res = check.confirm(&prompt()).await;
        assert!(matches!(res, Err(PresenceError::Unavailable(_))));
    }
}
