use crate::authenticator::CredentialRecord;
use crate::ceremony::binary::RegistrationOptions;

pub struct UpPrompt {
    pub title: String,
    pub description: String,
}

impl UpPrompt {
    /// Confirmation before creating a key for `options.user` at `rp_id`.
    pub(crate) fn registration(rp_id: &str, options: &RegistrationOptions) -> Self {
        let account = account_label(&options.user.display_name, &options.user.name);
        Self {
            title: format!("Create passkey for {}", site_label(rp_id, &options.rp.name)),
            description: format!("A new passkey will be stored for {account}. Confirm to continue."),
        }
    }

    /// Confirmation before signing with `record`.
    pub(crate) fn assertion(record: &CredentialRecord) -> Self {
        let account = account_label(
            record.user_display.as_deref().unwrap_or_default(),
            record.user_name.as_deref().unwrap_or_default(),
        );
        let site = site_label(&record.rp_id, record.rp_name.as_deref().unwrap_or_default());
        Self {
            title: format!("Sign in to {site}"),
            description: format!(
                "Sign in as {account}. This passkey has been used {} time(s).",
                record.sign_count
            ),
        }
    }
}

fn site_label(rp_id: &str, rp_name: &str) -> String {
    if rp_name.is_empty() || rp_name == rp_id {
        rp_id.to_string()
    } else {
        format!("{rp_name} ({rp_id})")
    }
}

// Display name, then account name
fn account_label<'a>(display: &'a str, name: &'a str) -> &'a str {
    [display, name]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or("an unnamed account")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_label() {
        assert_eq!(site_label("example.com", "Example"), "Example (example.com)");
        assert_eq!(site_label("example.com", ""), "example.com");
        assert_eq!(site_label("example.com", "example.com"), "example.com");
    }

    #[test]
    fn test_account_label_falls_back_to_name() {
        assert_eq!(account_label("Alice", "alice"), "Alice");
        assert_eq!(account_label("", "alice"), "alice");
        assert_eq!(account_label("", ""), "an unnamed account");
    }

    #[test]
    fn test_assertion_prompt_names_site_and_account() {
        let record = CredentialRecord {
            credential_id: vec![1],
            rp_id: "example.com".into(),
            rp_id_hash: [0; 32],
            rp_name: Some("Example".into()),
            user_id: vec![2],
            user_name: Some("alice".into()),
            user_display: None,
            signing_key: p256::ecdsa::SigningKey::from_bytes(&[9u8; 32].into()).unwrap(),
            sign_count: 3,
            created_at: 0,
            discoverable: true,
        };
        let prompt = UpPrompt::assertion(&record);
        assert_eq!(prompt.title, "Sign in to Example (example.com)");
        assert!(prompt.description.starts_with("Sign in as alice."));
        assert!(prompt.description.contains("3 time(s)"));
    }
}
