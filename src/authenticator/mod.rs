pub(crate) mod attestation;
pub(crate) mod authenticator_data;
pub(crate) mod client_data;
pub(crate) mod get_assertion;
pub(crate) mod make_credential;
pub mod store;

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use p256::ecdsa::{DerSignature, SigningKey, signature::Signer};
use url::{Host, Url};

use crate::ceremony::binary::{AuthenticationOptions, Credential, RegistrationOptions};
use crate::platform::{Platform, PlatformError};
use crate::up::{PresenceCheck, PresenceError, UserPresenceProof};

pub use store::{CredentialRecord, CredentialStore, StoreError};

pub(crate) const COSE_ALG_ES256: i64 = -7;
pub(crate) const PUBLIC_KEY_TYPE: &str = "public-key";

pub struct SoftwareAuthenticator<C> {
    origin: Url,
    default_rp_id: Option<String>,
    store: Mutex<CredentialStore>,
    presence: C,
}

impl<C: PresenceCheck> SoftwareAuthenticator<C> {
    pub fn new(origin: Url, presence: C) -> Self {
        Self {
            origin,
            default_rp_id: None,
            store: Mutex::new(CredentialStore::new()),
            presence,
        }
    }

    /// Rp id used when a ceremony does not name one.
    pub fn with_default_rp_id(mut self, rp_id: impl Into<String>) -> Self {
        self.default_rp_id = Some(rp_id.into());
        self
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn credential_count(&self) -> usize {
        self.store.lock().map(|s| s.credential_count()).unwrap_or(0)
    }

    pub(crate) fn lock_store(&self) -> Result<MutexGuard<'_, CredentialStore>, PlatformError> {
        self.store
            .lock()
            .map_err(|_| PlatformError::Internal("credential store mutex poisoned".into()))
    }

    pub(crate) async fn confirm_presence(
        &self,
        prompt: &crate::up::UpPrompt,
    ) -> Result<UserPresenceProof, PlatformError> {
        self.presence.confirm(prompt).await.map_err(PlatformError::from)
    }

    /// The rp id the ceremony runs under. A requested or default id must be
    /// the origin's host or, for a domain host, a parent domain of it with at
    /// least two labels. With neither, the host.
    pub(crate) fn effective_rp_id(&self, requested: Option<&str>) -> Result<String, PlatformError> {
        let host = self
            .origin
            .host()
            .ok_or_else(|| PlatformError::Security(format!("origin {} has no host", self.origin)))?;
        let host_str = self.origin.host_str().unwrap_or_default();
        let Some(rp_id) = requested.or(self.default_rp_id.as_deref()) else {
            return Ok(host_str.to_string());
        };
        let valid = rp_id == host_str
            || match host {
                Host::Domain(domain) => {
                    rp_id.contains('.') && domain.ends_with(&format!(".{rp_id}"))
                }
                // addresses have no parent domain
                Host::Ipv4(_) | Host::Ipv6(_) => false,
            };
        if valid {
            Ok(rp_id.to_string())
        } else {
            Err(PlatformError::Security(format!(
                "rp id {rp_id} is not valid for origin {}",
                self.origin.origin().ascii_serialization()
            )))
        }
    }
}

/// Only user presence is checked, so a ceremony that requires
/// verification cannot be satisfied.
pub(crate) fn check_user_verification(requirement: Option<&str>) -> Result<(), PlatformError> {
    match requirement {
        Some("required") => Err(PlatformError::NotSupported(
            "user verification required but only user presence is available".into(),
        )),
        _ => Ok(()),
    }
}

impl From<PresenceError> for PlatformError {
    fn from(e: PresenceError) -> Self {
        match e {
            PresenceError::Denied => PlatformError::NotAllowed("user denied".into()),
            PresenceError::Timeout => PlatformError::UserActionTimeout,
            PresenceError::Unavailable(msg) => PlatformError::NotAllowed(msg),
        }
    }
}

/// ECDSA over `authData || SHA-256(clientDataJSON)`, DER encoded.
pub(crate) fn sign(
    key: &SigningKey,
    auth_data: &[u8],
    client_data_hash: &[u8],
    _proof: &UserPresenceProof,
) -> Vec<u8> {
    let mut to_sign = Vec::with_capacity(auth_data.len() + client_data_hash.len());
    to_sign.extend_from_slice(auth_data);
    to_sign.extend_from_slice(client_data_hash);
    let sig: DerSignature = key.sign(&to_sign);
    sig.to_bytes().to_vec()
}

#[async_trait]
impl<C: PresenceCheck> Platform for SoftwareAuthenticator<C> {
    async fn create_credential(
        &self,
        options: RegistrationOptions,
    ) -> Result<Option<Credential>, PlatformError> {
        make_credential::make_credential(self, options).await.map(Some)
    }

    async fn get_credential(
        &self,
        options: AuthenticationOptions,
    ) -> Result<Option<Credential>, PlatformError> {
        get_assertion::get_assertion(self, options).await.map(Some)
    }
}
