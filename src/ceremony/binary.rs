use serde_json::{Map, Value};

use super::wire::{AuthenticatorSelection, CredentialDescriptor, PubKeyCredParam, RelyingParty};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct UserEntity {
    pub id: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct RegistrationOptions {
    pub rp: RelyingParty,
    pub user: UserEntity,
    pub challenge: Vec<u8>,
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    pub timeout: Option<u32>,
    pub exclude_credentials: Vec<CredentialDescriptor>,
    pub authenticator_selection: Option<AuthenticatorSelection>,
    pub attestation: Option<String>,
    pub extensions: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct AuthenticationOptions {
    pub challenge: Vec<u8>,
    pub timeout: Option<u32>,
    pub rp_id: Option<String>,
    pub allow_credentials: Vec<CredentialDescriptor>,
    pub user_verification: Option<String>,
    pub extensions: Option<Value>,
}

/// Whatever the platform handed back from a ceremony.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    PublicKey(PublicKeyCredential),
    Password { id: String },
    Federated { id: String, provider: String },
}

impl Credential {
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::PublicKey(_) => "public-key",
            Credential::Password { .. } => "password",
            Credential::Federated { .. } => "federated",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublicKeyCredential {
    /// Text form of `raw_id`, as produced by the platform.
    pub id: String,
    pub raw_id: Vec<u8>,
    pub type_: String,
    pub authenticator_attachment: Option<String>,
    pub client_extension_results: Map<String, Value>,
    pub response: AuthenticatorResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthenticatorResponse {
    Attestation(AttestationResponse),
    Assertion(AssertionResponse),
}

impl AuthenticatorResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthenticatorResponse::Attestation(_) => "attestation",
            AuthenticatorResponse::Assertion(_) => "assertion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationResponse {
    pub client_data_json: Vec<u8>,
    pub attestation_object: Vec<u8>,
    pub transports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResponse {
    pub client_data_json: Vec<u8>,
    pub authenticator_data: Vec<u8>,
    pub signature: Vec<u8>,
    pub user_handle: Option<Vec<u8>>,
}
