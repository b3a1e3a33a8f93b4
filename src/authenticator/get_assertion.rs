use serde_json::Map;
use sha2::{Digest, Sha256};

use super::authenticator_data;
use super::client_data::build_client_data;
use super::{PUBLIC_KEY_TYPE, SoftwareAuthenticator, sign};
use crate::ceremony::CeremonyKind;
use crate::ceremony::binary::{
    AssertionResponse, AuthenticationOptions, AuthenticatorResponse, Credential,
    PublicKeyCredential,
};
use crate::codec;
use crate::platform::PlatformError;
use crate::up::{PresenceCheck, UpPrompt};

pub(crate) async fn get_assertion<C: PresenceCheck>(
    auth: &SoftwareAuthenticator<C>,
    options: AuthenticationOptions,
) -> Result<Credential, PlatformError> {
    super::check_user_verification(options.user_verification.as_deref())?;

    let rp_id = auth.effective_rp_id(options.rp_id.as_deref())?;
    let rp_id_hash: [u8; 32] = Sha256::digest(rp_id.as_bytes()).into();

    // Find credential
    let mut cred = {
        let guard = auth.lock_store()?;
        let found = if !options.allow_credentials.is_empty() {
            options.allow_credentials.iter().find_map(|desc| {
                let id = match codec::decode(&desc.id) {
                    Ok(id) => id,
                    Err(_) => {
                        tracing::warn!(id = %desc.id, "Ignoring undecodable allowed credential id");
                        return None;
                    }
                };
                guard.get_by_id(&id).filter(|c| c.rp_id_hash == rp_id_hash)
            })
        } else {
            guard
                .get_by_rp_hash(&rp_id_hash)
                .into_iter()
                .find(|c| c.discoverable)
        };
        match found {
            Some(c) => c.clone(),
            None => return Err(PlatformError::NoCredentials),
        }
    };

    let client_data_json = build_client_data(
        CeremonyKind::Authentication,
        &options.challenge,
        &auth.origin().origin().ascii_serialization(),
    )?;
    let client_data_hash = Sha256::digest(&client_data_json);

    // User presence
    let prompt = UpPrompt::assertion(&cred);
    let proof = auth.confirm_presence(&prompt).await?;
    tracing::info!(rp_id = %rp_id, "User presence confirmed");

    cred.sign_count = auth
        .lock_store()?
        .bump_sign_count(&cred.credential_id)
        .ok_or(PlatformError::NoCredentials)?;
    tracing::debug!(count = cred.sign_count, "Counter incremented");

    let auth_data = authenticator_data::asserted(&cred);
    let signature = sign(&cred.signing_key, &auth_data, &client_data_hash, &proof);

    // The user handle identifies the account for discoverable credentials
    let user_handle = cred.discoverable.then(|| cred.user_id.clone());

    Ok(Credential::PublicKey(PublicKeyCredential {
        id: codec::encode(&cred.credential_id),
        raw_id: cred.credential_id,
        type_: PUBLIC_KEY_TYPE.to_string(),
        authenticator_attachment: Some("platform".to_string()),
        client_extension_results: Map::new(),
        response: AuthenticatorResponse::Assertion(AssertionResponse {
            client_data_json,
            authenticator_data: auth_data,
            signature,
            user_handle,
        }),
    }))
}
