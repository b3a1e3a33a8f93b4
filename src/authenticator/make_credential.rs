use p256::ecdsa::SigningKey;
use rand::Rng;
use rand::rngs::OsRng;
use serde_json::{Map, json};
use sha2::{Digest, Sha256};

use super::attestation::build_attestation_object;
use super::authenticator_data;
use super::client_data::build_client_data;
use super::store::CredentialRecord;
use super::{COSE_ALG_ES256, PUBLIC_KEY_TYPE, SoftwareAuthenticator, sign};
use crate::ceremony::CeremonyKind;
use crate::ceremony::binary::{
    AttestationResponse, AuthenticatorResponse, Credential, PublicKeyCredential,
    RegistrationOptions,
};
use crate::codec;
use crate::platform::PlatformError;
use crate::up::{PresenceCheck, UpPrompt};

pub(crate) async fn make_credential<C: PresenceCheck>(
    auth: &SoftwareAuthenticator<C>,
    options: RegistrationOptions,
) -> Result<Credential, PlatformError> {
    // 1. Validate algorithm; an empty list means the ES256/RS256 defaults
    let alg_ok = options.pub_key_cred_params.is_empty()
        || options
            .pub_key_cred_params
            .iter()
            .any(|p| p.type_ == PUBLIC_KEY_TYPE && p.alg == COSE_ALG_ES256);
    if !alg_ok {
        return Err(PlatformError::NotSupported("ES256 not offered in pubKeyCredParams".into()));
    }

    let uv = options.authenticator_selection.as_ref().and_then(|s| s.user_verification.as_deref());
    super::check_user_verification(uv)?;

    // 2. Compute rp_id_hash and check excludeCredentials
    let rp_id = auth.effective_rp_id(options.rp.id.as_deref())?;
    let rp_id_hash: [u8; 32] = Sha256::digest(rp_id.as_bytes()).into();
    {
        let guard = auth.lock_store()?;
        for excluded in &options.exclude_credentials {
            let Ok(id) = codec::decode(&excluded.id) else {
                tracing::warn!(id = %excluded.id, "Ignoring undecodable excluded credential id");
                continue;
            };
            if let Some(cred) = guard.get_by_id(&id) {
                if cred.rp_id_hash == rp_id_hash {
                    return Err(PlatformError::CredentialExcluded);
                }
            }
        }
    }

    let client_data_json = build_client_data(
        CeremonyKind::Registration,
        &options.challenge,
        &auth.origin().origin().ascii_serialization(),
    )?;
    let client_data_hash = Sha256::digest(&client_data_json);

    // 3. User presence
    let prompt = UpPrompt::registration(&rp_id, &options);
    let proof = auth.confirm_presence(&prompt).await?;
    tracing::info!(rp_id = %rp_id, "User presence confirmed");

    // 4. Key pair and credential ID
    let discoverable = options.authenticator_selection.as_ref().is_some_and(|s| {
        s.require_resident_key == Some(true)
            || matches!(s.resident_key.as_deref(), Some("required" | "preferred"))
    });
    let created_at = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let cred_id: [u8; 32] = rand::thread_rng().r#gen();

    let record = CredentialRecord {
        credential_id: cred_id.to_vec(),
        rp_id: rp_id.clone(),
        rp_id_hash,
        rp_name: Some(options.rp.name).filter(|n| !n.is_empty()),
        user_id: options.user.id,
        user_name: Some(options.user.name).filter(|n| !n.is_empty()),
        user_display: Some(options.user.display_name).filter(|n| !n.is_empty()),
        signing_key: SigningKey::random(&mut OsRng),
        sign_count: 0,
        created_at,
        discoverable,
    };
    let auth_data = authenticator_data::attested(&record)?;

    // 5. Attestation object
    let attestation_object = if options.attestation.as_deref() == Some("none") {
        build_attestation_object(&auth_data, None)?
    } else {
        let der_sig = sign(&record.signing_key, &auth_data, &client_data_hash, &proof);
        build_attestation_object(&auth_data, Some(&der_sig))?
    };

    // 6. Store credential
    auth.lock_store()?
        .add(record)
        .map_err(|e| PlatformError::Internal(e.to_string()))?;
    let id = codec::encode(cred_id);
    tracing::info!(cred_id = %id, rp_id = %rp_id, discoverable, "Credential stored");

    let mut client_extension_results = Map::new();
    let cred_props_requested = options
        .extensions
        .as_ref()
        .and_then(|e| e.get("credProps"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if cred_props_requested {
        client_extension_results.insert("credProps".into(), json!({ "rk": discoverable }));
    }

    Ok(Credential::PublicKey(PublicKeyCredential {
        id,
        raw_id: cred_id.to_vec(),
        type_: PUBLIC_KEY_TYPE.to_string(),
        authenticator_attachment: Some("platform".to_string()),
        client_extension_results,
        response: AuthenticatorResponse::Attestation(AttestationResponse {
            client_data_json,
            attestation_object,
            transports: vec!["internal".to_string()],
        }),
    }))
}
