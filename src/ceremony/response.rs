use crate::codec;

use super::binary::{AuthenticatorResponse, Credential, PublicKeyCredential};
use super::{CeremonyError, CeremonyKind, CeremonyOutcome, wire};

/// Encode a finished ceremony's credential for submission.
pub fn to_wire(credential: Credential, expected: CeremonyKind) -> Result<CeremonyOutcome, CeremonyError> {
    match expected {
        CeremonyKind::Registration => registration_to_wire(credential).map(CeremonyOutcome::Registered),
        CeremonyKind::Authentication => {
            authentication_to_wire(credential).map(CeremonyOutcome::Authenticated)
        }
    }
}

fn public_key(credential: Credential) -> Result<PublicKeyCredential, CeremonyError> {
    match credential {
        Credential::PublicKey(pk) => Ok(pk),
        other => Err(CeremonyError::UnsupportedCredentialType(other.kind())),
    }
}

pub fn registration_to_wire(credential: Credential) -> Result<wire::RegistrationCredential, CeremonyError> {
    let pk = public_key(credential)?;
    let attestation = match pk.response {
        AuthenticatorResponse::Attestation(a) => a,
        other => {
            return Err(CeremonyError::UnsupportedResponseType {
                expected: "attestation",
                actual: other.kind(),
            });
        }
    };
    Ok(wire::RegistrationCredential {
        id: pk.id,
        raw_id: codec::encode(&pk.raw_id),
        type_: pk.type_,
        response: wire::AttestationResponse {
            client_data_json: codec::encode(&attestation.client_data_json),
            attestation_object: codec::encode(&attestation.attestation_object),
            transports: attestation.transports,
        },
        authenticator_attachment: pk.authenticator_attachment,
        extensions: pk.client_extension_results,
    })
}

pub fn authentication_to_wire(
    credential: Credential,
) -> Result<wire::AuthenticationCredential, CeremonyError> {
    let pk = public_key(credential)?;
    let assertion = match pk.response {
        AuthenticatorResponse::Assertion(a) => a,
        other => {
            return Err(CeremonyError::UnsupportedResponseType {
                expected: "assertion",
                actual: other.kind(),
            });
        }
    };
    Ok(wire::AuthenticationCredential {
        id: pk.id,
        raw_id: codec::encode(&pk.raw_id),
        type_: pk.type_,
        response: wire::AssertionResponse {
            client_data_json: codec::encode(&assertion.client_data_json),
            authenticator_data: codec::encode(&assertion.authenticator_data),
            signature: codec::encode(&assertion.signature),
            user_handle: assertion.user_handle.as_ref().map(|h| codec::encode(h)),
        },
        authenticator_attachment: pk.authenticator_attachment,
        extensions: pk.client_extension_results,
    })
}
