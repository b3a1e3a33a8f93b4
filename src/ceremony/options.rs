use super::{CeremonyError, CeremonyKind, binary, decode_field, wire};

/// Binary options for whichever ceremony a directive selected.
#[derive(Debug, Clone, PartialEq)]
pub enum BinaryOptions {
    Registration(binary::RegistrationOptions),
    Authentication(binary::AuthenticationOptions),
}

impl BinaryOptions {
    pub fn kind(&self) -> CeremonyKind {
        match self {
            BinaryOptions::Registration(_) => CeremonyKind::Registration,
            BinaryOptions::Authentication(_) => CeremonyKind::Authentication,
        }
    }
}

/// Decode the challenge and user handle; everything else passes through.
pub fn registration_to_binary(
    options: wire::RegistrationOptions,
) -> Result<binary::RegistrationOptions, CeremonyError> {
    let challenge = decode_field("challenge", &options.challenge)?;
    let user_id = decode_field("user.id", &options.user.id)?;
    Ok(binary::RegistrationOptions {
        rp: options.rp,
        user: binary::UserEntity {
            id: user_id,
            name: options.user.name,
            display_name: options.user.display_name,
        },
        challenge,
        pub_key_cred_params: options.pub_key_cred_params,
        timeout: options.timeout,
        exclude_credentials: options.exclude_credentials,
        authenticator_selection: options.authenticator_selection,
        attestation: options.attestation,
        extensions: options.extensions,
    })
}

/// Decode the challenge; everything else passes through.
pub fn authentication_to_binary(
    options: wire::AuthenticationOptions,
) -> Result<binary::AuthenticationOptions, CeremonyError> {
    let challenge = decode_field("challenge", &options.challenge)?;
    Ok(binary::AuthenticationOptions {
        challenge,
        timeout: options.timeout,
        rp_id: options.rp_id,
        allow_credentials: options.allow_credentials,
        user_verification: options.user_verification,
        extensions: options.extensions,
    })
}
