use serde::Serialize;

use crate::ceremony::CeremonyKind;
use crate::codec;
use crate::platform::PlatformError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectedClientData<'a> {
    #[serde(rename = "type")]
    type_: &'static str,
    challenge: String,
    origin: &'a str,
    cross_origin: bool,
}

/// Serialize the client data the relying party will check the challenge against.
pub(crate) fn build_client_data(
    kind: CeremonyKind,
    challenge: &[u8],
    origin: &str,
) -> Result<Vec<u8>, PlatformError> {
    let type_ = match kind {
        CeremonyKind::Registration => "webauthn.create",
        CeremonyKind::Authentication => "webauthn.get",
    };
    serde_json::to_vec(&CollectedClientData {
        type_,
        challenge: codec::encode(challenge),
        origin,
        cross_origin: false,
    })
    .map_err(|e| PlatformError::Internal(format!("client data: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_data_fields() {
        let json = build_client_data(CeremonyKind::Authentication, &[1, 2, 3], "https://example.com").unwrap();
        let v: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(v["type"], "webauthn.get");
        assert_eq!(v["challenge"], "AQID");
        assert_eq!(v["origin"], "https://example.com");
        assert_eq!(v["crossOrigin"], false);
    }

    #[test]
    fn test_client_data_create_type() {
        let json = build_client_data(CeremonyKind::Registration, &[], "https://example.com").unwrap();
        let v: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(v["type"], "webauthn.create");
    }
}
