use ciborium::value::Value;

use crate::platform::PlatformError;

/// Build the WebAuthn attestation object.
///
/// With a signature this is "packed" self-attestation; without one it is
/// the "none" format with an empty statement.
pub(crate) fn build_attestation_object(
    auth_data: &[u8],
    der_sig: Option<&[u8]>,
) -> Result<Vec<u8>, PlatformError> {
    let (fmt, stmt) = match der_sig {
        Some(sig) => (
            "packed",
            vec![
                (
                    Value::Text("alg".to_string()),
                    Value::Integer(super::COSE_ALG_ES256.into()),
                ),
                (Value::Text("sig".to_string()), Value::Bytes(sig.to_vec())),
            ],
        ),
        None => ("none", vec![]),
    };
    let map = Value::Map(vec![
        (Value::Text("fmt".to_string()), Value::Text(fmt.to_string())),
        (Value::Text("attStmt".to_string()), Value::Map(stmt)),
        (Value::Text("authData".to_string()), Value::Bytes(auth_data.to_vec())),
    ]);
    let mut buf = Vec::new();
    ciborium::into_writer(&map, &mut buf).map_err(|e| PlatformError::Internal(format!("cbor: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(map: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
        map.iter()
            .find(|(k, _)| matches!(k, Value::Text(s) if s == key))
            .map(|(_, v)| v)
    }

    #[test]
    fn test_packed_attestation_object() {
        let obj = build_attestation_object(&[1, 2, 3], Some(&[9, 9])).unwrap();
        let Value::Map(map) = ciborium::from_reader::<Value, _>(obj.as_slice()).unwrap() else {
            panic!("not a map")
        };
        assert_eq!(field(&map, "fmt"), Some(&Value::Text("packed".into())));
        assert_eq!(field(&map, "authData"), Some(&Value::Bytes(vec![1, 2, 3])));
        let Some(Value::Map(stmt)) = field(&map, "attStmt") else {
            panic!("attStmt missing")
        };
        assert_eq!(field(stmt, "sig"), Some(&Value::Bytes(vec![9, 9])));
        assert_eq!(field(stmt, "alg"), Some(&Value::Integer((-7i64).into())));
    }

    #[test]
    fn test_none_attestation_object() {
        let obj = build_attestation_object(&[1], None).unwrap();
        let Value::Map(map) = ciborium::from_reader::<Value, _>(obj.as_slice()).unwrap() else {
            panic!("not a map")
        };
        assert_eq!(field(&map, "fmt"), Some(&Value::Text("none".into())));
        assert_eq!(field(&map, "attStmt"), Some(&Value::Map(vec![])));
    }
}
