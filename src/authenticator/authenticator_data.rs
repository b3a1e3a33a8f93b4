use ciborium::value::Value;
use p256::ecdsa::VerifyingKey;

use super::store::CredentialRecord;
use crate::platform::PlatformError;

pub(crate) const FLAG_UP: u8 = 0x01;
pub(crate) const FLAG_AT: u8 = 0x40;

const COSE_KTY_EC2: i64 = 2;
const COSE_CRV_P256: i64 = 1;

/// authData for a freshly created `record`: its counter, then the AAGUID,
/// credential id and COSE public key.
pub(crate) fn attested(record: &CredentialRecord) -> Result<Vec<u8>, PlatformError> {
    let id_len = u16::try_from(record.credential_id.len())
        .map_err(|_| PlatformError::Internal("credential id too long".into()))?;
    let cose_key = cose_key(record.signing_key.verifying_key())?;

    let mut data = header(record, FLAG_UP | FLAG_AT);
    data.extend_from_slice(&crate::config::AAGUID);
    data.extend_from_slice(&id_len.to_be_bytes());
    data.extend_from_slice(&record.credential_id);
    data.extend_from_slice(&cose_key);
    Ok(data)
}

/// authData for an assertion by `record` at its current counter.
pub(crate) fn asserted(record: &CredentialRecord) -> Vec<u8> {
    header(record, FLAG_UP)
}

fn header(record: &CredentialRecord, flags: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(37);
    data.extend_from_slice(&record.rp_id_hash);
    data.push(flags);
    data.extend_from_slice(&record.sign_count.to_be_bytes());
    data
}

fn cose_key(key: &VerifyingKey) -> Result<Vec<u8>, PlatformError> {
    let point = key.to_encoded_point(false);
    let (Some(x), Some(y)) = (point.x(), point.y()) else {
        return Err(PlatformError::Internal("public key point is not uncompressed".into()));
    };
    let map = Value::Map(vec![
        (Value::Integer(1i64.into()), Value::Integer(COSE_KTY_EC2.into())),
        (Value::Integer(3i64.into()), Value::Integer(super::COSE_ALG_ES256.into())),
        (Value::Integer((-1i64).into()), Value::Integer(COSE_CRV_P256.into())),
        (Value::Integer((-2i64).into()), Value::Bytes(x.to_vec())),
        (Value::Integer((-3i64).into()), Value::Bytes(y.to_vec())),
    ]);
    let mut buf = Vec::new();
    ciborium::into_writer(&map, &mut buf).map_err(|e| PlatformError::Internal(format!("cbor: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::SigningKey;
    use sha2::{Digest, Sha256};

    fn record(sign_count: u32) -> CredentialRecord {
        CredentialRecord {
            credential_id: vec![0x77; 32],
            rp_id: "example.com".into(),
            rp_id_hash: Sha256::digest(b"example.com").into(),
            rp_name: None,
            user_id: vec![4, 5],
            user_name: None,
            user_display: None,
            signing_key: SigningKey::from_bytes(&[9u8; 32].into()).unwrap(),
            sign_count,
            created_at: 0,
            discoverable: false,
        }
    }

    fn int(map: &[(Value, Value)], key: i64) -> Option<&Value> {
        map.iter().find_map(|(k, v)| match k {
            Value::Integer(i) if i128::from(*i) == key as i128 => Some(v),
            _ => None,
        })
    }

    #[test]
    fn test_attested_embeds_record_key() {
        let rec = record(0);
        let data = attested(&rec).unwrap();
        assert_eq!(data[32], FLAG_UP | FLAG_AT);
        assert_eq!(&data[37..53], &crate::config::AAGUID);
        assert_eq!(u16::from_be_bytes([data[53], data[54]]), 32);
        assert_eq!(&data[55..87], rec.credential_id.as_slice());

        let Value::Map(cose) = ciborium::from_reader::<Value, _>(&data[87..]).unwrap() else {
            panic!("COSE key is not a map")
        };
        let (Some(Value::Bytes(x)), Some(Value::Bytes(y))) = (int(&cose, -2), int(&cose, -3)) else {
            panic!("coordinates missing")
        };
        let mut sec1 = vec![0x04];
        sec1.extend_from_slice(x);
        sec1.extend_from_slice(y);
        assert_eq!(
            &VerifyingKey::from_sec1_bytes(&sec1).unwrap(),
            rec.signing_key.verifying_key()
        );
    }

    #[test]
    fn test_asserted_follows_record_counter() {
        let mut rec = record(0);
        for count in [1u32, 2, 0xffff_ffff] {
            rec.sign_count = count;
            let data = asserted(&rec);
            assert_eq!(data.len(), 37);
            assert_eq!(&data[..32], rec.rp_id_hash.as_slice());
            // no attested credential on assertions
            assert_eq!(data[32], FLAG_UP);
            assert_eq!(u32::from_be_bytes(data[33..37].try_into().unwrap()), count);
        }
    }

    #[test]
    fn test_attested_and_asserted_share_header() {
        let rec = record(3);
        assert_eq!(attested(&rec).unwrap()[33..37], asserted(&rec)[33..37]);
    }
}
