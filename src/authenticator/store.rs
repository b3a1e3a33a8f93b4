use std::collections::HashMap;
use std::fmt;

use p256::ecdsa::SigningKey;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

#[derive(Clone)]
pub struct CredentialRecord {
    pub credential_id: Vec<u8>, // 32 bytes random
    pub rp_id:         String,
    pub rp_id_hash:    [u8; 32], // SHA-256(rp_id)
    pub rp_name:       Option<String>,
    pub user_id:       Vec<u8>,
    pub user_name:     Option<String>,
    pub user_display:  Option<String>,
    pub signing_key:   SigningKey,
    pub sign_count:    u32,
    pub created_at:    u64, // Unix timestamp
    pub discoverable:  bool,
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("credential_id", &crate::codec::encode(&self.credential_id))
            .field("rp_id", &self.rp_id)
            .field("user_name", &self.user_name)
            .field("sign_count", &self.sign_count)
            .field("created_at", &self.created_at)
            .field("discoverable", &self.discoverable)
            .finish_non_exhaustive()
    }
}

/// In-memory credential index. Nothing survives the process.
#[derive(Default)]
pub struct CredentialStore {
    by_id: HashMap<[u8; 32], CredentialRecord>,
    by_rp: HashMap<[u8; 32], Vec<[u8; 32]>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: CredentialRecord) -> Result<(), StoreError> {
        let id: [u8; 32] = record
            .credential_id
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::InvalidRecord("credential_id not 32 bytes".into()))?;
        self.by_rp.entry(record.rp_id_hash).or_default().push(id);
        self.by_id.insert(id, record);
        Ok(())
    }

    /// Look up by credential_id (for allow-list assertions).
    pub fn get_by_id(&self, id: &[u8]) -> Option<&CredentialRecord> {
        let id: [u8; 32] = id.try_into().ok()?;
        self.by_id.get(&id)
    }

    /// Look up all credentials for an rpIdHash (for discoverable/passkey flow).
    /// Returns records sorted by created_at descending (most recent first).
    pub fn get_by_rp_hash(&self, rp_id_hash: &[u8]) -> Vec<&CredentialRecord> {
        let rp: [u8; 32] = match rp_id_hash.try_into() {
            Ok(r) => r,
            Err(_) => return Vec::new(),
        };
        let Some(ids) = self.by_rp.get(&rp) else {
            return Vec::new();
        };
        let mut records: Vec<&CredentialRecord> =
            ids.iter().rev().filter_map(|id| self.by_id.get(id)).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Increment and return the signature counter for `id`.
    pub fn bump_sign_count(&mut self, id: &[u8]) -> Option<u32> {
        let id: [u8; 32] = id.try_into().ok()?;
        let record = self.by_id.get_mut(&id)?;
        record.sign_count = record.sign_count.wrapping_add(1);
        Some(record.sign_count)
    }

    pub fn credential_count(&self) -> usize {
        self.by_id.len()
    }
}
