pub mod binary;
pub mod dispatch;
pub mod options;
pub mod response;
pub mod wire;

use std::fmt;

use crate::codec::CodecError;
use crate::platform::PlatformError;

pub use dispatch::{Ceremony, CeremonyDirective, CeremonyOutcome, CeremonyState, perform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CeremonyKind {
    Registration,
    Authentication,
}

impl CeremonyKind {
    /// Tag used for this kind in server directives.
    pub fn as_str(&self) -> &'static str {
        match self {
            CeremonyKind::Registration => "registration",
            CeremonyKind::Authentication => "authentication",
        }
    }
}

impl fmt::Display for CeremonyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a ceremony produced no credential.
#[derive(Debug, thiserror::Error)]
pub enum AbortReason {
    #[error("platform returned no credential")]
    Declined,
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

#[derive(Debug, thiserror::Error)]
pub enum CeremonyError {
    #[error("malformed encoding in `{field}`: {source}")]
    MalformedEncoding {
        field: &'static str,
        #[source]
        source: CodecError,
    },
    #[error("unsupported credential type: {0}")]
    UnsupportedCredentialType(&'static str),
    #[error("unsupported response type: expected {expected} response, got {actual}")]
    UnsupportedResponseType {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("ceremony aborted: {0}")]
    CeremonyAborted(#[from] AbortReason),
    #[error("unreachable ceremony kind: {0:?}")]
    UnreachableVariant(String),
    #[error("invalid directive: {0}")]
    InvalidDirective(#[from] serde_json::Error),
    #[error("ceremony already ran")]
    AlreadyRan,
}

impl CeremonyError {
    /// Aborts are expected outcomes; the caller may start over with fresh options.
    pub fn is_aborted(&self) -> bool {
        matches!(self, CeremonyError::CeremonyAborted(_))
    }
}

pub(crate) fn decode_field(field: &'static str, text: &str) -> Result<Vec<u8>, CeremonyError> {
    crate::codec::decode(text).map_err(|source| CeremonyError::MalformedEncoding { field, source })
}
