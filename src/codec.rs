use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),
}

/// Encode `bytes` as unpadded URL-safe text.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded URL-safe text back into bytes.
///
/// Fails on characters outside the alphabet, on `=` padding, and on
/// lengths or trailing bits that no call to [`encode`] could produce.
pub fn decode(text: impl AsRef<[u8]>) -> Result<Vec<u8>, CodecError> {
    URL_SAFE_NO_PAD
        .decode(text)
        .map_err(|e| CodecError::MalformedEncoding(e.to_string()))
}
