//! Blob text codec.
//!
//! Blobs are persisted in a text-only key/value store, so the binary payload
//! is carried inside an RFC 2397 data URL:
//!
//! ```text
//! data:<mime>;base64,<standard base64 payload>
//! ```
//!
//! [`decode`] is the exact inverse of [`encode`] for both the MIME type and
//! the bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";
const DELIMITER: &str = ";base64,";

/// Binary content of an uploaded file together with its MIME type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Blob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Blob {
    pub fn new(mime: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// BLAKE3 digest over MIME type and content, hex encoded.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.mime.as_bytes());
        hasher.update(&[0]);
        hasher.update(&self.bytes);
        hasher.finalize().to_hex().to_string()
    }

    /// Human-readable size, e.g. `"2.40 MB"`.
    pub fn display_size(&self) -> String {
        format!("{:.2} MB", self.bytes.len() as f64 / 1024.0 / 1024.0)
    }
}

pub fn encode(blob: &Blob) -> String {
    let payload = STANDARD.encode(&blob.bytes);
    let mut out =
        String::with_capacity(SCHEME.len() + blob.mime.len() + BASE64_MARKER.len() + 1 + payload.len());
    out.push_str(SCHEME);
    out.push_str(&blob.mime);
    out.push_str(BASE64_MARKER);
    out.push(',');
    out.push_str(&payload);
    out
}

pub fn decode(text: &str) -> Result<Blob, CodecError> {
    let rest = text
        .strip_prefix(SCHEME)
        .ok_or_else(|| CodecError::CorruptBlobEncoding("missing data: scheme".into()))?;

    if !rest.contains(',') {
        return Err(CodecError::CorruptBlobEncoding("missing ',' delimiter".into()));
    }

    // The payload alphabet has neither ',' nor ';', so the last marker ends
    // the header even when the MIME type itself contains commas.
    let (mime, payload) = rest
        .rsplit_once(DELIMITER)
        .ok_or_else(|| CodecError::CorruptBlobEncoding("payload is not base64".into()))?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| CodecError::CorruptBlobEncoding(e.to_string()))?;

    Ok(Blob {
        mime: mime.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let blob = Blob::new("text/plain", b"hi".to_vec());
        assert_eq!(encode(&blob), "data:text/plain;base64,aGk=");
    }

    #[test]
    fn test_decode_reverses_encode() {
        let bytes: Vec<u8> = (0..=255u8).cycle().take(4099).collect();
        let blob = Blob::new("application/pdf", bytes);

        let decoded = decode(&encode(&blob)).unwrap();
        assert_eq!(decoded, blob);
    }

    #[test]
    fn test_empty_mime_and_payload() {
        let blob = Blob::new("", Vec::new());
        let text = encode(&blob);
        assert_eq!(text, "data:;base64,");
        assert_eq!(decode(&text).unwrap(), blob);
    }

    #[test]
    fn test_mime_parameters_survive() {
        let blob = Blob::new("text/plain;charset=utf-8", b"caf\xc3\xa9".to_vec());
        assert_eq!(decode(&encode(&blob)).unwrap(), blob);
    }

    #[test]
    fn test_mime_with_comma_survives() {
        let blob = Blob::new("multipart/mixed; boundary=\"a,b\"", b"x".to_vec());
        assert_eq!(decode(&encode(&blob)).unwrap(), blob);

        let tricky = Blob::new("text/x;base64,odd", b"yz".to_vec());
        assert_eq!(decode(&encode(&tricky)).unwrap(), tricky);
    }

    #[test]
    fn test_missing_delimiter_is_corrupt() {
        let err = decode("data:text/plain;base64").unwrap_err();
        assert!(matches!(err, CodecError::CorruptBlobEncoding(_)));
    }

    #[test]
    fn test_missing_scheme_is_corrupt() {
        assert!(decode("placeholder").is_err());
        assert!(decode("").is_err());
    }

    #[test]
    fn test_invalid_payload_is_corrupt() {
        assert!(decode("data:text/plain;base64,@@@@").is_err());
    }

    #[test]
    fn test_non_base64_data_url_rejected() {
        assert!(decode("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_display_size() {
        let blob = Blob::new("application/octet-stream", vec![0u8; 1024 * 1024 + 512 * 1024]);
        assert_eq!(blob.display_size(), "1.50 MB");
        assert_eq!(Blob::new("", Vec::new()).display_size(), "0.00 MB");
    }

    #[test]
    fn test_digest_covers_mime() {
        let a = Blob::new("text/plain", b"x".to_vec());
        let b = Blob::new("text/html", b"x".to_vec());
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.digest(), a.clone().digest());
    }
}
