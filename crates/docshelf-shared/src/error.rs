use thiserror::Error;

/// Failures of the blob text codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Corrupt blob encoding: {0}")]
    CorruptBlobEncoding(String),
}
