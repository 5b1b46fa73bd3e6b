use thiserror::Error;

/// Errors produced by the certificate exchange core.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Invalid base64 encoding: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Partner public key is not a valid P-256 point")]
    MalformedPublicKey,

    #[error("No shared secret established - run key agreement first")]
    SharedSecretMissing,

    #[error("Encrypted block is missing the IV|ciphertext delimiter")]
    MissingDelimiter,

    #[error("Symmetric key must be {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Initialization vector must be {expected} bytes, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("Decryption failed - invalid padding, wrong key or corrupted block")]
    DecryptionFailed,
}

/// Result type for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;
