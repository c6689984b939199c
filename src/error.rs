//! Error types for the protection handler

use thiserror::Error;

/// Main error type for protection operations
#[derive(Error, Debug)]
pub enum ProtectionError {
    /// A hook requiring key material ran before `set_protection`
    #[error("Protection has not been configured")]
    NotConfigured,

    /// `set_protection` was called twice on the same session
    #[error("Protection is already configured")]
    AlreadyConfigured,

    /// RC4 requires a non-empty key
    #[error("Invalid RC4 key length: {0}")]
    InvalidKeyLength(usize),

    /// Hex string token contained a non-hex digit
    #[error("Invalid hex string: {0}")]
    InvalidHexString(#[from] hex::FromHexError),

    /// The trailer hook ran before the encryption dictionary was emitted
    #[error("Encryption dictionary has not been emitted")]
    MissingEncryptionObject,
}

/// Result type for protection operations
pub type ProtectionResult<T> = Result<T, ProtectionError>;
