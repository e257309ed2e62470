//! Error types for cipher operations

use thiserror::Error;

/// Errors from sealing and opening
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Key is not [`crate::KEY_LEN`] bytes
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Required key length
        expected: usize,
        /// Supplied key length
        actual: usize,
    },

    /// Sealed input shorter than nonce plus tag
    #[error("sealed data truncated ({actual} < {minimum})")]
    Truncated {
        /// Bytes supplied
        actual: usize,
        /// Smallest possible sealed length
        minimum: usize,
    },

    /// The AEAD refused to seal (plaintext beyond the cipher's limit)
    #[error("encryption failed")]
    EncryptionFailed,

    /// Authentication tag mismatch
    ///
    /// Deliberately carries no reason: a wrong key and damaged ciphertext
    /// are indistinguishable to the caller.
    #[error("decryption failed")]
    DecryptionFailed,
}

impl CipherError {
    /// Returns true if the error is an authentication failure.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::DecryptionFailed)
    }
}
