//! Keyring error types.
//!
//! Errors split into three families:
//!
//! - **Authentication**: the access key or stored ciphertext is wrong. The
//!   two cases are indistinguishable on purpose.
//! - **Corruption**: the bytes decode but do not describe a valid keyring.
//! - **Caller input**: bad key lengths or an empty initial key.
//!
//! Misuse of an already-loaded ring (unknown id, empty key) is a
//! programming error and panics instead; see the crate docs.

use std::io;

use keyring_crypto::CipherError;
use keyring_proto::{KeyId, PacketType, PartialParse, ProtocolError};
use thiserror::Error;

/// Result alias for keyring operations.
pub type Result<T> = std::result::Result<T, KeyringError>;

/// Errors from creating, loading, rekeying and saving a keyring.
#[derive(Error, Debug)]
pub enum KeyringError {
    /// Access key has the wrong length
    #[error("access key is {actual} bytes, want {expected}")]
    InvalidAccessKeyLength {
        /// Required length
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// New keyring requested without an initial key
    #[error("initial key is empty")]
    EmptyInitialKey,

    /// Container written by an unknown format version
    #[error("unsupported keyring version {0}")]
    UnsupportedVersion(u8),

    /// Reserved header bytes are not zero
    #[error("reserved header bytes are not zero ({0:02x?})")]
    NonZeroReserved([u8; 2]),

    /// A required packet is absent
    #[error("missing {0} packet")]
    MissingPacket(PacketType),

    /// A packet that may occur once appears again
    #[error("duplicate {0} packet")]
    DuplicatePacket(PacketType),

    /// A known packet type found at the wrong nesting level
    #[error("unexpected {0} packet")]
    UnexpectedPacket(PacketType),

    /// Decrypted data key has the wrong length
    #[error("data key is {actual} bytes, want {expected}")]
    InvalidDataKeyLength {
        /// Required length
        expected: usize,
        /// Decrypted length
        actual: usize,
    },

    /// Two entries share an id
    #[error("duplicate key ID {0}")]
    DuplicateKeyId(KeyId),

    /// Active id names no stored key
    #[error("active key ID {0} not found")]
    UnknownActiveKey(KeyId),

    /// Bundle holds no entries
    #[error("keyring has no keys")]
    NoKeys,

    /// Wrong access key, or the ciphertext was altered
    #[error("decryption failed")]
    DecryptionFailed,

    /// Malformed framing
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Cipher failure other than authentication
    #[error(transparent)]
    Cipher(CipherError),

    /// Reading or writing the underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl KeyringError {
    /// Returns true if the access key was wrong or ciphertext was altered.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::DecryptionFailed)
    }

    /// Returns true if the stored bytes do not describe a valid keyring.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedVersion(_)
                | Self::NonZeroReserved(_)
                | Self::MissingPacket(_)
                | Self::DuplicatePacket(_)
                | Self::UnexpectedPacket(_)
                | Self::InvalidDataKeyLength { .. }
                | Self::DuplicateKeyId(_)
                | Self::UnknownActiveKey(_)
                | Self::NoKeys
                | Self::Protocol(_)
                | Self::Cipher(CipherError::Truncated { .. })
        )
    }
}

impl From<CipherError> for KeyringError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::DecryptionFailed => Self::DecryptionFailed,
            other => Self::Cipher(other),
        }
    }
}

impl From<PartialParse<'_>> for KeyringError {
    fn from(partial: PartialParse<'_>) -> Self {
        Self::Protocol(partial.error)
    }
}
