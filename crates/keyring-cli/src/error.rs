//! CLI error types.

use std::{io, path::PathBuf};

use keyring_core::{KeyId, KeyringError};
use keyring_proto::{PartialParse, ProtocolError};
use thiserror::Error;

/// Result alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors reported by keyring commands.
#[derive(Error, Debug)]
pub enum CliError {
    /// Loading, changing or saving the keyring failed
    #[error(transparent)]
    Keyring(#[from] KeyringError),

    /// The file's framing is malformed
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Terminal or stream I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Opening or replacing a keyring file failed
    #[error("{}: {source}", .path.display())]
    File {
        /// File being accessed
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// `create` target already exists
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// Key argument given but empty
    #[error("a key cannot be empty")]
    EmptyKey,

    /// Neither a key argument nor `--random`
    #[error("a key or --random is required")]
    MissingKey,

    /// `--random 0`
    #[error("random key length must be positive")]
    ZeroRandomLength,

    /// Id not present in the keyring
    #[error("no key with id {0} in keyring")]
    NoSuchKey(KeyId),

    /// Empty new passphrase without `--empty-ok`
    #[error("empty passphrase")]
    EmptyPassphrase,

    /// Confirmation differs from the first entry
    #[error("passphrases do not match")]
    PassphraseMismatch,

    /// Passphrase input ended before a line was read
    #[error("no passphrase provided")]
    NoPassphrase,

    /// File has bundles but no data key to open them
    #[error("no data key found for encrypted bundles")]
    NoDataKey,

    /// Passphrase does not unlock the data key
    #[error("invalid access key: {0}")]
    Unlock(#[source] KeyringError),

    /// A bundle failed to open with the unlocked data key
    #[error("decrypt packet {index}: {source}")]
    DecryptPacket {
        /// One-based packet position
        index: usize,
        /// Underlying failure
        #[source]
        source: KeyringError,
    },
}

impl CliError {
    /// Returns true if the command line itself was wrong.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::EmptyKey | Self::MissingKey | Self::ZeroRandomLength)
    }
}

impl From<PartialParse<'_>> for CliError {
    fn from(partial: PartialParse<'_>) -> Self {
        Self::Protocol(partial.error)
    }
}
