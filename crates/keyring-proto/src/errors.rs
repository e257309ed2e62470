//! Error types for keyring format parsing.
//!
//! Every error carries enough positional detail to locate the damage in a
//! file. The parser never panics on malformed input; the only panic in this
//! crate is the builder's size precondition in
//! [`crate::PacketBuffer::add_packet`].

use thiserror::Error;

use crate::{KeyringHeader, Packet};

/// Result alias for format operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while decoding the keyring format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fewer bytes than a container header
    #[error("invalid keyring: header truncated ({actual} < {expected})")]
    HeaderTruncated {
        /// Header size
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// First byte is not the keyring magic
    #[error("invalid keyring: invalid magic byte {0:#04x}")]
    InvalidMagic(u8),

    /// Fewer than four bytes left where a packet header should start
    #[error("offset {offset}: truncated packet header")]
    TruncatedPacketHeader {
        /// Absolute offset of the partial header
        offset: usize,
    },

    /// Packet length field claims more bytes than remain
    #[error("offset {offset}: truncated packet ({actual} < {expected})")]
    TruncatedPacket {
        /// Absolute offset of the packet content
        offset: usize,
        /// Length claimed by the packet header
        expected: usize,
        /// Bytes actually remaining
        actual: usize,
    },

    /// Keyring entry shorter than its id field
    #[error("key truncated ({actual} < 4)")]
    KeyTruncated {
        /// Entry length
        actual: usize,
    },

    /// Key id zero is never assigned
    #[error("invalid key ID")]
    InvalidKeyId,

    /// Active key record that is neither empty nor four bytes
    #[error("wrong active key length ({0} ≠ 4)")]
    ActiveKeyLength(usize),
}

impl ProtocolError {
    /// Returns true if the error stems from input ending early.
    ///
    /// Truncation usually means an interrupted write; the other variants
    /// mean the bytes were never a valid keyring.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            Self::HeaderTruncated { .. }
                | Self::TruncatedPacketHeader { .. }
                | Self::TruncatedPacket { .. }
                | Self::KeyTruncated { .. }
        )
    }
}

/// A parse that stopped early.
///
/// Carries everything decoded before the failure so diagnostic tools can
/// show what was recoverable. The packets borrow from the parsed buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error} ({} packets decoded)", .packets.len())]
pub struct PartialParse<'a> {
    /// Container header, if it was read before the failure
    pub header: Option<KeyringHeader>,
    /// Packets decoded before the failure
    pub packets: Vec<Packet<'a>>,
    /// What went wrong
    pub error: ProtocolError,
}

impl From<PartialParse<'_>> for ProtocolError {
    fn from(partial: PartialParse<'_>) -> Self {
        partial.error
    }
}
