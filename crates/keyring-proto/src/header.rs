//! Keyring container header.
//!
//! The header is four bytes: magic, format version, two reserved bytes.
//! Parsing checks only the size and the magic byte. Version and reserved
//! bytes are reported as found and validated by the caller, which knows
//! which versions it can interpret.

use crate::errors::{ProtocolError, Result};

/// Fixed 4-byte container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyringHeader {
    version: u8,
    reserved: [u8; 2],
}

impl KeyringHeader {
    /// Size of the serialized header (4 bytes)
    pub const SIZE: usize = 4;

    /// Leading byte of every keyring
    pub const MAGIC: u8 = 0xEC;

    /// Current format version
    pub const VERSION: u8 = 0x01;

    /// Header for the current format version with zeroed reserved bytes.
    #[must_use]
    pub const fn new() -> Self {
        Self { version: Self::VERSION, reserved: [0, 0] }
    }

    /// Header with explicit version and reserved bytes.
    ///
    /// Used to write back exactly what was read.
    #[must_use]
    pub const fn with_fields(version: u8, reserved: [u8; 2]) -> Self {
        Self { version, reserved }
    }

    /// Parse the header from the start of `bytes`.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::HeaderTruncated` if fewer than 4 bytes are present
    /// - `ProtocolError::InvalidMagic` if the first byte is not
    ///   [`Self::MAGIC`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let Some(&[magic, version, r0, r1]) = bytes.first_chunk::<4>() else {
            return Err(ProtocolError::HeaderTruncated {
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        };

        if magic != Self::MAGIC {
            return Err(ProtocolError::InvalidMagic(magic));
        }

        Ok(Self { version, reserved: [r0, r1] })
    }

    /// Serialize the header.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        [Self::MAGIC, self.version, self.reserved[0], self.reserved[1]]
    }

    /// Format version byte.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Reserved bytes (zero in format 1).
    #[must_use]
    pub fn reserved(&self) -> [u8; 2] {
        self.reserved
    }

    /// Whether this crate's readers understand the header.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.version == Self::VERSION && self.reserved == [0, 0]
    }
}

impl Default for KeyringHeader {
    fn default() -> Self {
        Self::new()
    }
}
