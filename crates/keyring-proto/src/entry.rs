//! Content encodings for keyring entries and the active key record.

use crate::errors::{ProtocolError, Result};

/// Key version identifier. Zero is never assigned.
pub type KeyId = u32;

/// A parsed keyring entry borrowing its key bytes from the input.
///
/// Copy the key out before the input buffer goes away; the owning side
/// lives in the state machine, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEntry<'a> {
    /// Key id (non-zero)
    pub id: KeyId,
    /// Raw key bytes
    pub key: &'a [u8],
}

/// Parse the content of a [`crate::PacketType::KEYRING_ENTRY`] packet.
///
/// # Errors
///
/// - `ProtocolError::KeyTruncated` if fewer than 4 bytes are present
/// - `ProtocolError::InvalidKeyId` if the id is zero
pub fn parse_keyring_entry(data: &[u8]) -> Result<KeyEntry<'_>> {
    let Some((id, key)) = data.split_first_chunk::<4>() else {
        return Err(ProtocolError::KeyTruncated { actual: data.len() });
    };

    let id = u32::from_be_bytes(*id);
    if id == 0 {
        return Err(ProtocolError::InvalidKeyId);
    }

    Ok(KeyEntry { id, key })
}

/// Parse the content of a [`crate::PacketType::ACTIVE_KEY`] packet.
///
/// Empty content means no active key was recorded.
///
/// # Errors
///
/// - `ProtocolError::ActiveKeyLength` if the content is neither empty nor 4
///   bytes
/// - `ProtocolError::InvalidKeyId` if the recorded id is zero
pub fn parse_active_key(data: &[u8]) -> Result<Option<KeyId>> {
    match *data {
        [] => Ok(None),
        [a, b, c, d] => match u32::from_be_bytes([a, b, c, d]) {
            0 => Err(ProtocolError::InvalidKeyId),
            id => Ok(Some(id)),
        },
        _ => Err(ProtocolError::ActiveKeyLength(data.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_entry() {
        let entry = parse_keyring_entry(&[0, 0, 1, 0, b'k', b'e', b'y']).unwrap();
        assert_eq!(entry, KeyEntry { id: 256, key: b"key" });
    }

    #[test]
    fn parse_entry_with_empty_key() {
        let entry = parse_keyring_entry(&[0, 0, 0, 9]).unwrap();
        assert_eq!(entry.id, 9);
        assert!(entry.key.is_empty());
    }

    #[test]
    fn reject_short_entry() {
        assert_eq!(parse_keyring_entry(&[0, 1]), Err(ProtocolError::KeyTruncated { actual: 2 }));
    }

    #[test]
    fn reject_zero_id() {
        assert_eq!(parse_keyring_entry(&[0, 0, 0, 0, 1]), Err(ProtocolError::InvalidKeyId));
        assert_eq!(parse_active_key(&[0, 0, 0, 0]), Err(ProtocolError::InvalidKeyId));
    }

    #[test]
    fn parse_active() {
        assert_eq!(parse_active_key(&[]), Ok(None));
        assert_eq!(parse_active_key(&[0, 0, 0, 2]), Ok(Some(2)));
        assert_eq!(parse_active_key(&[0xFF, 0xFF, 0xFF, 0xFF]), Ok(Some(u32::MAX)));
    }

    #[test]
    fn reject_bad_active_length() {
        assert_eq!(parse_active_key(&[1]), Err(ProtocolError::ActiveKeyLength(1)));
        assert_eq!(parse_active_key(&[0, 0, 0, 0, 1]), Err(ProtocolError::ActiveKeyLength(5)));
    }
}
