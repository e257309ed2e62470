//! Parameters for creating a keyring.

use std::fmt;

/// Inputs to [`crate::Ring::new`].
///
/// All fields borrow; the ring copies what it keeps.
#[derive(Clone, Copy, Default)]
pub struct Config<'a> {
    /// First key version, stored as id 1 and made active. Must not be empty.
    pub initial_key: &'a [u8],

    /// Key that wraps the data key. Must be [`crate::ACCESS_KEY_LEN`] bytes.
    pub access_key: &'a [u8],

    /// Salt stored alongside the keyring for passphrase-derived access
    /// keys. `None` stores an empty salt.
    pub access_key_salt: Option<&'a [u8]>,
}

impl fmt::Debug for Config<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("initial_key_len", &self.initial_key.len())
            .field("access_key_len", &self.access_key.len())
            .field("access_key_salt", &self.access_key_salt)
            .finish()
    }
}
