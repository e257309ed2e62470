//! Access key sources.
//!
//! Reading a keyring needs the access key, but the key may depend on the
//! salt stored in the file (passphrase derivation). [`Ring::read`] therefore
//! takes an [`AccessKeySource`] and calls it once with the stored salt, which
//! is empty when the file carries none.
//!
//! [`Ring::read`]: crate::Ring::read

use keyring_crypto::{KEY_LEN, PBKDF2_ROUNDS, generate_salt, hkdf_key, pbkdf2_key};
use zeroize::Zeroizing;

use crate::secret::SecretBytes;

/// Produces the access key for a keyring, given its stored salt.
///
/// Any `Fn(&[u8]) -> Vec<u8>` closure is a source.
pub trait AccessKeySource {
    /// Return the access key for `salt`.
    ///
    /// The result is length-checked by the caller.
    fn access_key(&self, salt: &[u8]) -> Zeroizing<Vec<u8>>;
}

impl<F> AccessKeySource for F
where
    F: Fn(&[u8]) -> Vec<u8>,
{
    fn access_key(&self, salt: &[u8]) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self(salt))
    }
}

/// A fixed access key; the salt is ignored.
#[derive(Clone, Debug)]
pub struct StaticKey(SecretBytes);

impl StaticKey {
    /// Copy `key` into a source.
    pub fn new(key: &[u8]) -> Self {
        Self(SecretBytes::new(key))
    }
}

impl AccessKeySource for StaticKey {
    fn access_key(&self, _salt: &[u8]) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.0.expose().to_vec())
    }
}

/// Derives the access key from a passphrase with HKDF-SHA3-256.
///
/// The stored salt is the HKDF salt and the info string is empty. Pairs with
/// [`access_key_from_passphrase`], and opens files written by the `keyring`
/// tool.
#[derive(Clone)]
pub struct PassphraseKey {
    passphrase: Zeroizing<String>,
}

impl PassphraseKey {
    /// Source over `passphrase`.
    pub fn new(passphrase: &str) -> Self {
        Self { passphrase: Zeroizing::new(passphrase.to_owned()) }
    }
}

impl AccessKeySource for PassphraseKey {
    fn access_key(&self, salt: &[u8]) -> Zeroizing<Vec<u8>> {
        hkdf_key(self.passphrase.as_bytes(), salt, KEY_LEN)
    }
}

impl std::fmt::Debug for PassphraseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassphraseKey").finish_non_exhaustive()
    }
}

/// Derives the access key with PBKDF2-HMAC-SHA3-256.
///
/// Pairs with [`keyring_crypto::key_from_passphrase`] at the same round
/// count.
#[derive(Clone)]
pub struct Pbkdf2Key {
    passphrase: Zeroizing<String>,
    rounds: u32,
}

impl Pbkdf2Key {
    /// Source using [`PBKDF2_ROUNDS`].
    pub fn new(passphrase: &str) -> Self {
        Self::with_rounds(passphrase, PBKDF2_ROUNDS)
    }

    /// Source with an explicit round count.
    pub fn with_rounds(passphrase: &str, rounds: u32) -> Self {
        Self { passphrase: Zeroizing::new(passphrase.to_owned()), rounds }
    }
}

impl AccessKeySource for Pbkdf2Key {
    fn access_key(&self, salt: &[u8]) -> Zeroizing<Vec<u8>> {
        pbkdf2_key(self.passphrase.as_bytes(), salt, self.rounds, KEY_LEN)
    }
}

impl std::fmt::Debug for Pbkdf2Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pbkdf2Key").field("rounds", &self.rounds).finish_non_exhaustive()
    }
}

/// Derive a fresh access key from `passphrase` under a random salt.
///
/// Returns the key and the salt. Store the salt in the keyring
/// ([`crate::Config::access_key_salt`] or [`crate::Ring::rekey`]) so
/// [`PassphraseKey`] can re-derive the key on read.
pub fn access_key_from_passphrase(passphrase: &str) -> (Zeroizing<Vec<u8>>, Vec<u8>) {
    let salt = generate_salt();
    let key = hkdf_key(passphrase.as_bytes(), &salt, KEY_LEN);
    (key, salt)
}
