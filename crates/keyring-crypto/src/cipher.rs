//! Sealing with `XChaCha20-Poly1305`
//!
//! Sealed layout: `nonce(24) || ciphertext || tag(16)`.
//!
//! [`seal_with_nonce`] is pure so tests can pin the nonce. Everything else
//! draws nonces from the OS RNG.

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, AeadInPlace, KeyInit, Payload},
};
use zeroize::{Zeroize, Zeroizing};

use super::error::CipherError;

/// Key size for `XChaCha20-Poly1305` (32 bytes)
pub const KEY_LEN: usize = 32;

/// Extended nonce size (24 bytes)
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag size (16 bytes)
pub const TAG_LEN: usize = 16;

/// Fill `buf` from the OS cryptographic RNG.
///
/// # Panics
///
/// Panics if the OS RNG fails. Continuing without randomness would produce
/// predictable keys and nonces.
#[allow(clippy::expect_used)]
pub fn fill_random(buf: &mut [u8]) {
    getrandom::fill(buf)
        .expect("invariant: OS RNG failure is unrecoverable - keys and nonces would be predictable");
}

/// Generate `n` cryptographically random bytes.
pub fn generate_key(n: usize) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(vec![0u8; n]);
    fill_random(&mut key);
    key
}

/// Generate a fresh random nonce.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce);
    nonce
}

/// Length of the sealed form of a `plaintext_len`-byte message.
pub const fn sealed_len(plaintext_len: usize) -> usize {
    NONCE_LEN + plaintext_len + TAG_LEN
}

/// Seal `plaintext` under `key` with a caller-chosen nonce.
///
/// `aad` is authenticated but not stored. Returns `nonce || ciphertext ||
/// tag`.
///
/// # Security
///
/// Reusing a nonce under the same key breaks both confidentiality and
/// authenticity. Outside tests use [`encrypt_with_key`], which draws a fresh
/// nonce on every call.
///
/// # Errors
///
/// - `InvalidKeyLength` if `key` is not [`KEY_LEN`] bytes
/// - `EncryptionFailed` if the plaintext exceeds the cipher's limit
pub fn seal_with_nonce(
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CipherError> {
    let cipher = new_cipher(key)?;

    let mut sealed = Vec::with_capacity(sealed_len(plaintext.len()));
    sealed.extend_from_slice(nonce);
    sealed.extend_from_slice(plaintext);

    match cipher.encrypt_in_place_detached(XNonce::from_slice(nonce), aad, &mut sealed[NONCE_LEN..])
    {
        Ok(tag) => {
            sealed.extend_from_slice(&tag);
            debug_assert_eq!(sealed.len(), sealed_len(plaintext.len()));
            Ok(sealed)
        },
        Err(_) => {
            // The buffer still holds plaintext
            sealed.zeroize();
            Err(CipherError::EncryptionFailed)
        },
    }
}

/// Seal `plaintext` under `key` with a fresh random nonce.
///
/// The nonce length is always [`NONCE_LEN`], so it is not returned
/// separately: the first [`NONCE_LEN`] bytes of the result are the nonce and
/// the rest is ciphertext and tag.
///
/// # Errors
///
/// Same as [`seal_with_nonce`]. The key is checked before a nonce is drawn.
pub fn encrypt_with_key(key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, CipherError> {
    check_key_len(key)?;
    seal_with_nonce(key, &generate_nonce(), plaintext, aad)
}

/// Open a sealed message produced by [`encrypt_with_key`].
///
/// # Errors
///
/// - `InvalidKeyLength` if `key` is not [`KEY_LEN`] bytes
/// - `Truncated` if `sealed` is shorter than nonce plus tag
/// - `DecryptionFailed` if the tag does not verify (wrong key, wrong `aad`,
///   or damaged data)
pub fn decrypt_with_key(
    key: &[u8],
    sealed: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CipherError> {
    let cipher = new_cipher(key)?;

    let minimum = sealed_len(0);
    if sealed.len() < minimum {
        return Err(CipherError::Truncated { actual: sealed.len(), minimum });
    }

    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    cipher
        .decrypt(XNonce::from_slice(nonce), Payload { msg: ciphertext, aad })
        .map(Zeroizing::new)
        .map_err(|_| CipherError::DecryptionFailed)
}

/// Generate an `n`-byte random key and seal it under `access_key`.
///
/// Returns the plaintext key and its sealed form.
pub fn generate_and_encrypt_key(
    access_key: &[u8],
    n: usize,
) -> Result<(Zeroizing<Vec<u8>>, Vec<u8>), CipherError> {
    check_key_len(access_key)?;
    let key = generate_key(n);
    let sealed = encrypt_with_key(access_key, &key, &[])?;
    Ok((key, sealed))
}

fn check_key_len(key: &[u8]) -> Result<(), CipherError> {
    if key.len() == KEY_LEN {
        Ok(())
    } else {
        Err(CipherError::InvalidKeyLength { expected: KEY_LEN, actual: key.len() })
    }
}

fn new_cipher(key: &[u8]) -> Result<XChaCha20Poly1305, CipherError> {
    check_key_len(key)?;
    XChaCha20Poly1305::new_from_slice(key)
        .map_err(|_| CipherError::InvalidKeyLength { expected: KEY_LEN, actual: key.len() })
}
