//! Passphrase key derivation
//!
//! Both derivations use SHA3-256. HKDF is a single extract-and-expand step
//! and is what keyring files written by the `keyring` tool expect. PBKDF2
//! adds an iteration count for callers that want a work factor.

use hkdf::Hkdf;
use sha3::Sha3_256;
use zeroize::Zeroizing;

use super::cipher::fill_random;

/// Length of generated salts (32 bytes)
pub const SALT_LEN: usize = 32;

/// PBKDF2 iteration count
pub const PBKDF2_ROUNDS: u32 = 4096;

/// Largest HKDF-SHA3-256 output (255 hash blocks)
const HKDF_MAX_OUTPUT: usize = 255 * 32;

/// Generate a random [`SALT_LEN`]-byte salt.
pub fn generate_salt() -> Vec<u8> {
    let mut salt = vec![0u8; SALT_LEN];
    fill_random(&mut salt);
    salt
}

/// Derive `n` bytes from `passphrase` with PBKDF2-HMAC-SHA3-256.
///
/// Deterministic: the same passphrase, salt, and rounds always produce the
/// same key.
pub fn pbkdf2_key(passphrase: &[u8], salt: &[u8], rounds: u32, n: usize) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(vec![0u8; n]);
    pbkdf2::pbkdf2_hmac::<Sha3_256>(passphrase, salt, rounds, &mut key);
    key
}

/// Derive `n` bytes from `passphrase` with HKDF-SHA3-256.
///
/// The salt is used as the HKDF salt; the info string is empty.
///
/// # Panics
///
/// Panics if `n` exceeds 8160 bytes, the HKDF-SHA3-256 output limit.
pub fn hkdf_key(passphrase: &[u8], salt: &[u8], n: usize) -> Zeroizing<Vec<u8>> {
    assert!(n <= HKDF_MAX_OUTPUT, "keyring: hkdf output too long ({n} > {HKDF_MAX_OUTPUT})");

    let hkdf = Hkdf::<Sha3_256>::new(Some(salt), passphrase);
    let mut key = Zeroizing::new(vec![0u8; n]);
    let Ok(()) = hkdf.expand(&[], &mut key) else {
        unreachable!("output length checked against the HKDF-SHA3-256 limit");
    };
    key
}

/// Derive an `n`-byte key from `passphrase` with PBKDF2.
///
/// If `salt` is `None` a fresh random salt is generated. Returns the key and
/// the salt that produced it, which must be stored to re-derive the key.
pub fn key_from_passphrase(
    passphrase: &str,
    n: usize,
    salt: Option<&[u8]>,
) -> (Zeroizing<Vec<u8>>, Vec<u8>) {
    let salt = salt.map_or_else(generate_salt, <[u8]>::to_vec);
    let key = pbkdf2_key(passphrase.as_bytes(), &salt, PBKDF2_ROUNDS, n);
    (key, salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn pbkdf2_is_deterministic() {
        let a = pbkdf2_key(b"hunter2", b"salt", 1, 32);
        let b = pbkdf2_key(b"hunter2", b"salt", 1, 32);
        assert_eq!(a, b, "same inputs must produce same output");
    }

    #[test]
    fn pbkdf2_known_answer() {
        let key = pbkdf2_key(b"passwd", b"salt", 1, 32);
        assert_eq!(
            hex(&key),
            "0f67518567db862264c1991e07dc2a5d3b7493637f9719466b924d9163c45782"
        );

        let key = pbkdf2_key(b"character is what you are in the dark", b"salt", PBKDF2_ROUNDS, 32);
        assert_eq!(
            hex(&key),
            "a31ec27b8112678be0faa7b7c27f188a19387b7a77d6fb8d252c7bea0ba3fbac"
        );
    }

    #[test]
    fn hkdf_known_answer() {
        // Same bytes as keys written by the `keyring` tool for this passphrase and salt
        let key = hkdf_key(b"character is what you are in the dark", b"salt", 32);
        assert_eq!(
            hex(&key),
            "573a013c2b7078a9d413c3fb2aad8d3238af47bd16f307d7c2f8fffebd9d7ad0"
        );

        let key = hkdf_key(b"hunter2", b"", 32);
        assert_eq!(
            hex(&key),
            "cc645a19a0b808a8fa00b7f21d37f321ac2221a21106b3fcc9ca668c2207eb2d"
        );
    }

    #[test]
    fn different_salts_produce_different_keys() {
        let a = pbkdf2_key(b"hunter2", b"salt-a", 2, 32);
        let b = pbkdf2_key(b"hunter2", b"salt-b", 2, 32);
        assert_ne!(a, b);

        let a = hkdf_key(b"hunter2", b"salt-a", 32);
        let b = hkdf_key(b"hunter2", b"salt-b", 32);
        assert_ne!(a, b);
    }

    #[test]
    fn hkdf_is_deterministic() {
        let a = hkdf_key(b"character is what you are in the dark", b"salt", 32);
        let b = hkdf_key(b"character is what you are in the dark", b"salt", 32);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn hkdf_differs_from_pbkdf2() {
        let a = hkdf_key(b"hunter2", b"salt", 32);
        let b = pbkdf2_key(b"hunter2", b"salt", PBKDF2_ROUNDS, 32);
        assert_ne!(a, b);
    }

    #[test]
    #[should_panic(expected = "hkdf output too long")]
    fn hkdf_rejects_oversized_output() {
        let _ = hkdf_key(b"x", b"y", HKDF_MAX_OUTPUT + 1);
    }

    #[test]
    fn generated_salt_when_absent() {
        let (key, salt) = key_from_passphrase("hunter2", 32, None);
        assert_eq!(key.len(), 32);
        assert_eq!(salt.len(), SALT_LEN);

        let (again, _) = key_from_passphrase("hunter2", 32, Some(&salt));
        assert_eq!(key, again, "stored salt must reproduce the key");
    }

    #[test]
    fn provided_salt_is_returned() {
        let (_, salt) = key_from_passphrase("hunter2", 32, Some(b"acorn"));
        assert_eq!(salt, b"acorn");
    }

    #[test]
    fn fresh_salts_differ() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
