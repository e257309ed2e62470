//! Keyring Cryptographic Primitives
//!
//! Symmetric building blocks for keyring files. This crate knows nothing
//! about the container format; it seals and opens byte strings and derives
//! keys from passphrases.
//!
//! # Key Hierarchy
//!
//! A keyring protects its stored keys with two layers. The access key is
//! supplied by the caller (directly or derived from a passphrase) and only
//! ever wraps the data encryption key (DEK). The DEK is random and wraps the
//! stored keys. Changing the access key therefore re-seals 32 bytes, not
//! the whole keyring.
//!
//! ```text
//! Passphrase + Salt
//!        │
//!        ▼
//! PBKDF2 / HKDF → Access Key (32 bytes, never stored)
//!        │
//!        ▼
//! XChaCha20-Poly1305 → sealed DEK (stored)
//!        │
//!        ▼
//! XChaCha20-Poly1305 → sealed bundle of stored keys (stored)
//! ```
//!
//! # Security
//!
//! Nonces:
//! - Every seal draws a fresh 24-byte nonce from the OS RNG
//! - 192-bit nonces make random collisions negligible under a single key
//! - The nonce is stored as a prefix of the sealed output
//!
//! Authenticity:
//! - A failed tag check yields [`CipherError::DecryptionFailed`] with no
//!   further detail, whether the key was wrong or the data was damaged
//! - No plaintext is released unless the tag verifies
//!
//! Randomness:
//! - OS RNG failure panics; there is no degraded mode
//!
//! Memory:
//! - Plaintext outputs are returned in [`zeroize::Zeroizing`] buffers

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cipher;
pub mod error;
pub mod kdf;

pub use cipher::{
    KEY_LEN, NONCE_LEN, TAG_LEN, decrypt_with_key, encrypt_with_key, fill_random,
    generate_and_encrypt_key, generate_key, generate_nonce, seal_with_nonce, sealed_len,
};
pub use error::CipherError;
pub use kdf::{PBKDF2_ROUNDS, SALT_LEN, generate_salt, hkdf_key, key_from_passphrase, pbkdf2_key};
