//! Versioned key storage with cheap access-key rotation.
//!
//! A keyring stores numbered versions of a secret key (ids 1, 2, 3, ...) and
//! marks one as active. New data is protected with the active key; old data
//! stays readable because older versions are kept.
//!
//! # Key hierarchy
//!
//! ```text
//! access key (32 bytes, caller-held, optionally passphrase-derived)
//!   └─ wraps ─> data key (32 random bytes, fixed for the keyring's life)
//!                 └─ seals ─> bundle (active id + every key version)
//! ```
//!
//! Changing the access key ([`Ring::rekey`]) re-wraps the 32-byte data key
//! and leaves the bundle untouched.
//!
//! # Panics
//!
//! Recoverable conditions (bad input files, wrong access key, I/O) return
//! [`KeyringError`]. Misuse of a loaded ring panics with a message prefixed
//! `keyring:`:
//!
//! - looking up or activating an id that is not stored
//! - adding an empty key, or a random key of length zero
//! - exhausting the 32-bit id space
//! - writing a bundle larger than the maximum packet size
//!
//! # Example
//!
//! ```
//! use keyring_core::{Config, Ring, StaticKey, random_key};
//!
//! let access_key = random_key(32);
//! let mut ring = Ring::new(Config {
//!     initial_key: b"too many secrets",
//!     access_key: &access_key,
//!     ..Config::default()
//! })?;
//!
//! let id = ring.add(b"no more secrets");
//! ring.activate(id);
//!
//! let mut file = Vec::new();
//! ring.write_to(&mut file)?;
//!
//! let ring = Ring::read(&file[..], StaticKey::new(&access_key))?;
//! assert_eq!(&ring.get_active().1[..], b"no more secrets");
//! assert_eq!(&ring.get(1)[..], b"too many secrets");
//! # Ok::<(), keyring_core::KeyringError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod access;
pub mod config;
pub mod error;
mod keys;
pub mod ring;
pub mod secret;
pub mod view;

pub use access::{
    AccessKeySource, PassphraseKey, Pbkdf2Key, StaticKey, access_key_from_passphrase,
};
pub use config::Config;
pub use error::{KeyringError, Result};
pub use keyring_proto::{KeyId, MAX_PACKET_LEN};
pub use ring::{Ring, open_cipher_packet};
pub use secret::SecretBytes;
pub use view::View;
use keyring_proto::KeyringHeader;
use zeroize::Zeroizing;

/// Required access key length (32 bytes)
pub const ACCESS_KEY_LEN: usize = keyring_crypto::KEY_LEN;

/// Data key length (32 bytes)
pub const DATA_KEY_LEN: usize = keyring_crypto::KEY_LEN;

/// Container format version written by this crate
pub const FORMAT_VERSION: u8 = KeyringHeader::VERSION;

/// First byte of every keyring file
pub const MAGIC: u8 = KeyringHeader::MAGIC;

/// Generate `n` random bytes, suitable as a key version or access key.
///
/// # Panics
///
/// Panics if `n` is zero.
pub fn random_key(n: usize) -> Zeroizing<Vec<u8>> {
    assert!(n > 0, "keyring: invalid random key length {n}");
    keyring_crypto::generate_key(n)
}
