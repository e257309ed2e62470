//! The mutable keyring and its persisted form.
//!
//! A [`Ring`] holds every key version, the active id, and the two-level key
//! hierarchy that protects them on disk:
//!
//! ```text
//! access key ──wraps──> data key (DATA_KEY packet)
//! data key   ──seals──> bundle   (BUNDLE packet: active id + entries)
//! ```
//!
//! Rekeying rewraps the data key only; the bundle is resealed on the next
//! write with the unchanged data key and a fresh nonce.
//!
//! # Invariants
//!
//! - At least one key is stored and the active id names one of them
//! - Ids are never reused: new ids exceed every id ever assigned or loaded
//! - Plaintext key material is zeroed when the ring is dropped

use std::{fmt, io};

use keyring_crypto::{decrypt_with_key, encrypt_with_key, generate_and_encrypt_key, sealed_len};
use keyring_proto::{
    KeyId, KeyringHeader, OwnedPacket, PACKET_HEADER_SIZE, Packet, PacketBuffer, PacketType,
    parse_active_key, parse_keyring, parse_keyring_entry, parse_packets,
};
use zeroize::{Zeroize, Zeroizing};

use crate::{
    ACCESS_KEY_LEN, DATA_KEY_LEN,
    access::AccessKeySource,
    config::Config,
    error::{KeyringError, Result},
    keys::{KeyInfo, SortedKeys},
    random_key,
    secret::SecretBytes,
    view::View,
};

/// A keyring: versioned secret keys under an access key.
///
/// Not internally synchronized. Share a [`View`] across threads, or wrap
/// the ring in a lock when several threads mutate it.
pub struct Ring {
    header: KeyringHeader,
    access_key_salt: Vec<u8>,
    dk_encrypted: Vec<u8>,
    dk_plaintext: SecretBytes,
    view: View,
    max_id: KeyId,
    /// Unrecognized top-level packets, written back after the known ones.
    extra_packets: Vec<OwnedPacket>,
    /// Unrecognized bundle packets. May hold secrets.
    extra_bundle_packets: SecretPackets,
}

impl Ring {
    /// Create a keyring holding `config.initial_key` as id 1.
    ///
    /// A fresh random data key is generated and wrapped under
    /// `config.access_key`.
    ///
    /// # Errors
    ///
    /// - `InvalidAccessKeyLength` if the access key is not
    ///   [`ACCESS_KEY_LEN`] bytes
    /// - `EmptyInitialKey` if no initial key was given
    pub fn new(config: Config<'_>) -> Result<Self> {
        check_access_key(config.access_key)?;
        if config.initial_key.is_empty() {
            return Err(KeyringError::EmptyInitialKey);
        }

        let (dk_plaintext, dk_encrypted) =
            generate_and_encrypt_key(config.access_key, DATA_KEY_LEN)?;

        tracing::debug!(salted = config.access_key_salt.is_some(), "created keyring");

        Ok(Self {
            header: KeyringHeader::new(),
            access_key_salt: config.access_key_salt.map(<[u8]>::to_vec).unwrap_or_default(),
            dk_encrypted,
            dk_plaintext: SecretBytes::from_zeroizing(dk_plaintext),
            view: View::single_key(config.initial_key),
            max_id: 1,
            extra_packets: Vec::new(),
            extra_bundle_packets: SecretPackets::default(),
        })
    }

    /// Read a keyring from `source`.
    ///
    /// `access` is called once with the stored salt (empty if none) and must
    /// return the access key.
    ///
    /// # Errors
    ///
    /// - `Io` if reading fails
    /// - `Protocol` if the framing is malformed
    /// - `InvalidAccessKeyLength` if `access` returns a key of the wrong size
    /// - `DecryptionFailed` if the access key is wrong or the data was altered
    /// - A structural error (`MissingPacket`, `NoKeys`, ...) if the decrypted
    ///   contents do not describe a keyring
    pub fn read<R, A>(mut source: R, access: A) -> Result<Self>
    where
        R: io::Read,
        A: AccessKeySource,
    {
        let mut data = Zeroizing::new(Vec::new());
        source.read_to_end(&mut data)?;

        let keyring = parse_keyring(&data)?;
        let header = keyring.header;
        if header.version() != KeyringHeader::VERSION {
            return Err(KeyringError::UnsupportedVersion(header.version()));
        }
        if header.reserved() != [0, 0] {
            return Err(KeyringError::NonZeroReserved(header.reserved()));
        }

        let mut salt = None;
        let mut data_key = None;
        let mut bundle = None;
        let mut extra_packets = Vec::new();
        for packet in &keyring.packets {
            match packet.packet_type {
                PacketType::ACCESS_KEY_SALT => set_once(&mut salt, packet)?,
                PacketType::DATA_KEY => set_once(&mut data_key, packet)?,
                PacketType::BUNDLE => set_once(&mut bundle, packet)?,
                other if other.is_known() => {
                    return Err(KeyringError::UnexpectedPacket(other));
                },
                other => {
                    tracing::warn!(packet_type = %other, "keeping unknown packet");
                    extra_packets.push(packet.to_owned_packet());
                },
            }
        }

        let data_key = data_key.ok_or(KeyringError::MissingPacket(PacketType::DATA_KEY))?;
        let bundle = bundle.ok_or(KeyringError::MissingPacket(PacketType::BUNDLE))?;
        let access_key_salt = salt.map(|p| p.data.to_vec()).unwrap_or_default();

        let access_key = access.access_key(&access_key_salt);
        check_access_key(&access_key)?;

        let dk_plaintext = decrypt_with_key(&access_key, data_key.data, &[])?;
        if dk_plaintext.len() != DATA_KEY_LEN {
            return Err(KeyringError::InvalidDataKeyLength {
                expected: DATA_KEY_LEN,
                actual: dk_plaintext.len(),
            });
        }

        let inner = decrypt_with_key(&dk_plaintext, bundle.data, &[])?;
        let (view, extra_bundle_packets) = decode_bundle(&inner)?;
        let max_id = view.keys().max_id();

        tracing::debug!(
            keys = view.len(),
            active = view.active(),
            unknown = extra_packets.len() + extra_bundle_packets.len(),
            "read keyring"
        );

        Ok(Self {
            header,
            access_key_salt,
            dk_encrypted: data_key.data.to_vec(),
            dk_plaintext: SecretBytes::from_zeroizing(dk_plaintext),
            view,
            max_id,
            extra_packets,
            extra_bundle_packets,
        })
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.view.len()
    }

    /// Always false; a ring holds at least one key.
    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Active key id.
    pub fn active(&self) -> KeyId {
        self.view.active()
    }

    /// Whether a key with this id is stored.
    pub fn has(&self, id: KeyId) -> bool {
        self.view.has(id)
    }

    /// Largest id ever assigned or loaded.
    pub fn max_id(&self) -> KeyId {
        self.max_id
    }

    /// Salt stored for the access key. Empty if none.
    pub fn access_key_salt(&self) -> &[u8] {
        &self.access_key_salt
    }

    /// Whether `access_key` unwraps this ring's data key.
    pub fn has_access_key(&self, access_key: &[u8]) -> bool {
        decrypt_with_key(access_key, &self.dk_encrypted, &[])
            .is_ok_and(|dk| dk[..] == *self.dk_plaintext.expose())
    }

    /// Store a copy of `key` under a new id and return the id.
    ///
    /// The new key is not activated.
    ///
    /// # Panics
    ///
    /// Panics if `key` is empty, or if every id has been used.
    pub fn add(&mut self, key: &[u8]) -> KeyId {
        assert!(!key.is_empty(), "keyring: key is empty");
        assert!(self.max_id < KeyId::MAX, "keyring: key ID space exhausted");

        let id = self.max_id + 1;
        self.view.insert(KeyInfo::new(id, key));
        self.max_id = id;

        tracing::debug!(id, "added key");
        id
    }

    /// Generate a random `n`-byte key, store it, and return its id.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero, or if every id has been used.
    pub fn add_random(&mut self, n: usize) -> KeyId {
        let key = random_key(n);
        self.add(&key)
    }

    /// Make key `id` active.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not stored.
    pub fn activate(&mut self, id: KeyId) {
        self.view.activate(id);
        tracing::debug!(id, "activated key");
    }

    /// Append key `id` to `buf`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not stored.
    pub fn append(&self, id: KeyId, buf: &mut Vec<u8>) {
        self.view.append(id, buf);
    }

    /// Copy of key `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not stored.
    pub fn get(&self, id: KeyId) -> Zeroizing<Vec<u8>> {
        self.view.get(id)
    }

    /// Append the active key to `buf` and return its id.
    pub fn append_active(&self, buf: &mut Vec<u8>) -> KeyId {
        self.view.append_active(buf)
    }

    /// Active key id and a copy of its bytes.
    pub fn get_active(&self) -> (KeyId, Zeroizing<Vec<u8>>) {
        self.view.get_active()
    }

    /// Independent snapshot of the current keys and active id.
    pub fn view(&self) -> View {
        self.view.clone()
    }

    /// Rewrap the data key under `access_key`.
    ///
    /// Keys, ids, and the data key itself are unchanged. A `None` salt keeps
    /// the stored salt.
    ///
    /// # Errors
    ///
    /// `InvalidAccessKeyLength` if `access_key` is not [`ACCESS_KEY_LEN`]
    /// bytes. The ring is unchanged on error.
    pub fn rekey(&mut self, access_key: &[u8], access_key_salt: Option<&[u8]>) -> Result<()> {
        check_access_key(access_key)?;

        self.dk_encrypted = encrypt_with_key(access_key, self.dk_plaintext.expose(), &[])?;
        if let Some(salt) = access_key_salt {
            self.access_key_salt = salt.to_vec();
        }

        tracing::debug!(new_salt = access_key_salt.is_some(), "rekeyed");
        Ok(())
    }

    /// Serialize the keyring to `sink`. Returns the number of bytes written.
    ///
    /// The bundle is resealed with a fresh nonce on every call, so two writes
    /// of the same ring differ byte-for-byte.
    ///
    /// # Errors
    ///
    /// `Io` if writing fails. Partial output may have been written.
    ///
    /// # Panics
    ///
    /// Panics if the bundle exceeds the maximum packet size.
    pub fn write_to<W: io::Write>(&self, mut sink: W) -> Result<u64> {
        let bundle = self.seal_bundle()?;

        let extra_len: usize = self.extra_packets.iter().map(|p| p.as_packet().encoded_len()).sum();
        let capacity = KeyringHeader::SIZE
            + PACKET_HEADER_SIZE * 3
            + self.access_key_salt.len()
            + self.dk_encrypted.len()
            + bundle.len()
            + extra_len;

        let mut buf = PacketBuffer::with_capacity(capacity);
        buf.write_header(self.header);
        buf.add_packet(PacketType::ACCESS_KEY_SALT, &self.access_key_salt);
        buf.add_packet(PacketType::DATA_KEY, &self.dk_encrypted);
        buf.add_packet(PacketType::BUNDLE, &bundle);
        for packet in &self.extra_packets {
            buf.add_packet(packet.packet_type, &packet.data);
        }

        sink.write_all(buf.as_bytes())?;
        tracing::debug!(bytes = buf.len(), keys = self.len(), "wrote keyring");
        Ok(buf.len() as u64)
    }

    /// Encode and seal the active id, every entry, and unknown bundle
    /// packets.
    fn seal_bundle(&self) -> Result<Vec<u8>> {
        let entries: usize =
            self.view.keys().iter().map(|info| PACKET_HEADER_SIZE + 4 + info.key().len()).sum();
        let extra: usize =
            self.extra_bundle_packets.iter().map(|p| p.as_packet().encoded_len()).sum();

        let mut inner = PacketBuffer::with_capacity(PACKET_HEADER_SIZE + 4 + entries + extra);
        inner.add_active_key(Some(self.view.active()));
        for info in self.view.keys().iter() {
            inner.add_keyring_entry(info.id(), info.key());
        }
        for packet in self.extra_bundle_packets.iter() {
            inner.add_packet(packet.packet_type, &packet.data);
        }

        let inner = Zeroizing::new(inner.into_vec());
        let sealed = encrypt_with_key(self.dk_plaintext.expose(), &inner, &[])?;
        debug_assert_eq!(sealed.len(), sealed_len(inner.len()));
        Ok(sealed)
    }
}

/// Packets copied out of a decrypted bundle. Contents are zeroed on drop,
/// including when the bundle is rejected after they were collected.
#[derive(Default)]
struct SecretPackets(Vec<OwnedPacket>);

impl SecretPackets {
    fn push(&mut self, packet: OwnedPacket) {
        self.0.push(packet);
    }
}

impl std::ops::Deref for SecretPackets {
    type Target = [OwnedPacket];

    fn deref(&self) -> &[OwnedPacket] {
        &self.0
    }
}

impl Zeroize for SecretPackets {
    fn zeroize(&mut self) {
        for packet in &mut self.0 {
            packet.data.zeroize();
        }
    }
}

impl Drop for SecretPackets {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("keys", &self.len())
            .field("active", &self.active())
            .field("max_id", &self.max_id)
            .finish_non_exhaustive()
    }
}

/// Decrypt a cipher packet (data key or bundle) with `key`.
///
/// Intended for diagnostics that walk a file packet by packet.
///
/// # Errors
///
/// `DecryptionFailed` if `key` is wrong or the packet was altered.
pub fn open_cipher_packet(packet: &Packet<'_>, key: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    Ok(decrypt_with_key(key, packet.data, &[])?)
}

/// Decode a bundle plaintext into a view plus any unknown packets.
fn decode_bundle(inner: &[u8]) -> Result<(View, SecretPackets)> {
    let mut active = None;
    let mut seen_active = false;
    let mut keys = Vec::new();
    let mut extra = SecretPackets::default();

    for packet in parse_packets(inner, 0)? {
        match packet.packet_type {
            PacketType::ACTIVE_KEY => {
                if seen_active {
                    return Err(KeyringError::DuplicatePacket(PacketType::ACTIVE_KEY));
                }
                seen_active = true;
                active = parse_active_key(packet.data)?;
            },
            PacketType::KEYRING_ENTRY => {
                keys.push(KeyInfo::from(parse_keyring_entry(packet.data)?));
            },
            other if other.is_known() => {
                return Err(KeyringError::UnexpectedPacket(other));
            },
            other => {
                tracing::warn!(packet_type = %other, "keeping unknown bundle packet");
                extra.push(packet.to_owned_packet());
            },
        }
    }

    let keys = SortedKeys::from_unsorted(keys).map_err(KeyringError::DuplicateKeyId)?;
    if keys.is_empty() {
        return Err(KeyringError::NoKeys);
    }

    let active = match active {
        Some(id) => keys.find(id).ok_or(KeyringError::UnknownActiveKey(id))?,
        None => {
            tracing::warn!(id = keys.get(0).id(), "no active key recorded, using lowest id");
            0
        },
    };

    Ok((View::from_parts(keys, active), extra))
}

fn check_access_key(key: &[u8]) -> Result<()> {
    if key.len() == ACCESS_KEY_LEN {
        Ok(())
    } else {
        Err(KeyringError::InvalidAccessKeyLength { expected: ACCESS_KEY_LEN, actual: key.len() })
    }
}

fn set_once<'a>(slot: &mut Option<Packet<'a>>, packet: &Packet<'a>) -> Result<()> {
    if slot.is_some() {
        return Err(KeyringError::DuplicatePacket(packet.packet_type));
    }
    *slot = Some(*packet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_KEY: [u8; ACCESS_KEY_LEN] = [0x5A; ACCESS_KEY_LEN];

    fn new_ring(initial: &[u8]) -> Ring {
        Ring::new(Config { initial_key: initial, access_key: &ACCESS_KEY, ..Config::default() })
            .unwrap()
    }

    fn write(ring: &Ring) -> Vec<u8> {
        let mut out = Vec::new();
        let n = ring.write_to(&mut out).unwrap();
        assert_eq!(n, out.len() as u64);
        out
    }

    /// Build a file around a hand-made bundle plaintext.
    fn file_with_bundle(inner: &PacketBuffer, extra_outer: &[(PacketType, &[u8])]) -> Vec<u8> {
        let (dk, dk_encrypted) = generate_and_encrypt_key(&ACCESS_KEY, DATA_KEY_LEN).unwrap();
        let bundle = encrypt_with_key(&dk, inner.as_bytes(), &[]).unwrap();

        let mut buf = PacketBuffer::new();
        buf.write_header(KeyringHeader::new());
        buf.add_packet(PacketType::DATA_KEY, &dk_encrypted);
        buf.add_packet(PacketType::BUNDLE, &bundle);
        for (packet_type, data) in extra_outer {
            buf.add_packet(*packet_type, data);
        }
        buf.into_vec()
    }

    fn read(data: &[u8]) -> Result<Ring> {
        Ring::read(data, StaticKeyFn)
    }

    struct StaticKeyFn;

    impl AccessKeySource for StaticKeyFn {
        fn access_key(&self, _salt: &[u8]) -> Zeroizing<Vec<u8>> {
            Zeroizing::new(ACCESS_KEY.to_vec())
        }
    }

    #[test]
    fn internal_state_survives_roundtrip() {
        let mut ring = Ring::new(Config {
            initial_key: b"first",
            access_key: &ACCESS_KEY,
            access_key_salt: Some(b"pepper"),
        })
        .unwrap();
        ring.add(b"second");
        ring.activate(2);

        let loaded = read(&write(&ring)).unwrap();

        assert_eq!(loaded.header, ring.header);
        assert_eq!(loaded.access_key_salt, b"pepper");
        assert_eq!(loaded.dk_encrypted, ring.dk_encrypted);
        assert_eq!(loaded.dk_plaintext.expose(), ring.dk_plaintext.expose());
        assert_eq!(loaded.max_id, 2);
        assert_eq!(loaded.active(), 2);
        assert_eq!(&loaded.get(1)[..], b"first");
        assert_eq!(&loaded.get(2)[..], b"second");
    }

    #[test]
    fn max_id_follows_highest_stored_id() {
        let mut inner = PacketBuffer::new();
        inner.add_active_key(Some(3));
        inner.add_keyring_entry(9, b"nine");
        inner.add_keyring_entry(3, b"three");

        let mut ring = read(&file_with_bundle(&inner, &[])).unwrap();
        assert_eq!(ring.max_id(), 9);
        assert_eq!(ring.add(b"ten"), 10);
    }

    #[test]
    fn missing_active_uses_lowest_id() {
        let mut inner = PacketBuffer::new();
        inner.add_keyring_entry(5, b"five");
        inner.add_keyring_entry(2, b"two");

        let ring = read(&file_with_bundle(&inner, &[])).unwrap();
        assert_eq!(ring.active(), 2);
    }

    #[test]
    fn empty_active_record_uses_lowest_id() {
        let mut inner = PacketBuffer::new();
        inner.add_active_key(None);
        inner.add_keyring_entry(4, b"four");

        assert_eq!(read(&file_with_bundle(&inner, &[])).unwrap().active(), 4);
    }

    #[test]
    fn missing_salt_reads_as_empty() {
        let mut inner = PacketBuffer::new();
        inner.add_active_key(Some(1));
        inner.add_keyring_entry(1, b"one");

        let ring = read(&file_with_bundle(&inner, &[])).unwrap();
        assert!(ring.access_key_salt().is_empty());
    }

    #[test]
    fn unknown_packets_roundtrip() {
        let mut inner = PacketBuffer::new();
        inner.add_active_key(Some(1));
        inner.add_keyring_entry(1, b"one");
        inner.add_packet(PacketType::from_byte(0x41), b"inner extension");

        let outer_type = PacketType::from_byte(0x40);
        let ring = read(&file_with_bundle(&inner, &[(outer_type, b"outer extension")])).unwrap();
        assert_eq!(ring.extra_packets.len(), 1);
        assert_eq!(ring.extra_bundle_packets.len(), 1);

        let again = read(&write(&ring)).unwrap();
        assert_eq!(again.extra_packets, ring.extra_packets);
        assert_eq!(again.extra_bundle_packets[0].data, b"inner extension");
        assert_eq!(again.extra_bundle_packets[0].packet_type, PacketType::from_byte(0x41));
    }

    #[test]
    fn rejected_bundle_with_unknown_packets() {
        let mut inner = PacketBuffer::new();
        inner.add_packet(PacketType::from_byte(0x41), b"inner secret");
        inner.add_active_key(Some(7));
        inner.add_keyring_entry(1, b"one");

        assert!(matches!(decode_bundle(inner.as_bytes()), Err(KeyringError::UnknownActiveKey(7))));
    }

    #[test]
    fn secret_packets_zeroize_contents() {
        let mut packets = SecretPackets::default();
        packets.push(OwnedPacket {
            packet_type: PacketType::from_byte(0x41),
            data: b"inner secret".to_vec(),
        });
        assert_eq!(packets.len(), 1);

        packets.zeroize();
        assert_eq!(packets.len(), 1);
        assert!(packets[0].data.is_empty());
    }

    #[test]
    fn written_packet_order() {
        let ring = new_ring(b"key");
        let data = write(&ring);
        let keyring = parse_keyring(&data).unwrap();
        let types: Vec<_> = keyring.packets.iter().map(|p| p.packet_type).collect();

        assert_eq!(types, [PacketType::ACCESS_KEY_SALT, PacketType::DATA_KEY, PacketType::BUNDLE]);
    }

    #[test]
    fn bundle_plaintext_layout() {
        let mut ring = new_ring(b"alpha");
        ring.add(b"beta");

        let data = write(&ring);
        let keyring = parse_keyring(&data).unwrap();
        let dk = open_cipher_packet(&keyring.packets[1], &ACCESS_KEY).unwrap();
        let inner = open_cipher_packet(&keyring.packets[2], &dk).unwrap();
        let packets = parse_packets(&inner, 0).unwrap();

        assert_eq!(packets.len(), 3);
        assert_eq!(packets[0].packet_type, PacketType::ACTIVE_KEY);
        assert_eq!(packets[0].data, &1u32.to_be_bytes());
        assert_eq!(packets[1].data, b"\x00\x00\x00\x01alpha");
        assert_eq!(packets[2].data, b"\x00\x00\x00\x02beta");
    }

    #[test]
    fn duplicate_packets_are_rejected() {
        let mut inner = PacketBuffer::new();
        inner.add_keyring_entry(1, b"one");
        let salt: &[u8] = b"salt";

        let data = file_with_bundle(
            &inner,
            &[(PacketType::ACCESS_KEY_SALT, salt), (PacketType::ACCESS_KEY_SALT, salt)],
        );
        assert!(matches!(
            read(&data),
            Err(KeyringError::DuplicatePacket(PacketType::ACCESS_KEY_SALT))
        ));
    }

    #[test]
    fn duplicate_key_ids_are_rejected() {
        let mut inner = PacketBuffer::new();
        inner.add_keyring_entry(1, b"one");
        inner.add_keyring_entry(1, b"uno");

        assert!(matches!(
            read(&file_with_bundle(&inner, &[])),
            Err(KeyringError::DuplicateKeyId(1))
        ));
    }

    #[test]
    fn empty_bundle_is_rejected() {
        let mut inner = PacketBuffer::new();
        inner.add_active_key(None);

        assert!(matches!(read(&file_with_bundle(&inner, &[])), Err(KeyringError::NoKeys)));
    }

    #[test]
    fn dangling_active_id_is_rejected() {
        let mut inner = PacketBuffer::new();
        inner.add_active_key(Some(7));
        inner.add_keyring_entry(1, b"one");

        assert!(matches!(
            read(&file_with_bundle(&inner, &[])),
            Err(KeyringError::UnknownActiveKey(7))
        ));
    }

    #[test]
    fn misplaced_known_packet_is_rejected() {
        let mut inner = PacketBuffer::new();
        inner.add_keyring_entry(1, b"one");
        inner.add_packet(PacketType::DATA_KEY, b"nested");

        assert!(matches!(
            read(&file_with_bundle(&inner, &[])),
            Err(KeyringError::UnexpectedPacket(PacketType::DATA_KEY))
        ));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut data = write(&new_ring(b"key"));
        data[1] = 2;
        assert!(matches!(read(&data), Err(KeyringError::UnsupportedVersion(2))));
    }

    #[test]
    fn reserved_bytes_must_be_zero() {
        let mut data = write(&new_ring(b"key"));
        data[3] = 1;
        assert!(matches!(read(&data), Err(KeyringError::NonZeroReserved([0, 1]))));
    }

    #[test]
    fn short_data_key_is_rejected() {
        let short_dk = encrypt_with_key(&ACCESS_KEY, &[0u8; 16], &[]).unwrap();

        let mut buf = PacketBuffer::new();
        buf.write_header(KeyringHeader::new());
        buf.add_packet(PacketType::DATA_KEY, &short_dk);
        buf.add_packet(PacketType::BUNDLE, &[0u8; 64]);

        assert!(matches!(
            read(buf.as_bytes()),
            Err(KeyringError::InvalidDataKeyLength { expected: 32, actual: 16 })
        ));
    }

    #[test]
    fn has_access_key() {
        let mut ring = new_ring(b"key");
        assert!(ring.has_access_key(&ACCESS_KEY));
        assert!(!ring.has_access_key(&[0; ACCESS_KEY_LEN]));
        assert!(!ring.has_access_key(b"short"));

        ring.rekey(&[0; ACCESS_KEY_LEN], None).unwrap();
        assert!(ring.has_access_key(&[0; ACCESS_KEY_LEN]));
        assert!(!ring.has_access_key(&ACCESS_KEY));
    }

    #[test]
    fn failed_rekey_leaves_ring_unchanged() {
        let mut ring = new_ring(b"key");
        let before = ring.dk_encrypted.clone();

        assert!(ring.rekey(b"short", Some(b"salt")).is_err());
        assert_eq!(ring.dk_encrypted, before);
        assert!(ring.access_key_salt().is_empty());
    }

    #[test]
    fn debug_hides_keys() {
        let ring = new_ring(b"super secret key");
        let debug = format!("{ring:?}");
        assert!(debug.contains("keys: 1"));
        assert!(!debug.contains("super secret key"));
    }
}
