//! Read-only snapshots of a keyring's keys.

use keyring_proto::KeyId;
use zeroize::Zeroizing;

use crate::keys::{KeyInfo, SortedKeys};

/// Immutable snapshot of a keyring's key versions and active id.
///
/// A view owns copies of every key; later changes to the ring it came from
/// never show through. Views have no mutating methods, so they can be shared
/// freely across threads.
///
/// # Invariants
///
/// - At least one key is present
/// - The active position always refers to a stored key
///
/// # Panics
///
/// Lookups of an id that is not present panic. Check with [`View::has`]
/// first when the id comes from untrusted input.
#[derive(Clone, Debug)]
pub struct View {
    keys: SortedKeys,
    active: usize,
}

impl View {
    pub(crate) fn from_parts(keys: SortedKeys, active: usize) -> Self {
        debug_assert!(active < keys.len(), "active position out of range");
        Self { keys, active }
    }

    /// A view holding `key` as id 1, active.
    ///
    /// Useful where code expects a view but only a single static key
    /// exists.
    ///
    /// # Panics
    ///
    /// Panics if `key` is empty.
    pub fn single_key(key: &[u8]) -> Self {
        assert!(!key.is_empty(), "keyring: key is empty");

        let Ok(keys) = SortedKeys::from_unsorted(vec![KeyInfo::new(1, key)]) else {
            unreachable!("a single key cannot collide");
        };
        Self { keys, active: 0 }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false; a view holds at least one key.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Active key id.
    pub fn active(&self) -> KeyId {
        self.keys.get(self.active).id()
    }

    /// Whether a key with this id is stored.
    pub fn has(&self, id: KeyId) -> bool {
        self.keys.find(id).is_some()
    }

    /// Stored ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = KeyId> + '_ {
        self.keys.iter().map(KeyInfo::id)
    }

    /// Append key `id` to `buf`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not stored.
    pub fn append(&self, id: KeyId, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.keys.get(self.position(id)).key());
    }

    /// Copy of key `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not stored.
    pub fn get(&self, id: KeyId) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.keys.get(self.position(id)).key().to_vec())
    }

    /// Append the active key to `buf` and return its id.
    pub fn append_active(&self, buf: &mut Vec<u8>) -> KeyId {
        let info = self.keys.get(self.active);
        buf.extend_from_slice(info.key());
        info.id()
    }

    /// Active key id and a copy of its bytes.
    pub fn get_active(&self) -> (KeyId, Zeroizing<Vec<u8>>) {
        let info = self.keys.get(self.active);
        (info.id(), Zeroizing::new(info.key().to_vec()))
    }

    pub(crate) fn keys(&self) -> &SortedKeys {
        &self.keys
    }

    /// Store a new key. Does not change the active key.
    pub(crate) fn insert(&mut self, info: KeyInfo) {
        let pos = self.keys.insert(info);
        if pos <= self.active {
            self.active += 1;
        }
    }

    /// Make `id` the active key.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not stored.
    pub(crate) fn activate(&mut self, id: KeyId) {
        self.active = self.position(id);
    }

    #[allow(clippy::panic)]
    fn position(&self, id: KeyId) -> usize {
        match self.keys.find(id) {
            Some(pos) => pos,
            None => panic!("keyring: no such key: {id}"),
        }
    }
}
