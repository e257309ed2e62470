//! Key versions and the sorted set that holds them.

use std::fmt;

use keyring_proto::{KeyEntry, KeyId};

use crate::secret::SecretBytes;

/// One stored key version.
#[derive(Clone)]
pub struct KeyInfo {
    id: KeyId,
    key: SecretBytes,
}

impl KeyInfo {
    /// Copy `key` into a new entry with the given id.
    pub fn new(id: KeyId, key: &[u8]) -> Self {
        Self { id, key: SecretBytes::new(key) }
    }

    /// Key id.
    pub fn id(&self) -> KeyId {
        self.id
    }

    /// Key bytes.
    pub fn key(&self) -> &[u8] {
        self.key.expose()
    }
}

impl From<KeyEntry<'_>> for KeyInfo {
    fn from(entry: KeyEntry<'_>) -> Self {
        Self::new(entry.id, entry.key)
    }
}

impl fmt::Debug for KeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyInfo").field("id", &self.id).field("key", &self.key).finish()
    }
}

/// Key versions ordered by ascending id.
///
/// # Invariants
///
/// - Ids are strictly increasing (sorted, no duplicates)
/// - Lookup is a binary search
#[derive(Clone, Debug, Default)]
pub(crate) struct SortedKeys {
    keys: Vec<KeyInfo>,
}

impl SortedKeys {
    /// Sort `keys` by id.
    ///
    /// Returns the offending id if two entries share one.
    pub(crate) fn from_unsorted(mut keys: Vec<KeyInfo>) -> Result<Self, KeyId> {
        keys.sort_unstable_by_key(KeyInfo::id);
        if let Some(pair) = keys.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(pair[0].id);
        }
        Ok(Self { keys })
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Position of `id`, if stored.
    pub(crate) fn find(&self, id: KeyId) -> Option<usize> {
        self.keys.binary_search_by_key(&id, KeyInfo::id).ok()
    }

    pub(crate) fn get(&self, index: usize) -> &KeyInfo {
        &self.keys[index]
    }

    /// Largest stored id, 0 when empty.
    pub(crate) fn max_id(&self) -> KeyId {
        self.keys.last().map_or(0, KeyInfo::id)
    }

    /// Insert keeping the order. Returns the new entry's position.
    ///
    /// # Panics
    ///
    /// Panics if the id is already present.
    pub(crate) fn insert(&mut self, info: KeyInfo) -> usize {
        match self.keys.binary_search_by_key(&info.id, KeyInfo::id) {
            Ok(_) => {
                unreachable!("keyring: duplicate key ID {}", info.id)
            },
            Err(pos) => {
                self.keys.insert(pos, info);
                pos
            },
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &KeyInfo> {
        self.keys.iter()
    }
}
