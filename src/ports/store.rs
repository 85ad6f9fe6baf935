//! # Backing Store Port
//!
//! The key-value contract the read path depends on: point lookups plus an
//! ordered, prefix-bounded range scan. The scan capability is part of this
//! explicit interface so the cached reader never has to recover it by
//! downcasting behind an abstract reader.

use crate::domain::{Address, StateError, StorageKey};

/// Buckets of the backing store touched by the read path.
///
/// Trie-node keys are raw nibble arrays (one nibble per byte); hashed-account
/// keys are 32-byte address hashes; the plain buckets are keyed by raw
/// address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Trie-node descriptors for the account trie, keyed by nibble path.
    TrieOfAccounts,
    /// Account records keyed by hashed address.
    HashedAccounts,
    /// Account records keyed by raw address.
    PlainAccounts,
    /// Storage values keyed by `address ++ incarnation ++ storage key`.
    Storage,
    /// Contract bytecode keyed by code hash.
    Code,
    /// Incarnation of deleted accounts keyed by raw address.
    IncarnationMap,
}

/// Per-entry callback for [`KeyValueStore::walk`]. Returning `Ok(false)`
/// stops the scan early.
pub type WalkVisitor<'a> = dyn FnMut(&[u8], &[u8]) -> Result<bool, StateError> + 'a;

/// Backing key-value store abstraction.
pub trait KeyValueStore: Send + Sync {
    /// Point lookup.
    fn get(&self, bucket: Bucket, key: &[u8]) -> Result<Option<Vec<u8>>, StateError>;

    /// Ascending range scan beginning at `start_key`, restricted to keys
    /// sharing the first `fixed_bits` bits with `start_key`. Visits entries
    /// in key order; stops when the visitor returns `false`, on error, or
    /// on exhausting the prefix. `fixed_bits = 0` scans the whole bucket.
    fn walk(
        &self,
        bucket: Bucket,
        start_key: &[u8],
        fixed_bits: usize,
        visit: &mut WalkVisitor<'_>,
    ) -> Result<(), StateError>;
}

/// Compose the storage-bucket key for one slot of one incarnation.
pub fn plain_storage_key(address: &Address, incarnation: u64, key: &StorageKey) -> Vec<u8> {
    let mut out = Vec::with_capacity(20 + 8 + 32);
    out.extend_from_slice(address);
    out.extend_from_slice(&incarnation.to_be_bytes());
    out.extend_from_slice(key);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_storage_key_layout() {
        let key = plain_storage_key(&[0x01; 20], 2, &[0x03; 32]);
        assert_eq!(key.len(), 60);
        assert_eq!(&key[..20], &[0x01; 20]);
        assert_eq!(&key[20..28], &2u64.to_be_bytes());
        assert_eq!(&key[28..], &[0x03; 32]);
    }
}
